//! Fixed-capacity packet queues for `no_std` environments.
//!
//! Received packets are pushed from UART and USB interrupt handlers and
//! drained by the command task. The queue is backed by a `heapless::Deque`
//! behind a critical section, so both sides may run at any priority.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use crate::error::{Error, Result};
use crate::ipc::IpcPacket;
use crate::log::error;
use crate::usb_midi::UsbMidiPacket;

/// Queue depth used by the board for received packets
pub const RX_QUEUE_SIZE: usize = 32;

/// Queue of packets received over the IPC link
pub type IpcRxQueue = PacketQueue<IpcPacket, RX_QUEUE_SIZE>;

/// Queue of packets received from the USB-MIDI endpoint
pub type UsbRxQueue = PacketQueue<UsbMidiPacket, RX_QUEUE_SIZE>;

/// A bounded, interrupt-safe packet queue.
pub struct PacketQueue<T, const SIZE: usize> {
    inner: Mutex<RefCell<Deque<T, SIZE>>>,
}

impl<T, const SIZE: usize> PacketQueue<T, SIZE> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Get a producer handle for an interrupt handler
    pub const fn producer(&self) -> Producer<'_, T, SIZE> {
        Producer { queue: self }
    }

    /// Get a consumer handle for the task draining the queue
    pub const fn consumer(&self) -> Consumer<'_, T, SIZE> {
        Consumer { queue: self }
    }

    /// Queue a packet
    ///
    /// A full queue drops the packet.
    pub fn try_send(&self, packet: T) -> Result<()> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow_ref_mut(cs);
            queue.push_back(packet).map_err(|_| {
                error!("Failed to queue packet, queue full");
                Error::QueueFull
            })
        })
    }

    /// Take the oldest packet, if any
    pub fn try_receive(&self) -> Option<T> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).pop_front())
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow_ref(cs).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every queued packet
    pub fn clear(&self) {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).clear());
    }
}

impl<T, const SIZE: usize> Default for PacketQueue<T, SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sending side of a [`PacketQueue`]
#[derive(Clone, Copy)]
pub struct Producer<'a, T, const SIZE: usize> {
    queue: &'a PacketQueue<T, SIZE>,
}

impl<T, const SIZE: usize> Producer<'_, T, SIZE> {
    pub fn try_send(&self, packet: T) -> Result<()> {
        self.queue.try_send(packet)
    }
}

/// Receiving side of a [`PacketQueue`]
#[derive(Clone, Copy)]
pub struct Consumer<'a, T, const SIZE: usize> {
    queue: &'a PacketQueue<T, SIZE>,
}

impl<T, const SIZE: usize> Consumer<'_, T, SIZE> {
    pub fn try_receive(&self) -> Option<T> {
        self.queue.try_receive()
    }

    /// Iterate over packets until the queue is empty
    pub fn drain(&self) -> impl Iterator<Item = T> + '_ {
        core::iter::from_fn(move || self.try_receive())
    }
}
