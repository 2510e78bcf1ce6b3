//! Interrupt-safe access to the diode array.
//!
//! The fade tick runs in interrupt context while animations and commands run
//! in tasks. Every operation takes a critical section for the duration of a
//! single diode update, so a fade tick never observes a half-written diode.

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_time::Duration;

use crate::error::Result;
use crate::laser_array::{DiodeArray, LaserArray, LaserArrayConfig, OutputFrame, OutputTransport};

/// Diode array shared between interrupt handlers and tasks
///
/// The constructor is `const`, so the array can live in a `static` that the
/// fade timer interrupt reaches without allocation.
pub struct SharedLaserArray {
    inner: Mutex<RefCell<LaserArray>>,
}

impl SharedLaserArray {
    pub const fn new(config: LaserArrayConfig) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(LaserArray::new(config))),
        }
    }

    /// Get a handle for tasks that drive the array
    ///
    /// Handles are `Copy`; any number of them can coexist.
    pub const fn handle(&self) -> ArrayHandle<'_> {
        ArrayHandle { array: self }
    }

    /// Run `f` with exclusive access to the array
    pub fn lock<R>(&self, f: impl FnOnce(&mut LaserArray) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Reset state and arm the output transport
    pub fn init<T: OutputTransport>(&self, transport: &mut T) -> Result<()> {
        self.lock(|array| array.init(transport))
    }

    /// Fade timer interrupt entry point
    pub fn on_fade_tick(&self) {
        self.lock(LaserArray::on_fade_tick);
    }

    /// Copy of the current output frame
    pub fn frame(&self) -> OutputFrame {
        self.lock(|array| *array.frame())
    }
}

/// Handle to a [`SharedLaserArray`]
///
/// This is a lightweight reference that can be cloned and passed around.
#[derive(Clone, Copy)]
pub struct ArrayHandle<'a> {
    array: &'a SharedLaserArray,
}

impl DiodeArray for ArrayHandle<'_> {
    fn brightness(&self, index: u8) -> Result<u8> {
        self.array.lock(|array| array.brightness(index))
    }

    fn set_brightness(&mut self, index: u8, brightness: u8) -> Result<()> {
        self.array
            .lock(|array| array.set_brightness(index, brightness))
    }

    fn fade_brightness(&mut self, index: u8, brightness: u8, duration: Duration) -> Result<()> {
        self.array
            .lock(|array| array.fade_brightness(index, brightness, duration))
    }
}
