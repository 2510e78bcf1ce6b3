#![no_std]

mod log;

pub mod animation;
pub mod animator;
pub mod channel;
pub mod controller;
pub mod error;
pub mod gamma;
pub mod ipc;
pub mod laser_array;
pub mod scheduler;
pub mod shared;
pub mod transition;
pub mod usb_midi;

pub use animation::{Animation, AnimationId};
pub use animator::{Animator, FollowAction};
pub use channel::{IpcRxQueue, PacketQueue, UsbRxQueue};
pub use controller::{Controller, ControllerConfig, FirmwareVersion, Reply};
pub use error::{Error, Result};
pub use gamma::{MAX_BRIGHTNESS, NUM_BRIGHTNESS_LEVELS};
pub use ipc::{Command, IpcPacket, IpcTransport, PacketAssembler};
pub use laser_array::{DiodeArray, LaserArray, LaserArrayConfig, NUM_DIODES, OutputTransport};
pub use scheduler::UpdateScheduler;
pub use shared::{ArrayHandle, SharedLaserArray};
pub use usb_midi::UsbMidiPacket;

pub use embassy_time::{Duration, Instant};
