use derive_more::{Display, Error};

/// Errors reported by the light bar core.
///
/// None of these are fatal: the failing operation is skipped and the
/// device keeps running.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Diode index outside of the array
    #[display("invalid diode index: {index}")]
    InvalidDiodeIndex { index: u8 },
    /// Velocity above the MIDI range (0-127)
    #[display("invalid velocity: {velocity}")]
    InvalidVelocity { velocity: u8 },
    /// Animation id not known to the animator
    #[display("invalid animation id: {id}")]
    InvalidAnimation { id: u8 },
    /// Follow action id not known to the animator
    #[display("invalid follow action: {id}")]
    InvalidFollowAction { id: u8 },
    /// Unknown IPC opcode
    #[display("unknown command: {opcode:#04x}")]
    UnknownCommand { opcode: u8 },
    /// Recognized IPC opcode that this firmware does not implement
    #[display("unsupported command: {opcode:#04x}")]
    UnsupportedCommand { opcode: u8 },
    /// The output transport (SPI/DMA/timers) could not be armed
    #[display("failed to arm output transport")]
    TransportArm,
    /// A packet could not be transmitted over the link
    #[display("failed to transmit packet")]
    Transmit,
    /// A fixed-capacity queue was full and the packet was dropped
    #[display("queue full")]
    QueueFull,
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
