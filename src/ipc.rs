//! Inter-processor link packets
//!
//! The host talks to the light bar with fixed 4-byte packets
//! `[opcode, arg1, arg2, arg3]` over a UART byte stream. Brightness travels on
//! the wire as a MIDI velocity (0-127).

use heapless::Vec;

use crate::animation::AnimationId;
use crate::animator::FollowAction;
use crate::error::{Error, Result};
use crate::gamma::MAX_BRIGHTNESS;
use crate::laser_array::NUM_DIODES;
use crate::log::error;

/// Size of one packet in bytes
pub const IPC_PACKET_SIZE: usize = 4;

/// Highest MIDI velocity
pub const MAX_VELOCITY: u8 = 127;

const OPCODE_SET_BRIGHTNESS: u8 = 0x80;
const OPCODE_SET_ALL_BRIGHTNESS: u8 = 0x81;
const OPCODE_GET_BRIGHTNESS: u8 = 0x82;
const OPCODE_PLAY_ANIMATION: u8 = 0x83;
const OPCODE_STOP_ANIMATION: u8 = 0x84;
const OPCODE_VERSION: u8 = 0xF0;
const OPCODE_REBOOT: u8 = 0xF1;

const MAJOR_CODE_MASK: u8 = 0xF0;
const MAJOR_CODE_USB_MIDI_OUT: u8 = 0x00;
const MAJOR_CODE_DIN_MIDI_OUT: u8 = 0x10;

/// Convert a MIDI velocity into a brightness level
///
/// Truncates; `brightness_to_velocity` is not an exact inverse.
#[allow(clippy::cast_possible_truncation)]
pub const fn velocity_to_brightness(velocity: u8) -> u8 {
    (velocity as u32 * MAX_BRIGHTNESS as u32 / MAX_VELOCITY as u32) as u8
}

/// Convert a brightness level into a MIDI velocity
#[allow(clippy::cast_possible_truncation)]
pub const fn brightness_to_velocity(brightness: u8) -> u8 {
    (brightness as u32 * MAX_VELOCITY as u32 / MAX_BRIGHTNESS as u32) as u8
}

/// One packet on the link
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IpcPacket(pub [u8; IPC_PACKET_SIZE]);

impl IpcPacket {
    pub const fn new(opcode: u8, arg1: u8, arg2: u8, arg3: u8) -> Self {
        Self([opcode, arg1, arg2, arg3])
    }

    pub const fn opcode(&self) -> u8 {
        self.0[0]
    }

    pub const fn args(&self) -> [u8; 3] {
        [self.0[1], self.0[2], self.0[3]]
    }

    pub const fn as_bytes(&self) -> &[u8; IPC_PACKET_SIZE] {
        &self.0
    }
}

impl From<[u8; IPC_PACKET_SIZE]> for IpcPacket {
    fn from(bytes: [u8; IPC_PACKET_SIZE]) -> Self {
        Self(bytes)
    }
}

/// Decoded request from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// MIDI packet to forward to the USB-MIDI endpoint
    UsbMidiOut(IpcPacket),
    /// MIDI packet to forward to the DIN-MIDI port
    DinMidiOut(IpcPacket),
    /// Set the brightness of one diode
    SetBrightness { index: u8, velocity: u8 },
    /// Set the brightness of every diode
    SetAllBrightness { velocity: u8 },
    /// Report the brightness of one diode
    GetBrightness { index: u8 },
    /// Play an animation; raw ids are validated by the animator
    PlayAnimation {
        id: u8,
        duration: f32,
        follow_action: u8,
    },
    StopAnimation,
    /// Report the firmware version
    Version,
    Reboot,
}

impl Command {
    /// Decode a packet
    ///
    /// Out of range diode indices and velocities are rejected here.
    pub fn parse(packet: &IpcPacket) -> Result<Self> {
        let opcode = packet.opcode();
        let [arg1, arg2, arg3] = packet.args();

        match opcode & MAJOR_CODE_MASK {
            MAJOR_CODE_USB_MIDI_OUT => return Ok(Self::UsbMidiOut(*packet)),
            MAJOR_CODE_DIN_MIDI_OUT => return Ok(Self::DinMidiOut(*packet)),
            _ => {}
        }

        Ok(match opcode {
            OPCODE_SET_BRIGHTNESS => Self::SetBrightness {
                index: validate_index(arg1)?,
                velocity: validate_velocity(arg2)?,
            },
            OPCODE_SET_ALL_BRIGHTNESS => Self::SetAllBrightness {
                velocity: validate_velocity(arg1)?,
            },
            OPCODE_GET_BRIGHTNESS => Self::GetBrightness { index: arg1 },
            OPCODE_PLAY_ANIMATION => Self::PlayAnimation {
                id: arg1,
                duration: f32::from(arg2) * 0.1,
                follow_action: arg3,
            },
            OPCODE_STOP_ANIMATION => Self::StopAnimation,
            OPCODE_VERSION => Self::Version,
            OPCODE_REBOOT => Self::Reboot,
            _ => {
                error!("Unknown command {}", opcode);
                return Err(Error::UnknownCommand { opcode });
            }
        })
    }

    /// Encode the command back into a packet
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_packet(&self) -> IpcPacket {
        match *self {
            Self::UsbMidiOut(packet) | Self::DinMidiOut(packet) => packet,
            Self::SetBrightness { index, velocity } => {
                IpcPacket::new(OPCODE_SET_BRIGHTNESS, index, velocity, 0)
            }
            Self::SetAllBrightness { velocity } => {
                IpcPacket::new(OPCODE_SET_ALL_BRIGHTNESS, velocity, 0, 0)
            }
            Self::GetBrightness { index } => IpcPacket::new(OPCODE_GET_BRIGHTNESS, index, 0, 0),
            Self::PlayAnimation {
                id,
                duration,
                follow_action,
            } => {
                let deciseconds = libm::roundf(duration * 10.0).clamp(0.0, 255.0) as u8;
                IpcPacket::new(OPCODE_PLAY_ANIMATION, id, deciseconds, follow_action)
            }
            Self::StopAnimation => IpcPacket::new(OPCODE_STOP_ANIMATION, 0, 0, 0),
            Self::Version => IpcPacket::new(OPCODE_VERSION, 0, 0, 0),
            Self::Reboot => IpcPacket::new(OPCODE_REBOOT, 0, 0, 0),
        }
    }

    /// Build a play request from typed values
    pub fn play(id: AnimationId, duration: f32, action: FollowAction) -> Self {
        Self::PlayAnimation {
            id: id.as_raw(),
            duration,
            follow_action: action.as_raw(),
        }
    }
}

fn validate_index(index: u8) -> Result<u8> {
    if index >= NUM_DIODES {
        error!("Invalid laser number {}", index);
        return Err(Error::InvalidDiodeIndex { index });
    }
    Ok(index)
}

fn validate_velocity(velocity: u8) -> Result<u8> {
    if velocity > MAX_VELOCITY {
        error!("Invalid brightness {}", velocity);
        return Err(Error::InvalidVelocity { velocity });
    }
    Ok(velocity)
}

/// Response to a get brightness request
pub const fn brightness_response(index: u8, velocity: u8) -> IpcPacket {
    IpcPacket::new(OPCODE_GET_BRIGHTNESS, index, velocity, 0)
}

/// Response to a version inquiry
pub const fn version_response(major: u8, minor: u8, patch: u8) -> IpcPacket {
    IpcPacket::new(OPCODE_VERSION, major, minor, patch)
}

/// Sending side of the link
pub trait IpcTransport {
    /// Transmit one packet, blocking until sent or timed out
    fn transmit(&mut self, packet: &IpcPacket) -> Result<()>;
}

/// Reassembles packets from the UART byte stream
#[derive(Debug, Clone, Default)]
pub struct PacketAssembler {
    buffer: Vec<u8, IPC_PACKET_SIZE>,
}

impl PacketAssembler {
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Feed one byte, returning a packet once four bytes are collected
    pub fn push(&mut self, byte: u8) -> Option<IpcPacket> {
        // The buffer is drained as soon as it fills up, so this cannot fail
        let _ = self.buffer.push(byte);
        if !self.buffer.is_full() {
            return None;
        }

        let mut bytes = [0; IPC_PACKET_SIZE];
        bytes.copy_from_slice(&self.buffer);
        self.buffer.clear();
        Some(IpcPacket(bytes))
    }

    /// Number of bytes waiting for the rest of their packet
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Drop a partial packet, e.g. after a receive error
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}
