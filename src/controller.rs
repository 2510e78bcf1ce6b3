//! Command handling
//!
//! Turns packets from the host into diode and animator operations. Direct
//! brightness commands always update the stored brightness snapshot, but only
//! reach the diodes while no animation is playing. An animation ending with
//! [`FollowAction::StopPreviousState`] brings the snapshot back.

use crate::animation::AnimationId;
use crate::animator::{Animator, FollowAction};
use crate::error::{Error, Result};
use crate::gamma::MAX_BRIGHTNESS;
use crate::ipc::{
    Command, IpcPacket, IpcTransport, brightness_response, brightness_to_velocity,
    velocity_to_brightness, version_response,
};
use crate::laser_array::{DiodeArray, NUM_DIODES};
use crate::log::{debug, error, info, warn};
use crate::usb_midi::UsbMidiPacket;

/// Firmware version reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl FirmwareVersion {
    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for FirmwareVersion {
    fn default() -> Self {
        Self::new(0, 1, 0)
    }
}

/// Configuration for the controller
#[derive(Debug, Clone, Copy)]
pub struct ControllerConfig {
    pub version: FirmwareVersion,
    /// Animation played on boot
    pub boot_animation: AnimationId,
    /// Boot animation duration in seconds
    pub boot_duration: f32,
    pub boot_follow_action: FollowAction,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            version: FirmwareVersion::default(),
            boot_animation: AnimationId::Boot,
            boot_duration: 5.0,
            boot_follow_action: FollowAction::Loop,
        }
    }
}

/// What the caller has to do after a packet was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Nothing to send
    None,
    /// Send a response packet back to the host
    Respond(IpcPacket),
    /// The host requested a reset of the device
    Reboot,
}

impl Reply {
    /// Transmit the response, if any
    pub fn send<T: IpcTransport>(&self, transport: &mut T) -> Result<()> {
        if let Self::Respond(packet) = self {
            transport.transmit(packet).inspect_err(|_| {
                error!("Failed to transmit response {}", packet.opcode());
            })?;
        }
        Ok(())
    }
}

/// Owns the animator and the brightness snapshot
///
/// The diode array is borrowed per call, so the same controller works with a
/// plain [`crate::LaserArray`] or a handle to a shared one.
pub struct Controller {
    config: ControllerConfig,
    animator: Animator,
    stored_brightness: [u8; NUM_DIODES as usize],
}

impl Controller {
    pub const fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            animator: Animator::new(),
            stored_brightness: [0; NUM_DIODES as usize],
        }
    }

    pub const fn animator(&self) -> &Animator {
        &self.animator
    }

    /// Last requested brightness of every diode
    pub const fn stored_brightness(&self) -> &[u8; NUM_DIODES as usize] {
        &self.stored_brightness
    }

    pub const fn version(&self) -> FirmwareVersion {
        self.config.version
    }

    /// Turn every diode on and start the boot animation
    pub fn boot<A: DiodeArray + ?Sized>(&mut self, array: &mut A) {
        let version = self.config.version;
        info!(
            "Laserharp firmware version {}.{}.{}",
            version.major, version.minor, version.patch
        );

        array.set_all(MAX_BRIGHTNESS);
        self.animator.play(
            self.config.boot_animation,
            self.config.boot_duration,
            self.config.boot_follow_action,
        );
    }

    /// Advance the animator by `dt` seconds
    ///
    /// Call from the animation task at a fixed period.
    pub fn tick<A: DiodeArray + ?Sized>(&mut self, array: &mut A, dt: f32) {
        self.animator.update(array, dt);
        self.restore_if_required(array);
    }

    /// Decode and execute a packet from the host
    pub fn handle_packet<A: DiodeArray + ?Sized>(
        &mut self,
        array: &mut A,
        packet: &IpcPacket,
    ) -> Result<Reply> {
        // The boot animation runs until the host shows up
        if self.animator.is_playing()
            && self.animator.current_animation() == self.config.boot_animation
        {
            self.stop_animation(array);
        }

        let command = Command::parse(packet)?;
        self.execute(array, command)
    }

    /// Execute a decoded command
    pub fn execute<A: DiodeArray + ?Sized>(
        &mut self,
        array: &mut A,
        command: Command,
    ) -> Result<Reply> {
        match command {
            Command::UsbMidiOut(packet) | Command::DinMidiOut(packet) => {
                warn!("MIDI out is not implemented");
                Err(Error::UnsupportedCommand {
                    opcode: packet.opcode(),
                })
            }
            Command::SetBrightness { index, velocity } => {
                debug!("Set brightness of laser {}", index);
                self.set_brightness(array, index, velocity_to_brightness(velocity))?;
                Ok(Reply::None)
            }
            Command::SetAllBrightness { velocity } => {
                debug!("Set brightness of all lasers");
                let brightness = velocity_to_brightness(velocity);
                for index in 0..NUM_DIODES {
                    self.set_brightness(array, index, brightness)?;
                }
                Ok(Reply::None)
            }
            Command::GetBrightness { index } => {
                debug!("Get brightness of laser {}", index);
                let brightness = array.brightness(index).unwrap_or(0);
                Ok(Reply::Respond(brightness_response(
                    index,
                    brightness_to_velocity(brightness),
                )))
            }
            Command::PlayAnimation {
                id,
                duration,
                follow_action,
            } => {
                debug!("Play animation {}", id);
                self.animator.play_raw(id, duration, follow_action)?;
                Ok(Reply::None)
            }
            Command::StopAnimation => {
                debug!("Stop animation");
                self.stop_animation(array);
                Ok(Reply::None)
            }
            Command::Version => {
                debug!("Firmware version inquiry");
                let version = self.config.version;
                Ok(Reply::Respond(version_response(
                    version.major,
                    version.minor,
                    version.patch,
                )))
            }
            Command::Reboot => {
                info!("Rebooting");
                Ok(Reply::Reboot)
            }
        }
    }

    /// Forward a USB-MIDI packet to the host
    pub fn forward_usb_midi<T: IpcTransport>(
        &self,
        packet: UsbMidiPacket,
        transport: &mut T,
    ) -> Result<()> {
        transport
            .transmit(&packet.to_ipc_packet())
            .inspect_err(|_| error!("Failed to forward USB MIDI packet"))
    }

    /// Remember the brightness and apply it unless an animation owns the diodes
    fn set_brightness<A: DiodeArray + ?Sized>(
        &mut self,
        array: &mut A,
        index: u8,
        brightness: u8,
    ) -> Result<()> {
        let Some(stored) = self.stored_brightness.get_mut(usize::from(index)) else {
            error!("Invalid laser number {}", index);
            return Err(Error::InvalidDiodeIndex { index });
        };
        *stored = brightness;

        if !self.animator.is_playing() {
            array.set_brightness(index, brightness)?;
        }
        Ok(())
    }

    fn stop_animation<A: DiodeArray + ?Sized>(&mut self, array: &mut A) {
        self.animator.stop(array);
        self.restore_if_required(array);
    }

    fn restore_if_required<A: DiodeArray + ?Sized>(&mut self, array: &mut A) {
        if !self.animator.take_restore_request() {
            return;
        }

        debug!("Restoring stored brightness");
        for (index, brightness) in (0..NUM_DIODES).zip(self.stored_brightness) {
            let _ = array.set_brightness(index, brightness);
        }
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}
