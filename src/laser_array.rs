//! Diode array engine
//!
//! Keeps the brightness and fade state of every diode and mirrors it into the
//! output frame. The frame is a list of bitmasks, one per pattern slot, with
//! one bit per diode. The output transport shifts the frame out continuously
//! (SPI into the shift register chain, paced by a timer), so every change is
//! written into the frame before the call returns.

use embassy_time::Duration;

use crate::error::{Error, Result};
use crate::gamma::{self, MAX_BRIGHTNESS, OUTPUT_BITS};
use crate::log::error;
use crate::transition::{DiodeTransition, fade_ticks};

/// Number of diodes in the array
pub const NUM_DIODES: u8 = 24;

/// Default fade timer rate in ticks per second
pub const DEFAULT_FADE_TICK_RATE: u32 = 30;

/// Output state of all diodes for one pattern slot
pub type Bitmask = u32;

/// Frame shifted out to the hardware, one bitmask per pattern slot
pub type OutputFrame = [Bitmask; OUTPUT_BITS];

const _: () = assert!(NUM_DIODES as u32 <= Bitmask::BITS);

/// Hardware that shifts the output frame and drives the fade timer
///
/// Implemented by the board support code (SPI + DMA + timers).
pub trait OutputTransport {
    /// Start shifting `frame` out continuously
    ///
    /// The frame stays at the same address for the lifetime of the array.
    fn start_output(&mut self, frame: &OutputFrame) -> Result<()>;

    /// Start the periodic fade tick at `tick_rate` ticks per second
    fn start_fade_timer(&mut self, tick_rate: u32) -> Result<()>;
}

/// Brightness control over an array of diodes
///
/// Animations and the command layer drive the diodes through this trait, so
/// they work the same on a plain [`LaserArray`] and on a shared one.
pub trait DiodeArray {
    /// Get the committed brightness of a diode
    fn brightness(&self, index: u8) -> Result<u8>;

    /// Set brightness immediately, cancelling any fade on that diode
    fn set_brightness(&mut self, index: u8, brightness: u8) -> Result<()>;

    /// Fade from the current brightness to `brightness` over `duration`
    fn fade_brightness(&mut self, index: u8, brightness: u8, duration: Duration) -> Result<()>;

    /// Set every diode to the same brightness
    fn set_all(&mut self, brightness: u8) {
        for index in 0..NUM_DIODES {
            // Indices are always in range here
            let _ = self.set_brightness(index, brightness);
        }
    }
}

/// Configuration for the diode array
#[derive(Debug, Clone, Copy)]
pub struct LaserArrayConfig {
    /// Fade timer rate in ticks per second
    pub fade_tick_rate: u32,
}

impl LaserArrayConfig {
    pub const fn new() -> Self {
        Self {
            fade_tick_rate: DEFAULT_FADE_TICK_RATE,
        }
    }
}

impl Default for LaserArrayConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Diode array engine
#[derive(Debug, Clone)]
pub struct LaserArray {
    config: LaserArrayConfig,
    diodes: [DiodeTransition; NUM_DIODES as usize],
    frame: OutputFrame,
}

impl LaserArray {
    /// Create an array with every diode off and no fades running
    pub const fn new(config: LaserArrayConfig) -> Self {
        Self {
            config,
            diodes: [DiodeTransition::OFF; NUM_DIODES as usize],
            frame: [0; OUTPUT_BITS],
        }
    }

    /// Reset all state and arm the output transport
    ///
    /// A transport failure is logged and returned, but the array stays usable
    /// so the rest of the firmware keeps running.
    pub fn init<T: OutputTransport>(&mut self, transport: &mut T) -> Result<()> {
        self.diodes = [DiodeTransition::OFF; NUM_DIODES as usize];
        self.frame = [0; OUTPUT_BITS];

        if let Err(err) = transport.start_output(&self.frame) {
            error!("Failed to start output transfer");
            return Err(err);
        }

        if let Err(err) = transport.start_fade_timer(self.config.fade_tick_rate) {
            error!("Failed to start fade timer");
            return Err(err);
        }

        Ok(())
    }

    pub const fn config(&self) -> &LaserArrayConfig {
        &self.config
    }

    /// Get the output frame
    pub const fn frame(&self) -> &OutputFrame {
        &self.frame
    }

    /// Check if a diode is fading
    pub fn is_fading(&self, index: u8) -> Result<bool> {
        let index = Self::validate(index)?;
        Ok(self.diodes[index].is_transitioning())
    }

    /// Advance all running fades by one tick
    ///
    /// Call once per fade timer period.
    pub fn on_fade_tick(&mut self) {
        for index in 0..self.diodes.len() {
            if let Some(brightness) = self.diodes[index].tick() {
                self.apply_brightness(index, brightness);
            }
        }
    }

    fn validate(index: u8) -> Result<usize> {
        if index >= NUM_DIODES {
            error!("Invalid diode index: {}", index);
            return Err(Error::InvalidDiodeIndex { index });
        }
        Ok(usize::from(index))
    }

    /// Commit a brightness and write its pattern into the frame
    fn apply_brightness(&mut self, index: usize, brightness: u8) {
        let brightness = brightness.min(MAX_BRIGHTNESS);

        let diode = &mut self.diodes[index];
        if diode.current() == brightness {
            return;
        }
        diode.set_current(brightness);

        let pattern = gamma::pattern(brightness);
        let bit: Bitmask = 1 << index;
        for (slot, mask) in self.frame.iter_mut().enumerate() {
            if (pattern >> slot) & 1 == 1 {
                *mask |= bit;
            } else {
                *mask &= !bit;
            }
        }
    }
}

impl DiodeArray for LaserArray {
    fn brightness(&self, index: u8) -> Result<u8> {
        let index = Self::validate(index)?;
        Ok(self.diodes[index].current())
    }

    fn set_brightness(&mut self, index: u8, brightness: u8) -> Result<()> {
        let index = Self::validate(index)?;

        self.diodes[index].cancel();
        self.apply_brightness(index, brightness);

        Ok(())
    }

    fn fade_brightness(&mut self, index: u8, brightness: u8, duration: Duration) -> Result<()> {
        let index = Self::validate(index)?;

        let brightness = brightness.min(MAX_BRIGHTNESS);
        let ticks = fade_ticks(duration, self.config.fade_tick_rate);
        if self.diodes[index].start(brightness, ticks) {
            self.apply_brightness(index, brightness);
        }

        Ok(())
    }
}

impl Default for LaserArray {
    fn default() -> Self {
        Self::new(LaserArrayConfig::default())
    }
}
