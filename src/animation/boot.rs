//! Boot animation
//!
//! Every diode gets a phase offset of `index * 1/phi`. The golden ratio
//! stride spreads the offsets evenly without repeating, so the comet tails
//! appear to wander across the array instead of marching in order.

use super::Animation;
use crate::gamma::MAX_BRIGHTNESS;
use crate::laser_array::{DiodeArray, NUM_DIODES};

/// Inverse of the golden ratio
const PHASE_STRIDE: f32 = 0.618_033_988_75;

/// Falloff rate of a comet tail; the tail covers a third of the cycle
const TAIL_FALLOFF: f32 = 3.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct BootAnimation;

impl BootAnimation {
    /// Brightness of diode `index` at `progress`
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn brightness_at(index: u8, progress: f32) -> u8 {
        let phase = libm::fmodf(f32::from(index) * PHASE_STRIDE + progress, 1.0);
        let level = 1.0 - libm::fminf(phase * TAIL_FALLOFF, 1.0);
        (level * f32::from(MAX_BRIGHTNESS)) as u8
    }
}

impl Animation for BootAnimation {
    fn render<A: DiodeArray + ?Sized>(&self, array: &mut A, progress: f32) {
        for index in 0..NUM_DIODES {
            let _ = array.set_brightness(index, Self::brightness_at(index, progress));
        }
    }
}
