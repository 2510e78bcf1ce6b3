use super::Animation;
use crate::gamma::MAX_BRIGHTNESS;
use crate::laser_array::{DiodeArray, NUM_DIODES};

/// A single diode sweeping linearly from the first to the last one
#[derive(Debug, Clone, Copy, Default)]
pub struct FlipAnimation;

impl FlipAnimation {
    /// Index of the lit diode at `progress`
    ///
    /// At `progress == 1.0` this is one past the last diode, so the final
    /// frame is dark.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn lit_index(progress: f32) -> u32 {
        libm::floorf(progress * f32::from(NUM_DIODES)) as u32
    }
}

impl Animation for FlipAnimation {
    fn render<A: DiodeArray + ?Sized>(&self, array: &mut A, progress: f32) {
        let lit = Self::lit_index(progress);
        for index in 0..NUM_DIODES {
            let brightness = if u32::from(index) == lit {
                MAX_BRIGHTNESS
            } else {
                0
            };
            let _ = array.set_brightness(index, brightness);
        }
    }
}
