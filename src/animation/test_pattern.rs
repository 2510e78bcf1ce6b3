use super::Animation;
use crate::gamma::MAX_BRIGHTNESS;
use crate::laser_array::{DiodeArray, NUM_DIODES};

const FIRST_HALF_DIODE: u8 = 4;
const SECOND_HALF_DIODE: u8 = 5;

/// Diagnostic pattern: diode 4 during the first half, diode 5 during the second
#[derive(Debug, Clone, Copy, Default)]
pub struct TestPatternAnimation;

impl Animation for TestPatternAnimation {
    fn render<A: DiodeArray + ?Sized>(&self, array: &mut A, progress: f32) {
        let lit = if progress < 0.5 {
            FIRST_HALF_DIODE
        } else {
            SECOND_HALF_DIODE
        };

        for index in 0..NUM_DIODES {
            let brightness = if index == lit { MAX_BRIGHTNESS } else { 0 };
            let _ = array.set_brightness(index, brightness);
        }
    }
}
