//! Animation system with compile-time known animation variants
//!
//! Animations are stateless: each one maps a progress value in `[0, 1]` to a
//! brightness for every diode and writes it through [`DiodeArray`], the same
//! way an external command would.

mod boot;
mod flip;
mod test_pattern;

pub use boot::BootAnimation;
pub use flip::FlipAnimation;
pub use test_pattern::TestPatternAnimation;

use crate::laser_array::DiodeArray;

const ANIMATION_NAME_BOOT: &str = "boot";
const ANIMATION_NAME_FLIP: &str = "flip";
const ANIMATION_NAME_TEST: &str = "test";

const ANIMATION_ID_BOOT: u8 = 0;
const ANIMATION_ID_FLIP: u8 = 1;
const ANIMATION_ID_TEST: u8 = 2;

/// Number of known animations
pub const NUM_ANIMATIONS: u8 = 3;

pub trait Animation {
    /// Render the frame at `progress` (0.0-1.0)
    fn render<A: DiodeArray + ?Sized>(&self, array: &mut A, progress: f32);
}

/// Known animation ids that can be requested.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum AnimationId {
    /// Comet tails travelling across the array
    #[default]
    Boot = ANIMATION_ID_BOOT,
    /// Single diode sweeping from one end to the other
    Flip = ANIMATION_ID_FLIP,
    /// Diagnostic toggle between two diodes
    Test = ANIMATION_ID_TEST,
}

impl AnimationId {
    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            ANIMATION_ID_BOOT => Self::Boot,
            ANIMATION_ID_FLIP => Self::Flip,
            ANIMATION_ID_TEST => Self::Test,
            _ => return None,
        })
    }

    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boot => ANIMATION_NAME_BOOT,
            Self::Flip => ANIMATION_NAME_FLIP,
            Self::Test => ANIMATION_NAME_TEST,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            ANIMATION_NAME_BOOT => Some(Self::Boot),
            ANIMATION_NAME_FLIP => Some(Self::Flip),
            ANIMATION_NAME_TEST => Some(Self::Test),
            _ => None,
        }
    }

    /// Render the animation frame at `progress`
    pub fn render<A: DiodeArray + ?Sized>(self, array: &mut A, progress: f32) {
        match self {
            Self::Boot => BootAnimation.render(array, progress),
            Self::Flip => FlipAnimation.render(array, progress),
            Self::Test => TestPatternAnimation.render(array, progress),
        }
    }
}
