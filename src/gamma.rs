//! Gamma-corrected brightness patterns
//!
//! Each brightness level is encoded as a pulse train of `PATTERN_BITS` bits.
//! The number of set bits grows with `level^1.5` so that perceived brightness
//! is roughly linear in the level, and the set bits are spread evenly over the
//! pattern to avoid visible flicker.
//!
//! The table is built at compile time.

/// Number of discrete brightness levels
pub const NUM_BRIGHTNESS_LEVELS: usize = 64;

/// Highest brightness level
#[allow(clippy::cast_possible_truncation)]
pub const MAX_BRIGHTNESS: u8 = (NUM_BRIGHTNESS_LEVELS - 1) as u8;

/// Width of a brightness pattern in bits
pub const PATTERN_BITS: u32 = pattern_width(NUM_BRIGHTNESS_LEVELS as u32);

/// Number of pattern bits that reach the output.
///
/// The top bit is dropped: a pattern starts and ends on the same phase, so
/// the last slot would duplicate the first one.
pub const OUTPUT_BITS: usize = NUM_BRIGHTNESS_LEVELS - 1;

/// Mask of the pattern bits that reach the output
pub const OUTPUT_MASK: BrightnessPattern = (1 << OUTPUT_BITS) - 1;

/// Pulse train for one brightness level
pub type BrightnessPattern = u64;

static BRIGHTNESS_PATTERNS: [BrightnessPattern; NUM_BRIGHTNESS_LEVELS] = build_patterns();

/// Look up the pattern for a brightness level
///
/// Levels above [`MAX_BRIGHTNESS`] are clamped.
#[inline]
pub fn pattern(level: u8) -> BrightnessPattern {
    BRIGHTNESS_PATTERNS[usize::from(level.min(MAX_BRIGHTNESS))]
}

/// Next power of two that fits `levels - 1`, but at least 8
const fn pattern_width(levels: u32) -> u32 {
    let width = (levels - 1).next_power_of_two();
    if width < 8 { 8 } else { width }
}

/// Number of set bits for a level: `round(level^1.5 / levels^0.5)`
///
/// Computed as `round(sqrt(level^3 / levels))` in integers.
/// `floor(x + 1/2) == (floor(2x) + 1) / 2` and `floor(2x)` is the integer
/// square root of `4 * level^3 / levels`.
const fn pulse_count(level: u64, levels: u64) -> u64 {
    let doubled = (4 * level * level * level / levels).isqrt();
    (doubled + 1) / 2
}

const fn build_patterns() -> [BrightnessPattern; NUM_BRIGHTNESS_LEVELS] {
    let mut patterns = [0; NUM_BRIGHTNESS_LEVELS];
    let width = PATTERN_BITS as u64;

    let mut level = 0;
    while level < NUM_BRIGHTNESS_LEVELS {
        let count = pulse_count(level as u64, NUM_BRIGHTNESS_LEVELS as u64);
        let mut pattern = 0;
        let mut i = 0;
        while i < count {
            pattern |= 1 << (width * i / count);
            i += 1;
        }
        patterns[level] = pattern;
        level += 1;
    }

    patterns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_count() {
        assert_eq!(pulse_count(0, 64), 0);
        assert_eq!(pulse_count(2, 64), 0);
        assert_eq!(pulse_count(3, 64), 1);
        assert_eq!(pulse_count(6, 64), 2);
        assert_eq!(pulse_count(62, 64), 61);
        assert_eq!(pulse_count(63, 64), 63);
    }

    #[test]
    fn test_pattern_width() {
        assert_eq!(pattern_width(4), 8);
        assert_eq!(pattern_width(64), 64);
        assert_eq!(pattern_width(65), 64);
    }
}
