use embassy_time::Duration;

/// Number of fade ticks that fit in `duration` at `tick_rate` ticks per second.
///
/// Truncates, so a duration shorter than one tick period yields zero.
#[allow(clippy::cast_possible_truncation)]
pub const fn fade_ticks(duration: Duration, tick_rate: u32) -> u32 {
    let ticks = duration.as_millis() * tick_rate as u64 / 1000;
    if ticks > u32::MAX as u64 {
        u32::MAX
    } else {
        ticks as u32
    }
}

/// Brightness state of a single diode with tick driven linear fades
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiodeTransition {
    /// Committed brightness
    current: u8,
    /// Brightness at the start of the fade
    source: u8,
    /// Brightness at the end of the fade
    target: u8,
    /// Total number of ticks of the fade
    duration: u32,
    /// Ticks elapsed, equal to `duration` when idle
    tick: u32,
}

impl DiodeTransition {
    /// Idle diode with zero brightness
    pub const OFF: Self = Self {
        current: 0,
        source: 0,
        target: 0,
        duration: 0,
        tick: 0,
    };

    /// Get committed brightness
    pub const fn current(&self) -> u8 {
        self.current
    }

    /// Store committed brightness
    pub const fn set_current(&mut self, brightness: u8) {
        self.current = brightness;
    }

    pub const fn source(&self) -> u8 {
        self.source
    }

    pub const fn target(&self) -> u8 {
        self.target
    }

    /// Check if a fade is in progress
    pub const fn is_transitioning(&self) -> bool {
        self.tick != self.duration
    }

    /// Cancel the fade in progress, keeping the current brightness
    pub const fn cancel(&mut self) {
        self.tick = self.duration;
    }

    /// Start a fade from the current brightness towards `target`
    ///
    /// Returns `true` if the fade is empty and `target` should be applied
    /// right away.
    pub const fn start(&mut self, target: u8, ticks: u32) -> bool {
        self.source = self.current;
        self.target = target;
        self.duration = ticks;
        self.tick = 0;
        ticks == 0
    }

    /// Advance the fade by one tick
    ///
    /// Returns the brightness for this tick, or `None` if the diode is idle.
    /// The last tick lands exactly on the target.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn tick(&mut self) -> Option<u8> {
        if !self.is_transitioning() {
            return None;
        }

        let source = i64::from(self.source);
        let range = i64::from(self.target) - source;
        let brightness =
            source + range * (i64::from(self.tick) + 1) / i64::from(self.duration);

        self.tick += 1;
        Some(brightness as u8)
    }
}

impl Default for DiodeTransition {
    fn default() -> Self {
        Self::OFF
    }
}
