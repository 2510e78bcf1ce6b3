//! Animator pacing.
//!
//! Runs the controller tick at a fixed period without async or
//! platform-specific timers. The caller is responsible for sleeping between
//! ticks.

use embassy_time::{Duration, Instant};

use crate::controller::Controller;
use crate::laser_array::DiodeArray;

/// Default animator update period (50 Hz).
pub const DEFAULT_UPDATE_PERIOD: Duration = Duration::from_millis(20);

/// Result of a scheduler tick.
#[derive(Debug, Clone, Copy)]
pub struct TickResult {
    /// The deadline for the next tick.
    pub next_deadline: Instant,
    /// How long to wait until the next tick (zero if behind schedule).
    pub sleep_duration: Duration,
}

/// Fixed period scheduler for the animation task.
///
/// Every tick advances the animator by exactly one period, regardless of the
/// real time elapsed, so animation speed does not depend on scheduling jitter.
/// If the task falls more than two periods behind, the backlog is skipped
/// instead of being caught up in a burst.
///
/// # Usage
///
/// ```ignore
/// let mut scheduler = UpdateScheduler::new();
///
/// loop {
///     let result = scheduler.tick(&mut controller, &mut array, Instant::now());
///     Timer::after(result.sleep_duration).await;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct UpdateScheduler {
    next_update: Instant,
    period: Duration,
}

impl UpdateScheduler {
    /// Create a scheduler with [`DEFAULT_UPDATE_PERIOD`].
    pub const fn new() -> Self {
        Self::with_period(DEFAULT_UPDATE_PERIOD)
    }

    /// Create a scheduler with a custom period.
    pub const fn with_period(period: Duration) -> Self {
        Self {
            next_update: Instant::from_millis(0),
            period,
        }
    }

    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Animator time step per tick, in seconds.
    #[allow(clippy::cast_precision_loss)]
    pub fn dt(&self) -> f32 {
        self.period.as_micros() as f32 / 1_000_000.0
    }

    /// Run one controller tick and return timing information.
    pub fn tick<A: DiodeArray + ?Sized>(
        &mut self,
        controller: &mut Controller,
        array: &mut A,
        now: Instant,
    ) -> TickResult {
        let max_drift = self.period * 2;
        if now > self.next_update + max_drift {
            self.next_update = now;
        }

        controller.tick(array, self.dt());

        self.next_update += self.period;

        let sleep_duration = if self.next_update > now {
            self.next_update - now
        } else {
            Duration::from_ticks(0)
        };

        TickResult {
            next_deadline: self.next_update,
            sleep_duration,
        }
    }
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new()
    }
}
