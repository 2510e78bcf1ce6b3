//! Animator - plays one animation at a time over the diode array
//!
//! The animator is driven by a periodic [`Animator::update`] call with the
//! elapsed time. When the animation duration elapses, its follow action
//! decides what happens next.

use crate::animation::AnimationId;
use crate::error::{Error, Result};
use crate::laser_array::DiodeArray;
use crate::log::{debug, error};

/// Shortest allowed animation duration in seconds
pub const MIN_DURATION: f32 = 0.01;

/// Longest allowed animation duration in seconds
pub const MAX_DURATION: f32 = 100.0;

const FOLLOW_ACTION_LOOP: u8 = 0;
const FOLLOW_ACTION_STOP_LAST_FRAME: u8 = 1;
const FOLLOW_ACTION_STOP_OFF: u8 = 2;
const FOLLOW_ACTION_STOP_PREVIOUS_STATE: u8 = 3;

/// What happens when an animation ends
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum FollowAction {
    /// Start over from the beginning
    #[default]
    Loop = FOLLOW_ACTION_LOOP,
    /// Stop and keep the final frame
    StopLastFrame = FOLLOW_ACTION_STOP_LAST_FRAME,
    /// Stop and turn every diode off
    StopOff = FOLLOW_ACTION_STOP_OFF,
    /// Stop and let the owner restore the brightness requested before or
    /// during the animation
    StopPreviousState = FOLLOW_ACTION_STOP_PREVIOUS_STATE,
}

impl FollowAction {
    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            FOLLOW_ACTION_LOOP => Self::Loop,
            FOLLOW_ACTION_STOP_LAST_FRAME => Self::StopLastFrame,
            FOLLOW_ACTION_STOP_OFF => Self::StopOff,
            FOLLOW_ACTION_STOP_PREVIOUS_STATE => Self::StopPreviousState,
            _ => return None,
        })
    }

    pub const fn as_raw(self) -> u8 {
        self as u8
    }
}

/// Clamp a duration into `[MIN_DURATION, MAX_DURATION]`
///
/// NaN is treated as the shortest duration.
pub fn clamp_duration(duration: f32) -> f32 {
    if duration.is_nan() {
        return MIN_DURATION;
    }
    duration.clamp(MIN_DURATION, MAX_DURATION)
}

/// Single slot animation player
#[derive(Debug, Clone)]
pub struct Animator {
    current_animation: AnimationId,
    duration: f32,
    follow_action: FollowAction,
    progress: f32,
    playing: bool,
    restore_required: bool,
}

impl Animator {
    pub const fn new() -> Self {
        Self {
            current_animation: AnimationId::Boot,
            duration: 1.0,
            follow_action: FollowAction::Loop,
            progress: 0.0,
            playing: false,
            restore_required: false,
        }
    }

    /// Start playing an animation, replacing the current one
    ///
    /// `duration` is in seconds and is clamped into the allowed range.
    pub fn play(&mut self, id: AnimationId, duration: f32, follow_action: FollowAction) {
        let duration = clamp_duration(duration);
        debug!(
            "Playing animation {} for {}s. Follow action: {}",
            id.as_raw(),
            duration,
            follow_action.as_raw()
        );

        self.current_animation = id;
        self.duration = duration;
        self.follow_action = follow_action;
        self.progress = 0.0;
        self.playing = true;
        self.restore_required = false;
    }

    /// Start playing an animation from raw wire values
    ///
    /// Unknown ids leave the animator untouched.
    pub fn play_raw(&mut self, id: u8, duration: f32, follow_action: u8) -> Result<()> {
        let Some(animation) = AnimationId::from_raw(id) else {
            error!("Invalid animation ID: {}", id);
            return Err(Error::InvalidAnimation { id });
        };
        let Some(action) = FollowAction::from_raw(follow_action) else {
            error!("Invalid follow action: {}", follow_action);
            return Err(Error::InvalidFollowAction { id: follow_action });
        };

        self.play(animation, duration, action);
        Ok(())
    }

    /// Stop the animation and run the terminal part of its follow action
    pub fn stop<A: DiodeArray + ?Sized>(&mut self, array: &mut A) {
        debug!(
            "Stopping animation {}. Running follow action: {}",
            self.current_animation.as_raw(),
            self.follow_action.as_raw()
        );

        self.progress = 1.0;
        self.playing = false;

        match self.follow_action {
            FollowAction::StopLastFrame => {
                self.current_animation.render(array, 1.0);
            }
            FollowAction::StopOff => {
                array.set_all(0);
            }
            FollowAction::StopPreviousState => {
                // The owner of the brightness snapshot restores it
                self.restore_required = true;
            }
            FollowAction::Loop => {}
        }
    }

    /// Advance the animation by `dt` seconds and render the frame
    pub fn update<A: DiodeArray + ?Sized>(&mut self, array: &mut A, dt: f32) {
        if !self.playing {
            return;
        }

        self.progress += dt / self.duration;

        let finished = self.progress >= 1.0;
        if finished {
            self.progress = 1.0;
        }

        self.current_animation.render(array, self.progress);

        if finished {
            if self.follow_action == FollowAction::Loop {
                self.progress = 0.0;
            } else {
                self.stop(array);
            }
        }
    }

    /// Check if a stopped animation asked for the previous state
    pub const fn is_restore_required(&self) -> bool {
        self.restore_required
    }

    /// Consume the restore request
    ///
    /// Returns `true` once per stop with [`FollowAction::StopPreviousState`].
    pub const fn take_restore_request(&mut self) -> bool {
        let required = self.restore_required;
        self.restore_required = false;
        required
    }

    pub const fn current_animation(&self) -> AnimationId {
        self.current_animation
    }

    /// Duration of the current animation in seconds
    pub const fn duration(&self) -> f32 {
        self.duration
    }

    pub const fn follow_action(&self) -> FollowAction {
        self.follow_action
    }

    /// Progress of the current animation (0.0-1.0)
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    pub const fn is_playing(&self) -> bool {
        self.playing
    }
}

impl Default for Animator {
    fn default() -> Self {
        Self::new()
    }
}
