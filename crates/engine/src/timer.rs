//! Per-turn countdown timer.
//!
//! The timer is tick-driven by an external one-second scheduler. Expiry is
//! reported as an explicit [`TimerEvent`] for the engine to consume; the
//! timer never reaches into the scheduler itself.

use crease_types::TeamId;

/// Emitted when the countdown reaches zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// The turn holder ran out of time; the engine passes on their behalf.
    TurnTimedOut(TeamId),
    /// No turn holder was set when the countdown expired; the engine
    /// closes bidding directly.
    BiddingTimedOut,
}

/// Countdown over the current turn.
#[derive(Debug)]
pub struct CountdownTimer {
    duration_secs: u32,
    remaining_secs: u32,
    enabled: bool,
}

impl CountdownTimer {
    pub fn new(duration_secs: u32, enabled: bool) -> Self {
        Self {
            duration_secs,
            remaining_secs: duration_secs,
            enabled,
        }
    }

    /// Reload the countdown from the configured duration. Called on round
    /// start and on every turn transition.
    pub fn arm(&mut self) {
        self.remaining_secs = self.duration_secs;
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Set the duration used for future arms. Not retroactive to the
    /// currently running countdown.
    pub fn set_duration(&mut self, duration_secs: u32) {
        self.duration_secs = duration_secs;
    }

    /// Disabling freezes the displayed countdown; re-enabling resumes
    /// from the frozen value.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Advance the countdown by one second.
    ///
    /// Returns an event exactly when the countdown crosses to zero. Once
    /// zeroed the timer stays silent until re-armed, so a stalled round
    /// transition cannot generate repeated forced passes.
    pub fn tick(&mut self, turn: Option<&TeamId>) -> Option<TimerEvent> {
        if !self.enabled {
            return None;
        }
        if self.remaining_secs > 1 {
            self.remaining_secs -= 1;
            return None;
        }
        if self.remaining_secs == 0 {
            return None;
        }
        self.remaining_secs = 0;
        Some(match turn {
            Some(team) => TimerEvent::TurnTimedOut(team.clone()),
            None => TimerEvent::BiddingTimedOut,
        })
    }
}
