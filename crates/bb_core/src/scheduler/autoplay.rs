//! Autoplay state machine.
//!
//! At most one timer is armed at a time, identified by its handle.
//! Cancelling clears the handle, so a callback that fires late sees a
//! mismatch and does nothing. Whether the loop should run is recomputed
//! from [`SchedulerInputs`] on every `sync`, never remembered.

use tracing::{debug, warn};

use crate::config::PacingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerInputs {
    pub autoplay: bool,
    pub game_over: bool,
    pub decision_pending: bool,
    pub manager_mode: bool,
}

/// The run/stop condition.
pub fn should_run(inputs: &SchedulerInputs) -> bool {
    inputs.autoplay && !inputs.game_over && !(inputs.decision_pending && inputs.manager_mode)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPurpose {
    Pitch,
    SpeechPoll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub handle: u64,
    pub due_ms: u64,
    pub purpose: TimerPurpose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    Idle,
    Armed(Timer),
    /// A pitch is being resolved.
    Fired,
    /// Waiting on a manager decision.
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Stale or cancelled timer.
    Ignore,
    /// Speech still playing; a poll timer was armed.
    Repoll,
    /// Resolve one pitch now, then call [`AutoplayScheduler::complete`].
    Fire,
}

#[derive(Debug, Clone)]
pub struct AutoplayScheduler {
    pacing: PacingConfig,
    muted: bool,
    phase: SchedulerPhase,
    next_handle: u64,
    speech_wait_started: Option<u64>,
    inning_pause_pending: bool,
}

impl AutoplayScheduler {
    pub fn new(pacing: PacingConfig, muted: bool) -> Self {
        Self {
            pacing,
            muted,
            phase: SchedulerPhase::Idle,
            next_handle: 0,
            speech_wait_started: None,
            inning_pause_pending: false,
        }
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    pub fn armed(&self) -> Option<Timer> {
        match self.phase {
            SchedulerPhase::Armed(timer) => Some(timer),
            _ => None,
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Record that the last pitch ended a half-inning.
    pub fn note_half_changed(&mut self) {
        self.inning_pause_pending = true;
    }

    /// Bring the phase in line with `inputs`: arm a pitch timer when the
    /// loop should run and nothing is armed, drop any timer when it should
    /// not.
    pub fn sync(&mut self, inputs: &SchedulerInputs, now_ms: u64) {
        if !should_run(inputs) {
            self.cancel();
            if inputs.autoplay && !inputs.game_over {
                self.phase = SchedulerPhase::Paused;
            }
            return;
        }
        match self.phase {
            SchedulerPhase::Armed(_) | SchedulerPhase::Fired => {}
            SchedulerPhase::Idle | SchedulerPhase::Paused => self.arm_pitch(now_ms),
        }
    }

    /// Drop the armed timer, if any. Returns its handle.
    pub fn cancel(&mut self) -> Option<u64> {
        let cancelled = self.armed().map(|t| t.handle);
        self.phase = SchedulerPhase::Idle;
        self.speech_wait_started = None;
        if let Some(handle) = cancelled {
            debug!(handle, "autoplay timer cancelled");
        }
        cancelled
    }

    /// A timer fired.
    pub fn on_timer(
        &mut self,
        handle: u64,
        now_ms: u64,
        inputs: &SchedulerInputs,
        speech_pending: bool,
    ) -> TimerAction {
        match self.phase {
            SchedulerPhase::Armed(timer) if timer.handle == handle => {}
            _ => return TimerAction::Ignore,
        }
        if !should_run(inputs) {
            self.sync(inputs, now_ms);
            return TimerAction::Ignore;
        }

        if !self.muted && speech_pending {
            let started = *self.speech_wait_started.get_or_insert(now_ms);
            let waited = now_ms.saturating_sub(started);
            if waited < self.pacing.speech_max_wait_ms {
                self.arm(now_ms + self.pacing.speech_poll_ms, TimerPurpose::SpeechPoll);
                return TimerAction::Repoll;
            }
            warn!(waited_ms = waited, "speech still pending; continuing without it");
        }

        self.speech_wait_started = None;
        self.phase = SchedulerPhase::Fired;
        TimerAction::Fire
    }

    /// The fired pitch has been applied; re-arm from the new inputs.
    pub fn complete(&mut self, inputs: &SchedulerInputs, now_ms: u64) {
        if self.phase == SchedulerPhase::Fired {
            self.phase = SchedulerPhase::Idle;
        }
        self.sync(inputs, now_ms);
    }

    fn arm_pitch(&mut self, now_ms: u64) {
        let mut delay = self.pacing.interval_ms();
        if self.inning_pause_pending {
            if self.muted {
                delay += self.pacing.inning_pause_ms;
            }
            self.inning_pause_pending = false;
        }
        self.arm(now_ms + delay, TimerPurpose::Pitch);
    }

    fn arm(&mut self, due_ms: u64, purpose: TimerPurpose) {
        self.next_handle += 1;
        self.phase = SchedulerPhase::Armed(Timer { handle: self.next_handle, due_ms, purpose });
    }
}
