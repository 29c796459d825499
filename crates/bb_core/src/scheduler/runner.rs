//! Cooperative autoplay loop.

use tracing::{debug, info};

use super::autoplay::{AutoplayScheduler, SchedulerInputs, TimerAction};
use super::clock::{CancelToken, Clock, SpeechGate};
use crate::error::GameError;

/// What the loop needs to know about the game it drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TargetStatus {
    pub game_over: bool,
    pub decision_pending: bool,
    pub manager_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Advance {
    /// A pitch was thrown (as opposed to a decision being surfaced).
    pub pitched: bool,
    pub half_changed: bool,
}

pub trait AutoplayTarget {
    fn status(&self) -> TargetStatus;

    /// Advance by one scheduler tick.
    fn advance(&mut self) -> Result<Advance, GameError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayStop {
    GameOver,
    DecisionPending,
    Cancelled,
    StepLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoplayReport {
    pub steps: usize,
    pub pitches: usize,
    pub speech_polls: usize,
    pub stop: AutoplayStop,
}

fn inputs_for(status: TargetStatus) -> SchedulerInputs {
    SchedulerInputs {
        autoplay: true,
        game_over: status.game_over,
        decision_pending: status.decision_pending,
        manager_mode: status.manager_mode,
    }
}

/// Drive `target` until it finishes, blocks on a decision, is cancelled, or
/// `max_steps` ticks have run. Call again after a decision is resolved; the
/// scheduler re-arms from the new status.
pub fn run_autoplay(
    target: &mut dyn AutoplayTarget,
    clock: &mut dyn Clock,
    speech: &dyn SpeechGate,
    scheduler: &mut AutoplayScheduler,
    cancel: &CancelToken,
    max_steps: usize,
) -> Result<AutoplayReport, GameError> {
    let mut steps = 0;
    let mut pitches = 0;
    let mut speech_polls = 0;

    let stop = loop {
        if cancel.is_cancelled() {
            break AutoplayStop::Cancelled;
        }
        if steps >= max_steps {
            break AutoplayStop::StepLimit;
        }

        let status = target.status();
        scheduler.sync(&inputs_for(status), clock.now_ms());
        let Some(timer) = scheduler.armed() else {
            break if status.game_over {
                AutoplayStop::GameOver
            } else {
                AutoplayStop::DecisionPending
            };
        };

        clock.sleep_until(timer.due_ms);
        if cancel.is_cancelled() {
            break AutoplayStop::Cancelled;
        }

        let status = target.status();
        let action = scheduler.on_timer(
            timer.handle,
            clock.now_ms(),
            &inputs_for(status),
            speech.is_speech_pending(),
        );
        match action {
            TimerAction::Ignore => {}
            TimerAction::Repoll => speech_polls += 1,
            TimerAction::Fire => {
                let advance = target.advance()?;
                steps += 1;
                if advance.pitched {
                    pitches += 1;
                }
                if advance.half_changed {
                    scheduler.note_half_changed();
                }
                scheduler.complete(&inputs_for(target.status()), clock.now_ms());
            }
        }
    };

    if stop == AutoplayStop::Cancelled {
        scheduler.cancel();
        speech.cancel_announcements();
    }
    debug!(steps, pitches, speech_polls, ?stop, "autoplay stopped");
    if stop == AutoplayStop::GameOver {
        info!(pitches, "autoplay finished the game");
    }
    Ok(AutoplayReport { steps, pitches, speech_polls, stop })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PacingConfig;
    use crate::scheduler::clock::{ManualClock, ScriptedSpeech, SilentSpeech};

    /// Counts pitches; ends after `length`, asks for a decision at `decide_at`.
    struct Counter {
        pitched: usize,
        length: usize,
        decide_at: Option<usize>,
        pending: bool,
        cancel_at: Option<(usize, CancelToken)>,
    }

    impl Counter {
        fn new(length: usize) -> Self {
            Self { pitched: 0, length, decide_at: None, pending: false, cancel_at: None }
        }
    }

    impl AutoplayTarget for Counter {
        fn status(&self) -> TargetStatus {
            TargetStatus {
                game_over: self.pitched >= self.length,
                decision_pending: self.pending,
                manager_mode: true,
            }
        }

        fn advance(&mut self) -> Result<Advance, GameError> {
            if self.decide_at == Some(self.pitched) {
                self.decide_at = None;
                self.pending = true;
                return Ok(Advance::default());
            }
            self.pitched += 1;
            if let Some((at, token)) = &self.cancel_at {
                if *at == self.pitched {
                    token.cancel();
                }
            }
            Ok(Advance { pitched: true, half_changed: self.pitched % 3 == 0 })
        }
    }

    fn pacing() -> PacingConfig {
        PacingConfig::default()
    }

    #[test]
    fn test_runs_to_completion_with_pacing() {
        let mut target = Counter::new(6);
        let mut clock = ManualClock::new();
        let mut scheduler = AutoplayScheduler::new(pacing(), true);
        let report = run_autoplay(
            &mut target,
            &mut clock,
            &SilentSpeech,
            &mut scheduler,
            &CancelToken::new(),
            100,
        )
        .unwrap();
        assert_eq!(report.stop, AutoplayStop::GameOver);
        assert_eq!(report.pitches, 6);
        // Six intervals plus one inning pause (after pitch 3; pitch 6 ends it).
        assert_eq!(clock.now_ms(), 6 * 1200 + 1500);
    }

    #[test]
    fn test_halts_on_decision_and_restarts() {
        let mut target = Counter::new(4);
        target.decide_at = Some(2);
        let mut clock = ManualClock::new();
        let mut scheduler = AutoplayScheduler::new(pacing(), true);
        let cancel = CancelToken::new();

        let report =
            run_autoplay(&mut target, &mut clock, &SilentSpeech, &mut scheduler, &cancel, 100)
                .unwrap();
        assert_eq!(report.stop, AutoplayStop::DecisionPending);
        assert_eq!(target.pitched, 2);
        assert!(scheduler.armed().is_none());

        target.pending = false;
        let report =
            run_autoplay(&mut target, &mut clock, &SilentSpeech, &mut scheduler, &cancel, 100)
                .unwrap();
        assert_eq!(report.stop, AutoplayStop::GameOver);
        assert_eq!(target.pitched, 4);
    }

    #[test]
    fn test_cancel_stops_before_next_pitch() {
        let token = CancelToken::new();
        let mut target = Counter::new(50);
        target.cancel_at = Some((5, token.clone()));
        let mut clock = ManualClock::new();
        let speech = ScriptedSpeech::busy_for(0);
        let mut scheduler = AutoplayScheduler::new(pacing(), true);

        let report =
            run_autoplay(&mut target, &mut clock, &speech, &mut scheduler, &token, 100).unwrap();
        assert_eq!(report.stop, AutoplayStop::Cancelled);
        assert_eq!(target.pitched, 5);
        assert!(scheduler.armed().is_none());
        assert!(speech.was_cancelled());
    }

    #[test]
    fn test_stuck_speech_fails_open() {
        let mut target = Counter::new(1);
        let mut clock = ManualClock::new();
        let speech = ScriptedSpeech::busy_for(u32::MAX);
        let mut scheduler = AutoplayScheduler::new(pacing(), false);

        let report = run_autoplay(
            &mut target,
            &mut clock,
            &speech,
            &mut scheduler,
            &CancelToken::new(),
            10,
        )
        .unwrap();
        assert_eq!(report.stop, AutoplayStop::GameOver);
        assert_eq!(report.speech_polls, 27);
    }

    #[test]
    fn test_step_limit() {
        let mut target = Counter::new(50);
        let mut clock = ManualClock::new();
        let mut scheduler = AutoplayScheduler::new(pacing(), true);
        let report = run_autoplay(
            &mut target,
            &mut clock,
            &SilentSpeech,
            &mut scheduler,
            &CancelToken::new(),
            3,
        )
        .unwrap();
        assert_eq!(report.stop, AutoplayStop::StepLimit);
        assert_eq!(report.steps, 3);
    }
}
