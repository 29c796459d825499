//! Game session: the explicit context every pitch runs against.
//!
//! A session owns the live state, the seeded generator and the setup. It is
//! the only caller of the reducer, and because every entry point takes
//! `&mut self` no dispatch can start while another one is in progress.

use tracing::debug;

use super::action::GameAction;
use super::decision::{detect_decision, Decision, DecisionContext};
use super::invariants;
use super::pitch::{resolve_bunt, resolve_pitch, resolve_steal, PitchContext, PitchOutcome};
use super::state::GameState;
use crate::error::GameError;
use crate::models::{GameSetup, OnePitchModifier, Strategy, TeamSide};
use crate::rng::{RngState, Seed, SeededRng};

/// Strategy used when a pinch hitter is accepted without naming one.
pub const DEFAULT_PINCH_STRATEGY: Strategy = Strategy::Contact;

// ============================================
// Results
// ============================================

/// What one dispatched action did to the state.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    pub action: GameAction,
    /// Pitch key when the action was applied (the log position it belongs to).
    pub pitch_key_before: u64,
    pub pitch_key_after: u64,
    pub half_changed: bool,
    pub game_over_now: bool,
}

impl DispatchReport {
    pub fn advanced(&self) -> bool {
        self.pitch_key_after > self.pitch_key_before
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// One pitch resolved and applied.
    Pitched(PitchOutcome),
    /// A decision was just surfaced; play halts until it is resolved.
    DecisionRequired(Decision),
    /// A decision surfaced earlier is still unresolved.
    Blocked(Decision),
    GameOver,
}

/// The manager's answer to a pending decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionChoice {
    Skip,
    /// Take the offered play (steal, bunt, walk, shift; first count option;
    /// pinch hitter with [`DEFAULT_PINCH_STRATEGY`]).
    Accept,
    PinchHitter(Strategy),
    OnePitch(OnePitchModifier),
}

impl DecisionChoice {
    fn as_str(self) -> &'static str {
        match self {
            DecisionChoice::Skip => "skip",
            DecisionChoice::Accept => "accept",
            DecisionChoice::PinchHitter(_) => "pinch_hitter",
            DecisionChoice::OnePitch(_) => "one_pitch",
        }
    }
}

// ============================================
// Session
// ============================================

#[derive(Debug, Clone)]
pub struct GameSession {
    seed: Seed,
    setup: GameSetup,
    state: GameState,
    rng: SeededRng,
    bench_available: [bool; 2],
    reports: Vec<DispatchReport>,
}

impl GameSession {
    pub fn new(seed: Seed, setup: GameSetup) -> Self {
        let mut state = GameState::default();
        // SetTeams never fails on a fresh state.
        let _ = state.apply(&GameAction::SetTeams {
            away: setup.away.clone(),
            home: setup.home.clone(),
        });
        Self {
            seed,
            rng: SeededRng::from_seed(&seed),
            setup,
            state,
            bench_available: [false, false],
            reports: Vec::new(),
        }
    }

    /// Resume from a snapshot without replaying the log.
    pub fn restore(seed: Seed, setup: GameSetup, state: GameState, rng: RngState) -> Self {
        let mut session = Self::new(seed, setup);
        // RestoreGame replaces the whole state and never fails.
        let _ = session.state.apply(&GameAction::RestoreGame(Box::new(state)));
        session.rng = SeededRng::from_state(rng);
        session
    }

    /// Rebuild a session from a logged action sequence by running the
    /// generator alongside it, so the generator ends where the live game
    /// left it. Stops at the first action the generator does not reproduce.
    /// Returns the session and how many actions were replayed.
    pub fn replay<'a, I>(seed: Seed, setup: GameSetup, actions: I) -> (Self, usize)
    where
        I: IntoIterator<Item = &'a GameAction>,
    {
        let mut session = Self::new(seed, setup);
        let mut replayed = 0;
        for action in actions {
            if !session.replay_one(action) {
                break;
            }
            replayed += 1;
        }
        session.reports.clear();
        (session, replayed)
    }

    fn replay_one(&mut self, action: &GameAction) -> bool {
        let saved = self.rng.clone();
        let regenerated = match action {
            _ if action.kind().is_pitch() => {
                resolve_pitch(&self.pitch_context(), &mut self.rng).to_action()
            }
            GameAction::StealAttempt { base, .. } => match &self.state.pending_decision {
                Some(Decision::Steal { success_pm, .. }) => GameAction::StealAttempt {
                    base: *base,
                    successful: resolve_steal(*success_pm, &mut self.rng),
                },
                _ => return false,
            },
            GameAction::BuntAttempt { .. } => {
                GameAction::BuntAttempt { outcome: resolve_bunt(&mut self.rng) }
            }
            other => other.clone(),
        };
        if regenerated != *action || self.dispatch(regenerated).is_err() {
            self.rng = saved;
            return false;
        }
        true
    }

    pub fn with_bench(mut self, away: bool, home: bool) -> Self {
        self.bench_available = [away, home];
        self
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    pub fn setup(&self) -> &GameSetup {
        &self.setup
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn rng_state(&self) -> RngState {
        self.rng.state()
    }

    pub fn is_manager_mode(&self) -> bool {
        self.setup.manager.is_some()
    }

    pub fn pending_decision(&self) -> Option<&Decision> {
        self.state.pending_decision.as_ref()
    }

    /// Batting strategy with any pinch-hitter override applied.
    pub fn effective_strategy(&self) -> Strategy {
        self.state
            .pinch_hitter_strategy
            .unwrap_or_else(|| self.setup.strategy(self.state.batting()))
    }

    fn pitch_context(&self) -> PitchContext {
        PitchContext {
            count: self.state.count,
            strategy: self.effective_strategy(),
            modifier: self.state.one_pitch_modifier,
            defensive_shift: self.state.defensive_shift,
            runner_on_first: self.state.bases.first,
            outs: self.state.outs,
        }
    }

    /// Decision the managed club would be offered before the next pitch.
    pub fn check_decision(&self) -> Option<Decision> {
        let managed = self.setup.managed_team()?;
        let batting = self.state.batting();
        let ctx = DecisionContext {
            managed,
            batting_strategy: self.setup.strategy(batting),
            bench_available: self.bench_available[batting.index()],
        };
        detect_decision(&self.state, &ctx, !self.state.game_over)
    }

    /// Advance by one unit: surface a decision, or resolve one pitch.
    pub fn step(&mut self) -> Result<StepOutcome, GameError> {
        if self.state.game_over {
            return Ok(StepOutcome::GameOver);
        }
        if let Some(pending) = &self.state.pending_decision {
            return Ok(StepOutcome::Blocked(pending.clone()));
        }

        if let Some(decision) = self.check_decision() {
            debug!(kind = decision.class().as_str(), pitch_key = self.state.pitch_key, "decision offered");
            self.dispatch(GameAction::SetPendingDecision(decision.clone()))?;
            return Ok(StepOutcome::DecisionRequired(decision));
        }

        let outcome = resolve_pitch(&self.pitch_context(), &mut self.rng);
        debug!(
            pitch_key = self.state.pitch_key,
            pitch = outcome.pitch.as_str(),
            swing_rate = outcome.swing_rate,
            result = ?outcome.result,
            "pitch resolved"
        );
        self.dispatch(outcome.to_action())?;
        Ok(StepOutcome::Pitched(outcome))
    }

    /// Answer the pending decision. Accepted steals and bunts draw from the
    /// generator here.
    pub fn resolve_decision(&mut self, choice: DecisionChoice) -> Result<(), GameError> {
        let pending = self.state.pending_decision.clone().ok_or(GameError::NoPendingDecision)?;
        let mismatch = || GameError::DecisionMismatch {
            pending: pending.class().as_str(),
            offered: choice.as_str(),
        };

        let action = match (choice, &pending) {
            (DecisionChoice::Skip, _) => GameAction::SkipDecision,
            (DecisionChoice::Accept, Decision::Steal { base, success_pm }) => {
                let successful = resolve_steal(*success_pm, &mut self.rng);
                GameAction::StealAttempt { base: *base, successful }
            }
            (DecisionChoice::Accept, Decision::Bunt) => {
                GameAction::BuntAttempt { outcome: resolve_bunt(&mut self.rng) }
            }
            (DecisionChoice::Accept, Decision::IntentionalWalk) => GameAction::IntentionalWalk,
            (DecisionChoice::Accept, Decision::DefensiveShift) => GameAction::SetDefensiveShift(true),
            (DecisionChoice::Accept, Decision::PinchHitter) => {
                GameAction::SetPinchHitterStrategy(DEFAULT_PINCH_STRATEGY)
            }
            (DecisionChoice::PinchHitter(strategy), Decision::PinchHitter) => {
                GameAction::SetPinchHitterStrategy(strategy)
            }
            (DecisionChoice::Accept, Decision::CountBased { options }) => {
                let first = options.first().copied().ok_or_else(mismatch)?;
                GameAction::SetOnePitchModifier(first)
            }
            (DecisionChoice::OnePitch(modifier), Decision::CountBased { options })
                if options.contains(&modifier) =>
            {
                GameAction::SetOnePitchModifier(modifier)
            }
            _ => return Err(mismatch()),
        };

        debug!(kind = pending.class().as_str(), choice = choice.as_str(), "decision resolved");
        self.dispatch(action)?;
        Ok(())
    }

    /// Apply one action through the reducer and record what it did.
    pub fn dispatch(&mut self, action: GameAction) -> Result<DispatchReport, GameError> {
        let pitch_key_before = self.state.pitch_key;
        let marker_before = self.state.half_marker();
        let was_over = self.state.game_over;

        self.state.apply(&action)?;
        invariants::debug_check(&self.state);

        let report = DispatchReport {
            action,
            pitch_key_before,
            pitch_key_after: self.state.pitch_key,
            half_changed: self.state.half_marker() != marker_before,
            game_over_now: !was_over && self.state.game_over,
        };
        self.reports.push(report.clone());
        Ok(report)
    }

    /// Reports recorded since the last drain, oldest first.
    pub fn drain_reports(&mut self) -> Vec<DispatchReport> {
        std::mem::take(&mut self.reports)
    }

    /// Start over with the same seed and setup.
    pub fn reset(&mut self) -> Result<(), GameError> {
        self.dispatch(GameAction::Reset)?;
        self.rng = SeededRng::from_seed(&self.seed);
        Ok(())
    }

    /// Play to the end, answering every decision with `choose`.
    pub fn play_out<F>(&mut self, max_steps: usize, mut choose: F) -> Result<usize, GameError>
    where
        F: FnMut(&Decision) -> DecisionChoice,
    {
        let mut steps = 0;
        while steps < max_steps {
            match self.step()? {
                StepOutcome::GameOver => break,
                StepOutcome::Pitched(_) => {}
                StepOutcome::DecisionRequired(decision) | StepOutcome::Blocked(decision) => {
                    self.resolve_decision(choose(&decision))?;
                }
            }
            steps += 1;
        }
        Ok(steps)
    }

    pub fn managed_side(&self) -> Option<TeamSide> {
        self.setup.managed_team()
    }

    pub fn decision_is_defensive(&self) -> bool {
        self.state
            .pending_decision
            .as_ref()
            .map(|d| d.class().is_defensive())
            .unwrap_or(false)
    }
}
