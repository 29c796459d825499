//! A session wired to autosave.
//!
//! `LiveGame` forwards every dispatch report to its [`AutoSaver`] and pumps
//! the outbox after each call. Store failures are kept as a notice and never
//! interrupt play.

use tracing::warn;

use crate::engine::{DecisionChoice, GameSession, GameState, StepOutcome};
use crate::error::GameError;
use crate::save::{load_resume, AutoSaver, PumpReport, ResumeSource, SaveError, SaveHeader, SaveId, SaveStore};
use crate::scheduler::{Advance, AutoplayTarget, TargetStatus};

pub struct LiveGame<S: SaveStore> {
    session: GameSession,
    saver: AutoSaver,
    /// Savers of games replaced by `reset` that still owe the store work.
    retired: Vec<AutoSaver>,
    store: S,
    resumed_from: Option<ResumeSource>,
    save_notice: Option<String>,
}

impl<S: SaveStore> LiveGame<S> {
    /// Start a new game. With `autosave` the save is created on the first
    /// pump.
    pub fn start(store: S, session: GameSession, autosave: bool) -> Self {
        let saver = if autosave {
            AutoSaver::start(SaveHeader::new(session.seed(), session.setup().clone()))
        } else {
            AutoSaver::disabled()
        };
        let mut game = Self {
            session,
            saver,
            retired: Vec::new(),
            store,
            resumed_from: None,
            save_notice: None,
        };
        game.flush();
        game
    }

    /// Continue a stored game (see [`load_resume`] for the fallback order).
    pub fn resume(mut store: S, id: &SaveId) -> Result<Self, SaveError> {
        let point = load_resume(&mut store, id)?;
        let saver = AutoSaver::resume(point.save_id, point.next_seq - 1);
        Ok(Self {
            session: point.session,
            saver,
            retired: Vec::new(),
            store,
            resumed_from: Some(point.source),
            save_notice: None,
        })
    }

    pub fn with_bench(mut self, away: bool, home: bool) -> Self {
        self.session = self.session.with_bench(away, home);
        self
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn state(&self) -> &GameState {
        self.session.state()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn save_id(&self) -> Option<&SaveId> {
        self.saver.save_id()
    }

    pub fn resumed_from(&self) -> Option<&ResumeSource> {
        self.resumed_from.as_ref()
    }

    /// Player-facing text for the latest persistence failure, if any.
    pub fn save_notice(&self) -> Option<&str> {
        self.save_notice.as_deref()
    }

    pub fn step(&mut self) -> Result<StepOutcome, GameError> {
        let outcome = self.session.step()?;
        self.persist();
        Ok(outcome)
    }

    pub fn resolve_decision(&mut self, choice: DecisionChoice) -> Result<(), GameError> {
        self.session.resolve_decision(choice)?;
        self.persist();
        Ok(())
    }

    /// Start over with the same seed. The restarted game gets its own save.
    pub fn reset(&mut self) -> Result<(), GameError> {
        self.session.reset()?;
        self.session.drain_reports();
        if self.saver.is_enabled() {
            let fresh = AutoSaver::start(SaveHeader::new(
                self.session.seed(),
                self.session.setup().clone(),
            ));
            let mut previous = std::mem::replace(&mut self.saver, fresh);
            previous.retire();
            self.retired.push(previous);
        }
        self.flush();
        Ok(())
    }

    /// Retry anything still queued, oldest game first.
    pub fn flush(&mut self) -> PumpReport {
        let mut report = PumpReport::default();
        for saver in &mut self.retired {
            let older = saver.pump(&mut self.store);
            report.delivered += older.delivered;
            report.remaining += older.remaining;
            report.error = report.error.or(older.error);
        }
        self.retired.retain(|saver| saver.has_pending());

        let current = self.saver.pump(&mut self.store);
        report.delivered += current.delivered;
        report.remaining += current.remaining;
        report.error = report.error.or(current.error);
        if let Some(error) = &report.error {
            warn!(%error, remaining = report.remaining, "autosave behind");
        }
        self.save_notice = report.error.as_ref().map(SaveError::user_message);
        report
    }

    /// Hand new reports to the autosaver, then pump. Returns whether a
    /// half-inning ended.
    fn persist(&mut self) -> bool {
        let mut half_changed = false;
        for report in self.session.drain_reports() {
            half_changed |= report.half_changed;
            self.saver.observe(&report, self.session.state(), self.session.rng_state());
        }
        self.flush();
        half_changed
    }
}

impl<S: SaveStore> AutoplayTarget for LiveGame<S> {
    fn status(&self) -> TargetStatus {
        TargetStatus {
            game_over: self.session.state().game_over,
            decision_pending: self.session.pending_decision().is_some(),
            manager_mode: self.session.is_manager_mode(),
        }
    }

    fn advance(&mut self) -> Result<Advance, GameError> {
        let outcome = self.session.step()?;
        let half_changed = self.persist();
        Ok(Advance { pitched: matches!(outcome, StepOutcome::Pitched(_)), half_changed })
    }
}
