//! Autosave: turns dispatch reports into outbox commands.

use tracing::debug;

use super::buffer::ActionBuffer;
use super::format::{ProgressPatch, SaveHeader, SaveId, StateSnapshot};
use super::outbox::{Outbox, OutboxCommand, PumpReport};
use super::store::SaveStore;
use crate::engine::{DispatchReport, GameState};
use crate::rng::RngState;

#[derive(Debug)]
pub struct AutoSaver {
    buffer: ActionBuffer,
    outbox: Outbox,
    /// Progress waiting for the events it covers to reach the outbox.
    staged: Option<(u64, ProgressPatch)>,
    retiring: bool,
    enabled: bool,
}

impl AutoSaver {
    /// New save for a game that is just starting. The create command is
    /// queued and delivered on the first pump.
    pub fn start(header: SaveHeader) -> Self {
        let mut outbox = Outbox::new();
        outbox.push(OutboxCommand::CreateSave { header });
        Self::with_outbox(ActionBuffer::new(0), outbox, true)
    }

    /// Continue an existing save whose log ends at `last_seq`.
    pub fn resume(save_id: SaveId, last_seq: u64) -> Self {
        Self::with_outbox(ActionBuffer::new(last_seq), Outbox::attached(save_id), true)
    }

    /// Autosaver that records nothing.
    pub fn disabled() -> Self {
        Self::with_outbox(ActionBuffer::default(), Outbox::new(), false)
    }

    fn with_outbox(buffer: ActionBuffer, outbox: Outbox, enabled: bool) -> Self {
        Self { buffer, outbox, staged: None, retiring: false, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn save_id(&self) -> Option<&SaveId> {
        self.outbox.save_id()
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn queued(&self) -> usize {
        self.outbox.len()
    }

    /// Anything not yet acknowledged by the store.
    pub fn has_pending(&self) -> bool {
        !self.outbox.is_empty() || !self.buffer.is_empty() || self.staged.is_some()
    }

    /// The game this saver belongs to is over for good (reset). Whatever is
    /// still buffered goes out on the next pump instead of waiting for a
    /// pitch that will never come.
    pub fn retire(&mut self) {
        self.retiring = true;
    }

    /// Feed one dispatch report. `state` and `rng` are the values after
    /// the action was applied.
    pub fn observe(&mut self, report: &DispatchReport, state: &GameState, rng: RngState) {
        if !self.enabled {
            return;
        }
        self.buffer.record(report.pitch_key_before, &report.action);

        // A caught stealing can end a half (or the game) without a pitch.
        let boundary = report.half_changed || report.game_over_now;
        if !report.advanced() && !boundary {
            return;
        }

        let mut patch = ProgressPatch::from_state(state);
        if boundary {
            patch = patch.with_snapshot(StateSnapshot {
                pitch_key: state.pitch_key,
                last_seq: self.buffer.last_seq(),
                state: state.clone(),
                rng,
            });
        }
        self.stage(state.pitch_key, patch);
        self.release();
    }

    fn stage(&mut self, pitch_key: u64, patch: ProgressPatch) {
        self.staged = Some(match self.staged.take() {
            Some((older_key, older)) => (pitch_key.max(older_key), older.merge(patch)),
            None => (pitch_key, patch),
        });
    }

    /// Move buffered events, then staged progress, into the outbox. Progress
    /// stays staged while any event it covers is still buffered.
    fn release(&mut self) {
        if let Some(events) = self.buffer.drain_for(self.outbox.save_id()) {
            debug!(count = events.len(), "flushing events");
            self.outbox.push(OutboxCommand::AppendEvents { events });
        }
        if self.buffer.is_empty() {
            if let Some((pitch_key, patch)) = self.staged.take() {
                self.outbox.push(OutboxCommand::UpdateProgress { pitch_key, patch });
            }
        }
    }

    /// Deliver queued commands. When this pump is the one that learns the
    /// save id, events buffered while the create was pending follow
    /// straight away instead of waiting for the next pitch.
    pub fn pump(&mut self, store: &mut dyn SaveStore) -> PumpReport {
        if self.retiring {
            self.release();
        }
        let had_id = self.outbox.save_id().is_some();
        let mut report = self.outbox.pump(store);
        if !had_id && self.outbox.save_id().is_some() && report.error.is_none() {
            self.release();
            if !self.outbox.is_empty() {
                let more = self.outbox.pump(store);
                report.delivered += more.delivered;
                report.remaining = more.remaining;
                report.error = more.error;
            }
        }
        report
    }
}
