//! Outbound persistence queue.
//!
//! Commands are delivered head-first. A failing command stays at the head
//! and is retried on the next pump, so delivery is at-least-once and in
//! order. Every command is safe to repeat against a [`SaveStore`].

use std::collections::VecDeque;

use tracing::{debug, warn};

use super::error::SaveError;
use super::format::{GameEvent, ProgressPatch, SaveHeader, SaveId};
use super::store::SaveStore;

#[derive(Debug, Clone, PartialEq)]
pub enum OutboxCommand {
    CreateSave { header: SaveHeader },
    AppendEvents { events: Vec<GameEvent> },
    UpdateProgress { pitch_key: u64, patch: ProgressPatch },
}

impl OutboxCommand {
    fn name(&self) -> &'static str {
        match self {
            OutboxCommand::CreateSave { .. } => "create_save",
            OutboxCommand::AppendEvents { .. } => "append_events",
            OutboxCommand::UpdateProgress { .. } => "update_progress",
        }
    }
}

#[derive(Debug, Default)]
pub struct PumpReport {
    pub delivered: usize,
    pub remaining: usize,
    /// Error that stopped this pump, if any.
    pub error: Option<SaveError>,
}

#[derive(Debug, Default)]
pub struct Outbox {
    queue: VecDeque<OutboxCommand>,
    save_id: Option<SaveId>,
    consecutive_failures: u32,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outbox for a save that already exists.
    pub fn attached(save_id: SaveId) -> Self {
        Self { save_id: Some(save_id), ..Self::default() }
    }

    pub fn save_id(&self) -> Option<&SaveId> {
        self.save_id.as_ref()
    }

    /// Queue a command. At most one progress update is ever queued and it
    /// stays behind every queued event batch, so a delivered snapshot never
    /// refers to events the store has not received. Event batches pushed
    /// back to back are joined.
    pub fn push(&mut self, command: OutboxCommand) {
        match command {
            OutboxCommand::UpdateProgress { mut pitch_key, mut patch } => {
                let queued = self
                    .queue
                    .iter()
                    .position(|c| matches!(c, OutboxCommand::UpdateProgress { .. }));
                if let Some(OutboxCommand::UpdateProgress { pitch_key: older_key, patch: older }) =
                    queued.and_then(|pos| self.queue.remove(pos))
                {
                    pitch_key = pitch_key.max(older_key);
                    patch = older.merge(patch);
                }
                self.queue.push_back(OutboxCommand::UpdateProgress { pitch_key, patch });
            }
            OutboxCommand::AppendEvents { events } => {
                let tail = self
                    .queue
                    .iter_mut()
                    .rev()
                    .find(|c| !matches!(c, OutboxCommand::UpdateProgress { .. }));
                match tail {
                    Some(OutboxCommand::AppendEvents { events: batch }) => batch.extend(events),
                    _ => self.queue.push_back(OutboxCommand::AppendEvents { events }),
                }
            }
            create => self.queue.push_back(create),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Deliver queued commands until the queue is empty or one fails.
    pub fn pump(&mut self, store: &mut dyn SaveStore) -> PumpReport {
        let mut report = PumpReport::default();

        while let Some(command) = self.queue.front() {
            let result = match command {
                OutboxCommand::CreateSave { header } => match store.create_save(header.clone()) {
                    Ok(id) => {
                        self.save_id = Some(id);
                        Ok(())
                    }
                    Err(e) => Err(e),
                },
                OutboxCommand::AppendEvents { events } => match &self.save_id {
                    Some(id) => store.append_events(id, events).map(|_| ()),
                    // Waiting on a create that has not been queued yet.
                    None => break,
                },
                OutboxCommand::UpdateProgress { pitch_key, patch } => match &self.save_id {
                    Some(id) => store.update_progress(id, *pitch_key, patch.clone()),
                    None => break,
                },
            };

            match result {
                Ok(()) => {
                    debug!(command = command_name(&self.queue), "outbox delivered");
                    self.queue.pop_front();
                    self.consecutive_failures = 0;
                    report.delivered += 1;
                }
                Err(error) => {
                    self.consecutive_failures += 1;
                    warn!(
                        command = command_name(&self.queue),
                        failures = self.consecutive_failures,
                        %error,
                        "persistence failed; will retry"
                    );
                    report.error = Some(error);
                    break;
                }
            }
        }

        report.remaining = self.queue.len();
        report
    }
}

fn command_name(queue: &VecDeque<OutboxCommand>) -> &'static str {
    queue.front().map(OutboxCommand::name).unwrap_or("none")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GameAction;
    use crate::models::{GameSetup, PitchType, TeamInfo};
    use crate::rng::Seed;
    use crate::save::store::MemoryStore;

    fn header() -> SaveHeader {
        SaveHeader::new(
            Seed::from_value(11),
            GameSetup::new(TeamInfo::new("rav", "Ravens"), TeamInfo::new("owl", "Owls")),
        )
    }

    fn events(seqs: &[u64]) -> Vec<GameEvent> {
        seqs.iter()
            .map(|&s| GameEvent::new(s, s - 1, GameAction::Wait { pitch: PitchType::Fastball }))
            .collect()
    }

    #[test]
    fn test_delivers_in_order() {
        let mut store = MemoryStore::new();
        let mut outbox = Outbox::new();
        outbox.push(OutboxCommand::CreateSave { header: header() });
        outbox.push(OutboxCommand::AppendEvents { events: events(&[1, 2]) });
        let report = outbox.pump(&mut store);
        assert_eq!(report.delivered, 2);
        assert!(outbox.is_empty());
        let id = outbox.save_id().unwrap().clone();
        assert_eq!(store.load(&id).unwrap().events.len(), 2);
    }

    #[test]
    fn test_failed_head_retried() {
        let mut store = MemoryStore::new();
        let mut outbox = Outbox::new();
        outbox.push(OutboxCommand::CreateSave { header: header() });
        outbox.push(OutboxCommand::AppendEvents { events: events(&[1]) });

        store.fail_next(1);
        let report = outbox.pump(&mut store);
        assert_eq!(report.delivered, 0);
        assert_eq!(report.remaining, 2);
        assert!(report.error.map(|e| e.is_transient()).unwrap_or(false));
        assert_eq!(outbox.consecutive_failures(), 1);

        let report = outbox.pump(&mut store);
        assert_eq!(report.delivered, 2);
        assert_eq!(outbox.consecutive_failures(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_retry_after_partial_delivery_does_not_duplicate() {
        let mut store = MemoryStore::new();
        let mut outbox = Outbox::new();
        outbox.push(OutboxCommand::CreateSave { header: header() });
        outbox.pump(&mut store);
        let id = outbox.save_id().unwrap().clone();

        // Same batch queued twice, as after a lost acknowledgement.
        outbox.push(OutboxCommand::AppendEvents { events: events(&[1, 2]) });
        outbox.push(OutboxCommand::AppendEvents { events: events(&[1, 2, 3]) });
        outbox.pump(&mut store);
        let seqs: Vec<u64> = store.load(&id).unwrap().events.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    fn progress(score: u16) -> ProgressPatch {
        ProgressPatch { score: Some([score, 0]), ..Default::default() }
    }

    #[test]
    fn test_progress_collapses_behind_events() {
        let mut store = MemoryStore::new();
        let mut outbox = Outbox::new();
        outbox.push(OutboxCommand::CreateSave { header: header() });
        outbox.pump(&mut store);
        let id = outbox.save_id().unwrap().clone();

        store.fail_next(100);
        for seq in 1..=50u64 {
            outbox.push(OutboxCommand::AppendEvents { events: events(&[seq]) });
            outbox.push(OutboxCommand::UpdateProgress { pitch_key: seq, patch: progress(seq as u16) });
            outbox.pump(&mut store);
        }
        assert_eq!(outbox.len(), 2);
        assert!(matches!(outbox.queue.back(), Some(OutboxCommand::UpdateProgress { pitch_key: 50, .. })));

        store.fail_next(0);
        outbox.pump(&mut store);
        let doc = store.load(&id).unwrap();
        assert_eq!(doc.events.len(), 50);
        assert_eq!(doc.progress.pitch_key, 50);
        assert_eq!(doc.progress.score, [50, 0]);
    }

    #[test]
    fn test_failed_append_holds_back_progress() {
        let mut store = MemoryStore::new();
        let mut outbox = Outbox::new();
        outbox.push(OutboxCommand::CreateSave { header: header() });
        outbox.pump(&mut store);
        let id = outbox.save_id().unwrap().clone();

        outbox.push(OutboxCommand::AppendEvents { events: events(&[1, 2]) });
        outbox.push(OutboxCommand::UpdateProgress { pitch_key: 2, patch: progress(1) });
        store.fail_next(1);
        let report = outbox.pump(&mut store);
        assert_eq!(report.delivered, 0);
        let doc = store.load(&id).unwrap();
        assert!(doc.events.is_empty());
        assert_eq!(doc.progress.pitch_key, 0);
    }

    #[test]
    fn test_waits_without_save_id() {
        let mut store = MemoryStore::new();
        let mut outbox = Outbox::new();
        outbox.push(OutboxCommand::AppendEvents { events: events(&[1]) });
        let report = outbox.pump(&mut store);
        assert_eq!(report.delivered, 0);
        assert_eq!(report.remaining, 1);
        assert!(report.error.is_none());
    }
}
