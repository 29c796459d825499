//! Client-side action buffer.
//!
//! Persisted actions accumulate here tagged with the pitch key at which they
//! happened. The buffer is drained in one `mem::take` when the pitch key
//! advances, so a reader sees either every buffered event or none.

use std::mem;

use super::format::{GameEvent, SaveId};
use crate::engine::GameAction;

#[derive(Debug, Clone)]
pub struct ActionBuffer {
    pending: Vec<GameEvent>,
    next_seq: u64,
}

impl Default for ActionBuffer {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ActionBuffer {
    /// `last_seq` is the highest seq already stored for this save.
    pub fn new(last_seq: u64) -> Self {
        Self { pending: Vec::new(), next_seq: last_seq + 1 }
    }

    /// Buffer `action` if it is on the persisted allow-list. Returns its seq.
    pub fn record(&mut self, at: u64, action: &GameAction) -> Option<u64> {
        if !action.is_persisted() {
            return None;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(GameEvent::new(seq, at, action.clone()));
        Some(seq)
    }

    /// Highest seq handed out so far.
    pub fn last_seq(&self) -> u64 {
        self.next_seq - 1
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take everything once a save id exists. Without one, nothing is
    /// dropped and the events wait for a later advance.
    pub fn drain_for(&mut self, save_id: Option<&SaveId>) -> Option<Vec<GameEvent>> {
        save_id?;
        if self.pending.is_empty() {
            return None;
        }
        Some(mem::take(&mut self.pending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PitchType, TeamInfo};

    #[test]
    fn test_admin_actions_skipped() {
        let mut buffer = ActionBuffer::new(0);
        let teams = GameAction::SetTeams { away: TeamInfo::default(), home: TeamInfo::default() };
        assert_eq!(buffer.record(0, &teams), None);
        assert_eq!(buffer.record(0, &GameAction::Reset), None);
        assert_eq!(buffer.record(0, &GameAction::Wait { pitch: PitchType::Fastball }), Some(1));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_events_kept_until_id_known() {
        let mut buffer = ActionBuffer::new(0);
        buffer.record(0, &GameAction::Wait { pitch: PitchType::Fastball });
        buffer.record(1, &GameAction::Foul { pitch: PitchType::Slider });
        assert_eq!(buffer.drain_for(None), None);
        assert_eq!(buffer.len(), 2);

        let id = SaveId::new("s");
        let events = buffer.drain_for(Some(&id)).unwrap();
        assert_eq!(events.iter().map(|e| e.seq).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(events.iter().map(|e| e.at).collect::<Vec<_>>(), vec![0, 1]);
        assert!(buffer.is_empty());
        assert_eq!(buffer.drain_for(Some(&id)), None);
    }

    #[test]
    fn test_seq_continues_after_resume() {
        let mut buffer = ActionBuffer::new(41);
        assert_eq!(buffer.record(9, &GameAction::SkipDecision), Some(42));
        assert_eq!(buffer.last_seq(), 42);
    }
}
