//! Turning a stored save back into a playable session.

use tracing::{info, warn};

use super::error::SaveError;
use super::format::{SaveDoc, SaveId};
use super::store::SaveStore;
use crate::engine::{GameSession, GameState};

/// Replay the whole log through the reducer, starting from the teams in the
/// header. Produces the same state (play-by-play included) the live game had.
pub fn rebuild_state(doc: &SaveDoc) -> Result<GameState, SaveError> {
    let session = GameSession::new(doc.header.seed, doc.header.setup.clone());
    let mut state = session.state().clone();
    for event in &doc.events {
        state.apply(&event.action).map_err(|e| {
            SaveError::MalformedImport(format!("event {} cannot be replayed: {}", event.seq, e))
        })?;
    }
    Ok(state)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeSource {
    /// The save's own snapshot.
    OwnSnapshot,
    /// Another save with the same seed that got further.
    Sibling(SaveId),
    /// No snapshot anywhere; the save's own log was replayed.
    Replayed,
    /// No snapshot and no log; the game starts from the first pitch.
    Fresh,
}

#[derive(Debug)]
pub struct ResumePoint {
    /// Save that play continues on.
    pub save_id: SaveId,
    pub source: ResumeSource,
    pub session: GameSession,
    /// Seq the next persisted event should take.
    pub next_seq: u64,
}

/// Load `id` for continued play.
///
/// Prefers the save's own snapshot. Without one, the most recently updated
/// save sharing its seed that has a snapshot is used instead, and play
/// continues on that save. Failing both, the save's own log is replayed
/// with the generator running alongside it. Log entries past the chosen
/// snapshot, or past the last entry the replay reproduced, are truncated
/// so resumed play never writes a seq twice.
pub fn load_resume(store: &mut dyn SaveStore, id: &SaveId) -> Result<ResumePoint, SaveError> {
    let doc = store.load(id)?;

    if let Some(snapshot) = &doc.snapshot {
        let dropped = store.truncate_events(id, snapshot.last_seq)?;
        info!(save_id = %id, pitch_key = snapshot.pitch_key, dropped, "resuming from snapshot");
        return Ok(ResumePoint {
            save_id: id.clone(),
            source: ResumeSource::OwnSnapshot,
            session: GameSession::restore(
                doc.header.seed,
                doc.header.setup.clone(),
                snapshot.state.clone(),
                snapshot.rng,
            ),
            next_seq: snapshot.last_seq + 1,
        });
    }

    let sibling = store
        .list_saves()?
        .into_iter()
        .find(|s| s.id != *id && s.seed == doc.header.seed && s.has_snapshot);
    if let Some(summary) = sibling {
        let sibling_doc = store.load(&summary.id)?;
        if let Some(snapshot) = sibling_doc.snapshot {
            let dropped = store.truncate_events(&summary.id, snapshot.last_seq)?;
            warn!(
                save_id = %id,
                sibling = %summary.id,
                dropped,
                "save has no snapshot; resuming from sibling"
            );
            return Ok(ResumePoint {
                save_id: summary.id.clone(),
                source: ResumeSource::Sibling(summary.id),
                session: GameSession::restore(
                    sibling_doc.header.seed,
                    sibling_doc.header.setup,
                    snapshot.state,
                    snapshot.rng,
                ),
                next_seq: snapshot.last_seq + 1,
            });
        }
    }

    let (session, replayed) = GameSession::replay(
        doc.header.seed,
        doc.header.setup.clone(),
        doc.events.iter().map(|e| &e.action),
    );
    let last_seq = replayed
        .checked_sub(1)
        .and_then(|i| doc.events.get(i))
        .map(|e| e.seq)
        .unwrap_or(0);
    if replayed < doc.events.len() {
        let dropped = store.truncate_events(id, last_seq)?;
        warn!(save_id = %id, replayed, dropped, "log diverges from its seed; tail dropped");
    }
    let source = if doc.events.is_empty() { ResumeSource::Fresh } else { ResumeSource::Replayed };
    info!(save_id = %id, replayed, pitch_key = session.state().pitch_key, "no snapshot; replayed log");
    Ok(ResumePoint { save_id: id.clone(), source, session, next_seq: last_seq + 1 })
}
