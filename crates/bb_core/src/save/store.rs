//! Save store boundary.
//!
//! Storage engines implement [`SaveStore`]. Every mutating call is
//! idempotent under retry: `create_save` dedupes on the header session
//! token, `append_events` skips seqs it already holds, and stale progress
//! patches are ignored.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::debug;

use super::error::SaveError;
use super::format::{GameEvent, ProgressPatch, SaveDoc, SaveHeader, SaveId, SaveSummary};

pub trait SaveStore {
    /// Create a save, or return the id already created for this header's
    /// session token.
    fn create_save(&mut self, header: SaveHeader) -> Result<SaveId, SaveError>;

    /// Append in seq order. Returns the number of new events stored.
    fn append_events(&mut self, id: &SaveId, events: &[GameEvent]) -> Result<usize, SaveError>;

    fn update_progress(
        &mut self,
        id: &SaveId,
        pitch_key: u64,
        patch: ProgressPatch,
    ) -> Result<(), SaveError>;

    fn load(&self, id: &SaveId) -> Result<SaveDoc, SaveError>;

    /// Most recently updated first.
    fn list_saves(&self) -> Result<Vec<SaveSummary>, SaveError>;

    fn delete_save(&mut self, id: &SaveId) -> Result<(), SaveError>;

    /// Drop events with seq greater than `after_seq`. Returns how many went.
    fn truncate_events(&mut self, id: &SaveId, after_seq: u64) -> Result<usize, SaveError>;

    /// Store a complete document under its own id (import path).
    fn insert_doc(&mut self, doc: SaveDoc) -> Result<SaveId, SaveError>;
}

pub(crate) fn sort_recent_first(summaries: &mut [SaveSummary]) {
    summaries.sort_by(|a, b| {
        (b.updated_at, b.revision, &b.id).cmp(&(a.updated_at, a.revision, &a.id))
    });
}

/// In-process store. Also the reference behavior for other engines.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: BTreeMap<SaveId, SaveDoc>,
    clock: u64,
    fail_next: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` mutating calls fail with `Unavailable`.
    pub fn fail_next(&mut self, n: u32) {
        self.fail_next = n;
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    fn check_available(&mut self) -> Result<(), SaveError> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(SaveError::Unavailable("memory store offline".to_string()));
        }
        Ok(())
    }

    fn doc_mut(&mut self, id: &SaveId) -> Result<&mut SaveDoc, SaveError> {
        self.clock += 1;
        let clock = self.clock;
        let doc = self.docs.get_mut(id).ok_or_else(|| SaveError::NotFound { id: id.clone() })?;
        doc.revision = clock;
        doc.updated_at = Utc::now();
        Ok(doc)
    }
}

impl SaveStore for MemoryStore {
    fn create_save(&mut self, header: SaveHeader) -> Result<SaveId, SaveError> {
        self.check_available()?;
        if let Some(existing) =
            self.docs.values().find(|d| d.header.session_token == header.session_token)
        {
            return Ok(existing.id.clone());
        }
        let id = SaveId::generate();
        self.clock += 1;
        let mut doc = SaveDoc::new(id.clone(), header);
        doc.revision = self.clock;
        self.docs.insert(id.clone(), doc);
        debug!(save_id = %id, "save created");
        Ok(id)
    }

    fn append_events(&mut self, id: &SaveId, events: &[GameEvent]) -> Result<usize, SaveError> {
        self.check_available()?;
        Ok(self.doc_mut(id)?.append(events))
    }

    fn update_progress(
        &mut self,
        id: &SaveId,
        pitch_key: u64,
        patch: ProgressPatch,
    ) -> Result<(), SaveError> {
        self.check_available()?;
        self.doc_mut(id)?.apply_progress(pitch_key, patch);
        Ok(())
    }

    fn load(&self, id: &SaveId) -> Result<SaveDoc, SaveError> {
        self.docs.get(id).cloned().ok_or_else(|| SaveError::NotFound { id: id.clone() })
    }

    fn list_saves(&self) -> Result<Vec<SaveSummary>, SaveError> {
        let mut summaries: Vec<SaveSummary> = self.docs.values().map(SaveDoc::summary).collect();
        sort_recent_first(&mut summaries);
        Ok(summaries)
    }

    fn delete_save(&mut self, id: &SaveId) -> Result<(), SaveError> {
        self.check_available()?;
        self.docs.remove(id).map(|_| ()).ok_or_else(|| SaveError::NotFound { id: id.clone() })
    }

    fn truncate_events(&mut self, id: &SaveId, after_seq: u64) -> Result<usize, SaveError> {
        self.check_available()?;
        Ok(self.doc_mut(id)?.truncate_after(after_seq))
    }

    fn insert_doc(&mut self, mut doc: SaveDoc) -> Result<SaveId, SaveError> {
        self.check_available()?;
        doc.validate()?;
        self.clock += 1;
        doc.revision = self.clock;
        let id = doc.id.clone();
        self.docs.insert(id.clone(), doc);
        Ok(id)
    }
}
