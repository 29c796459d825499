//! One file per save: MessagePack + LZ4 + SHA-256, written atomically.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::error::SaveError;
use super::format::{
    decode_doc, encode_doc, GameEvent, ProgressPatch, SaveDoc, SaveHeader, SaveId, SaveSummary,
};
use super::store::{sort_recent_first, SaveStore};

const EXTENSION: &str = "bbsave";

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, SaveError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &SaveId) -> Result<PathBuf, SaveError> {
        let safe = !id.as_str().is_empty()
            && id.as_str().chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(SaveError::NotFound { id: id.clone() });
        }
        Ok(self.dir.join(format!("{}.{}", id, EXTENSION)))
    }

    fn read_doc(&self, id: &SaveId) -> Result<SaveDoc, SaveError> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Err(SaveError::NotFound { id: id.clone() });
        }
        load_from_path(&path)
    }

    fn write_doc(&self, doc: &mut SaveDoc) -> Result<(), SaveError> {
        doc.revision += 1;
        doc.updated_at = Utc::now();
        let path = self.path_for(&doc.id)?;
        save_to_path(&path, doc)
    }

    fn modify<T>(
        &mut self,
        id: &SaveId,
        f: impl FnOnce(&mut SaveDoc) -> T,
    ) -> Result<T, SaveError> {
        let mut doc = self.read_doc(id)?;
        let out = f(&mut doc);
        self.write_doc(&mut doc)?;
        Ok(out)
    }

    fn all_docs(&self) -> Result<Vec<SaveDoc>, SaveError> {
        let mut docs = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            match load_from_path(&path) {
                Ok(doc) => docs.push(doc),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable save"),
            }
        }
        Ok(docs)
    }
}

impl SaveStore for FileStore {
    fn create_save(&mut self, header: SaveHeader) -> Result<SaveId, SaveError> {
        if let Some(existing) = self
            .all_docs()?
            .into_iter()
            .find(|d| d.header.session_token == header.session_token)
        {
            return Ok(existing.id);
        }
        let mut doc = SaveDoc::new(SaveId::generate(), header);
        self.write_doc(&mut doc)?;
        info!(save_id = %doc.id, "save created");
        Ok(doc.id)
    }

    fn append_events(&mut self, id: &SaveId, events: &[GameEvent]) -> Result<usize, SaveError> {
        self.modify(id, |doc| doc.append(events))
    }

    fn update_progress(
        &mut self,
        id: &SaveId,
        pitch_key: u64,
        patch: ProgressPatch,
    ) -> Result<(), SaveError> {
        self.modify(id, |doc| {
            doc.apply_progress(pitch_key, patch);
        })
    }

    fn load(&self, id: &SaveId) -> Result<SaveDoc, SaveError> {
        self.read_doc(id)
    }

    fn list_saves(&self) -> Result<Vec<SaveSummary>, SaveError> {
        let mut summaries: Vec<SaveSummary> = self.all_docs()?.iter().map(SaveDoc::summary).collect();
        sort_recent_first(&mut summaries);
        Ok(summaries)
    }

    fn delete_save(&mut self, id: &SaveId) -> Result<(), SaveError> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Err(SaveError::NotFound { id: id.clone() });
        }
        fs::remove_file(&path)?;
        info!(save_id = %id, "save deleted");
        Ok(())
    }

    fn truncate_events(&mut self, id: &SaveId, after_seq: u64) -> Result<usize, SaveError> {
        self.modify(id, |doc| doc.truncate_after(after_seq))
    }

    fn insert_doc(&mut self, mut doc: SaveDoc) -> Result<SaveId, SaveError> {
        doc.validate()?;
        self.write_doc(&mut doc)?;
        Ok(doc.id)
    }
}

fn save_to_path(path: &Path, doc: &SaveDoc) -> Result<(), SaveError> {
    let data = encode_doc(doc)?;

    // Atomic save: write to temp file, then rename
    let temp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&temp_path)?;
        file.write_all(&data)?;
        file.flush()?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)?;

    debug!(bytes = data.len(), path = %path.display(), "save written");
    Ok(())
}

fn load_from_path(path: &Path) -> Result<SaveDoc, SaveError> {
    let mut data = Vec::new();
    File::open(path)?.read_to_end(&mut data)?;
    decode_doc(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GameAction;
    use crate::models::{GameSetup, PitchType, TeamInfo};
    use crate::rng::Seed;
    use tempfile::TempDir;

    fn header() -> SaveHeader {
        SaveHeader::new(
            Seed::from_value(7),
            GameSetup::new(TeamInfo::new("rav", "Ravens"), TeamInfo::new("owl", "Owls")),
        )
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        let h = header();
        let id = store.create_save(h.clone()).unwrap();
        assert_eq!(store.create_save(h).unwrap(), id);

        let events = [
            GameEvent::new(1, 0, GameAction::Wait { pitch: PitchType::Fastball }),
            GameEvent::new(2, 1, GameAction::Foul { pitch: PitchType::Changeup }),
        ];
        assert_eq!(store.append_events(&id, &events).unwrap(), 2);
        assert_eq!(store.append_events(&id, &events).unwrap(), 0);

        let doc = store.load(&id).unwrap();
        assert_eq!(doc.events, events.to_vec());
        assert!(!dir.path().join(format!("{}.tmp", id)).exists());

        let listed = store.list_saves().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].events, 2);
    }

    #[test]
    fn test_corrupt_file_skipped_in_listing() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.create_save(header()).unwrap();
        fs::write(dir.path().join("broken.bbsave"), b"not a save at all, definitely not").unwrap();
        assert_eq!(store.list_saves().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_and_path_safety() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        let id = store.create_save(header()).unwrap();
        store.delete_save(&id).unwrap();
        assert!(matches!(store.load(&id), Err(SaveError::NotFound { .. })));
        assert!(matches!(
            store.load(&SaveId::new("../etc/passwd")),
            Err(SaveError::NotFound { .. })
        ));
    }
}
