use std::fmt;

use chrono::{DateTime, Utc};
use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::error::SaveError;
use crate::engine::{GameAction, GameState};
use crate::models::{GameSetup, Half};
use crate::rng::{RngState, Seed};

/// Header schema written by this build.
pub const SCHEMA_VERSION: u32 = 1;

const CHECKSUM_LEN: usize = 32;

/// Opaque save identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaveId(String);

impl SaveId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything fixed at game start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveHeader {
    pub schema_version: u32,
    /// Client-generated token; stores dedupe `create_save` retries on it.
    pub session_token: String,
    pub seed: Seed,
    pub setup: GameSetup,
    pub created_at: DateTime<Utc>,
}

impl SaveHeader {
    pub fn new(seed: Seed, setup: GameSetup) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            session_token: Uuid::new_v4().to_string(),
            seed,
            setup,
            created_at: Utc::now(),
        }
    }
}

/// One persisted action. `at` is the pitch key at which it occurred and
/// `seq` orders events within a save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub seq: u64,
    pub at: u64,
    #[serde(flatten)]
    pub action: GameAction,
}

impl GameEvent {
    pub fn new(seq: u64, at: u64, action: GameAction) -> Self {
        Self { seq, at, action }
    }
}

/// Full resume point: state plus generator position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub pitch_key: u64,
    /// Highest event seq already reflected in `state`.
    pub last_seq: u64,
    pub state: GameState,
    pub rng: RngState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningMarker {
    pub inning: u8,
    pub half: Half,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressPatch {
    #[serde(default)]
    pub score: Option<[u16; 2]>,
    #[serde(default)]
    pub inning: Option<InningMarker>,
    #[serde(default)]
    pub game_over: bool,
    #[serde(default)]
    pub snapshot: Option<StateSnapshot>,
}

impl ProgressPatch {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            score: Some(state.score),
            inning: Some(InningMarker { inning: state.inning, half: state.half }),
            game_over: state.game_over,
            snapshot: None,
        }
    }

    pub fn with_snapshot(mut self, snapshot: StateSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Fold a newer patch over this one. Newer fields win; an older
    /// snapshot survives when the newer patch carries none.
    pub fn merge(self, newer: ProgressPatch) -> Self {
        Self {
            score: newer.score.or(self.score),
            inning: newer.inning.or(self.inning),
            game_over: self.game_over || newer.game_over,
            snapshot: newer.snapshot.or(self.snapshot),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveProgress {
    pub pitch_key: u64,
    pub score: [u16; 2],
    pub inning: u8,
    pub half: Half,
    pub game_over: bool,
}

impl Default for SaveProgress {
    fn default() -> Self {
        Self { pitch_key: 0, score: [0, 0], inning: 1, half: Half::Top, game_over: false }
    }
}

impl SaveProgress {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            pitch_key: state.pitch_key,
            score: state.score,
            inning: state.inning,
            half: state.half,
            game_over: state.game_over,
        }
    }
}

/// List-view metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSummary {
    pub id: SaveId,
    pub seed: Seed,
    pub away: String,
    pub home: String,
    pub progress: SaveProgress,
    pub events: usize,
    pub has_snapshot: bool,
    pub updated_at: DateTime<Utc>,
    pub revision: u64,
}

/// A stored game: header, append-only log, latest snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveDoc {
    pub id: SaveId,
    pub header: SaveHeader,
    pub events: Vec<GameEvent>,
    #[serde(default)]
    pub snapshot: Option<StateSnapshot>,
    #[serde(default)]
    pub progress: SaveProgress,
    pub updated_at: DateTime<Utc>,
    /// Store-assigned write counter; breaks `updated_at` ties.
    #[serde(default)]
    pub revision: u64,
}

impl SaveDoc {
    pub fn new(id: SaveId, header: SaveHeader) -> Self {
        Self {
            id,
            header,
            events: Vec::new(),
            snapshot: None,
            progress: SaveProgress::default(),
            updated_at: Utc::now(),
            revision: 0,
        }
    }

    pub fn last_seq(&self) -> u64 {
        self.events.last().map(|e| e.seq).unwrap_or(0)
    }

    /// Append events whose seq is beyond the stored maximum. Returns how
    /// many were appended; retries of an earlier batch append nothing.
    pub fn append(&mut self, events: &[GameEvent]) -> usize {
        let mut appended = 0;
        for event in events {
            if event.seq > self.last_seq() {
                self.events.push(event.clone());
                appended += 1;
            }
        }
        appended
    }

    /// Apply a progress patch. Patches older than the stored pitch key are
    /// stale retries and are ignored.
    pub fn apply_progress(&mut self, pitch_key: u64, patch: ProgressPatch) -> bool {
        if pitch_key < self.progress.pitch_key {
            return false;
        }
        self.progress.pitch_key = pitch_key;
        if let Some(score) = patch.score {
            self.progress.score = score;
        }
        if let Some(marker) = patch.inning {
            self.progress.inning = marker.inning;
            self.progress.half = marker.half;
        }
        self.progress.game_over |= patch.game_over;
        if let Some(snapshot) = patch.snapshot {
            self.snapshot = Some(snapshot);
        }
        true
    }

    /// Drop events after `seq`. A snapshot that covers dropped events goes
    /// too, and progress rewinds to whatever snapshot remains.
    pub fn truncate_after(&mut self, seq: u64) -> usize {
        let before = self.events.len();
        self.events.retain(|e| e.seq <= seq);
        if self.snapshot.as_ref().map(|s| s.last_seq > seq).unwrap_or(false) {
            self.snapshot = None;
        }
        self.progress = match &self.snapshot {
            Some(snapshot) => SaveProgress::from_state(&snapshot.state),
            None => SaveProgress::default(),
        };
        before - self.events.len()
    }

    pub fn summary(&self) -> SaveSummary {
        SaveSummary {
            id: self.id.clone(),
            seed: self.header.seed,
            away: self.header.setup.away.name.clone(),
            home: self.header.setup.home.name.clone(),
            progress: self.progress,
            events: self.events.len(),
            has_snapshot: self.snapshot.is_some(),
            updated_at: self.updated_at,
            revision: self.revision,
        }
    }

    pub fn validate(&self) -> Result<(), SaveError> {
        if self.header.schema_version > SCHEMA_VERSION {
            return Err(SaveError::UnsupportedVersion {
                found: self.header.schema_version,
                supported: SCHEMA_VERSION,
            });
        }
        for pair in self.events.windows(2) {
            if pair[1].seq <= pair[0].seq || pair[1].at < pair[0].at {
                return Err(SaveError::MalformedImport(format!(
                    "event {} is out of order",
                    pair[1].seq
                )));
            }
        }
        if let Some(snapshot) = &self.snapshot {
            if snapshot.rng.seed != self.header.seed.value() {
                return Err(SaveError::MalformedImport(
                    "snapshot was taken from a different seed".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Serialize and compress a save document.
pub fn encode_doc(doc: &SaveDoc) -> Result<Vec<u8>, SaveError> {
    doc.validate()?;

    // 1. MessagePack with field names
    let msgpack = to_vec_named(doc)?;

    // 2. LZ4, size prepended
    let compressed = compress_prepend_size(&msgpack);

    // 3. Trailing SHA-256 of the compressed payload
    let checksum = Sha256::digest(&compressed);
    let mut bytes = compressed;
    bytes.extend_from_slice(&checksum);
    Ok(bytes)
}

/// Verify, decompress and deserialize a save document.
pub fn decode_doc(bytes: &[u8]) -> Result<SaveDoc, SaveError> {
    if bytes.len() < 4 + CHECKSUM_LEN {
        return Err(SaveError::Decompression);
    }
    let (payload, checksum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    if Sha256::digest(payload).as_slice() != checksum {
        return Err(SaveError::ChecksumMismatch);
    }

    let msgpack = decompress_size_prepended(payload).map_err(|_| SaveError::Decompression)?;
    let doc: SaveDoc = from_slice(&msgpack)?;
    doc.validate()?;
    Ok(doc)
}
