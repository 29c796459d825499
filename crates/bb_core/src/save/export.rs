//! Portable save export.
//!
//! Exports are pretty JSON envelopes `{version, header, events, snapshot,
//! sig}`. `sig` is FNV-1a 64 over the compact JSON of
//! `[header, events, snapshot]`, rendered as 16 lowercase hex digits. Import
//! verifies the signature before anything else in the payload is trusted.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::error::{MissingDependency, SaveError};
use super::format::{GameEvent, SaveDoc, SaveHeader, SaveId, SaveProgress, StateSnapshot};
use super::loader::rebuild_state;
use super::migration::migrate_header;
use super::store::SaveStore;
use crate::models::TeamSide;
use crate::roster::RosterProvider;

/// Envelope version written by this build.
pub const EXPORT_VERSION: u32 = 1;

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// FNV-1a 64-bit hash.
pub fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for b in bytes {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Signature over the three signed sections.
///
/// The sections go through `serde_json::Value`, whose maps are sorted, so
/// the signed bytes do not depend on field order in the file.
pub fn signature(header: &Value, events: &Value, snapshot: &Value) -> Result<String, SaveError> {
    let signed = serde_json::to_vec(&json!([header, events, snapshot]))?;
    Ok(format!("{:016x}", fnv1a64(&signed)))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEnvelope {
    pub version: u32,
    pub header: Value,
    pub events: Value,
    #[serde(default)]
    pub snapshot: Value,
    pub sig: String,
}

/// Render a stored document as a signed export.
pub fn export_doc(doc: &SaveDoc) -> Result<String, SaveError> {
    let header = serde_json::to_value(&doc.header)?;
    let events = serde_json::to_value(&doc.events)?;
    let snapshot = serde_json::to_value(&doc.snapshot)?;
    let sig = signature(&header, &events, &snapshot)?;

    let envelope = ExportEnvelope { version: EXPORT_VERSION, header, events, snapshot, sig };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

pub fn export_save(store: &dyn SaveStore, id: &SaveId) -> Result<String, SaveError> {
    let doc = store.load(id)?;
    let json = export_doc(&doc)?;
    info!(save_id = %id, events = doc.events.len(), "save exported");
    Ok(json)
}

/// Validate an export and turn it into a fresh document with a new id.
///
/// Checks run in order: JSON shape, envelope version, signature, header
/// migration, typed decoding, then (with a roster) that both clubs are
/// installed. Nothing is stored here.
pub fn parse_import(
    json: &str,
    roster: Option<&dyn RosterProvider>,
) -> Result<SaveDoc, SaveError> {
    let envelope: ExportEnvelope = serde_json::from_str(json)
        .map_err(|e| SaveError::MalformedImport(format!("not a save export: {}", e)))?;

    if envelope.version > EXPORT_VERSION {
        return Err(SaveError::UnsupportedVersion {
            found: envelope.version,
            supported: EXPORT_VERSION,
        });
    }

    let expected = signature(&envelope.header, &envelope.events, &envelope.snapshot)?;
    if !expected.eq_ignore_ascii_case(&envelope.sig) {
        warn!(expected = %expected, found = %envelope.sig, "import signature mismatch");
        return Err(SaveError::SignatureMismatch);
    }

    let header: SaveHeader = serde_json::from_value(migrate_header(envelope.header)?)
        .map_err(|e| SaveError::MalformedImport(format!("header: {}", e)))?;
    let events: Vec<GameEvent> = serde_json::from_value(envelope.events)
        .map_err(|e| SaveError::MalformedImport(format!("events: {}", e)))?;
    let snapshot: Option<StateSnapshot> = serde_json::from_value(envelope.snapshot)
        .map_err(|e| SaveError::MalformedImport(format!("snapshot: {}", e)))?;

    if let Some(roster) = roster {
        for side in [TeamSide::Away, TeamSide::Home] {
            let team_id = &header.setup.team(side).id;
            if !roster.has_team(team_id) {
                return Err(SaveError::MissingDependency(MissingDependency::Team {
                    side,
                    team_id: team_id.clone(),
                }));
            }
        }
    }

    let mut doc = SaveDoc::new(SaveId::generate(), header);
    doc.events = events;
    doc.snapshot = snapshot;
    doc.validate()?;
    doc.progress = match &doc.snapshot {
        Some(snapshot) => SaveProgress::from_state(&snapshot.state),
        None => SaveProgress::from_state(&rebuild_state(&doc)?),
    };
    Ok(doc)
}

/// Import into `store`. On any error the store is left untouched.
pub fn import_save(
    store: &mut dyn SaveStore,
    json: &str,
    roster: Option<&dyn RosterProvider>,
) -> Result<SaveId, SaveError> {
    let doc = parse_import(json, roster)?;
    let events = doc.events.len();
    let id = store.insert_doc(doc)?;
    info!(save_id = %id, events, "save imported");
    Ok(id)
}
