use std::fmt;

use thiserror::Error;

use super::format::SaveId;
use crate::models::TeamSide;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serialization error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("Deserialization error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("Decompression error")]
    Decompression,

    #[error("Checksum mismatch")]
    ChecksumMismatch,

    #[error("Save not found: {id}")]
    NotFound { id: SaveId },

    #[error("Malformed import: {0}")]
    MalformedImport(String),

    #[error("Signature mismatch")]
    SignatureMismatch,

    #[error("Unsupported version: found {found}, supported up to {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Missing dependency: {0}")]
    MissingDependency(MissingDependency),

    #[error("No snapshot available")]
    NoSnapshot,

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Something an imported save references that is not installed locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingDependency {
    Team { side: TeamSide, team_id: String },
}

impl fmt::Display for MissingDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingDependency::Team { side, team_id } => {
                write!(f, "{} team '{}' is not installed", side.as_str(), team_id)
            }
        }
    }
}

impl SaveError {
    /// Storage hiccups worth retrying; the game keeps running meanwhile.
    pub fn is_transient(&self) -> bool {
        matches!(self, SaveError::Io(_) | SaveError::Unavailable(_) | SaveError::Encode(_))
    }

    /// Text safe to show a player. Never includes internal identifiers.
    pub fn user_message(&self) -> String {
        match self {
            SaveError::MalformedImport(_) | SaveError::Json(_) => {
                "This file is not a valid saved game.".to_string()
            }
            SaveError::SignatureMismatch => {
                "This saved game was modified or damaged and cannot be imported.".to_string()
            }
            SaveError::UnsupportedVersion { .. } => {
                "This saved game was made by a newer version. Update to open it.".to_string()
            }
            SaveError::MissingDependency(MissingDependency::Team { side, .. }) => format!(
                "The {} team in this saved game is not installed. Add the team to your roster, then import again.",
                side.as_str()
            ),
            SaveError::NotFound { .. } => "That saved game no longer exists.".to_string(),
            SaveError::NoSnapshot => "This game has no resume point yet.".to_string(),
            SaveError::ChecksumMismatch | SaveError::Decompression | SaveError::Decode(_) => {
                "This saved game is damaged and cannot be loaded.".to_string()
            }
            SaveError::Io(_) | SaveError::Unavailable(_) | SaveError::Encode(_) => {
                "Progress could not be saved right now. The game continues.".to_string()
            }
        }
    }
}
