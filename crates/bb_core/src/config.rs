//! Simulation configuration (YAML).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Per-pitch pacing preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
    Instant,
}

impl MatchSpeed {
    /// Delay between pitches.
    pub fn interval_ms(self) -> u64 {
        match self {
            MatchSpeed::Slow => 2000,
            MatchSpeed::Normal => 1200,
            MatchSpeed::Fast => 500,
            MatchSpeed::Instant => 0,
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "slow" => Some(MatchSpeed::Slow),
            "normal" => Some(MatchSpeed::Normal),
            "fast" => Some(MatchSpeed::Fast),
            "instant" => Some(MatchSpeed::Instant),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub speed: MatchSpeed,
    // === Speech gate ===
    /// Re-poll interval while an announcement is still playing.
    pub speech_poll_ms: u64,
    /// Give up waiting on speech after this long and pitch anyway.
    pub speech_max_wait_ms: u64,

    /// Extra pause after a half-inning ends when muted.
    pub inning_pause_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            speed: MatchSpeed::Normal,
            speech_poll_ms: 300,
            speech_max_wait_ms: 8000,
            inning_pause_ms: 1500,
        }
    }
}

impl PacingConfig {
    pub fn interval_ms(&self) -> u64 {
        self.speed.interval_ms()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub pacing: PacingConfig,
    pub autosave: bool,
    pub muted: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { pacing: PacingConfig::default(), autosave: true, muted: true }
    }
}

impl SimConfig {
    /// Paced for following along with speech.
    pub fn broadcast() -> Self {
        Self {
            pacing: PacingConfig { speed: MatchSpeed::Slow, ..PacingConfig::default() },
            autosave: true,
            muted: false,
        }
    }

    /// No delays at all (batch runs, tests).
    pub fn instant() -> Self {
        Self {
            pacing: PacingConfig {
                speed: MatchSpeed::Instant,
                inning_pause_ms: 0,
                ..PacingConfig::default()
            },
            autosave: true,
            muted: true,
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_yaml_str(&fs::read_to_string(path)?)
    }
}
