//! # bb_core - Deterministic Baseball Simulation Engine
//!
//! Pitch-by-pitch nine-inning baseball driven by a seeded generator.
//!
//! ## Features
//! - Same seed, same pitch sequence (manager decisions stay player choices)
//! - Manager mode with steal, bunt, intentional walk, shift, pinch-hitter
//!   and count-based decisions
//! - Event-sourced saves with snapshots, signed export and import
//! - Cooperative autoplay scheduler with speech and inning pauses

// Struct initialization pattern used intentionally
#![allow(clippy::field_reassign_with_default)]
// Large enum variants - RestoreGame carries a whole state
#![allow(clippy::large_enum_variant)]

pub mod config;
pub mod engine;
pub mod error;
pub mod live;
pub mod models;
pub mod rng;
pub mod roster;
pub mod save;
pub mod scheduler;
pub mod stats;

pub use config::{MatchSpeed, PacingConfig, SimConfig};
pub use engine::{DecisionChoice, GameAction, GameSession, GameState, StepOutcome};
pub use error::{GameError, Result};
pub use live::LiveGame;
pub use models::{GameSetup, Strategy, TeamInfo, TeamSide};
pub use rng::Seed;
pub use roster::{InMemoryRoster, RosterProvider};
pub use save::{FileStore, MemoryStore, SaveError, SaveId, SaveStore};
pub use stats::BoxScore;
