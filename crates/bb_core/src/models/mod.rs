//! Plain data types shared by the engine, persistence and stats layers.

pub mod play;
pub mod team;

pub use play::{
    Base, BuntOutcome, HitType, OnePitchModifier, OutKind, OutLogEntry, PitchType, PlayKind,
    PlayLogEntry, Strategy,
};
pub use team::{GameSetup, Half, ManagerSettings, TeamInfo, TeamSide};

/// Number of batting-order slots per lineup.
pub const LINEUP_SLOTS: usize = 9;

/// First inning in which a game may end at a half-inning boundary.
pub const REGULATION_INNINGS: u8 = 9;
