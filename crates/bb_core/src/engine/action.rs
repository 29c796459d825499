//! Reducer actions.
//!
//! `GameAction` is a closed sum type; `ActionKind` is its fieldless tag.
//! Only kinds on the [`PERSISTED_KINDS`] allow-list are written to the save
//! log. Administrative actions still apply to live state.

use serde::{Deserialize, Serialize};

use super::decision::Decision;
use super::state::GameState;
use crate::models::{
    Base, BuntOutcome, HitType, OnePitchModifier, OutKind, PitchType, Strategy, TeamInfo,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum GameAction {
    Strike { swinging: bool, pitch: PitchType },
    Foul { pitch: PitchType },
    /// Taken ball.
    Wait { pitch: PitchType },
    Hit { hit: HitType, pitch: PitchType },
    BattedOut { out: OutKind, pitch: PitchType },
    StealAttempt { base: Base, successful: bool },
    BuntAttempt { outcome: BuntOutcome },
    IntentionalWalk,
    SetPendingDecision(Decision),
    SkipDecision,
    SetOnePitchModifier(OnePitchModifier),
    SetPinchHitterStrategy(Strategy),
    SetDefensiveShift(bool),
    SetTeams { away: TeamInfo, home: TeamInfo },
    Reset,
    RestoreGame(Box<GameState>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Strike,
    Foul,
    Wait,
    Hit,
    BattedOut,
    StealAttempt,
    BuntAttempt,
    IntentionalWalk,
    SetPendingDecision,
    SkipDecision,
    SetOnePitchModifier,
    SetPinchHitterStrategy,
    SetDefensiveShift,
    SetTeams,
    Reset,
    RestoreGame,
}

/// Action kinds written to the event log.
pub const PERSISTED_KINDS: &[ActionKind] = &[
    ActionKind::Strike,
    ActionKind::Foul,
    ActionKind::Wait,
    ActionKind::Hit,
    ActionKind::BattedOut,
    ActionKind::StealAttempt,
    ActionKind::BuntAttempt,
    ActionKind::IntentionalWalk,
    ActionKind::SetPendingDecision,
    ActionKind::SkipDecision,
    ActionKind::SetOnePitchModifier,
    ActionKind::SetPinchHitterStrategy,
    ActionKind::SetDefensiveShift,
];

impl ActionKind {
    pub fn is_persisted(self) -> bool {
        PERSISTED_KINDS.contains(&self)
    }

    /// Pitch resolutions proper: rejected while a decision is pending.
    pub fn is_pitch(self) -> bool {
        matches!(
            self,
            ActionKind::Strike
                | ActionKind::Foul
                | ActionKind::Wait
                | ActionKind::Hit
                | ActionKind::BattedOut
        )
    }

    /// Kinds that tick the pitch key.
    pub fn advances_pitch(self) -> bool {
        self.is_pitch() || matches!(self, ActionKind::BuntAttempt | ActionKind::IntentionalWalk)
    }
}

impl GameAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            GameAction::Strike { .. } => ActionKind::Strike,
            GameAction::Foul { .. } => ActionKind::Foul,
            GameAction::Wait { .. } => ActionKind::Wait,
            GameAction::Hit { .. } => ActionKind::Hit,
            GameAction::BattedOut { .. } => ActionKind::BattedOut,
            GameAction::StealAttempt { .. } => ActionKind::StealAttempt,
            GameAction::BuntAttempt { .. } => ActionKind::BuntAttempt,
            GameAction::IntentionalWalk => ActionKind::IntentionalWalk,
            GameAction::SetPendingDecision(_) => ActionKind::SetPendingDecision,
            GameAction::SkipDecision => ActionKind::SkipDecision,
            GameAction::SetOnePitchModifier(_) => ActionKind::SetOnePitchModifier,
            GameAction::SetPinchHitterStrategy(_) => ActionKind::SetPinchHitterStrategy,
            GameAction::SetDefensiveShift(_) => ActionKind::SetDefensiveShift,
            GameAction::SetTeams { .. } => ActionKind::SetTeams,
            GameAction::Reset => ActionKind::Reset,
            GameAction::RestoreGame(_) => ActionKind::RestoreGame,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.kind().is_persisted()
    }

    pub fn advances_pitch(&self) -> bool {
        self.kind().advances_pitch()
    }
}
