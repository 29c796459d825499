use serde::{Deserialize, Serialize};

use super::Half;

/// Offensive approach of a club. Selects swing, out and hit-type tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Balanced,
    Aggressive,
    Patient,
    Contact,
    Power,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Balanced => "balanced",
            Strategy::Aggressive => "aggressive",
            Strategy::Patient => "patient",
            Strategy::Contact => "contact",
            Strategy::Power => "power",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "snake_case")]
pub enum PitchType {
    Fastball,
    Sinker,
    Slider,
    Curveball,
    Changeup,
}

impl PitchType {
    pub fn as_str(self) -> &'static str {
        match self {
            PitchType::Fastball => "fastball",
            PitchType::Sinker => "sinker",
            PitchType::Slider => "slider",
            PitchType::Curveball => "curveball",
            PitchType::Changeup => "changeup",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitType {
    Single,
    Double,
    Triple,
    HomeRun,
}

impl HitType {
    /// Bases the batter (and every runner) advances.
    pub fn bases(self) -> u8 {
        match self {
            HitType::Single => 1,
            HitType::Double => 2,
            HitType::Triple => 3,
            HitType::HomeRun => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HitType::Single => "single",
            HitType::Double => "double",
            HitType::Triple => "triple",
            HitType::HomeRun => "home run",
        }
    }
}

/// Batted-ball out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutKind {
    GroundOut,
    DoublePlay,
    FlyOut,
    PopOut,
    /// Sacrifice bunt: batter retired, runners move up.
    SacrificeBunt,
    /// Bunt popped up: batter retired, runners hold.
    BuntPopUp,
}

impl OutKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OutKind::GroundOut => "grounds out",
            OutKind::DoublePlay => "grounds into a double play",
            OutKind::FlyOut => "flies out",
            OutKind::PopOut => "pops out",
            OutKind::SacrificeBunt => "lays down a sacrifice bunt",
            OutKind::BuntPopUp => "pops up the bunt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuntOutcome {
    Sacrifice,
    Single,
    Foul,
    PopUp,
}

/// Override applied to exactly the next pitch resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnePitchModifier {
    /// Forced swing (swing rate 920/1000).
    SwingAway,
    /// Never swing.
    Take,
    /// Contact bias: more swings, more fouls.
    Protect,
}

impl OnePitchModifier {
    pub fn as_str(self) -> &'static str {
        match self {
            OnePitchModifier::SwingAway => "swing away",
            OnePitchModifier::Take => "take",
            OnePitchModifier::Protect => "protect",
        }
    }
}

/// Destination base of a steal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Base {
    Second,
    Third,
}

impl Base {
    pub fn as_str(self) -> &'static str {
        match self {
            Base::Second => "second",
            Base::Third => "third",
        }
    }
}

/// Kind of a play-log entry (times on base).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayKind {
    Hit(HitType),
    Walk,
    IntentionalWalk,
}

impl PlayKind {
    pub fn is_hit(self) -> bool {
        matches!(self, PlayKind::Hit(_))
    }

    pub fn is_walk(self) -> bool {
        matches!(self, PlayKind::Walk | PlayKind::IntentionalWalk)
    }
}

/// Hit or walk credited to a batting-order slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayLogEntry {
    pub slot: u8,
    pub inning: u8,
    pub half: Half,
    pub kind: PlayKind,
    pub rbi: u8,
}

/// Strikeout or batted-ball out charged to a batting-order slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutLogEntry {
    pub slot: u8,
    pub inning: u8,
    pub half: Half,
    #[serde(default)]
    pub kind: Option<OutKind>,
}
