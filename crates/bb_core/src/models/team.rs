use serde::{Deserialize, Serialize};

use super::Strategy;

/// Which club. Indexes every `[T; 2]` pair in the game state (away = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    Away,
    Home,
}

impl TeamSide {
    pub const BOTH: [TeamSide; 2] = [TeamSide::Away, TeamSide::Home];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            TeamSide::Away => 0,
            TeamSide::Home => 1,
        }
    }

    pub fn opponent(self) -> TeamSide {
        match self {
            TeamSide::Away => TeamSide::Home,
            TeamSide::Home => TeamSide::Away,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TeamSide::Away => "away",
            TeamSide::Home => "home",
        }
    }
}

/// Half-inning: top = away bats, bottom = home bats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Half {
    #[default]
    Top,
    Bottom,
}

impl Half {
    pub fn batting(self) -> TeamSide {
        match self {
            Half::Top => TeamSide::Away,
            Half::Bottom => TeamSide::Home,
        }
    }

    pub fn fielding(self) -> TeamSide {
        self.batting().opponent()
    }

    pub fn index(self) -> u32 {
        match self {
            Half::Top => 0,
            Half::Bottom => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Half::Top => "Top",
            Half::Bottom => "Bottom",
        }
    }
}

/// Identity of a club as the game state sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TeamInfo {
    pub id: String,
    pub name: String,
}

impl TeamInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

/// Manager mode: which club the human manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerSettings {
    pub team: TeamSide,
}

/// Everything chosen before the first pitch. Stored in the save header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSetup {
    pub away: TeamInfo,
    pub home: TeamInfo,
    #[serde(default)]
    pub away_strategy: Strategy,
    #[serde(default)]
    pub home_strategy: Strategy,
    #[serde(default)]
    pub manager: Option<ManagerSettings>,
}

impl GameSetup {
    pub fn new(away: TeamInfo, home: TeamInfo) -> Self {
        Self {
            away,
            home,
            away_strategy: Strategy::default(),
            home_strategy: Strategy::default(),
            manager: None,
        }
    }

    pub fn with_manager(mut self, team: TeamSide) -> Self {
        self.manager = Some(ManagerSettings { team });
        self
    }

    pub fn with_strategy(mut self, side: TeamSide, strategy: Strategy) -> Self {
        match side {
            TeamSide::Away => self.away_strategy = strategy,
            TeamSide::Home => self.home_strategy = strategy,
        }
        self
    }

    pub fn strategy(&self, side: TeamSide) -> Strategy {
        match side {
            TeamSide::Away => self.away_strategy,
            TeamSide::Home => self.home_strategy,
        }
    }

    pub fn team(&self, side: TeamSide) -> &TeamInfo {
        match side {
            TeamSide::Away => &self.away,
            TeamSide::Home => &self.home,
        }
    }

    pub fn managed_team(&self) -> Option<TeamSide> {
        self.manager.map(|m| m.team)
    }
}
