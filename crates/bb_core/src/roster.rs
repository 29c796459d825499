//! Roster provider.
//!
//! The engine only reads rosters: batting-order identity for stat labels,
//! bench depth for pinch-hitter eligibility, and team existence when an
//! imported save is checked for missing dependencies.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::{GameSetup, Strategy, TeamInfo, TeamSide};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub number: u8,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>, number: u8) -> Self {
        Self { id: id.into(), name: name.into(), number }
    }

    /// Box-score label: "#3 J. Ortiz".
    pub fn label(&self) -> String {
        let mut parts = self.name.split_whitespace();
        let short = match (parts.next(), parts.last()) {
            (Some(first), Some(last)) => match first.chars().next() {
                Some(initial) => format!("{}. {}", initial, last),
                None => last.to_string(),
            },
            (Some(only), None) => only.to_string(),
            _ => String::new(),
        };
        format!("#{} {}", self.number, short)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRoster {
    pub info: TeamInfo,
    #[serde(default)]
    pub strategy: Strategy,
    /// Batting order, slot 0 first.
    pub lineup: Vec<Player>,
    #[serde(default)]
    pub bench: Vec<Player>,
}

pub trait RosterProvider {
    fn team(&self, team_id: &str) -> Option<&TeamRoster>;

    fn has_team(&self, team_id: &str) -> bool {
        self.team(team_id).is_some()
    }

    fn batter(&self, team_id: &str, slot: u8) -> Option<&Player> {
        self.team(team_id).and_then(|t| t.lineup.get(slot as usize))
    }

    fn has_bench(&self, team_id: &str) -> bool {
        self.team(team_id).map(|t| !t.bench.is_empty()).unwrap_or(false)
    }

    /// Setup for a game between two known clubs, strategies from the roster.
    fn setup(&self, away_id: &str, home_id: &str) -> Option<GameSetup> {
        let away = self.team(away_id)?;
        let home = self.team(home_id)?;
        Some(
            GameSetup::new(away.info.clone(), home.info.clone())
                .with_strategy(TeamSide::Away, away.strategy)
                .with_strategy(TeamSide::Home, home.strategy),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InMemoryRoster {
    teams: BTreeMap<String, TeamRoster>,
}

impl InMemoryRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, roster: TeamRoster) {
        self.teams.insert(roster.info.id.clone(), roster);
    }

    pub fn team_ids(&self) -> impl Iterator<Item = &str> {
        self.teams.keys().map(String::as_str)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        let teams: Vec<TeamRoster> = serde_yaml::from_str(text)?;
        let mut roster = Self::new();
        for team in teams {
            roster.insert(team);
        }
        Ok(roster)
    }

    pub fn load(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Two built-in clubs so a game can start with no roster files.
    pub fn demo() -> Self {
        let mut roster = Self::new();
        roster.insert(demo_team(
            "rav",
            "Ravens",
            Strategy::Balanced,
            &[
                "Luis Herrera", "Sam Okafor", "Jorge Ortiz", "Dan Kowalski", "Miles Grant",
                "Theo Park", "Ray Duarte", "Ben Alder", "Cole Whitaker",
            ],
            &["Nate Ruiz", "Eli Brandt"],
        ));
        roster.insert(demo_team(
            "owl",
            "Owls",
            Strategy::Contact,
            &[
                "Kenji Mori", "Andre Baptiste", "Will Foster", "Omar Haddad", "Pete Lindqvist",
                "Gus Moreno", "Ty Callahan", "Isaac Venn", "Rob Sutter",
            ],
            &["Hal Brennan"],
        ));
        roster
    }
}

impl RosterProvider for InMemoryRoster {
    fn team(&self, team_id: &str) -> Option<&TeamRoster> {
        self.teams.get(team_id)
    }
}

fn demo_team(id: &str, name: &str, strategy: Strategy, lineup: &[&str], bench: &[&str]) -> TeamRoster {
    let player = |i: usize, name: &str| Player::new(format!("{}-{}", id, i + 1), name, (i + 1) as u8);
    TeamRoster {
        info: TeamInfo::new(id, name),
        strategy,
        lineup: lineup.iter().enumerate().map(|(i, n)| player(i, n)).collect(),
        bench: bench.iter().enumerate().map(|(i, n)| player(lineup.len() + i, n)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LINEUP_SLOTS;

    #[test]
    fn test_player_label() {
        assert_eq!(Player::new("x", "Jorge Ortiz", 3).label(), "#3 J. Ortiz");
        assert_eq!(Player::new("x", "Ichiro", 51).label(), "#51 Ichiro");
    }

    #[test]
    fn test_demo_roster_complete() {
        let roster = InMemoryRoster::demo();
        for id in ["rav", "owl"] {
            let team = roster.team(id).unwrap();
            assert_eq!(team.lineup.len(), LINEUP_SLOTS);
            assert!(roster.has_bench(id));
        }
        assert!(!roster.has_team("nope"));
        assert_eq!(roster.batter("rav", 2).unwrap().label(), "#3 J. Ortiz");
    }

    #[test]
    fn test_setup_uses_roster_strategies() {
        let setup = InMemoryRoster::demo().setup("rav", "owl").unwrap();
        assert_eq!(setup.home_strategy, Strategy::Contact);
        assert_eq!(setup.away.name, "Ravens");
    }

    #[test]
    fn test_yaml_roster() {
        let yaml = r#"
- info: { id: cats, name: Cats }
  strategy: power
  lineup:
    - { id: c1, name: Ann Lee, number: 7 }
"#;
        let roster = InMemoryRoster::from_yaml_str(yaml).unwrap();
        let cats = roster.team("cats").unwrap();
        assert_eq!(cats.strategy, Strategy::Power);
        assert!(!roster.has_bench("cats"));
    }
}
