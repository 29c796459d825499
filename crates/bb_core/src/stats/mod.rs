//! Box score and signatures derived from the append-only logs.

use std::fmt::Write as _;

use serde::Serialize;

use crate::engine::GameState;
use crate::models::{HitType, PlayKind, TeamSide, LINEUP_SLOTS};
use crate::roster::RosterProvider;
use crate::save::GameEvent;

/// Per-slot batting totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SlotTotals {
    pub plate_appearances: u32,
    pub at_bats: u32,
    pub hits: u32,
    pub doubles: u32,
    pub triples: u32,
    pub home_runs: u32,
    pub walks: u32,
    pub strikeouts: u32,
    pub rbi: u32,
}

/// Aggregate the logs of one club. Hits and every batter out (strikeouts
/// included) are at-bats; walks are plate appearances only.
pub fn slot_totals(state: &GameState, side: TeamSide) -> [SlotTotals; LINEUP_SLOTS] {
    let mut totals = [SlotTotals::default(); LINEUP_SLOTS];
    let i = side.index();

    for entry in &state.play_log[i] {
        let Some(line) = totals.get_mut(entry.slot as usize) else { continue };
        line.plate_appearances += 1;
        line.rbi += entry.rbi as u32;
        match entry.kind {
            PlayKind::Hit(hit) => {
                line.at_bats += 1;
                line.hits += 1;
                match hit {
                    HitType::Double => line.doubles += 1,
                    HitType::Triple => line.triples += 1,
                    HitType::HomeRun => line.home_runs += 1,
                    HitType::Single => {}
                }
            }
            PlayKind::Walk | PlayKind::IntentionalWalk => line.walks += 1,
        }
    }
    for entry in state.out_log[i].iter().chain(&state.strikeout_log[i]) {
        if let Some(line) = totals.get_mut(entry.slot as usize) {
            line.plate_appearances += 1;
            line.at_bats += 1;
        }
    }
    for entry in &state.strikeout_log[i] {
        if let Some(line) = totals.get_mut(entry.slot as usize) {
            line.strikeouts += 1;
        }
    }
    totals
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattingLine {
    pub slot: u8,
    pub label: String,
    #[serde(flatten)]
    pub totals: SlotTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamBox {
    pub name: String,
    pub lines: Vec<BattingLine>,
    /// Runs per inning, `None` for an unplayed bottom half.
    pub innings: Vec<Option<u16>>,
    pub runs: u16,
    pub hits: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxScore {
    pub away: TeamBox,
    pub home: TeamBox,
    pub is_final: bool,
}

impl BoxScore {
    pub fn from_state(state: &GameState, roster: Option<&dyn RosterProvider>) -> Self {
        let innings = state.inning_runs[0].len().max(state.inning_runs[1].len());
        let team_box = |side: TeamSide| {
            let team = &state.teams[side.index()];
            let lines: Vec<BattingLine> = slot_totals(state, side)
                .iter()
                .enumerate()
                .map(|(slot, totals)| {
                    let label = roster
                        .and_then(|r| r.batter(&team.id, slot as u8))
                        .map(|p| p.label())
                        .unwrap_or_else(|| format!("Slot {}", slot + 1));
                    BattingLine { slot: slot as u8, label, totals: *totals }
                })
                .collect();
            let runs_by_inning = &state.inning_runs[side.index()];
            TeamBox {
                name: team.name.clone(),
                hits: lines.iter().map(|l| l.totals.hits).sum(),
                lines,
                innings: (0..innings).map(|i| runs_by_inning.get(i).copied()).collect(),
                runs: state.score[side.index()],
            }
        };
        Self {
            away: team_box(TeamSide::Away),
            home: team_box(TeamSide::Home),
            is_final: state.game_over,
        }
    }

    /// Fixed-width text rendering: line score, then both batting tables.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let width = self.away.name.len().max(self.home.name.len()).max(4);

        let _ = write!(out, "{:width$} ", "", width = width);
        for i in 0..self.away.innings.len() {
            let _ = write!(out, "{:>3}", i + 1);
        }
        let _ = writeln!(out, "  {:>3}{:>3}", "R", "H");
        for team in [&self.away, &self.home] {
            let _ = write!(out, "{:width$} ", team.name, width = width);
            for runs in &team.innings {
                match runs {
                    Some(r) => {
                        let _ = write!(out, "{:>3}", r);
                    }
                    None => {
                        let _ = write!(out, "{:>3}", "X");
                    }
                }
            }
            let _ = writeln!(out, "  {:>3}{:>3}", team.runs, team.hits);
        }

        for team in [&self.away, &self.home] {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "{:<18}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}",
                team.name, "PA", "AB", "H", "2B", "3B", "HR", "BB", "K", "RBI"
            );
            for line in &team.lines {
                let t = &line.totals;
                let _ = writeln!(
                    out,
                    "{:<18}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}",
                    line.label,
                    t.plate_appearances,
                    t.at_bats,
                    t.hits,
                    t.doubles,
                    t.triples,
                    t.home_runs,
                    t.walks,
                    t.strikeouts,
                    t.rbi
                );
            }
        }
        out
    }
}

/// Stable text signature of the first `n` logged events.
pub fn event_signature(events: &[GameEvent], n: usize) -> String {
    events
        .iter()
        .take(n)
        .map(|event| {
            let action = serde_json::to_string(&event.action)
                .unwrap_or_else(|_| format!("{:?}", event.action));
            format!("{}:{}", event.at, action)
        })
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GameAction;
    use crate::models::{Half, OutLogEntry, PitchType, PlayLogEntry, TeamInfo};
    use crate::roster::InMemoryRoster;

    fn entry(slot: u8, kind: PlayKind, rbi: u8) -> PlayLogEntry {
        PlayLogEntry { slot, inning: 1, half: Half::Top, kind, rbi }
    }

    fn out(slot: u8) -> OutLogEntry {
        OutLogEntry { slot, inning: 1, half: Half::Top, kind: None }
    }

    #[test]
    fn test_walk_is_not_an_at_bat() {
        let mut state = GameState::default();
        state.play_log[0].push(entry(0, PlayKind::Walk, 0));
        state.play_log[0].push(entry(1, PlayKind::Hit(HitType::Double), 1));
        state.strikeout_log[0].push(out(2));

        let totals = slot_totals(&state, TeamSide::Away);
        assert_eq!(totals[0].plate_appearances, 1);
        assert_eq!(totals[0].at_bats, 0);
        assert_eq!(totals[0].walks, 1);
        assert_eq!(totals[1].at_bats, 1);
        assert_eq!(totals[1].doubles, 1);
        assert_eq!(totals[1].rbi, 1);
        assert_eq!(totals[2].strikeouts, 1);
        assert_eq!(totals[2].at_bats, 1);
    }

    #[test]
    fn test_box_score_labels() {
        let state = GameState::new(TeamInfo::new("rav", "Ravens"), TeamInfo::new("zzz", "Zed"));
        let roster = InMemoryRoster::demo();
        let score = BoxScore::from_state(&state, Some(&roster));
        assert_eq!(score.away.lines[2].label, "#3 J. Ortiz");
        assert_eq!(score.home.lines[2].label, "Slot 3");

        let bare = BoxScore::from_state(&state, None);
        assert_eq!(bare.away.lines[0].label, "Slot 1");
    }

    #[test]
    fn test_unplayed_bottom_half_renders_x() {
        let mut state = GameState::default();
        state.inning_runs = [vec![0, 1], vec![0]];
        let score = BoxScore::from_state(&state, None);
        assert_eq!(score.home.innings, vec![Some(0), None]);
        assert!(score.render().contains('X'));
    }

    #[test]
    fn test_event_signature_shape() {
        let events = vec![
            GameEvent::new(1, 0, GameAction::Wait { pitch: PitchType::Fastball }),
            GameEvent::new(2, 1, GameAction::Foul { pitch: PitchType::Slider }),
        ];
        let sig = event_signature(&events, 5);
        assert_eq!(
            sig,
            r#"0:{"type":"wait","payload":{"pitch":"fastball"}}|1:{"type":"foul","payload":{"pitch":"slider"}}"#
        );
        assert_eq!(event_signature(&events, 1).matches('|').count(), 0);
    }
}
