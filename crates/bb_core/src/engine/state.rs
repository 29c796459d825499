//! Game state aggregate.
//!
//! `GameState` is mutated only by the reducer (`GameState::apply`). Every
//! other component reads it. All fields serialize, so a clone of the state
//! plus the generator position is a complete snapshot.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::decision::{Decision, DecisionClass};
use crate::models::{
    Half, OnePitchModifier, OutLogEntry, PlayLogEntry, Strategy, TeamInfo, TeamSide, LINEUP_SLOTS,
};

/// Balls (0..=3) and strikes (0..=2) between pitches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Count {
    pub balls: u8,
    pub strikes: u8,
}

impl Count {
    pub fn is_fresh(self) -> bool {
        self.balls == 0 && self.strikes == 0
    }
}

/// Base occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Bases {
    pub first: bool,
    pub second: bool,
    pub third: bool,
}

impl Bases {
    pub fn is_empty(self) -> bool {
        !self.first && !self.second && !self.third
    }

    pub fn is_loaded(self) -> bool {
        self.first && self.second && self.third
    }

    pub fn runners(self) -> u8 {
        self.first as u8 + self.second as u8 + self.third as u8
    }

    pub fn scoring_position(self) -> bool {
        self.second || self.third
    }

    /// Move every runner `n` bases; returns runs that crossed the plate.
    /// `batter_to` places the batter afterwards (0 = not on base, 4 = scored).
    pub fn advance_all(&mut self, n: u8, batter_to: u8) -> u8 {
        let mut occupied = [false; 4];
        let mut runs = 0;
        for (base, on) in [(1u8, self.first), (2, self.second), (3, self.third)] {
            if !on {
                continue;
            }
            let dest = base + n;
            if dest >= 4 {
                runs += 1;
            } else {
                occupied[dest as usize] = true;
            }
        }
        match batter_to {
            0 => {}
            b if b >= 4 => runs += 1,
            b => occupied[b as usize] = true,
        }
        self.first = occupied[1];
        self.second = occupied[2];
        self.third = occupied[3];
        runs
    }

    /// Walk-style advancement: only forced runners move. Returns runs.
    pub fn force_batter_to_first(&mut self) -> u8 {
        if !self.first {
            self.first = true;
            return 0;
        }
        if !self.second {
            self.second = true;
            return 0;
        }
        if !self.third {
            self.third = true;
            return 0;
        }
        1
    }
}

/// Coarse lifecycle derived from the state flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    PreGame,
    InProgress,
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub teams: [TeamInfo; 2],
    pub count: Count,
    pub bases: Bases,
    pub outs: u8,
    pub inning: u8,
    pub half: Half,
    pub score: [u16; 2],
    /// Runs per inning, per team (line score).
    pub inning_runs: [Vec<u16>; 2],
    /// Next batting-order slot (0..9) for each team.
    pub batter_index: [u8; 2],

    pub play_log: [Vec<PlayLogEntry>; 2],
    pub strikeout_log: [Vec<OutLogEntry>; 2],
    pub out_log: [Vec<OutLogEntry>; 2],
    pub play_by_play: Vec<String>,

    pub pending_decision: Option<Decision>,
    pub one_pitch_modifier: Option<OnePitchModifier>,
    pub pinch_hitter_strategy: Option<Strategy>,
    pub defensive_shift: bool,
    pub shift_offered_this_half: bool,
    /// Decision classes skipped during the current at-bat.
    pub skipped_decisions: BTreeSet<DecisionClass>,

    pub started: bool,
    pub game_over: bool,
    pub pitch_key: u64,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(TeamInfo::default(), TeamInfo::default())
    }
}

impl GameState {
    pub fn new(away: TeamInfo, home: TeamInfo) -> Self {
        Self {
            teams: [away, home],
            count: Count::default(),
            bases: Bases::default(),
            outs: 0,
            inning: 1,
            half: Half::Top,
            score: [0, 0],
            inning_runs: [vec![0], Vec::new()],
            batter_index: [0, 0],
            play_log: [Vec::new(), Vec::new()],
            strikeout_log: [Vec::new(), Vec::new()],
            out_log: [Vec::new(), Vec::new()],
            play_by_play: Vec::new(),
            pending_decision: None,
            one_pitch_modifier: None,
            pinch_hitter_strategy: None,
            defensive_shift: false,
            shift_offered_this_half: false,
            skipped_decisions: BTreeSet::new(),
            started: false,
            game_over: false,
            pitch_key: 0,
        }
    }

    pub fn phase(&self) -> GamePhase {
        if self.game_over {
            GamePhase::GameOver
        } else if self.started {
            GamePhase::InProgress
        } else {
            GamePhase::PreGame
        }
    }

    #[inline]
    pub fn batting(&self) -> TeamSide {
        self.half.batting()
    }

    #[inline]
    pub fn fielding(&self) -> TeamSide {
        self.half.fielding()
    }

    /// Batting-order slot of the current batter.
    pub fn current_slot(&self) -> u8 {
        self.batter_index[self.batting().index()]
    }

    /// `inning * 2 + half`; changes exactly at half-inning transitions.
    pub fn half_marker(&self) -> u32 {
        self.inning as u32 * 2 + self.half.index()
    }

    pub fn run_margin(&self) -> u16 {
        self.score[0].abs_diff(self.score[1])
    }

    pub fn is_close(&self) -> bool {
        self.run_margin() <= 2
    }

    pub fn team_name(&self, side: TeamSide) -> &str {
        &self.teams[side.index()].name
    }

    pub fn inning_label(&self) -> String {
        format!("{} {}", self.half.label(), ordinal(self.inning))
    }

    /// Rotate the batting order of the team at bat.
    pub(crate) fn advance_batter(&mut self) {
        let idx = self.batting().index();
        self.batter_index[idx] = (self.batter_index[idx] + 1) % LINEUP_SLOTS as u8;
    }
}

pub fn ordinal(n: u8) -> String {
    let suffix = match (n % 10, n % 100) {
        (1, 11) | (2, 12) | (3, 13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
