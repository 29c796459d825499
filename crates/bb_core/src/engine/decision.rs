//! Manager decision eligibility.
//!
//! `detect_decision` is a pure predicate over a state snapshot: it never
//! mutates anything and consumes no random draws. The first rule that
//! matches wins, in this priority order:
//!
//! 1. defensive shift (managed club fielding, once per half-inning, 0-0)
//! 2. steal (success probability >= 0.73)
//! 3. intentional walk (managed club fielding, inning >= 7, close, 2 outs)
//! 4. pinch hitter (inning >= 7, runner in scoring position, < 2 outs, 0-0)
//! 5. bunt, then count-based swing/take/protect
//!
//! A skipped decision class is latched in `GameState::skipped_decisions`
//! until the next batter comes up.

use serde::{Deserialize, Serialize};

use super::state::GameState;
use crate::models::{Base, OnePitchModifier, Strategy, TeamSide};

/// Steal offers require at least this success probability (per-mille).
pub const STEAL_OFFER_THRESHOLD_PM: u16 = 730;

/// Late-inning decisions start in this inning.
pub const LATE_INNING: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionClass {
    DefensiveShift,
    Steal,
    IntentionalWalk,
    PinchHitter,
    Bunt,
    CountBased,
}

impl DecisionClass {
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionClass::DefensiveShift => "defensive_shift",
            DecisionClass::Steal => "steal",
            DecisionClass::IntentionalWalk => "intentional_walk",
            DecisionClass::PinchHitter => "pinch_hitter",
            DecisionClass::Bunt => "bunt",
            DecisionClass::CountBased => "count_based",
        }
    }

    /// Whether the fielding club (rather than the batting club) decides.
    pub fn is_defensive(self) -> bool {
        matches!(self, DecisionClass::DefensiveShift | DecisionClass::IntentionalWalk)
    }
}

/// A decision surfaced to the manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decision {
    DefensiveShift,
    Steal { base: Base, success_pm: u16 },
    IntentionalWalk,
    PinchHitter,
    Bunt,
    CountBased { options: Vec<OnePitchModifier> },
}

impl Decision {
    pub fn class(&self) -> DecisionClass {
        match self {
            Decision::DefensiveShift => DecisionClass::DefensiveShift,
            Decision::Steal { .. } => DecisionClass::Steal,
            Decision::IntentionalWalk => DecisionClass::IntentionalWalk,
            Decision::PinchHitter => DecisionClass::PinchHitter,
            Decision::Bunt => DecisionClass::Bunt,
            Decision::CountBased { .. } => DecisionClass::CountBased,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Decision::DefensiveShift => "Put on the defensive shift?".to_string(),
            Decision::Steal { base, success_pm } => {
                format!("Send the runner to {}? ({}% success)", base.as_str(), success_pm / 10)
            }
            Decision::IntentionalWalk => "Intentionally walk the batter?".to_string(),
            Decision::PinchHitter => "Send up a pinch hitter?".to_string(),
            Decision::Bunt => "Lay down a bunt?".to_string(),
            Decision::CountBased { options } => {
                let names: Vec<&str> = options.iter().map(|o| o.as_str()).collect();
                format!("Call the next pitch: {}?", names.join(" / "))
            }
        }
    }
}

/// Who is managed and what the batting club plays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionContext {
    pub managed: TeamSide,
    /// Strategy of the club currently at bat.
    pub batting_strategy: Strategy,
    /// Roster has at least one bench bat for the batting club.
    pub bench_available: bool,
}

pub fn detect_decision(
    state: &GameState,
    ctx: &DecisionContext,
    is_live_pitch: bool,
) -> Option<Decision> {
    if !is_live_pitch || state.game_over || state.pending_decision.is_some() {
        return None;
    }

    let fielding_managed = state.fielding() == ctx.managed;
    let batting_managed = state.batting() == ctx.managed;
    let open = |class: DecisionClass| !state.skipped_decisions.contains(&class);
    // A pinch hitter's approach replaces the club's for this at-bat.
    let strategy = state.pinch_hitter_strategy.unwrap_or(ctx.batting_strategy);

    if fielding_managed
        && open(DecisionClass::DefensiveShift)
        && !state.shift_offered_this_half
        && !state.defensive_shift
        && state.count.is_fresh()
    {
        return Some(Decision::DefensiveShift);
    }

    if batting_managed && open(DecisionClass::Steal) {
        if let Some((base, success_pm)) = steal_success_pm(state, strategy) {
            if success_pm >= STEAL_OFFER_THRESHOLD_PM {
                return Some(Decision::Steal { base, success_pm });
            }
        }
    }

    if fielding_managed
        && open(DecisionClass::IntentionalWalk)
        && state.inning >= LATE_INNING
        && state.is_close()
        && state.outs == 2
    {
        return Some(Decision::IntentionalWalk);
    }

    if !batting_managed {
        return None;
    }

    if open(DecisionClass::PinchHitter)
        && ctx.bench_available
        && state.pinch_hitter_strategy.is_none()
        && state.inning >= LATE_INNING
        && state.bases.scoring_position()
        && state.outs < 2
        && state.count.is_fresh()
    {
        return Some(Decision::PinchHitter);
    }

    if open(DecisionClass::Bunt) && bunt_eligible(state, strategy) {
        return Some(Decision::Bunt);
    }

    if open(DecisionClass::CountBased) && state.one_pitch_modifier.is_none() {
        if let Some(options) = count_options(state.count.balls, state.count.strikes) {
            return Some(Decision::CountBased { options });
        }
    }

    None
}

/// Steal target and success probability (per-mille) for the current bases,
/// or `None` when no straight steal is possible.
pub fn steal_success_pm(state: &GameState, strategy: Strategy) -> Option<(Base, u16)> {
    let bases = state.bases;
    let (base, mut pm): (Base, i32) = if bases.first && !bases.second {
        (Base::Second, 700)
    } else if bases.second && !bases.third && !bases.first {
        (Base::Third, 620)
    } else {
        return None;
    };

    pm += match strategy {
        Strategy::Aggressive => 80,
        Strategy::Contact => 50,
        Strategy::Balanced => 30,
        Strategy::Patient => 0,
        Strategy::Power => -40,
    };
    if state.count.balls > state.count.strikes {
        pm += 30;
    }
    if state.count.balls == 0 && state.count.strikes == 2 {
        pm -= 30;
    }

    Some((base, pm.clamp(0, 1000) as u16))
}

fn bunt_eligible(state: &GameState, strategy: Strategy) -> bool {
    let situation = (state.bases.first || state.bases.second)
        && state.outs < 2
        && state.count.strikes < 2;
    if !situation {
        return false;
    }
    match strategy {
        Strategy::Power => false,
        Strategy::Contact => true,
        _ => state.inning >= LATE_INNING && state.is_close(),
    }
}

fn count_options(balls: u8, strikes: u8) -> Option<Vec<OnePitchModifier>> {
    match (balls, strikes) {
        (2, 0) | (3, 0) | (3, 1) => Some(vec![OnePitchModifier::SwingAway, OnePitchModifier::Take]),
        (0, 2) | (1, 2) | (3, 2) => Some(vec![OnePitchModifier::Protect]),
        _ => None,
    }
}
