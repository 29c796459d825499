//! Pitch resolver.
//!
//! Consumes draws from the session generator in a fixed order:
//! pitch type, outcome class, then one follow-up draw (foul/strike,
//! strike/ball, or contact quality), plus a hit-type draw when the ball
//! falls in. Every table below is part of the save-compatibility contract.

use serde::{Deserialize, Serialize};

use super::action::GameAction;
use super::state::Count;
use crate::models::{BuntOutcome, HitType, OnePitchModifier, OutKind, PitchType, Strategy};
use crate::rng::SeededRng;

// ============================================================================
// Constants
// ============================================================================

/// Swing rate forced by the SwingAway modifier.
pub const FORCED_SWING_RATE: u32 = 920;
/// Outcome draws at or above this value put the ball in play.
pub const IN_PLAY_FLOOR: u32 = 920;
pub const MAX_SWING_RATE: u32 = 900;

const FOUL_PCT: u32 = 30;
const PROTECT_FOUL_PCT: u32 = 50;
const PROTECT_PM: u32 = 1200;
const SHIFT_OUT_BONUS: u32 = 40;

// ============================================================================
// Inputs / outputs
// ============================================================================

/// Everything the resolver reads from the game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchContext {
    pub count: Count,
    /// Effective batting strategy (pinch-hitter override applied).
    pub strategy: Strategy,
    pub modifier: Option<OnePitchModifier>,
    pub defensive_shift: bool,
    pub runner_on_first: bool,
    pub outs: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattedBall {
    Hit(HitType),
    Out(OutKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitchResult {
    Ball,
    CalledStrike,
    SwingingStrike,
    Foul,
    InPlay(BattedBall),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchOutcome {
    pub pitch: PitchType,
    pub swing_rate: u32,
    pub result: PitchResult,
}

impl PitchOutcome {
    /// Reducer action for this outcome.
    pub fn to_action(&self) -> GameAction {
        let pitch = self.pitch;
        match self.result {
            PitchResult::Ball => GameAction::Wait { pitch },
            PitchResult::CalledStrike => GameAction::Strike { swinging: false, pitch },
            PitchResult::SwingingStrike => GameAction::Strike { swinging: true, pitch },
            PitchResult::Foul => GameAction::Foul { pitch },
            PitchResult::InPlay(BattedBall::Hit(hit)) => GameAction::Hit { hit, pitch },
            PitchResult::InPlay(BattedBall::Out(out)) => GameAction::BattedOut { out, pitch },
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

pub fn resolve_pitch(ctx: &PitchContext, rng: &mut SeededRng) -> PitchOutcome {
    let pitch = select_pitch(ctx.count, rng.draw_below(100));
    let swing_rate = swing_rate(ctx.count.strikes, ctx.strategy, ctx.modifier, pitch);
    let protect = ctx.modifier == Some(OnePitchModifier::Protect);

    let r = rng.draw_below(1000);
    let result = if r < swing_rate {
        let foul_pct = if protect { PROTECT_FOUL_PCT } else { FOUL_PCT };
        if rng.draw_below(100) < foul_pct {
            PitchResult::Foul
        } else {
            PitchResult::SwingingStrike
        }
    } else if r < IN_PLAY_FLOOR {
        if rng.draw_below(100) < zone_pct(pitch, ctx.count) {
            PitchResult::CalledStrike
        } else {
            PitchResult::Ball
        }
    } else {
        PitchResult::InPlay(resolve_contact(ctx, rng))
    };

    PitchOutcome { pitch, swing_rate, result }
}

fn resolve_contact(ctx: &PitchContext, rng: &mut SeededRng) -> BattedBall {
    let c = rng.draw_below(1000);
    let t = out_threshold(ctx.strategy, ctx.defensive_shift);
    if c < t {
        let kind = if c < t * 12 / 100 && ctx.runner_on_first && ctx.outs < 2 {
            OutKind::DoublePlay
        } else if c < t * 45 / 100 {
            OutKind::GroundOut
        } else if c < t * 85 / 100 {
            OutKind::FlyOut
        } else {
            OutKind::PopOut
        };
        BattedBall::Out(kind)
    } else {
        BattedBall::Hit(hit_type(ctx.strategy, rng.draw_below(100)))
    }
}

/// Count-dependent pitch selection from a `[0, 100)` draw.
pub fn select_pitch(count: Count, roll: u32) -> PitchType {
    use PitchType::*;
    let table: [(u32, PitchType); 4] = if count.strikes > count.balls {
        [(35, Fastball), (60, Slider), (80, Curveball), (92, Changeup)]
    } else if count.balls > count.strikes {
        [(60, Fastball), (75, Sinker), (87, Changeup), (95, Slider)]
    } else {
        [(48, Fastball), (60, Sinker), (76, Slider), (88, Changeup)]
    };
    let fallback = if count.strikes > count.balls {
        Sinker
    } else {
        Curveball
    };
    table
        .iter()
        .find(|(cut, _)| roll < *cut)
        .map(|(_, pitch)| *pitch)
        .unwrap_or(fallback)
}

/// Swing rate in per-mille.
pub fn swing_rate(
    strikes: u8,
    strategy: Strategy,
    modifier: Option<OnePitchModifier>,
    pitch: PitchType,
) -> u32 {
    match modifier {
        Some(OnePitchModifier::SwingAway) => return FORCED_SWING_RATE,
        Some(OnePitchModifier::Take) => return 0,
        _ => {}
    }
    let protect_pm = if modifier == Some(OnePitchModifier::Protect) {
        PROTECT_PM
    } else {
        1000
    };
    let base = 500u64.saturating_sub(75 * strikes as u64);
    let r1 = round_div(base * strategy_swing_pm(strategy) as u64 * protect_pm as u64, 1_000_000);
    let rate = round_div(r1 * pitch_swing_pm(pitch) as u64, 1000);
    rate.min(MAX_SWING_RATE as u64) as u32
}

fn round_div(numerator: u64, denominator: u64) -> u64 {
    (numerator + denominator / 2) / denominator
}

pub fn strategy_swing_pm(strategy: Strategy) -> u32 {
    match strategy {
        Strategy::Balanced => 1000,
        Strategy::Aggressive => 1150,
        Strategy::Patient => 800,
        Strategy::Contact => 1050,
        Strategy::Power => 1000,
    }
}

pub fn pitch_swing_pm(pitch: PitchType) -> u32 {
    match pitch {
        PitchType::Fastball => 1000,
        PitchType::Sinker => 1040,
        PitchType::Slider => 1080,
        PitchType::Curveball => 920,
        PitchType::Changeup => 1060,
    }
}

/// Chance (percent) a taken pitch is a called strike.
pub fn zone_pct(pitch: PitchType, count: Count) -> u32 {
    let mut pct: i32 = match pitch {
        PitchType::Fastball => 55,
        PitchType::Sinker => 50,
        PitchType::Slider => 40,
        PitchType::Curveball => 38,
        PitchType::Changeup => 45,
    };
    if count.balls == 3 {
        pct += 15;
    }
    if count.strikes == 2 && count.balls < 2 {
        pct -= 15;
    }
    pct.clamp(5, 95) as u32
}

pub fn out_threshold(strategy: Strategy, shift: bool) -> u32 {
    let base = match strategy {
        Strategy::Balanced => 340,
        Strategy::Aggressive => 370,
        Strategy::Patient => 330,
        Strategy::Contact => 300,
        Strategy::Power => 420,
    };
    if shift {
        base + SHIFT_OUT_BONUS
    } else {
        base
    }
}

/// Single / double / triple cut points; home run above the last.
pub fn hit_cut_points(strategy: Strategy) -> [u32; 3] {
    match strategy {
        Strategy::Balanced => [68, 88, 92],
        Strategy::Aggressive => [62, 85, 89],
        Strategy::Patient => [70, 90, 94],
        Strategy::Contact => [78, 93, 97],
        Strategy::Power => [50, 75, 78],
    }
}

pub fn hit_type(strategy: Strategy, roll: u32) -> HitType {
    let [single, double, triple] = hit_cut_points(strategy);
    if roll < single {
        HitType::Single
    } else if roll < double {
        HitType::Double
    } else if roll < triple {
        HitType::Triple
    } else {
        HitType::HomeRun
    }
}

/// One draw; `true` when the runner is safe.
pub fn resolve_steal(success_pm: u16, rng: &mut SeededRng) -> bool {
    rng.draw_below(1000) < success_pm as u32
}

pub fn resolve_bunt(rng: &mut SeededRng) -> BuntOutcome {
    match rng.draw_below(100) {
        r if r < 55 => BuntOutcome::Sacrifice,
        r if r < 70 => BuntOutcome::Single,
        r if r < 88 => BuntOutcome::Foul,
        _ => BuntOutcome::PopUp,
    }
}
