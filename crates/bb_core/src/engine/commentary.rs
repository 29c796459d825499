//! Play-by-play text.
//!
//! Lines are a pure function of the action and the pre-action state, so two
//! games driven by the same seed narrate identically.

use super::state::Count;
use crate::models::{Base, HitType, OnePitchModifier, OutKind, PitchType, Strategy};

pub fn count_suffix(count: Count) -> String {
    format!("Count {}-{}.", count.balls, count.strikes)
}

pub fn ball(number: u8, pitch: PitchType, count: Count) -> String {
    format!("Ball {} ({}). {}", number, pitch.as_str(), count_suffix(count))
}

pub fn strike(swinging: bool, pitch: PitchType, count: Count) -> String {
    let how = if swinging { "swinging" } else { "looking" };
    format!("Strike {} ({}). {}", how, pitch.as_str(), count_suffix(count))
}

pub fn foul(pitch: PitchType, count: Count) -> String {
    format!("Foul ball ({}). {}", pitch.as_str(), count_suffix(count))
}

pub fn strikeout(batter: &str, swinging: bool, pitch: PitchType) -> String {
    let how = if swinging { "swinging" } else { "looking" };
    format!("{} strikes out {} ({}).", batter, how, pitch.as_str())
}

pub fn walk(batter: &str, intentional: bool) -> String {
    if intentional {
        format!("{} is intentionally walked.", batter)
    } else {
        format!("{} draws a walk.", batter)
    }
}

pub fn hit(batter: &str, hit: HitType, pitch: Option<PitchType>) -> String {
    match pitch {
        Some(pitch) => format!("{} hits a {} ({}).", batter, hit.as_str(), pitch.as_str()),
        None => format!("{} beats out a bunt single.", batter),
    }
}

pub fn batted_out(batter: &str, out: OutKind) -> String {
    format!("{} {}.", batter, out.as_str())
}

pub fn runs_scored(runs: u8, away: &str, away_score: u16, home: &str, home_score: u16) -> String {
    let noun = if runs == 1 { "run scores" } else { "runs score" };
    format!("{} {}. {} {}, {} {}.", runs, noun, away, away_score, home, home_score)
}

pub fn steal(base: Base, safe: bool) -> String {
    if safe {
        format!("Runner steals {}.", base.as_str())
    } else {
        format!("Runner caught stealing {}.", base.as_str())
    }
}

pub fn bunt_foul(count: Count) -> String {
    format!("Bunt foul. {}", count_suffix(count))
}

pub fn modifier(modifier: OnePitchModifier) -> String {
    format!("Manager calls {} for the next pitch.", modifier.as_str())
}

pub fn pinch_hitter(strategy: Strategy) -> String {
    format!("Pinch hitter announced ({} approach).", strategy.as_str())
}

pub fn shift(on: bool) -> String {
    if on {
        "Defense shifts.".to_string()
    } else {
        "Defense returns to standard alignment.".to_string()
    }
}

pub fn end_of_half(label: &str) -> String {
    format!("End of {}.", label)
}

pub fn final_score(away: &str, away_score: u16, home: &str, home_score: u16, walk_off: bool) -> String {
    let tag = if walk_off { " Walk-off!" } else { "" };
    format!("Final: {} {}, {} {}.{}", away, away_score, home, home_score, tag)
}
