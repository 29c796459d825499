//! Desync detection.
//!
//! These checks never fail a transition. Debug builds log violations after
//! every dispatch; release builds skip the work entirely.

use thiserror::Error;

use super::state::GameState;
use crate::models::{TeamSide, LINEUP_SLOTS};
use crate::stats::slot_totals;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("count {balls}-{strikes} left unresolved")]
    CountOutOfRange { balls: u8, strikes: u8 },

    #[error("{outs} outs recorded in a live half-inning")]
    OutsOutOfRange { outs: u8 },

    #[error("{} slot {slot}: {strikeouts} strikeouts exceed {at_bats} at-bats", .side.as_str())]
    StrikeoutsExceedAtBats { side: TeamSide, slot: u8, strikeouts: u32, at_bats: u32 },

    #[error("{} slot {slot} trails the next slot ({behind} < {ahead} plate appearances)", .side.as_str())]
    PlateAppearanceOrder { side: TeamSide, slot: u8, behind: u32, ahead: u32 },

    #[error("{} score {score} disagrees with line score total {line_total}", .side.as_str())]
    LineScoreMismatch { side: TeamSide, score: u16, line_total: u16 },
}

pub fn check_invariants(state: &GameState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    if state.count.balls > 3 || state.count.strikes > 2 {
        violations.push(InvariantViolation::CountOutOfRange {
            balls: state.count.balls,
            strikes: state.count.strikes,
        });
    }
    if !state.game_over && state.outs > 2 {
        violations.push(InvariantViolation::OutsOutOfRange { outs: state.outs });
    }

    for side in TeamSide::BOTH {
        let totals = slot_totals(state, side);
        for (slot, line) in totals.iter().enumerate() {
            if line.strikeouts > line.at_bats {
                violations.push(InvariantViolation::StrikeoutsExceedAtBats {
                    side,
                    slot: slot as u8,
                    strikeouts: line.strikeouts,
                    at_bats: line.at_bats,
                });
            }
        }
        for slot in 0..LINEUP_SLOTS - 1 {
            let (pa, next) = (totals[slot].plate_appearances, totals[slot + 1].plate_appearances);
            if pa < next {
                violations.push(InvariantViolation::PlateAppearanceOrder {
                    side,
                    slot: slot as u8,
                    behind: pa,
                    ahead: next,
                });
            }
        }

        let line_total: u16 = state.inning_runs[side.index()].iter().sum();
        if line_total != state.score[side.index()] {
            violations.push(InvariantViolation::LineScoreMismatch {
                side,
                score: state.score[side.index()],
                line_total,
            });
        }
    }

    violations
}

/// Log violations in debug builds.
#[inline]
pub fn debug_check(state: &GameState) {
    #[cfg(debug_assertions)]
    for violation in check_invariants(state) {
        tracing::warn!(pitch_key = state.pitch_key, %violation, "state invariant violated");
    }
    #[cfg(not(debug_assertions))]
    let _ = state;
}
