//! Deterministic game engine.
//!
//! Data flows one way: the session asks the decision engine whether to
//! pause, otherwise resolves a pitch from the seeded generator and hands the
//! resulting action to the reducer.

pub mod action;
pub mod commentary;
pub mod decision;
pub mod invariants;
pub mod pitch;
pub mod reducer;
pub mod session;
pub mod state;

pub use action::{ActionKind, GameAction, PERSISTED_KINDS};
pub use decision::{detect_decision, Decision, DecisionClass, DecisionContext};
pub use invariants::{check_invariants, InvariantViolation};
pub use pitch::{resolve_pitch, BattedBall, PitchContext, PitchOutcome, PitchResult};
pub use reducer::{reduce, ReduceError};
pub use session::{DecisionChoice, DispatchReport, GameSession, StepOutcome};
pub use state::{Bases, Count, GamePhase, GameState};
