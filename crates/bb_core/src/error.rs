use thiserror::Error;

use crate::engine::ReduceError;
use crate::rng::SeedError;
use crate::save::SaveError;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Invalid seed: {0}")]
    InvalidSeed(#[from] SeedError),

    #[error("Rejected action: {0}")]
    Reduce(#[from] ReduceError),

    #[error("No decision is pending")]
    NoPendingDecision,

    #[error("Cannot answer a {pending} decision with {offered}")]
    DecisionMismatch { pending: &'static str, offered: &'static str },

    #[error("Save error: {0}")]
    Save(#[from] SaveError),
}

pub type Result<T> = std::result::Result<T, GameError>;
