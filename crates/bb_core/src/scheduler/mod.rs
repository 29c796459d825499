//! Autoplay scheduling.
//!
//! Single-threaded and cooperative: one timer at most, one pitch in flight
//! at most. Blocking happens here and nowhere else in the engine.

pub mod autoplay;
pub mod clock;
pub mod runner;

pub use autoplay::{
    should_run, AutoplayScheduler, SchedulerInputs, SchedulerPhase, Timer, TimerAction,
    TimerPurpose,
};
pub use clock::{CancelToken, Clock, ManualClock, ScriptedSpeech, SilentSpeech, SpeechGate, SystemClock};
pub use runner::{run_autoplay, Advance, AutoplayReport, AutoplayStop, AutoplayTarget, TargetStatus};
