//! Time, speech and cancellation seams for the autoplay loop.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub trait Clock {
    /// Milliseconds since the clock was created.
    fn now_ms(&self) -> u64;

    /// Block until `due_ms` (no-op if it has passed).
    fn sleep_until(&mut self, due_ms: u64);
}

/// Simulated time. Sleeping jumps straight to the deadline.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, ms: u64) {
        self.now += ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn sleep_until(&mut self, due_ms: u64) {
        self.now = self.now.max(due_ms);
    }
}

#[derive(Debug)]
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self { start: Instant::now() }
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn sleep_until(&mut self, due_ms: u64) {
        let now = self.now_ms();
        if due_ms > now {
            thread::sleep(Duration::from_millis(due_ms - now));
        }
    }
}

/// Announcement playback, as seen by the scheduler. Consulted only.
pub trait SpeechGate {
    fn is_speech_pending(&self) -> bool;

    fn cancel_announcements(&self) {}
}

/// No speech output at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSpeech;

impl SpeechGate for SilentSpeech {
    fn is_speech_pending(&self) -> bool {
        false
    }
}

/// Speech that stays busy for a fixed number of polls, then goes quiet.
/// `u32::MAX` polls models a stuck audio device.
#[derive(Debug, Default)]
pub struct ScriptedSpeech {
    busy_polls: Cell<u32>,
    cancelled: Cell<bool>,
}

impl ScriptedSpeech {
    pub fn busy_for(polls: u32) -> Self {
        Self { busy_polls: Cell::new(polls), cancelled: Cell::new(false) }
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

impl SpeechGate for ScriptedSpeech {
    fn is_speech_pending(&self) -> bool {
        let left = self.busy_polls.get();
        if left == 0 {
            return false;
        }
        if left != u32::MAX {
            self.busy_polls.set(left - 1);
        }
        true
    }

    fn cancel_announcements(&self) {
        self.busy_polls.set(0);
        self.cancelled.set(true);
    }
}

/// Shared stop flag. Cloned handles observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
