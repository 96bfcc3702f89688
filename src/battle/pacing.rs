// In: src/battle/pacing.rs

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    AfterTurn,
    AfterRound,
}

/// Presentation-side delay between turns and rounds. Has no effect on the outcome.
pub trait Pacer {
    fn pause(&self, pause: Pause);
}

/// Headless pacing: never waits.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPacing;

impl Pacer for NoPacing {
    fn pause(&self, _pause: Pause) {}
}

/// Blocks the thread for a fixed delay per pause kind.
#[derive(Debug, Clone, Copy)]
pub struct SleepPacer {
    pub turn_delay: Duration,
    pub round_delay: Duration,
}

impl SleepPacer {
    pub fn from_millis(turn_ms: u64, round_ms: u64) -> Self {
        Self {
            turn_delay: Duration::from_millis(turn_ms),
            round_delay: Duration::from_millis(round_ms),
        }
    }
}

impl Pacer for SleepPacer {
    fn pause(&self, pause: Pause) {
        let delay = match pause {
            Pause::AfterTurn => self.turn_delay,
            Pause::AfterRound => self.round_delay,
        };
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}
