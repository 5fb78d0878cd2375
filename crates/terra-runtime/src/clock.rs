//! Round countdown and the secondary competitor cadence.
//!
//! Both timers are advanced in whole seconds by the session. The clock
//! only reports that a round boundary is due; the session runs the
//! boundary effects and then calls [`RoundClock::advance_round`].

use serde::Serialize;

/// Whether the timers are firing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockState {
    Idle,
    Running,
}

/// Result of one countdown tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockEvent {
    /// The clock is idle; nothing happened.
    Idle,
    /// One second elapsed; `remaining` seconds are left.
    Countdown { remaining: u32 },
    /// The round is over. Run boundary effects, then `advance_round`.
    BoundaryDue,
}

/// Presentation view of the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ClockSnapshot {
    pub state: ClockState,
    pub round: u32,
    pub time_remaining: u32,
    pub round_seconds: u32,
}

/// Per-second round countdown.
#[derive(Clone, Debug)]
pub struct RoundClock {
    state: ClockState,
    round_seconds: u32,
    remaining: u32,
    round: u32,
}

impl RoundClock {
    /// Idle clock for rounds of `round_seconds` (must be > 0).
    pub fn new(round_seconds: u32) -> Self {
        Self {
            state: ClockState::Idle,
            round_seconds,
            remaining: round_seconds,
            round: 1,
        }
    }

    /// Reset to round 1 with a full countdown and start firing.
    pub fn start(&mut self) {
        self.state = ClockState::Running;
        self.round = 1;
        self.remaining = self.round_seconds;
    }

    /// Stop firing; state is kept for display.
    pub fn stop(&mut self) {
        self.state = ClockState::Idle;
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[cfg(test)]
    pub(crate) fn set_remaining(&mut self, secs: u32) {
        self.remaining = secs;
    }

    /// Advance one second.
    ///
    /// With one second or less left the countdown does not move; the
    /// boundary is reported instead.
    pub fn tick(&mut self) -> ClockEvent {
        if !self.is_running() {
            return ClockEvent::Idle;
        }
        if self.remaining <= 1 {
            return ClockEvent::BoundaryDue;
        }
        self.remaining -= 1;
        ClockEvent::Countdown {
            remaining: self.remaining,
        }
    }

    /// Increment the round and reset the countdown. Returns the new round.
    pub fn advance_round(&mut self) -> u32 {
        self.round = self.round.saturating_add(1);
        self.remaining = self.round_seconds;
        self.round
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            state: self.state,
            round: self.round,
            time_remaining: self.remaining,
            round_seconds: self.round_seconds,
        }
    }
}

/// Fixed-interval timer counted in whole seconds.
#[derive(Clone, Copy, Debug)]
pub struct Cadence {
    interval: u32,
    elapsed: u32,
}

impl Cadence {
    /// Fires every `interval` seconds (must be > 0).
    pub fn new(interval: u32) -> Self {
        Self {
            interval,
            elapsed: 0,
        }
    }

    /// Count one second; true when the interval completes.
    pub fn step(&mut self) -> bool {
        self.elapsed += 1;
        if self.elapsed >= self.interval {
            self.elapsed = 0;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.elapsed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_clock_does_not_tick() {
        let mut c = RoundClock::new(180);
        assert_eq!(c.tick(), ClockEvent::Idle);
        assert_eq!(c.remaining(), 180);
    }

    #[test]
    fn countdown_then_boundary() {
        let mut c = RoundClock::new(3);
        c.start();
        assert_eq!(c.tick(), ClockEvent::Countdown { remaining: 2 });
        assert_eq!(c.tick(), ClockEvent::Countdown { remaining: 1 });
        assert_eq!(c.tick(), ClockEvent::BoundaryDue);
        assert_eq!(c.advance_round(), 2);
        assert_eq!(c.remaining(), 3);
    }

    #[test]
    fn start_resets_round() {
        let mut c = RoundClock::new(10);
        c.start();
        c.advance_round();
        c.tick();
        c.stop();
        assert_eq!(c.tick(), ClockEvent::Idle);
        c.start();
        assert_eq!((c.round(), c.remaining()), (1, 10));
    }

    #[test]
    fn cadence_fires_every_interval() {
        let mut cad = Cadence::new(8);
        let at: Vec<u32> = (1..=24).filter(|_| cad.step()).collect();
        assert_eq!(at, vec![8, 16, 24]);
    }
}
