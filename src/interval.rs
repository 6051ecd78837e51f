//! Interval repeat: re-runs the last sequence `interval_time` seconds after
//! it returned the shutter to ready.

use crate::time::{Deadline, TimeDuration, TimeInstant};
use crate::types::{DeviceState, Mode};

/// Countdown between the end of one sequence and the start of the next.
///
/// At most one countdown exists at a time. It is dropped as soon as interval
/// shooting is switched off or the mode changes; neither affects a sequence
/// that is already executing, since the scheduler is only consulted between
/// sequences.
#[derive(Debug, Clone, Copy)]
pub struct IntervalScheduler<I> {
    countdown: Option<Countdown<I>>,
}

#[derive(Debug, Clone, Copy)]
struct Countdown<I> {
    deadline: Deadline<I>,
    mode: Mode,
}

impl<I: TimeInstant> IntervalScheduler<I> {
    /// Creates a scheduler with nothing armed.
    pub fn new() -> Self {
        Self { countdown: None }
    }

    /// Called when a sequence has just finished at `now`.
    ///
    /// Arms the next run if interval shooting is on and the mode can repeat.
    /// Returns true if a countdown was armed.
    pub fn on_sequence_complete(&mut self, state: &DeviceState, now: I) -> bool {
        if !state.interval_enabled() || !state.mode().is_repeatable() {
            self.countdown = None;
            return false;
        }

        let seconds = state.interval_time().max(1);
        self.countdown = Some(Countdown {
            deadline: Deadline::after(now, I::Duration::from_secs(seconds)),
            mode: state.mode(),
        });
        info!("interval armed: {}s", seconds);
        true
    }

    /// Checks the countdown. Returns true exactly once, on the first tick at
    /// or past the deadline; the caller must start the next sequence then.
    pub fn poll(&mut self, state: &DeviceState, now: I) -> bool {
        let Some(countdown) = self.countdown else {
            return false;
        };

        if !state.interval_enabled() || state.mode() != countdown.mode {
            info!("interval stopped");
            self.countdown = None;
            return false;
        }

        if countdown.deadline.is_reached(now) {
            self.countdown = None;
            return true;
        }

        false
    }

    /// Drops any pending countdown.
    pub fn cancel(&mut self) {
        if self.countdown.take().is_some() {
            info!("interval cancelled");
        }
    }

    /// Returns true while a countdown is pending.
    pub fn is_armed(&self) -> bool {
        self.countdown.is_some()
    }

    /// The pending countdown's deadline.
    pub fn deadline(&self) -> Option<Deadline<I>> {
        self.countdown.map(|countdown| countdown.deadline)
    }

    /// Time left on the pending countdown.
    pub fn remaining(&self, now: I) -> Option<I::Duration> {
        self.countdown.map(|countdown| countdown.deadline.remaining(now))
    }
}

impl<I: TimeInstant> Default for IntervalScheduler<I> {
    fn default() -> Self {
        Self::new()
    }
}
