//! Time abstraction traits and non-blocking deadlines.
//!
//! The controller never sleeps for an exposure or an interval. Every wait is a
//! [`Deadline`] recorded when the wait begins and compared against the clock
//! once per tick.

/// Trait for abstracting the monotonic clock.
pub trait TimeSource<I: TimeInstant> {
    /// Returns the current time instant.
    fn now(&self) -> I;
}

/// Trait abstraction for duration types.
pub trait TimeDuration: Copy + PartialEq {
    /// Zero duration constant.
    const ZERO: Self;

    /// Converts duration to milliseconds.
    fn as_millis(&self) -> u64;

    /// Creates duration from milliseconds.
    fn from_millis(millis: u64) -> Self;

    /// Saturating subtraction (returns ZERO on underflow).
    fn saturating_sub(self, other: Self) -> Self;

    /// Creates duration from whole seconds.
    #[inline]
    fn from_secs(secs: u32) -> Self {
        Self::from_millis(u64::from(secs) * 1000)
    }
}

/// Trait abstraction for instant types.
pub trait TimeInstant: Copy {
    /// Duration type for this instant.
    type Duration: TimeDuration;

    /// Calculates duration since an earlier instant.
    ///
    /// Implementations should saturate to zero if `earlier` is actually later.
    fn duration_since(&self, earlier: Self) -> Self::Duration;

    /// Adds duration to instant, returns None on overflow.
    fn checked_add(self, duration: Self::Duration) -> Option<Self>;
}

/// A point in time a wait is scheduled to end at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline<I> {
    start: I,
    length_ms: u64,
}

impl<I: TimeInstant> Deadline<I> {
    /// Starts a wait of `duration` at `now`.
    pub fn after(now: I, duration: I::Duration) -> Self {
        Self {
            start: now,
            length_ms: duration.as_millis(),
        }
    }

    /// Instant the wait started at.
    pub fn start(&self) -> I {
        self.start
    }

    /// Returns true once `now` is at or past the deadline.
    ///
    /// Measured as elapsed time since the start, so a clock that would overflow
    /// `checked_add` still reaches the deadline.
    pub fn is_reached(&self, now: I) -> bool {
        now.duration_since(self.start).as_millis() >= self.length_ms
    }

    /// Time left until the deadline, zero once reached.
    pub fn remaining(&self, now: I) -> I::Duration {
        let elapsed = now.duration_since(self.start).as_millis();
        I::Duration::from_millis(self.length_ms.saturating_sub(elapsed))
    }

    /// The deadline as an instant, if representable.
    pub fn instant(&self) -> Option<I> {
        self.start.checked_add(I::Duration::from_millis(self.length_ms))
    }
}
