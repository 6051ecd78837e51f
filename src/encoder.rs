//! Quadrature decoding and coarse-then-fine adjustment.
//!
//! [`QuadratureDecoder`] turns the two encoder lines into signed steps using a
//! 16-entry lookup keyed by the previous and current line state. [`AdjustRate`]
//! turns those steps into a number of seconds, growing the step size the longer
//! the knob keeps turning in one direction.

use crate::config::{AccelerationTier, Config, ACCELERATION_TIERS};
use crate::time::{TimeDuration, TimeInstant};

/// Step delta for every `(previous << 2) | current` pair of line states.
///
/// Line state is `(a << 1) | b`. Clockwise rotation walks the Gray sequence
/// `00 -> 01 -> 11 -> 10 -> 00` and yields +1 per edge; the reverse walk
/// yields -1. No change, and any pair where both lines flipped at once, yields
/// 0: a double flip means an edge was missed or the contacts bounced, and the
/// direction cannot be known.
const TRANSITIONS: [i8; 16] = [
    0, 1, -1, 0, //
    -1, 0, 0, 1, //
    1, 0, 0, -1, //
    0, -1, 1, 0, //
];

/// Decodes two quadrature lines into signed steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QuadratureDecoder {
    previous: u8,
}

impl QuadratureDecoder {
    /// Creates a decoder primed with the lines' current state, so the first
    /// sample never reports a phantom step.
    pub fn new(a: bool, b: bool) -> Self {
        Self {
            previous: lines_to_bits(a, b),
        }
    }

    /// Samples both lines and returns the step since the last call.
    #[inline]
    pub fn update(&mut self, a: bool, b: bool) -> i8 {
        self.decode(lines_to_bits(a, b))
    }

    /// Same as [`update`](Self::update) with the lines already packed as
    /// `(a << 1) | b`. Upper bits are ignored.
    pub fn decode(&mut self, bits: u8) -> i8 {
        let current = bits & 0b11;
        let step = TRANSITIONS[usize::from((self.previous << 2) | current)];
        self.previous = current;
        step
    }
}

impl Default for QuadratureDecoder {
    fn default() -> Self {
        Self { previous: 0b00 }
    }
}

#[inline]
fn lines_to_bits(a: bool, b: bool) -> u8 {
    (u8::from(a) << 1) | u8::from(b)
}

/// Scales encoder steps into seconds based on how long the knob has been
/// turning continuously in one direction.
#[derive(Debug, Clone, Copy)]
pub struct AdjustRate<I> {
    tiers: [AccelerationTier; ACCELERATION_TIERS],
    timeout_ms: u64,
    run: Option<Run<I>>,
}

#[derive(Debug, Clone, Copy)]
struct Run<I> {
    started: I,
    last_step: I,
    direction: i8,
}

impl<I: TimeInstant> AdjustRate<I> {
    /// Creates a rate tracker from the configured tiers.
    pub fn new(config: &Config) -> Self {
        Self {
            tiers: config.acceleration,
            timeout_ms: u64::from(config.rotation_timeout_ms),
            run: None,
        }
    }

    /// Converts `steps` observed at `now` into a signed number of seconds.
    ///
    /// A reversal or a pause longer than the rotation timeout starts a new
    /// run at the finest step.
    pub fn step(&mut self, steps: i8, now: I) -> i64 {
        if steps == 0 {
            return 0;
        }

        let direction = steps.signum();
        let run = match self.run {
            Some(run)
                if run.direction == direction
                    && now.duration_since(run.last_step).as_millis() <= self.timeout_ms =>
            {
                Run {
                    last_step: now,
                    ..run
                }
            }
            _ => Run {
                started: now,
                last_step: now,
                direction,
            },
        };
        self.run = Some(run);

        let run_ms = now.duration_since(run.started).as_millis();
        let per_step = self
            .tiers
            .iter()
            .rev()
            .find(|tier| run_ms >= u64::from(tier.after_ms))
            .map_or(1, |tier| tier.step);

        i64::from(steps) * i64::from(per_step)
    }

    /// Forgets the current rotation run.
    pub fn reset(&mut self) {
        self.run = None;
    }
}
