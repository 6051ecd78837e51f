//! Exposure ladder for bracketed bulb runs.

use heapless::Vec;

/// Longest possible bracket: 1, 2, 4, ... 2^31 seconds plus a clamped last
/// step for `u32::MAX`.
pub const BRACKET_CAPACITY: usize = 33;

/// Exposure times for one bracketed run, in seconds.
///
/// Starts at one second and doubles until the next exposure would pass the
/// target; the last exposure is the target itself. A target of 10 gives
/// `[1, 2, 4, 8, 10]`, a target of 8 gives `[1, 2, 4, 8]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketSequence {
    exposures: Vec<u32, BRACKET_CAPACITY>,
}

impl BracketSequence {
    /// Builds the exposure ladder up to `shutter_time` seconds.
    ///
    /// Targets below one second are treated as one second.
    pub fn new(shutter_time: u32) -> Self {
        let target = shutter_time.max(1);
        let mut exposures = Vec::new();
        let mut exposure: u32 = 1;

        loop {
            // Capacity covers the whole u32 range; push cannot fail.
            let _ = exposures.push(exposure.min(target));
            if exposure >= target {
                break;
            }
            exposure = exposure.saturating_mul(2);
        }

        Self { exposures }
    }

    /// All exposure times in order.
    pub fn durations(&self) -> &[u32] {
        &self.exposures
    }

    /// Exposure time of the step at `index`.
    pub fn get(&self, index: usize) -> Option<u32> {
        self.exposures.get(index).copied()
    }

    /// Number of exposures.
    pub fn len(&self) -> usize {
        self.exposures.len()
    }

    /// Always false; a bracket has at least one exposure.
    pub fn is_empty(&self) -> bool {
        self.exposures.is_empty()
    }

    /// Total open time across the run, in seconds.
    pub fn total_exposure(&self) -> u64 {
        self.exposures.iter().map(|&s| u64::from(s)).sum()
    }
}
