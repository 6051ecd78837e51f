//! Timing constants and adjustment behaviour, fixed at construction.

/// One row of the coarse-then-fine adjustment table.
///
/// Once the encoder has been turned continuously in one direction for at
/// least `after_ms`, each encoder edge moves the time by `step` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelerationTier {
    /// Length of the current rotation run before this tier applies.
    pub after_ms: u32,

    /// Seconds per encoder edge in this tier.
    pub step: u32,
}

impl AccelerationTier {
    /// Creates a tier.
    pub const fn new(after_ms: u32, step: u32) -> Self {
        Self { after_ms, step }
    }
}

/// Number of rows in the adjustment table.
pub const ACCELERATION_TIERS: usize = 3;

/// Device configuration.
///
/// All durations in milliseconds, all adjustable times in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Length of the contact closure for a single shutter trigger.
    pub trigger_pulse_ms: u32,

    /// Gap between the starts of the two triggers in double mode.
    pub double_spacing_ms: u32,

    /// Pause after each bracket exposure so the camera can store the frame.
    pub bracket_pause_ms: u32,

    /// Trigger button lockout after an accepted edge.
    pub debounce_ms: u32,

    /// A pause longer than this between encoder edges ends a rotation run.
    pub rotation_timeout_ms: u32,

    /// Floor for both adjustable times.
    pub minimum_time: u32,

    /// Power-on `shutter_time`.
    pub initial_shutter_time: u32,

    /// Power-on `interval_time`.
    pub initial_interval_time: u32,

    /// Coarse-then-fine step table, ordered by `after_ms`.
    pub acceleration: [AccelerationTier; ACCELERATION_TIERS],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trigger_pulse_ms: 100,
            double_spacing_ms: 1_000,
            bracket_pause_ms: 500,
            debounce_ms: 50,
            rotation_timeout_ms: 400,
            minimum_time: 1,
            initial_shutter_time: 1,
            initial_interval_time: 10,
            acceleration: [
                AccelerationTier::new(0, 1),
                AccelerationTier::new(1_000, 10),
                AccelerationTier::new(3_000, 60),
            ],
        }
    }
}

impl Config {
    /// Sets the trigger pulse length.
    pub fn with_trigger_pulse_ms(mut self, ms: u32) -> Self {
        self.trigger_pulse_ms = ms;
        self
    }

    /// Sets the double-mode spacing.
    pub fn with_double_spacing_ms(mut self, ms: u32) -> Self {
        self.double_spacing_ms = ms;
        self
    }

    /// Sets the pause between bracket exposures.
    pub fn with_bracket_pause_ms(mut self, ms: u32) -> Self {
        self.bracket_pause_ms = ms;
        self
    }

    /// Sets the trigger debounce lockout.
    pub fn with_debounce_ms(mut self, ms: u32) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Sets the rotation run timeout.
    pub fn with_rotation_timeout_ms(mut self, ms: u32) -> Self {
        self.rotation_timeout_ms = ms;
        self
    }

    /// Sets the power-on times.
    pub fn with_initial_times(mut self, shutter_time: u32, interval_time: u32) -> Self {
        self.initial_shutter_time = shutter_time;
        self.initial_interval_time = interval_time;
        self
    }

    /// Replaces the adjustment table.
    pub fn with_acceleration(mut self, tiers: [AccelerationTier; ACCELERATION_TIERS]) -> Self {
        self.acceleration = tiers;
        self
    }

    /// Checks that the configuration can drive the hardware safely.
    ///
    /// # Errors
    /// * `ZeroTriggerPulse` - A trigger must close the contact for some time
    /// * `PulseOutlastsDoubleSpacing` - The first double-mode pulse must end
    ///   before the second is due
    /// * `ZeroBracketPause` - The camera needs time between bracket frames
    /// * `ZeroMinimumTime` - Exposures and intervals must last at least a second
    /// * `AccelerationOutOfOrder` - Tiers must be sorted by `after_ms` with nonzero steps
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trigger_pulse_ms == 0 {
            return Err(ConfigError::ZeroTriggerPulse);
        }

        if self.trigger_pulse_ms >= self.double_spacing_ms {
            return Err(ConfigError::PulseOutlastsDoubleSpacing);
        }

        if self.bracket_pause_ms == 0 {
            return Err(ConfigError::ZeroBracketPause);
        }

        if self.minimum_time == 0 {
            return Err(ConfigError::ZeroMinimumTime);
        }

        let ordered = self
            .acceleration
            .windows(2)
            .all(|pair| pair[0].after_ms <= pair[1].after_ms);
        if !ordered || self.acceleration.iter().any(|tier| tier.step == 0) {
            return Err(ConfigError::AccelerationOutOfOrder);
        }

        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Trigger pulse of zero length.
    ZeroTriggerPulse,

    /// Trigger pulse not shorter than the double-mode spacing.
    PulseOutlastsDoubleSpacing,

    /// Bracket pause of zero length.
    ZeroBracketPause,

    /// Time floor of zero seconds.
    ZeroMinimumTime,

    /// Acceleration tiers unsorted or with a zero step.
    AccelerationOutOfOrder,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroTriggerPulse => {
                write!(f, "trigger pulse must be longer than zero")
            }
            ConfigError::PulseOutlastsDoubleSpacing => {
                write!(f, "trigger pulse must be shorter than the double spacing")
            }
            ConfigError::ZeroBracketPause => {
                write!(f, "bracket pause must be longer than zero")
            }
            ConfigError::ZeroMinimumTime => {
                write!(f, "minimum time must be at least one second")
            }
            ConfigError::AccelerationOutOfOrder => {
                write!(
                    f,
                    "acceleration tiers must be sorted by run length and have nonzero steps"
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_pulse() {
        let config = Config::default().with_trigger_pulse_ms(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroTriggerPulse));
    }

    #[test]
    fn rejects_pulse_as_long_as_double_spacing() {
        let config = Config::default().with_trigger_pulse_ms(1_000);
        assert_eq!(config.validate(), Err(ConfigError::PulseOutlastsDoubleSpacing));

        let config = Config::default()
            .with_trigger_pulse_ms(1_500)
            .with_double_spacing_ms(1_000);
        assert_eq!(config.validate(), Err(ConfigError::PulseOutlastsDoubleSpacing));

        let config = Config::default().with_trigger_pulse_ms(999);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_bracket_pause() {
        let config = Config::default().with_bracket_pause_ms(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroBracketPause));
    }

    #[test]
    fn rejects_unsorted_tiers() {
        let config = Config::default().with_acceleration([
            AccelerationTier::new(0, 1),
            AccelerationTier::new(3_000, 60),
            AccelerationTier::new(1_000, 10),
        ]);
        assert_eq!(config.validate(), Err(ConfigError::AccelerationOutOfOrder));
    }

    #[test]
    fn rejects_zero_step() {
        let config = Config::default().with_acceleration([
            AccelerationTier::new(0, 0),
            AccelerationTier::new(1_000, 10),
            AccelerationTier::new(3_000, 60),
        ]);
        assert_eq!(config.validate(), Err(ConfigError::AccelerationOutOfOrder));
    }
}
