//! Core device state: the selected mode, the shutter state and the two
//! adjustable times.

use crate::config::Config;

/// Shooting mode selected by the 5-way mode switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// One shutter trigger per press.
    #[default]
    Single,

    /// Two triggers spaced one second apart.
    Double,

    /// Shutter open while the button is held.
    Bulb,

    /// Shutter open for `shutter_time` seconds.
    BulbTimer,

    /// Exposures of 1, 2, 4, ... seconds up to `shutter_time`.
    BulbBracket,
}

impl Mode {
    /// Returns true if this mode can be re-run by the interval scheduler
    /// without a held trigger.
    ///
    /// Bulb exposures last exactly as long as the button is held, so there is
    /// nothing to repeat once the button is up.
    pub fn is_repeatable(&self) -> bool {
        !matches!(self, Mode::Bulb)
    }
}

/// The mode-agnostic shutter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShutterState {
    /// Setup: times may be adjusted, the trigger is ignored.
    #[default]
    NotReady,

    /// A press on the trigger starts the selected mode's sequence.
    Ready,

    /// The shutter is physically open (or a trigger pulse is in flight).
    Open,
}

impl ShutterState {
    /// Returns true if `self -> next` is a permitted transition.
    ///
    /// Permitted: NotReady -> Ready, Ready -> Open, Open -> Ready,
    /// Ready -> NotReady. Re-asserting the current state is a no-op and
    /// always allowed.
    pub fn can_transition_to(self, next: ShutterState) -> bool {
        use ShutterState::*;
        matches!(
            (self, next),
            (NotReady, NotReady)
                | (Ready, Ready)
                | (Open, Open)
                | (NotReady, Ready)
                | (Ready, Open)
                | (Open, Ready)
                | (Ready, NotReady)
        )
    }
}

/// Errors raised when a shutter state change would break the transition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShutterError {
    /// The requested transition is not one of the permitted edges.
    InvalidTransition {
        /// State before the request.
        from: ShutterState,
        /// Requested state.
        to: ShutterState,
    },
}

impl core::fmt::Display for ShutterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ShutterError::InvalidTransition { from, to } => {
                write!(f, "invalid shutter transition: {:?} -> {:?}", from, to)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ShutterError {}

/// Everything the displays and the mode engine need to know about the device.
///
/// Mutated by the input sampler (mode, interval flag, times) and by the
/// shutter actuator (shutter state). All mutation goes through methods so
/// the shutter transition rules and the time floor hold at every tick.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState {
    mode: Mode,
    shutter: ShutterState,
    interval_enabled: bool,
    shutter_time: u32,
    interval_time: u32,
    minimum_time: u32,
}

impl DeviceState {
    /// Creates the power-on state: single mode, not ready, interval off.
    pub fn new(config: &Config) -> Self {
        let minimum_time = config.minimum_time.max(1);
        Self {
            mode: Mode::Single,
            shutter: ShutterState::NotReady,
            interval_enabled: false,
            shutter_time: config.initial_shutter_time.max(minimum_time),
            interval_time: config.initial_interval_time.max(minimum_time),
            minimum_time,
        }
    }

    /// Currently selected mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current shutter state.
    pub fn shutter(&self) -> ShutterState {
        self.shutter
    }

    /// Whether interval shooting is switched on.
    pub fn interval_enabled(&self) -> bool {
        self.interval_enabled
    }

    /// Bulb exposure time in seconds.
    pub fn shutter_time(&self) -> u32 {
        self.shutter_time
    }

    /// Interval between sequences in seconds.
    pub fn interval_time(&self) -> u32 {
        self.interval_time
    }

    /// Floor applied to both adjustable times.
    pub fn minimum_time(&self) -> u32 {
        self.minimum_time
    }

    /// Changes the shutter state, enforcing the permitted transitions.
    pub fn set_shutter(&mut self, next: ShutterState) -> Result<(), ShutterError> {
        if !self.shutter.can_transition_to(next) {
            return Err(ShutterError::InvalidTransition {
                from: self.shutter,
                to: next,
            });
        }
        self.shutter = next;
        Ok(())
    }

    /// Selects a new mode. Ignored while the shutter is open.
    ///
    /// Returns true if the mode actually changed.
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if self.shutter == ShutterState::Open || self.mode == mode {
            return false;
        }
        self.mode = mode;
        true
    }

    /// Sets the interval flag.
    pub fn set_interval_enabled(&mut self, enabled: bool) {
        self.interval_enabled = enabled;
    }

    /// Moves `shutter_time` by `delta` seconds, clamped to the floor.
    ///
    /// Only honoured in setup (`NotReady`). Returns true if the value changed.
    pub fn adjust_shutter_time(&mut self, delta: i64) -> bool {
        if self.shutter != ShutterState::NotReady {
            return false;
        }
        let next = clamp_time(self.shutter_time, delta, self.minimum_time);
        let changed = next != self.shutter_time;
        self.shutter_time = next;
        changed
    }

    /// Moves `interval_time` by `delta` seconds, clamped to the floor.
    ///
    /// Only honoured in setup (`NotReady`). Returns true if the value changed.
    pub fn adjust_interval_time(&mut self, delta: i64) -> bool {
        if self.shutter != ShutterState::NotReady {
            return false;
        }
        let next = clamp_time(self.interval_time, delta, self.minimum_time);
        let changed = next != self.interval_time;
        self.interval_time = next;
        changed
    }
}

fn clamp_time(current: u32, delta: i64, floor: u32) -> u32 {
    let next = i64::from(current).saturating_add(delta);
    next.clamp(i64::from(floor), i64::from(u32::MAX)) as u32
}
