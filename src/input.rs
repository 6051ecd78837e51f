//! Input sampling: mode switch decoding, trigger debouncing and encoder
//! adjustment of the two times.

use crate::config::Config;
use crate::encoder::{AdjustRate, QuadratureDecoder};
use crate::time::{TimeDuration, TimeInstant};
use crate::types::{DeviceState, Mode, ShutterState};

/// One tick's worth of line levels, already converted to "active" booleans.
///
/// The mode, interval and adjust lines are switched to ground on the board,
/// so `true` here means the line reads low. The encoder lines are passed
/// through as raw levels since only their transitions matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawInputs {
    /// The three mode-select lines, `true` when grounded.
    pub mode_lines: [bool; 3],

    /// Interval shooting switch.
    pub interval_switch: bool,

    /// Bulb time adjust switch.
    pub adjust_shutter: bool,

    /// Interval time adjust switch.
    pub adjust_interval: bool,

    /// Encoder line A level.
    pub encoder_a: bool,

    /// Encoder line B level.
    pub encoder_b: bool,

    /// Shutter trigger input, `true` while pressed.
    pub trigger: bool,
}

/// Decode table for the 5-way mode switch.
///
/// Each position grounds one line or two neighbouring lines:
///
/// | lines (3 2 1) | mode         |
/// |---------------|--------------|
/// | `0 0 1`       | Single       |
/// | `0 1 1`       | Double       |
/// | `0 1 0`       | Bulb         |
/// | `1 1 0`       | BulbTimer    |
/// | `1 0 0`       | BulbBracket  |
///
/// `000` (between detents), `101` and `111` are not produced by a healthy
/// switch and decode to `None`.
pub struct ModeSwitch;

impl ModeSwitch {
    /// Decodes the line pattern, `None` for patterns with no mode.
    pub fn decode(lines: [bool; 3]) -> Option<Mode> {
        let pattern =
            u8::from(lines[0]) | (u8::from(lines[1]) << 1) | (u8::from(lines[2]) << 2);
        match pattern {
            0b001 => Some(Mode::Single),
            0b011 => Some(Mode::Double),
            0b010 => Some(Mode::Bulb),
            0b110 => Some(Mode::BulbTimer),
            0b100 => Some(Mode::BulbBracket),
            _ => None,
        }
    }
}

/// Edge reported by the trigger debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerEdge {
    /// No accepted change this tick.
    #[default]
    None,

    /// Button went down.
    Pressed,

    /// Button came up.
    Released,
}

/// Edge debouncer for the shutter trigger.
///
/// After an accepted edge the line is ignored for the lockout period, which
/// swallows contact bounce without delaying the first edge.
#[derive(Debug, Clone, Copy)]
pub struct TriggerButton<I> {
    pressed: bool,
    last_edge: Option<I>,
    lockout_ms: u64,
}

impl<I: TimeInstant> TriggerButton<I> {
    /// Creates a debouncer with the given lockout.
    pub fn new(lockout_ms: u32) -> Self {
        Self {
            pressed: false,
            last_edge: None,
            lockout_ms: u64::from(lockout_ms),
        }
    }

    /// Feeds the current level and returns any accepted edge.
    pub fn update(&mut self, level: bool, now: I) -> TriggerEdge {
        if level == self.pressed {
            return TriggerEdge::None;
        }

        if let Some(last) = self.last_edge {
            if now.duration_since(last).as_millis() < self.lockout_ms {
                return TriggerEdge::None;
            }
        }

        self.pressed = level;
        self.last_edge = Some(now);
        if level {
            TriggerEdge::Pressed
        } else {
            TriggerEdge::Released
        }
    }

    /// Debounced level.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}

/// What the sampler saw this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputEvents {
    /// Debounced trigger edge.
    pub trigger: TriggerEdge,

    /// Debounced trigger level, for modes that follow the button directly.
    pub trigger_held: bool,

    /// Mode the switch is set to; the last valid one if the pattern is bad.
    pub requested_mode: Mode,

    /// Either adjust switch is engaged.
    pub setup_requested: bool,

    /// A time value changed this tick.
    pub adjusted: bool,
}

/// Reads switches and the encoder and folds them into [`DeviceState`].
///
/// Mode changes are reported, not applied: the controller applies them once
/// no sequence is running.
#[derive(Debug, Clone, Copy)]
pub struct InputSampler<I> {
    decoder: QuadratureDecoder,
    rate: AdjustRate<I>,
    trigger: TriggerButton<I>,
    requested_mode: Mode,
}

impl<I: TimeInstant> InputSampler<I> {
    /// Creates a sampler. `initial` primes the encoder decoder.
    pub fn new(config: &Config, initial: &RawInputs) -> Self {
        Self {
            decoder: QuadratureDecoder::new(initial.encoder_a, initial.encoder_b),
            rate: AdjustRate::new(config),
            trigger: TriggerButton::new(config.debounce_ms),
            requested_mode: ModeSwitch::decode(initial.mode_lines).unwrap_or_default(),
        }
    }

    /// Processes one tick of inputs.
    pub fn sample(&mut self, raw: &RawInputs, now: I, state: &mut DeviceState) -> InputEvents {
        match ModeSwitch::decode(raw.mode_lines) {
            Some(mode) => {
                if mode != self.requested_mode {
                    debug!("mode switch moved to {:?}", mode);
                }
                self.requested_mode = mode;
            }
            None => {
                debug!("undecodable mode pattern, holding {:?}", self.requested_mode);
            }
        }

        state.set_interval_enabled(raw.interval_switch);

        // The decoder must see every sample or it loses track of the phase.
        let steps = self.decoder.update(raw.encoder_a, raw.encoder_b);
        let adjusted = self.apply_steps(steps, raw, now, state);

        let trigger = self.trigger.update(raw.trigger, now);

        InputEvents {
            trigger,
            trigger_held: self.trigger.is_pressed(),
            requested_mode: self.requested_mode,
            setup_requested: raw.adjust_shutter || raw.adjust_interval,
            adjusted,
        }
    }

    /// Mode the switch currently asks for.
    pub fn requested_mode(&self) -> Mode {
        self.requested_mode
    }

    fn apply_steps(&mut self, steps: i8, raw: &RawInputs, now: I, state: &mut DeviceState) -> bool {
        if state.shutter() == ShutterState::Open {
            self.rate.reset();
            return false;
        }

        if raw.adjust_shutter {
            let delta = self.rate.step(steps, now);
            delta != 0 && state.adjust_shutter_time(delta)
        } else if raw.adjust_interval {
            let delta = self.rate.step(steps, now);
            delta != 0 && state.adjust_interval_time(delta)
        } else {
            self.rate.reset();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::testing::At;

    const SINGLE: [bool; 3] = [true, false, false];
    const BULB_TIMER: [bool; 3] = [false, true, true];

    #[test]
    fn decodes_every_switch_position() {
        assert_eq!(ModeSwitch::decode([true, false, false]), Some(Mode::Single));
        assert_eq!(ModeSwitch::decode([true, true, false]), Some(Mode::Double));
        assert_eq!(ModeSwitch::decode([false, true, false]), Some(Mode::Bulb));
        assert_eq!(ModeSwitch::decode([false, true, true]), Some(Mode::BulbTimer));
        assert_eq!(ModeSwitch::decode([false, false, true]), Some(Mode::BulbBracket));
    }

    #[test]
    fn undefined_patterns_decode_to_none() {
        assert_eq!(ModeSwitch::decode([false, false, false]), None);
        assert_eq!(ModeSwitch::decode([true, false, true]), None);
        assert_eq!(ModeSwitch::decode([true, true, true]), None);
    }

    #[test]
    fn invalid_pattern_holds_last_mode() {
        let config = Config::default();
        let mut state = DeviceState::new(&config);
        let raw = RawInputs {
            mode_lines: BULB_TIMER,
            ..RawInputs::default()
        };
        let mut sampler = InputSampler::new(&config, &raw);
        assert_eq!(sampler.requested_mode(), Mode::BulbTimer);

        let floating = RawInputs {
            mode_lines: [true, true, true],
            ..raw
        };
        let events = sampler.sample(&floating, At(10), &mut state);
        assert_eq!(events.requested_mode, Mode::BulbTimer);
    }

    #[test]
    fn trigger_bounce_is_swallowed() {
        let mut button = TriggerButton::new(50);
        assert_eq!(button.update(true, At(0)), TriggerEdge::Pressed);
        assert_eq!(button.update(false, At(5)), TriggerEdge::None);
        assert_eq!(button.update(true, At(10)), TriggerEdge::None);
        assert!(button.is_pressed());
        assert_eq!(button.update(false, At(80)), TriggerEdge::Released);
        assert!(!button.is_pressed());
    }

    #[test]
    fn held_level_is_debounced() {
        let config = Config::default();
        let mut state = DeviceState::new(&config);
        let idle = RawInputs {
            mode_lines: SINGLE,
            ..RawInputs::default()
        };
        let mut sampler = InputSampler::new(&config, &idle);
        let pressed = RawInputs {
            trigger: true,
            ..idle
        };

        let events = sampler.sample(&pressed, At(0), &mut state);
        assert_eq!(events.trigger, TriggerEdge::Pressed);
        assert!(events.trigger_held);

        let events = sampler.sample(&idle, At(10), &mut state);
        assert_eq!(events.trigger, TriggerEdge::None);
        assert!(events.trigger_held);

        let events = sampler.sample(&idle, At(60), &mut state);
        assert_eq!(events.trigger, TriggerEdge::Released);
        assert!(!events.trigger_held);
    }

    #[test]
    fn encoder_adjusts_shutter_time_in_setup() {
        let config = Config::default();
        let mut state = DeviceState::new(&config);
        let idle = RawInputs {
            mode_lines: SINGLE,
            adjust_shutter: true,
            ..RawInputs::default()
        };
        let mut sampler = InputSampler::new(&config, &idle);
        let before = state.shutter_time();

        let turned = RawInputs {
            encoder_b: true,
            ..idle
        };
        let events = sampler.sample(&turned, At(0), &mut state);
        assert!(events.adjusted);
        assert!(events.setup_requested);
        assert_eq!(state.shutter_time(), before + 1);
        assert_eq!(state.interval_time(), config.initial_interval_time);
    }

    #[test]
    fn encoder_ignored_without_adjust_switch() {
        let config = Config::default();
        let mut state = DeviceState::new(&config);
        let idle = RawInputs {
            mode_lines: SINGLE,
            ..RawInputs::default()
        };
        let mut sampler = InputSampler::new(&config, &idle);

        let turned = RawInputs {
            encoder_b: true,
            ..idle
        };
        let events = sampler.sample(&turned, At(0), &mut state);
        assert!(!events.adjusted);
        assert_eq!(state.shutter_time(), config.initial_shutter_time);
    }

    #[test]
    fn encoder_adjusts_interval_time() {
        let config = Config::default();
        let mut state = DeviceState::new(&config);
        let idle = RawInputs {
            mode_lines: SINGLE,
            adjust_interval: true,
            encoder_a: true,
            encoder_b: true,
            ..RawInputs::default()
        };
        let mut sampler = InputSampler::new(&config, &idle);

        // 11 -> 01 is a counter-clockwise edge.
        let turned = RawInputs {
            encoder_a: false,
            ..idle
        };
        sampler.sample(&turned, At(0), &mut state);
        assert_eq!(state.interval_time(), config.initial_interval_time - 1);
    }
}
