//! The mode engine: one shot sequence per trigger, driven tick by tick.
//!
//! Every mode is a variant of [`ShotSequence`] and runs through the same
//! [`ModeEngine::start`] / [`ModeEngine::service`] pair, so the interval
//! scheduler can re-run a sequence without knowing which mode it is.

use crate::bracket::BracketSequence;
use crate::config::Config;
use crate::shutter::{ShutterActuator, ShutterTransport};
use crate::time::{Deadline, TimeDuration, TimeInstant};
use crate::types::{DeviceState, Mode, ShutterError, ShutterState};

/// Timing information returned by service operations.
///
/// Indicates when the engine (or the controller) needs to be serviced again.
/// Inputs still have to be polled at the loop's own cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServiceTiming<D> {
    /// Following the trigger line. Service at the polling rate.
    Continuous,

    /// Waiting on a deadline this far away.
    Delay(D),

    /// Nothing in flight.
    Complete,
}

/// Trigger state the engine cares about on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TriggerInput {
    /// A debounced press edge arrived this tick.
    pub pressed: bool,

    /// The raw trigger line is held.
    pub held: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BracketPhase<I> {
    Exposing(Deadline<I>),
    Pausing(Deadline<I>),
}

/// An in-flight sequence, one variant per mode.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ShotSequence<I> {
    Single,
    Double {
        second_at: Deadline<I>,
        second_fired: bool,
    },
    Bulb,
    BulbTimer {
        close_at: Deadline<I>,
    },
    BulbBracket {
        plan: BracketSequence,
        index: usize,
        phase: BracketPhase<I>,
    },
}

/// Runs the selected mode's shot sequence against a [`ShutterActuator`].
pub struct ModeEngine<I: TimeInstant> {
    sequence: Option<ShotSequence<I>>,
    double_spacing: I::Duration,
    bracket_pause: I::Duration,
}

impl<I: TimeInstant> ModeEngine<I> {
    /// Creates an idle engine.
    pub fn new(config: &Config) -> Self {
        Self {
            sequence: None,
            double_spacing: I::Duration::from_millis(u64::from(config.double_spacing_ms)),
            bracket_pause: I::Duration::from_millis(u64::from(config.bracket_pause_ms)),
        }
    }

    /// Returns true while a sequence is executing.
    pub fn is_running(&self) -> bool {
        self.sequence.is_some()
    }

    /// Starts the sequence for `state.mode()`. The shutter must be `Ready`.
    ///
    /// # Errors
    /// Returns `InvalidTransition` if the shutter is not ready; nothing is
    /// actuated in that case.
    pub fn start<X: ShutterTransport>(
        &mut self,
        state: &mut DeviceState,
        actuator: &mut ShutterActuator<I, X>,
        now: I,
        trigger: TriggerInput,
    ) -> Result<ServiceTiming<I::Duration>, ShutterError> {
        if self.is_running() || state.shutter() != ShutterState::Ready {
            return Err(ShutterError::InvalidTransition {
                from: state.shutter(),
                to: ShutterState::Open,
            });
        }

        // Times are floored on adjustment; check again in case the floor moved.
        let shutter_time = state.shutter_time().max(1);

        let sequence = match state.mode() {
            Mode::Single => {
                actuator.fire(state, now)?;
                ShotSequence::Single
            }
            Mode::Double => {
                actuator.fire(state, now)?;
                ShotSequence::Double {
                    second_at: Deadline::after(now, self.double_spacing),
                    second_fired: false,
                }
            }
            Mode::Bulb => {
                actuator.open(state)?;
                ShotSequence::Bulb
            }
            Mode::BulbTimer => {
                actuator.open(state)?;
                ShotSequence::BulbTimer {
                    close_at: Deadline::after(now, I::Duration::from_secs(shutter_time)),
                }
            }
            Mode::BulbBracket => {
                let plan = BracketSequence::new(shutter_time);
                let first = plan.get(0).unwrap_or(1);
                actuator.open(state)?;
                ShotSequence::BulbBracket {
                    plan,
                    index: 0,
                    phase: BracketPhase::Exposing(Deadline::after(
                        now,
                        I::Duration::from_secs(first),
                    )),
                }
            }
        };

        info!("sequence started: {:?}", state.mode());
        self.sequence = Some(sequence);

        // The press that started the run must not also cancel it.
        self.service(
            state,
            actuator,
            now,
            TriggerInput {
                pressed: false,
                ..trigger
            },
        )
    }

    /// Advances the running sequence.
    ///
    /// Returns `Complete` on the tick the sequence finishes (the shutter is
    /// back at `Ready`) and on every tick while idle.
    pub fn service<X: ShutterTransport>(
        &mut self,
        state: &mut DeviceState,
        actuator: &mut ShutterActuator<I, X>,
        now: I,
        trigger: TriggerInput,
    ) -> Result<ServiceTiming<I::Duration>, ShutterError> {
        let Some(mut sequence) = self.sequence.take() else {
            return Ok(ServiceTiming::Complete);
        };

        // On error the sequence stays in flight so a later tick can still
        // close the shutter.
        match self.advance(&mut sequence, state, actuator, now, trigger) {
            Ok(ServiceTiming::Complete) => {
                info!("sequence finished");
                Ok(ServiceTiming::Complete)
            }
            Ok(timing) => {
                self.sequence = Some(sequence);
                Ok(timing)
            }
            Err(err) => {
                self.sequence = Some(sequence);
                Err(err)
            }
        }
    }

    fn advance<X: ShutterTransport>(
        &self,
        sequence: &mut ShotSequence<I>,
        state: &mut DeviceState,
        actuator: &mut ShutterActuator<I, X>,
        now: I,
        trigger: TriggerInput,
    ) -> Result<ServiceTiming<I::Duration>, ShutterError> {
        if trigger.pressed && matches!(sequence, ShotSequence::BulbBracket { .. }) {
            self.abort_bracket(state, actuator)?;
            return Ok(ServiceTiming::Complete);
        }

        let pulse_done = actuator.service(state, now)?;

        let timing = match sequence {
            ShotSequence::Single => {
                if pulse_done || !actuator.is_firing() {
                    ServiceTiming::Complete
                } else {
                    self.pulse_delay(actuator, now)
                }
            }
            ShotSequence::Double {
                second_at,
                second_fired,
            } => {
                if !*second_fired {
                    if second_at.is_reached(now) && !actuator.is_firing() {
                        debug!("double: second trigger");
                        actuator.fire(state, now)?;
                        *second_fired = true;
                        self.pulse_delay(actuator, now)
                    } else if actuator.is_firing() {
                        self.pulse_delay(actuator, now)
                    } else {
                        ServiceTiming::Delay(second_at.remaining(now))
                    }
                } else if actuator.is_firing() {
                    self.pulse_delay(actuator, now)
                } else {
                    ServiceTiming::Complete
                }
            }
            ShotSequence::Bulb => {
                if trigger.held {
                    ServiceTiming::Continuous
                } else {
                    actuator.close(state)?;
                    ServiceTiming::Complete
                }
            }
            // A release during a timed exposure is ignored on purpose: the
            // exposure cannot be cut short.
            ShotSequence::BulbTimer { close_at } => {
                if close_at.is_reached(now) {
                    actuator.close(state)?;
                    ServiceTiming::Complete
                } else {
                    ServiceTiming::Delay(close_at.remaining(now))
                }
            }
            ShotSequence::BulbBracket { plan, index, phase } => match *phase {
                BracketPhase::Exposing(close_at) => {
                    if !close_at.is_reached(now) {
                        ServiceTiming::Delay(close_at.remaining(now))
                    } else {
                        actuator.close(state)?;
                        if *index + 1 < plan.len() {
                            let pause = Deadline::after(now, self.bracket_pause);
                            *phase = BracketPhase::Pausing(pause);
                            ServiceTiming::Delay(pause.remaining(now))
                        } else {
                            ServiceTiming::Complete
                        }
                    }
                }
                BracketPhase::Pausing(resume_at) => {
                    if !resume_at.is_reached(now) {
                        ServiceTiming::Delay(resume_at.remaining(now))
                    } else {
                        *index += 1;
                        let exposure = plan.get(*index).unwrap_or(1);
                        debug!("bracket: exposure {} of {}s", *index + 1, exposure);
                        actuator.open(state)?;
                        let close_at = Deadline::after(now, I::Duration::from_secs(exposure));
                        *phase = BracketPhase::Exposing(close_at);
                        ServiceTiming::Delay(close_at.remaining(now))
                    }
                }
            },
        };

        Ok(timing)
    }

    /// Cancels a bracket run, closing the shutter if it is open.
    ///
    /// Only bracket runs can be cancelled; returns false (and leaves the
    /// sequence running) for any other mode or when idle.
    pub fn cancel<X: ShutterTransport>(
        &mut self,
        state: &mut DeviceState,
        actuator: &mut ShutterActuator<I, X>,
    ) -> Result<bool, ShutterError> {
        if !matches!(self.sequence, Some(ShotSequence::BulbBracket { .. })) {
            return Ok(false);
        }
        self.abort_bracket(state, actuator)?;
        self.sequence = None;
        Ok(true)
    }

    fn abort_bracket<X: ShutterTransport>(
        &self,
        state: &mut DeviceState,
        actuator: &mut ShutterActuator<I, X>,
    ) -> Result<(), ShutterError> {
        info!("bracket cancelled");
        if state.shutter() == ShutterState::Open {
            actuator.close(state)?;
        }
        Ok(())
    }

    fn pulse_delay<X: ShutterTransport>(
        &self,
        actuator: &ShutterActuator<I, X>,
        now: I,
    ) -> ServiceTiming<I::Duration> {
        actuator
            .pulse_remaining(now)
            .map_or(ServiceTiming::Complete, ServiceTiming::Delay)
    }
}
