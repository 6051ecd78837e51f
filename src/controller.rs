//! The controller: one cooperative polling tick composing input sampling,
//! the mode engine, the interval scheduler and the status view.

use crate::config::{Config, ConfigError};
use crate::display::StatusView;
use crate::engine::{ModeEngine, ServiceTiming, TriggerInput};
use crate::gpio::ControlPanel;
use crate::input::{InputEvents, InputSampler, ModeSwitch, RawInputs, TriggerEdge};
use crate::interval::IntervalScheduler;
use crate::shutter::{ShutterActuator, ShutterTransport};
use crate::time::{TimeInstant, TimeSource};
use crate::types::{DeviceState, ShutterError, ShutterState};

/// A complete intervalometer.
///
/// Owns the [`DeviceState`] and hands it to the sampler, the actuator and the
/// view by reference. Call [`tick`](Self::tick) from the main loop at the
/// input polling rate (a few milliseconds); it never blocks.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `I` - Time instant type
/// * `T` - Time source implementation type
/// * `P` - Control panel (input lines)
/// * `X` - Shutter transport (release contact, IR, or both)
/// * `V` - Status view (displays and LEDs)
pub struct Intervalometer<'t, I, T, P, X, V>
where
    I: TimeInstant,
    T: TimeSource<I>,
    P: ControlPanel,
    X: ShutterTransport,
    V: StatusView,
{
    time_source: &'t T,
    panel: P,
    view: V,
    state: DeviceState,
    sampler: InputSampler<I>,
    actuator: ShutterActuator<I, X>,
    engine: ModeEngine<I>,
    scheduler: IntervalScheduler<I>,
}

impl<'t, I, T, P, X, V> Intervalometer<'t, I, T, P, X, V>
where
    I: TimeInstant,
    T: TimeSource<I>,
    P: ControlPanel,
    X: ShutterTransport,
    V: StatusView,
{
    /// Validates `config`, reads the panel once and shows the power-on state.
    ///
    /// # Errors
    /// Any [`ConfigError`] from [`Config::validate`].
    pub fn new(
        config: Config,
        time_source: &'t T,
        mut panel: P,
        transport: X,
        mut view: V,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let initial = panel.sample();
        let mut state = DeviceState::new(&config);
        if let Some(mode) = ModeSwitch::decode(initial.mode_lines) {
            state.set_mode(mode);
        }
        state.set_interval_enabled(initial.interval_switch);
        view.render(&state);

        Ok(Self {
            time_source,
            panel,
            view,
            sampler: InputSampler::new(&config, &initial),
            actuator: ShutterActuator::new(transport, config.trigger_pulse_ms),
            engine: ModeEngine::new(&config),
            scheduler: IntervalScheduler::new(),
            state,
        })
    }

    /// Runs one polling tick.
    ///
    /// Samples the panel, advances whatever is in flight, and renders. The
    /// returned timing says how soon something will happen without input;
    /// the caller still has to poll at its input rate.
    pub fn tick(&mut self) -> ServiceTiming<I::Duration> {
        let now = self.time_source.now();
        let raw = self.panel.sample();

        let timing = match self.process(&raw, now) {
            Ok(timing) => timing,
            Err(err) => {
                warn!("shutter error: {:?}", err);
                ServiceTiming::Complete
            }
        };

        self.view.render(&self.state);
        timing
    }

    fn process(
        &mut self,
        raw: &RawInputs,
        now: I,
    ) -> Result<ServiceTiming<I::Duration>, ShutterError> {
        // Setup is entered before sampling so encoder edges on the same tick
        // already adjust the time.
        let setup_requested = raw.adjust_shutter || raw.adjust_interval;
        if setup_requested
            && !self.engine.is_running()
            && self.state.shutter() == ShutterState::Ready
        {
            self.state.set_shutter(ShutterState::NotReady)?;
            self.scheduler.cancel();
        }

        let events = self.sampler.sample(raw, now, &mut self.state);
        self.advance(&events, now)
    }

    fn advance(
        &mut self,
        events: &InputEvents,
        now: I,
    ) -> Result<ServiceTiming<I::Duration>, ShutterError> {
        let trigger = TriggerInput {
            pressed: events.trigger == TriggerEdge::Pressed,
            held: events.trigger_held,
        };

        if self.engine.is_running() {
            let timing = self
                .engine
                .service(&mut self.state, &mut self.actuator, now, trigger)?;
            return Ok(self.after_service(timing, now));
        }

        // Between sequences: latched mode and setup changes take effect here.
        if self.state.set_mode(events.requested_mode) {
            info!("mode set to {:?}", events.requested_mode);
        }

        if !events.setup_requested && self.state.shutter() == ShutterState::NotReady {
            self.state.set_shutter(ShutterState::Ready)?;
        }

        if self.state.shutter() != ShutterState::Ready {
            return Ok(ServiceTiming::Complete);
        }

        let start = if self.scheduler.poll(&self.state, now) {
            Some(TriggerInput {
                pressed: false,
                held: trigger.held,
            })
        } else if trigger.pressed && !self.scheduler.is_armed() {
            Some(trigger)
        } else {
            None
        };

        match start {
            Some(trigger) => {
                let timing = self
                    .engine
                    .start(&mut self.state, &mut self.actuator, now, trigger)?;
                Ok(self.after_service(timing, now))
            }
            None => Ok(self.idle_timing(now)),
        }
    }

    fn after_service(
        &mut self,
        timing: ServiceTiming<I::Duration>,
        now: I,
    ) -> ServiceTiming<I::Duration> {
        if timing == ServiceTiming::Complete {
            self.scheduler.on_sequence_complete(&self.state, now);
            self.idle_timing(now)
        } else {
            timing
        }
    }

    fn idle_timing(&self, now: I) -> ServiceTiming<I::Duration> {
        self.scheduler
            .remaining(now)
            .map_or(ServiceTiming::Complete, ServiceTiming::Delay)
    }

    /// Current device state.
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Returns true while a shot sequence is executing.
    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    /// Returns true while an interval countdown is pending.
    pub fn is_interval_armed(&self) -> bool {
        self.scheduler.is_armed()
    }

    /// Returns a reference to the panel.
    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// Returns a mutable reference to the panel.
    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    /// Returns a reference to the shutter transport.
    pub fn transport(&self) -> &X {
        self.actuator.transport()
    }

    /// Returns a reference to the status view.
    pub fn view(&self) -> &V {
        &self.view
    }
}
