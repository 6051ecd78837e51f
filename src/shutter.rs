//! Shutter actuation over a direct release contact, an IR remote, or both.
//!
//! [`ShutterActuator`] owns the shutter state transitions: it marks the
//! shutter open before the physical action starts and ready only once the
//! close or the end of a trigger pulse has been issued, so an observer never
//! sees `Ready` while the shutter is physically open.

use embedded_hal::digital::OutputPin;

use crate::time::{Deadline, TimeDuration, TimeInstant};
use crate::types::{DeviceState, ShutterError, ShutterState};

/// Trait for abstracting how the camera is told to expose.
///
/// Implementations are fire-and-forget: the camera gives no acknowledgement,
/// so hardware errors are handled (or ignored) internally.
pub trait ShutterTransport {
    /// Start a bulb exposure.
    fn open(&mut self);

    /// End a bulb exposure.
    fn close(&mut self);

    /// Start a single trigger.
    fn trigger(&mut self);

    /// End a single trigger pulse.
    fn trigger_end(&mut self);
}

/// Capability for the external IR transmitter.
pub trait IrRemote {
    /// Send the "open shutter" (bulb start) command.
    fn send_open(&mut self);

    /// Send the "close shutter" (bulb end) command.
    fn send_close(&mut self);

    /// Send the single shutter release command.
    fn send_shutter_command(&mut self);
}

/// Release cable wired to an output line; the line held high keeps the
/// release pressed.
pub struct ContactRelease<P: OutputPin> {
    pin: P,
}

impl<P: OutputPin> ContactRelease<P> {
    /// Wraps the release line and makes sure it starts released.
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_low();
        Self { pin }
    }

    /// Returns a reference to the release line.
    pub fn pin(&self) -> &P {
        &self.pin
    }

    /// Returns the wrapped line.
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> ShutterTransport for ContactRelease<P> {
    fn open(&mut self) {
        let _ = self.pin.set_high();
    }

    fn close(&mut self) {
        let _ = self.pin.set_low();
    }

    fn trigger(&mut self) {
        let _ = self.pin.set_high();
    }

    fn trigger_end(&mut self) {
        let _ = self.pin.set_low();
    }
}

/// Shutter driven through IR commands.
pub struct InfraredRelease<R: IrRemote> {
    remote: R,
}

impl<R: IrRemote> InfraredRelease<R> {
    /// Wraps an IR transmitter.
    pub fn new(remote: R) -> Self {
        Self { remote }
    }

    /// Returns a reference to the transmitter.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Returns the wrapped transmitter.
    pub fn into_inner(self) -> R {
        self.remote
    }
}

impl<R: IrRemote> ShutterTransport for InfraredRelease<R> {
    fn open(&mut self) {
        self.remote.send_open();
    }

    fn close(&mut self) {
        self.remote.send_close();
    }

    fn trigger(&mut self) {
        self.remote.send_shutter_command();
    }

    // The IR command is a complete shot on its own.
    fn trigger_end(&mut self) {}
}

/// Drives two transports in lockstep, e.g. a release cable and an IR LED.
impl<A: ShutterTransport, B: ShutterTransport> ShutterTransport for (A, B) {
    fn open(&mut self) {
        self.0.open();
        self.1.open();
    }

    fn close(&mut self) {
        self.0.close();
        self.1.close();
    }

    fn trigger(&mut self) {
        self.0.trigger();
        self.1.trigger();
    }

    fn trigger_end(&mut self) {
        self.0.trigger_end();
        self.1.trigger_end();
    }
}

/// Turns open/close/fire requests into transport calls and shutter state
/// changes.
pub struct ShutterActuator<I: TimeInstant, X: ShutterTransport> {
    transport: X,
    pulse: I::Duration,
    pulse_end: Option<Deadline<I>>,
}

impl<I: TimeInstant, X: ShutterTransport> ShutterActuator<I, X> {
    /// Creates an actuator whose trigger pulses last `pulse_ms`.
    pub fn new(transport: X, pulse_ms: u32) -> Self {
        Self {
            transport,
            pulse: I::Duration::from_millis(u64::from(pulse_ms)),
            pulse_end: None,
        }
    }

    /// Opens the shutter for a bulb exposure.
    pub fn open(&mut self, state: &mut DeviceState) -> Result<(), ShutterError> {
        state.set_shutter(ShutterState::Open)?;
        self.transport.open();
        Ok(())
    }

    /// Closes a bulb exposure.
    pub fn close(&mut self, state: &mut DeviceState) -> Result<(), ShutterError> {
        if state.shutter() != ShutterState::Open {
            return Err(ShutterError::InvalidTransition {
                from: state.shutter(),
                to: ShutterState::Ready,
            });
        }
        self.transport.close();
        state.set_shutter(ShutterState::Ready)
    }

    /// Starts a trigger pulse. The shutter reads `Open` until
    /// [`service`](Self::service) sees the pulse end.
    pub fn fire(&mut self, state: &mut DeviceState, now: I) -> Result<(), ShutterError> {
        state.set_shutter(ShutterState::Open)?;
        self.transport.trigger();
        self.pulse_end = Some(Deadline::after(now, self.pulse));
        Ok(())
    }

    /// Ends a trigger pulse whose time is up.
    ///
    /// Returns true on the tick the pulse ends.
    pub fn service(&mut self, state: &mut DeviceState, now: I) -> Result<bool, ShutterError> {
        match self.pulse_end {
            Some(deadline) if deadline.is_reached(now) => {
                self.transport.trigger_end();
                self.pulse_end = None;
                state.set_shutter(ShutterState::Ready)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Returns true while a trigger pulse is in flight.
    pub fn is_firing(&self) -> bool {
        self.pulse_end.is_some()
    }

    /// Time until the in-flight pulse ends.
    pub fn pulse_remaining(&self, now: I) -> Option<I::Duration> {
        self.pulse_end.map(|deadline| deadline.remaining(now))
    }

    /// Returns a reference to the transport.
    pub fn transport(&self) -> &X {
        &self.transport
    }
}
