//! Shared test infrastructure for intervalometer integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use core::cell::Cell;
use core::convert::Infallible;

use intervalometer::{
    Config, ControlPanel, DeviceState, Intervalometer, IrRemote, RawInputs, SegmentDisplay,
    ShutterState, ShutterTransport, Srgb, StatusLed, StatusView, TimeDuration, TimeInstant,
    TimeSource,
};

// ============================================================================
// Mock Time Types
// ============================================================================

/// Mock duration type for testing (wraps milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestDuration(pub u64);

impl TimeDuration for TestDuration {
    const ZERO: Self = TestDuration(0);

    fn as_millis(&self) -> u64 {
        self.0
    }

    fn from_millis(millis: u64) -> Self {
        TestDuration(millis)
    }

    fn saturating_sub(self, other: Self) -> Self {
        TestDuration(self.0.saturating_sub(other.0))
    }
}

/// Mock instant type for testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestInstant(pub u64);

impl TimeInstant for TestInstant {
    type Duration = TestDuration;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        TestDuration(self.0.saturating_sub(earlier.0))
    }

    fn checked_add(self, duration: Self::Duration) -> Option<Self> {
        self.0.checked_add(duration.0).map(TestInstant)
    }
}

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock time source with controllable time advancement
pub struct MockTimeSource {
    current_time: Cell<TestInstant>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: Cell::new(TestInstant(0)),
        }
    }

    /// Advance time by the given number of milliseconds
    pub fn advance(&self, millis: u64) {
        let current = self.current_time.get();
        self.current_time.set(TestInstant(current.0 + millis));
    }

    pub fn millis(&self) -> u64 {
        self.current_time.get().0
    }
}

impl TimeSource<TestInstant> for MockTimeSource {
    fn now(&self) -> TestInstant {
        self.current_time.get()
    }
}

// ============================================================================
// Mock Hardware
// ============================================================================

/// Panel whose lines are set directly by the test
#[derive(Default)]
pub struct MockPanel {
    pub inputs: RawInputs,
}

impl ControlPanel for MockPanel {
    fn sample(&mut self) -> RawInputs {
        self.inputs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Open,
    Close,
    Trigger,
    TriggerEnd,
}

/// Transport that timestamps every call.
///
/// `trigger_cost_ms` advances the clock inside `trigger()` to model a slow
/// release (e.g. a long IR burst).
pub struct MockTransport<'t> {
    clock: &'t MockTimeSource,
    pub trigger_cost_ms: u64,
    pub calls: Vec<(Call, u64)>,
}

impl<'t> MockTransport<'t> {
    pub fn new(clock: &'t MockTimeSource) -> Self {
        Self {
            clock,
            trigger_cost_ms: 0,
            calls: Vec::new(),
        }
    }

    pub fn times_of(&self, call: Call) -> Vec<u64> {
        self.calls
            .iter()
            .filter(|(c, _)| *c == call)
            .map(|(_, t)| *t)
            .collect()
    }
}

impl ShutterTransport for MockTransport<'_> {
    fn open(&mut self) {
        self.calls.push((Call::Open, self.clock.millis()));
    }

    fn close(&mut self) {
        self.calls.push((Call::Close, self.clock.millis()));
    }

    fn trigger(&mut self) {
        self.calls.push((Call::Trigger, self.clock.millis()));
        self.clock.advance(self.trigger_cost_ms);
    }

    fn trigger_end(&mut self) {
        self.calls.push((Call::TriggerEnd, self.clock.millis()));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrCommand {
    Open,
    Close,
    Shutter,
}

#[derive(Default)]
pub struct MockRemote {
    pub sent: Vec<IrCommand>,
}

impl IrRemote for MockRemote {
    fn send_open(&mut self) {
        self.sent.push(IrCommand::Open);
    }

    fn send_close(&mut self) {
        self.sent.push(IrCommand::Close);
    }

    fn send_shutter_command(&mut self) {
        self.sent.push(IrCommand::Shutter);
    }
}

/// Records every string written to the display bus
#[derive(Default)]
pub struct MockDisplays {
    pub writes: Vec<(String, u8)>,
}

impl SegmentDisplay for MockDisplays {
    fn send_string(&mut self, text: &str, address: u8) {
        self.writes.push((text.to_string(), address));
    }
}

/// Mock status light that records all color changes
#[derive(Default)]
pub struct MockStatusLed {
    pub color_history: Vec<Srgb>,
}

impl StatusLed for MockStatusLed {
    fn set_color(&mut self, color: Srgb) {
        self.color_history.push(color);
    }
}

/// Output line recording every level written
#[derive(Default)]
pub struct MockPin {
    pub levels: Vec<bool>,
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.push(true);
        Ok(())
    }
}

/// View that keeps one state snapshot per render
#[derive(Default)]
pub struct RecordingView {
    pub snapshots: Vec<DeviceState>,
}

impl RecordingView {
    pub fn shutter_history(&self) -> Vec<ShutterState> {
        self.snapshots.iter().map(|s| s.shutter()).collect()
    }
}

impl StatusView for RecordingView {
    fn render(&mut self, state: &DeviceState) {
        self.snapshots.push(state.clone());
    }
}

// ============================================================================
// Mode switch positions
// ============================================================================

pub const SINGLE: [bool; 3] = [true, false, false];
pub const DOUBLE: [bool; 3] = [true, true, false];
pub const BULB: [bool; 3] = [false, true, false];
pub const BULB_TIMER: [bool; 3] = [false, true, true];
pub const BULB_BRACKET: [bool; 3] = [false, false, true];

// ============================================================================
// Test Helper Functions
// ============================================================================

pub type TestDevice<'t> = Intervalometer<
    't,
    TestInstant,
    MockTimeSource,
    MockPanel,
    MockTransport<'t>,
    RecordingView,
>;

/// Tick resolution used by the helpers
pub const TICK_MS: u64 = 10;

/// Builds a device with the switch at `mode_lines` and runs its first tick.
pub fn device<'t>(
    clock: &'t MockTimeSource,
    config: Config,
    mode_lines: [bool; 3],
) -> TestDevice<'t> {
    device_with(clock, config, mode_lines, MockTransport::new(clock))
}

/// Same as [`device`] with a caller-built transport.
pub fn device_with<'t>(
    clock: &'t MockTimeSource,
    config: Config,
    mode_lines: [bool; 3],
    transport: MockTransport<'t>,
) -> TestDevice<'t> {
    let panel = MockPanel {
        inputs: RawInputs {
            mode_lines,
            ..RawInputs::default()
        },
    };
    let mut device = Intervalometer::new(
        config,
        clock,
        panel,
        transport,
        RecordingView::default(),
    )
    .unwrap();
    device.tick();
    device
}

/// Advances the clock one tick and services the device.
pub fn step(device: &mut TestDevice<'_>, clock: &MockTimeSource) {
    clock.advance(TICK_MS);
    device.tick();
}

/// Ticks until the clock reaches `millis`.
pub fn run_until(device: &mut TestDevice<'_>, clock: &MockTimeSource, millis: u64) {
    while clock.millis() < millis {
        step(device, clock);
    }
}

/// Holds the trigger for one tick, then lets go after the debounce lockout.
pub fn click(device: &mut TestDevice<'_>, clock: &MockTimeSource) {
    device.panel_mut().inputs.trigger = true;
    step(device, clock);
    let release_at = clock.millis() + 100;
    run_until(device, clock, release_at);
    device.panel_mut().inputs.trigger = false;
}

/// Returns true if any consecutive pair of rendered states went straight
/// from open to not-ready.
pub fn skipped_ready(history: &[ShutterState]) -> bool {
    history
        .windows(2)
        .any(|pair| pair[0] == ShutterState::Open && pair[1] == ShutterState::NotReady)
}
