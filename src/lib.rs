#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Intervalometer`**: The whole device; call `tick()` from the main loop
//! - **`DeviceState`**: Mode, shutter state, interval flag and the two adjustable times
//! - **`Mode`**: Single, double, bulb, timed bulb or bracketed bulb
//! - **`ModeEngine`**: Runs one shot sequence per trigger with non-blocking deadlines
//! - **`IntervalScheduler`**: Re-runs the sequence `interval_time` seconds after it ends
//! - **`ShutterTransport`**: Trait to implement for your release hardware (`ContactRelease`, `InfraredRelease`, or both)
//! - **`ControlPanel`**: Trait to implement for your input lines (`GpioPanel` for `embedded-hal` pins)
//! - **`StatusView`**: Trait to implement for your displays (`Presenter` for 7-segment units plus an RGB status light)
//! - **`TimeSource`**: Trait to implement for your monotonic clock
//!
//! Nothing ever sleeps for a whole exposure: every wait is a deadline checked
//! on the next tick, so the encoder and the trigger are sampled throughout.

#[macro_use]
mod fmt;

pub mod bracket;
pub mod colors;
pub mod config;
pub mod controller;
pub mod display;
pub mod encoder;
pub mod engine;
pub mod gpio;
pub mod input;
pub mod interval;
pub mod shutter;
pub mod time;
pub mod types;

pub use bracket::{BracketSequence, BRACKET_CAPACITY};
pub use colors::{status_color, BLUE, COLOR_OFF, GREEN, RED};
pub use config::{AccelerationTier, Config, ConfigError};
pub use controller::Intervalometer;
pub use display::{
    LedTriplet, Presenter, SegmentDisplay, StatusLed, StatusView, INTERVAL_DISPLAY_ADDR,
    SHUTTER_DISPLAY_ADDR,
};
pub use encoder::{AdjustRate, QuadratureDecoder};
pub use engine::{ModeEngine, ServiceTiming, TriggerInput};
pub use gpio::{ControlPanel, GpioPanel};
pub use input::{InputEvents, InputSampler, ModeSwitch, RawInputs, TriggerButton, TriggerEdge};
pub use interval::IntervalScheduler;
pub use shutter::{ContactRelease, InfraredRelease, IrRemote, ShutterActuator, ShutterTransport};
pub use time::{Deadline, TimeDuration, TimeInstant, TimeSource};
pub use types::{DeviceState, Mode, ShutterError, ShutterState};

// Re-export Srgb from palette for StatusLed implementors
pub use palette::Srgb;
