//! Status presentation: the two 7-segment time displays, the status light and
//! the shutter-enable line.

use core::fmt::Write;

use embedded_hal::digital::OutputPin;
use heapless::String;
use palette::Srgb;

use crate::colors::{status_color, COLOR_OFF};
use crate::types::{DeviceState, ShutterState};

/// Bus address of the display showing `shutter_time`.
pub const SHUTTER_DISPLAY_ADDR: u8 = 0x70;

/// Bus address of the display showing `interval_time`.
pub const INTERVAL_DISPLAY_ADDR: u8 = 0x71;

/// Digits per display.
pub const DISPLAY_DIGITS: usize = 4;

/// Trait for abstracting the numeric display bus.
pub trait SegmentDisplay {
    /// Writes `text` to the display unit at `address`.
    ///
    /// Handle transport errors internally; the displays are observers and a
    /// failed write must not disturb the shutter.
    fn send_string(&mut self, text: &str, address: u8);
}

/// Trait for abstracting the status light.
///
/// Color components are in the range 0.0-1.0; an implementation driving
/// plain on/off LEDs should treat anything above half as on.
pub trait StatusLed {
    /// Sets the light to the specified RGB color.
    fn set_color(&mut self, color: Srgb);
}

/// Anything that renders [`DeviceState`] once per tick.
pub trait StatusView {
    /// Brings the outputs in line with `state`.
    fn render(&mut self, state: &DeviceState);
}

/// Three on/off LEDs acting as one RGB status light.
pub struct LedTriplet<R: OutputPin, G: OutputPin, B: OutputPin> {
    red: R,
    green: G,
    blue: B,
}

impl<R: OutputPin, G: OutputPin, B: OutputPin> LedTriplet<R, G, B> {
    /// Wraps the three LED lines, all off.
    pub fn new(red: R, green: G, blue: B) -> Self {
        let mut leds = Self { red, green, blue };
        leds.set_color(COLOR_OFF);
        leds
    }

    /// Returns references to the red, green and blue lines.
    pub fn pins(&self) -> (&R, &G, &B) {
        (&self.red, &self.green, &self.blue)
    }
}

fn drive<P: OutputPin>(pin: &mut P, level: f32) {
    let _ = if level > 0.5 { pin.set_high() } else { pin.set_low() };
}

impl<R: OutputPin, G: OutputPin, B: OutputPin> StatusLed for LedTriplet<R, G, B> {
    fn set_color(&mut self, color: Srgb) {
        drive(&mut self.red, color.red);
        drive(&mut self.green, color.green);
        drive(&mut self.blue, color.blue);
    }
}

/// Formats `seconds` right-aligned for a 4-digit display.
///
/// Values that do not fit show as dashes; the stored time is unaffected.
pub fn format_seconds(seconds: u32) -> String<DISPLAY_DIGITS> {
    let mut text = String::new();
    if seconds > 9_999 {
        let _ = text.push_str("----");
    } else {
        let _ = write!(text, "{:>4}", seconds);
    }
    text
}

/// Renders the device state to displays, status light and enable line.
///
/// Only values that changed since the last render are sent, so a polling
/// loop can call [`render`](StatusView::render) on every tick without
/// flicker.
pub struct Presenter<S: SegmentDisplay, L: StatusLed, E: OutputPin> {
    displays: S,
    status: L,
    enable: E,
    shown_shutter_time: Option<u32>,
    shown_interval_time: Option<u32>,
    shown_state: Option<ShutterState>,
}

impl<S: SegmentDisplay, L: StatusLed, E: OutputPin> Presenter<S, L, E> {
    /// Creates a presenter; the first render writes everything.
    pub fn new(displays: S, status: L, enable: E) -> Self {
        Self {
            displays,
            status,
            enable,
            shown_shutter_time: None,
            shown_interval_time: None,
            shown_state: None,
        }
    }

    /// Forces the next render to rewrite every output.
    pub fn invalidate(&mut self) {
        self.shown_shutter_time = None;
        self.shown_interval_time = None;
        self.shown_state = None;
    }

    /// Returns references to the displays, status light and enable line.
    pub fn outputs(&self) -> (&S, &L, &E) {
        (&self.displays, &self.status, &self.enable)
    }
}

impl<S: SegmentDisplay, L: StatusLed, E: OutputPin> StatusView for Presenter<S, L, E> {
    fn render(&mut self, state: &DeviceState) {
        if self.shown_shutter_time != Some(state.shutter_time()) {
            let text = format_seconds(state.shutter_time());
            self.displays.send_string(&text, SHUTTER_DISPLAY_ADDR);
            self.shown_shutter_time = Some(state.shutter_time());
        }

        if self.shown_interval_time != Some(state.interval_time()) {
            let text = format_seconds(state.interval_time());
            self.displays.send_string(&text, INTERVAL_DISPLAY_ADDR);
            self.shown_interval_time = Some(state.interval_time());
        }

        if self.shown_state != Some(state.shutter()) {
            self.status.set_color(status_color(state.shutter()));
            let _ = if state.shutter() == ShutterState::Ready {
                self.enable.set_high()
            } else {
                self.enable.set_low()
            };
            self.shown_state = Some(state.shutter());
        }
    }
}
