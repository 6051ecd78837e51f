//! GPIO-backed control panel.

use embedded_hal::digital::InputPin;

use crate::input::RawInputs;

/// Trait for abstracting where a tick's inputs come from.
pub trait ControlPanel {
    /// Reads every input line once.
    fn sample(&mut self) -> RawInputs;
}

/// The physical control panel wired to input pins.
///
/// Mode, interval, adjust and encoder lines are switched to ground (use
/// pull-ups); the trigger input is driven high when pressed. A line that
/// fails to read counts as inactive.
pub struct GpioPanel<P: InputPin> {
    /// Mode-select lines 1 to 3.
    pub mode: [P; 3],
    /// Interval shooting switch.
    pub interval: P,
    /// Bulb time adjust switch.
    pub adjust_shutter: P,
    /// Interval time adjust switch.
    pub adjust_interval: P,
    /// Encoder line A.
    pub encoder_a: P,
    /// Encoder line B.
    pub encoder_b: P,
    /// Shutter trigger input.
    pub trigger: P,
}

fn grounded<P: InputPin>(pin: &mut P) -> bool {
    pin.is_low().unwrap_or(false)
}

impl<P: InputPin> ControlPanel for GpioPanel<P> {
    fn sample(&mut self) -> RawInputs {
        let [m1, m2, m3] = &mut self.mode;
        RawInputs {
            mode_lines: [grounded(m1), grounded(m2), grounded(m3)],
            interval_switch: grounded(&mut self.interval),
            adjust_shutter: grounded(&mut self.adjust_shutter),
            adjust_interval: grounded(&mut self.adjust_interval),
            encoder_a: grounded(&mut self.encoder_a),
            encoder_b: grounded(&mut self.encoder_b),
            trigger: self.trigger.is_high().unwrap_or(false),
        }
    }
}
