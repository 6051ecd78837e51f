//! Status indicator colours.
//!
//! The status light is three discrete LEDs (blue, green, red) driven as one
//! RGB indicator, so each state maps to a pure primary.

use palette::Srgb;

use crate::types::ShutterState;

/// All channels off.
pub const COLOR_OFF: Srgb = Srgb::new(0.0, 0.0, 0.0);

/// Red channel only.
pub const RED: Srgb = Srgb::new(1.0, 0.0, 0.0);

/// Green channel only.
pub const GREEN: Srgb = Srgb::new(0.0, 1.0, 0.0);

/// Blue channel only.
pub const BLUE: Srgb = Srgb::new(0.0, 0.0, 1.0);

/// Colour shown for a shutter state: blue in setup, green when ready, red
/// while open.
#[inline]
pub fn status_color(shutter: ShutterState) -> Srgb {
    match shutter {
        ShutterState::NotReady => BLUE,
        ShutterState::Ready => GREEN,
        ShutterState::Open => RED,
    }
}
