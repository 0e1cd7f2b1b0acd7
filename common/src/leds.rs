//! Addressable LED strip buffer.
//!
//! The badge carries five SK6812-style units. The buffer holds them in wire
//! order (G, R, B per unit); [`LedStrip::colors`] converts to `smart_leds`
//! colours for drivers implementing `SmartLedsWrite`.

use smart_leds::RGB8;

use crate::config::{LED_BYTES_PER_UNIT, LED_COUNT, LED_WHITE};

/// Total bytes sent to the strip.
pub const LED_BUFFER_LEN: usize = LED_COUNT * LED_BYTES_PER_UNIT;

/// Colour data for the whole strip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedStrip {
    bytes: [u8; LED_BUFFER_LEN],
}

impl LedStrip {
    /// All channels at the startup white level.
    pub const fn white() -> Self {
        Self {
            bytes: [LED_WHITE; LED_BUFFER_LEN],
        }
    }

    /// Per-unit colours in strip order.
    pub fn colors(&self) -> impl Iterator<Item = RGB8> + '_ {
        self.bytes
            .chunks_exact(LED_BYTES_PER_UNIT)
            .map(|grb| RGB8::new(grb[1], grb[0], grb[2]))
    }
}
