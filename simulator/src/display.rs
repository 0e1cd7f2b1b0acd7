//! Simulated ILI9341: copies transferred frame buffer regions into a
//! `SimulatorDisplay`.
//!
//! Only what the firmware would send reaches the simulated panel, so partial
//! transfer bugs show up as stale pixels exactly as they would on hardware.

use badge_common::config::{SCREEN_HEIGHT, SCREEN_RECT, SCREEN_WIDTH};
use badge_common::{DisplayTransfer, FrameBuffer};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics_simulator::SimulatorDisplay;

/// Panel contents plus transfer counters.
pub struct SimDisplay {
    panel: SimulatorDisplay<Rgb565>,
    full_transfers: u32,
    partial_transfers: u32,
}

impl SimDisplay {
    pub fn new() -> Self {
        Self {
            panel: SimulatorDisplay::new(Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)),
            full_transfers: 0,
            partial_transfers: 0,
        }
    }

    /// Simulated panel contents.
    #[inline]
    pub const fn panel(&self) -> &SimulatorDisplay<Rgb565> { &self.panel }

    #[inline]
    pub const fn full_transfers(&self) -> u32 { self.full_transfers }

    #[inline]
    pub const fn partial_transfers(&self) -> u32 { self.partial_transfers }

    fn copy_area(
        &mut self,
        fb: &FrameBuffer,
        area: &Rectangle,
    ) {
        let colors = area.points().map(|p| fb.pixel(p).unwrap_or(Rgb565::BLACK));
        self.panel.fill_contiguous(area, colors).ok();
    }
}

impl Default for SimDisplay {
    fn default() -> Self { Self::new() }
}

impl DisplayTransfer for SimDisplay {
    fn write_full(
        &mut self,
        fb: &FrameBuffer,
    ) {
        self.copy_area(fb, &SCREEN_RECT);
        self.full_transfers += 1;
    }

    fn write_partial(
        &mut self,
        fb: &FrameBuffer,
        area: &Rectangle,
    ) {
        self.copy_area(fb, area);
        self.partial_transfers += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_copies_only_area() {
        let mut fb = FrameBuffer::new();
        let mut display = SimDisplay::new();
        fb.background(Rgb565::RED);
        fb.mark_clean();
        fb.set_pixel(Point::new(5, 5), Rgb565::WHITE);
        fb.sync(&mut display);

        assert_eq!(display.panel().get_pixel(Point::new(5, 5)), Rgb565::WHITE);
        // Never transferred, still the panel's initial black
        assert_eq!(display.panel().get_pixel(Point::new(6, 5)), Rgb565::BLACK);
        assert_eq!(display.partial_transfers(), 1);
    }

    #[test]
    fn test_full_copies_everything() {
        let mut fb = FrameBuffer::new();
        let mut display = SimDisplay::new();
        fb.background(Rgb565::GREEN);
        fb.flush(&mut display);

        assert_eq!(display.panel().get_pixel(Point::new(319, 239)), Rgb565::GREEN);
        assert_eq!(display.full_transfers(), 1);
    }
}
