//! Display transfer abstraction.
//!
//! The renderer draws into a [`FrameBuffer`](crate::FrameBuffer) and hands it
//! to a [`DisplayTransfer`] implementation to reach the panel:
//!
//! - ESP32: `badge_firmware::ili9341::Ili9341` over SPI
//! - Desktop: the simulator's `SimDisplay`
//!
//! Transfers are fire-and-forget. Drivers discard bus errors, matching the
//! way the panel is driven (there is nothing useful to do with a failed
//! frame except draw the next one).

use embedded_graphics::primitives::Rectangle;

use crate::framebuffer::FrameBuffer;

/// Sink for frame buffer contents.
pub trait DisplayTransfer {
    /// Send the entire buffer.
    fn write_full(
        &mut self,
        fb: &FrameBuffer,
    );

    /// Send only `area` (inclusive screen rectangle, never empty).
    fn write_partial(
        &mut self,
        fb: &FrameBuffer,
        area: &Rectangle,
    );
}

impl<T: DisplayTransfer + ?Sized> DisplayTransfer for &mut T {
    fn write_full(
        &mut self,
        fb: &FrameBuffer,
    ) {
        (**self).write_full(fb);
    }

    fn write_partial(
        &mut self,
        fb: &FrameBuffer,
        area: &Rectangle,
    ) {
        (**self).write_partial(fb, area);
    }
}
