//! Display, layout and animation configuration constants.
//!
//! Everything the demo needs is fixed at compile time; there is no runtime
//! configuration file. Geometry is pre-computed as `const` so the render loop
//! does no layout arithmetic.

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

// =============================================================================
// Display Configuration
// =============================================================================

/// Display width in pixels (ILI9341 in landscape: 320x240).
pub const SCREEN_WIDTH: u32 = 320;

/// Display height in pixels.
pub const SCREEN_HEIGHT: u32 = 240;

/// Number of pixels in the frame buffer.
pub const PIXEL_COUNT: usize = (SCREEN_WIDTH * SCREEN_HEIGHT) as usize;

/// Full screen rectangle.
pub const SCREEN_RECT: Rectangle = Rectangle::new(Point::zero(), Size::new(SCREEN_WIDTH, SCREEN_HEIGHT));

// =============================================================================
// Gear Layout
// =============================================================================

/// Gear artwork size (square).
pub const GEAR_SIZE: u32 = 60;

/// Rotation centre of the gear in screen coordinates.
pub const GEAR_PIVOT: Point = Point::new(250, 140);

/// Clip window for the gear. Covers the pivot +/- half the gear size so the
/// rotated square's corners never touch the static overlay outside it.
pub const GEAR_CLIP: Rectangle = Rectangle::new(
    Point::new(GEAR_PIVOT.x - GEAR_SIZE as i32 / 2, GEAR_PIVOT.y - GEAR_SIZE as i32 / 2),
    Size::new(GEAR_SIZE, GEAR_SIZE),
);

/// Gear rectangle in local (pivot-relative) coordinates, centred on the origin.
pub const GEAR_LOCAL_RECT: Rectangle = Rectangle::new(
    Point::new(-(GEAR_SIZE as i32) / 2, -(GEAR_SIZE as i32) / 2),
    Size::new(GEAR_SIZE, GEAR_SIZE),
);

// =============================================================================
// Animation
// =============================================================================

/// Milliseconds for half a turn of the gear (one full turn every 10 s).
pub const GEAR_HALF_TURN_MS: f64 = 5000.0;

// =============================================================================
// LED Strip
// =============================================================================

/// Number of addressable LEDs on the badge.
pub const LED_COUNT: usize = 5;

/// Bytes per LED (G, R, B).
pub const LED_BYTES_PER_UNIT: usize = 3;

/// Channel level used for the startup white.
pub const LED_WHITE: u8 = 0xFF;

// =============================================================================
// Input
// =============================================================================

/// Capacity of the co-processor input event queue.
pub const INPUT_QUEUE_CAPACITY: usize = 8;
