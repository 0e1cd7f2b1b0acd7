//! Colour palette for the badge demo.
//!
//! # Working Colour Space
//!
//! Interpolation happens in 8-bit-per-channel [`Rgb888`] and is narrowed to
//! [`Rgb565`] only when a pixel is written to the frame buffer. Lerping in
//! RGB565 directly would lose the low bits of the 5-bit channels and band the
//! gear's soft edges.
//!
//! ## Rgb565 Color Format
//!
//! Rgb565 uses 16 bits per pixel: 5 bits red, 6 bits green, 5 bits blue.
//! This is the ILI9341 native format, so the frame buffer can be sent without
//! conversion.

use embedded_graphics::pixelcolor::{Rgb565, Rgb888, RgbColor};

// =============================================================================
// Standard Colors
// =============================================================================

/// Pure black. Background of the final static frame.
pub const BLACK: Rgb565 = Rgb565::BLACK;

// =============================================================================
// Application Colors
// =============================================================================

/// Background purple (`#6942a2`). Texture intensity 0 maps here.
pub const BACKGROUND: Rgb888 = Rgb888::new(0x69, 0x42, 0xa2);

/// Foreground lilac (`#c199f4`). Texture intensity 255 maps here.
pub const FOREGROUND: Rgb888 = Rgb888::new(0xc1, 0x99, 0xf4);

// =============================================================================
// Interpolation
// =============================================================================

/// Linear interpolation of one 8-bit channel, `part` in `0..=255`.
#[inline]
const fn lerp_channel(
    from: u8,
    to: u8,
    part: u8,
) -> u8 {
    let from = from as i32;
    let to = to as i32;
    // Rounded to nearest so that part == 255 lands exactly on `to`.
    let delta = (to - from) * part as i32;
    let rounded = if delta >= 0 { (delta + 127) / 255 } else { (delta - 127) / 255 };
    (from + rounded) as u8
}

/// Interpolate between two colours. `part == 0` yields `from`, `part == 255` yields `to`.
#[inline]
pub fn lerp(
    from: Rgb888,
    to: Rgb888,
    part: u8,
) -> Rgb888 {
    Rgb888::new(
        lerp_channel(from.r(), to.r(), part),
        lerp_channel(from.g(), to.g(), part),
        lerp_channel(from.b(), to.b(), part),
    )
}

/// Narrow an 8-bit colour to the display format.
#[inline]
pub fn to_rgb565(color: Rgb888) -> Rgb565 { Rgb565::from(color) }
