//! Colour-lerp shader and textured rectangle compositing.
//!
//! A greyscale texture is used as an intensity map: each sample picks a
//! colour between [`BACKGROUND`](crate::colors::BACKGROUND) (0) and
//! [`FOREGROUND`](crate::colors::FOREGROUND) (255). Output is always opaque;
//! a shaded rectangle replaces every destination pixel it covers.
//!
//! [`shade_rect`] draws a local-space rectangle through the frame buffer's
//! current transform by inverse mapping: for each destination pixel centre in
//! the (clipped) bounding box of the transformed rectangle, find the local
//! point it came from and sample the texture there.

use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
#[cfg(not(test))]
use micromath::F32Ext;

use crate::bitmap::GreyBitmap;
use crate::colors::{BACKGROUND, FOREGROUND, lerp, to_rgb565};
use crate::framebuffer::FrameBuffer;

/// Maps a texture intensity to a display colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LerpShader {
    pub background: Rgb888,
    pub foreground: Rgb888,
}

impl LerpShader {
    pub const fn new(
        background: Rgb888,
        foreground: Rgb888,
    ) -> Self {
        Self { background, foreground }
    }

    /// Colour for intensity `v`.
    #[inline]
    pub fn shade(
        &self,
        v: u8,
    ) -> Rgb565 {
        to_rgb565(lerp(self.background, self.foreground, v))
    }
}

impl Default for LerpShader {
    fn default() -> Self { Self::new(BACKGROUND, FOREGROUND) }
}

/// Shade `rect` (local coordinates) with `texture` stretched over it.
///
/// Nothing is drawn for empty rectangles or when the current transform is
/// singular.
pub fn shade_rect(
    fb: &mut FrameBuffer,
    rect: &Rectangle,
    texture: &GreyBitmap,
    shader: &LerpShader,
) {
    let Some(bounds) = transformed_bounds(fb, rect) else {
        return;
    };
    let area = bounds.intersection(&fb.drawable_area());
    if area.is_zero_sized() {
        return;
    }
    let Some(inverse) = fb.transform().inverse() else {
        return;
    };

    let left = rect.top_left.x as f32;
    let top = rect.top_left.y as f32;
    let width = rect.size.width as f32;
    let height = rect.size.height as f32;

    for p in area.points() {
        let (lx, ly) = inverse.apply(p.x as f32 + 0.5, p.y as f32 + 0.5);
        let u = (lx - left) / width;
        let v = (ly - top) / height;
        if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
            continue;
        }
        fb.set_pixel(p, shader.shade(texture.sample(u, v)));
    }
}

/// Screen bounding box of `rect` after the current transform.
fn transformed_bounds(
    fb: &FrameBuffer,
    rect: &Rectangle,
) -> Option<Rectangle> {
    if rect.is_zero_sized() {
        return None;
    }
    let m = fb.transform();
    let x0 = rect.top_left.x as f32;
    let y0 = rect.top_left.y as f32;
    let x1 = x0 + rect.size.width as f32;
    let y1 = y0 + rect.size.height as f32;

    let corners = [m.apply(x0, y0), m.apply(x1, y0), m.apply(x0, y1), m.apply(x1, y1)];
    let (mut min_x, mut min_y) = corners[0];
    let (mut max_x, mut max_y) = corners[0];
    for &(x, y) in &corners[1..] {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    let min = Point::new(min_x.floor() as i32, min_y.floor() as i32);
    let max = Point::new(max_x.ceil() as i32, max_y.ceil() as i32);
    Some(Rectangle::with_corners(min, max))
}
