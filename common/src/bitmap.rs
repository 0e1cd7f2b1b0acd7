//! Decoded greyscale bitmaps used as shader textures.

use alloc::vec::Vec;

#[cfg(not(test))]
use micromath::F32Ext;

/// 8-bit greyscale image, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GreyBitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl GreyBitmap {
    /// Wrap decoded pixel data. Returns `None` if the length does not match.
    pub fn new(
        width: u32,
        height: u32,
        data: Vec<u8>,
    ) -> Option<Self> {
        if width == 0 || height == 0 || data.len() != width as usize * height as usize {
            return None;
        }
        Some(Self { width, height, data })
    }

    #[inline]
    pub const fn width(&self) -> u32 { self.width }

    #[inline]
    pub const fn height(&self) -> u32 { self.height }

    /// Texel at `(x, y)`, clamped to the image edge.
    #[inline]
    pub fn texel(
        &self,
        x: i32,
        y: i32,
    ) -> u8 {
        let x = x.clamp(0, self.width as i32 - 1) as usize;
        let y = y.clamp(0, self.height as i32 - 1) as usize;
        self.data[y * self.width as usize + x]
    }

    /// Bilinear sample at normalised coordinates (`u`, `v` in `0.0..=1.0`).
    ///
    /// Texel centres sit at `(i + 0.5) / width`; between them the four
    /// neighbours are blended, which keeps rotated edges smooth.
    pub fn sample(
        &self,
        u: f32,
        v: f32,
    ) -> u8 {
        let x = u * self.width as f32 - 0.5;
        let y = v * self.height as f32 - 0.5;
        let x0 = x.floor() as i32;
        let y0 = y.floor() as i32;
        // Weights in 1/256 steps
        let fx = ((x - x0 as f32) * 256.0) as u32;
        let fy = ((y - y0 as f32) * 256.0) as u32;

        let top = blend(self.texel(x0, y0), self.texel(x0 + 1, y0), fx);
        let bottom = blend(self.texel(x0, y0 + 1), self.texel(x0 + 1, y0 + 1), fx);
        blend(top, bottom, fy)
    }
}

/// Blend two samples with weight `w` of 256 toward `b`.
#[inline]
fn blend(
    a: u8,
    b: u8,
    w: u32,
) -> u8 {
    let w = w.min(256);
    ((a as u32 * (256 - w) + b as u32 * w + 128) >> 8) as u8
}
