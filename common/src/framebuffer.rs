//! Frame buffer with dirty-rectangle, clip and transform tracking.
//!
//! # Memory Layout
//!
//! The buffer holds 320x240 RGB565 pixels as big-endian byte pairs, which is
//! the byte order the ILI9341 expects on the wire. Transfers therefore send
//! slices of this buffer without conversion.
//!
//! # Dirty Tracking
//!
//! Every pixel write extends [`DirtyRect`], the bounding box of everything
//! touched since the last [`FrameBuffer::mark_clean`]. [`FrameBuffer::sync`]
//! sends only that box to the display; [`FrameBuffer::flush`] sends the whole
//! buffer. Both leave the buffer clean.
//!
//! # Scoped State
//!
//! Clip and transform are changed only through guards:
//!
//! ```ignore
//! let mut clipped = fb.clipped(GEAR_CLIP);
//! let mut local = clipped.push_transform();
//! local.apply(&Affine2::translate(250.0, 140.0));
//! // ... draw ...
//! // dropping `local` restores the transform, dropping `clipped` the clip
//! ```
//!
//! Restoration happens in `Drop`, so every exit path (including early
//! returns) leaves the buffer as it was found.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::{Deref, DerefMut};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::config::{PIXEL_COUNT, SCREEN_HEIGHT, SCREEN_RECT, SCREEN_WIDTH};
use crate::display::DisplayTransfer;
use crate::transform::Affine2;

const WIDTH: usize = SCREEN_WIDTH as usize;

// =============================================================================
// Dirty Rectangle
// =============================================================================

/// Inclusive bounding box of pixels written since the last flush.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirtyRect {
    bounds: Option<(Point, Point)>,
}

impl DirtyRect {
    /// A clean (empty) rectangle.
    pub const fn clean() -> Self { Self { bounds: None } }

    /// Whether nothing has been touched.
    #[inline]
    pub const fn is_clean(&self) -> bool { self.bounds.is_none() }

    /// Grow to include a single pixel.
    #[inline]
    pub fn include_point(
        &mut self,
        p: Point,
    ) {
        self.bounds = Some(match self.bounds {
            None => (p, p),
            Some((min, max)) => (min.component_min(p), max.component_max(p)),
        });
    }

    /// Grow to include a rectangle. Empty rectangles are ignored.
    pub fn include_rect(
        &mut self,
        rect: &Rectangle,
    ) {
        if let Some(bottom_right) = rect.bottom_right() {
            self.include_point(rect.top_left);
            self.include_point(bottom_right);
        }
    }

    /// Reset to clean.
    #[inline]
    pub fn clear(&mut self) { self.bounds = None; }

    /// The touched area as a rectangle, `None` when clean.
    pub fn rect(&self) -> Option<Rectangle> {
        self.bounds.map(|(min, max)| Rectangle::with_corners(min, max))
    }
}

// =============================================================================
// Frame Buffer
// =============================================================================

/// 320x240 RGB565 drawing surface.
pub struct FrameBuffer {
    pixels: Vec<u8>,
    dirty: DirtyRect,
    clip: Option<Rectangle>,
    transform: Affine2,
    transform_depth: usize,
}

impl FrameBuffer {
    /// Create a black, clean, unclipped buffer with the identity transform.
    pub fn new() -> Self {
        Self {
            pixels: vec![0u8; PIXEL_COUNT * 2],
            dirty: DirtyRect::clean(),
            clip: None,
            transform: Affine2::IDENTITY,
            transform_depth: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Pixel access
    // -------------------------------------------------------------------------

    /// Raw big-endian RGB565 bytes of the whole buffer.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] { &self.pixels }

    /// Bytes of row `y` from column `x` for `width` pixels.
    ///
    /// The caller passes coordinates inside the screen; they come from a
    /// [`DirtyRect`] that was clamped to the screen when it was built.
    #[inline]
    pub fn row_bytes(
        &self,
        x: u32,
        y: u32,
        width: u32,
    ) -> &[u8] {
        let start = (y as usize * WIDTH + x as usize) * 2;
        &self.pixels[start..start + width as usize * 2]
    }

    /// Read back a pixel, `None` outside the screen.
    pub fn pixel(
        &self,
        p: Point,
    ) -> Option<Rgb565> {
        if !SCREEN_RECT.contains(p) {
            return None;
        }
        let idx = (p.y as usize * WIDTH + p.x as usize) * 2;
        let raw = u16::from_be_bytes([self.pixels[idx], self.pixels[idx + 1]]);
        Some(Rgb565::from(RawU16::new(raw)))
    }

    /// Write a pixel through the clip, marking it dirty.
    #[inline]
    pub fn set_pixel(
        &mut self,
        p: Point,
        color: Rgb565,
    ) {
        if !self.drawable_area().contains(p) {
            return;
        }
        self.write_unchecked(p, color);
        self.dirty.include_point(p);
    }

    #[inline]
    fn write_unchecked(
        &mut self,
        p: Point,
        color: Rgb565,
    ) {
        let idx = (p.y as usize * WIDTH + p.x as usize) * 2;
        let bytes = color.into_storage().to_be_bytes();
        self.pixels[idx] = bytes[0];
        self.pixels[idx + 1] = bytes[1];
    }

    /// Fill the entire buffer, ignoring the clip, and mark everything dirty.
    pub fn background(
        &mut self,
        color: Rgb565,
    ) {
        let bytes = color.into_storage().to_be_bytes();
        for pair in self.pixels.chunks_exact_mut(2) {
            pair.copy_from_slice(&bytes);
        }
        self.mark_dirty_all();
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    /// Area touched since the last transfer.
    #[inline]
    pub fn dirty(&self) -> Option<Rectangle> { self.dirty.rect() }

    /// Whether anything was drawn since the last transfer.
    #[inline]
    pub const fn is_dirty(&self) -> bool { !self.dirty.is_clean() }

    /// Mark the whole screen as needing transfer.
    pub fn mark_dirty_all(&mut self) { self.dirty.include_rect(&SCREEN_RECT); }

    /// Forget all pending changes.
    #[inline]
    pub fn mark_clean(&mut self) { self.dirty.clear(); }

    /// Send the whole buffer and mark it clean.
    pub fn flush<D: DisplayTransfer>(
        &mut self,
        display: &mut D,
    ) {
        display.write_full(self);
        self.mark_clean();
    }

    /// Send only the dirty rectangle (if any) and mark the buffer clean.
    pub fn sync<D: DisplayTransfer>(
        &mut self,
        display: &mut D,
    ) {
        if let Some(area) = self.dirty() {
            display.write_partial(self, &area);
        }
        self.mark_clean();
    }

    // -------------------------------------------------------------------------
    // Clip
    // -------------------------------------------------------------------------

    /// Current clip rectangle, `None` when unclipped.
    #[inline]
    pub const fn clip(&self) -> Option<Rectangle> { self.clip }

    /// Screen area writes may land in (screen intersected with the clip).
    #[inline]
    pub fn drawable_area(&self) -> Rectangle {
        match self.clip {
            Some(clip) => clip,
            None => SCREEN_RECT,
        }
    }

    /// Restrict drawing to `rect` until the guard is dropped.
    ///
    /// The clip is intersected with the screen and with any clip already in
    /// effect, and the previous clip is restored on drop.
    pub fn clipped(
        &mut self,
        rect: Rectangle,
    ) -> ClipGuard<'_> {
        let saved = self.clip;
        self.clip = Some(self.drawable_area().intersection(&rect));
        ClipGuard { fb: self, saved }
    }

    // -------------------------------------------------------------------------
    // Transform
    // -------------------------------------------------------------------------

    /// Current local-to-screen transform.
    #[inline]
    pub const fn transform(&self) -> &Affine2 { &self.transform }

    /// Number of transform scopes currently open.
    #[inline]
    pub const fn transform_depth(&self) -> usize { self.transform_depth }

    /// Open a transform scope. The current matrix is restored when the guard drops.
    pub fn push_transform(&mut self) -> TransformGuard<'_> {
        let saved = self.transform;
        self.transform_depth += 1;
        TransformGuard { fb: self, saved }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Scope Guards
// =============================================================================

/// Clip scope. Dereferences to the frame buffer.
pub struct ClipGuard<'a> {
    fb: &'a mut FrameBuffer,
    saved: Option<Rectangle>,
}

impl Deref for ClipGuard<'_> {
    type Target = FrameBuffer;

    fn deref(&self) -> &FrameBuffer { self.fb }
}

impl DerefMut for ClipGuard<'_> {
    fn deref_mut(&mut self) -> &mut FrameBuffer { self.fb }
}

impl Drop for ClipGuard<'_> {
    fn drop(&mut self) { self.fb.clip = self.saved; }
}

/// Transform scope. Dereferences to the frame buffer.
pub struct TransformGuard<'a> {
    fb: &'a mut FrameBuffer,
    saved: Affine2,
}

impl TransformGuard<'_> {
    /// Post-multiply the current matrix: `m` acts on local coordinates first.
    pub fn apply(
        &mut self,
        m: &Affine2,
    ) {
        self.fb.transform = self.fb.transform.then(m);
    }
}

impl Deref for TransformGuard<'_> {
    type Target = FrameBuffer;

    fn deref(&self) -> &FrameBuffer { self.fb }
}

impl DerefMut for TransformGuard<'_> {
    fn deref_mut(&mut self) -> &mut FrameBuffer { self.fb }
}

impl Drop for TransformGuard<'_> {
    fn drop(&mut self) {
        self.fb.transform = self.saved;
        self.fb.transform_depth -= 1;
    }
}

// =============================================================================
// embedded-graphics integration
// =============================================================================

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size { Size::new(SCREEN_WIDTH, SCREEN_HEIGHT) }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point, color);
        }
        Ok(())
    }

    fn fill_contiguous<I>(
        &mut self,
        area: &Rectangle,
        colors: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // Colours are row-major over the whole area, clipped points included.
        for (point, color) in area.points().zip(colors) {
            self.set_pixel(point, color);
        }
        Ok(())
    }

    fn fill_solid(
        &mut self,
        area: &Rectangle,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let drawable_area = area.intersection(&self.drawable_area());
        if drawable_area.is_zero_sized() {
            return Ok(());
        }
        for point in drawable_area.points() {
            self.write_unchecked(point, color);
        }
        self.dirty.include_rect(&drawable_area);
        Ok(())
    }

    fn clear(
        &mut self,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        self.background(color);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
