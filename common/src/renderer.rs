//! Animated overlay renderer.
//!
//! Produces every displayed frame from three embedded PNG assets:
//!
//! | Asset | Use |
//! |-------|-----|
//! | `nick_a.png` (grey, 320x240) | Static overlay shaded over the whole screen once |
//! | `nick_gear.png` (grey) | Gear shaded every frame, rotated about [`GEAR_PIVOT`] inside [`GEAR_CLIP`] |
//! | `nick.png` (colour, 320x240) | Final static frame shown before deep sleep |
//!
//! The two greyscale assets are decoded on first use and cached for the
//! process lifetime (see [`LazyAsset`]). A failed decode disables the
//! operation that needs it; the failure is recorded once in the
//! [`DebugLog`]. The colour image is streamed into the frame buffer when
//! needed and never cached.
//!
//! # Render Flow
//!
//! ```text
//! start:      background ─▶ static overlay ─▶ mark whole screen dirty
//! each frame: clip(gear) ─▶ transform(pivot · rotate) ─▶ shade gear ─▶ partial transfer
//! sleep:      clear black ─▶ colour image ─▶ full transfer
//! ```

use embedded_graphics::prelude::*;

use crate::assets::LazyAsset;
use crate::bitmap::GreyBitmap;
use crate::colors::BLACK;
use crate::config::{GEAR_CLIP, GEAR_LOCAL_RECT, GEAR_PIVOT, SCREEN_RECT};
use crate::debug_log::{DebugLog, LogLevel};
use crate::display::DisplayTransfer;
use crate::framebuffer::FrameBuffer;
use crate::png;
use crate::shader::{LerpShader, shade_rect};
use crate::transform::Affine2;

/// Encoded image assets.
#[derive(Clone, Copy, Debug)]
pub struct Assets {
    /// Full-colour static frame.
    pub full: &'static [u8],
    /// Greyscale static overlay.
    pub partial: &'static [u8],
    /// Greyscale gear.
    pub gear: &'static [u8],
}

impl Assets {
    /// Artwork linked into the binary.
    pub const EMBEDDED: Self = Self {
        full: include_bytes!("../../assets/nick.png"),
        partial: include_bytes!("../../assets/nick_a.png"),
        gear: include_bytes!("../../assets/nick_gear.png"),
    };
}

/// Composites the overlay and the rotating gear.
pub struct OverlayRenderer {
    partial: LazyAsset<GreyBitmap>,
    gear: LazyAsset<GreyBitmap>,
    full: &'static [u8],
    shader: LerpShader,
    log: DebugLog,
    now_ms: u64,
}

impl OverlayRenderer {
    pub fn new(assets: Assets) -> Self {
        Self {
            partial: LazyAsset::new(assets.partial),
            gear: LazyAsset::new(assets.gear),
            full: assets.full,
            shader: LerpShader::default(),
            log: DebugLog::new(),
            now_ms: 0,
        }
    }

    /// Timestamp used for log entries recorded by the next render calls.
    #[inline]
    pub fn set_time(
        &mut self,
        now_ms: u64,
    ) {
        self.now_ms = now_ms;
    }

    /// Events recorded while rendering.
    #[inline]
    pub fn log_mut(&mut self) -> &mut DebugLog { &mut self.log }

    #[inline]
    pub const fn partial_asset(&self) -> &LazyAsset<GreyBitmap> { &self.partial }

    #[inline]
    pub const fn gear_asset(&self) -> &LazyAsset<GreyBitmap> { &self.gear }

    /// Shade the static overlay over the whole screen.
    ///
    /// Marks the covered area dirty but does not transfer anything.
    pub fn render_static_overlay(
        &mut self,
        fb: &mut FrameBuffer,
    ) {
        let log = &mut self.log;
        let now_ms = self.now_ms;
        let Some(overlay) = self.partial.get_or_decode(png::decode_grey, |err| {
            log.record(LogLevel::Warn, now_ms, format_args!("overlay decode failed: {err}"));
        }) else {
            return;
        };
        shade_rect(fb, &SCREEN_RECT, overlay, &self.shader);
    }

    /// Shade the gear rotated by `angle` radians and send the dirty area.
    ///
    /// Does nothing at all (no transfer either) when the gear asset is unusable.
    pub fn render_rotated_gear<D: DisplayTransfer>(
        &mut self,
        fb: &mut FrameBuffer,
        display: &mut D,
        angle: f32,
    ) {
        let log = &mut self.log;
        let now_ms = self.now_ms;
        let Some(gear) = self.gear.get_or_decode(png::decode_grey, |err| {
            log.record(LogLevel::Warn, now_ms, format_args!("gear decode failed: {err}"));
        }) else {
            return;
        };

        {
            let mut clipped = fb.clipped(GEAR_CLIP);
            let mut local = clipped.push_transform();
            local.apply(&Affine2::translate(GEAR_PIVOT.x as f32, GEAR_PIVOT.y as f32));
            local.apply(&Affine2::rotate(angle));
            shade_rect(&mut local, &GEAR_LOCAL_RECT, gear, &self.shader);
        }
        fb.sync(display);
    }

    /// Replace the screen with the full-colour image and send all of it.
    ///
    /// A broken image leaves the screen black; the transfer still happens.
    pub fn render_full_bitmap<D: DisplayTransfer>(
        &mut self,
        fb: &mut FrameBuffer,
        display: &mut D,
    ) {
        fb.background(BLACK);
        if let Err(err) = png::draw(self.full, fb, Point::zero()) {
            self.log
                .record(LogLevel::Warn, self.now_ms, format_args!("image decode failed: {err}"));
        }
        fb.flush(display);
    }
}
