//! Test doubles shared by the unit tests of this crate.

use alloc::vec::Vec;

use embedded_graphics::primitives::Rectangle;
use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::app::Platform;
use crate::display::DisplayTransfer;
use crate::framebuffer::FrameBuffer;
use crate::input::{InputEvent, InputQueue};
use crate::png::ColorType;

// =============================================================================
// Display
// =============================================================================

/// One recorded display transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transfer {
    Full,
    Partial(Rectangle),
}

/// Display that records what it was asked to send.
#[derive(Default)]
pub struct RecordingDisplay {
    pub transfers: Vec<Transfer>,
}

impl DisplayTransfer for RecordingDisplay {
    fn write_full(
        &mut self,
        _fb: &FrameBuffer,
    ) {
        self.transfers.push(Transfer::Full);
    }

    fn write_partial(
        &mut self,
        _fb: &FrameBuffer,
        area: &Rectangle,
    ) {
        self.transfers.push(Transfer::Partial(*area));
    }
}

// =============================================================================
// Input and platform
// =============================================================================

/// Queue fed from a fixed list of events.
#[derive(Default)]
pub struct ScriptedQueue {
    pub events: alloc::collections::VecDeque<InputEvent>,
    pub reads: usize,
}

impl ScriptedQueue {
    pub fn with(events: &[InputEvent]) -> Self {
        Self {
            events: events.iter().copied().collect(),
            reads: 0,
        }
    }
}

impl InputQueue for ScriptedQueue {
    fn try_receive(&mut self) -> Option<InputEvent> {
        self.reads += 1;
        self.events.pop_front()
    }
}

/// Platform calls in the order they happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlatformCall {
    ClearBootMode,
    Restart,
    DeepSleep,
    Idle,
}

#[derive(Default)]
pub struct RecordingPlatform {
    pub calls: Vec<PlatformCall>,
}

impl Platform for RecordingPlatform {
    fn clear_boot_mode(&mut self) { self.calls.push(PlatformCall::ClearBootMode); }

    fn restart(&mut self) { self.calls.push(PlatformCall::Restart); }

    fn deep_sleep(&mut self) { self.calls.push(PlatformCall::DeepSleep); }

    fn idle(&mut self) { self.calls.push(PlatformCall::Idle); }
}

// =============================================================================
// PNG encoding
// =============================================================================

/// Encode 8-bit pixels as a PNG using filter type 0 on every row.
pub fn encode_png(
    width: u32,
    height: u32,
    color_type: ColorType,
    pixels: &[u8],
    palette: &[u8],
) -> Vec<u8> {
    encode_png_with_filters(width, height, color_type, pixels, palette, &[0])
}

/// Encode 8-bit pixels as a PNG, row `i` using `filters[i % filters.len()]`.
///
/// Unknown filter numbers are written with the raw row so decoders can be
/// tested against them. CRC fields are zero.
pub fn encode_png_with_filters(
    width: u32,
    height: u32,
    color_type: ColorType,
    pixels: &[u8],
    palette: &[u8],
    filters: &[u8],
) -> Vec<u8> {
    let bpp = color_type.channels();
    let stride = width as usize * bpp;
    assert_eq!(pixels.len(), stride * height as usize);

    let mut raw = Vec::with_capacity((stride + 1) * height as usize);
    let zero_row = alloc::vec![0u8; stride];
    for (y, row) in pixels.chunks_exact(stride).enumerate() {
        let prior = if y == 0 { &zero_row[..] } else { &pixels[(y - 1) * stride..y * stride] };
        let filter = filters[y % filters.len()];
        raw.push(filter);
        for i in 0..stride {
            let a = if i >= bpp { row[i - bpp] } else { 0 };
            let b = prior[i];
            let c = if i >= bpp { prior[i - bpp] } else { 0 };
            let predictor = match filter {
                1 => a,
                2 => b,
                3 => ((a as u16 + b as u16) / 2) as u8,
                4 => paeth(a, b, c),
                _ => 0,
            };
            raw.push(row[i].wrapping_sub(predictor));
        }
    }

    let mut header = Vec::with_capacity(13);
    header.extend_from_slice(&width.to_be_bytes());
    header.extend_from_slice(&height.to_be_bytes());
    header.extend_from_slice(&[8, color_type as u8, 0, 0, 0]);

    let mut png = Vec::new();
    png.extend_from_slice(&[137, 80, 78, 71, 13, 10, 26, 10]);
    push_chunk(&mut png, b"IHDR", &header);
    if !palette.is_empty() {
        push_chunk(&mut png, b"PLTE", palette);
    }
    push_chunk(&mut png, b"IDAT", &compress_to_vec_zlib(&raw, 6));
    push_chunk(&mut png, b"IEND", &[]);
    png
}

/// Rewrite `png` (single IDAT, no PLTE) with its image data spread over
/// consecutive IDAT chunks of the given sizes, the remainder in a last one.
pub fn split_idat(
    png: &[u8],
    sizes: &[usize],
) -> Vec<u8> {
    // Signature (8) + IHDR (12 + 13), then the IDAT record
    let idat_start = 8 + 25;
    let length = u32::from_be_bytes([png[idat_start], png[idat_start + 1], png[idat_start + 2], png[idat_start + 3]]);
    let mut data = &png[idat_start + 8..idat_start + 8 + length as usize];

    let mut out = png[..idat_start].to_vec();
    for &size in sizes {
        let (head, tail) = data.split_at(size.min(data.len()));
        push_chunk(&mut out, b"IDAT", head);
        data = tail;
    }
    push_chunk(&mut out, b"IDAT", data);
    push_chunk(&mut out, b"IEND", &[]);
    out
}

fn push_chunk(
    png: &mut Vec<u8>,
    name: &[u8; 4],
    body: &[u8],
) {
    png.extend_from_slice(&(body.len() as u32).to_be_bytes());
    png.extend_from_slice(name);
    png.extend_from_slice(body);
    png.extend_from_slice(&[0, 0, 0, 0]);
}

fn paeth(
    a: u8,
    b: u8,
    c: u8,
) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let (pa, pb, pc) = ((p - a as i16).abs(), (p - b as i16).abs(), (p - c as i16).abs());
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// A `width` x `height` greyscale PNG filled with `level`.
pub fn solid_grey_png(
    width: u32,
    height: u32,
    level: u8,
) -> Vec<u8> {
    let pixels = alloc::vec![level; (width * height) as usize];
    encode_png(width, height, ColorType::Grey, &pixels, &[])
}

/// A `width` x `height` RGB PNG filled with one colour.
pub fn solid_rgb_png(
    width: u32,
    height: u32,
    rgb: [u8; 3],
) -> Vec<u8> {
    let pixels: Vec<u8> = rgb.iter().copied().cycle().take((width * height * 3) as usize).collect();
    encode_png(width, height, ColorType::Rgb, &pixels, &[])
}

/// Leak test data so it can stand in for `include_bytes!` assets.
pub fn leak(bytes: Vec<u8>) -> &'static [u8] { alloc::boxed::Box::leak(bytes.into_boxed_slice()) }
