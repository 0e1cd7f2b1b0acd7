//! Streaming PNG decoder for embedded assets.
//!
//! The decoder walks the chunk list of an in-memory PNG, inflates the
//! concatenated IDAT payload with `miniz_oxide`'s streaming inflater and
//! un-filters one scanline at a time. Only the current and previous scanline
//! are held in memory, so a full-screen colour image can be drawn straight
//! into the frame buffer without an intermediate bitmap.
//!
//! # Supported Images
//!
//! - 8-bit greyscale, greyscale + alpha, RGB, RGBA and palette
//! - non-interlaced
//!
//! Alpha is applied against black (the decoded assets are drawn over a
//! cleared buffer or used as intensity masks). CRCs are not verified; the
//! images are linked into the firmware image.
//!
//! # Usage
//!
//! ```ignore
//! let gear = png::decode_grey(GEAR_PNG)?;
//! png::draw(STATIC_PNG, &mut framebuffer, Point::zero())?;
//! ```

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use miniz_oxide::inflate::stream::{InflateState, inflate};
use miniz_oxide::{DataFormat, MZError, MZFlush, MZStatus};

use crate::bitmap::GreyBitmap;
use crate::colors::to_rgb565;

// Magic bytes to start a PNG file.
const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

// Chunk identifiers
const IMAGE_HEADER: [u8; 4] = *b"IHDR";
const IMAGE_DATA: [u8; 4] = *b"IDAT";
const IMAGE_END: [u8; 4] = *b"IEND";
const PALETTE: [u8; 4] = *b"PLTE";

/// Inflate output window. Larger values mean fewer inflate calls.
const INFLATED_BUFFER_LENGTH: usize = 1024;

// =============================================================================
// Errors
// =============================================================================

/// Reasons an image could not be decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PngError {
    /// Data does not start with the PNG signature.
    Signature,
    /// A chunk or the image data ends early.
    Truncated,
    /// The first chunk is not IHDR.
    MissingHeader,
    /// IHDR holds impossible values (zero size, bad compression or filter method).
    InvalidHeader,
    /// Valid PNG feature this decoder does not implement (interlace, bit depth).
    Unsupported,
    /// A palette image without a PLTE chunk.
    MissingPalette,
    /// The zlib stream is corrupt.
    Inflate,
    /// A scanline uses an unknown filter type.
    Filter,
    /// IEND reached before any IDAT.
    MissingData,
}

impl fmt::Display for PngError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let msg = match self {
            Self::Signature => "invalid png signature",
            Self::Truncated => "png data truncated",
            Self::MissingHeader => "header chunk not first",
            Self::InvalidHeader => "invalid png header",
            Self::Unsupported => "unsupported png format",
            Self::MissingPalette => "palette chunk missing",
            Self::Inflate => "corrupt zlib stream",
            Self::Filter => "invalid scanline filter",
            Self::MissingData => "no image data",
        };
        f.write_str(msg)
    }
}

// =============================================================================
// Header
// =============================================================================

/// Standard PNG colour types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ColorType {
    Grey = 0,
    Rgb = 2,
    Palette = 3,
    GreyAlpha = 4,
    Rgba = 6,
}

impl ColorType {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Grey),
            2 => Some(Self::Rgb),
            3 => Some(Self::Palette),
            4 => Some(Self::GreyAlpha),
            6 => Some(Self::Rgba),
            _ => None,
        }
    }

    /// Bytes per pixel at 8 bits per channel.
    pub const fn channels(self) -> usize {
        match self {
            Self::Grey | Self::Palette => 1,
            Self::GreyAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Fields of the IHDR chunk that matter for decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Header {
    pub width: u32,
    pub height: u32,
    pub color_type: ColorType,
}

impl Header {
    /// Image size.
    pub const fn size(&self) -> Size { Size::new(self.width, self.height) }

    const fn stride(&self) -> usize { self.width as usize * self.color_type.channels() }
}

fn parse_header(body: &[u8]) -> Result<Header, PngError> {
    if body.len() != 13 {
        return Err(PngError::InvalidHeader);
    }
    let width = u32::from_be_bytes([body[0], body[1], body[2], body[3]]);
    let height = u32::from_be_bytes([body[4], body[5], body[6], body[7]]);
    let bit_depth = body[8];
    let color_type = ColorType::from_u8(body[9]).ok_or(PngError::InvalidHeader)?;
    let (compression, filter, interlace) = (body[10], body[11], body[12]);

    if width == 0 || height == 0 || compression != 0 || filter != 0 || interlace > 1 {
        return Err(PngError::InvalidHeader);
    }
    if bit_depth != 8 || interlace != 0 {
        return Err(PngError::Unsupported);
    }
    Ok(Header {
        width,
        height,
        color_type,
    })
}

// =============================================================================
// Chunk Iterator
// =============================================================================

/// Walks `length | name | body | crc` records after the signature.
struct Chunks<'a> {
    data: &'a [u8],
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Result<([u8; 4], &'a [u8]), PngError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() {
            return None;
        }
        if self.data.len() < 8 {
            self.data = &[];
            return Some(Err(PngError::Truncated));
        }
        let length = u32::from_be_bytes([self.data[0], self.data[1], self.data[2], self.data[3]]) as usize;
        let name = [self.data[4], self.data[5], self.data[6], self.data[7]];
        let end = 8usize.saturating_add(length).saturating_add(4);
        if self.data.len() < end {
            self.data = &[];
            return Some(Err(PngError::Truncated));
        }
        let body = &self.data[8..8 + length];
        self.data = &self.data[end..];
        Some(Ok((name, body)))
    }
}

// =============================================================================
// Decoder
// =============================================================================

/// Scanline-at-a-time PNG decoder over an in-memory image.
pub struct PngDecoder<'a> {
    header: Header,
    palette: &'a [u8],
    chunks: Chunks<'a>,
    /// Unconsumed bytes of the current IDAT chunk.
    input: &'a [u8],
    inflate: Box<InflateState>,
    inflated: Vec<u8>,
    inflated_index: usize,
    inflated_length: usize,
    stream_end: bool,
    line: Vec<u8>,
    prior_line: Vec<u8>,
    rows_read: u32,
}

impl<'a> PngDecoder<'a> {
    /// Validate the signature and header and position at the first IDAT.
    pub fn new(data: &'a [u8]) -> Result<Self, PngError> {
        if data.len() < PNG_SIGNATURE.len() || data[..8] != PNG_SIGNATURE {
            return Err(PngError::Signature);
        }
        let mut chunks = Chunks { data: &data[8..] };

        let header = match chunks.next() {
            Some(Ok((IMAGE_HEADER, body))) => parse_header(body)?,
            Some(Ok(_)) => return Err(PngError::MissingHeader),
            Some(Err(err)) => return Err(err),
            None => return Err(PngError::Truncated),
        };

        let mut palette: &[u8] = &[];
        let input = loop {
            match chunks.next() {
                Some(Ok((IMAGE_DATA, body))) => break body,
                Some(Ok((PALETTE, body))) => palette = body,
                Some(Ok((IMAGE_END, _))) | None => return Err(PngError::MissingData),
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err),
            }
        };
        if header.color_type == ColorType::Palette && palette.is_empty() {
            return Err(PngError::MissingPalette);
        }

        let stride = header.stride();
        Ok(Self {
            header,
            palette,
            chunks,
            input,
            inflate: InflateState::new_boxed(DataFormat::Zlib),
            inflated: vec![0u8; INFLATED_BUFFER_LENGTH],
            inflated_index: 0,
            inflated_length: 0,
            stream_end: false,
            line: vec![0u8; stride],
            prior_line: vec![0u8; stride],
            rows_read: 0,
        })
    }

    /// Parsed image header.
    #[inline]
    pub const fn header(&self) -> Header { self.header }

    /// PLTE contents (RGB triples), empty for non-palette images.
    #[inline]
    pub const fn palette(&self) -> &'a [u8] { self.palette }

    /// Decode the next scanline. Returns `None` after the last row.
    ///
    /// The slice holds `width * channels` unfiltered bytes.
    pub fn next_row(&mut self) -> Result<Option<&[u8]>, PngError> {
        if self.rows_read == self.header.height {
            return Ok(None);
        }
        let mut filter_type = [0u8; 1];
        self.read_inflated(&mut filter_type)?;
        let mut line = core::mem::take(&mut self.line);
        self.read_inflated(&mut line)?;
        unfilter(filter_type[0], self.header.color_type.channels(), &mut line, &self.prior_line)?;
        // The decoded line becomes the prior line for the next row.
        self.line = core::mem::replace(&mut self.prior_line, line);
        self.rows_read += 1;
        Ok(Some(&self.prior_line))
    }

    fn read_inflated(
        &mut self,
        dst: &mut [u8],
    ) -> Result<(), PngError> {
        let mut filled = 0;
        while filled < dst.len() {
            if self.inflated_index >= self.inflated_length {
                self.refill()?;
            }
            let available = self.inflated_length - self.inflated_index;
            let n = available.min(dst.len() - filled);
            dst[filled..filled + n].copy_from_slice(&self.inflated[self.inflated_index..self.inflated_index + n]);
            self.inflated_index += n;
            filled += n;
        }
        Ok(())
    }

    // Inflates from the current IDAT into `inflated`, moving on to the next
    // consecutive IDAT when the current one is exhausted.
    fn refill(&mut self) -> Result<(), PngError> {
        loop {
            if self.stream_end {
                return Err(PngError::Truncated);
            }
            let result = inflate(&mut self.inflate, self.input, &mut self.inflated, MZFlush::None);
            self.input = &self.input[result.bytes_consumed..];
            self.inflated_index = 0;
            self.inflated_length = result.bytes_written;
            match result.status {
                Ok(MZStatus::StreamEnd) => self.stream_end = true,
                Ok(_) | Err(MZError::Buf) => {}
                Err(_) => return Err(PngError::Inflate),
            }
            if self.inflated_length > 0 {
                return Ok(());
            }
            if self.input.is_empty() {
                self.input = match self.chunks.next() {
                    Some(Ok((IMAGE_DATA, body))) => body,
                    Some(Err(err)) => return Err(err),
                    _ => return Err(PngError::Truncated),
                };
            } else if result.bytes_consumed == 0 {
                return Err(PngError::Inflate);
            }
        }
    }
}

/// Reverse the per-scanline filter in place.
fn unfilter(
    filter_type: u8,
    bpp: usize,
    line: &mut [u8],
    prior: &[u8],
) -> Result<(), PngError> {
    match filter_type {
        0 => {}
        1 => {
            for i in bpp..line.len() {
                line[i] = line[i].wrapping_add(line[i - bpp]);
            }
        }
        2 => {
            for (x, b) in line.iter_mut().zip(prior) {
                *x = x.wrapping_add(*b);
            }
        }
        3 => {
            for i in 0..line.len() {
                let a = if i >= bpp { line[i - bpp] as u16 } else { 0 };
                let b = prior[i] as u16;
                line[i] = line[i].wrapping_add(((a + b) / 2) as u8);
            }
        }
        4 => {
            for i in 0..line.len() {
                let a = if i >= bpp { line[i - bpp] } else { 0 };
                let b = prior[i];
                let c = if i >= bpp { prior[i - bpp] } else { 0 };
                line[i] = line[i].wrapping_add(paeth(a, b, c));
            }
        }
        _ => return Err(PngError::Filter),
    }
    Ok(())
}

#[inline]
fn paeth(
    a: u8,
    b: u8,
    c: u8,
) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let pa = (p - a as i16).abs();
    let pb = (p - b as i16).abs();
    let pc = (p - c as i16).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

// =============================================================================
// Pixel Conversion
// =============================================================================

#[inline]
fn premultiply(
    value: u8,
    alpha: u8,
) -> u8 {
    ((value as u16 * alpha as u16 + 127) / 255) as u8
}

#[inline]
fn luma(
    r: u8,
    g: u8,
    b: u8,
) -> u8 {
    ((r as u32 * 77 + g as u32 * 150 + b as u32 * 29) >> 8) as u8
}

fn palette_entry(
    palette: &[u8],
    index: u8,
) -> Rgb888 {
    let i = index as usize * 3;
    match palette.get(i..i + 3) {
        Some(rgb) => Rgb888::new(rgb[0], rgb[1], rgb[2]),
        None => Rgb888::BLACK,
    }
}

/// Colour of one pixel (alpha applied against black).
fn pixel_rgb(
    color_type: ColorType,
    palette: &[u8],
    px: &[u8],
) -> Rgb888 {
    match color_type {
        ColorType::Grey => Rgb888::new(px[0], px[0], px[0]),
        ColorType::GreyAlpha => {
            let v = premultiply(px[0], px[1]);
            Rgb888::new(v, v, v)
        }
        ColorType::Rgb => Rgb888::new(px[0], px[1], px[2]),
        ColorType::Rgba => Rgb888::new(
            premultiply(px[0], px[3]),
            premultiply(px[1], px[3]),
            premultiply(px[2], px[3]),
        ),
        ColorType::Palette => palette_entry(palette, px[0]),
    }
}

/// Intensity of one pixel (alpha applied against black).
fn pixel_grey(
    color_type: ColorType,
    palette: &[u8],
    px: &[u8],
) -> u8 {
    match color_type {
        ColorType::Grey => px[0],
        ColorType::GreyAlpha => premultiply(px[0], px[1]),
        _ => {
            let c = pixel_rgb(color_type, palette, px);
            luma(c.r(), c.g(), c.b())
        }
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Decode an image to an 8-bit greyscale bitmap.
pub fn decode_grey(data: &[u8]) -> Result<GreyBitmap, PngError> {
    let mut decoder = PngDecoder::new(data)?;
    let header = decoder.header();
    let palette = decoder.palette();
    let channels = header.color_type.channels();

    let mut pixels = Vec::with_capacity(header.width as usize * header.height as usize);
    while let Some(row) = decoder.next_row()? {
        pixels.extend(row.chunks_exact(channels).map(|px| pixel_grey(header.color_type, palette, px)));
    }
    GreyBitmap::new(header.width, header.height, pixels).ok_or(PngError::Truncated)
}

/// Decode an image row by row straight into `target` with its top-left at `origin`.
///
/// Returns the image size. Pixels outside the target are discarded by the
/// target's own clipping.
pub fn draw<D>(
    data: &[u8],
    target: &mut D,
    origin: Point,
) -> Result<Size, PngError>
where
    D: DrawTarget<Color = Rgb565>,
{
    let mut decoder = PngDecoder::new(data)?;
    let header = decoder.header();
    let palette = decoder.palette();
    let channels = header.color_type.channels();

    let mut y = 0;
    while let Some(row) = decoder.next_row()? {
        let area = Rectangle::new(origin + Point::new(0, y), Size::new(header.width, 1));
        let colors = row
            .chunks_exact(channels)
            .map(|px| to_rgb565(pixel_rgb(header.color_type, palette, px)));
        target.fill_contiguous(&area, colors).ok();
        y += 1;
    }
    Ok(header.size())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::FrameBuffer;
    use crate::test_support::{encode_png, encode_png_with_filters, split_idat};

    #[test]
    fn test_rejects_bad_signature() {
        assert_eq!(decode_grey(b"not a png at all").unwrap_err(), PngError::Signature);
        assert_eq!(decode_grey(&[]).unwrap_err(), PngError::Signature);
    }

    #[test]
    fn test_decode_grey_image() {
        let pixels: Vec<u8> = (0..12).map(|i| i * 20).collect();
        let png = encode_png(4, 3, ColorType::Grey, &pixels, &[]);
        let bmp = decode_grey(&png).unwrap();
        assert_eq!((bmp.width(), bmp.height()), (4, 3));
        assert_eq!(bmp.texel(0, 0), 0);
        assert_eq!(bmp.texel(3, 2), 220);
    }

    #[test]
    fn test_decoder_reports_header() {
        let png = encode_png(60, 60, ColorType::Grey, &vec![0; 3600], &[]);
        let header = PngDecoder::new(&png).unwrap().header();
        assert_eq!(header.size(), Size::new(60, 60));
        assert_eq!(header.color_type, ColorType::Grey);
    }

    #[test]
    fn test_split_idat_chunks() {
        let pixels: Vec<u8> = (0..3600u32).map(|i| (i * 7 % 251) as u8).collect();
        let png = encode_png(60, 60, ColorType::Grey, &pixels, &[]);
        let expected = decode_grey(&png).unwrap();

        // Leading empty IDAT, then pieces down to a single byte
        let split = split_idat(&png, &[0, 1, 2, 3, 7, 64, 1000]);
        assert!(split.len() > png.len());
        assert_eq!(decode_grey(&split).unwrap(), expected);

        // One byte per chunk
        let bytewise = split_idat(&png, &[1; 4096]);
        assert_eq!(decode_grey(&bytewise).unwrap(), expected);
    }

    #[test]
    fn test_all_filter_types_reconstruct() {
        let width = 5;
        let height = 5;
        let pixels: Vec<u8> = (0..(width * height * 3) as u32).map(|i| (i * 37 % 251) as u8).collect();
        let plain = encode_png(width, height, ColorType::Rgb, &pixels, &[]);
        let filtered = encode_png_with_filters(width, height, ColorType::Rgb, &pixels, &[], &[0, 1, 2, 3, 4]);

        let mut a = FrameBuffer::new();
        let mut b = FrameBuffer::new();
        draw(&plain, &mut a, Point::zero()).unwrap();
        draw(&filtered, &mut b, Point::zero()).unwrap();
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                assert_eq!(a.pixel(Point::new(x, y)), b.pixel(Point::new(x, y)), "pixel {x},{y}");
            }
        }
    }

    #[test]
    fn test_unknown_filter_rejected() {
        let png = encode_png_with_filters(2, 1, ColorType::Grey, &[1, 2], &[], &[9]);
        assert_eq!(decode_grey(&png).unwrap_err(), PngError::Filter);
    }

    #[test]
    fn test_draw_rgb_into_framebuffer() {
        let pixels = [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let png = encode_png(2, 2, ColorType::Rgb, &pixels, &[]);
        let mut fb = FrameBuffer::new();
        let size = draw(&png, &mut fb, Point::new(10, 20)).unwrap();
        assert_eq!(size, Size::new(2, 2));
        assert_eq!(fb.pixel(Point::new(10, 20)), Some(Rgb565::RED));
        assert_eq!(fb.pixel(Point::new(11, 20)), Some(Rgb565::GREEN));
        assert_eq!(fb.pixel(Point::new(10, 21)), Some(Rgb565::BLUE));
        assert_eq!(fb.pixel(Point::new(11, 21)), Some(Rgb565::WHITE));
        assert_eq!(fb.dirty(), Some(Rectangle::new(Point::new(10, 20), Size::new(2, 2))));
    }

    #[test]
    fn test_palette_image() {
        let palette = [0, 0, 0, 255, 255, 255];
        let png = encode_png(2, 1, ColorType::Palette, &[1, 0], &palette);
        let bmp = decode_grey(&png).unwrap();
        assert_eq!(bmp.texel(0, 0), 255);
        assert_eq!(bmp.texel(1, 0), 0);
    }

    #[test]
    fn test_palette_required() {
        let png = encode_png(1, 1, ColorType::Palette, &[0], &[]);
        assert_eq!(decode_grey(&png).unwrap_err(), PngError::MissingPalette);
    }

    #[test]
    fn test_alpha_applied_against_black() {
        let png = encode_png(2, 1, ColorType::GreyAlpha, &[200, 255, 200, 0], &[]);
        let bmp = decode_grey(&png).unwrap();
        assert_eq!(bmp.texel(0, 0), 200);
        assert_eq!(bmp.texel(1, 0), 0);
    }

    #[test]
    fn test_truncated_data() {
        let png = encode_png(8, 8, ColorType::Grey, &[7; 64], &[]);
        // Cut inside the IDAT chunk
        let cut = &png[..png.len() - 30];
        assert!(decode_grey(cut).is_err());
    }

    #[test]
    fn test_corrupt_zlib_stream() {
        let mut png = encode_png(8, 8, ColorType::Grey, &[7; 64], &[]);
        // IDAT body starts after signature (8) + IHDR (25) + IDAT length/name (8)
        let idat_body = 8 + 25 + 8;
        png[idat_body] = 0xFF;
        png[idat_body + 1] = 0xFF;
        assert!(decode_grey(&png).is_err());
    }
}
