//! Blocking ILI9341 display driver.
//!
//! Sends the shared [`FrameBuffer`] to the panel over SPI. The buffer is
//! already in the panel's byte order (big-endian RGB565), so transfers are
//! plain slices of it.
//!
//! # Transfers
//!
//! - **Full:** window set to the whole screen, one `RAMWR` with all 153,600 bytes
//! - **Partial:** window set to the dirty rectangle, one `RAMWR` followed by
//!   one SPI write per row (rows of a sub-rectangle are not contiguous in
//!   the buffer)
//!
//! CS is held low for the whole `RAMWR` payload. Bus errors are discarded;
//! a failed frame is simply replaced by the next one.
//!
//! The driver is generic over `embedded-hal` 1.0 traits, so it runs on the
//! ESP32 SPI master and against recording mocks in host tests.

use badge_common::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use badge_common::{DisplayTransfer, FrameBuffer};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

// ILI9341 Commands
const SWRESET: u8 = 0x01;
const SLPOUT: u8 = 0x11;
const DISPON: u8 = 0x29;
const CASET: u8 = 0x2A;
const RASET: u8 = 0x2B;
const RAMWR: u8 = 0x2C;
const MADCTL: u8 = 0x36;
const COLMOD: u8 = 0x3A;

// MADCTL flags
const MADCTL_MV: u8 = 0x20; // Row/column exchange
const MADCTL_BGR: u8 = 0x08; // Panel is wired BGR

/// COLMOD value for 16 bits per pixel on both interfaces.
const PIXEL_FORMAT_16BIT: u8 = 0x55;

/// ILI9341 on an SPI bus with data/command, chip select and reset lines.
pub struct Ili9341<SPI, DC, CS, RST> {
    spi: SPI,
    dc: DC,
    cs: CS,
    rst: RST,
}

impl<SPI, DC, CS, RST> Ili9341<SPI, DC, CS, RST>
where
    SPI: SpiBus<u8>,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
{
    /// Create a driver from the SPI bus and control pins.
    pub fn new(
        spi: SPI,
        dc: DC,
        cs: CS,
        rst: RST,
    ) -> Self {
        Self { spi, dc, cs, rst }
    }

    /// Reset and configure the panel for 320x240 landscape RGB565.
    pub fn init<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) {
        self.cs.set_high().ok();

        // Hardware reset
        self.rst.set_low().ok();
        delay.delay_ms(10);
        self.rst.set_high().ok();
        delay.delay_ms(120);

        self.write_command(SWRESET);
        delay.delay_ms(150);

        self.write_command(SLPOUT);
        delay.delay_ms(120);

        self.write_command(COLMOD);
        self.write_data(&[PIXEL_FORMAT_16BIT]);

        // Landscape: exchange rows and columns
        self.write_command(MADCTL);
        self.write_data(&[MADCTL_MV | MADCTL_BGR]);

        self.write_command(DISPON);
        delay.delay_ms(10);
    }

    /// Send a command byte (DC low, CS low during transfer).
    fn write_command(
        &mut self,
        cmd: u8,
    ) {
        self.cs.set_low().ok();
        self.dc.set_low().ok();
        self.spi.write(&[cmd]).ok();
        self.spi.flush().ok();
        self.cs.set_high().ok();
    }

    /// Send data bytes (DC high, CS low during transfer).
    fn write_data(
        &mut self,
        data: &[u8],
    ) {
        self.cs.set_low().ok();
        self.dc.set_high().ok();
        self.spi.write(data).ok();
        self.spi.flush().ok();
        self.cs.set_high().ok();
    }

    /// Set the inclusive drawing window.
    fn set_window(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) {
        self.write_command(CASET);
        self.write_data(&[(x0 >> 8) as u8, x0 as u8, (x1 >> 8) as u8, x1 as u8]);

        self.write_command(RASET);
        self.write_data(&[(y0 >> 8) as u8, y0 as u8, (y1 >> 8) as u8, y1 as u8]);
    }

    /// `RAMWR` then every chunk from `rows` as pixel data, CS held low throughout.
    fn write_pixels<'a>(
        &mut self,
        rows: impl Iterator<Item = &'a [u8]>,
    ) {
        self.cs.set_low().ok();
        self.dc.set_low().ok();
        self.spi.write(&[RAMWR]).ok();
        self.spi.flush().ok();
        self.dc.set_high().ok();
        for row in rows {
            self.spi.write(row).ok();
        }
        self.spi.flush().ok();
        self.cs.set_high().ok();
    }
}

impl<SPI, DC, CS, RST> DisplayTransfer for Ili9341<SPI, DC, CS, RST>
where
    SPI: SpiBus<u8>,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
{
    fn write_full(
        &mut self,
        fb: &FrameBuffer,
    ) {
        self.set_window(0, 0, SCREEN_WIDTH as u16 - 1, SCREEN_HEIGHT as u16 - 1);
        self.write_pixels(core::iter::once(fb.as_bytes()));
    }

    fn write_partial(
        &mut self,
        fb: &FrameBuffer,
        area: &Rectangle,
    ) {
        let Some(bottom_right) = area.bottom_right() else {
            return;
        };
        let Point { x, y } = area.top_left;
        self.set_window(x as u16, y as u16, bottom_right.x as u16, bottom_right.y as u16);

        let width = area.size.width;
        let rows = (y..=bottom_right.y).map(|row| fb.row_bytes(x as u32, row as u32, width));
        self.write_pixels(rows);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    use badge_common::config::SCREEN_RECT;
    use embedded_graphics::pixelcolor::Rgb565;
    use embedded_hal::digital::ErrorType as PinErrorType;
    use embedded_hal::spi::ErrorType as SpiErrorType;

    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum Op {
        Command(u8),
        Data(Vec<u8>),
        CsHigh,
        Reset(bool),
    }

    #[derive(Default)]
    struct Bus {
        ops: Vec<Op>,
        dc_high: bool,
        cs_low: bool,
    }

    type Shared = Rc<RefCell<Bus>>;

    struct MockSpi(Shared);

    impl SpiErrorType for MockSpi {
        type Error = core::convert::Infallible;
    }

    impl SpiBus<u8> for MockSpi {
        fn read(
            &mut self,
            _words: &mut [u8],
        ) -> Result<(), Self::Error> {
            Ok(())
        }

        fn write(
            &mut self,
            words: &[u8],
        ) -> Result<(), Self::Error> {
            let mut bus = self.0.borrow_mut();
            assert!(bus.cs_low, "write with CS high");
            if bus.dc_high {
                // Consecutive data writes within one CS window are one payload
                if let Some(Op::Data(data)) = bus.ops.last_mut() {
                    data.extend_from_slice(words);
                    return Ok(());
                }
                bus.ops.push(Op::Data(words.to_vec()));
            } else {
                for &w in words {
                    bus.ops.push(Op::Command(w));
                }
            }
            Ok(())
        }

        fn transfer(
            &mut self,
            _read: &mut [u8],
            _write: &[u8],
        ) -> Result<(), Self::Error> {
            Ok(())
        }

        fn transfer_in_place(
            &mut self,
            _words: &mut [u8],
        ) -> Result<(), Self::Error> {
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
    }

    #[derive(Clone, Copy)]
    enum Role {
        Dc,
        Cs,
        Rst,
    }

    struct MockPin(Shared, Role);

    impl PinErrorType for MockPin {
        type Error = core::convert::Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            let mut bus = self.0.borrow_mut();
            match self.1 {
                Role::Dc => bus.dc_high = false,
                Role::Cs => bus.cs_low = true,
                Role::Rst => bus.ops.push(Op::Reset(true)),
            }
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            let mut bus = self.0.borrow_mut();
            match self.1 {
                Role::Dc => bus.dc_high = true,
                Role::Cs => {
                    if bus.cs_low {
                        bus.ops.push(Op::CsHigh);
                    }
                    bus.cs_low = false;
                }
                Role::Rst => bus.ops.push(Op::Reset(false)),
            }
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(
            &mut self,
            _ns: u32,
        ) {
        }
    }

    type TestDisplay = Ili9341<MockSpi, MockPin, MockPin, MockPin>;

    fn display() -> (TestDisplay, Shared) {
        let bus: Shared = Rc::default();
        let lcd = Ili9341::new(
            MockSpi(bus.clone()),
            MockPin(bus.clone(), Role::Dc),
            MockPin(bus.clone(), Role::Cs),
            MockPin(bus.clone(), Role::Rst),
        );
        (lcd, bus)
    }

    /// Commands and data with the CS markers dropped.
    fn payload(bus: &Shared) -> Vec<Op> {
        bus.borrow().ops.iter().filter(|op| **op != Op::CsHigh).cloned().collect()
    }

    #[test]
    fn test_init_sequence() {
        let (mut lcd, bus) = display();
        lcd.init(&mut NoDelay);
        assert_eq!(
            payload(&bus),
            [
                Op::Reset(true),
                Op::Reset(false),
                Op::Command(SWRESET),
                Op::Command(SLPOUT),
                Op::Command(COLMOD),
                Op::Data(vec![0x55]),
                Op::Command(MADCTL),
                Op::Data(vec![0x28]),
                Op::Command(DISPON),
            ]
        );
    }

    #[test]
    fn test_full_transfer_sends_whole_buffer() {
        let (mut lcd, bus) = display();
        let mut fb = FrameBuffer::new();
        fb.background(Rgb565::RED);
        fb.flush(&mut lcd);

        let ops = payload(&bus);
        assert_eq!(ops[0], Op::Command(CASET));
        assert_eq!(ops[1], Op::Data(vec![0, 0, 0x01, 0x3F]));
        assert_eq!(ops[2], Op::Command(RASET));
        assert_eq!(ops[3], Op::Data(vec![0, 0, 0, 0xEF]));
        assert_eq!(ops[4], Op::Command(RAMWR));
        let Op::Data(pixels) = &ops[5] else {
            panic!("expected pixel data");
        };
        assert_eq!(pixels.len(), 320 * 240 * 2);
        assert_eq!(pixels[..2], Rgb565::RED.into_storage().to_be_bytes());
        assert!(!fb.is_dirty());
    }

    #[test]
    fn test_partial_transfer_uses_inclusive_window() {
        let (mut lcd, bus) = display();
        let mut fb = FrameBuffer::new();
        fb.set_pixel(Point::new(220, 110), Rgb565::WHITE);
        fb.set_pixel(Point::new(279, 169), Rgb565::BLUE);
        fb.sync(&mut lcd);

        let ops = payload(&bus);
        // 220..=279, 110..=169
        assert_eq!(ops[1], Op::Data(vec![0, 220, 1, 23]));
        assert_eq!(ops[3], Op::Data(vec![0, 110, 0, 169]));
        assert_eq!(ops[4], Op::Command(RAMWR));
        let Op::Data(pixels) = &ops[5] else {
            panic!("expected pixel data");
        };
        assert_eq!(pixels.len(), 60 * 60 * 2);
        assert_eq!(pixels[..2], [0xFF, 0xFF]);
        assert_eq!(pixels[pixels.len() - 2..], Rgb565::BLUE.into_storage().to_be_bytes());
    }

    #[test]
    fn test_partial_rows_come_from_buffer_rows() {
        let (mut lcd, bus) = display();
        let mut fb = FrameBuffer::new();
        // Two pixels in different rows: the window is 2x2 and the off-diagonal
        // pixels are black.
        fb.set_pixel(Point::new(10, 5), Rgb565::WHITE);
        fb.set_pixel(Point::new(11, 6), Rgb565::WHITE);
        fb.sync(&mut lcd);

        let ops = payload(&bus);
        assert_eq!(ops[5], Op::Data(vec![0xFF, 0xFF, 0, 0, 0, 0, 0xFF, 0xFF]));
    }

    #[test]
    fn test_full_screen_partial_matches_full_payload() {
        let (mut lcd, bus) = display();
        let mut fb = FrameBuffer::new();
        fb.background(Rgb565::GREEN);
        lcd.write_partial(&fb, &SCREEN_RECT);

        let ops = payload(&bus);
        assert_eq!(ops[5], Op::Data(fb.as_bytes().to_vec()));
    }
}
