//! RP2040 co-processor driver (buttons, joystick, backlight).
//!
//! The co-processor sits on I2C at [`RP2040_ADDRESS`] and exposes a small
//! register file. Input state lives in two 8-bit registers (`INPUT1`,
//! `INPUT2`) with matching interrupt registers flagging which bits changed
//! since the last read. The interrupt line (active low) tells the firmware
//! when to [`Rp2040::poll`].
//!
//! Each flagged bit becomes one [`InputEvent`] in a bounded FIFO. When the
//! FIFO is full new events are dropped and counted; the oldest stay queued.

use badge_common::config::INPUT_QUEUE_CAPACITY;
use badge_common::{InputEvent, InputId, InputQueue};
use embedded_hal::i2c::I2c;
use heapless::Deque;

/// I2C address of the co-processor.
pub const RP2040_ADDRESS: u8 = 0x17;

// Register map
pub const REG_FW_VER: u8 = 0;
pub const REG_LCD_BACKLIGHT: u8 = 5;
pub const REG_INPUT1: u8 = 6;
pub const REG_INPUT2: u8 = 7;
pub const REG_INTERRUPT1: u8 = 8;
pub const REG_INTERRUPT2: u8 = 9;

/// Backlight level set during init.
const BACKLIGHT_FULL: u8 = 255;

/// Co-processor driver and input event queue.
pub struct Rp2040<I2C> {
    i2c: I2C,
    queue: Deque<InputEvent, INPUT_QUEUE_CAPACITY>,
    dropped: u32,
}

impl<I2C: I2c> Rp2040<I2C> {
    pub const fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            queue: Deque::new(),
            dropped: 0,
        }
    }

    /// Read the firmware version and switch the backlight on.
    ///
    /// Returns the co-processor firmware version.
    pub fn init(&mut self) -> Result<u8, I2C::Error> {
        let version = self.read_register(REG_FW_VER)?;
        self.set_backlight(BACKLIGHT_FULL)?;
        Ok(version)
    }

    /// Set the LCD backlight level.
    pub fn set_backlight(
        &mut self,
        level: u8,
    ) -> Result<(), I2C::Error> {
        self.i2c.write(RP2040_ADDRESS, &[REG_LCD_BACKLIGHT, level])
    }

    /// Read input and interrupt registers and queue one event per flagged bit.
    ///
    /// Returns the number of events queued. Bus errors yield no events; flags
    /// on unused bits are ignored.
    pub fn poll(&mut self) -> usize {
        // INPUT1, INPUT2, INTERRUPT1, INTERRUPT2 in one burst
        let mut regs = [0u8; 4];
        if self.i2c.write_read(RP2040_ADDRESS, &[REG_INPUT1], &mut regs).is_err() {
            return 0;
        }
        let state = u16::from_le_bytes([regs[0], regs[1]]);
        let changed = u16::from_le_bytes([regs[2], regs[3]]);

        let mut queued = 0;
        for bit in 0..u16::BITS as u8 {
            let mask = 1u16 << bit;
            if changed & mask == 0 {
                continue;
            }
            let Some(input) = InputId::from_bit(bit) else {
                continue;
            };
            let event = InputEvent {
                input,
                pressed: state & mask != 0,
            };
            if self.queue.push_back(event).is_ok() {
                queued += 1;
            } else {
                self.dropped += 1;
            }
        }
        queued
    }

    /// Events discarded because the queue was full.
    #[inline]
    pub const fn dropped(&self) -> u32 { self.dropped }

    fn read_register(
        &mut self,
        reg: u8,
    ) -> Result<u8, I2C::Error> {
        let mut value = [0u8; 1];
        self.i2c.write_read(RP2040_ADDRESS, &[reg], &mut value)?;
        Ok(value[0])
    }
}

impl<I2C: I2c> InputQueue for Rp2040<I2C> {
    fn try_receive(&mut self) -> Option<InputEvent> { self.queue.pop_front() }
}
