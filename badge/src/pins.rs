//! Pin map and bus settings of the badge.
//!
//! GPIO numbers refer to the ESP32. The firmware binary takes the matching
//! `peripherals.GPIOn` fields; these constants keep the wiring documented in
//! one place and let host tests refer to it.

// =============================================================================
// ILI9341 Display (SPI)
// =============================================================================

pub const LCD_SCLK: u8 = 18;
pub const LCD_MOSI: u8 = 23;
pub const LCD_MISO: u8 = 35;
pub const LCD_CS: u8 = 32;
pub const LCD_DC: u8 = 33;
pub const LCD_RESET: u8 = 25;
/// Selects whether the ESP32 or the FPGA drives the panel (low = ESP32).
pub const LCD_MODE: u8 = 26;

/// SPI clock for the display.
pub const LCD_SPI_FREQUENCY_HZ: u32 = 40_000_000;

// =============================================================================
// RP2040 Co-processor (I2C)
// =============================================================================

pub const I2C_SDA: u8 = 22;
pub const I2C_SCL: u8 = 21;

/// I2C bus speed.
pub const I2C_FREQUENCY_HZ: u32 = 400_000;

/// Co-processor interrupt line, active low. Also the deep sleep wake source.
pub const RP2040_INT: u8 = 34;

// =============================================================================
// LED Strip
// =============================================================================

/// SK6812 data line.
pub const LED_DATA: u8 = 5;

/// LED strip power enable (high = on).
pub const LED_POWER: u8 = 19;

/// RMT peripheral clock for the LED driver.
pub const LED_RMT_FREQUENCY_HZ: u32 = 80_000_000;
