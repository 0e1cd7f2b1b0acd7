//! Gear badge firmware for the ESP32 (xtensa).
//!
//! Animates a rotating gear over a static overlay on the ILI9341 panel.
//!
//! # Controls (RP2040 co-processor)
//!
//! - **HOME / BACK**: return to the launcher (clears the boot mode, restarts)
//! - **Joystick press**: show the static image and enter deep sleep; the
//!   co-processor interrupt line wakes the badge again
//!
//! # Features
//!
//! - `peripherals` (default): LED strip and input handling. Without it the
//!   gear animates forever.

#![no_std]
#![no_main]
// Crate-level lints (match lib.rs for consistency)
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

extern crate alloc;

use badge_common::config::LED_COUNT;
use badge_common::leds::LedStrip;
use badge_common::{App, AppConfig, Assets, Clock, InputEvent, InputQueue, LogEntry, LogLevel, Platform};
use badge_firmware::boot_mode::{BOOT_MODE_LAUNCHER, RTC_CNTL_STORE0_REG};
use badge_firmware::ili9341::Ili9341;
use badge_firmware::pins;
use badge_firmware::rp2040::Rp2040;
use defmt::{debug, error, info, warn};
use esp_backtrace as _;
use esp_hal::Blocking;
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::main;
use esp_hal::peripherals::GPIO34;
use esp_hal::rmt::Rmt;
use esp_hal::rtc_cntl::Rtc;
use esp_hal::rtc_cntl::sleep::{Ext0WakeupSource, WakeupLevel};
use esp_hal::spi::Mode;
use esp_hal::spi::master::{Config as SpiConfig, Spi};
use esp_hal::time::{Instant, Rate};
use esp_hal_smartled::{SmartLedsAdapter, smart_led_buffer};
use esp_println as _;
use smart_leds::SmartLedsWrite;

esp_bootloader_esp_idf::esp_app_desc!();

/// Internal RAM heap. Large buffers go to PSRAM.
const HEAP_SIZE: usize = 72 * 1024;

// =============================================================================
// Platform
// =============================================================================

/// Milliseconds since boot from the system timer.
struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&mut self) -> u64 { Instant::now().duration_since_epoch().as_millis() }
}

/// Boot mode, restart and deep sleep on the ESP32.
struct EspPlatform {
    rtc: Rtc<'static>,
    wake_pin: Option<GPIO34<'static>>,
    /// Held so the strip stays powered.
    _led_power: Option<Output<'static>>,
    delay: Delay,
}

impl Platform for EspPlatform {
    /// Select the launcher in RTC_CNTL_STORE0 for the next boot.
    fn clear_boot_mode(&mut self) {
        // SAFETY: RTC_CNTL_STORE0 is a general purpose scratch register that
        // nothing else in this firmware touches.
        unsafe { core::ptr::write_volatile(RTC_CNTL_STORE0_REG as *mut u32, BOOT_MODE_LAUNCHER) };
    }

    fn restart(&mut self) {
        info!("Restarting into launcher");
        esp_hal::system::software_reset();
    }

    fn deep_sleep(&mut self) {
        let Some(pin) = self.wake_pin.take() else {
            warn!("Wake pin already used, not sleeping");
            return;
        };
        info!("Entering deep sleep");
        let ext0 = Ext0WakeupSource::new(pin, WakeupLevel::Low);
        self.rtc.sleep_deep(&[&ext0]);
    }

    fn idle(&mut self) { self.delay.delay_millis(1000); }

    fn log(
        &mut self,
        entry: &LogEntry,
    ) {
        match entry.level {
            LogLevel::Debug => debug!("[{}] {}", entry.timestamp_ms, entry.message()),
            LogLevel::Info => info!("[{}] {}", entry.timestamp_ms, entry.message()),
            LogLevel::Warn => warn!("[{}] {}", entry.timestamp_ms, entry.message()),
            LogLevel::Error => error!("[{}] {}", entry.timestamp_ms, entry.message()),
        }
    }
}

/// Co-processor queue, refilled only while the interrupt line is asserted.
struct GatedQueue {
    rp2040: Rp2040<I2c<'static, Blocking>>,
    interrupt: Input<'static>,
    dropped: u32,
}

impl InputQueue for GatedQueue {
    fn try_receive(&mut self) -> Option<InputEvent> {
        if self.interrupt.is_low() {
            self.rp2040.poll();
            let dropped = self.rp2040.dropped();
            if dropped > self.dropped {
                warn!("Input queue full, {} events dropped", dropped - self.dropped);
                self.dropped = dropped;
            }
        }
        self.rp2040.try_receive()
    }
}

// =============================================================================
// Main
// =============================================================================

#[main]
fn main() -> ! {
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(size: HEAP_SIZE);
    esp_alloc::psram_allocator!(peripherals.PSRAM, esp_hal::psram);

    info!("Gear badge starting...");
    let mut delay = Delay::new();

    let app_config = AppConfig {
        peripherals: cfg!(feature = "peripherals"),
    };

    // ESP32 drives the panel (not the FPGA)
    let _lcd_mode = Output::new(peripherals.GPIO26, Level::Low, OutputConfig::default());

    // Display: CS=32, DC=33, RST=25, CLK=18, MOSI=23, MISO=35
    let cs = Output::new(peripherals.GPIO32, Level::High, OutputConfig::default());
    let dc = Output::new(peripherals.GPIO33, Level::Low, OutputConfig::default());
    let rst = Output::new(peripherals.GPIO25, Level::High, OutputConfig::default());
    let spi = Spi::new(
        peripherals.SPI2,
        SpiConfig::default()
            .with_frequency(Rate::from_hz(pins::LCD_SPI_FREQUENCY_HZ))
            .with_mode(Mode::_0),
    )
    .expect("Invalid SPI configuration")
    .with_sck(peripherals.GPIO18)
    .with_mosi(peripherals.GPIO23)
    .with_miso(peripherals.GPIO35);

    let mut display = Ili9341::new(spi, dc, cs, rst);
    display.init(&mut delay);
    info!("Display initialized");

    // RP2040 co-processor on I2C: SDA=22, SCL=21, INT=34 (active low)
    let i2c = I2c::new(
        peripherals.I2C0,
        I2cConfig::default().with_frequency(Rate::from_hz(pins::I2C_FREQUENCY_HZ)),
    )
    .expect("Invalid I2C configuration")
    .with_sda(peripherals.GPIO22)
    .with_scl(peripherals.GPIO21);

    // SAFETY: GPIO34 is input-only. The second handle is used solely as the
    // EXT0 wake source after the main loop stops reading the interrupt line.
    let wake_pin = unsafe { GPIO34::steal() };
    let interrupt = Input::new(peripherals.GPIO34, InputConfig::default().with_pull(Pull::None));

    let mut rp2040 = Rp2040::new(i2c);
    match rp2040.init() {
        Ok(version) => info!("RP2040 firmware version {}", version),
        Err(_) => warn!("RP2040 not responding"),
    }

    // LED strip: power enable=19, data=5
    let led_power = app_config
        .peripherals
        .then(|| Output::new(peripherals.GPIO19, Level::High, OutputConfig::default()));
    if led_power.is_some() {
        let rmt = Rmt::new(peripherals.RMT, Rate::from_hz(pins::LED_RMT_FREQUENCY_HZ))
            .expect("Invalid RMT configuration");
        let mut rmt_buffer = smart_led_buffer!(LED_COUNT);
        let mut leds = SmartLedsAdapter::new(rmt.channel0, peripherals.GPIO5, &mut rmt_buffer);
        if leds.write(LedStrip::white().colors()).is_err() {
            warn!("LED strip write failed");
        }
    }

    let platform = EspPlatform {
        rtc: Rtc::new(peripherals.LPWR),
        wake_pin: Some(wake_pin),
        _led_power: led_power,
        delay,
    };
    let queue = GatedQueue {
        rp2040,
        interrupt,
        dropped: 0,
    };

    info!("Entering main loop (peripherals: {})", app_config.peripherals);
    App::new(Assets::EMBEDDED, app_config).run(SystemClock, queue, display, platform)
}
