//! Launcher boot mode handoff.
//!
//! The launcher picks the app to boot from RTC_CNTL_STORE0, which survives a
//! software reset. Writing [`BOOT_MODE_LAUNCHER`] there before restarting
//! returns control to the launcher menu.

/// RTC_CNTL register block on the ESP32.
pub const RTC_CNTL_BASE: usize = 0x3FF4_8000;

/// Offset of RTC_CNTL_STORE0 within the block. STORE0..=STORE3 sit at
/// 0x4C..=0x58; STORE4..=STORE7 start at 0xB0.
pub const STORE0_OFFSET: usize = 0x4C;

/// Absolute address of RTC_CNTL_STORE0.
pub const RTC_CNTL_STORE0_REG: usize = RTC_CNTL_BASE + STORE0_OFFSET;

/// Boot mode value that selects the launcher.
pub const BOOT_MODE_LAUNCHER: u32 = 0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store0_address() {
        assert_eq!(RTC_CNTL_STORE0_REG, 0x3FF4_804C);
        assert_eq!(RTC_CNTL_STORE0_REG % 4, 0);
    }

    #[test]
    fn test_store0_is_not_upper_scratch_bank() {
        // STORE4..=STORE7 are unrelated scratch registers
        let upper_bank = (RTC_CNTL_BASE + 0xB0)..=(RTC_CNTL_BASE + 0xBC);
        assert!(!upper_bank.contains(&RTC_CNTL_STORE0_REG));
    }
}
