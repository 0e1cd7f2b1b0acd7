//! Badge firmware library - hardware drivers testable on the host.
//!
//! The drivers are generic over `embedded-hal` 1.0 traits. The binary
//! (`main.rs`) binds them to the ESP32 peripherals; host tests bind them to
//! recording mocks.
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test -p badge-firmware --lib
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), allowing use of the standard
//! test framework while the actual firmware runs as `no_std`.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod boot_mode;
pub mod ili9341;
pub mod pins;
pub mod rp2040;
