//! Linker scripts for the ESP32 image. Host builds (tests) need none.

use std::env;

fn main() {
    if env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default() != "xtensa" {
        return;
    }
    println!("cargo:rustc-link-arg=-Tlinkall.x");
    println!("cargo:rustc-link-arg=-Tdefmt.x");
}
