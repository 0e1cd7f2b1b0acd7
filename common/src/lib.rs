//! Common types and logic for the gear badge demo.
//!
//! This crate contains platform-agnostic code shared between the simulator
//! and the ESP32 badge firmware:
//!
//! - [`colors`]: Palette and RGB565 colour interpolation
//! - [`config`]: Layout, animation and LED constants
//! - [`framebuffer`]: 320x240 RGB565 surface with dirty, clip and transform tracking
//! - [`transform`]: 2D affine matrices
//! - [`bitmap`]: Decoded greyscale bitmaps with bilinear sampling
//! - [`png`]: PNG decoder (zlib via `miniz_oxide`)
//! - [`assets`]: Decode-once asset cache
//! - [`shader`]: Colour-lerp shader and textured rectangle compositing
//! - [`display`]: Display transfer trait (full and partial)
//! - [`renderer`]: Animated overlay renderer
//! - [`animation`]: Gear rotation policy
//! - [`input`]: Co-processor input events and actions
//! - [`app`]: Application state machine and main loop
//! - [`leds`]: LED strip buffer
//! - [`debug_log`]: Ring buffer of log lines for the platform to print
//!
//! # no_std Compatibility
//!
//! This crate is `no_std` (with `alloc` for decoded bitmaps and the frame
//! buffer) and runs unchanged on the ESP32 and on the host.
//!
//! # Testing
//!
//! ```bash
//! cargo test -p badge-common
//! ```

#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

extern crate alloc;

pub mod animation;
pub mod app;
pub mod assets;
pub mod bitmap;
pub mod colors;
pub mod config;
pub mod debug_log;
pub mod display;
pub mod framebuffer;
pub mod input;
pub mod leds;
pub mod png;
pub mod renderer;
pub mod shader;
pub mod transform;

// Re-export commonly used items
pub use app::{App, AppConfig, AppState, Clock, Platform, Terminal};
pub use debug_log::{DebugLog, LogEntry, LogLevel};
pub use display::DisplayTransfer;
pub use framebuffer::FrameBuffer;
pub use input::{InputAction, InputEvent, InputId, InputQueue};
pub use renderer::{Assets, OverlayRenderer};

#[cfg(test)]
pub(crate) mod test_support;
