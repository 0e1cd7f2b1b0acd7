//! Timing for the simulator.
//!
//! These use `std::time` which is not available in `no_std` environments, so
//! they are defined here rather than in the common crate.

use std::time::Duration;
#[cfg(feature = "window")]
use std::time::Instant;

use badge_common::Clock;

/// Target frame time (~50 FPS). The main loop sleeps if frame completes early.
pub const FRAME_TIME: Duration = Duration::from_millis(20);

/// Wall-clock milliseconds since the simulator started.
#[cfg(feature = "window")]
pub struct WallClock {
    start: Instant,
}

#[cfg(feature = "window")]
impl WallClock {
    pub fn new() -> Self { Self { start: Instant::now() } }
}

#[cfg(feature = "window")]
impl Clock for WallClock {
    fn now_ms(&mut self) -> u64 { self.start.elapsed().as_millis() as u64 }
}

/// Clock advancing by one frame time per reading, for reproducible snapshots.
pub struct FrameClock {
    now_ms: u64,
}

impl FrameClock {
    pub const fn new() -> Self { Self { now_ms: 0 } }
}

impl Clock for FrameClock {
    fn now_ms(&mut self) -> u64 {
        let now = self.now_ms;
        self.now_ms += FRAME_TIME.as_millis() as u64;
        now
    }
}
