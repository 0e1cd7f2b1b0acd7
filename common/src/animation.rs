//! Gear rotation policy.

use core::f64::consts::PI;

use crate::config::GEAR_HALF_TURN_MS;

/// Gear angle in radians at `elapsed_ms` since start.
///
/// Clockwise on screen (negative), one full turn every 10 seconds. The value
/// is not wrapped; the rotation goes through sin/cos. Computed in `f64` so
/// millisecond steps stay distinct after hours of uptime.
#[inline]
pub fn gear_angle(elapsed_ms: u64) -> f32 { (PI * elapsed_ms as f64 / -GEAR_HALF_TURN_MS) as f32 }
