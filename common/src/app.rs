//! Application state machine and main loop.
//!
//! ```text
//!            ┌──────────── no event / unbound event ───────────┐
//!            ▼                                                  │
//! start ─▶ Running ──(gear frame, read ≤ 1 event)───────────────┘
//!            │
//!            ├── HOME / BACK pressed ────▶ Terminating(Restart)
//!            └── JOYSTICK pressed ───────▶ Terminating(Sleep)
//! ```
//!
//! `Terminating` has no way back. Hardware effects (boot-mode register,
//! restart, deep sleep) go through the [`Platform`] trait so the same loop
//! runs on the badge, in the simulator and in tests.

use crate::animation::gear_angle;
use crate::colors::{BACKGROUND, to_rgb565};
use crate::debug_log::{LogEntry, LogLevel};
use crate::display::DisplayTransfer;
use crate::framebuffer::FrameBuffer;
use crate::input::{InputAction, InputQueue};
use crate::renderer::{Assets, OverlayRenderer};

// =============================================================================
// Configuration and State
// =============================================================================

/// Program variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppConfig {
    /// Drive the LED strip and react to co-processor input. When off, the
    /// gear animates forever and the input queue is never read.
    pub peripherals: bool,
}

impl Default for AppConfig {
    fn default() -> Self { Self { peripherals: true } }
}

/// How the application leaves the main loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Terminal {
    /// Clear the boot mode and restart into the launcher.
    Restart,
    /// Show the static frame, clear the boot mode and deep sleep.
    Sleep,
}

impl From<InputAction> for Terminal {
    fn from(action: InputAction) -> Self {
        match action {
            InputAction::Restart => Self::Restart,
            InputAction::Sleep => Self::Sleep,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppState {
    Running,
    Terminating(Terminal),
}

// =============================================================================
// Platform Seams
// =============================================================================

/// Device-level effects of the terminal actions.
pub trait Platform {
    /// Reset the boot-mode register so the next boot lands in the launcher.
    fn clear_boot_mode(&mut self);

    /// Software restart. Does not return on hardware.
    fn restart(&mut self);

    /// Enter deep sleep. Does not return on hardware.
    fn deep_sleep(&mut self);

    /// Wait once after a terminal action returned.
    fn idle(&mut self);

    /// Print a recorded log entry.
    fn log(
        &mut self,
        _entry: &LogEntry,
    ) {
    }
}

/// Monotonic milliseconds since start.
pub trait Clock {
    fn now_ms(&mut self) -> u64;
}

// =============================================================================
// Application
// =============================================================================

/// The demo application: owns the frame buffer and the renderer.
pub struct App {
    renderer: OverlayRenderer,
    fb: FrameBuffer,
    config: AppConfig,
    state: AppState,
}

impl App {
    pub fn new(
        assets: Assets,
        config: AppConfig,
    ) -> Self {
        Self {
            renderer: OverlayRenderer::new(assets),
            fb: FrameBuffer::new(),
            config,
            state: AppState::Running,
        }
    }

    #[inline]
    pub const fn state(&self) -> AppState { self.state }

    #[inline]
    pub const fn framebuffer(&self) -> &FrameBuffer { &self.fb }

    /// Draw the first frame: background, static overlay, whole screen dirty.
    ///
    /// Nothing is sent yet; the first gear frame transfers the whole screen.
    pub fn start(&mut self) {
        self.fb.background(to_rgb565(BACKGROUND));
        self.renderer.render_static_overlay(&mut self.fb);
        self.fb.mark_dirty_all();
    }

    /// One loop iteration: a gear frame, then at most one input event.
    pub fn step<Q, D>(
        &mut self,
        now_ms: u64,
        queue: &mut Q,
        display: &mut D,
    ) -> AppState
    where
        Q: InputQueue,
        D: DisplayTransfer,
    {
        if self.state != AppState::Running {
            return self.state;
        }

        self.renderer.set_time(now_ms);
        self.renderer.render_rotated_gear(&mut self.fb, display, gear_angle(now_ms));

        if !self.config.peripherals {
            return self.state;
        }
        let Some(event) = queue.try_receive() else {
            return self.state;
        };
        if let Some(action) = InputAction::from_event(event) {
            let terminal = Terminal::from(action);
            self.renderer
                .log_mut()
                .record(LogLevel::Info, now_ms, format_args!("{} pressed: {:?}", event.input, terminal));
            self.state = AppState::Terminating(terminal);
        }
        self.state
    }

    /// Carry out a terminal action.
    pub fn terminate<D, P>(
        &mut self,
        terminal: Terminal,
        display: &mut D,
        platform: &mut P,
    ) where
        D: DisplayTransfer,
        P: Platform,
    {
        self.state = AppState::Terminating(terminal);
        match terminal {
            Terminal::Restart => {
                platform.clear_boot_mode();
                platform.restart();
            }
            Terminal::Sleep => {
                self.renderer.render_full_bitmap(&mut self.fb, display);
                platform.clear_boot_mode();
                platform.deep_sleep();
            }
        }
    }

    /// Hand every recorded entry to the platform.
    pub fn drain_log<P: Platform>(
        &mut self,
        platform: &mut P,
    ) {
        while let Some(entry) = self.renderer.log_mut().pop() {
            platform.log(&entry);
        }
    }

    /// Run frames until an input action ends the loop, then perform it.
    pub fn run_until_terminated<C, Q, D, P>(
        &mut self,
        clock: &mut C,
        queue: &mut Q,
        display: &mut D,
        platform: &mut P,
    ) -> Terminal
    where
        C: Clock,
        Q: InputQueue,
        D: DisplayTransfer,
        P: Platform,
    {
        self.start();
        let terminal = loop {
            let state = self.step(clock.now_ms(), queue, display);
            self.drain_log(platform);
            if let AppState::Terminating(terminal) = state {
                break terminal;
            }
        };
        self.terminate(terminal, display, platform);
        self.drain_log(platform);
        terminal
    }

    /// Main loop. Never returns; if the terminal platform call comes back the
    /// loop only idles.
    pub fn run<C, Q, D, P>(
        mut self,
        mut clock: C,
        mut queue: Q,
        mut display: D,
        mut platform: P,
    ) -> !
    where
        C: Clock,
        Q: InputQueue,
        D: DisplayTransfer,
        P: Platform,
    {
        self.run_until_terminated(&mut clock, &mut queue, &mut display, &mut platform);
        loop {
            platform.idle();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
