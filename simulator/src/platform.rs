//! Desktop stand-in for boot mode, restart and deep sleep.
//!
//! Nothing actually restarts: the call is printed and recorded so the main
//! loop can stop and save the final frame.

use badge_common::{LogEntry, Platform};

/// Platform calls in the order they happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlatformCall {
    ClearBootMode,
    Restart,
    DeepSleep,
    Idle,
}

#[derive(Default)]
pub struct SimPlatform {
    calls: Vec<PlatformCall>,
    /// Print log entries to stdout.
    verbose: bool,
}

impl SimPlatform {
    pub fn new(verbose: bool) -> Self {
        Self {
            calls: Vec::new(),
            verbose,
        }
    }

    pub fn calls(&self) -> &[PlatformCall] { &self.calls }

    /// Restart or deep sleep was requested.
    pub fn halted(&self) -> bool {
        self.calls
            .iter()
            .any(|c| matches!(c, PlatformCall::Restart | PlatformCall::DeepSleep))
    }
}

impl Platform for SimPlatform {
    fn clear_boot_mode(&mut self) { self.calls.push(PlatformCall::ClearBootMode); }

    fn restart(&mut self) {
        println!("Restarting into launcher");
        self.calls.push(PlatformCall::Restart);
    }

    fn deep_sleep(&mut self) {
        println!("Entering deep sleep");
        self.calls.push(PlatformCall::DeepSleep);
    }

    fn idle(&mut self) { self.calls.push(PlatformCall::Idle); }

    fn log(
        &mut self,
        entry: &LogEntry,
    ) {
        if self.verbose {
            println!("{entry}");
        }
    }
}
