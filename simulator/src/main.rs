//! Gear badge simulator for the desktop.
//!
//! Runs the same [`App`] as the firmware against a simulated panel.
//!
//! # Headless (default)
//!
//! ```bash
//! cargo run -p badge-simulator -- [OUT_DIR] [FRAME:INPUT ...]
//! ```
//!
//! Steps the app with a fixed 20 ms frame clock, injects the scripted presses
//! (default `300:JOY_PRESS`) and writes PNG snapshots of the panel into
//! `OUT_DIR` (default `snapshots`).
//!
//! # Window
//!
//! ```bash
//! cargo run -p badge-simulator --features window -- --window
//! ```
//!
//! Interactive SDL window; see [`input`] for the key bindings.

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]

mod display;
mod input;
mod platform;
mod timing;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::{env, fs};

use badge_common::{App, AppConfig, AppState, Assets, Clock};
use embedded_graphics_simulator::OutputSettingsBuilder;

use crate::display::SimDisplay;
use crate::input::{ScriptedInput, SimQueue, parse_script_entry};
use crate::platform::SimPlatform;
use crate::timing::FrameClock;

/// Output directory when none is given.
const DEFAULT_OUT_DIR: &str = "snapshots";

/// Script when none is given: sleep after ~6 s of animation.
const DEFAULT_SCRIPT: &str = "300:JOY_PRESS";

/// Frames between snapshots.
const SNAPSHOT_EVERY: u32 = 50;

/// Frames run after the last scripted input if the app keeps running.
const TAIL_FRAMES: u32 = 50;

fn main() -> ExitCode {
    let mut args = env::args().skip(1).peekable();
    #[cfg(feature = "window")]
    if args.peek().is_some_and(|a| a == "--window") {
        return run_window();
    }
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_OUT_DIR.to_owned()));
    let mut entries: Vec<String> = args.collect();
    if entries.is_empty() {
        entries.push(DEFAULT_SCRIPT.to_owned());
    }

    let mut script = Vec::with_capacity(entries.len());
    for entry in &entries {
        let Some(input) = parse_script_entry(entry) else {
            eprintln!("Invalid script entry '{entry}', expected FRAME:INPUT (e.g. 300:JOY_PRESS)");
            return ExitCode::FAILURE;
        };
        script.push(input);
    }

    match run_headless(&out_dir, &script) {
        Ok(snapshots) => {
            println!("Wrote {snapshots} snapshots to {}", out_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Simulation failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Step the app frame by frame, saving snapshots. Returns the snapshot count.
fn run_headless(
    out_dir: &Path,
    script: &[ScriptedInput],
) -> Result<u32, String> {
    fs::create_dir_all(out_dir).map_err(|e| format!("{}: {e}", out_dir.display()))?;

    let mut app = App::new(Assets::EMBEDDED, AppConfig::default());
    let mut clock = FrameClock::new();
    let mut queue = SimQueue::new();
    let mut display = SimDisplay::new();
    let mut platform = SimPlatform::new(true);

    let last_frame = script.iter().map(|s| s.frame).max().unwrap_or(0) + TAIL_FRAMES;
    let mut snapshots = 0;

    app.start();
    for frame in 0..=last_frame {
        for scripted in script.iter().filter(|s| s.frame == frame) {
            if !queue.push(scripted.event) {
                println!("Queue full, dropped {:?} at frame {frame}", scripted.event);
            }
        }

        let state = app.step(clock.now_ms(), &mut queue, &mut display);
        app.drain_log(&mut platform);

        if let AppState::Terminating(terminal) = state {
            app.terminate(terminal, &mut display, &mut platform);
            app.drain_log(&mut platform);
            save_snapshot(&display, &out_dir.join(format!("frame_{frame:05}_final.png")))?;
            snapshots += 1;
            break;
        }
        if frame % SNAPSHOT_EVERY == 0 {
            save_snapshot(&display, &out_dir.join(format!("frame_{frame:05}.png")))?;
            snapshots += 1;
        }
    }

    println!(
        "Transfers: {} full, {} partial; platform calls: {:?}",
        display.full_transfers(),
        display.partial_transfers(),
        platform.calls()
    );
    Ok(snapshots)
}

fn save_snapshot(
    display: &SimDisplay,
    path: &Path,
) -> Result<(), String> {
    let settings = OutputSettingsBuilder::new().scale(1).build();
    display
        .panel()
        .to_rgb_output_image(&settings)
        .save_png(path)
        .map_err(|e| format!("{}: {e}", path.display()))
}

/// Interactive loop at wall-clock speed until the window is closed.
#[cfg(feature = "window")]
fn run_window() -> ExitCode {
    use std::thread;
    use std::time::Instant;

    use badge_common::InputEvent;
    use embedded_graphics_simulator::{SimulatorEvent, Window};

    use crate::input::input_for_key;
    use crate::timing::{FRAME_TIME, WallClock};

    let mut app = App::new(Assets::EMBEDDED, AppConfig::default());
    let mut clock = WallClock::new();
    let mut queue = SimQueue::new();
    let mut display = SimDisplay::new();
    let mut platform = SimPlatform::new(true);

    let output_settings = OutputSettingsBuilder::new().scale(2).build();
    let mut window = Window::new("Gear badge", &output_settings);

    app.start();
    loop {
        let frame_start = Instant::now();

        if !platform.halted() {
            let state = app.step(clock.now_ms(), &mut queue, &mut display);
            app.drain_log(&mut platform);
            if let AppState::Terminating(terminal) = state {
                app.terminate(terminal, &mut display, &mut platform);
                app.drain_log(&mut platform);
            }
        }

        window.update(display.panel());

        for event in window.events() {
            match event {
                SimulatorEvent::Quit => {
                    println!(
                        "Transfers: {} full, {} partial; platform calls: {:?}",
                        display.full_transfers(),
                        display.partial_transfers(),
                        platform.calls()
                    );
                    return ExitCode::SUCCESS;
                }
                SimulatorEvent::KeyDown { keycode, repeat, .. } if !repeat => {
                    if let Some(input) = input_for_key(keycode) {
                        queue.push(InputEvent::pressed(input));
                    }
                }
                SimulatorEvent::KeyUp { keycode, .. } => {
                    if let Some(input) = input_for_key(keycode) {
                        queue.push(InputEvent::released(input));
                    }
                }
                _ => {}
            }
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_TIME {
            thread::sleep(FRAME_TIME - elapsed);
        }
    }
}
