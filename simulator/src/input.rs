//! Simulated co-processor input queue.
//!
//! Headless runs preload a script of events keyed by frame number; the
//! window maps keys to inputs:
//!
//! | Key        | Input            |
//! |------------|------------------|
//! | H          | HOME             |
//! | Backspace  | BACK             |
//! | M          | MENU             |
//! | Arrows     | Joystick         |
//! | Space      | Joystick press   |
//! | Enter      | ACCEPT           |

use badge_common::config::INPUT_QUEUE_CAPACITY;
use badge_common::{InputEvent, InputId, InputQueue};
#[cfg(feature = "window")]
use embedded_graphics_simulator::sdl2::Keycode;
use heapless::Deque;

/// FIFO of pending events, same bounded queue type as the firmware.
pub struct SimQueue {
    events: Deque<InputEvent, INPUT_QUEUE_CAPACITY>,
}

impl SimQueue {
    pub const fn new() -> Self { Self { events: Deque::new() } }

    /// Queue an event; returns `false` when full, matching the firmware
    /// dropping the newest event.
    pub fn push(
        &mut self,
        event: InputEvent,
    ) -> bool {
        self.events.push_back(event).is_ok()
    }
}

impl InputQueue for SimQueue {
    fn try_receive(&mut self) -> Option<InputEvent> { self.events.pop_front() }
}

/// Event injected at a given frame of a headless run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptedInput {
    pub frame: u32,
    pub event: InputEvent,
}

/// Parse `frame:NAME` (e.g. `300:JOY_PRESS`) into a scripted press.
pub fn parse_script_entry(entry: &str) -> Option<ScriptedInput> {
    let (frame, name) = entry.split_once(':')?;
    let frame = frame.trim().parse().ok()?;
    let input = InputId::ALL.into_iter().find(|id| id.name().eq_ignore_ascii_case(name.trim()))?;
    Some(ScriptedInput {
        frame,
        event: InputEvent::pressed(input),
    })
}

/// Input for a keyboard key, `None` for unmapped keys.
#[cfg(feature = "window")]
pub fn input_for_key(key: Keycode) -> Option<InputId> {
    match key {
        Keycode::H => Some(InputId::Home),
        Keycode::Backspace => Some(InputId::Back),
        Keycode::M => Some(InputId::Menu),
        Keycode::Return => Some(InputId::Accept),
        Keycode::Space => Some(InputId::JoystickPress),
        Keycode::Left => Some(InputId::JoystickLeft),
        Keycode::Right => Some(InputId::JoystickRight),
        Keycode::Up => Some(InputId::JoystickUp),
        Keycode::Down => Some(InputId::JoystickDown),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_is_fifo_and_bounded() {
        let mut queue = SimQueue::new();
        for _ in 0..INPUT_QUEUE_CAPACITY {
            assert!(queue.push(InputEvent::pressed(InputId::Menu)));
        }
        assert!(!queue.push(InputEvent::pressed(InputId::Home)));
        assert_eq!(queue.try_receive(), Some(InputEvent::pressed(InputId::Menu)));
        assert_eq!(std::iter::from_fn(|| queue.try_receive()).count(), INPUT_QUEUE_CAPACITY - 1);
    }

    #[test]
    fn test_queue_accepts_again_after_receive() {
        let mut queue = SimQueue::new();
        while queue.push(InputEvent::pressed(InputId::Menu)) {}
        queue.try_receive();
        assert!(queue.push(InputEvent::pressed(InputId::Back)));
        assert!(!queue.push(InputEvent::pressed(InputId::Back)));
    }

    #[test]
    fn test_parse_script_entry() {
        let entry = parse_script_entry("300:joy_press").unwrap();
        assert_eq!(entry.frame, 300);
        assert_eq!(entry.event, InputEvent::pressed(InputId::JoystickPress));
        assert_eq!(parse_script_entry("12:HOME").unwrap().event.input, InputId::Home);
        assert!(parse_script_entry("abc:HOME").is_none());
        assert!(parse_script_entry("5:NOPE").is_none());
        assert!(parse_script_entry("HOME").is_none());
    }
}
