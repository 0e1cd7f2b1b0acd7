//! Co-processor input events and the actions they trigger.
//!
//! The RP2040 co-processor reports buttons, joystick and a few status lines
//! as bits in two input registers. Each change becomes an [`InputEvent`] in
//! a queue that the main loop reads without blocking.

use core::fmt;

/// Inputs reported by the co-processor, numbered by register bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum InputId {
    Home = 0,
    Menu = 1,
    Start = 2,
    Accept = 3,
    Back = 4,
    FpgaCdone = 5,
    BatteryCharging = 6,
    Select = 7,
    JoystickLeft = 8,
    JoystickPress = 9,
    JoystickDown = 10,
    JoystickUp = 11,
    JoystickRight = 12,
}

impl InputId {
    /// All inputs in bit order.
    pub const ALL: [Self; 13] = [
        Self::Home,
        Self::Menu,
        Self::Start,
        Self::Accept,
        Self::Back,
        Self::FpgaCdone,
        Self::BatteryCharging,
        Self::Select,
        Self::JoystickLeft,
        Self::JoystickPress,
        Self::JoystickDown,
        Self::JoystickUp,
        Self::JoystickRight,
    ];

    /// Bit position in the combined 16-bit input word.
    #[inline]
    pub const fn bit(self) -> u8 { self as u8 }

    /// Input for a bit position, `None` for unused bits.
    pub const fn from_bit(bit: u8) -> Option<Self> {
        if (bit as usize) < Self::ALL.len() { Some(Self::ALL[bit as usize]) } else { None }
    }

    /// Short name for log lines.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Home => "HOME",
            Self::Menu => "MENU",
            Self::Start => "START",
            Self::Accept => "ACCEPT",
            Self::Back => "BACK",
            Self::FpgaCdone => "FPGA_CDONE",
            Self::BatteryCharging => "BATTERY_CHARGING",
            Self::Select => "SELECT",
            Self::JoystickLeft => "JOY_LEFT",
            Self::JoystickPress => "JOY_PRESS",
            Self::JoystickDown => "JOY_DOWN",
            Self::JoystickUp => "JOY_UP",
            Self::JoystickRight => "JOY_RIGHT",
        }
    }
}

impl fmt::Display for InputId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A press or release of one input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputEvent {
    pub input: InputId,
    pub pressed: bool,
}

impl InputEvent {
    pub const fn pressed(input: InputId) -> Self { Self { input, pressed: true } }

    pub const fn released(input: InputId) -> Self { Self { input, pressed: false } }
}

/// Non-blocking source of input events.
pub trait InputQueue {
    /// Next queued event, `None` when the queue is empty.
    fn try_receive(&mut self) -> Option<InputEvent>;
}

impl<T: InputQueue + ?Sized> InputQueue for &mut T {
    fn try_receive(&mut self) -> Option<InputEvent> { (**self).try_receive() }
}

/// What the application does in response to an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputAction {
    /// Return to the launcher.
    Restart,
    /// Show the static frame and power down.
    Sleep,
}

impl InputAction {
    /// Map an event to an action. Releases and unbound inputs map to `None`.
    pub const fn from_event(event: InputEvent) -> Option<Self> {
        if !event.pressed {
            return None;
        }
        match event.input {
            InputId::Home | InputId::Back => Some(Self::Restart),
            InputId::JoystickPress => Some(Self::Sleep),
            _ => None,
        }
    }
}
