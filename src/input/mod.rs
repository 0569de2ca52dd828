//! Joystick device input.

pub mod joystick;

pub use joystick::{joystick_path, JoystickDevice};
