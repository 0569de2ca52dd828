//! Typed settings consumed by the bridge.
//!
//! Values arrive as strings from the system configuration file; loading
//! that file is the caller's job; this module only maps individual values.

use crate::led::DEFAULT_LED_PATH;
use core::str::FromStr;
use log::warn;
use std::path::PathBuf;
use zest_core::ReadFailurePolicy;
use zest_proto::MAX_SLOTS;

/// Linux key code of `KEY_SYSRQ` (Print Screen).
pub const KEY_SYSRQ: u16 = 99;
/// Linux key code of `KEY_NUMLOCK`.
pub const KEY_NUMLOCK: u16 = 69;

pub const DEFAULT_JOYSTICK_PREFIX: &str = "/dev/input/js";
pub const DEFAULT_REGISTER_DEVICE: &str = "/dev/uio0";
pub const DEFAULT_OVERLAY_DEVICE: &str = "/dev/uio1";

/// Keyboard key that toggles joystick emulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmulationKey {
    PrintScreen,
    #[default]
    NumLock,
}

impl EmulationKey {
    #[must_use]
    pub const fn key_code(self) -> u16 {
        match self {
            Self::PrintScreen => KEY_SYSRQ,
            Self::NumLock => KEY_NUMLOCK,
        }
    }

    /// Map a configured name, falling back to `PrintScreen` for unknown names.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|()| {
            warn!("unknown joystick emulation key {name:?}, using PRINT_SCREEN");
            Self::PrintScreen
        })
    }
}

impl FromStr for EmulationKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("PRINT_SCREEN") {
            Ok(Self::PrintScreen)
        } else if s.eq_ignore_ascii_case("NUM_LOCK") {
            Ok(Self::NumLock)
        } else {
            Err(())
        }
    }
}

/// Map a boolean setting. Unrecognised values read as `false`.
#[must_use]
pub fn parse_flag(value: &str) -> bool {
    const TRUE: [&str; 4] = ["true", "yes", "on", "1"];
    const FALSE: [&str; 4] = ["false", "no", "off", "0"];

    let value = value.trim();
    if TRUE.iter().any(|t| value.eq_ignore_ascii_case(t)) {
        true
    } else {
        if !FALSE.iter().any(|f| value.eq_ignore_ascii_case(f)) {
            warn!("invalid boolean {value:?}, using false");
        }
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoystickSettings {
    pub emulation_key: EmulationKey,
    /// Whether USB joysticks drive the joystick ports at all.
    pub usb_support: bool,
    pub failure_policy: ReadFailurePolicy,
    /// Upper bound on assigned slots, capped at [`MAX_SLOTS`].
    pub max_slots: usize,
}

impl JoystickSettings {
    /// Number of slots the supervisor may assign.
    #[must_use]
    pub fn slot_limit(&self) -> usize {
        if self.usb_support {
            self.max_slots.min(MAX_SLOTS)
        } else {
            0
        }
    }
}

impl Default for JoystickSettings {
    fn default() -> Self {
        Self {
            emulation_key: EmulationKey::default(),
            usb_support: false,
            failure_policy: ReadFailurePolicy::default(),
            max_slots: MAX_SLOTS,
        }
    }
}

/// Device and sysfs nodes used by the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePaths {
    /// Joystick nodes are `{joystick_prefix}{N}`.
    pub joystick_prefix: String,
    pub led: PathBuf,
    pub registers: PathBuf,
    pub overlay: PathBuf,
}

impl Default for DevicePaths {
    fn default() -> Self {
        Self {
            joystick_prefix: DEFAULT_JOYSTICK_PREFIX.into(),
            led: DEFAULT_LED_PATH.into(),
            registers: DEFAULT_REGISTER_DEVICE.into(),
            overlay: DEFAULT_OVERLAY_DEVICE.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub joystick: JoystickSettings,
    pub paths: DevicePaths,
}

impl Settings {
    /// Apply the `joystick_emulation` and `joystick_usb_support` values.
    #[must_use]
    pub fn with_joystick_values(
        mut self,
        emulation: Option<&str>,
        usb_support: Option<&str>,
    ) -> Self {
        if let Some(name) = emulation {
            self.joystick.emulation_key = EmulationKey::from_name(name);
        }
        if let Some(flag) = usb_support {
            self.joystick.usb_support = parse_flag(flag);
        }
        self
    }
}
