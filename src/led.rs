//! Activity LED driven through its sysfs brightness file.

use log::debug;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default brightness control file.
pub const DEFAULT_LED_PATH: &str = "/sys/class/leds/led0/brightness";

/// Best-effort LED switch. Failures are logged and never returned.
#[derive(Debug, Clone)]
pub struct StatusLed {
    path: PathBuf,
}

impl StatusLed {
    /// LED controlled through the brightness file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the brightness file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `'1'` (on) or `'0'` (off). Returns whether the write landed.
    pub fn set(&self, on: bool) -> bool {
        let value = if on { b"1" } else { b"0" };
        let result = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(value));
        match result {
            Ok(()) => true,
            Err(e) => {
                debug!("led {}: {e}", self.path.display());
                false
            }
        }
    }
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new(DEFAULT_LED_PATH)
    }
}
