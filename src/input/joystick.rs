//! `/dev/input/jsN` reader.
//!
//! Reads the kernel's fixed-size joystick records one at a time with a
//! blocking `read`, so a worker sleeps in the kernel until the next event.

use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};
use zest_core::{EventSource, InputError};
use zest_proto::{JsEvent, JS_EVENT_SIZE};

/// `ENODEV`: returned by reads on a joystick node whose device was unplugged.
const ENODEV: i32 = 19;

/// Device node for slot `id` under `prefix` (e.g. `/dev/input/js` + `0`).
#[must_use]
pub fn joystick_path(prefix: &str, id: u8) -> PathBuf {
    PathBuf::from(format!("{prefix}{id}"))
}

/// Joystick event source over any byte stream (normally the device file).
pub struct JoystickDevice<R = File> {
    reader: R,
    path: PathBuf,
}

impl JoystickDevice<File> {
    /// Open the joystick node read-only.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let reader = File::open(&path)?;
        Ok(Self { reader, path })
    }
}

impl<R: Read> JoystickDevice<R> {
    /// Wrap an already open reader.
    pub fn from_reader(reader: R, path: impl Into<PathBuf>) -> Self {
        Self {
            reader,
            path: path.into(),
        }
    }

    /// Get the device path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<R: Read> EventSource for JoystickDevice<R> {
    fn next_event(&mut self) -> Result<JsEvent, InputError> {
        let mut record = [0u8; JS_EVENT_SIZE];
        let mut filled = 0;
        while filled < JS_EVENT_SIZE {
            match self.reader.read(&mut record[filled..]) {
                Ok(0) if filled == 0 => return Err(InputError::Disconnected),
                Ok(0) => return Err(InputError::ShortRead),
                Ok(n) => filled += n,
                Err(e) => return Err(classify(&e)),
            }
        }
        Ok(JsEvent::from_bytes(&record))
    }

    fn is_connected(&self) -> bool {
        true
    }
}

fn classify(err: &io::Error) -> InputError {
    if err.raw_os_error() == Some(ENODEV) {
        return InputError::Disconnected;
    }
    match err.kind() {
        ErrorKind::Interrupted => InputError::Interrupted,
        ErrorKind::UnexpectedEof | ErrorKind::NotFound => InputError::Disconnected,
        _ => InputError::Io,
    }
}
