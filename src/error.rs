//! Error types for the Linux integration layer.

use std::io;
use std::path::PathBuf;

/// Failure to map a UIO device region.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// The device node could not be opened.
    #[error("failed to open `{}`", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// `mmap` rejected the device.
    #[error("failed to map {len:#x} bytes of `{}`", .path.display())]
    Map {
        path: PathBuf,
        len: usize,
        #[source]
        source: io::Error,
    },
    /// The mapping is too small for the layout placed on it.
    #[error("`{}` maps {len:#x} bytes, need at least {needed:#x}", .path.display())]
    TooSmall {
        path: PathBuf,
        len: usize,
        needed: usize,
    },
}

/// Error returned by the bridge's device-facing operations.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The register block or overlay could not be mapped.
    #[error("failed to map device")]
    Map(#[from] MapError),
    /// A slot worker thread could not be started.
    #[error("failed to spawn worker for slot {slot}")]
    Spawn {
        slot: u8,
        #[source]
        source: io::Error,
    },
    /// More workers than joystick slots were started.
    #[error("no free worker entry for slot {0}")]
    SlotTableFull(u8),
    /// A slot worker panicked.
    #[error("worker for slot {0} panicked")]
    WorkerPanicked(u8),
}
