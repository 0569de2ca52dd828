//! Linux bridge between USB joysticks, the zeST joystick register block and
//! the on-screen display.
//!
//! This crate wires the platform-agnostic logic in [`zest_core`] to the
//! Linux devices it drives:
//!
//! - [`uio`]: Memory mapping of `/dev/uioN` regions
//! - [`output`]: The mapped register file and overlay controller
//! - [`input`]: `/dev/input/jsN` event readers
//! - [`supervisor`]: Slot assignment and one worker thread per slot
//! - [`shutdown`]: Condvar-backed stop signal for the workers
//! - [`led`]: Best-effort activity LED
//! - [`config`]: Typed settings and value parsing
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use zest_bridge::{map_registers, JoystickSupervisor, Settings};
//!
//! let settings = Settings::default();
//! let registers = Arc::new(map_registers(&settings.paths.registers)?);
//! let supervisor = JoystickSupervisor::start(&settings, registers)?;
//! // ... run until the process is asked to exit ...
//! supervisor.request_shutdown();
//! for (slot, exit) in supervisor.join() {
//!     log::info!("slot {slot}: {exit:?}");
//! }
//! # Ok::<(), zest_bridge::BridgeError>(())
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod led;
pub mod output;
pub mod shutdown;
pub mod supervisor;
pub mod uio;

pub use config::{parse_flag, DevicePaths, EmulationKey, JoystickSettings, Settings};
pub use error::{BridgeError, MapError};
pub use input::{joystick_path, JoystickDevice};
pub use led::StatusLed;
pub use output::{map_registers, open_overlay, MappedRegisters, Overlay};
pub use shutdown::ShutdownSignal;
pub use supervisor::{JoystickSupervisor, SlotInfo};
pub use uio::UioMapping;
