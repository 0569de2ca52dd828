//! SlotBridge: drives one joystick slot from its event source into the
//! register file.

use crate::input::{EventSource, InputError};
use crate::output::{RegisterError, RegisterSink};
use crate::slot::{JoystickSlot, RegisterWrite};
use core::fmt;
use core::time::Duration;
use log::{error, info, warn};

/// How long an unconnected slot sleeps between shutdown checks.
pub const IDLE_WAIT: Duration = Duration::from_millis(250);

/// Process-wide stop request observed by every slot worker.
pub trait Shutdown {
    /// Whether a stop has been requested.
    fn is_requested(&self) -> bool;

    /// Block until a stop is requested or `timeout` elapses.
    ///
    /// Returns `true` if a stop has been requested.
    fn wait_timeout(&self, timeout: Duration) -> bool;
}

impl<T: Shutdown + ?Sized> Shutdown for &T {
    fn is_requested(&self) -> bool {
        (**self).is_requested()
    }

    fn wait_timeout(&self, timeout: Duration) -> bool {
        (**self).wait_timeout(timeout)
    }
}

/// When a slot gives up on its device after read errors.
///
/// A [`InputError::Disconnected`] error always closes the slot. Any other
/// error counts towards `max_consecutive_failures`; a successful read resets
/// the count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadFailurePolicy {
    pub max_consecutive_failures: u32,
}

impl ReadFailurePolicy {
    /// Close on the first error of any kind.
    pub const STRICT: Self = Self {
        max_consecutive_failures: 1,
    };

    #[must_use]
    pub const fn new(max_consecutive_failures: u32) -> Self {
        Self {
            max_consecutive_failures,
        }
    }

    /// Decide whether `error`, as the `consecutive`-th failure in a row,
    /// closes the slot.
    #[must_use]
    pub const fn should_close(&self, error: InputError, consecutive: u32) -> bool {
        error.is_disconnect() || consecutive >= self.max_consecutive_failures
    }
}

impl Default for ReadFailurePolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Why a slot worker stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotExit {
    /// The shutdown signal was observed.
    Shutdown,
    /// The device went away.
    Disconnected,
    /// Too many consecutive read errors; carries the last one.
    ReadFailures(InputError),
    /// The register file rejected a write.
    Register(RegisterError),
}

/// Error type for a single bridge step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError {
    /// The slot has no open device.
    NotConnected,
    /// Error from the event source.
    Input(InputError),
    /// Error from the register sink.
    Register(RegisterError),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => f.write_str("slot has no device"),
            Self::Input(e) => write!(f, "input: {e}"),
            Self::Register(e) => write!(f, "register: {e}"),
        }
    }
}

/// Forwards events from one slot's device into the shared register file.
///
/// # Error Handling
///
/// Read errors are counted against the [`ReadFailurePolicy`]. When the
/// policy closes the slot the device handle is dropped and [`run`] returns;
/// the slot's register fields keep their last value.
///
/// [`run`]: SlotBridge::run
pub struct SlotBridge<I, R> {
    slot: JoystickSlot,
    source: Option<I>,
    registers: R,
    policy: ReadFailurePolicy,
    failures: u32,
}

impl<I: EventSource, R: RegisterSink> SlotBridge<I, R> {
    /// Create a bridge. `source` is `None` when the device failed to open.
    pub fn new(
        slot: JoystickSlot,
        source: Option<I>,
        registers: R,
        policy: ReadFailurePolicy,
    ) -> Self {
        Self {
            slot,
            source,
            registers,
            policy,
            failures: 0,
        }
    }

    /// Whether an open device is attached.
    pub fn is_connected(&self) -> bool {
        self.source.as_ref().is_some_and(|s| s.is_connected())
    }

    /// Read one event and commit the write it implies.
    pub fn process_one(&mut self) -> Result<Option<RegisterWrite>, BridgeError> {
        let source = self.source.as_mut().ok_or(BridgeError::NotConnected)?;
        match source.next_event() {
            Ok(event) => {
                self.failures = 0;
                self.slot
                    .apply(&event, &self.registers)
                    .map_err(BridgeError::Register)
            }
            Err(e) => {
                self.failures = self.failures.saturating_add(1);
                Err(BridgeError::Input(e))
            }
        }
    }

    /// Run until shutdown is requested or the device is lost.
    ///
    /// Shutdown is checked before every read. A read already blocked in the
    /// device is not interrupted, so stopping a connected slot waits for its
    /// next event. Unconnected slots sleep on the shutdown signal.
    pub fn run<S: Shutdown + ?Sized>(&mut self, shutdown: &S) -> SlotExit {
        let id = self.slot.id();
        while !shutdown.is_requested() {
            if !self.is_connected() {
                shutdown.wait_timeout(IDLE_WAIT);
                continue;
            }

            match self.process_one() {
                Ok(_) | Err(BridgeError::NotConnected) => {}
                Err(BridgeError::Input(e)) => {
                    warn!("slot {id}: read failed ({e}), {} in a row", self.failures);
                    if self.policy.should_close(e, self.failures) {
                        self.disconnect();
                        return if e.is_disconnect() {
                            info!("slot {id}: joystick unplugged");
                            SlotExit::Disconnected
                        } else {
                            SlotExit::ReadFailures(e)
                        };
                    }
                }
                Err(BridgeError::Register(e)) => {
                    error!("slot {id}: {e}");
                    self.disconnect();
                    return SlotExit::Register(e);
                }
            }
        }
        self.disconnect();
        SlotExit::Shutdown
    }

    /// Drop the device handle.
    pub fn disconnect(&mut self) {
        self.source = None;
        self.failures = 0;
    }

    /// Consecutive read failures since the last successful read.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Get a reference to the slot state.
    pub fn slot(&self) -> &JoystickSlot {
        &self.slot
    }

    /// Get a reference to the register sink.
    pub fn registers(&self) -> &R {
        &self.registers
    }

    /// Decompose the bridge into its slot, source and register sink.
    pub fn into_parts(self) -> (JoystickSlot, Option<I>, R) {
        (self.slot, self.source, self.registers)
    }
}
