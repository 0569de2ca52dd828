//! JoystickSupervisor: assigns joystick slots and runs one worker thread per
//! slot.
//!
//! Slots are assigned once, at start, by probing `{prefix}0`, `{prefix}1`,
//! ... until the first missing node. Controllers plugged in later are not
//! picked up. Each worker forwards its device's events into the shared
//! register file through a [`SlotBridge`] until shutdown or disconnect.

use crate::config::Settings;
use crate::error::BridgeError;
use crate::input::{joystick_path, JoystickDevice};
use crate::led::StatusLed;
use crate::shutdown::ShutdownSignal;
use heapless::Vec;
use log::{debug, info, warn};
use portable_atomic::{AtomicBool, Ordering};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use zest_core::{assign_slots, JoystickSlot, RegisterSink, SlotBridge, SlotExit};
use zest_proto::MAX_SLOTS;

/// Snapshot of one assigned slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInfo {
    pub id: u8,
    pub path: PathBuf,
    /// Whether the worker still holds an open device.
    pub connected: bool,
}

struct Worker {
    id: u8,
    path: PathBuf,
    connected: Arc<AtomicBool>,
    handle: JoinHandle<SlotExit>,
}

/// Owner of the per-slot worker threads.
///
/// Dropping the supervisor requests shutdown but does not wait; use
/// [`join`](Self::join) to collect the workers.
pub struct JoystickSupervisor {
    shutdown: Arc<ShutdownSignal>,
    workers: Vec<Worker, MAX_SLOTS>,
}

impl JoystickSupervisor {
    /// Assign slots for the joysticks present now and start their workers.
    ///
    /// A device that fails to open leaves its slot unconnected; the worker
    /// still runs and idles until shutdown. The status LED is switched on
    /// by every worker regardless of the device state.
    pub fn start<R>(settings: &Settings, registers: Arc<R>) -> Result<Self, BridgeError>
    where
        R: RegisterSink + Send + Sync + 'static,
    {
        let prefix = settings.paths.joystick_prefix.as_str();
        let limit = settings.joystick.slot_limit();
        if !settings.joystick.usb_support {
            info!("USB joystick support disabled");
        }

        let ids = assign_slots(limit, |id| joystick_path(prefix, id).exists());
        info!("{} joystick slot(s) assigned", ids.len());

        let mut supervisor = Self {
            shutdown: Arc::new(ShutdownSignal::new()),
            workers: Vec::new(),
        };
        let led = StatusLed::new(settings.paths.led.clone());

        for id in ids {
            let path = joystick_path(prefix, id);
            let worker = spawn_worker(
                id,
                path,
                Arc::clone(&registers),
                Arc::clone(&supervisor.shutdown),
                led.clone(),
                settings,
            );
            if let Err(e) = worker.and_then(|w| supervisor.adopt(w)) {
                supervisor.request_shutdown();
                return Err(e);
            }
        }
        Ok(supervisor)
    }

    // A worker that does not fit is stopped and joined, never detached.
    fn adopt(&mut self, worker: Worker) -> Result<(), BridgeError> {
        self.workers.push(worker).map_err(|rejected| {
            warn!("slot {}: worker table full", rejected.id);
            self.shutdown.request();
            let _ = rejected.handle.join();
            BridgeError::SlotTableFull(rejected.id)
        })
    }

    /// Assigned slots and their current connection state.
    pub fn slots(&self) -> std::vec::Vec<SlotInfo> {
        self.workers
            .iter()
            .map(|w| SlotInfo {
                id: w.id,
                path: w.path.clone(),
                connected: w.connected.load(Ordering::Acquire),
            })
            .collect()
    }

    /// Get the signal shared with the workers.
    pub fn shutdown_signal(&self) -> &Arc<ShutdownSignal> {
        &self.shutdown
    }

    /// Ask every worker to stop.
    ///
    /// Idle workers stop at once. A worker blocked reading its device stops
    /// after its next event.
    pub fn request_shutdown(&self) {
        debug!("joystick shutdown requested");
        self.shutdown.request();
    }

    /// Wait for every worker and report why each one stopped.
    ///
    /// This does not request shutdown itself.
    pub fn join(mut self) -> std::vec::Vec<(u8, Result<SlotExit, BridgeError>)> {
        let workers = core::mem::take(&mut self.workers);
        workers
            .into_iter()
            .map(|w| {
                let exit = w.handle.join().map_err(|_| {
                    warn!("joystick worker {} panicked", w.id);
                    BridgeError::WorkerPanicked(w.id)
                });
                (w.id, exit)
            })
            .collect()
    }
}

impl Drop for JoystickSupervisor {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            self.shutdown.request();
        }
    }
}

fn spawn_worker<R>(
    id: u8,
    path: PathBuf,
    registers: Arc<R>,
    shutdown: Arc<ShutdownSignal>,
    led: StatusLed,
    settings: &Settings,
) -> Result<Worker, BridgeError>
where
    R: RegisterSink + Send + Sync + 'static,
{
    let source = match JoystickDevice::open(&path) {
        Ok(device) => {
            info!("slot {id}: opened {}", path.display());
            Some(device)
        }
        Err(e) => {
            warn!("slot {id}: cannot open {}: {e}", path.display());
            None
        }
    };
    let connected = Arc::new(AtomicBool::new(source.is_some()));
    let policy = settings.joystick.failure_policy;

    let handle = thread::Builder::new()
        .name(format!("joystick{id}"))
        .spawn({
            let connected = Arc::clone(&connected);
            move || {
                led.set(true);
                let mut bridge = SlotBridge::new(JoystickSlot::new(id), source, registers, policy);
                let exit = bridge.run(&*shutdown);
                connected.store(false, Ordering::Release);
                debug!("slot {id}: worker stopped ({exit:?})");
                exit
            }
        })
        .map_err(|source| BridgeError::Spawn { slot: id, source })?;

    Ok(Worker {
        id,
        path,
        connected,
        handle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::net::UnixListener;
    use std::path::Path;
    use std::time::Duration;
    use zest_core::{InputError, RegisterFile, Shutdown};
    use zest_proto::JsEvent;

    fn settings(dir: &Path) -> Settings {
        let mut s = Settings::default();
        s.joystick.usb_support = true;
        s.paths.joystick_prefix = format!("{}/js", dir.display());
        s.paths.led = dir.join("brightness");
        std::fs::write(&s.paths.led, "0").unwrap();
        s
    }

    fn write_events(path: &Path, events: &[JsEvent]) {
        let bytes: std::vec::Vec<u8> = events.iter().flat_map(JsEvent::to_bytes).collect();
        std::fs::write(path, bytes).unwrap();
    }

    fn idle_worker(id: u8, shutdown: &Arc<ShutdownSignal>) -> Worker {
        let shutdown = Arc::clone(shutdown);
        Worker {
            id,
            path: PathBuf::from(format!("js{id}")),
            connected: Arc::new(AtomicBool::new(false)),
            handle: thread::spawn(move || {
                while !shutdown.wait_timeout(Duration::from_millis(10)) {}
                SlotExit::Shutdown
            }),
        }
    }

    #[test]
    fn test_full_worker_table_stops_extra_worker() {
        let mut supervisor = JoystickSupervisor {
            shutdown: Arc::new(ShutdownSignal::new()),
            workers: Vec::new(),
        };
        for id in 0..MAX_SLOTS as u8 {
            let worker = idle_worker(id, &supervisor.shutdown);
            supervisor.adopt(worker).unwrap();
        }
        let extra = idle_worker(MAX_SLOTS as u8, &supervisor.shutdown);
        let err = supervisor.adopt(extra).unwrap_err();
        assert!(matches!(err, BridgeError::SlotTableFull(6)));
        assert!(supervisor.shutdown_signal().is_requested());

        let exits = supervisor.join();
        assert_eq!(exits.len(), MAX_SLOTS);
        assert!(exits.iter().all(|(_, e)| matches!(e, Ok(SlotExit::Shutdown))));
    }

    #[test]
    fn test_workers_forward_events_until_eof() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(dir.path());
        write_events(&dir.path().join("js0"), &[JsEvent::axis(0, -100)]);
        write_events(&dir.path().join("js1"), &[JsEvent::button(2, true)]);

        let registers = Arc::new(RegisterFile::in_memory(16));
        registers.write_bits(127, 1, 1).unwrap();

        let supervisor = JoystickSupervisor::start(&s, Arc::clone(&registers)).unwrap();
        assert_eq!(supervisor.slots().len(), 2);
        let exits = supervisor.join();

        assert_eq!(exits.len(), 2);
        for (_, exit) in &exits {
            assert!(matches!(exit, Ok(SlotExit::Disconnected)));
        }
        assert_eq!(registers.read_bits(120, 2), Ok(0b10));
        assert_eq!(registers.read_bits(127, 1), Ok(0));
        assert_eq!(std::fs::read_to_string(&s.paths.led).unwrap(), "1");
    }

    #[test]
    fn test_probe_stops_at_first_gap() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(dir.path());
        write_events(&dir.path().join("js0"), &[]);
        write_events(&dir.path().join("js2"), &[]);

        let supervisor =
            JoystickSupervisor::start(&s, Arc::new(RegisterFile::in_memory(16))).unwrap();
        let slots = supervisor.slots();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].id, 0);
        assert_eq!(slots[0].path, dir.path().join("js0"));
        let exits = supervisor.join();
        assert!(matches!(exits[0], (0, Ok(SlotExit::Disconnected))));
    }

    #[test]
    fn test_usb_support_disabled_assigns_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = settings(dir.path());
        s.joystick.usb_support = false;
        write_events(&dir.path().join("js0"), &[JsEvent::button(0, true)]);

        let supervisor =
            JoystickSupervisor::start(&s, Arc::new(RegisterFile::in_memory(16))).unwrap();
        assert!(supervisor.slots().is_empty());
        assert!(supervisor.join().is_empty());
        assert_eq!(std::fs::read_to_string(&s.paths.led).unwrap(), "0");
    }

    #[test]
    fn test_unopenable_device_idles_until_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(dir.path());
        // A socket node exists but cannot be opened as a file.
        let _listener = UnixListener::bind(dir.path().join("js0")).unwrap();

        let supervisor =
            JoystickSupervisor::start(&s, Arc::new(RegisterFile::in_memory(16))).unwrap();
        let slots = supervisor.slots();
        assert_eq!(slots.len(), 1);
        assert!(!slots[0].connected);

        thread::sleep(Duration::from_millis(50));
        supervisor.request_shutdown();
        let exits = supervisor.join();
        assert!(matches!(exits[0], (0, Ok(SlotExit::Shutdown))));
        assert_eq!(std::fs::read_to_string(&s.paths.led).unwrap(), "1");
    }

    #[test]
    fn test_persistent_read_errors_close_slot() {
        let dir = tempfile::tempdir().unwrap();
        let s = settings(dir.path());
        // Opening a directory succeeds; every read fails with EISDIR.
        std::fs::create_dir(dir.path().join("js0")).unwrap();

        let supervisor =
            JoystickSupervisor::start(&s, Arc::new(RegisterFile::in_memory(16))).unwrap();
        let exits = supervisor.join();
        assert!(matches!(
            exits[0],
            (0, Ok(SlotExit::ReadFailures(InputError::Io)))
        ));
    }
}
