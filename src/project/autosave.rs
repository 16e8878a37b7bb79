use log::{debug, error};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::project::state::ProjectState;
use crate::project::store::ProjectStore;

/// Shutdown signal shared with the background loop
struct StopSignal {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

/// Background checkpoint scheduler.
///
/// Two states: idle (not started) and running. `start` spawns the loop;
/// `stop` signals it, wakes the interruptible wait and joins the thread.
/// Dropping a running scheduler stops it, so shutdown does not depend on
/// callers remembering to do it, but explicit `stop()` is the contract.
///
/// Each tick takes and clears the dirty flag before writing; a write failure
/// is logged and the loop continues. Autosave never terminates the process.
pub struct AutosaveScheduler {
    signal: Arc<StopSignal>,
    thread: Option<JoinHandle<()>>,
}

impl AutosaveScheduler {
    /// Spawn the background loop
    pub fn start(state: Arc<ProjectState>, store: ProjectStore, interval: Duration) -> Self {
        let signal = Arc::new(StopSignal {
            stopped: Mutex::new(false),
            condvar: Condvar::new(),
        });

        let loop_signal = Arc::clone(&signal);
        let thread = thread::Builder::new()
            .name("autosave".to_string())
            .spawn(move || Self::run(state, store, loop_signal, interval))
            .expect("Failed to spawn autosave thread");

        Self {
            signal,
            thread: Some(thread),
        }
    }

    /// Whether the background loop is active
    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Signal the loop to stop and wait for it to observe the signal.
    /// Idempotent.
    pub fn stop(&mut self) {
        let Some(handle) = self.thread.take() else {
            return;
        };

        *self.signal.stopped.lock() = true;
        self.signal.condvar.notify_one();

        if handle.join().is_err() {
            error!("Autosave thread panicked");
        }
    }

    fn run(state: Arc<ProjectState>, store: ProjectStore, signal: Arc<StopSignal>, interval: Duration) {
        debug!("Autosave loop started, interval {}s", interval.as_secs());

        let mut stopped = signal.stopped.lock();
        while !*stopped {
            // The stop lock is released during the tick so stop() is never
            // blocked behind a checkpoint write
            MutexGuard::unlocked(&mut stopped, || {
                if state.take_dirty() {
                    if let Err(e) = store.write(&state, None) {
                        error!("Autosave failed: {}", e);
                    }
                }
            });

            signal.condvar.wait_for(&mut stopped, interval);
        }

        debug!("Autosave loop stopped");
    }
}

impl Drop for AutosaveScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
