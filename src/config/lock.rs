// src/config/lock.rs

//! Advisory mutual exclusion over the configuration document.
//!
//! The lock record is `settings.locked` in the document: a pid, or `0` when
//! unlocked. A recorded holder whose process is no longer alive is stale and
//! may be reclaimed. This protects against a second local instance of the
//! daemon contending for the same document; it gives no guarantee against
//! external mutation.

use tracing::{debug, warn};

use crate::config::store::ConfigStore;
use crate::errors::LockError;

/// Zero-signal liveness probe, injectable so lock tests can fake liveness.
pub trait ProcessProbe: Send + Sync {
    fn is_alive(&self, pid: u32) -> bool;
}

/// Probe using `kill(pid, 0)`.
#[derive(Debug, Clone, Default)]
pub struct SignalProbe;

#[cfg(unix)]
impl ProcessProbe for SignalProbe {
    fn is_alive(&self, pid: u32) -> bool {
        use nix::errno::Errno;
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        match kill(Pid::from_raw(pid as i32), None) {
            Ok(()) => true,
            // EPERM means the process exists but belongs to someone else.
            Err(Errno::EPERM) => true,
            Err(_) => false,
        }
    }
}

#[cfg(not(unix))]
impl ProcessProbe for SignalProbe {
    fn is_alive(&self, _pid: u32) -> bool {
        // No cheap zero-signal probe here; refuse to steal the lock.
        true
    }
}

/// Acquire the lock for `holder` (a nonzero pid) and persist the record.
///
/// - Holder `0` (unlocked) or an identical holder: overwrite and persist.
/// - A different nonzero holder: probe liveness; fail if the process is still
///   alive, reclaim if it is stale.
/// - If persistence fails, the in-memory record is reverted.
pub fn acquire(
    store: &mut ConfigStore,
    probe: &dyn ProcessProbe,
    holder: u32,
) -> Result<(), LockError> {
    let current = store.lock_holder();
    if current != 0 && current != holder {
        if probe.is_alive(current) {
            return Err(LockError::HeldByLiveProcess { pid: current });
        }
        warn!(stale_pid = current, "reclaiming stale configuration lock");
    }
    persist_holder(store, holder)
}

/// Release the lock (set the record to `0`) and persist.
///
/// If persistence fails, the in-memory record is reverted and the failure
/// surfaced; the operator must force-unlock on the next start.
pub fn release(store: &mut ConfigStore) -> Result<(), LockError> {
    persist_holder(store, 0)
}

fn persist_holder(store: &mut ConfigStore, holder: u32) -> Result<(), LockError> {
    let previous = store.lock_holder();
    store.set_lock_holder(holder);
    if let Err(err) = store.save() {
        store.set_lock_holder(previous);
        return Err(LockError::Persist(err));
    }
    debug!(holder, previous, "lock record persisted");
    Ok(())
}
