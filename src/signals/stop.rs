/*!
 * Stop Signal
 *
 * Turns a terminating signal into a cooperative stop request. The handler
 * only stores to a static atomic flag, which is async-signal-safe.
 */

use super::traits::Cancellation;
use crate::core::errors::ProbeError;
use crate::core::types::ProbeResult;
use nix::libc::c_int;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Process-wide stop request, shared by every installed [`StopSignal`]
static STOP_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn request_stop(_signal: c_int) {
    STOP_REQUESTED.store(true, Ordering::Release);
}

/// Installed handler for one signal; restores the previous action on drop
pub struct StopSignal {
    signal: Signal,
    previous: Option<SigAction>,
}

impl StopSignal {
    /// Clear the stop flag and route `signal` to it
    pub fn install(signal: Signal) -> ProbeResult<Self> {
        STOP_REQUESTED.store(false, Ordering::Release);

        let action = SigAction::new(
            SigHandler::Handler(request_stop),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        // SAFETY: the handler only performs an atomic store.
        let previous = unsafe { sigaction(signal, &action) }.map_err(ProbeError::Signal)?;

        debug!(signal = %signal, "stop handler installed");
        Ok(Self {
            signal,
            previous: Some(previous),
        })
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    /// Request a stop as if the signal had arrived
    pub fn trigger(&self) {
        STOP_REQUESTED.store(true, Ordering::Release);
    }
}

impl Cancellation for StopSignal {
    #[inline]
    fn is_cancelled(&self) -> bool {
        STOP_REQUESTED.load(Ordering::Acquire)
    }
}

impl Drop for StopSignal {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            // SAFETY: restoring an action previously returned by sigaction.
            if let Err(e) = unsafe { sigaction(self.signal, &previous) } {
                warn!(signal = %self.signal, error = %e, "could not restore signal action");
            }
        }
    }
}
