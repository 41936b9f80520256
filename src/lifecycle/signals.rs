//! Signal and deadline wiring.
//!
//! Ctrl-C and an optional wall-clock deadline both map to the run-level
//! abort. The engine then stops dispatching and returns what it has.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::lifecycle::abort::AbortSignal;

/// Trigger `abort` on Ctrl-C.
pub fn abort_on_ctrl_c(abort: AbortSignal) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, aborting run");
                abort.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    })
}

/// Trigger `abort` once `deadline` has passed.
pub fn abort_after(abort: AbortSignal, deadline: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(deadline) => {
                tracing::warn!(deadline_secs = deadline.as_secs_f64(), "Deadline reached, aborting run");
                abort.trigger();
            }
            _ = abort.triggered() => {}
        }
    })
}
