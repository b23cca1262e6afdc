//! OS signal handling.
//!
//! # Responsibilities
//! - Translate Ctrl+C into cancellation of in-flight executions
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Cancellation stops new attempts; the attempt already running finishes

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancel `token` when Ctrl+C is received.
///
/// The watcher exits quietly if the token is cancelled some other way first.
pub fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => tracing::info!("Interrupt received, cancelling"),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                        return;
                    }
                }
                token.cancel();
            }
            () = token.cancelled() => {}
        }
    })
}
