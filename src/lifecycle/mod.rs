//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT → cancel the run's CancellationToken
//!           → executor stops before the next attempt / during backoff
//! ```

pub mod signals;

pub use signals::cancel_on_ctrl_c;
