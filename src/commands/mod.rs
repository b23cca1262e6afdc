//! Operations driven by the command-line tool.
//!
//! Each module exposes a single-attempt operation; retrying is left to the
//! executor so these stay free of any retry logic.

pub mod http;
pub mod plan;
pub mod process;
