//! Run an external program as one attempt.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

use crate::resilience::timeouts::{with_attempt_timeout, AttemptTimedOut};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' exited unsuccessfully ({status})")]
    Exit { program: String, status: ExitStatus },

    #[error(transparent)]
    TimedOut(#[from] AttemptTimedOut),
}

impl CommandError {
    /// Exit code of the child, when it exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CommandError::Exit { status, .. } => status.code(),
            _ => None,
        }
    }
}

/// Spawn `program` with inherited stdio and wait for it.
///
/// A non-zero exit is a failed attempt. On timeout the child is killed.
pub async fn run_once(
    program: &str,
    args: &[String],
    timeout: Option<Duration>,
) -> Result<(), CommandError> {
    with_attempt_timeout(timeout, async {
        let status = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if status.success() {
            Ok::<_, CommandError>(())
        } else {
            Err(CommandError::Exit {
                program: program.to_string(),
                status,
            })
        }
    })
    .await
}
