// ABOUTME: External collaborators of the revision monitor.
// ABOUTME: Command runner and clock traits with their production implementations.

mod clock;
mod process;

pub use clock::{Clock, TokioClock};
pub use process::ProcessRunner;

use async_trait::async_trait;

/// Executes external commands, streaming standard output to a listener.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, calling `on_stdout` with each chunk of
    /// standard output as it arrives.
    ///
    /// Returns `Ok(())` only if the command exited successfully.
    async fn execute(
        &self,
        program: &str,
        args: &[String],
        on_stdout: &mut (dyn for<'c> FnMut(&'c [u8]) + Send),
    ) -> Result<(), CommandError>;

    /// Run a command and collect its standard output as UTF-8 text.
    async fn capture(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
        let mut buffer = Vec::new();
        self.execute(program, args, &mut |chunk: &[u8]| {
            buffer.extend_from_slice(chunk)
        })
        .await?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// Errors from running an external command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("failed to spawn {program}: {message}")]
    Spawn { program: String, message: String },

    #[error("{program} exited with code {code}: {stderr}")]
    NonZeroExit {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("{program} was terminated by a signal")]
    Terminated { program: String },

    #[error("I/O error while running {program}: {message}")]
    Io { program: String, message: String },
}
