// ABOUTME: Command runner backed by tokio child processes.
// ABOUTME: Streams stdout chunks to the caller and captures stderr for errors.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use super::{CommandError, CommandRunner};

const CHUNK_SIZE: usize = 8 * 1024;

/// Runs commands as local child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn execute(
        &self,
        program: &str,
        args: &[String],
        on_stdout: &mut (dyn for<'c> FnMut(&'c [u8]) + Send),
    ) -> Result<(), CommandError> {
        tracing::debug!("running {} {}", program, args.join(" "));

        let io_error = |e: std::io::Error| CommandError::Io {
            program: program.to_string(),
            message: e.to_string(),
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CommandError::Spawn {
                program: program.to_string(),
                message: e.to_string(),
            })?;

        // Drain stderr concurrently so a chatty command cannot block on a full pipe.
        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let _ = stderr.read_to_end(&mut buf).await;
                String::from_utf8_lossy(&buf).trim().to_string()
            })
        });

        if let Some(mut stdout) = child.stdout.take() {
            let mut chunk = vec![0u8; CHUNK_SIZE];
            loop {
                let read = stdout.read(&mut chunk).await.map_err(io_error)?;
                if read == 0 {
                    break;
                }
                on_stdout(&chunk[..read]);
            }
        }

        let status = child.wait().await.map_err(io_error)?;
        let stderr = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if status.success() {
            return Ok(());
        }

        match status.code() {
            Some(code) => Err(CommandError::NonZeroExit {
                program: program.to_string(),
                code,
                stderr,
            }),
            None => Err(CommandError::Terminated {
                program: program.to_string(),
            }),
        }
    }
}
