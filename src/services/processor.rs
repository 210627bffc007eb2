use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// Exit status of one delegate invocation. Whether the output file was
/// actually produced is checked separately by the caller; exit code zero
/// alone does not mean the job succeeded.
#[derive(Debug, Clone, Copy)]
pub struct ProcessExit {
    pub code: Option<i32>,
    pub success: bool,
}

/// Boundary to the external image processor. Implementations run the
/// delegate for one (input, output) pair and report how it exited; the
/// delegate's internal algorithm is opaque.
#[async_trait]
pub trait ImageProcessor: Send + Sync {
    async fn run(&self, input: &Path, output: &Path) -> Result<ProcessExit>;
}

/// Spawns the configured external program with the input and output paths
/// appended as the final two positional arguments
pub struct CommandProcessor {
    program: String,
    base_args: Vec<String>,
}

impl CommandProcessor {
    pub fn new(program: impl Into<String>, base_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            base_args,
        }
    }

    /// Build from a whitespace-separated command line, e.g.
    /// "python3 process_passport_photo.py"
    pub fn from_command_line(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| anyhow!("Processor command is empty"))?;
        Ok(Self::new(program, parts.collect()))
    }
}

#[async_trait]
impl ImageProcessor for CommandProcessor {
    async fn run(&self, input: &Path, output: &Path) -> Result<ProcessExit> {
        let mut child = Command::new(&self.program)
            .args(&self.base_args)
            .arg(input)
            .arg(output)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn processor '{}'", self.program))?;

        // Forward both streams line by line as they arrive, not after exit;
        // the delegate may run for a long time and reports progress on stdout.
        let stdout = child.stdout.take();
        let stdout_task = tokio::spawn(async move {
            if let Some(stdout) = stdout {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::info!("processor stdout: {}", line);
                }
            }
        });

        let stderr = child.stderr.take();
        let stderr_task = tokio::spawn(async move {
            if let Some(stderr) = stderr {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::warn!("processor stderr: {}", line);
                }
            }
        });

        let status = child
            .wait()
            .await
            .with_context(|| format!("Failed to wait for processor '{}'", self.program))?;

        let _ = stdout_task.await;
        let _ = stderr_task.await;

        Ok(ProcessExit {
            code: status.code(),
            success: status.success(),
        })
    }
}
