use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Captured result of one external tool invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl ToolOutput {
    pub fn status_label(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Seam between the pipeline and the processes it launches.
///
/// Every stage takes the runner as an argument, so tests can substitute a
/// recording fake. Dropping a pending `run` future must stop the tool.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput>;
}

/// Runs tools as child processes and waits for them to exit.
///
/// Children are killed when the call is cancelled, so a caller's timeout
/// never leaves ffmpeg writing into a workspace that is being removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl ToolRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput> {
        tracing::debug!(program, args = %args.join(" "), "running external tool");

        let output = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| PipelineError::Spawn {
                tool: program.to_string(),
                path: PathBuf::from(program),
                source,
            })?;

        Ok(ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Runs `program` without judging its exit status. A launch failure is
/// reported against `subject` rather than the binary.
pub async fn launch(
    runner: &dyn ToolRunner,
    program: &str,
    args: &[String],
    subject: &Path,
) -> Result<ToolOutput> {
    runner.run(program, args).await.map_err(|err| match err {
        PipelineError::Spawn { tool, source, .. } => PipelineError::Spawn {
            tool,
            path: subject.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Runs `program` and turns a non-zero exit into [`PipelineError::ToolFailed`]
/// attributed to `subject`.
pub async fn run_tool(
    runner: &dyn ToolRunner,
    program: &str,
    args: &[String],
    subject: &Path,
) -> Result<ToolOutput> {
    let output = launch(runner, program, args, subject).await?;
    if !output.success {
        return Err(PipelineError::ToolFailed {
            tool: program.to_string(),
            path: subject.to_path_buf(),
            status: output.status_label(),
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(output)
}
