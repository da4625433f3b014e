use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use super::CpuSampler;
use crate::error::SampleError;

/// Runs `<program> <pid> <sample_count> <window_ms>` and captures stdout.
///
/// The child is killed if the returned future is dropped, so wrapping a
/// call in `tokio::time::timeout` is enough to bound it.
#[derive(Debug, Clone)]
pub struct CommandSampler {
    program: PathBuf,
}

impl CommandSampler {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl CpuSampler for CommandSampler {
    async fn sample(
        &self,
        pid: u32,
        sample_count: u32,
        window: Duration,
    ) -> Result<String, SampleError> {
        let window_ms = window.as_millis().to_string();
        debug!(
            program = %self.program.display(),
            pid,
            sample_count,
            %window_ms,
            "executing sampler"
        );

        let output = Command::new(&self.program)
            .arg(pid.to_string())
            .arg(sample_count.to_string())
            .arg(&window_ms)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| SampleError::CouldNotStart {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SampleError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8(output.stdout)?)
    }
}
