use procfs::process::Process;
use procfs::ProcError;
use std::time::Duration;

use super::CpuSampler;
use crate::error::SampleError;

/// Linux sampler reading `utime + stime` from `/proc/<pid>/stat`.
///
/// Emits the same `"<start> - <end>"` lines as an external sampler, with
/// times in fractional seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcfsSampler;

impl CpuSampler for ProcfsSampler {
    async fn sample(
        &self,
        pid: u32,
        sample_count: u32,
        window: Duration,
    ) -> Result<String, SampleError> {
        let ticks_per_second = procfs::ticks_per_second() as f64;
        let mut output = String::new();

        for _ in 0..sample_count {
            let start = cpu_ticks(pid)?;
            tokio::time::sleep(window).await;
            let end = cpu_ticks(pid)?;
            output.push_str(&format!(
                "{:.3} - {:.3}\n",
                start as f64 / ticks_per_second,
                end as f64 / ticks_per_second
            ));
        }

        Ok(output)
    }
}

fn cpu_ticks(pid: u32) -> Result<u64, SampleError> {
    let stat = i32::try_from(pid)
        .map_err(|_| SampleError::ProcessGone(pid))
        .and_then(|id| Process::new(id).map_err(|err| proc_error(pid, err)))?
        .stat()
        .map_err(|err| proc_error(pid, err))?;
    Ok(stat.utime + stat.stime)
}

fn proc_error(pid: u32, err: ProcError) -> SampleError {
    match err {
        ProcError::NotFound(_) => SampleError::ProcessGone(pid),
        other => SampleError::Procfs(other),
    }
}
