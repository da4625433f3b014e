use std::future::Future;
use std::time::Duration;

use crate::config::Backend;
use crate::error::SampleError;

pub mod command;
pub mod procstat;

pub use command::CommandSampler;
pub use procstat::ProcfsSampler;

/// Source of raw CPU time samples for one process.
///
/// An implementation blocks for about `sample_count * window` and returns
/// newline separated `"<start> - <end>"` lines, one per window, with start
/// and end being the process's accumulated CPU time.
pub trait CpuSampler {
    fn sample(
        &self,
        pid: u32,
        sample_count: u32,
        window: Duration,
    ) -> impl Future<Output = Result<String, SampleError>> + Send;
}

/// Sampler chosen at runtime from the configured [`Backend`].
#[derive(Debug, Clone)]
pub enum Sampler {
    Command(CommandSampler),
    Procfs(ProcfsSampler),
}

impl From<&Backend> for Sampler {
    fn from(backend: &Backend) -> Self {
        match backend {
            Backend::Command { program } => Sampler::Command(CommandSampler::new(program.clone())),
            Backend::Procfs => Sampler::Procfs(ProcfsSampler),
        }
    }
}

impl CpuSampler for Sampler {
    async fn sample(
        &self,
        pid: u32,
        sample_count: u32,
        window: Duration,
    ) -> Result<String, SampleError> {
        match self {
            Sampler::Command(sampler) => sampler.sample(pid, sample_count, window).await,
            Sampler::Procfs(sampler) => sampler.sample(pid, sample_count, window).await,
        }
    }
}
