use futures::future::{join_all, try_join_all};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{EstimateError, ProcessFailure, SampleError};
use crate::report::{error_chain, ProcessOutcome, Report};
use crate::sample::{aggregate, parse_samples};
use crate::sampler::CpuSampler;
use crate::trace::{load_trace, locate_processes, ProcessRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Settling,
    Locating,
    Sampling,
    Aggregating,
    Done,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Settling => "settling",
            Phase::Locating => "locating",
            Phase::Sampling => "sampling",
            Phase::Aggregating => "aggregating",
            Phase::Done => "done",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Measures idle CPU utilization of the browser processes named in a trace.
pub struct IdleCpuEstimator<S> {
    config: Config,
    sampler: S,
}

impl<S: CpuSampler> IdleCpuEstimator<S> {
    pub fn new(config: Config, sampler: S) -> Result<Self, EstimateError> {
        config.validate()?;
        Ok(Self { config, sampler })
    }

    /// Locate the processes in `trace_path`, sample each of them concurrently
    /// and reduce every batch to a median utilization.
    ///
    /// An unreadable trace fails the whole run before anything is sampled.
    /// Per-process failures end up in the report next to the successful
    /// values unless `fail_fast` is set.
    pub async fn measure<P: AsRef<Path>>(&self, trace_path: P) -> Result<Report, EstimateError> {
        let trace_path = trace_path.as_ref();
        let events = load_trace(trace_path).map_err(|err| failed(err.into()))?;

        enter(Phase::Settling);
        tokio::time::sleep(self.config.settle_delay()).await;

        enter(Phase::Locating);
        let records = locate_processes(&events);
        drop(events);
        if records.is_empty() {
            warn!(trace = %trace_path.display(), "no browser processes found in trace");
        }

        self.measure_processes(&records).await
    }

    /// Sample and aggregate already located processes. The report keeps the
    /// order of `records`.
    pub async fn measure_processes(
        &self,
        records: &[ProcessRecord],
    ) -> Result<Report, EstimateError> {
        self.sample_and_aggregate(records).await.map_err(failed)
    }

    async fn sample_and_aggregate(
        &self,
        records: &[ProcessRecord],
    ) -> Result<Report, EstimateError> {
        enter(Phase::Sampling);
        let outputs: Vec<Result<String, SampleError>> = if self.config.fail_fast {
            let tasks = records.iter().map(|record| async move {
                self.sample(record)
                    .await
                    .map_err(|err| EstimateError::ProcessFailed {
                        record: *record,
                        source: err.into(),
                    })
            });
            try_join_all(tasks).await?.into_iter().map(Ok).collect()
        } else {
            join_all(records.iter().map(|record| self.sample(record))).await
        };

        enter(Phase::Aggregating);
        let window_ms = self.config.window_ms as f64;
        let mut processes = Vec::with_capacity(records.len());

        for (record, output) in records.iter().zip(outputs) {
            let result = match output {
                Ok(text) => aggregate(parse_samples(&text), window_ms),
                Err(err) => Err(ProcessFailure::from(err)),
            };

            match &result {
                Ok(utilization) => info!(
                    role = %record.role,
                    pid = record.pid,
                    cpu_percent = utilization.cpu_percent,
                    samples = utilization.samples_used,
                    "measured"
                ),
                Err(err) => warn!(
                    role = %record.role,
                    pid = record.pid,
                    error = %error_chain(err),
                    "measurement failed"
                ),
            }

            let result = match result {
                Err(source) if self.config.fail_fast => {
                    return Err(EstimateError::ProcessFailed {
                        record: *record,
                        source,
                    })
                }
                other => other,
            };

            processes.push(ProcessOutcome {
                record: *record,
                result,
            });
        }

        enter(Phase::Done);
        Ok(Report { processes })
    }

    async fn sample(&self, record: &ProcessRecord) -> Result<String, SampleError> {
        let timeout = self.config.timeout();
        let sampling = self
            .sampler
            .sample(record.pid, self.config.sample_count, self.config.window());

        match tokio::time::timeout(timeout, sampling).await {
            Ok(result) => result,
            Err(_) => Err(SampleError::TimedOut(timeout)),
        }
    }
}

fn enter(phase: Phase) {
    info!(%phase, "idle cpu estimation");
}

fn failed(err: EstimateError) -> EstimateError {
    warn!(phase = %Phase::Failed, error = %error_chain(&err), "idle cpu estimation");
    err
}
