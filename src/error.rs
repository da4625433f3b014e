use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::trace::ProcessRecord;

/// The trace could not be turned into a list of events. Fatal for the whole run.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("cannot read trace file {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("trace file {path} is not a valid JSON trace")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A CPU time token that cannot be converted to milliseconds.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DurationError {
    #[error("invalid time component {0:?}")]
    InvalidComponent(String),
    #[error("expected 1 to 3 ':'-separated components, found {0}")]
    ComponentCount(usize),
}

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("could not start sampler {program}")]
    CouldNotStart {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("sampler exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("sampler did not finish within {0:?}")]
    TimedOut(Duration),
    #[error("process {0} is not running")]
    ProcessGone(u32),
    #[error("cannot read process statistics")]
    Procfs(#[source] procfs::ProcError),
    #[error("sampler output is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Why a single process has no utilization value.
#[derive(Debug, Error)]
pub enum ProcessFailure {
    #[error(transparent)]
    Sampling(#[from] SampleError),
    #[error("no valid samples ({discarded} discarded)")]
    NoValidSamples { discarded: usize },
}

#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Trace(#[from] TraceError),
    #[error("measurement of {record} failed")]
    ProcessFailed {
        record: ProcessRecord,
        #[source]
        source: ProcessFailure,
    },
}
