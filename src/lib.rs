//! Idle CPU estimation for the browser, renderer and GPU processes of a
//! captured Chrome trace.

pub mod config;
pub mod error;
pub mod estimator;
pub mod report;
pub mod sample;
pub mod sampler;
pub mod trace;

pub use config::{Backend, Config};
pub use error::{DurationError, EstimateError, ProcessFailure, SampleError, TraceError};
pub use estimator::IdleCpuEstimator;
pub use report::{ProcessOutcome, Report};
pub use sampler::{CommandSampler, CpuSampler, ProcfsSampler, Sampler};
pub use trace::{ProcessRecord, ProcessRole};
