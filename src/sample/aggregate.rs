use serde::Serialize;
use tracing::debug;

use super::line::SamplePair;
use crate::error::ProcessFailure;

/// Median CPU utilization of one process over a sampling batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Utilization {
    pub cpu_percent: f64,
    pub samples_used: usize,
    pub samples_discarded: usize,
}

/// Reduce a batch of samples to the median utilization percentage.
///
/// Samples whose tokens do not convert to a finite duration are discarded.
/// If nothing is left the batch reports [`ProcessFailure::NoValidSamples`]
/// instead of a value.
pub fn aggregate<'a, I>(pairs: I, window_ms: f64) -> Result<Utilization, ProcessFailure>
where
    I: IntoIterator<Item = SamplePair<'a>>,
{
    let mut values = Vec::new();
    let mut discarded = 0usize;

    for pair in pairs {
        match pair.to_durations() {
            Ok(durations) => {
                let value = durations.utilization(window_ms);
                if value.is_finite() {
                    values.push(value);
                } else {
                    discarded += 1;
                }
            }
            Err(err) => {
                debug!(start = pair.start(), end = pair.end(), %err, "discarding sample");
                discarded += 1;
            }
        }
    }

    let cpu_percent = median(&mut values).ok_or(ProcessFailure::NoValidSamples { discarded })?;

    Ok(Utilization {
        cpu_percent,
        samples_used: values.len(),
        samples_discarded: discarded,
    })
}

/// Median of `values`, averaging the two middle values for even lengths.
/// Sorts in place.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
