use serde::Serialize;
use std::error::Error;
use std::fmt;

use crate::error::ProcessFailure;
use crate::sample::Utilization;
use crate::trace::{ProcessRecord, ProcessRole};

/// Measurement result of one located process.
#[derive(Debug)]
pub struct ProcessOutcome {
    pub record: ProcessRecord,
    pub result: Result<Utilization, ProcessFailure>,
}

/// Outcomes in the order the processes were located in the trace.
#[derive(Debug, Default)]
pub struct Report {
    pub processes: Vec<ProcessOutcome>,
}

impl Report {
    pub fn successes(&self) -> impl Iterator<Item = (&ProcessRecord, &Utilization)> {
        self.processes
            .iter()
            .filter_map(|p| p.result.as_ref().ok().map(|u| (&p.record, u)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&ProcessRecord, &ProcessFailure)> {
        self.processes
            .iter()
            .filter_map(|p| p.result.as_ref().err().map(|e| (&p.record, e)))
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn get(&self, role: ProcessRole) -> Option<&ProcessOutcome> {
        self.processes.iter().find(|p| p.record.role == role)
    }

    pub fn entries(&self) -> Vec<ReportEntry> {
        self.processes.iter().map(ReportEntry::from).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries())
    }
}

#[derive(Debug, Serialize)]
pub struct ReportEntry {
    pub role: ProcessRole,
    pub pid: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples_used: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples_discarded: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&ProcessOutcome> for ReportEntry {
    fn from(outcome: &ProcessOutcome) -> Self {
        let (utilization, error) = match &outcome.result {
            Ok(u) => (Some(u), None),
            Err(e) => (None, Some(error_chain(e))),
        };
        ReportEntry {
            role: outcome.record.role,
            pid: outcome.record.pid,
            cpu_percent: utilization.map(|u| u.cpu_percent),
            samples_used: utilization.map(|u| u.samples_used),
            samples_discarded: utilization.map(|u| u.samples_discarded),
            error,
        }
    }
}

/// `err` followed by each of its sources, separated by ": ".
pub fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<10} {:>8} {:>8}  {}", "PROCESS", "PID", "CPU%", "SAMPLES")?;
        for outcome in &self.processes {
            match &outcome.result {
                Ok(u) => writeln!(
                    f,
                    "{:<10} {:>8} {:>8.2}  {}/{}",
                    outcome.record.role,
                    outcome.record.pid,
                    u.cpu_percent,
                    u.samples_used,
                    u.samples_used + u.samples_discarded
                )?,
                Err(e) => writeln!(
                    f,
                    "{:<10} {:>8} {:>8}  {}",
                    outcome.record.role,
                    outcome.record.pid,
                    "n/a",
                    error_chain(e)
                )?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SampleError;
    use std::time::Duration;

    fn report() -> Report {
        Report {
            processes: vec![
                ProcessOutcome {
                    record: ProcessRecord { role: ProcessRole::Browser, pid: 10 },
                    result: Ok(Utilization {
                        cpu_percent: 1.5,
                        samples_used: 9,
                        samples_discarded: 1,
                    }),
                },
                ProcessOutcome {
                    record: ProcessRecord { role: ProcessRole::Gpu, pid: 12 },
                    result: Err(SampleError::TimedOut(Duration::from_secs(3)).into()),
                },
            ],
        }
    }

    #[test]
    fn splits_successes_and_failures() {
        let report = report();
        assert_eq!(report.successes().count(), 1);
        assert_eq!(report.failures().count(), 1);
        assert!(report.has_failures());
        assert!(report.get(ProcessRole::Renderer).is_none());
    }

    #[test]
    fn json_marks_failures_distinctly() {
        let json: serde_json::Value = serde_json::from_str(&report().to_json().unwrap()).unwrap();
        assert_eq!(json[0]["role"], "browser");
        assert_eq!(json[0]["cpu_percent"], 1.5);
        assert!(json[0].get("error").is_none());
        assert_eq!(json[1]["role"], "gpu");
        assert!(json[1].get("cpu_percent").is_none());
        assert_eq!(json[1]["error"], "sampler did not finish within 3s");
    }

    #[test]
    fn table_lists_every_process() {
        let table = report().to_string();
        assert_eq!(table.lines().count(), 3);
        assert!(table.contains("browser"));
        assert!(table.contains("9/10"));
        assert!(table.contains("n/a"));
    }
}
