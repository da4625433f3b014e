use serde::Serialize;
use std::fmt;
use tracing::debug;

use super::TraceEvent;

/// Browser process kinds identified by their main thread name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessRole {
    Renderer,
    Browser,
    Gpu,
}

impl ProcessRole {
    pub const ALL: [ProcessRole; 3] = [
        ProcessRole::Renderer,
        ProcessRole::Browser,
        ProcessRole::Gpu,
    ];

    /// Thread name Chrome records for the role's main thread.
    pub fn label(&self) -> &'static str {
        match self {
            ProcessRole::Renderer => "CrRendererMain",
            ProcessRole::Browser => "CrBrowserMain",
            ProcessRole::Gpu => "CrGpuMain",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.label() == label)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessRole::Renderer => "renderer",
            ProcessRole::Browser => "browser",
            ProcessRole::Gpu => "gpu",
        }
    }
}

impl fmt::Display for ProcessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessRecord {
    pub role: ProcessRole,
    pub pid: u32,
}

impl fmt::Display for ProcessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (pid {})", self.role, self.pid)
    }
}

/// Map role labels found in `events` to process ids, in discovery order.
///
/// The first event carrying a role's label wins; later duplicates are
/// ignored. The scan stops as soon as every role has been seen.
pub fn locate_processes<'a, I>(events: I) -> Vec<ProcessRecord>
where
    I: IntoIterator<Item = &'a TraceEvent>,
{
    let mut found: Vec<ProcessRecord> = Vec::with_capacity(ProcessRole::ALL.len());

    for event in events {
        let Some(role) = event.name_label().and_then(ProcessRole::from_label) else {
            continue;
        };
        if found.iter().any(|r| r.role == role) {
            continue;
        }
        let Some(pid) = event.pid else {
            debug!(%role, "event carries role label but no pid, skipping");
            continue;
        };

        debug!(%role, pid, "located process");
        found.push(ProcessRecord { role, pid });

        if found.len() == ProcessRole::ALL.len() {
            break;
        }
    }

    found
}
