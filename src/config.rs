use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::EstimateError;

pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;
pub const DEFAULT_SAMPLE_COUNT: u32 = 10;
pub const DEFAULT_WINDOW_MS: u64 = 2000;
/// Slack added on top of `sample_count * window_ms` when no timeout is set.
pub const DEFAULT_TIMEOUT_GRACE_MS: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub settle_delay_ms: u64,
    pub sample_count: u32,
    pub window_ms: u64,
    pub timeout_ms: Option<u64>,
    pub fail_fast: bool,
    pub backend: Backend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            sample_count: DEFAULT_SAMPLE_COUNT,
            window_ms: DEFAULT_WINDOW_MS,
            timeout_ms: None,
            fail_fast: false,
            backend: Backend::default(),
        }
    }
}

impl Config {
    /// Load a JSON config file; absent fields keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EstimateError> {
        if self.sample_count == 0 {
            return Err(EstimateError::InvalidConfig("sample_count must be at least 1".into()));
        }
        if self.window_ms == 0 {
            return Err(EstimateError::InvalidConfig("window_ms must be greater than 0".into()));
        }
        if self.timeout_ms == Some(0) {
            return Err(EstimateError::InvalidConfig("timeout_ms must be greater than 0".into()));
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Upper bound for a single sampler invocation.
    pub fn timeout(&self) -> Duration {
        let millis = self.timeout_ms.unwrap_or_else(|| {
            (self.sample_count as u64)
                .saturating_mul(self.window_ms)
                .saturating_add(DEFAULT_TIMEOUT_GRACE_MS)
        });
        Duration::from_millis(millis)
    }
}

/// Parse a human-readable duration into milliseconds (e.g., "1500", "2s", "500ms", "1m")
pub fn parse_millis(s: &str) -> anyhow::Result<u64> {
    let s = s.trim().to_lowercase();
    let (num_str, multiplier) = if let Some(n) = s.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1000)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60 * 1000)
    } else {
        // Assume milliseconds if no unit
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid duration: {}", s))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| anyhow::anyhow!("Duration out of range: {}", s))
}

pub const DEFAULT_COMMAND: &str = "./scripts/measure-cpu.sh";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum Backend {
    /// External command invoked as `<program> <pid> <sample_count> <window_ms>`.
    Command { program: PathBuf },
    /// Built-in sampler reading `/proc/<pid>/stat`.
    Procfs,
}

impl Default for Backend {
    fn default() -> Self {
        Backend::Command {
            program: PathBuf::from(DEFAULT_COMMAND),
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "command" | "cmd" | "external" => Ok(Backend::default()),
            "procfs" | "proc" => Ok(Backend::Procfs),
            _ => Err(anyhow::anyhow!("Invalid backend: {}. Valid options: command, procfs", s)),
        }
    }
}
