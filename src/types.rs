use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::error::ScanError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_CONCURRENCY: usize = 100;

/// Terminal classification of one probe.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PortStatus {
    Open,
    Closed,
    Filtered,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PortStatus::Open => "OPEN",
            PortStatus::Closed => "CLOSED",
            PortStatus::Filtered => "FILTERED",
        };
        f.write_str(s)
    }
}

/// Outcome of probing one host:port pair.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub host: String,
    pub port: u16,
    pub status: PortStatus,
    /// Human-readable service label; empty for ports that were not open.
    pub service: String,
    /// Printable-only, length-capped banner text.
    pub banner: String,
    /// Text between `<body>` and `</body>` in the banner, if any.
    pub body: String,
}

impl ScanResult {
    pub fn unanswered(host: &str, port: u16, status: PortStatus) -> Self {
        Self {
            host: host.to_string(),
            port,
            status,
            service: String::new(),
            banner: String::new(),
            body: String::new(),
        }
    }
}

/// Host-independent knobs shared by every scan in one invocation.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub timeout: Duration,
    pub max_concurrency: usize,
    pub randomize_order: bool,
    pub delay_between: Duration,
    /// Fixed seed for the port shuffle. `None` seeds from the wall clock.
    pub shuffle_seed: Option<u64>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_concurrency: DEFAULT_CONCURRENCY,
            randomize_order: false,
            delay_between: Duration::ZERO,
            shuffle_seed: None,
        }
    }
}

/// Input to one scan run against a single host.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub host: String,
    pub ports: Vec<u16>,
    pub options: ScanOptions,
}

impl ScanConfig {
    pub fn new(host: impl Into<String>, ports: Vec<u16>) -> Self {
        Self::with_options(host, ports, ScanOptions::default())
    }

    pub fn with_options(host: impl Into<String>, ports: Vec<u16>, options: ScanOptions) -> Self {
        Self {
            host: host.into(),
            ports,
            options,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    pub fn max_concurrency(mut self, n: usize) -> Self {
        self.options.max_concurrency = n;
        self
    }

    pub fn randomize_order(mut self, on: bool) -> Self {
        self.options.randomize_order = on;
        self
    }

    pub fn delay_between(mut self, delay: Duration) -> Self {
        self.options.delay_between = delay;
        self
    }

    pub fn shuffle_seed(mut self, seed: u64) -> Self {
        self.options.shuffle_seed = Some(seed);
        self
    }

    /// Check the invariants and replace zero timeout/concurrency with defaults.
    pub fn validated(mut self) -> Result<Self, ScanError> {
        if self.host.trim().is_empty() {
            return Err(ScanError::InvalidConfig("host cannot be empty".into()));
        }
        if self.ports.is_empty() {
            return Err(ScanError::InvalidConfig("ports cannot be empty".into()));
        }
        if self.options.timeout.is_zero() {
            self.options.timeout = DEFAULT_TIMEOUT;
        }
        if self.options.max_concurrency == 0 {
            self.options.max_concurrency = DEFAULT_CONCURRENCY;
        }
        Ok(self)
    }
}

/// Aggregate counters for one scan run.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStatistics {
    pub total_ports: usize,
    pub open_ports: usize,
    pub closed_ports: usize,
    pub filtered_ports: usize,
    pub elapsed: Duration,
    /// RFC 3339 UTC timestamp of the scan start.
    pub started_at: String,
}

impl ScanStatistics {
    pub fn new(total_ports: usize, started_at: String) -> Self {
        Self {
            total_ports,
            started_at,
            ..Self::default()
        }
    }

    pub fn record(&mut self, status: PortStatus) {
        match status {
            PortStatus::Open => self.open_ports += 1,
            PortStatus::Closed => self.closed_ports += 1,
            PortStatus::Filtered => self.filtered_ports += 1,
        }
    }

    pub fn scanned(&self) -> usize {
        self.open_ports + self.closed_ports + self.filtered_ports
    }
}

/// Results of one completed scan run, in completion order.
#[derive(Serialize, Debug, Clone)]
pub struct ScanReport {
    pub results: Vec<ScanResult>,
    pub stats: ScanStatistics,
}

/// Outcome of scanning one host in a multi-target run.
#[derive(Serialize, Debug, Clone)]
pub struct TargetReport {
    pub target: String,
    #[serde(serialize_with = "serialize_outcome")]
    pub outcome: Result<ScanReport, ScanError>,
}

fn serialize_outcome<S>(outcome: &Result<ScanReport, ScanError>, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeMap;
    let mut map = s.serialize_map(Some(1))?;
    match outcome {
        Ok(report) => map.serialize_entry("report", report)?,
        Err(e) => map.serialize_entry("error", &e.to_string())?,
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_options_fall_back_to_defaults() {
        let cfg = ScanConfig::new("127.0.0.1", vec![80])
            .timeout(Duration::ZERO)
            .max_concurrency(0)
            .validated()
            .unwrap();
        assert_eq!(cfg.options.timeout, DEFAULT_TIMEOUT);
        assert_eq!(cfg.options.max_concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    fn empty_host_or_ports_rejected() {
        let err = ScanConfig::new("  ", vec![22]).validated().unwrap_err();
        assert!(matches!(err, ScanError::InvalidConfig(_)));
        let err = ScanConfig::new("10.0.0.1", vec![]).validated().unwrap_err();
        assert!(matches!(err, ScanError::InvalidConfig(_)));
    }

    #[test]
    fn record_counts_each_status() {
        let mut stats = ScanStatistics::new(3, String::new());
        stats.record(PortStatus::Open);
        stats.record(PortStatus::Closed);
        stats.record(PortStatus::Filtered);
        assert_eq!(
            (stats.open_ports, stats.closed_ports, stats.filtered_ports),
            (1, 1, 1)
        );
        assert_eq!(stats.scanned(), stats.total_ports);
    }
}
