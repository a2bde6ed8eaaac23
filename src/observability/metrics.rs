//! Prometheus counters for mutations and background jobs.
//!
//! Recording is a no-op until [`init`] installs the global recorder, so tests
//! and library callers can use the recording functions freely.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::fmt;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    MutationsTotal,
    JobRunsTotal,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::MutationsTotal => "crm_mutations_total",
            MetricName::JobRunsTotal => "crm_job_runs_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Rejected,
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Rejected => "rejected",
            Outcome::Failed => "failed",
        }
    }
}

/// Installs the Prometheus recorder. Calling it again returns the existing handle.
pub fn init() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    if let Some(handle) = HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    Ok(HANDLE.get_or_init(|| handle).clone())
}

/// Current metrics in Prometheus text format, if the recorder is installed.
pub fn render() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

pub fn record_mutation(mutation: &'static str, outcome: Outcome) {
    ::metrics::counter!(
        MetricName::MutationsTotal.as_str(),
        "mutation" => mutation,
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

pub fn record_job_run(job: &'static str, outcome: Outcome) {
    ::metrics::counter!(
        MetricName::JobRunsTotal.as_str(),
        "job" => job,
        "outcome" => outcome.as_str()
    )
    .increment(1);
}
