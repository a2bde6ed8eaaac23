//! Periodic jobs that talk to the CRM over its own GraphQL endpoint.

pub mod client;
pub mod heartbeat;
pub mod job_log;
pub mod low_stock;
pub mod order_reminders;
pub mod report;
pub mod scheduler;

pub use client::GraphQLClient;
pub use job_log::JobLog;
pub use scheduler::run_scheduler;

use crate::config::{JobConfig, JobsConfig};
use crate::error::Result;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum JobKind {
    Heartbeat,
    LowStock,
    OrderReminders,
    Report,
}

impl JobKind {
    pub const ALL: [JobKind; 4] = [JobKind::Heartbeat, JobKind::LowStock, JobKind::OrderReminders, JobKind::Report];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Heartbeat => heartbeat::JOB_NAME,
            JobKind::LowStock => low_stock::JOB_NAME,
            JobKind::OrderReminders => order_reminders::JOB_NAME,
            JobKind::Report => report::JOB_NAME,
        }
    }

    pub fn settings<'a>(&self, config: &'a JobsConfig) -> &'a JobConfig {
        match self {
            JobKind::Heartbeat => &config.heartbeat,
            JobKind::LowStock => &config.low_stock,
            JobKind::OrderReminders => &config.order_reminders,
            JobKind::Report => &config.report,
        }
    }

    pub fn client(&self, graphql_url: &str) -> Result<GraphQLClient> {
        let client = GraphQLClient::new(graphql_url)?;
        Ok(match self {
            JobKind::Heartbeat => client.with_retries(heartbeat::RETRIES),
            _ => client,
        })
    }
}

/// Runs a job once against `client`, returning the lines appended to `log`.
pub async fn run_job(kind: JobKind, client: &GraphQLClient, log: &JobLog) -> Vec<String> {
    match kind {
        JobKind::Heartbeat => heartbeat::run(client, log).await,
        JobKind::LowStock => low_stock::run(client, log).await,
        JobKind::OrderReminders => order_reminders::run(client, log).await,
        JobKind::Report => report::run(client, log).await,
    }
}

/// Runs a job once using the configured endpoint and log file.
pub async fn run_configured(kind: JobKind, config: &JobsConfig) -> Result<Vec<String>> {
    let client = kind.client(&config.graphql_url)?;
    let log = JobLog::new(&kind.settings(config).log_file);
    Ok(run_job(kind, &client, &log).await)
}
