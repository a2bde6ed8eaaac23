use super::{GraphQLClient, JobLog};
use crate::error::Result;
use crate::observability::{record_job_run, Outcome};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

pub const JOB_NAME: &str = "heartbeat";
pub const RETRIES: u32 = 3;

const QUERY: &str = "{ hello }";

#[derive(Debug, Deserialize)]
struct HelloData {
    hello: String,
}

async fn check(client: &GraphQLClient) -> Result<String> {
    let data: HelloData = client.execute(QUERY, json!({})).await?;
    Ok(data.hello)
}

/// Writes one liveness line, noting whether the GraphQL endpoint answered.
pub async fn run(client: &GraphQLClient, log: &JobLog) -> Vec<String> {
    let timestamp = Local::now().format("%d/%m/%Y-%H:%M:%S");
    let line = match check(client).await {
        Ok(hello) => {
            record_job_run(JOB_NAME, Outcome::Success);
            format!("{timestamp} CRM is alive - GraphQL OK ({hello})")
        }
        Err(e) => {
            warn!("Heartbeat could not reach {}: {}", client.url(), e);
            record_job_run(JOB_NAME, Outcome::Failed);
            format!("{timestamp} CRM is alive - GraphQL Error ({e})")
        }
    };
    info!("{}", line);

    let lines = vec![line];
    log.write(&lines);
    lines
}
