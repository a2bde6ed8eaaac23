use super::job_log::bracketed;
use super::{GraphQLClient, JobLog};
use crate::error::Result;
use crate::observability::{record_job_run, Outcome};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

pub const JOB_NAME: &str = "low_stock";

const MUTATION: &str = r#"
mutation {
  updateLowStockProducts {
    updatedProducts { name stock }
    message
    errors
  }
}
"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestockData {
    update_low_stock_products: RestockPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestockPayload {
    updated_products: Vec<RestockedProduct>,
    message: String,
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RestockedProduct {
    name: String,
    stock: i64,
}

async fn restock(client: &GraphQLClient) -> Result<RestockPayload> {
    let data: RestockData = client.execute(MUTATION, json!({})).await?;
    Ok(data.update_low_stock_products)
}

/// Triggers the restock mutation and logs each product it topped up.
pub async fn run(client: &GraphQLClient, log: &JobLog) -> Vec<String> {
    let ts = bracketed(&Local::now());
    let lines = match restock(client).await {
        Ok(payload) => {
            let mut lines: Vec<String> = payload
                .updated_products
                .iter()
                .map(|p| format!("{ts} Updated {}: new stock {}", p.name, p.stock))
                .collect();
            lines.push(format!("{ts} {}", payload.message));
            lines.extend(payload.errors.iter().map(|e| format!("{ts} Error: {e}")));

            let outcome = if payload.errors.is_empty() { Outcome::Success } else { Outcome::Failed };
            record_job_run(JOB_NAME, outcome);
            info!("Low-stock job: {}", payload.message);
            lines
        }
        Err(e) => {
            error!("Low-stock job failed: {}", e);
            record_job_run(JOB_NAME, Outcome::Failed);
            vec![format!("{ts} Error: {e}")]
        }
    };

    log.write(&lines);
    lines
}
