use super::job_log::bracketed;
use super::{GraphQLClient, JobLog};
use crate::error::Result;
use crate::observability::{record_job_run, Outcome};
use chrono::{Duration, Local, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

pub const JOB_NAME: &str = "order_reminders";
pub const LOOKBACK_DAYS: i64 = 7;

const QUERY: &str = r#"
query RecentOrders($startDate: DateTime!) {
  allOrders(orderBy: "-order_date", filter: { orderDateGte: $startDate }) {
    edges {
      node {
        id
        orderDate
        customer { email }
      }
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentOrdersData {
    all_orders: OrderConnection,
}

#[derive(Debug, Deserialize)]
struct OrderConnection {
    edges: Vec<OrderEdge>,
}

#[derive(Debug, Deserialize)]
struct OrderEdge {
    node: OrderNode,
}

#[derive(Debug, Deserialize)]
struct OrderNode {
    id: String,
    customer: Option<CustomerNode>,
}

#[derive(Debug, Deserialize)]
struct CustomerNode {
    email: String,
}

async fn recent_orders(client: &GraphQLClient) -> Result<Vec<OrderNode>> {
    let start_date = Utc::now() - Duration::days(LOOKBACK_DAYS);
    let data: RecentOrdersData = client.execute(QUERY, json!({ "startDate": start_date.to_rfc3339() })).await?;
    Ok(data.all_orders.edges.into_iter().map(|edge| edge.node).collect())
}

/// Logs one reminder per order placed in the last week, newest first.
pub async fn run(client: &GraphQLClient, log: &JobLog) -> Vec<String> {
    let ts = bracketed(&Local::now());
    let lines = match recent_orders(client).await {
        Ok(orders) => {
            info!("Order reminders: {} recent orders", orders.len());
            record_job_run(JOB_NAME, Outcome::Success);
            orders
                .into_iter()
                .map(|order| {
                    let email = order.customer.map(|c| c.email).unwrap_or_default();
                    format!("{ts} Reminder for Order ID: {}, Customer: {email}", order.id)
                })
                .collect()
        }
        Err(e) => {
            error!("Order reminders failed: {}", e);
            record_job_run(JOB_NAME, Outcome::Failed);
            vec![format!("{ts} Error: {e}")]
        }
    };

    log.write(&lines);
    lines
}
