use super::job_log::plain;
use super::{GraphQLClient, JobLog};
use crate::error::Result;
use crate::observability::{record_job_run, Outcome};
use chrono::Local;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

pub const JOB_NAME: &str = "report";

const QUERY: &str = r#"
{
  allCustomers { totalCount }
  allOrders {
    totalCount
    edges { node { totalAmount } }
  }
}
"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportData {
    all_customers: Totals,
    all_orders: OrderTotals,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Totals {
    total_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderTotals {
    total_count: usize,
    edges: Vec<AmountEdge>,
}

#[derive(Debug, Deserialize)]
struct AmountEdge {
    node: AmountNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AmountNode {
    total_amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrmReport {
    pub customers: usize,
    pub orders: usize,
    pub revenue: Decimal,
}

async fn collect(client: &GraphQLClient) -> Result<CrmReport> {
    let data: ReportData = client.execute(QUERY, json!({})).await?;
    let revenue = data.all_orders.edges.iter().map(|edge| edge.node.total_amount).sum();
    Ok(CrmReport {
        customers: data.all_customers.total_count,
        orders: data.all_orders.total_count,
        revenue,
    })
}

/// Logs customer and order counts plus total revenue.
pub async fn run(client: &GraphQLClient, log: &JobLog) -> Vec<String> {
    let ts = plain(&Local::now());
    let line = match collect(client).await {
        Ok(report) => {
            record_job_run(JOB_NAME, Outcome::Success);
            format!(
                "{ts} - Report: {} customers, {} orders, {:.2} revenue",
                report.customers,
                report.orders,
                report.revenue.round_dp(2)
            )
        }
        Err(e) => {
            error!("CRM report failed: {}", e);
            record_job_run(JOB_NAME, Outcome::Failed);
            format!("{ts} - Error generating CRM report: {e}")
        }
    };
    info!("{}", line);

    let lines = vec![line];
    log.write(&lines);
    lines
}
