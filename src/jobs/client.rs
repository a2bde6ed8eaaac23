//! Minimal GraphQL-over-HTTP client used by the background jobs.

use crate::error::{CrmError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQLErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorMessage {
    message: String,
}

#[derive(Debug, Clone)]
pub struct GraphQLClient {
    http: reqwest::Client,
    url: String,
    retries: u32,
}

impl GraphQLClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, url: url.into(), retries: 0 })
    }

    /// Retry transport failures (connection refused, timeouts) up to `retries` extra times.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Posts `query` and decodes `data`. A non-empty `errors` array is an error
    /// even when partial data came back.
    pub async fn execute<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let body = json!({ "query": query, "variables": variables });

        let mut attempt = 0;
        let response = loop {
            match self.http.post(&self.url).json(&body).send().await {
                Ok(response) => break response,
                Err(e) if attempt < self.retries && (e.is_connect() || e.is_timeout()) => {
                    attempt += 1;
                    warn!("GraphQL request to {} failed (attempt {}): {}", self.url, attempt, e);
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(e) => return Err(e.into()),
            }
        };

        let response = response.error_for_status()?;
        let payload: GraphQLResponse<T> = response.json().await?;
        debug!("GraphQL response from {} ({} errors)", self.url, payload.errors.len());

        if !payload.errors.is_empty() {
            let message = payload.errors.into_iter().map(|e| e.message).collect::<Vec<_>>().join("; ");
            return Err(CrmError::GraphQL { message });
        }
        payload.data.ok_or_else(|| CrmError::GraphQL { message: "response contained no data".to_string() })
    }
}
