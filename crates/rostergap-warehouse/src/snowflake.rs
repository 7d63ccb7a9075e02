//! Snowflake SQL API client for enrollment data.

use reqwest::StatusCode;
use rostergap_config::WarehouseConfig;
use rostergap_core::{RostergapError, RostergapResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// How long to wait between polls of an asynchronously executing statement.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Client for the Snowflake SQL API v2 (`/api/v2/statements`).
///
/// Authenticates with a programmatic access token. Only the enrollment
/// query needed by the executor is exposed; there is deliberately no retry
/// or caching here.
pub struct SnowflakeClient {
    http: reqwest::Client,
    config: WarehouseConfig,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct StatementRequest {
    statement: String,
    timeout: u64,
    database: String,
    warehouse: String,
    bindings: HashMap<String, Binding>,
}

#[derive(Debug, Serialize)]
struct Binding {
    #[serde(rename = "type")]
    kind: &'static str,
    value: String,
}

#[derive(Debug, Deserialize)]
struct StatementResponse {
    #[serde(rename = "statementHandle")]
    statement_handle: Option<String>,
    #[serde(rename = "resultSetMetaData")]
    result_set_meta_data: Option<ResultSetMetaData>,
    data: Option<Vec<Vec<Option<String>>>>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultSetMetaData {
    #[serde(rename = "numRows")]
    #[allow(dead_code)]
    num_rows: Option<u64>,
    #[serde(rename = "partitionInfo")]
    partition_info: Option<Vec<PartitionInfo>>,
}

#[derive(Debug, Deserialize)]
struct PartitionInfo {
    #[serde(rename = "rowCount")]
    #[allow(dead_code)]
    row_count: Option<u64>,
}

impl SnowflakeClient {
    /// Creates a new client for the configured account.
    pub fn new(config: WarehouseConfig) -> RostergapResult<Self> {
        let base_url = config.base_url();
        Self::with_base_url(config, base_url)
    }

    /// Creates a client against an explicit base URL (used by tests to
    /// target a local mock server).
    pub fn with_base_url(config: WarehouseConfig, base_url: String) -> RostergapResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.statement_timeout() + POLL_INTERVAL)
            .build()
            .map_err(|e| {
                RostergapError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            config,
            base_url,
        })
    }

    /// Fetches the distinct emails with an active course status for the
    /// given company, exactly as the enrollment pipeline records them.
    pub async fn fetch_enrolled_emails(&self, company: &str) -> RostergapResult<Vec<String>> {
        let statement = format!(
            r#"SELECT DISTINCT "Email" FROM {} WHERE "Company" = ? AND UPPER("Course status") = 'ACTIVE'"#,
            self.config.enrollment_table
        );

        info!(
            company,
            table = %self.config.enrollment_table,
            "querying warehouse for enrollment data"
        );

        let request = StatementRequest {
            statement,
            timeout: self.config.statement_timeout_secs,
            database: self.config.database.clone(),
            warehouse: self.config.warehouse.clone(),
            bindings: HashMap::from([(
                "1".to_string(),
                Binding {
                    kind: "TEXT",
                    value: company.to_string(),
                },
            )]),
        };

        let response = self.submit(&request).await?;
        let mut emails = collect_emails(&response)?;

        // Large result sets arrive partitioned; fetch the remainder.
        let partitions = response
            .result_set_meta_data
            .as_ref()
            .and_then(|m| m.partition_info.as_ref())
            .map_or(0, Vec::len);
        if partitions > 1 {
            let handle = response.statement_handle.as_deref().ok_or_else(|| {
                RostergapError::warehouse("partitioned result set without a statement handle")
            })?;
            for partition in 1..partitions {
                let part = self.fetch_partition(handle, partition).await?;
                emails.extend(collect_emails(&part)?);
            }
        }

        debug!(records = emails.len(), "retrieved enrollment records");
        Ok(emails)
    }

    async fn submit(&self, request: &StatementRequest) -> RostergapResult<StatementResponse> {
        let url = format!("{}/api/v2/statements", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.token)
            .header(
                "X-Snowflake-Authorization-Token-Type",
                "PROGRAMMATIC_ACCESS_TOKEN",
            )
            .header("User-Agent", concat!("rostergap/", env!("CARGO_PKG_VERSION")))
            .json(request)
            .send()
            .await
            .map_err(|e| RostergapError::warehouse(format!("Failed to reach warehouse: {}", e)))?;

        match response.status() {
            StatusCode::OK => parse_body(response).await,
            // 202: statement is still executing, poll the handle
            StatusCode::ACCEPTED => {
                let pending: StatementResponse = parse_body(response).await?;
                let handle = pending.statement_handle.ok_or_else(|| {
                    RostergapError::warehouse("statement accepted without a handle")
                })?;
                self.poll_statement(&handle).await
            }
            status => Err(status_error(status, response).await),
        }
    }

    /// Polls an asynchronously executing statement until it completes or
    /// the configured timeout elapses.
    async fn poll_statement(&self, handle: &str) -> RostergapResult<StatementResponse> {
        let url = format!("{}/api/v2/statements/{}", self.base_url, handle);
        let deadline = tokio::time::Instant::now() + self.config.statement_timeout();

        loop {
            tokio::time::sleep(POLL_INTERVAL).await;

            let response = self
                .http
                .get(&url)
                .bearer_auth(&self.config.token)
                .header(
                    "X-Snowflake-Authorization-Token-Type",
                    "PROGRAMMATIC_ACCESS_TOKEN",
                )
                .send()
                .await
                .map_err(|e| {
                    RostergapError::warehouse(format!("Failed to poll statement: {}", e))
                })?;

            match response.status() {
                StatusCode::OK => return parse_body(response).await,
                StatusCode::ACCEPTED => {
                    if tokio::time::Instant::now() >= deadline {
                        return Err(RostergapError::warehouse(format!(
                            "statement {} did not complete within {}s",
                            handle, self.config.statement_timeout_secs
                        )));
                    }
                }
                status => return Err(status_error(status, response).await),
            }
        }
    }

    async fn fetch_partition(
        &self,
        handle: &str,
        partition: usize,
    ) -> RostergapResult<StatementResponse> {
        let url = format!(
            "{}/api/v2/statements/{}?partition={}",
            self.base_url,
            handle,
            partition
        );
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.token)
            .header(
                "X-Snowflake-Authorization-Token-Type",
                "PROGRAMMATIC_ACCESS_TOKEN",
            )
            .send()
            .await
            .map_err(|e| {
                RostergapError::warehouse(format!("Failed to fetch partition {}: {}", partition, e))
            })?;

        if response.status() == StatusCode::OK {
            parse_body(response).await
        } else {
            Err(status_error(response.status(), response).await)
        }
    }
}

async fn parse_body(response: reqwest::Response) -> RostergapResult<StatementResponse> {
    response
        .json::<StatementResponse>()
        .await
        .map_err(|e| RostergapError::warehouse(format!("Invalid warehouse response: {}", e)))
}

async fn status_error(status: StatusCode, response: reqwest::Response) -> RostergapError {
    let message = response
        .json::<StatementResponse>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| "no error detail".to_string());
    RostergapError::warehouse(format!("warehouse returned {}: {}", status, message))
}

/// Extracts the single email column from a statement response page.
fn collect_emails(response: &StatementResponse) -> RostergapResult<Vec<String>> {
    let rows = response
        .data
        .as_ref()
        .ok_or_else(|| RostergapError::warehouse("warehouse response missing data"))?;

    Ok(rows
        .iter()
        .filter_map(|row| row.first().and_then(Clone::clone))
        .collect())
}
