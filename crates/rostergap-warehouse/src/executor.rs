//! The warehouse query executor: one expensive, side-effect-free
//! computation per query key.

use crate::anti_join::{anti_join, apply_eja_filter, find_email_column, normalize_enrolled};
use crate::roster::RosterClient;
use crate::snowflake::SnowflakeClient;
use async_trait::async_trait;
use rostergap_core::{Client, DataType, QueryKey, RostergapError, RostergapResult, UnenrolledReport};
use tracing::{info, instrument};

/// Computes the unenrolled-users report for a query key.
///
/// Implementations must be safe to call concurrently for different keys;
/// the query cache guarantees at most one in-flight call per key.
#[async_trait]
pub trait WarehouseExecutor: Send + Sync {
    /// Runs the full computation for `key`. The key is already validated
    /// against the supported-combination registry.
    async fn execute(&self, key: &QueryKey) -> RostergapResult<UnenrolledReport>;
}

/// Production executor: fetches the client's roster export and the
/// warehouse enrollment emails, then anti-joins them.
pub struct SnowflakeExecutor {
    snowflake: SnowflakeClient,
    roster: RosterClient,
}

impl SnowflakeExecutor {
    /// Creates an executor over the given clients.
    #[must_use]
    pub const fn new(snowflake: SnowflakeClient, roster: RosterClient) -> Self {
        Self { snowflake, roster }
    }
}

#[async_trait]
impl WarehouseExecutor for SnowflakeExecutor {
    #[instrument(skip(self), fields(key = %key))]
    async fn execute(&self, key: &QueryKey) -> RostergapResult<UnenrolledReport> {
        let roster = self.roster.fetch_roster(key).await?;
        let external_total = roster.len();

        // Adult-education students are tracked outside the enrollment
        // system and must not be reported as unenrolled.
        let roster = if key.client() == Client::Goias && key.data_type() == DataType::Students {
            apply_eja_filter(roster)
        } else {
            roster
        };

        let email_column = roster
            .first()
            .and_then(|record| find_email_column(record.keys().map(String::as_str)))
            .map(ToString::to_string)
            .ok_or_else(|| {
                RostergapError::roster_source(
                    key.client().to_string(),
                    "roster export has no email column",
                )
            })?;

        let enrolled_raw = self
            .snowflake
            .fetch_enrolled_emails(key.client().company_name())
            .await?;
        let enrolled_total = enrolled_raw.len();
        let enrolled = normalize_enrolled(&enrolled_raw);

        let unenrolled = anti_join(roster, &enrolled, &email_column);

        info!(
            key = %key,
            external = external_total,
            enrolled = enrolled_total,
            unenrolled = unenrolled.len(),
            "unenrolled report computed"
        );

        Ok(UnenrolledReport::new(
            key,
            unenrolled,
            external_total,
            enrolled_total,
            email_column,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rostergap_config::{RosterConfig, WarehouseConfig};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn executor_for(server: &MockServer, key: &QueryKey) -> SnowflakeExecutor {
        let warehouse = WarehouseConfig {
            account: "org-acct".to_string(),
            user: "svc".to_string(),
            token: "pat-token".to_string(),
            warehouse: "COMPUTE_WH".to_string(),
            database: "ANALYTICS".to_string(),
            enrollment_table: "ANALYTICS.PUBLIC.ENROLLMENTS".to_string(),
            statement_timeout_secs: 2,
        };
        let snowflake = SnowflakeClient::with_base_url(warehouse, server.uri()).unwrap();

        let mut roster_config = RosterConfig::default();
        roster_config
            .exports
            .insert(key.to_string(), format!("{}/roster.json", server.uri()));
        let roster = RosterClient::new(roster_config).unwrap();

        SnowflakeExecutor::new(snowflake, roster)
    }

    fn mock_enrollment(emails: &[&str]) -> ResponseTemplate {
        let data: Vec<Vec<&str>> = emails.iter().map(|e| vec![*e]).collect();
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "statementHandle": "h-1",
            "resultSetMetaData": {
                "numRows": emails.len(),
                "partitionInfo": [{ "rowCount": emails.len() }]
            },
            "data": data
        }))
    }

    #[tokio::test]
    async fn test_execute_reports_unenrolled_users() {
        let server = MockServer::start().await;
        let key = QueryKey::new(Client::Parana, DataType::Students).unwrap();

        Mock::given(method("GET"))
            .and(path("/roster.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "E-mail": "Enrolled@X.com", "Nome": "Ana" },
                { "E-mail": "missing@x.com", "Nome": "Bia" }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v2/statements"))
            .respond_with(mock_enrollment(&["enrolled@x.com"]))
            .mount(&server)
            .await;

        let executor = executor_for(&server, &key);
        let report = executor.execute(&key).await.unwrap();

        assert_eq!(report.total_unenrolled_users, 1);
        assert_eq!(report.unenrolled_users[0]["Nome"], serde_json::json!("Bia"));
        assert_eq!(report.metadata.join_column, "E-mail");
        assert_eq!(report.metadata.external_records_total, 2);
        assert_eq!(report.metadata.enrolled_records_total, 1);
        assert_eq!(report.metadata.company, "SEED-PR: Parana");
    }

    #[tokio::test]
    async fn test_execute_applies_eja_filter_for_goias_students() {
        let server = MockServer::start().await;
        let key = QueryKey::new(Client::Goias, DataType::Students).unwrap();

        Mock::given(method("GET"))
            .and(path("/roster.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "Email": "eja@x.com", "Composição": "EJA - Noturno" },
                { "Email": "regular@x.com", "Composição": "Regular" }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v2/statements"))
            .respond_with(mock_enrollment(&[]))
            .mount(&server)
            .await;

        let executor = executor_for(&server, &key);
        let report = executor.execute(&key).await.unwrap();

        // The EJA row is excluded even though it is not enrolled either.
        assert_eq!(report.total_unenrolled_users, 1);
        assert_eq!(
            report.unenrolled_users[0]["Email"],
            serde_json::json!("regular@x.com")
        );
    }

    #[tokio::test]
    async fn test_execute_rejects_roster_without_email_column() {
        let server = MockServer::start().await;
        let key = QueryKey::new(Client::MatoGrosso, DataType::Teachers).unwrap();

        Mock::given(method("GET"))
            .and(path("/roster.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "Nome": "Ana", "Turma": "A" }
            ])))
            .mount(&server)
            .await;

        let executor = executor_for(&server, &key);
        let err = executor.execute(&key).await.unwrap_err();
        assert_eq!(err.error_code(), "ROSTER_SOURCE_ERROR");
        assert!(err.to_string().contains("no email column"));
    }

    #[tokio::test]
    async fn test_execute_propagates_warehouse_failure() {
        let server = MockServer::start().await;
        let key = QueryKey::new(Client::Parana, DataType::Teachers).unwrap();

        Mock::given(method("GET"))
            .and(path("/roster.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "Email": "a@x.com" }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v2/statements"))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "message": "warehouse suspended"
            })))
            .mount(&server)
            .await;

        let executor = executor_for(&server, &key);
        let err = executor.execute(&key).await.unwrap_err();
        assert_eq!(err.error_code(), "WAREHOUSE_ERROR");
        assert!(err.is_upstream());
    }
}
