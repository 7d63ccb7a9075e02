//! Client for fetching roster exports.
//!
//! Each supported (client, data type) combination maps to a JSON export
//! URL published by the client's source system (Google Sheets, Google
//! Drive, or FTP mirror). The export is a JSON array of flat objects;
//! column names are preserved exactly as the source publishes them.

use rostergap_config::RosterConfig;
use rostergap_core::{QueryKey, RosterRecord, RostergapError, RostergapResult};
use tracing::{debug, info};

/// Fetches roster exports for supported (client, data type) combinations.
pub struct RosterClient {
    http: reqwest::Client,
    config: RosterConfig,
}

impl RosterClient {
    /// Creates a new roster client.
    pub fn new(config: RosterConfig) -> RostergapResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .build()
            .map_err(|e| {
                RostergapError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { http, config })
    }

    /// Fetches the roster export for a query key as a list of records.
    pub async fn fetch_roster(&self, key: &QueryKey) -> RostergapResult<Vec<RosterRecord>> {
        let url = self.config.export_url(key).ok_or_else(|| {
            RostergapError::Configuration(format!("No roster export configured for {}", key))
        })?;

        info!(key = %key, source = %key.client().source_kind(), "fetching roster export");

        let response = self.http.get(url).send().await.map_err(|e| {
            RostergapError::roster_source(
                key.client().to_string(),
                format!("Failed to fetch roster export: {}", e),
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RostergapError::roster_source(
                key.client().to_string(),
                format!("roster export returned {}", status),
            ));
        }

        let records: Vec<RosterRecord> = response.json().await.map_err(|e| {
            RostergapError::roster_source(key.client().to_string(), format!("Invalid roster export: {}", e))
        })?;

        debug!(key = %key, records = records.len(), "roster export fetched");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rostergap_core::{Client, DataType};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_with_export(server: &MockServer, key: &QueryKey) -> RosterClient {
        let mut config = RosterConfig::default();
        config.exports.insert(
            key.to_string(),
            format!("{}/exports/{}.json", server.uri(), key),
        );
        RosterClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_roster_parses_records() {
        let server = MockServer::start().await;
        let key = QueryKey::new(Client::Parana, DataType::Students).unwrap();

        Mock::given(method("GET"))
            .and(path("/exports/parana/students.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "Email": "a@x.com", "Nome": "Ana" },
                { "Email": "b@x.com", "Nome": "Bia" }
            ])))
            .mount(&server)
            .await;

        let client = client_with_export(&server, &key);
        let records = client.fetch_roster(&key).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["Nome"], serde_json::json!("Ana"));
    }

    #[tokio::test]
    async fn test_fetch_roster_missing_export_is_configuration_error() {
        let key = QueryKey::new(Client::Goias, DataType::TeachersTec).unwrap();
        let client = RosterClient::new(RosterConfig::default()).unwrap();

        let err = client.fetch_roster(&key).await.unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[tokio::test]
    async fn test_fetch_roster_http_error_is_roster_source_error() {
        let server = MockServer::start().await;
        let key = QueryKey::new(Client::MatoGrosso, DataType::Teachers).unwrap();

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_with_export(&server, &key);
        let err = client.fetch_roster(&key).await.unwrap_err();
        assert_eq!(err.error_code(), "ROSTER_SOURCE_ERROR");
        assert_eq!(err.status_code(), 502);
    }

    #[tokio::test]
    async fn test_fetch_roster_invalid_payload_is_roster_source_error() {
        let server = MockServer::start().await;
        let key = QueryKey::new(Client::Goias, DataType::Students).unwrap();

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_with_export(&server, &key);
        let err = client.fetch_roster(&key).await.unwrap_err();
        assert_eq!(err.error_code(), "ROSTER_SOURCE_ERROR");
    }
}
