//! Unenrolled users controller.

use crate::{
    responses::{ok, ApiResult},
    state::AppState,
};
use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use rostergap_core::{Client, DataType, QueryKey, ReportMetadata, RosterRecord, UnenrolledReport};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

/// Creates the unenrolled users router.
pub fn router() -> Router<AppState> {
    Router::new().route("/unenrolled", get(get_unenrolled))
}

/// Query parameters for the unenrolled users endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct UnenrolledQuery {
    /// Client identifier (e.g. `parana`).
    pub client: String,
    /// Data type to query (e.g. `students`).
    pub data_type: String,
}

/// Unenrolled users report as returned over HTTP.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnenrolledReportResponse {
    /// Report status.
    pub status: String,
    /// Number of unenrolled users found.
    pub total_unenrolled_users: usize,
    /// Roster records with no matching enrollment, columns preserved.
    #[schema(value_type = Vec<Object>)]
    pub unenrolled_users: Vec<RosterRecord>,
    /// When the report was computed. Served from cache, this is the
    /// computation time, not the request time.
    pub timestamp: DateTime<Utc>,
    /// How the report was computed.
    pub metadata: ReportMetadata,
}

impl UnenrolledReportResponse {
    fn from_report(report: &UnenrolledReport) -> Self {
        Self {
            status: "success".to_string(),
            total_unenrolled_users: report.total_unenrolled_users,
            unenrolled_users: report.unenrolled_users.clone(),
            timestamp: report.generated_at,
            metadata: report.metadata.clone(),
        }
    }
}

/// Get the unenrolled users report for a client and data type.
#[utoipa::path(
    get,
    path = "/unenrolled",
    tag = "unenrolled",
    params(UnenrolledQuery),
    responses(
        (status = 200, description = "Unenrolled users report", body = UnenrolledReportResponse),
        (status = 400, description = "Unknown client or unsupported combination"),
        (status = 502, description = "Warehouse or roster source failure")
    )
)]
pub async fn get_unenrolled(
    State(state): State<AppState>,
    Query(query): Query<UnenrolledQuery>,
) -> ApiResult<UnenrolledReportResponse> {
    debug!(
        client = %query.client,
        data_type = %query.data_type,
        "unenrolled users request"
    );

    // Validation happens before the cache is ever consulted.
    let client: Client = query.client.parse()?;
    let data_type: DataType = query.data_type.parse()?;
    let key = QueryKey::new(client, data_type)?;

    let report = state.report_service.unenrolled_report(key).await?;
    ok(UnenrolledReportResponse::from_report(&report))
}
