//! Report types returned by the warehouse query executor.

use crate::QueryKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One roster row, with the source's original column names preserved.
///
/// Roster exports differ per client, so rows are kept as ordered JSON
/// objects rather than a fixed struct.
pub type RosterRecord = serde_json::Map<String, serde_json::Value>;

/// Bookkeeping about how a report was computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReportMetadata {
    /// Client identifier.
    pub client: String,
    /// Data type queried.
    pub data_type: String,
    /// Number of roster records fetched from the external source.
    pub external_records_total: usize,
    /// Number of enrollment records fetched from the warehouse.
    pub enrolled_records_total: usize,
    /// Column the anti-join matched on, as named in the roster export.
    pub join_column: String,
    /// Company name used in the warehouse query.
    pub company: String,
}

/// A complete computed answer for one logical query key: the roster users
/// not present in the enrollment system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UnenrolledReport {
    /// Number of unenrolled users found.
    pub total_unenrolled_users: usize,
    /// Roster records with no matching enrollment, columns preserved.
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<Object>))]
    pub unenrolled_users: Vec<RosterRecord>,
    /// When the report was computed.
    pub generated_at: DateTime<Utc>,
    /// How the report was computed.
    pub metadata: ReportMetadata,
}

impl UnenrolledReport {
    /// Assembles a report for `key` from the anti-join output.
    #[must_use]
    pub fn new(
        key: &QueryKey,
        unenrolled_users: Vec<RosterRecord>,
        external_records_total: usize,
        enrolled_records_total: usize,
        join_column: String,
    ) -> Self {
        Self {
            total_unenrolled_users: unenrolled_users.len(),
            unenrolled_users,
            generated_at: Utc::now(),
            metadata: ReportMetadata {
                client: key.client().to_string(),
                data_type: key.data_type().to_string(),
                external_records_total,
                enrolled_records_total,
                join_column,
                company: key.client().company_name().to_string(),
            },
        }
    }
}
