//! Unified error types for all layers of the application.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for all layers of rostergap.
///
/// Variants fall into three groups: validation errors (rejected before the
/// cache is ever consulted), upstream errors (warehouse or roster source
/// failures, surfaced but never cached), and internal errors.
#[derive(Error, Debug)]
pub enum RostergapError {
    // ============ Validation Errors ============
    /// Generic validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Client identifier is not in the supported set
    #[error("Unsupported client: {client}. Supported clients: {supported}")]
    UnsupportedClient { client: String, supported: String },

    /// Data type is not supported for the given client
    #[error("Unsupported data_type '{data_type}' for client '{client}'. Supported data_types: {supported}")]
    UnsupportedDataType {
        client: String,
        data_type: String,
        supported: String,
    },

    // ============ Upstream Errors ============
    /// Enrollment warehouse unreachable or query failed
    #[error("Warehouse error: {0}")]
    Warehouse(String),

    /// Roster export source unreachable or returned bad data
    #[error("Roster source error for client {client}: {message}")]
    RosterSource { client: String, message: String },

    // ============ Internal Errors ============
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Cache bookkeeping error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RostergapError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_)
            | Self::UnsupportedClient { .. }
            | Self::UnsupportedDataType { .. } => 400,
            Self::Warehouse(_) | Self::RosterSource { .. } => 502,
            Self::Configuration(_) | Self::Cache(_) | Self::Internal(_) | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::UnsupportedClient { .. } => "UNSUPPORTED_CLIENT",
            Self::UnsupportedDataType { .. } => "UNSUPPORTED_DATA_TYPE",
            Self::Warehouse(_) => "WAREHOUSE_ERROR",
            Self::RosterSource { .. } => "ROSTER_SOURCE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// True when the failure came from an upstream dependency rather than
    /// the request itself. Upstream failures may succeed on retry and must
    /// never be cached as a positive result.
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(self, Self::Warehouse(_) | Self::RosterSource { .. })
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a warehouse error.
    #[must_use]
    pub fn warehouse<T: Into<String>>(message: T) -> Self {
        Self::Warehouse(message.into())
    }

    /// Creates a roster source error.
    #[must_use]
    pub fn roster_source<C: Into<String>, M: Into<String>>(client: C, message: M) -> Self {
        Self::RosterSource {
            client: client.into(),
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Rebuilds an owned copy of this error, for delivering one failure to
    /// several concurrent waiters sharing a computation. The opaque `Other`
    /// variant collapses into `Internal` with the same message.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        match self {
            Self::Validation(m) => Self::Validation(m.clone()),
            Self::UnsupportedClient { client, supported } => Self::UnsupportedClient {
                client: client.clone(),
                supported: supported.clone(),
            },
            Self::UnsupportedDataType {
                client,
                data_type,
                supported,
            } => Self::UnsupportedDataType {
                client: client.clone(),
                data_type: data_type.clone(),
                supported: supported.clone(),
            },
            Self::Warehouse(m) => Self::Warehouse(m.clone()),
            Self::RosterSource { client, message } => Self::RosterSource {
                client: client.clone(),
                message: message.clone(),
            },
            Self::Configuration(m) => Self::Configuration(m.clone()),
            Self::Cache(m) => Self::Cache(m.clone()),
            Self::Internal(m) => Self::Internal(m.clone()),
            Self::Other(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for RostergapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

/// Serializable error response for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    /// Creates a new error response from a `RostergapError`.
    #[must_use]
    pub fn from_error(error: &RostergapError) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
        }
    }
}

impl From<&RostergapError> for ErrorResponse {
    fn from(error: &RostergapError) -> Self {
        Self::from_error(error)
    }
}
