//! Application state for Axum handlers.

use rostergap_service::UnenrolledReportService;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub report_service: Arc<dyn UnenrolledReportService>,
}

impl AppState {
    /// Creates a new application state.
    #[must_use]
    pub fn new(report_service: Arc<dyn UnenrolledReportService>) -> Self {
        Self { report_service }
    }
}
