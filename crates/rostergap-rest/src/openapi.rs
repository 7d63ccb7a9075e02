//! OpenAPI documentation configuration.

use crate::controllers::clients_controller::ClientsResponse;
use crate::controllers::health_controller::{HealthResponse, ServiceInfo};
use crate::controllers::unenrolled_controller::UnenrolledReportResponse;
use rostergap_core::{Client, ClientInfo, DataType, ErrorResponse, ReportMetadata, SourceKind};
use utoipa::OpenApi;

/// OpenAPI documentation for the rostergap API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rostergap API",
        version = "0.1.0",
        description = "Reports roster users missing from the enrollment system",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    paths(
        crate::controllers::unenrolled_controller::get_unenrolled,
        crate::controllers::clients_controller::list_clients,
        crate::controllers::health_controller::health_check,
        crate::controllers::health_controller::liveness_check,
    ),
    components(
        schemas(
            Client,
            DataType,
            SourceKind,
            ClientInfo,
            ErrorResponse,
            ReportMetadata,
            UnenrolledReportResponse,
            ClientsResponse,
            HealthResponse,
            ServiceInfo,
        )
    ),
    tags(
        (name = "unenrolled", description = "Unenrolled users reports"),
        (name = "clients", description = "Supported client registry"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;
