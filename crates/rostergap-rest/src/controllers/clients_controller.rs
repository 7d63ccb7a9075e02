//! Client registry controller.

use crate::{
    responses::{ok, ApiResult},
    state::AppState,
};
use axum::{routing::get, Router};
use rostergap_core::{supported_clients, ClientInfo};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Creates the clients router.
pub fn router() -> Router<AppState> {
    Router::new().route("/clients", get(list_clients))
}

/// Supported clients and their data types.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientsResponse {
    /// Number of supported clients.
    pub total: usize,
    /// Per-client metadata.
    pub clients: Vec<ClientInfo>,
}

/// List supported clients, their data types, and roster sources.
#[utoipa::path(
    get,
    path = "/clients",
    tag = "clients",
    responses(
        (status = 200, description = "Supported clients", body = ClientsResponse)
    )
)]
pub async fn list_clients() -> ApiResult<ClientsResponse> {
    let clients = supported_clients();
    ok(ClientsResponse {
        total: clients.len(),
        clients,
    })
}
