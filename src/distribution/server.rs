//! Minimal code-distribution server.
//!
//! Serves capability definitions over HTTP so satellites can resolve them on
//! first use. Definitions are fixed at startup.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::distribution::definition::CapabilityDefinition;

/// Definitions published by a code server, keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct DefinitionStore {
    definitions: BTreeMap<String, CapabilityDefinition>,
}

impl DefinitionStore {
    pub fn new(definitions: impl IntoIterator<Item = CapabilityDefinition>) -> Self {
        Self {
            definitions: definitions
                .into_iter()
                .map(|def| (def.id.clone(), def))
                .collect(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(crate::distribution::definition::default_definitions())
    }

    pub fn get(&self, id: &str) -> Option<&CapabilityDefinition> {
        self.definitions.get(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.definitions.keys().cloned().collect()
    }
}

/// Build the router serving a definition store.
pub fn code_server_routes(store: Arc<DefinitionStore>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/capabilities", get(list_capabilities))
        .route("/capabilities/{id}", get(get_capability))
        .with_state(store)
}

/// Serve definitions on an already-bound listener until the process ends.
pub async fn serve(listener: TcpListener, store: Arc<DefinitionStore>) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(addr = %addr, capabilities = store.ids().len(), "Code server listening");
    axum::serve(listener, code_server_routes(store)).await
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "satellite-codeserver"
    }))
}

async fn list_capabilities(State(store): State<Arc<DefinitionStore>>) -> impl IntoResponse {
    Json(serde_json::json!({ "capabilities": store.ids() }))
}

async fn get_capability(
    State(store): State<Arc<DefinitionStore>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match store.get(&id) {
        Some(def) => {
            debug!(capability = %id, "Serving capability definition");
            (StatusCode::OK, Json(serde_json::json!(def)))
        }
        None => {
            debug!(capability = %id, "Unknown capability requested");
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Capability not found"})),
            )
        }
    }
}
