use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::discovery::DiscoveryReport;
use crate::policy::Resolution;
use crate::urltree::Method;

use super::AdminState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub policy_version: u64,
}

#[derive(Deserialize)]
pub struct LookupQuery {
    pub method: String,
    pub url: String,
}

#[derive(Deserialize)]
pub struct ObfuscateQuery {
    pub host: String,
    pub path: String,
}

#[derive(Serialize)]
pub struct ObfuscatedPath {
    pub enabled: bool,
    pub path: String,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        policy_version: state.store.version(),
    })
}

pub async fn get_lookup(
    State(state): State<AdminState>,
    Query(query): Query<LookupQuery>,
) -> Json<Resolution> {
    Json(state.dispatcher.resolve(&Method::new(&query.method), &query.url))
}

pub async fn get_discovery(
    State(state): State<AdminState>,
) -> Result<Json<DiscoveryReport>, StatusCode> {
    let discovery = state.discovery.lock().map_err(|_| {
        tracing::error!("Discovery state lock poisoned");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(discovery.report()))
}

/// Preview how a HAR exporter would record `path` under the active policy tree.
pub async fn get_obfuscate(
    State(state): State<AdminState>,
    Query(query): Query<ObfuscateQuery>,
) -> Json<ObfuscatedPath> {
    let snapshot = state.store.load();
    Json(ObfuscatedPath {
        enabled: state.obfuscator.is_enabled(),
        path: state
            .obfuscator
            .obfuscate_path(snapshot.tree.tree(), &query.host, &query.path),
    })
}
