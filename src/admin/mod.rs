//! Admin API.
//!
//! Every route requires `Authorization: Bearer <admin.api_key>`.

pub mod auth;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::discovery::Discovery;
use crate::lifecycle::Shutdown;
use crate::obfuscation::PathObfuscator;
use crate::policy::{PolicyDispatcher, PolicyStore};

use self::auth::admin_auth_middleware;
use self::handlers::{get_discovery, get_lookup, get_obfuscate, get_status};

/// State shared by admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub store: Arc<PolicyStore>,
    pub dispatcher: PolicyDispatcher,
    pub discovery: Arc<Mutex<Discovery>>,
    pub obfuscator: Arc<PathObfuscator>,
    pub api_key: Arc<str>,
}

impl AdminState {
    pub fn new(
        store: Arc<PolicyStore>,
        discovery: Arc<Mutex<Discovery>>,
        obfuscator: PathObfuscator,
        api_key: &str,
    ) -> Self {
        Self {
            dispatcher: PolicyDispatcher::new(store.clone()),
            store,
            discovery,
            obfuscator: Arc::new(obfuscator),
            api_key: Arc::from(api_key),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/lookup", get(get_lookup))
        .route("/admin/discovery", get(get_discovery))
        .route("/admin/obfuscate", get(get_obfuscate))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the admin API until `shutdown` fires.
pub async fn serve(state: AdminState, addr: SocketAddr, shutdown: Shutdown) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %listener.local_addr()?, "Admin API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(shutdown.wait())
        .await?;

    tracing::info!("Admin API stopped");
    Ok(())
}
