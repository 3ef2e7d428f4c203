//! Grocery Backend
//!
//! Layered on the `grocery` client library:
//! - routes: HTTP handlers (health, items, auth)
//! - state: Shared store and auth handles
//! - config: Environment-driven settings

use std::net::SocketAddr;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use config::Config;
use routes::{
    add_item, delete_item, health, list_items, login, logout, sign_up, toggle_item,
};
use state::AppState;

/// Build the application router. Without a store only the health endpoint
/// is served.
pub fn router(state: Option<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new().route("/", get(health));
    let app = match state {
        Some(state) => app.nest("/api", api_routes(state)),
        None => app,
    };

    app.layer(TraceLayer::new_for_http()).layer(cors)
}

fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/items", get(list_items).post(add_item))
        .route("/items/:id", delete(delete_item))
        .route("/items/:id/toggle", patch(toggle_item))
        .route("/auth/signup", post(sign_up))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .with_state(state)
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let state = config.store.map(AppState::remote);
    if state.is_none() {
        warn!("API routes disabled");
    }
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
