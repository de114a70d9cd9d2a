//! HTTP access boundary for the organizations directory.
//!
//! # Responsibility
//! - Authenticate every request against the shared API key.
//! - Translate routes into directory queries and shape JSON responses.
//!
//! # Invariants
//! - Credential checks run before any handler, so rejected requests never
//!   touch the store.
//! - Every query runs on a blocking thread with its own store handle.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use log::{info, warn};
use std::time::Instant;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use state::AppState;

/// Build the directory router with credential and request-log layers.
///
/// Used by [`serve`] and available for integration testing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/organizations/by_building/{building_id}",
            get(routes::organizations::by_building),
        )
        .route(
            "/organizations/by_activity/{activity_id}",
            get(routes::organizations::by_activity),
        )
        .route(
            "/organizations/by_location",
            get(routes::organizations::by_location),
        )
        .route("/organizations/search", get(routes::organizations::search))
        .route(
            "/organizations/{org_id}",
            get(routes::organizations::get_organization),
        )
        .route("/activities/search", get(routes::activities::search))
        .route("/activities/tree", get(routes::activities::tree))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Bind `config.bind` and serve until Ctrl-C.
pub async fn serve(config: ServerConfig) -> std::io::Result<()> {
    let state = AppState::new(config.db_path.clone(), config.api_key);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(
        "event=http_listen module=api status=ok addr={} db_path={}",
        listener.local_addr()?,
        config.db_path.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=http_shutdown module=api status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("event=http_shutdown module=api status=error error={err}");
        std::future::pending::<()>().await;
    }
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started_at = Instant::now();

    let response = next.run(req).await;
    info!(
        "event=http_request module=api method={} path={} status={} duration_ms={}",
        method,
        path,
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}
