// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, patch, post, put},
};
use tokio_util::sync::CancellationToken;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use wolfpack_config::WolfpackConfig;
use wolfpack_core::WolfpackError;
use wolfpack_pack::Pack;

use crate::auth::auth_middleware;
use crate::handlers;
use crate::ws;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The assembled pack services.
    pub pack: Arc<Pack>,
    /// Upper bound on one admission, geofence and store write included.
    pub admission_timeout: Duration,
    /// Process start time for uptime reporting.
    pub start_time: std::time::Instant,
}

impl GatewayState {
    pub fn new(pack: Arc<Pack>, admission_timeout: Duration) -> Self {
        Self {
            pack,
            admission_timeout,
            start_time: std::time::Instant::now(),
        }
    }

    /// State with the admission timeout taken from `[membership]`.
    pub fn from_config(pack: Arc<Pack>, config: &WolfpackConfig) -> Self {
        Self::new(
            pack,
            Duration::from_millis(config.membership.admission_timeout_ms),
        )
    }
}

/// Gateway server configuration (mirrors `GatewayConfig` from wolfpack-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Requests served at once before callers queue.
    pub max_concurrent_requests: usize,
}

impl From<&wolfpack_config::model::GatewayConfig> for ServerConfig {
    fn from(cfg: &wolfpack_config::model::GatewayConfig) -> Self {
        Self {
            host: cfg.host.clone(),
            port: cfg.port,
            max_concurrent_requests: cfg.max_concurrent_requests,
        }
    }
}

/// Build the full router: public health, authenticated API, and WebSocket.
pub fn build_router(state: GatewayState, max_concurrent_requests: usize) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/v1/locations", get(handlers::list_locations))
        .route("/v1/locations/{id}/admit", post(handlers::admit))
        .route("/v1/locations/{id}/presence", get(handlers::list_presence))
        .route("/v1/locations/{id}/access", post(handlers::check_access))
        .route(
            "/v1/locations/{id}/interactions",
            post(handlers::send_interaction),
        )
        .route(
            "/v1/locations/{id}/messages",
            post(handlers::post_message).get(handlers::list_messages),
        )
        .route("/v1/locations/{id}/broadcasts", post(handlers::broadcast))
        .route(
            "/v1/locations/{id}/polls/{poll}/votes",
            post(handlers::cast_vote),
        )
        .route("/v1/locations/{id}/events", get(handlers::list_events))
        .route("/v1/sessions/{id}", get(handlers::get_session))
        .route("/v1/sessions/{id}/heartbeat", post(handlers::heartbeat))
        .route("/v1/sessions/{id}/leave", post(handlers::leave))
        .route("/v1/sessions/{id}/profile", patch(handlers::update_profile))
        .route("/v1/sessions/{id}/position", put(handlers::update_position))
        .route("/v1/inbox", get(handlers::inbox))
        .route("/v1/interactions/{id}/read", post(handlers::mark_read))
        .route("/v1/messages/{id}/delete", post(handlers::delete_message))
        .route("/v1/messages/{id}/flag", post(handlers::flag_message))
        .route("/v1/polls/{poll}", get(handlers::tally))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state.clone());

    // WebSocket auth happens during the handshake, not via middleware.
    let ws_routes = Router::new()
        .route("/ws", get(ws::ws_handler))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .merge(ws_routes)
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrent_requests.max(1)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP/WebSocket server and serve until `cancel` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), WolfpackError> {
    let app = build_router(state, config.max_concurrent_requests);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| WolfpackError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| WolfpackError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_from_gateway_section() {
        let gateway = wolfpack_config::model::GatewayConfig::default();
        let config = ServerConfig::from(&gateway);
        assert_eq!(config.port, gateway.port);
        let debug = format!("{config:?}");
        assert!(debug.contains(&gateway.host));
    }
}
