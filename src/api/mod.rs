use crate::config::Config;
use crate::engine::CheckEngine;
use crate::logger::CheckLogger;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;

const JSON_UTF8: &str = "application/json; charset=utf-8";
const CORS_HEADERS: [(HeaderName, &str); 4] = [
    (header::CONTENT_TYPE, JSON_UTF8),
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
    (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
];

pub struct ApiState {
    engine: Arc<CheckEngine>,
    logger: CheckLogger,
    config: Config,
}

impl ApiState {
    pub fn new(engine: Arc<CheckEngine>, logger: CheckLogger, config: Config) -> Arc<Self> {
        Arc::new(Self {
            engine,
            logger,
            config,
        })
    }
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(get_root))
        .route("/check", get(check).post(check).options(preflight))
        .route("/health", get(get_health))
        .route("/config", get(get_config))
        .with_state(state)
}

pub async fn start_api_server(state: Arc<ApiState>, listener: TcpListener) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("API Server listening on http://{}", addr);
    }
    axum::serve(listener, router(state)).await
}

#[derive(Deserialize)]
struct CheckRequest {
    domain: Option<String>,
}

async fn check(
    State(state): State<Arc<ApiState>>,
    method: Method,
    Query(params): Query<Vec<(String, String)>>,
    body: Bytes,
) -> impl IntoResponse {
    // First `domain` pair only; repeated keys are not an error.
    let mut domain = params
        .into_iter()
        .find(|(key, _)| key == "domain")
        .map(|(_, value)| value)
        .unwrap_or_default();

    // Query parameter wins; an undecodable body is ignored.
    if method == Method::POST && domain.is_empty() {
        if let Ok(req) = serde_json::from_slice::<CheckRequest>(&body) {
            domain = req.domain.unwrap_or_default();
        }
    }

    let result = state.engine.check(&domain).await;
    state.logger.log(&result);
    (CORS_HEADERS, Json(result))
}

async fn preflight() -> impl IntoResponse {
    (StatusCode::OK, CORS_HEADERS)
}

async fn get_health() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, JSON_UTF8)],
        Json(serde_json::json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().timestamp(),
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

async fn get_config(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let snapshot = state.engine.store().snapshot();
    (
        [(header::CONTENT_TYPE, JSON_UTF8)],
        Json(serde_json::json!({
            "dns_servers": snapshot.resolvers(),
            "blocked_ips": snapshot.sentinels(),
            "server_location": snapshot.location(),
            "hot_reload": state.config.reload.enable,
        })),
    )
}

async fn get_root(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let snapshot = state.engine.store().snapshot();
    (
        [(header::CONTENT_TYPE, JSON_UTF8)],
        Json(serde_json::json!({
            "name": "Blockcheck API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Checks whether a domain is blocked by DNS by resolving it through regulator resolvers",
            "endpoints": {
                "GET /check?domain={domain}": "Check the block status of a domain",
                "POST /check": "Same as GET, with a {\"domain\": ...} JSON body",
                "GET /health": "API health status",
                "GET /config": "Show the active configuration",
            },
            "dns_servers": snapshot.resolvers(),
            "blocked_ips": snapshot.sentinels(),
            "features": {
                "hot_reload": state.config.reload.enable,
                "config_file": state.config.reload.env_file,
                "reload_interval_ms": state.config.reload.interval_ms,
                "lookup_timeout_ms": state.config.lookup_timeout_ms,
            },
        })),
    )
}
