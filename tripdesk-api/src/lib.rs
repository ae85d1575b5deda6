use axum::{
    routing::get,
    Router,
    Json,
    http::{HeaderName, Method},
    extract::{ConnectInfo, State},
    response::IntoResponse,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use std::net::SocketAddr;
use tripdesk_core::cache::rate_limit_cache_key;

pub mod admin;
pub mod bookings;
pub mod error;
pub mod memberships;
pub mod metrics;
pub mod middleware;
pub mod products;
pub mod state;
pub mod trips;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
            HeaderName::from_static("idempotency-key"),
        ]);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics::metrics_handler))
        .merge(trips::routes())
        .merge(products::routes())
        .merge(memberships::routes())
        .merge(bookings::routes())
        .merge(admin::routes(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Fixed window per client IP. Requests without a peer address (in-process
/// callers) and cache outages pass through.
async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, impl IntoResponse> {
    let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>().copied() else {
        return Ok(next.run(req).await);
    };

    let key = rate_limit_cache_key(&addr.ip().to_string());
    let limit = state.business_rules.rate_limit_per_minute;

    match state.cache.check_rate_limit(&key, limit, 60).await {
        Ok(true) => Ok(next.run(req).await),
        Ok(false) => {
            state.metrics.rate_limited.inc();
            Err((axum::http::StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded"))
        }
        Err(e) => {
            tracing::warn!("Rate limiter unavailable, failing open: {}", e);
            Ok(next.run(req).await)
        }
    }
}
