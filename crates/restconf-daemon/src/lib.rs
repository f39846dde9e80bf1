//! The RESTCONF HTTP dispatcher: URL routing, the browser handler, SSE
//! notification delivery, and the ambient middleware stack (request id,
//! logging, rate limiting, CORS) wrapped around a single axum router.

pub mod browser_handler;
pub mod car_device;
pub mod dispatch;
pub mod middleware;
pub mod sse;
pub mod validation;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower::ServiceBuilder;

pub use dispatch::AppState;

/// Builds the daemon's axum [`Router`]. Every RESTCONF path is handled by
/// a single fallback (mirroring the manual segment-shifting dispatch the
/// protocol's reference server uses), wrapped in request-id, logging,
/// rate-limiting, and CORS layers.
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = middleware::CorsConfig::default().to_cors_layer();
    let rate_limiter = middleware::RateLimiterLayer::new(middleware::RateLimiter::new(600, Duration::from_secs(60)));

    Router::new()
        .fallback(dispatch::dispatch)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_id_middleware))
                .layer(axum::middleware::from_fn(middleware::request_logger_middleware))
                .layer(rate_limiter)
                .layer(cors),
        )
        .with_state(state)
}
