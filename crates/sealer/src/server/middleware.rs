//! Axum middleware layers applied to the router.
//!
//! Includes request tracing, timeout enforcement, CORS, and response compression.

use std::time::Duration;

use tower_http::cors::CorsLayer;

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// CORS policy: any origin, method and header.
pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}
