//! CORS for the browser frontend.

use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::CorsLayer;

use super::request_id::REQUEST_ID_HEADER;

/// Allow the configured frontend origin, with cookies.
///
/// `origin` is validated by [`crate::config`]; an origin that still fails to
/// parse as a header value yields a layer that allows no origin at all.
#[must_use]
pub fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .allow_credentials(true);

    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(e) => {
            tracing::error!(error = %e, origin, "Frontend origin is not a valid header value");
            layer
        }
    }
}
