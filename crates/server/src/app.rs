//! Router assembly.
//!
//! [`router`] builds everything except the session layer and the Sentry
//! layers, which the binary adds around it. Tests wrap the same router in a
//! session layer over an in-memory store.

use std::time::Duration;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn,
    routing::get,
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{cors_layer, request_id_middleware, security_headers_middleware};
use crate::routes;
use crate::state::AppState;

/// Build the API router with its middleware stack.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config().frontend_origin);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use axum::body::Body;
    use axum::http::{Request, header};
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::session::{Id, Record};
    use tower_sessions::{MemoryStore, SessionStore};

    use wayfarer_core::splitting::ShareBasis;
    use wayfarer_core::{Email, UserId, UserRole};

    use super::*;
    use crate::config::ServerConfig;
    use crate::middleware::configure_session_layer;
    use crate::middleware::session::SESSION_COOKIE_NAME;
    use crate::models::{CurrentUser, session_keys};

    fn test_config() -> ServerConfig {
        ServerConfig {
            database_url: SecretString::from("postgres://wayfarer@localhost/wayfarer_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            frontend_origin: "http://localhost:4200".to_string(),
            split_basis: ShareBasis::AllMembers,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// The router over a pool that never connects. Requests rejected before
    /// any query runs are all these tests send.
    fn app(store: MemoryStore) -> Router {
        let config = test_config();
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://wayfarer@localhost/wayfarer_test")
            .unwrap();
        router(AppState::new(config, pool)).layer(configure_session_layer(store, false))
    }

    async fn session_cookie(store: &MemoryStore, role: UserRole) -> String {
        let user = CurrentUser {
            id: UserId::new(7),
            email: Email::parse("ana@example.com").unwrap(),
            display_name: "Ana".to_string(),
            role,
        };
        let mut record = Record {
            id: Id::default(),
            data: HashMap::from([(
                session_keys::CURRENT_USER.to_string(),
                serde_json::to_value(&user).unwrap(),
            )]),
            expiry_date: tower_sessions::cookie::time::OffsetDateTime::now_utc()
                + tower_sessions::cookie::time::Duration::hours(1),
        };
        store.create(&mut record).await.unwrap();
        format!("{SESSION_COOKIE_NAME}={}", record.id)
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(MemoryStore::default())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_protected_route_requires_session() {
        let response = app(MemoryStore::default())
            .oneshot(Request::builder().uri("/trips").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_admin_routes_reject_regular_users() {
        let store = MemoryStore::default();
        let cookie = session_cookie(&store, UserRole::User).await;

        let response = app(store)
            .oneshot(
                Request::builder()
                    .uri("/admin/stats")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert_eq!(body["error"], "forbidden");
    }

    #[tokio::test]
    async fn test_admin_routes_require_session() {
        let response = app(MemoryStore::default())
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/admin/users/3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_profile_update_is_rejected_before_the_database() {
        let store = MemoryStore::default();
        let cookie = session_cookie(&store, UserRole::User).await;

        let response = app(store)
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/users/me")
                    .header(header::COOKIE, cookie)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"display_name": "   "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["message"], "display name cannot be empty");
    }

    #[tokio::test]
    async fn test_invalid_amount_is_a_json_bad_request() {
        let store = MemoryStore::default();
        let cookie = session_cookie(&store, UserRole::User).await;

        let response = app(store)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/trips/1/expenses")
                    .header(header::COOKIE, cookie)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"description": "Taxi", "amount": "12.345"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = json_body(response).await;
        assert_eq!(body["error"], "bad_request");
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .contains("at most 2 decimal places")
        );
    }

    #[tokio::test]
    async fn test_missing_json_content_type_is_a_json_bad_request() {
        let store = MemoryStore::default();
        let cookie = session_cookie(&store, UserRole::User).await;

        let response = app(store)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/trips")
                    .header(header::COOKIE, cookie)
                    .body(Body::from("name=Lisbon"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_unparseable_path_id_is_a_json_bad_request() {
        let store = MemoryStore::default();
        let cookie = session_cookie(&store, UserRole::User).await;

        let response = app(store)
            .oneshot(
                Request::builder()
                    .uri("/trips/abc")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "bad_request");
        assert!(body["message"].as_str().unwrap().contains("abc"));
    }
}
