//! REST endpoints for contact submissions.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::warn;

use super::handler::ContactService;

/// Shared state for contact routes.
#[derive(Clone)]
pub struct ContactRouteState {
    pub service: Arc<ContactService>,
}

/// POST /api/contact
///
/// The body is read raw so unparseable JSON gets the pipeline's own
/// "Invalid request payload." response instead of axum's rejection.
async fn submit_contact(State(state): State<ContactRouteState>, body: Bytes) -> Response {
    match state.service.submit(&body).await {
        Ok(accepted) => (StatusCode::CREATED, Json(accepted)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "homecare-contact"
    }))
}

/// Build the contact REST routes.
pub fn contact_routes(service: Arc<ContactService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/contact", post(submit_contact))
        .with_state(ContactRouteState { service })
}

/// Contact routes plus CORS for the public site origin, if one is configured.
pub fn app_router(service: Arc<ContactService>, public_origin: Option<&str>) -> Router {
    let router = contact_routes(service);
    let Some(origin) = public_origin else {
        return router;
    };
    match HeaderValue::from_str(origin) {
        Ok(origin) => router.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        ),
        Err(e) => {
            warn!(origin = origin, error = %e, "Ignoring invalid PUBLIC_SERVER_URL for CORS");
            router
        }
    }
}
