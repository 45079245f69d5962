//! HTTP routing.

use axum::{
    Json, Router,
    http::Uri,
    middleware,
    routing::get,
};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState, AuthenticatedSession};
use keyward_identity::IdentityClaims;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/dashboard", get(dashboard))
        .route("/dashboard/{*path}", get(dashboard))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/auth/login", get(auth::login))
        .route("/auth/callback", get(auth::callback))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn index() -> &'static str {
    "keyward\n\nYou are not signed in. Visit /auth/login to sign in.\n"
}

/// What a signed-in user sees: the profile captured at login and the claims
/// of the access token as verified for this request.
#[derive(Debug, Serialize)]
struct DashboardView {
    path: String,
    username: String,
    email: String,
    signed_in_at: String,
    claims: IdentityClaims,
}

async fn dashboard(session: AuthenticatedSession, uri: Uri) -> Json<DashboardView> {
    let AuthenticatedSession { record, claims, .. } = session;
    Json(DashboardView {
        path: uri.path().to_string(),
        username: record.user_info.username,
        email: record.user_info.email,
        signed_in_at: record.created_at.to_rfc3339(),
        claims,
    })
}
