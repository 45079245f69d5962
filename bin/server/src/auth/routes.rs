//! Authentication routes for login and callback.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use super::{
    AppState,
    cookies::session_cookie,
    flow::{CallbackParams, FlowError},
};

/// Initiates the OIDC login flow by redirecting to the identity provider.
pub async fn login(State(state): State<Arc<AppState>>) -> Result<Redirect, FlowError> {
    let auth_url = state.flow.begin_login().await?;
    Ok(Redirect::temporary(&auth_url))
}

/// Handles the OIDC callback after the user authenticates with the identity provider.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> Result<impl IntoResponse, FlowError> {
    let issued = state.flow.complete_callback(&params).await?;

    let cookie = session_cookie(&issued.session_id, &state.session_config);
    Ok((
        jar.add(cookie),
        Redirect::temporary(&state.session_config.landing_path),
    ))
}
