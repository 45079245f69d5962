//! Authentication middleware and extractors for Axum.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use super::{
    AppState,
    cookies::{SESSION_COOKIE, cleared_session_cookie},
    guard::{AuthenticatedSession, GuardRejection},
};
use crate::config::SessionConfig;

/// Gate for protected routes.
///
/// Runs the session guard and, on success, stores the
/// [`AuthenticatedSession`] in the request extensions for the handler.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
    match state.guard.authenticate(cookie.as_deref()).await {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(rejection) => AuthRejection::new(rejection, &state.session_config).into_response(),
    }
}

impl<S> FromRequestParts<S> for AuthenticatedSession
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<AuthenticatedSession>() {
            return Ok(session.clone());
        }

        // Route not behind `require_session`: run the guard here.
        let app_state = Arc::<AppState>::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
        app_state
            .guard
            .authenticate(cookie.as_deref())
            .await
            .map_err(|rejection| AuthRejection::new(rejection, &app_state.session_config))
    }
}

/// Response for a request the session guard turned away.
#[derive(Debug)]
pub struct AuthRejection {
    reason: GuardRejection,
    config: SessionConfig,
}

impl AuthRejection {
    fn new(reason: GuardRejection, config: &SessionConfig) -> Self {
        Self {
            reason,
            config: config.clone(),
        }
    }

    /// The guard outcome behind this rejection.
    #[must_use]
    pub fn reason(&self) -> GuardRejection {
        self.reason
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        if self.reason == GuardRejection::Unavailable {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable",
            )
                .into_response();
        }

        let redirect = Redirect::temporary(&self.config.login_redirect);
        if self.reason.clears_cookie() {
            let jar = CookieJar::new().add(cleared_session_cookie(&self.config));
            (jar, redirect).into_response()
        } else {
            redirect.into_response()
        }
    }
}
