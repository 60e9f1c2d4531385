//! Session middleware and authentication extractors.
//!
//! Two middleware layers run in front of every route:
//!
//! 1. [`session_layer`] resumes the browser session named by the cookie,
//!    or starts a new one. The cookie is only set once the new session
//!    has been stored, so cookie-less requests leave nothing behind.
//! 2. [`session_gate`] validates the session's bearer token against the
//!    remote API once per request, except on public routes. Failures
//!    redirect to `/login` with a flash message.
//!
//! Handlers then take [`AuthUser`] (any logged-in user) or [`PremiumUser`]
//! (premium subscribers only) as extractors.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use sourcebox_auth::{resolve_entitlement, AuthApi, Entitlement};
use sourcebox_core::{SessionId, WorkspaceKey};
use sourcebox_packs::PackApi;

use crate::error::ApiError;
use crate::session::{Session, SESSION_COOKIE};
use crate::state::GatewayState;

/// Paths reachable without a valid token.
fn is_public(path: &str) -> bool {
    matches!(path, "/login" | "/register" | "/logout" | "/health") || path.starts_with("/static/")
}

/// Build the session cookie for `id`.
pub(crate) fn session_cookie(id: SessionId, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Resume or start the browser session and expose it to handlers.
pub async fn session_layer<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    let cookie_id = jar
        .get(SESSION_COOKIE)
        .and_then(|c| c.value().parse::<SessionId>().ok());

    let (id, existing) = state.sessions.resume(cookie_id);
    request
        .extensions_mut()
        .insert(Session::new(id, Arc::clone(&state.sessions)));

    let response = next.run(request).await;

    if !existing && state.sessions.contains(id) {
        let cookie = session_cookie(id, state.config.cookie_secure);
        (jar.add(cookie), response).into_response()
    } else {
        response
    }
}

/// Validate the session's token before any non-public route.
pub async fn session_gate<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    mut request: Request,
    next: Next,
) -> Response
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    if is_public(request.uri().path()) {
        return next.run(request).await;
    }

    let Some(session) = request.extensions().get::<Session>().cloned() else {
        return ApiError::Internal("session layer not installed".to_string()).into_response();
    };

    let Some(token) = session.token() else {
        session.flash_danger("You need to login first");
        return Redirect::to("/login").into_response();
    };

    match state.auth.whoami(&token).await {
        Ok(()) => {
            request.extensions_mut().insert(AuthUser { token, session });
            next.run(request).await
        }
        Err(e) => {
            tracing::info!(
                session_id = %session.id(),
                error = %e,
                path = %request.uri().path(),
                "Session token rejected"
            );
            session.clear_auth();
            session.flash_danger("Session expired, please login again");
            Redirect::to("/login").into_response()
        }
    }
}

/// A user whose token passed the session gate on this request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The validated bearer token.
    pub token: String,
    /// The user's session.
    pub session: Session,
}

impl AuthUser {
    /// The key naming this user's scratch directories.
    #[must_use]
    pub fn workspace_key(&self) -> WorkspaceKey {
        self.session.workspace_key()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }
}

/// A logged-in user holding a premium subscription.
///
/// The two-step premium lookup runs at most once per cache period; the
/// result is kept on the session.
#[derive(Debug, Clone)]
pub struct PremiumUser {
    /// The underlying user.
    pub user: AuthUser,
    /// The entitlement that granted access.
    pub entitlement: Entitlement,
}

impl<A, P> FromRequestParts<Arc<GatewayState<A, P>>> for PremiumUser
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<GatewayState<A, P>>,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let ttl = state.config.premium_cache();

        let entitlement = match user.session.entitlement(ttl) {
            Some(cached) => cached,
            None => {
                let resolved = resolve_entitlement(state.auth.as_ref(), &user.token)
                    .await
                    .map_err(|e| {
                        tracing::info!(error = %e, "Premium lookup failed");
                        ApiError::Forbidden
                    })?;
                user.session.set_entitlement(resolved.clone());
                resolved
            }
        };

        entitlement.require_premium()?;
        Ok(Self { user, entitlement })
    }
}
