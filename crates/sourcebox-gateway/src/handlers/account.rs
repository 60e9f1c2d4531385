//! Login, registration and logout.
//!
//! Credentials are forwarded to the remote auth API; only the returned
//! bearer token is kept, in the server-side session. Outcomes are reported
//! as flash messages followed by a redirect.

use std::sync::Arc;

use axum::extract::{FromRequest, Request, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use sourcebox_auth::{AuthApi, AuthError, LoginRequest, RegisterRequest};
use sourcebox_ingest::RetryPolicy;
use sourcebox_packs::PackApi;

use crate::auth::session_cookie;
use crate::handlers::pages::PageModel;
use crate::handlers::FormOrJson;
use crate::session::Session;
use crate::state::GatewayState;

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// User's email address.
    #[serde(default)]
    pub email: String,
    /// User's password.
    #[serde(default)]
    pub password: String,
}

/// Registration form.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    /// User's email address.
    #[serde(default)]
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub username: String,
    /// Chosen password.
    #[serde(default)]
    pub password: String,
}

/// Message to flash for a failed remote call.
fn failure_message(err: &AuthError, fallback: &str) -> String {
    match err {
        AuthError::Rejected { message, .. } => message.clone(),
        _ => fallback.to_string(),
    }
}

/// `GET /login`
pub async fn login_page(session: Session) -> Json<PageModel> {
    Json(PageModel::plain("login", &session))
}

/// `POST /login`
///
/// A successful login moves the session to a fresh ID and cookie. Scratch
/// directories of the previous ID are deleted.
pub async fn login<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    session: Session,
    jar: CookieJar,
    FormOrJson(form): FormOrJson<LoginForm>,
) -> Response
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    let request = LoginRequest {
        email: form.email,
        password: form.password,
    };

    match state.auth.login(request).await {
        Ok(login) => {
            let previous = session.workspace_key();
            let session = session.rotate();
            session.set_token(login.access_token);
            session.flash_success("Logged in successfully!");
            tracing::info!(session_id = %session.id(), "User logged in");

            if let Err(e) = state
                .workspaces
                .clear(previous, RetryPolicy::CHECKOUT, RetryPolicy::ONCE)
                .await
            {
                tracing::warn!(workspace = %previous, error = %e, "Failed to clear previous workspace");
            }
            state.workspaces.release(previous);

            let jar = jar.add(session_cookie(session.id(), state.config.cookie_secure));
            (jar, Redirect::to("/packman")).into_response()
        }
        Err(e) => {
            tracing::info!(session_id = %session.id(), error = %e, "Login failed");
            session.flash_danger(failure_message(&e, "Login failed"));
            Redirect::to("/login").into_response()
        }
    }
}

/// `GET /register`
pub async fn register_page<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    session: Session,
) -> Response
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    match &state.config.signup_url {
        Some(url) => Redirect::to(url).into_response(),
        None => Json(PageModel::plain("register", &session)).into_response(),
    }
}

/// `POST /register`
pub async fn register<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    session: Session,
    request: Request,
) -> Response
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    if let Some(url) = &state.config.signup_url {
        return Redirect::to(url).into_response();
    }

    let form = match FormOrJson::<RegisterForm>::from_request(request, &()).await {
        Ok(FormOrJson(form)) => form,
        Err(e) => return e.into_response(),
    };

    let request = RegisterRequest {
        email: form.email,
        username: form.username,
        password: form.password,
    };

    match state.auth.register(request).await {
        Ok(_) => {
            session.flash_success("User registered successfully!");
            Redirect::to("/login").into_response()
        }
        Err(e) => {
            tracing::info!(error = %e, "Registration failed");
            session.flash_danger(failure_message(&e, "Registration failed"));
            Redirect::to("/register").into_response()
        }
    }
}

/// `GET /logout`
pub async fn logout(session: Session) -> Redirect {
    session.clear_auth();
    session.flash_success("Logged out successfully!");
    tracing::info!(session_id = %session.id(), "User logged out");
    Redirect::to("/")
}
