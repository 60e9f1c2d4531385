//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use sourcebox_auth::AuthApi;
use sourcebox_packs::PackApi;

use crate::auth::{session_gate, session_layer};
use crate::handlers::{account, bucket, files, health, packs, pages, preview, repo};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `GET|POST /login` - Login page and login
/// - `GET|POST /register` - Registration (or redirect to the sign-up page)
/// - `GET /logout` - Logout
///
/// ## Pages (logged in)
/// - `GET /`, `GET /packman`, `GET /packman-code`, `GET /del-pack`
///
/// ## Packs (logged in)
/// - `POST /packman/package_pack` - Publish a standard pack
/// - `POST /packman-code/package_code_pack` - Publish a code pack
/// - `GET /packman/list_packs` - List standard packs
/// - `GET /packman-code/list_code_packs` - List code packs
/// - `DELETE /delete_pack/{id}` - Delete a standard pack
/// - `DELETE /delete_code_pack/{id}` - Delete a code pack
///
/// ## Ingestion (logged in)
/// - `POST /packman/preview_link`, `POST /packman/preview_file`
/// - `POST /read-files`
/// - `POST /upload-file`, `POST /fetch-repo`, `POST /clear-repo`
/// - `GET /get-repo-file-content?filename=...`
///
/// ## S3 (premium)
/// - `POST /aws-single-file`, `POST /aws-bucket-dump`, `GET /read-bucket-dump`
pub fn create_router<A, P>(state: GatewayState<A, P>) -> Router
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    Router::new()
        // Public
        .route("/health", get(health::health::<A, P>))
        .route(
            "/login",
            get(account::login_page).post(account::login::<A, P>),
        )
        .route(
            "/register",
            get(account::register_page::<A, P>).post(account::register::<A, P>),
        )
        .route("/logout", get(account::logout))
        // Pages
        .route("/", get(pages::home))
        .route("/packman", get(pages::packman::<A, P>))
        .route("/packman-code", get(pages::packman_code::<A, P>))
        .route("/del-pack", get(pages::del_pack::<A, P>))
        // Packs
        .route("/packman/package_pack", post(packs::package_pack::<A, P>))
        .route(
            "/packman-code/package_code_pack",
            post(packs::package_code_pack::<A, P>),
        )
        .route("/packman/list_packs", get(packs::list_packs::<A, P>))
        .route(
            "/packman-code/list_code_packs",
            get(packs::list_code_packs::<A, P>),
        )
        .route("/delete_pack/{id}", delete(packs::delete_pack::<A, P>))
        .route(
            "/delete_code_pack/{id}",
            delete(packs::delete_code_pack::<A, P>),
        )
        // Previews
        .route("/packman/preview_link", post(preview::preview_link::<A, P>))
        .route("/packman/preview_file", post(preview::preview_file::<A, P>))
        // Files and repository checkout
        .route("/read-files", post(files::read_files::<A, P>))
        .route("/upload-file", post(files::upload_file::<A, P>))
        .route("/fetch-repo", post(repo::fetch_repo::<A, P>))
        .route("/clear-repo", post(repo::clear_repo::<A, P>))
        .route(
            "/get-repo-file-content",
            get(repo::get_repo_file_content::<A, P>),
        )
        // S3 (premium)
        .route("/aws-single-file", post(bucket::aws_single_file::<A, P>))
        .route("/aws-bucket-dump", post(bucket::aws_bucket_dump::<A, P>))
        .route("/read-bucket-dump", get(bucket::read_bucket_dump::<A, P>))
        // Session handling: the gate runs inside the session layer
        .layer(from_fn_with_state(
            Arc::clone(&state),
            session_gate::<A, P>,
        ))
        .layer(from_fn_with_state(
            Arc::clone(&state),
            session_layer::<A, P>,
        ))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        // Session cookies need credentialed requests, which rule out `Any`.
        CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(true)
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
            ])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    }
}
