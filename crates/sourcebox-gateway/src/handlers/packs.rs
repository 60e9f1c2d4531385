//! Pack publishing endpoints.
//!
//! Creation is validated locally and must be confirmed with `201` by the
//! remote API. Listing and deletion relay the remote status and wrap the
//! remote body in a `{"message", "data"}` envelope.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use sourcebox_auth::AuthApi;
use sourcebox_core::{Pack, PackId, PackKind};
use sourcebox_packs::{PackApi, RemoteReply};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::MessageResponse;
use crate::state::GatewayState;

/// Request to publish a pack.
///
/// `pack_name` and `docs` are accepted for clients of the older
/// `web_pack` endpoint.
#[derive(Debug, Deserialize)]
pub struct CreatePackBody {
    /// Pack name.
    #[serde(default, alias = "pack_name")]
    pub name: Option<String>,
    /// Entries to bundle, forwarded without reshaping.
    #[serde(default, alias = "docs")]
    pub contents: Vec<serde_json::Value>,
}

async fn publish<A, P>(
    state: &GatewayState<A, P>,
    user: &AuthUser,
    kind: PackKind,
    body: CreatePackBody,
) -> Result<Response, ApiError>
where
    A: AuthApi,
    P: PackApi,
{
    let pack = Pack::new(body.name.unwrap_or_default(), body.contents);
    pack.validate()?;

    let data = state.packs.create_pack(&user.token, kind, &pack).await?;
    user.session.flash_success("Pack created successfully");

    let response = MessageResponse {
        message: "Pack created successfully".to_string(),
        data: Some(data),
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Relay a remote reply with the uniform envelope.
fn relay(reply: RemoteReply, success: &str, failure: &str) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);

    let message = if reply.is_success() {
        success.to_string()
    } else {
        reply
            .body
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| failure.to_string(), ToString::to_string)
    };

    let response = MessageResponse {
        message,
        data: Some(reply.body),
    };
    (status, Json(response)).into_response()
}

fn parse_pack_id(raw: &str) -> Result<PackId, ApiError> {
    raw.parse::<PackId>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// `POST /packman/package_pack`
///
/// # Example
///
/// ```text
/// POST /packman/package_pack
/// {"name": "demo", "contents": [{"filename": "a.txt", "content": "hello"}]}
///
/// Response: 201 Created
/// {"message": "Pack created successfully", "data": <remote body>}
/// ```
pub async fn package_pack<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    user: AuthUser,
    Json(body): Json<CreatePackBody>,
) -> Result<Response, ApiError>
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    publish(&state, &user, PackKind::Standard, body).await
}

/// `POST /packman-code/package_code_pack`
pub async fn package_code_pack<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    user: AuthUser,
    Json(body): Json<CreatePackBody>,
) -> Result<Response, ApiError>
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    publish(&state, &user, PackKind::Code, body).await
}

/// `GET /packman/list_packs`
pub async fn list_packs<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    user: AuthUser,
) -> Result<Response, ApiError>
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    let reply = state.packs.list_packs(&user.token, PackKind::Standard).await?;
    Ok(relay(reply, "Packs retrieved successfully", "Failed to retrieve packs"))
}

/// `GET /packman-code/list_code_packs`
pub async fn list_code_packs<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    user: AuthUser,
) -> Result<Response, ApiError>
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    let reply = state.packs.list_packs(&user.token, PackKind::Code).await?;
    Ok(relay(
        reply,
        "Code packs retrieved successfully",
        "Failed to retrieve code packs",
    ))
}

/// `DELETE /delete_pack/{id}`
pub async fn delete_pack<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError>
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    let id = parse_pack_id(&id)?;
    let reply = state
        .packs
        .delete_pack(&user.token, PackKind::Standard, id)
        .await?;
    Ok(relay(reply, "Pack deleted successfully", "Failed to delete pack"))
}

/// `DELETE /delete_code_pack/{id}`
pub async fn delete_code_pack<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, ApiError>
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    let id = parse_pack_id(&id)?;
    let reply = state.packs.delete_pack(&user.token, PackKind::Code, id).await?;
    Ok(relay(
        reply,
        "Code pack deleted successfully",
        "Failed to delete code pack",
    ))
}
