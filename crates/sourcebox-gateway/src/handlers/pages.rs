//! Page endpoints.
//!
//! There is no server-side templating: each page route returns a JSON page
//! model with the pending flash messages and whatever data the page shows.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use sourcebox_auth::AuthApi;
use sourcebox_core::PackKind;
use sourcebox_packs::PackApi;

use crate::auth::AuthUser;
use crate::session::{Flash, Session};
use crate::state::GatewayState;

/// Data for one page render.
#[derive(Debug, Serialize)]
pub struct PageModel {
    /// Page name.
    pub page: &'static str,
    /// Messages queued since the last render.
    pub flashes: Vec<Flash>,
    /// Standard packs, on pages that list them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packs: Option<serde_json::Value>,
    /// Code packs, on pages that list them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_packs: Option<serde_json::Value>,
}

impl PageModel {
    /// A page that shows only flash messages.
    #[must_use]
    pub fn plain(page: &'static str, session: &Session) -> Self {
        Self {
            page,
            flashes: session.take_flashes(),
            packs: None,
            code_packs: None,
        }
    }
}

/// Fetch a pack list for a page. Failures become a flash message and an
/// empty section rather than a failed render.
async fn pack_list<A, P>(
    state: &GatewayState<A, P>,
    user: &AuthUser,
    kind: PackKind,
) -> Option<serde_json::Value>
where
    A: AuthApi,
    P: PackApi,
{
    match state.packs.list_packs(&user.token, kind).await {
        Ok(reply) if reply.is_success() => Some(reply.body),
        Ok(reply) => {
            tracing::info!(kind = ?kind, status = reply.status, "Pack list refused");
            user.session.flash_danger("Failed to load packs");
            None
        }
        Err(e) => {
            tracing::warn!(kind = ?kind, error = %e, "Pack list failed");
            user.session.flash_danger("Failed to load packs");
            None
        }
    }
}

/// `GET /`
pub async fn home(user: AuthUser) -> Json<PageModel> {
    user.session.flash_success("You are already authenticated");
    Json(PageModel::plain("home", &user.session))
}

/// `GET /packman`
pub async fn packman<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    user: AuthUser,
) -> Json<PageModel>
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    let packs = pack_list(&state, &user, PackKind::Standard).await;
    Json(PageModel {
        packs,
        ..PageModel::plain("packman", &user.session)
    })
}

/// `GET /packman-code`
pub async fn packman_code<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    user: AuthUser,
) -> Json<PageModel>
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    let code_packs = pack_list(&state, &user, PackKind::Code).await;
    Json(PageModel {
        code_packs,
        ..PageModel::plain("packman-code", &user.session)
    })
}

/// `GET /del-pack`
pub async fn del_pack<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    user: AuthUser,
) -> Json<PageModel>
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    let packs = pack_list(&state, &user, PackKind::Standard).await;
    let code_packs = pack_list(&state, &user, PackKind::Code).await;
    Json(PageModel {
        packs,
        code_packs,
        ..PageModel::plain("del-pack", &user.session)
    })
}
