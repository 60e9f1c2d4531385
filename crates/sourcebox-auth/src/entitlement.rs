//! Premium entitlement lookup.
//!
//! The remote API exposes premium status as two sequential calls: resolve
//! the user id behind a token, then fetch that user's premium flag. The
//! result is packaged as an [`Entitlement`] that callers may keep for a
//! short time instead of repeating both calls on every gated request.

use std::time::{Duration, Instant};

use crate::client::AuthApi;
use crate::error::{AuthError, Result};

/// A resolved premium claim for one bearer token.
#[derive(Debug, Clone)]
pub struct Entitlement {
    /// Remote user id the claim belongs to.
    pub user_id: String,
    /// Whether the user holds a premium subscription.
    pub premium: bool,
    /// When the claim was resolved.
    pub checked_at: Instant,
}

impl Entitlement {
    /// Whether the claim is younger than `ttl`.
    #[must_use]
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.checked_at.elapsed() < ttl
    }

    /// Fail with `NotPremium` unless the claim grants premium access.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotPremium` for non-premium users.
    pub fn require_premium(&self) -> Result<()> {
        if self.premium {
            Ok(())
        } else {
            Err(AuthError::NotPremium)
        }
    }
}

/// Resolve the premium entitlement for a token.
///
/// # Errors
///
/// Propagates the first failing remote call; either step answering with a
/// non-200 status denies access.
pub async fn resolve_entitlement<A>(api: &A, token: &str) -> Result<Entitlement>
where
    A: AuthApi + ?Sized,
{
    let user_id = api.user_id(token).await?;
    let premium = api.premium_status(token, &user_id).await?;

    tracing::debug!(user_id = %user_id, premium, "Resolved premium entitlement");

    Ok(Entitlement {
        user_id,
        premium,
        checked_at: Instant::now(),
    })
}
