//! Server-side session store.
//!
//! A browser is identified by a random [`SessionId`] carried in the
//! `sourcebox_session` cookie. Everything else (the bearer token, pending
//! flash messages, the cached premium entitlement) stays on the server.
//!
//! Sessions are stored lazily: a request without a cookie gets an ID, but
//! nothing is kept for it until a token or flash message is written.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use parking_lot::RwLock;
use serde::Serialize;

use sourcebox_auth::Entitlement;
use sourcebox_core::{SessionId, WorkspaceKey};

use crate::error::ApiError;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sourcebox_session";

/// Flash message category, mirrored by the UI's alert styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    /// Positive outcome.
    Success,
    /// Failure the user should see.
    Danger,
}

/// A one-shot message shown on the next page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    /// Alert style.
    pub category: FlashCategory,
    /// Message text.
    pub message: String,
}

#[derive(Debug)]
struct SessionData {
    token: Option<String>,
    flashes: Vec<Flash>,
    entitlement: Option<Entitlement>,
    last_seen: Instant,
}

impl SessionData {
    fn new() -> Self {
        Self {
            token: None,
            flashes: Vec::new(),
            entitlement: None,
            last_seen: Instant::now(),
        }
    }
}

/// In-memory session store with idle expiry.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SessionData>>,
    idle: Duration,
}

impl SessionStore {
    /// Create a store whose sessions expire after `idle` without requests.
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle,
        }
    }

    /// Resume the session named by a cookie, or pick an ID for a new one.
    ///
    /// Returns the session ID and whether it names a stored session. New
    /// IDs are not stored until something is written to them.
    pub fn resume(&self, id: Option<SessionId>) -> (SessionId, bool) {
        if let Some(id) = id {
            let mut sessions = self.sessions.write();
            if let Some(data) = sessions.get_mut(&id) {
                if data.last_seen.elapsed() < self.idle {
                    data.last_seen = Instant::now();
                    return (id, true);
                }
                sessions.remove(&id);
            }
        }

        (SessionId::generate(), false)
    }

    /// Whether a session is stored under `id`.
    #[must_use]
    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.read().contains_key(&id)
    }

    /// Move a session's data to a fresh ID and return it. The old ID stops
    /// resolving.
    pub fn rotate(&self, id: SessionId) -> SessionId {
        let mut sessions = self.sessions.write();
        let mut data = sessions.remove(&id).unwrap_or_else(SessionData::new);
        data.last_seen = Instant::now();

        let next = SessionId::generate();
        sessions.insert(next, data);
        next
    }

    fn with<R>(&self, id: SessionId, f: impl FnOnce(&mut SessionData) -> R) -> Option<R> {
        self.sessions.write().get_mut(&id).map(f)
    }

    fn upsert<R>(&self, id: SessionId, f: impl FnOnce(&mut SessionData) -> R) -> R {
        f(self
            .sessions
            .write()
            .entry(id)
            .or_insert_with(SessionData::new))
    }

    /// Get the session's bearer token.
    #[must_use]
    pub fn token(&self, id: SessionId) -> Option<String> {
        self.sessions.read().get(&id).and_then(|d| d.token.clone())
    }

    /// Store a bearer token, replacing any previous one.
    pub fn set_token(&self, id: SessionId, token: String) {
        self.upsert(id, |d| {
            d.token = Some(token);
            d.entitlement = None;
        });
    }

    /// Drop the token and anything derived from it.
    pub fn clear_auth(&self, id: SessionId) {
        self.with(id, |d| {
            d.token = None;
            d.entitlement = None;
        });
    }

    /// Queue a flash message.
    pub fn flash(&self, id: SessionId, category: FlashCategory, message: impl Into<String>) {
        let message = message.into();
        self.upsert(id, |d| d.flashes.push(Flash { category, message }));
    }

    /// Take all pending flash messages.
    #[must_use]
    pub fn take_flashes(&self, id: SessionId) -> Vec<Flash> {
        self.with(id, |d| std::mem::take(&mut d.flashes))
            .unwrap_or_default()
    }

    /// Get the cached entitlement if it is younger than `ttl`.
    #[must_use]
    pub fn entitlement(&self, id: SessionId, ttl: Duration) -> Option<Entitlement> {
        self.sessions
            .read()
            .get(&id)
            .and_then(|d| d.entitlement.clone())
            .filter(|e| e.is_fresh(ttl))
    }

    /// Cache a resolved entitlement.
    pub fn set_entitlement(&self, id: SessionId, entitlement: Entitlement) {
        self.upsert(id, |d| d.entitlement = Some(entitlement));
    }

    /// Remove sessions idle for longer than the expiry and return their IDs.
    pub fn purge_expired(&self) -> Vec<SessionId> {
        let mut sessions = self.sessions.write();
        let expired: Vec<SessionId> = sessions
            .iter()
            .filter(|(_, d)| d.last_seen.elapsed() >= self.idle)
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            sessions.remove(id);
        }
        expired
    }

    /// Get the number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

/// The current request's session.
///
/// Inserted into request extensions by the session layer; handlers take it
/// as an extractor.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    store: Arc<SessionStore>,
}

impl Session {
    /// Bind a session ID to its store.
    #[must_use]
    pub const fn new(id: SessionId, store: Arc<SessionStore>) -> Self {
        Self { id, store }
    }

    /// The session ID.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Move this session to a fresh ID, returning the session under its
    /// new ID.
    #[must_use]
    pub fn rotate(&self) -> Self {
        Self::new(self.store.rotate(self.id), Arc::clone(&self.store))
    }

    /// The key naming this session's scratch directories.
    #[must_use]
    pub fn workspace_key(&self) -> WorkspaceKey {
        WorkspaceKey::for_session(&self.id)
    }

    /// The bearer token, if logged in.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.store.token(self.id)
    }

    /// Store a bearer token.
    pub fn set_token(&self, token: String) {
        self.store.set_token(self.id, token);
    }

    /// Log the session out.
    pub fn clear_auth(&self) {
        self.store.clear_auth(self.id);
    }

    /// Queue a success message.
    pub fn flash_success(&self, message: impl Into<String>) {
        self.store.flash(self.id, FlashCategory::Success, message);
    }

    /// Queue a failure message.
    pub fn flash_danger(&self, message: impl Into<String>) {
        self.store.flash(self.id, FlashCategory::Danger, message);
    }

    /// Take pending flash messages.
    #[must_use]
    pub fn take_flashes(&self) -> Vec<Flash> {
        self.store.take_flashes(self.id)
    }

    /// The cached entitlement, if still fresh.
    #[must_use]
    pub fn entitlement(&self, ttl: Duration) -> Option<Entitlement> {
        self.store.entitlement(self.id, ttl)
    }

    /// Cache an entitlement.
    pub fn set_entitlement(&self, entitlement: Entitlement) {
        self.store.set_entitlement(self.id, entitlement);
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::Internal("session layer not installed".to_string()))
    }
}
