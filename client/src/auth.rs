//! Session handling for the client.
//!
//! Persistence is behind the [`SessionStore`] port so platforms can plug in
//! whatever storage they have (keychain, browser storage, a dotfile). The
//! in-memory [`AuthSession`] is the single source of truth while running.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::UserKind;

/// Credentials and identity carried across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub token: String,
    pub actor_id: Uuid,
    pub actor_kind: UserKind,
}

/// Durable storage for the session.
#[cfg_attr(test, mockall::automock)]
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Option<StoredSession>;
    fn save(&self, session: &StoredSession);
    fn clear(&self);
}

/// Current session, shared across transports.
pub struct AuthSession {
    store: Arc<dyn SessionStore>,
    current: RwLock<Option<StoredSession>>,
}

impl AuthSession {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            current: RwLock::new(None),
        }
    }

    /// Load a persisted session, if any. Returns whether one was found.
    pub fn restore(&self) -> bool {
        let restored = self.store.load();
        let found = restored.is_some();
        if let Ok(mut current) = self.current.write() {
            *current = restored;
        }
        found
    }

    /// Replace the session and persist it.
    pub fn set(&self, session: StoredSession) {
        self.store.save(&session);
        if let Ok(mut current) = self.current.write() {
            *current = Some(session);
        }
    }

    /// Drop the session and wipe persisted state.
    pub fn clear(&self) {
        self.store.clear();
        if let Ok(mut current) = self.current.write() {
            *current = None;
        }
    }

    /// Bearer token for outgoing requests.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.current
            .read()
            .ok()
            .and_then(|current| current.as_ref().map(|s| s.token.clone()))
    }

    /// Identity of the signed-in actor.
    #[must_use]
    pub fn actor(&self) -> Option<(Uuid, UserKind)> {
        self.current
            .read()
            .ok()
            .and_then(|current| current.as_ref().map(|s| (s.actor_id, s.actor_kind)))
    }
}
