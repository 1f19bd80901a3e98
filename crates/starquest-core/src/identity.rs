//! Identity boundary.
//!
//! The host app owns the login/session lifecycle; the engine only asks "who
//! is playing right now?". Every public entry point is gated on this answer.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Identifier of the acting user, assigned by the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supplies the currently authenticated user, if any.
pub trait IdentityProvider: Send + Sync {
    /// `None` means nobody is logged in and the engine must no-op.
    fn current_user_id(&self) -> Option<UserId>;
}

/// Host-settable identity, also used throughout the tests.
#[derive(Debug, Default)]
pub struct StaticIdentity {
    user: Mutex<Option<UserId>>,
}

impl StaticIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logged_in(user: UserId) -> Self {
        Self {
            user: Mutex::new(Some(user)),
        }
    }

    pub fn set(&self, user: UserId) {
        *self.user.lock().unwrap() = Some(user);
    }

    pub fn clear(&self) {
        *self.user.lock().unwrap() = None;
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<UserId> {
        *self.user.lock().unwrap()
    }
}
