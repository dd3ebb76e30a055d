// Session module
// Authenticated user and session lifecycle states

use serde::{Deserialize, Serialize};

/// Durable storage key holding the bearer token.
pub const AUTH_TOKEN_KEY: &str = "authToken";
/// Durable storage key holding the JSON-serialized user.
pub const USER_KEY: &str = "user";
/// Durable storage key holding the login time in epoch milliseconds.
pub const LAST_LOGIN_TIME_KEY: &str = "lastLoginTime";

/// All keys making up one persisted session. They are written and cleared together.
pub const SESSION_KEYS: [&str; 3] = [AUTH_TOKEN_KEY, USER_KEY, LAST_LOGIN_TIME_KEY];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
    pub role: String,
    #[serde(default)]
    pub name: String,
}

impl SessionUser {
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.username
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Uninitialized,
    Loading,
    Authenticated,
    Unauthenticated,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated)
    }
}
