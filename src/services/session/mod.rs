//! Session guard.
//!
//! Decides whether the user is signed in. A persisted session is accepted
//! only if it is younger than the local age ceiling and the server still
//! accepts its token. While authenticated the token is re-checked on a
//! repeating timer: a confirmed rejection ends the session, a transport
//! failure does not.
//!
//! Time is always passed in (`*_at` methods) so the update loop and the tests
//! drive the same code. Token checks are split into a `begin`/`due` half that
//! hands out the token and a `finish` half that takes the server's answer, so
//! the request itself can run off the UI thread.

mod lockout;
mod login;
mod timer;

pub use lockout::{format_countdown, LockoutCountdown, LockoutTick};
pub use login::{Credentials, LoginFlow, LoginOutcome};
pub use timer::RepeatingTimer;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::models::session::{
    AuthState, SessionUser, AUTH_TOKEN_KEY, LAST_LOGIN_TIME_KEY, SESSION_KEYS, USER_KEY,
};
use crate::models::settings::AppConfig;
use crate::services::api::{ApiResult, AuthApi};
use crate::services::storage::DurableStorage;

struct PersistedSession {
    token: String,
    user: SessionUser,
    logged_in_at: DateTime<Utc>,
}

pub struct SessionGuard<S: DurableStorage> {
    storage: S,
    state: AuthState,
    user: Option<SessionUser>,
    token: Option<String>,
    max_age: Duration,
    revalidation: RepeatingTimer,
    /// Stored session waiting for the server to accept its token.
    restoring: Option<PersistedSession>,
}

impl<S: DurableStorage> SessionGuard<S> {
    pub fn new(storage: S, config: &AppConfig) -> Self {
        Self::with_limits(storage, config.max_session_age(), config.revalidate_interval())
    }

    pub fn with_limits(storage: S, max_age: Duration, revalidate_every: Duration) -> Self {
        Self {
            storage,
            state: AuthState::Uninitialized,
            user: None,
            token: None,
            max_age,
            revalidation: RepeatingTimer::new(revalidate_every),
            restoring: None,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    /// True until the persisted session has been checked.
    pub fn is_loading(&self) -> bool {
        matches!(self.state, AuthState::Uninitialized | AuthState::Loading)
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn is_revalidation_scheduled(&self) -> bool {
        self.revalidation.is_running()
    }

    /// Time until the next re-validation, for repaint scheduling.
    pub fn next_revalidation_in(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        self.revalidation.next_due_in(now)
    }

    /// Restores the persisted session, if it is still valid.
    pub fn initialize_at<A: AuthApi + ?Sized>(&mut self, now: DateTime<Utc>, api: &A) -> AuthState {
        match self.begin_initialize_at(now) {
            Some(token) => self.finish_initialize_at(now, api.verify_token(&token)),
            None => self.state,
        }
    }

    /// Reads the stored session and applies the age ceiling. Returns the token
    /// the server must accept before the session is restored; `None` means the
    /// guard has already settled on unauthenticated.
    pub fn begin_initialize_at(&mut self, now: DateTime<Utc>) -> Option<String> {
        self.state = AuthState::Loading;

        let persisted = match self.read_persisted() {
            Ok(Some(persisted)) => persisted,
            Ok(None) => {
                log::info!("No stored session");
                self.end_session();
                return None;
            }
            Err(err) => {
                log::warn!("Discarding unreadable stored session: {:#}", err);
                self.end_session();
                return None;
            }
        };

        if now - persisted.logged_in_at > self.max_age {
            log::info!(
                "Stored session for '{}' is older than {} hours; signing out",
                persisted.user.username,
                self.max_age.num_hours()
            );
            self.end_session();
            return None;
        }

        let token = persisted.token.clone();
        self.restoring = Some(persisted);
        Some(token)
    }

    /// Takes the server's answer for the token from [`Self::begin_initialize_at`].
    /// Any failure, including an unreachable server, purges the stored session.
    pub fn finish_initialize_at(&mut self, now: DateTime<Utc>, result: ApiResult<()>) -> AuthState {
        let Some(persisted) = self.restoring.take() else {
            return self.state;
        };

        match result {
            Ok(()) => {
                log::info!("Restored session for '{}'", persisted.user.username);
                self.enter_authenticated(persisted.token, persisted.user, now);
            }
            Err(err) => {
                log::warn!("Stored session rejected: {}", err);
                self.end_session();
            }
        }

        self.state
    }

    /// Runs a due re-validation. Returns true when the session ended.
    pub fn tick_at<A: AuthApi + ?Sized>(&mut self, now: DateTime<Utc>, api: &A) -> bool {
        match self.due_revalidation_at(now) {
            Some(token) => {
                let result = api.verify_token(&token);
                self.finish_revalidation(&token, result)
            }
            None => false,
        }
    }

    /// Returns the token to re-check when the timer is due.
    pub fn due_revalidation_at(&mut self, now: DateTime<Utc>) -> Option<String> {
        if !self.is_authenticated() || !self.revalidation.poll(now) {
            return None;
        }
        self.token.clone()
    }

    /// Takes the server's answer for a re-check of `token`. Returns true when
    /// the session ended. Answers for a token that is no longer current are
    /// ignored.
    pub fn finish_revalidation(&mut self, token: &str, result: ApiResult<()>) -> bool {
        if !self.is_authenticated() || self.token.as_deref() != Some(token) {
            log::debug!("Ignoring re-validation result for a replaced session");
            return false;
        }

        match result {
            Ok(()) => {
                log::debug!("Session token re-validated");
                false
            }
            Err(err) if err.is_rejection() => {
                log::warn!("Session token no longer accepted: {}", err);
                self.logout();
                true
            }
            Err(err) => {
                log::warn!("Skipping session re-validation: {}", err);
                false
            }
        }
    }

    /// Enters the authenticated state and persists the session. The in-memory
    /// session stands even if persisting fails; the error is returned so the
    /// caller can warn that it will not survive a restart.
    pub fn login_at(&mut self, now: DateTime<Utc>, token: String, user: SessionUser) -> Result<()> {
        let user_json = serde_json::to_string(&user).context("Failed to serialize user")?;
        let entries = [
            (AUTH_TOKEN_KEY, token.clone()),
            (USER_KEY, user_json),
            (LAST_LOGIN_TIME_KEY, now.timestamp_millis().to_string()),
        ];

        log::info!("Signed in as '{}'", user.username);
        self.enter_authenticated(token, user, now);
        self.storage
            .set_all(&entries)
            .context("Failed to persist session")
    }

    /// Signs out and removes the persisted session. Safe to call repeatedly.
    pub fn logout(&mut self) {
        if self.is_authenticated() {
            log::info!("Signed out");
        }
        self.end_session();
    }

    /// Stops the re-validation timer without touching the session.
    pub fn shutdown(&mut self) {
        self.revalidation.cancel();
    }

    fn enter_authenticated(&mut self, token: String, user: SessionUser, now: DateTime<Utc>) {
        self.token = Some(token);
        self.user = Some(user);
        self.state = AuthState::Authenticated;
        self.revalidation.start(now);
    }

    fn end_session(&mut self) {
        self.revalidation.cancel();
        self.restoring = None;
        self.token = None;
        self.user = None;
        self.state = AuthState::Unauthenticated;

        if let Err(err) = self.storage.remove_all(&SESSION_KEYS) {
            log::error!("Failed to clear stored session: {:#}", err);
        }
    }

    fn read_persisted(&self) -> Result<Option<PersistedSession>> {
        let token = self.storage.get(AUTH_TOKEN_KEY)?;
        let user = self.storage.get(USER_KEY)?;
        let logged_in_at = self.storage.get(LAST_LOGIN_TIME_KEY)?;

        let (Some(token), Some(user), Some(logged_in_at)) = (token, user, logged_in_at) else {
            return Ok(None);
        };

        let user: SessionUser =
            serde_json::from_str(&user).context("Stored user is not valid JSON")?;
        let millis: i64 = logged_in_at
            .trim()
            .parse()
            .context("Stored login time is not a number")?;
        let logged_in_at = Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| anyhow!("Stored login time {} is out of range", millis))?;

        Ok(Some(PersistedSession {
            token,
            user,
            logged_in_at,
        }))
    }
}
