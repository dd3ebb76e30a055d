use chrono::{DateTime, Duration, Utc};

use super::{LockoutCountdown, LockoutTick, SessionGuard};
use crate::services::api::{ApiResult, AuthApi, LockStatus, LoginReply};
use crate::services::storage::DurableStorage;

pub const MISSING_CREDENTIALS: &str = "Please enter both username and password";
pub const LOGIN_FAILED: &str = "Login failed";
pub const CONNECTION_ERROR: &str = "Connection error, please try again later";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials accepted; the guard is now authenticated.
    SignedIn,
    /// Rejected locally; nothing was sent.
    MissingCredentials,
    /// A sign-in request is already waiting for the server.
    InFlight,
    Denied,
    Locked,
    Failed,
}

/// Trimmed credentials taken from the form for one sign-in request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Login form state: credentials, the last error and the lockout countdown.
#[derive(Debug, Default)]
pub struct LoginFlow {
    pub username: String,
    pub password: String,
    error: Option<String>,
    lockout: LockoutCountdown,
    lockout_secs: Option<i64>,
    submitting: bool,
}

impl LoginFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_locked(&self) -> bool {
        self.lockout.is_active()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Seconds left on the lockout as of the last tick.
    pub fn lockout_remaining_secs(&self) -> Option<i64> {
        self.lockout_secs
    }

    pub fn submit_at<S, A>(
        &mut self,
        now: DateTime<Utc>,
        guard: &mut SessionGuard<S>,
        api: &A,
    ) -> LoginOutcome
    where
        S: DurableStorage,
        A: AuthApi + ?Sized,
    {
        let credentials = match self.begin_submit() {
            Ok(credentials) => credentials,
            Err(outcome) => return outcome,
        };

        let reply = api.login(&credentials.username, &credentials.password);
        self.finish_submit_at(now, guard, &credentials.username, reply)
    }

    /// Checks the fields and marks the form as submitting.
    pub fn begin_submit(&mut self) -> Result<Credentials, LoginOutcome> {
        if self.submitting {
            return Err(LoginOutcome::InFlight);
        }

        let username = self.username.trim().to_string();
        if username.is_empty() || self.password.is_empty() {
            self.error = Some(MISSING_CREDENTIALS.to_string());
            return Err(LoginOutcome::MissingCredentials);
        }

        self.submitting = true;
        Ok(Credentials {
            username,
            password: self.password.clone(),
        })
    }

    /// Takes the server's answer to the request from [`Self::begin_submit`].
    pub fn finish_submit_at<S: DurableStorage>(
        &mut self,
        now: DateTime<Utc>,
        guard: &mut SessionGuard<S>,
        username: &str,
        reply: ApiResult<LoginReply>,
    ) -> LoginOutcome {
        self.submitting = false;

        match reply {
            Ok(LoginReply::Granted(grant)) => {
                if let Err(err) = guard.login_at(now, grant.token, grant.user) {
                    log::error!("{:#}", err);
                }
                self.password.clear();
                self.error = None;
                self.clear_lockout();
                LoginOutcome::SignedIn
            }
            Ok(LoginReply::Denied {
                message,
                remaining_attempts,
            }) => {
                log::warn!("Login for '{}' denied", username);
                self.error = Some(denied_message(message, remaining_attempts));
                LoginOutcome::Denied
            }
            Ok(LoginReply::Locked {
                message,
                remaining_minutes,
            }) => {
                let minutes = remaining_minutes.max(1);
                self.error = Some(message.unwrap_or_else(|| locked_message(minutes)));
                self.start_lockout(username, minutes, now);
                LoginOutcome::Locked
            }
            Err(err) if err.is_rejection() => {
                log::warn!("Login for '{}' failed: {}", username, err);
                self.error = Some(err.user_message(LOGIN_FAILED));
                LoginOutcome::Failed
            }
            Err(err) => {
                log::error!("Login request failed: {}", err);
                self.error = Some(CONNECTION_ERROR.to_string());
                LoginOutcome::Failed
            }
        }
    }

    /// Called when the username field loses focus.
    pub fn refresh_lock_status_at<A: AuthApi + ?Sized>(&mut self, now: DateTime<Utc>, api: &A) {
        if let Some(username) = self.lock_status_target() {
            let status = api.lock_status(&username);
            self.apply_lock_status_at(now, &username, status);
        }
    }

    /// Username whose lock status should be checked, if the field is filled.
    pub fn lock_status_target(&self) -> Option<String> {
        let username = self.username.trim();
        (!username.is_empty()).then(|| username.to_string())
    }

    /// Applies a lock status for `username`. Ignored once the field no longer
    /// holds that username.
    pub fn apply_lock_status_at(
        &mut self,
        now: DateTime<Utc>,
        username: &str,
        status: ApiResult<LockStatus>,
    ) {
        if self.username.trim() != username {
            return;
        }

        match status {
            Ok(status) if status.is_locked && status.remaining_minutes > 0 => {
                self.error = Some(locked_message(status.remaining_minutes));
                self.start_lockout(username, status.remaining_minutes, now);
            }
            Ok(_) => {
                if self.lockout.username() == Some(username) {
                    self.clear_lockout();
                    self.error = None;
                }
            }
            Err(err) => log::debug!("Lock status check for '{}' failed: {}", username, err),
        }
    }

    /// Keeps the countdown in step with the username field.
    pub fn on_username_changed(&mut self) {
        let was_locked = self.lockout.is_active();
        self.lockout.on_username_changed(self.username.trim());
        if was_locked && !self.lockout.is_active() {
            self.lockout_secs = None;
            self.error = None;
        }
    }

    /// Advances the lockout countdown; call about once per second.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<LockoutTick> {
        let tick = self.lockout.tick_at(now);
        match tick {
            Some(LockoutTick::Locked { remaining_secs }) => self.lockout_secs = Some(remaining_secs),
            Some(LockoutTick::Unlocked) => {
                self.lockout_secs = None;
                self.error = None;
            }
            None => self.lockout_secs = None,
        }
        tick
    }

    /// Clears the form, e.g. after signing out.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn start_lockout(&mut self, username: &str, minutes: u32, now: DateTime<Utc>) {
        self.lockout
            .start(username, Duration::minutes(i64::from(minutes)), now);
        self.lockout_secs = self.lockout.remaining_secs(now);
    }

    fn clear_lockout(&mut self) {
        self.lockout.clear();
        self.lockout_secs = None;
    }
}

fn denied_message(message: Option<String>, remaining_attempts: Option<u32>) -> String {
    match (message.filter(|m| !m.trim().is_empty()), remaining_attempts) {
        (Some(message), _) => message,
        (None, Some(left)) => format!(
            "Invalid username or password ({} attempt(s) remaining)",
            left
        ),
        (None, None) => "Invalid username or password".to_string(),
    }
}

fn locked_message(minutes: u32) -> String {
    format!(
        "Account locked after too many failed attempts. Try again in {} minute(s)",
        minutes
    )
}
