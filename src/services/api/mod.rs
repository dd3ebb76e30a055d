//! REST API access for the schedule grid and the session guard.
//!
//! The engine and the guard only see the [`ScheduleApi`] and [`AuthApi`]
//! traits; [`ApiClient`] is the production implementation over blocking
//! `reqwest`.

mod client;

pub use client::ApiClient;

use serde::Deserialize;
use thiserror::Error;

use crate::models::schedule::{
    BookingDraft, ScheduleItem, SlotMove, Student, Teacher, TimeSlot, WeekWindow,
};
use crate::models::session::SessionUser;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("Request rejected with HTTP {status}{}", .message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
    Rejected { status: u16, message: Option<String> },

    /// The server answered 2xx but the body could not be decoded.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        ApiError::Rejected {
            status,
            message: Some(message.into()),
        }
    }

    /// True when the server positively refused the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Rejected { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message for the user: the server-supplied text when there is one,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Successful `POST /api/auth/login` body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginGrant {
    pub token: String,
    pub user: SessionUser,
}

/// Outcome of a login attempt the server answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginReply {
    Granted(LoginGrant),
    /// Wrong credentials (HTTP 401).
    Denied {
        message: Option<String>,
        remaining_attempts: Option<u32>,
    },
    /// Account locked (HTTP 423).
    Locked {
        message: Option<String>,
        remaining_minutes: u32,
    },
}

/// `GET /api/auth/lock-status/{username}` body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockStatus {
    pub is_locked: bool,
    #[serde(default)]
    pub remaining_minutes: u32,
    #[serde(default)]
    pub failed_attempts: u32,
}

/// Short-term schedule endpoints.
#[cfg_attr(test, mockall::automock)]
pub trait ScheduleApi {
    /// Active student by id; inactive or unknown ids are rejected with 404.
    fn get_student(&self, id: i64) -> ApiResult<Student>;

    fn list_student_schedules(
        &self,
        student_id: i64,
        week: &WeekWindow,
    ) -> ApiResult<Vec<ScheduleItem>>;

    fn list_time_slots(&self) -> ApiResult<Vec<TimeSlot>>;

    fn list_teachers(&self) -> ApiResult<Vec<Teacher>>;

    fn create_schedule(&self, draft: &BookingDraft) -> ApiResult<()>;

    fn update_schedule(&self, id: i64, draft: &BookingDraft) -> ApiResult<()>;

    /// Relocates a booking; the body carries only day and time slot.
    fn move_schedule(&self, id: i64, slot: &SlotMove) -> ApiResult<()>;

    fn delete_schedule(&self, id: i64) -> ApiResult<()>;
}

/// Authentication endpoints.
#[cfg_attr(test, mockall::automock)]
pub trait AuthApi {
    /// `Ok(())` when the server accepts the bearer token.
    fn verify_token(&self, token: &str) -> ApiResult<()>;

    fn login(&self, username: &str, password: &str) -> ApiResult<LoginReply>;

    fn lock_status(&self, username: &str) -> ApiResult<LockStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = ApiError::rejected(400, "Slot already taken");
        assert_eq!(err.user_message("Save failed"), "Slot already taken");
    }

    #[test]
    fn test_user_message_falls_back() {
        let blank = ApiError::Rejected {
            status: 500,
            message: Some("  ".to_string()),
        };
        let network = ApiError::Network("connection refused".to_string());

        assert_eq!(blank.user_message("Save failed"), "Save failed");
        assert_eq!(network.user_message("Save failed"), "Save failed");
    }

    #[test]
    fn test_rejection_classification() {
        assert!(ApiError::rejected(403, "expired").is_rejection());
        assert!(!ApiError::Network("timeout".to_string()).is_rejection());
        assert!(!ApiError::Decode("bad json".to_string()).is_rejection());
        assert_eq!(ApiError::rejected(403, "expired").status(), Some(403));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ApiError::rejected(404, "Booking not found").to_string(),
            "Request rejected with HTTP 404: Booking not found"
        );
        assert_eq!(
            ApiError::Rejected { status: 500, message: None }.to_string(),
            "Request rejected with HTTP 500"
        );
    }

    #[test]
    fn test_lock_status_deserializes_camel_case() {
        let status: LockStatus = serde_json::from_str(
            r#"{"isLocked":true,"remainingMinutes":42,"unlockTime":"2025-03-03T10:00:00Z","failedAttempts":3}"#,
        )
        .unwrap();

        assert!(status.is_locked);
        assert_eq!(status.remaining_minutes, 42);
        assert_eq!(status.failed_attempts, 3);
    }
}
