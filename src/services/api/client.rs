use std::sync::RwLock;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{
    ApiError, ApiResult, AuthApi, LockStatus, LoginGrant, LoginReply, ScheduleApi,
};
use crate::models::schedule::{
    BookingDraft, ScheduleItem, SlotMove, Student, Teacher, TimeSlot, WeekWindow,
};
use crate::models::settings::AppConfig;

const SCHEDULES_PATH: &str = "/api/short-term-schedules";

/// Blocking HTTP client for the tutoring-center REST API.
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
    max_retries: usize,
    retry_delay_ms: u64,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build API HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
            max_retries: 1,
            retry_delay_ms: 300,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(&config.api_base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Bearer token attached to schedule requests.
    pub fn set_token(&self, token: Option<String>) {
        match self.token.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };

        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends a request, mapping transport failures and non-2xx statuses.
    fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder
            .send()
            .map_err(|err| ApiError::Network(err.to_string()))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(rejection(response))
        }
    }

    /// GETs are idempotent, so transport failures are retried.
    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> ApiResult<T> {
        let url = self.url(path);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            let builder = self.authorized(self.client.get(&url).query(query));
            match self.send(builder) {
                Ok(response) => return decode(response),
                Err(err @ ApiError::Network(_)) if attempt < self.max_retries => {
                    log::warn!("GET {} attempt {} failed: {}", path, attempt + 1, err);
                    last_error = Some(err);
                    thread::sleep(Duration::from_millis(self.retry_delay_ms));
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or_else(|| ApiError::Network("request was not sent".to_string())))
    }
}

impl ScheduleApi for ApiClient {
    fn get_student(&self, id: i64) -> ApiResult<Student> {
        self.get_json(&format!("/api/students/{}", id), &[])
    }

    fn list_student_schedules(
        &self,
        student_id: i64,
        week: &WeekWindow,
    ) -> ApiResult<Vec<ScheduleItem>> {
        self.get_json(
            &format!("{}/student/{}", SCHEDULES_PATH, student_id),
            &[
                ("week_start_date", week.start_param()),
                ("week_end_date", week.end_param()),
            ],
        )
    }

    fn list_time_slots(&self) -> ApiResult<Vec<TimeSlot>> {
        self.get_json(&format!("{}/time-slots", SCHEDULES_PATH), &[])
    }

    fn list_teachers(&self) -> ApiResult<Vec<Teacher>> {
        self.get_json("/api/teachers", &[])
    }

    fn create_schedule(&self, draft: &BookingDraft) -> ApiResult<()> {
        let builder = self.client.post(self.url(SCHEDULES_PATH)).json(draft);
        self.send(self.authorized(builder)).map(|_| ())
    }

    fn update_schedule(&self, id: i64, draft: &BookingDraft) -> ApiResult<()> {
        let builder = self
            .client
            .put(self.url(&format!("{}/{}", SCHEDULES_PATH, id)))
            .json(draft);
        self.send(self.authorized(builder)).map(|_| ())
    }

    fn move_schedule(&self, id: i64, slot: &SlotMove) -> ApiResult<()> {
        let builder = self
            .client
            .put(self.url(&format!("{}/{}", SCHEDULES_PATH, id)))
            .json(slot);
        self.send(self.authorized(builder)).map(|_| ())
    }

    fn delete_schedule(&self, id: i64) -> ApiResult<()> {
        let builder = self
            .client
            .delete(self.url(&format!("{}/{}", SCHEDULES_PATH, id)));
        self.send(self.authorized(builder)).map(|_| ())
    }
}

impl AuthApi for ApiClient {
    fn verify_token(&self, token: &str) -> ApiResult<()> {
        let builder = self
            .client
            .post(self.url("/api/auth/verify"))
            .bearer_auth(token)
            .json(&serde_json::json!({}));
        self.send(builder).map(|_| ())
    }

    fn login(&self, username: &str, password: &str) -> ApiResult<LoginReply> {
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .map_err(|err| ApiError::Network(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let grant: LoginGrant = decode(response)?;
            return Ok(LoginReply::Granted(grant));
        }

        match status {
            StatusCode::UNAUTHORIZED => {
                let body = read_body(response);
                Ok(LoginReply::Denied {
                    message: body_message(&body),
                    remaining_attempts: body_u32(&body, "remainingAttempts"),
                })
            }
            StatusCode::LOCKED => {
                let body = read_body(response);
                Ok(LoginReply::Locked {
                    message: body_message(&body),
                    remaining_minutes: body_u32(&body, "remainingMinutes").unwrap_or(0),
                })
            }
            _ => Err(rejection(response)),
        }
    }

    fn lock_status(&self, username: &str) -> ApiResult<LockStatus> {
        self.get_json(
            &format!("/api/auth/lock-status/{}", urlencoding::encode(username)),
            &[],
        )
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    response
        .json::<T>()
        .map_err(|err| ApiError::Decode(err.to_string()))
}

fn read_body(response: Response) -> Option<Value> {
    response.json::<Value>().ok()
}

fn rejection(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = read_body(response);
    ApiError::Rejected {
        status,
        message: body_message(&body),
    }
}

/// Error bodies carry either `error` (schedule routes) or `message` (auth routes).
fn body_message(body: &Option<Value>) -> Option<String> {
    let body = body.as_ref()?;
    ["error", "message"]
        .iter()
        .find_map(|field| body.get(field).and_then(Value::as_str))
        .map(str::to_string)
}

fn body_u32(body: &Option<Value>, field: &str) -> Option<u32> {
    body.as_ref()?
        .get(field)?
        .as_u64()
        .and_then(|value| u32::try_from(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:3000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(
            client.url("/api/teachers"),
            "http://localhost:3000/api/teachers"
        );
    }

    #[test]
    fn test_body_message_prefers_error_field() {
        let body = Some(json!({"error": "Slot taken", "message": "other"}));
        assert_eq!(body_message(&body).as_deref(), Some("Slot taken"));

        let body = Some(json!({"message": "Token expired"}));
        assert_eq!(body_message(&body).as_deref(), Some("Token expired"));

        assert_eq!(body_message(&Some(json!({"required": []}))), None);
        assert_eq!(body_message(&None), None);
    }

    #[test]
    fn test_body_u32_reads_counters() {
        let body = Some(json!({"remainingAttempts": 2, "remainingMinutes": -1}));
        assert_eq!(body_u32(&body, "remainingAttempts"), Some(2));
        assert_eq!(body_u32(&body, "remainingMinutes"), None);
        assert_eq!(body_u32(&body, "missing"), None);
    }

    #[test]
    fn test_unreachable_server_is_a_network_error() {
        // Port 9 (discard) on localhost is reliably closed in test environments.
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = client.verify_token("token").unwrap_err();
        assert!(!err.is_rejection());
    }
}
