//! Background requests.
//!
//! Every request to the server runs on its own worker thread with a shared
//! handle to the API client. Results come back over one channel that the app
//! drains at the start of each frame, so the UI thread never waits on the
//! network and loading indicators stay on screen until the answer arrives.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use crate::models::schedule::{SlotMove, Student};
use crate::services::api::{
    ApiClient, ApiError, ApiResult, AuthApi, LockStatus, LoginReply, ScheduleApi,
};
use crate::services::schedule::{
    lookup_student, FormMode, LoadTicket, PendingSave, Snapshot, STUDENT_LOAD_FAILED,
};
use crate::services::session::Credentials;

/// A request to run off the UI thread.
pub(super) enum Job {
    RestoreSession { token: String },
    Revalidate { token: String },
    Login(Credentials),
    LockStatus { username: String },
    LookupStudent { student_id: i64 },
    LoadSchedule(LoadTicket),
    SaveBooking(PendingSave),
    MoveBooking { booking_id: i64, slot: SlotMove },
    DeleteBooking { booking_id: i64, label: String },
}

/// A finished [`Job`], carrying what the UI needs to apply the answer.
#[derive(Debug)]
pub(super) enum JobResult {
    RestoreSession(ApiResult<()>),
    Revalidate {
        token: String,
        result: ApiResult<()>,
    },
    Login {
        username: String,
        reply: ApiResult<LoginReply>,
    },
    LockStatus {
        username: String,
        status: ApiResult<LockStatus>,
    },
    LookupStudent {
        student_id: i64,
        result: Result<Student, String>,
    },
    LoadSchedule {
        ticket: LoadTicket,
        result: ApiResult<Snapshot>,
    },
    SaveBooking {
        mode: FormMode,
        result: ApiResult<()>,
    },
    MoveBooking {
        booking_id: i64,
        slot: SlotMove,
        result: ApiResult<()>,
    },
    DeleteBooking {
        booking_id: i64,
        label: String,
        result: ApiResult<()>,
    },
}

impl Job {
    fn run<A>(self, api: &A) -> JobResult
    where
        A: ScheduleApi + AuthApi + Sync + ?Sized,
    {
        match self {
            Job::RestoreSession { token } => JobResult::RestoreSession(api.verify_token(&token)),
            Job::Revalidate { token } => {
                let result = api.verify_token(&token);
                JobResult::Revalidate { token, result }
            }
            Job::Login(credentials) => JobResult::Login {
                reply: api.login(&credentials.username, &credentials.password),
                username: credentials.username,
            },
            Job::LockStatus { username } => JobResult::LockStatus {
                status: api.lock_status(&username),
                username,
            },
            Job::LookupStudent { student_id } => JobResult::LookupStudent {
                student_id,
                result: lookup_student(api, student_id),
            },
            Job::LoadSchedule(ticket) => JobResult::LoadSchedule {
                result: ticket.fetch(api),
                ticket,
            },
            Job::SaveBooking(pending) => JobResult::SaveBooking {
                result: pending.send(api),
                mode: pending.mode,
            },
            Job::MoveBooking { booking_id, slot } => JobResult::MoveBooking {
                result: api.move_schedule(booking_id, &slot),
                booking_id,
                slot,
            },
            Job::DeleteBooking { booking_id, label } => JobResult::DeleteBooking {
                result: api.delete_schedule(booking_id),
                booking_id,
                label,
            },
        }
    }

    /// The failure reported when the worker dies before answering.
    fn abandoned(&self) -> JobResult {
        fn lost<T>() -> ApiResult<T> {
            Err(ApiError::Network("request worker stopped".to_string()))
        }

        match self {
            Job::RestoreSession { .. } => JobResult::RestoreSession(lost()),
            Job::Revalidate { token } => JobResult::Revalidate {
                token: token.clone(),
                result: lost(),
            },
            Job::Login(credentials) => JobResult::Login {
                username: credentials.username.clone(),
                reply: lost(),
            },
            Job::LockStatus { username } => JobResult::LockStatus {
                username: username.clone(),
                status: lost(),
            },
            Job::LookupStudent { student_id } => JobResult::LookupStudent {
                student_id: *student_id,
                result: Err(STUDENT_LOAD_FAILED.to_string()),
            },
            Job::LoadSchedule(ticket) => JobResult::LoadSchedule {
                ticket: *ticket,
                result: lost(),
            },
            Job::SaveBooking(pending) => JobResult::SaveBooking {
                mode: pending.mode,
                result: lost(),
            },
            Job::MoveBooking { booking_id, slot } => JobResult::MoveBooking {
                booking_id: *booking_id,
                slot: slot.clone(),
                result: lost(),
            },
            Job::DeleteBooking { booking_id, label } => JobResult::DeleteBooking {
                booking_id: *booking_id,
                label: label.clone(),
                result: lost(),
            },
        }
    }
}

pub(super) struct JobQueue<A = ApiClient> {
    api: Arc<A>,
    sender: Sender<JobResult>,
    receiver: Receiver<JobResult>,
    in_flight: usize,
}

impl<A> JobQueue<A>
where
    A: ScheduleApi + AuthApi + Send + Sync + 'static,
{
    pub fn new(api: A) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            api: Arc::new(api),
            sender,
            receiver,
            in_flight: 0,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    /// Starts `job` on a worker thread. The worker wakes the UI when done.
    pub fn spawn(&mut self, ctx: &egui::Context, job: Job) {
        log::debug!("Starting {:?}", JobName(&job));
        let fallback = job.abandoned();
        let api = Arc::clone(&self.api);
        let sender = self.sender.clone();
        let ctx = ctx.clone();
        self.in_flight += 1;

        thread::spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| job.run(&*api)))
                .unwrap_or_else(|_| {
                    log::error!("Request worker panicked");
                    fallback
                });
            let _ = sender.send(result);
            ctx.request_repaint();
        });
    }

    /// Results that arrived since the last call, in arrival order.
    pub fn poll(&mut self) -> Vec<JobResult> {
        let mut finished = Vec::new();
        while let Ok(result) = self.receiver.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            finished.push(result);
        }
        finished
    }
}

/// Logs a job without its credentials.
struct JobName<'a>(&'a Job);

impl std::fmt::Debug for JobName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self.0 {
            Job::RestoreSession { .. } => "session restore",
            Job::Revalidate { .. } => "session re-validation",
            Job::Login(_) => "sign-in",
            Job::LockStatus { .. } => "lock status check",
            Job::LookupStudent { .. } => "student lookup",
            Job::LoadSchedule(_) => "schedule load",
            Job::SaveBooking(_) => "booking save",
            Job::MoveBooking { .. } => "booking move",
            Job::DeleteBooking { .. } => "booking delete",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schedule::{
        BookingDraft, ScheduleItem, Teacher, TimeSlot, WeekWindow, SHORT_TERM_CLASS,
    };
    use crate::services::schedule::ScheduleEditor;
    use chrono::NaiveDate;
    use mockall::mock;
    use std::time::{Duration, Instant};

    mock! {
        Server {}

        impl ScheduleApi for Server {
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
            fn move_schedule(&self, id: i64, slot: &SlotMove) -> ApiResult<()>;
            fn delete_schedule(&self, id: i64) -> ApiResult<()>;
        }

        impl AuthApi for Server {
            fn verify_token(&self, token: &str) -> ApiResult<()>;
            fn login(&self, username: &str, password: &str) -> ApiResult<LoginReply>;
            fn lock_status(&self, username: &str) -> ApiResult<LockStatus>;
        }
    }

    fn week() -> WeekWindow {
        WeekWindow::containing(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap())
    }

    /// Polls until one result arrives.
    fn next_result(queue: &mut JobQueue<MockServer>) -> JobResult {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(result) = queue.poll().pop() {
                return result;
            }
            assert!(Instant::now() < deadline, "worker did not answer");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_load_answer_arrives_through_poll() {
        let mut api = MockServer::new();
        api.expect_list_student_schedules()
            .returning(|_, _| Ok(Vec::new()));
        api.expect_list_time_slots().returning(|| Ok(Vec::new()));
        api.expect_list_teachers().returning(|| Ok(Vec::new()));
        let mut queue = JobQueue::new(api);
        let mut editor = ScheduleEditor::new(7, week());

        let ticket = editor.begin_load();
        queue.spawn(&egui::Context::default(), Job::LoadSchedule(ticket));
        assert!(queue.is_busy());
        assert!(editor.is_loading());

        match next_result(&mut queue) {
            JobResult::LoadSchedule { ticket, result } => {
                assert!(editor.apply_snapshot(ticket, result));
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert!(!queue.is_busy());
        assert!(editor.is_ready());
    }

    #[test]
    fn test_student_lookup_runs_on_worker() {
        let mut api = MockServer::new();
        api.expect_get_student().returning(|id| {
            Ok(Student {
                id,
                name: "王小明".to_string(),
                english_name: None,
                class_schedule_type: Some(SHORT_TERM_CLASS.to_string()),
            })
        });
        let mut queue = JobQueue::new(api);

        queue.spawn(&egui::Context::default(), Job::LookupStudent { student_id: 7 });

        match next_result(&mut queue) {
            JobResult::LookupStudent { student_id, result } => {
                assert_eq!(student_id, 7);
                assert_eq!(result.map(|s| s.id), Ok(7));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_abandoned_job_reports_failure_for_same_request() {
        let job = Job::Revalidate {
            token: "tok".to_string(),
        };

        match job.abandoned() {
            JobResult::Revalidate { token, result } => {
                assert_eq!(token, "tok");
                assert!(matches!(result, Err(ApiError::Network(_))));
            }
            other => panic!("unexpected result {:?}", other),
        }

        let job = Job::LookupStudent { student_id: 7 };
        assert!(matches!(
            job.abandoned(),
            JobResult::LookupStudent { student_id: 7, result: Err(_) }
        ));
    }

    #[test]
    fn test_job_name_hides_credentials() {
        let job = Job::Login(Credentials {
            username: "admin".to_string(),
            password: "secret".to_string(),
        });

        assert_eq!(format!("{:?}", JobName(&job)), "sign-in");
    }
}
