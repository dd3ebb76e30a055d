// Test fixtures - reusable test data
// Provides consistent bookings, dates and fake API servers across test files

#![allow(dead_code)]

use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tutor_desk::models::schedule::{
    BookingDraft, LessonType, ScheduleItem, ScheduleStatus, SlotMove, Student, Teacher, TimeSlot,
    WeekWindow, SHORT_TERM_CLASS,
};
use tutor_desk::models::session::SessionUser;
use tutor_desk::services::api::{
    ApiError, ApiResult, AuthApi, LockStatus, LoginGrant, LoginReply, ScheduleApi,
};

/// Sample dates for testing
pub mod dates {
    use super::*;

    /// Monday Mar 3, 2025
    pub fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    pub fn week() -> WeekWindow {
        WeekWindow::containing(monday())
    }

    /// Mar 3, 2025 at 09:00 UTC
    pub fn morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap()
    }
}

/// Sample schedule data
pub mod schedule {
    use super::*;

    /// The server's time axis: 09:00 to 21:00 in 30-minute steps.
    pub fn time_slots() -> Vec<TimeSlot> {
        (9..21)
            .flat_map(|hour| [(hour, 0), (hour, 30)])
            .chain(std::iter::once((21, 0)))
            .map(|(hour, minute)| TimeSlot {
                time_slot: format!("{:02}:{:02}:00", hour, minute),
                display_time: format!("{:02}:{:02}", hour, minute),
            })
            .collect()
    }

    pub fn teachers() -> Vec<Teacher> {
        vec![
            Teacher { id: 3, name: "Lin".to_string(), is_active: true },
            Teacher { id: 4, name: "Wu".to_string(), is_active: false },
            Teacher { id: 5, name: "Ho".to_string(), is_active: true },
        ]
    }

    /// Student 7 is in a short-term class, student 8 in a regular one.
    pub fn students() -> Vec<Student> {
        vec![
            Student {
                id: 7,
                name: "王小明".to_string(),
                english_name: Some("Amy".to_string()),
                class_schedule_type: Some(SHORT_TERM_CLASS.to_string()),
            },
            Student {
                id: 8,
                name: "陳大文".to_string(),
                english_name: None,
                class_schedule_type: Some("常態班".to_string()),
            },
        ]
    }

    pub fn booking(id: i64, day_of_week: u8, time_slot: &str) -> ScheduleItem {
        let week = dates::week();
        ScheduleItem {
            id,
            student_id: 7,
            student_name: Some("Amy".to_string()),
            week_start_date: week.start,
            week_end_date: week.end,
            day_of_week,
            time_slot: time_slot.to_string(),
            duration_minutes: 30,
            lesson_type: LessonType::Physical,
            status: ScheduleStatus::Scheduled,
            teacher_id: Some(3),
            teacher_name: Some("Lin".to_string()),
            subject: Some(format!("Lesson {}", id)),
            classroom: None,
            notes: None,
        }
    }
}

/// Fake backends standing in for the REST API
pub mod fakes {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum ScheduleCall {
        GetStudent { id: i64 },
        ListSchedules { student_id: i64 },
        ListTimeSlots,
        ListTeachers,
        Create,
        Update { id: i64 },
        Move { id: i64, slot: SlotMove },
        Delete { id: i64 },
    }

    #[derive(Default)]
    struct ServerState {
        bookings: Vec<ScheduleItem>,
        calls: Vec<ScheduleCall>,
        next_id: i64,
        fail_lists: bool,
        fail_next_mutation: Option<ApiError>,
    }

    /// In-memory schedule server. Moves and edits are applied to its own
    /// booking list, so a reload observes them the way the real server does.
    #[derive(Default)]
    pub struct FakeScheduleServer {
        state: Mutex<ServerState>,
    }

    impl FakeScheduleServer {
        pub fn with_bookings(bookings: Vec<ScheduleItem>) -> Self {
            let next_id = bookings.iter().map(|b| b.id).max().unwrap_or(0) + 1;
            Self {
                state: Mutex::new(ServerState {
                    bookings,
                    next_id,
                    ..ServerState::default()
                }),
            }
        }

        pub fn calls(&self) -> Vec<ScheduleCall> {
            self.state.lock().unwrap().calls.clone()
        }

        pub fn mutation_calls(&self) -> Vec<ScheduleCall> {
            self.calls()
                .into_iter()
                .filter(|call| {
                    !matches!(
                        call,
                        ScheduleCall::GetStudent { .. }
                            | ScheduleCall::ListSchedules { .. }
                            | ScheduleCall::ListTimeSlots
                            | ScheduleCall::ListTeachers
                    )
                })
                .collect()
        }

        pub fn bookings(&self) -> Vec<ScheduleItem> {
            self.state.lock().unwrap().bookings.clone()
        }

        pub fn set_fail_lists(&self, fail: bool) {
            self.state.lock().unwrap().fail_lists = fail;
        }

        pub fn fail_next_mutation(&self, error: ApiError) {
            self.state.lock().unwrap().fail_next_mutation = Some(error);
        }

        fn record(&self, call: ScheduleCall) -> std::sync::MutexGuard<'_, ServerState> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(call);
            state
        }
    }

    impl ScheduleApi for FakeScheduleServer {
        fn get_student(&self, id: i64) -> ApiResult<Student> {
            self.record(ScheduleCall::GetStudent { id });
            schedule::students()
                .into_iter()
                .find(|student| student.id == id)
                .ok_or_else(|| ApiError::rejected(404, "Student not found"))
        }

        fn list_student_schedules(
            &self,
            student_id: i64,
            _week: &WeekWindow,
        ) -> ApiResult<Vec<ScheduleItem>> {
            let state = self.record(ScheduleCall::ListSchedules { student_id });
            if state.fail_lists {
                return Err(ApiError::Network("connection reset".to_string()));
            }
            Ok(state
                .bookings
                .iter()
                .filter(|b| b.student_id == student_id)
                .cloned()
                .collect())
        }

        fn list_time_slots(&self) -> ApiResult<Vec<TimeSlot>> {
            self.record(ScheduleCall::ListTimeSlots);
            Ok(schedule::time_slots())
        }

        fn list_teachers(&self) -> ApiResult<Vec<Teacher>> {
            self.record(ScheduleCall::ListTeachers);
            Ok(schedule::teachers())
        }

        fn create_schedule(&self, draft: &BookingDraft) -> ApiResult<()> {
            let mut state = self.record(ScheduleCall::Create);
            if let Some(err) = state.fail_next_mutation.take() {
                return Err(err);
            }
            let id = state.next_id;
            state.next_id += 1;

            let mut item = schedule::booking(id, draft.day_of_week, &draft.time_slot);
            item.student_id = draft.student_id;
            item.duration_minutes = draft.duration_minutes;
            item.lesson_type = draft.lesson_type;
            item.teacher_id = draft.teacher_id;
            item.subject = Some(draft.subject.clone());
            state.bookings.push(item);
            Ok(())
        }

        fn update_schedule(&self, id: i64, draft: &BookingDraft) -> ApiResult<()> {
            let mut state = self.record(ScheduleCall::Update { id });
            if let Some(err) = state.fail_next_mutation.take() {
                return Err(err);
            }
            let item = state
                .bookings
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or_else(|| ApiError::rejected(404, "Booking not found"))?;
            item.day_of_week = draft.day_of_week;
            item.time_slot = draft.time_slot.clone();
            item.subject = Some(draft.subject.clone());
            if let Some(status) = draft.status {
                item.status = status;
            }
            Ok(())
        }

        fn move_schedule(&self, id: i64, slot: &SlotMove) -> ApiResult<()> {
            let mut state = self.record(ScheduleCall::Move {
                id,
                slot: slot.clone(),
            });
            if let Some(err) = state.fail_next_mutation.take() {
                return Err(err);
            }
            let item = state
                .bookings
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or_else(|| ApiError::rejected(404, "Booking not found"))?;
            item.day_of_week = slot.day_of_week;
            item.time_slot = slot.time_slot.clone();
            Ok(())
        }

        fn delete_schedule(&self, id: i64) -> ApiResult<()> {
            let mut state = self.record(ScheduleCall::Delete { id });
            if let Some(err) = state.fail_next_mutation.take() {
                return Err(err);
            }
            state.bookings.retain(|b| b.id != id);
            Ok(())
        }
    }

    pub fn admin() -> SessionUser {
        SessionUser {
            id: 1,
            username: "admin".to_string(),
            role: "admin".to_string(),
            name: "Administrator".to_string(),
        }
    }

    /// Auth server whose verify answer can be switched between calls.
    pub struct FakeAuthServer {
        verify_result: Mutex<ApiResult<()>>,
        verify_calls: Mutex<Vec<String>>,
    }

    impl FakeAuthServer {
        pub fn accepting() -> Self {
            Self {
                verify_result: Mutex::new(Ok(())),
                verify_calls: Mutex::new(Vec::new()),
            }
        }

        pub fn set_verify_result(&self, result: ApiResult<()>) {
            *self.verify_result.lock().unwrap() = result;
        }

        pub fn verify_calls(&self) -> usize {
            self.verify_calls.lock().unwrap().len()
        }
    }

    impl AuthApi for FakeAuthServer {
        fn verify_token(&self, token: &str) -> ApiResult<()> {
            self.verify_calls.lock().unwrap().push(token.to_string());
            self.verify_result.lock().unwrap().clone()
        }

        fn login(&self, username: &str, password: &str) -> ApiResult<LoginReply> {
            if username == "admin" && password == "secret" {
                Ok(LoginReply::Granted(LoginGrant {
                    token: "issued-token".to_string(),
                    user: admin(),
                }))
            } else {
                Ok(LoginReply::Denied {
                    message: None,
                    remaining_attempts: Some(2),
                })
            }
        }

        fn lock_status(&self, _username: &str) -> ApiResult<LockStatus> {
            Ok(LockStatus {
                is_locked: false,
                remaining_minutes: 0,
                failed_attempts: 0,
            })
        }
    }
}
