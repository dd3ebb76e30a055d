// Integration tests for the schedule editor against an in-memory server

mod fixtures;

use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use fixtures::dates;
use fixtures::fakes::{FakeScheduleServer, ScheduleCall};
use fixtures::schedule::booking;
use pretty_assertions::assert_eq;
use tutor_desk::models::schedule::SlotMove;
use tutor_desk::services::api::ApiError;
use tutor_desk::services::schedule::{
    lookup_student, DeleteOutcome, DropOutcome, LoadPhase, SaveOutcome, ScheduleEditor,
    LOAD_FAILED, MOVE_FAILED, NOT_SHORT_TERM, SLOT_OCCUPIED, STUDENT_LOAD_FAILED,
};

fn loaded_editor(server: &FakeScheduleServer) -> ScheduleEditor {
    let mut editor = ScheduleEditor::new(7, dates::week());
    assert!(editor.load(server), "initial load should succeed");
    editor
}

#[test]
fn test_drag_booking_to_free_cell_moves_and_reloads() {
    let server = FakeScheduleServer::with_bookings(vec![
        booking(1, 1, "10:00:00"),
        booking(2, 3, "14:00:00"),
    ]);
    let mut editor = loaded_editor(&server);

    let outcome = editor.handle_drop(&server, 1, "2-11:00:00");

    assert_eq!(outcome, DropOutcome::Moved);
    assert_eq!(
        server.mutation_calls(),
        vec![ScheduleCall::Move {
            id: 1,
            slot: SlotMove {
                day_of_week: 2,
                time_slot: "11:00:00".to_string(),
            },
        }]
    );

    // The grid reflects the server after the reload
    let moved = editor.schedule_at(2, "11:00:00").expect("booking at new cell");
    assert_eq!(moved.id, 1);
    assert!(editor.schedule_at(1, "10:00:00").is_none());
    assert_eq!(editor.error(), None);
}

#[test]
fn test_drop_on_occupied_cell_sends_nothing() {
    let server = FakeScheduleServer::with_bookings(vec![
        booking(1, 1, "10:00:00"),
        booking(2, 3, "14:00:00"),
    ]);
    let mut editor = loaded_editor(&server);
    let before = server.calls().len();

    let outcome = editor.handle_drop(&server, 1, "3-14:00:00");

    assert_eq!(outcome, DropOutcome::Conflict);
    assert_eq!(server.calls().len(), before, "no request may be issued");
    assert_eq!(editor.error(), Some(SLOT_OCCUPIED));
    assert_eq!(editor.schedule_at(1, "10:00:00").map(|b| b.id), Some(1));
}

#[test]
fn test_failed_move_keeps_grid_and_reports_server_message() {
    let server = FakeScheduleServer::with_bookings(vec![booking(1, 1, "10:00:00")]);
    let mut editor = loaded_editor(&server);

    server.fail_next_mutation(ApiError::rejected(409, "Teacher is busy at that time"));
    let outcome = editor.handle_drop(&server, 1, "4-09:30:00");

    assert_eq!(
        outcome,
        DropOutcome::Failed("Teacher is busy at that time".to_string())
    );
    assert_eq!(editor.error(), Some("Teacher is busy at that time"));
    assert_eq!(editor.schedule_at(1, "10:00:00").map(|b| b.id), Some(1));

    server.fail_next_mutation(ApiError::Network("timed out".to_string()));
    editor.handle_drop(&server, 1, "4-09:30:00");
    assert_eq!(editor.error(), Some(MOVE_FAILED));
}

#[test]
fn test_malformed_cell_id_is_ignored() {
    let server = FakeScheduleServer::with_bookings(vec![booking(1, 1, "10:00:00")]);
    let mut editor = loaded_editor(&server);

    assert_eq!(editor.handle_drop(&server, 1, "garbage"), DropOutcome::Ignored);
    assert_eq!(editor.handle_drop(&server, 1, "9-10:00:00"), DropOutcome::Ignored);
    assert!(server.mutation_calls().is_empty());
}

#[test]
fn test_load_failure_leaves_no_partial_grid() {
    let server = FakeScheduleServer::with_bookings(vec![booking(1, 1, "10:00:00")]);
    server.set_fail_lists(true);
    let mut editor = ScheduleEditor::new(7, dates::week());

    assert!(!editor.load(&server));
    assert_eq!(editor.phase(), &LoadPhase::Failed(LOAD_FAILED.to_string()));
    assert!(editor.grid().is_none());
    assert!(editor.time_slots().is_empty());
    assert!(editor.teachers().is_empty());
}

#[test]
fn test_load_fetched_on_worker_thread_applies_when_received() {
    let server = Arc::new(FakeScheduleServer::with_bookings(vec![booking(1, 1, "10:00:00")]));
    let mut editor = ScheduleEditor::new(7, dates::week());

    let ticket = editor.begin_load();
    let (sender, receiver) = mpsc::channel();
    let worker_server = Arc::clone(&server);
    thread::spawn(move || {
        let _ = sender.send(ticket.fetch(worker_server.as_ref()));
    });

    assert!(editor.is_loading());
    assert!(editor.grid().is_none());

    let result = receiver
        .recv_timeout(Duration::from_secs(5))
        .expect("worker should answer");
    assert!(editor.apply_snapshot(ticket, result));
    assert_eq!(editor.schedule_at(1, "10:00:00").map(|b| b.id), Some(1));
}

#[test]
fn test_load_keeps_only_active_teachers() {
    let server = FakeScheduleServer::default();
    let editor = loaded_editor(&server);

    let names: Vec<&str> = editor.teachers().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Lin", "Ho"]);
}

#[test]
fn test_edit_form_round_trips_through_server() {
    let server = FakeScheduleServer::with_bookings(vec![booking(1, 1, "10:00:00")]);
    let mut editor = loaded_editor(&server);

    assert!(editor.open_edit_form(1));
    let form = editor.form_mut().expect("form open");
    form.draft.subject = "Algebra".to_string();
    form.draft.day_of_week = 5;

    assert_eq!(editor.submit_form(&server), SaveOutcome::Saved);
    assert!(editor.form().is_none());
    assert!(server
        .mutation_calls()
        .contains(&ScheduleCall::Update { id: 1 }));

    let updated = editor.schedule_at(5, "10:00:00").expect("edited booking");
    assert_eq!(updated.subject.as_deref(), Some("Algebra"));
}

#[test]
fn test_create_form_adds_booking_for_selected_student() {
    let server = FakeScheduleServer::default();
    let mut editor = loaded_editor(&server);

    editor.open_new_form();
    let form = editor.form_mut().expect("form open");
    form.draft.day_of_week = 2;
    form.draft.time_slot = "15:30:00".to_string();
    form.draft.subject = "Physics".to_string();

    assert_eq!(editor.submit_form(&server), SaveOutcome::Saved);

    let created = editor.schedule_at(2, "15:30:00").expect("created booking");
    assert_eq!(created.student_id, 7);
    assert_eq!(created.subject.as_deref(), Some("Physics"));
}

#[test]
fn test_rejected_save_keeps_form_open_with_message() {
    let server = FakeScheduleServer::default();
    let mut editor = loaded_editor(&server);

    editor.open_new_form();
    server.fail_next_mutation(ApiError::rejected(400, "Slot outside opening hours"));

    assert_eq!(
        editor.submit_form(&server),
        SaveOutcome::Failed("Slot outside opening hours".to_string())
    );
    let form = editor.form().expect("form stays open");
    assert_eq!(form.error.as_deref(), Some("Slot outside opening hours"));
}

#[test]
fn test_delete_requires_confirmation() {
    let server = FakeScheduleServer::with_bookings(vec![booking(1, 1, "10:00:00")]);
    let mut editor = loaded_editor(&server);

    assert!(editor.request_delete(1));
    editor.cancel_delete();
    assert_eq!(editor.confirm_delete(&server), DeleteOutcome::NothingPending);
    assert!(server.mutation_calls().is_empty());

    assert!(editor.request_delete(1));
    assert_eq!(editor.confirm_delete(&server), DeleteOutcome::Deleted);
    assert_eq!(server.mutation_calls(), vec![ScheduleCall::Delete { id: 1 }]);
    assert!(editor.schedules().is_empty());
}

#[test]
fn test_switching_week_clears_loaded_bookings() {
    let server = FakeScheduleServer::with_bookings(vec![booking(1, 1, "10:00:00")]);
    let mut editor = loaded_editor(&server);

    assert!(editor.set_view(7, dates::week().next()));
    assert!(editor.schedules().is_empty());
    assert_eq!(editor.phase(), &LoadPhase::Idle);
}

#[test]
fn test_short_term_student_opens_their_week() {
    let server = FakeScheduleServer::with_bookings(vec![booking(1, 1, "10:00:00")]);

    let student = lookup_student(&server, 7).expect("short-term student");
    assert_eq!(student.display_name(), "王小明 (Amy)");

    let mut editor = ScheduleEditor::new(student.id, dates::week());
    assert!(editor.load(&server));
    assert_eq!(editor.schedules().len(), 1);
    assert_eq!(server.calls()[0], ScheduleCall::GetStudent { id: 7 });
}

#[test]
fn test_unknown_student_is_reported() {
    let server = FakeScheduleServer::default();

    assert_eq!(lookup_student(&server, 404), Err(STUDENT_LOAD_FAILED.to_string()));
    assert_eq!(server.calls(), vec![ScheduleCall::GetStudent { id: 404 }]);
}

#[test]
fn test_regular_class_student_is_refused() {
    let server = FakeScheduleServer::default();

    assert_eq!(lookup_student(&server, 8), Err(NOT_SHORT_TERM.to_string()));
    assert!(server.mutation_calls().is_empty());
}
