// Property-based tests for the schedule grid
// Random drag sequences must never put two bookings in one cell

mod fixtures;

use std::collections::HashSet;

use fixtures::dates;
use fixtures::fakes::FakeScheduleServer;
use fixtures::schedule::{booking, time_slots};
use proptest::prelude::*;
use tutor_desk::models::schedule::SlotKey;
use tutor_desk::services::schedule::{DropOutcome, ScheduleEditor};

fn slot_strategy() -> impl Strategy<Value = SlotKey> {
    let slots: Vec<String> = time_slots().into_iter().map(|s| s.time_slot).collect();
    (1..=7u8, proptest::sample::select(slots)).prop_map(|(day, slot)| SlotKey::new(day, slot))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: every cell holds at most one booking after any sequence of drops
    #[test]
    fn prop_drops_keep_cells_exclusive(
        drops in prop::collection::vec((1..=4i64, slot_strategy()), 1..20)
    ) {
        let server = FakeScheduleServer::with_bookings(vec![
            booking(1, 1, "09:00:00"),
            booking(2, 2, "10:00:00"),
            booking(3, 3, "11:00:00"),
            booking(4, 4, "12:00:00"),
        ]);
        let mut editor = ScheduleEditor::new(7, dates::week());
        prop_assert!(editor.load(&server));

        for (booking_id, target) in drops {
            let occupant = editor
                .schedule_at(target.day_of_week, &target.time_slot)
                .map(|item| item.id);
            let outcome = editor.handle_drop(&server, booking_id, &target.cell_id());

            match occupant {
                Some(id) if id != booking_id => prop_assert_eq!(outcome, DropOutcome::Conflict),
                _ => prop_assert_eq!(outcome, DropOutcome::Moved),
            }

            let cells: HashSet<(u8, String)> = server
                .bookings()
                .into_iter()
                .map(|item| (item.day_of_week, item.time_slot))
                .collect();
            prop_assert_eq!(cells.len(), 4);
        }
    }

    /// Property: a cell id always parses back to the key it came from
    #[test]
    fn prop_cell_id_parses_back(key in slot_strategy()) {
        prop_assert_eq!(SlotKey::parse(&key.cell_id()), Ok(key));
    }
}
