//! Property tests for the action record lifecycle

use dockwatch_core::models::{ActionKind, ActionRecord, ActionStatus};
use proptest::prelude::*;
use uuid::Uuid;

fn arb_status() -> impl Strategy<Value = ActionStatus> {
    prop_oneof![
        Just(ActionStatus::Pending),
        Just(ActionStatus::Executing),
        Just(ActionStatus::Success),
        Just(ActionStatus::Failed),
    ]
}

const fn rank(status: ActionStatus) -> u8 {
    match status {
        ActionStatus::Pending => 0,
        ActionStatus::Executing => 1,
        ActionStatus::Success | ActionStatus::Failed => 2,
    }
}

proptest! {
    /// Property: no sequence of transitions moves a record backwards
    #[test]
    fn lifecycle_is_monotonic(steps in prop::collection::vec(arb_status(), 0..12)) {
        let mut record = ActionRecord::pending(Uuid::new_v4(), "web", ActionKind::Stop, "ops");
        for next in steps {
            let before = record.status;
            match record.transition(next) {
                Ok(()) => {
                    prop_assert!(rank(next) > rank(before));
                    prop_assert_eq!(record.status, next);
                }
                Err(_) => prop_assert_eq!(record.status, before),
            }
            prop_assert_eq!(record.completed_at.is_some(), record.status.is_terminal());
        }
    }

    /// Property: terminal statuses absorb every further transition
    #[test]
    fn terminal_is_final(success in any::<bool>(), next in arb_status()) {
        let mut record = ActionRecord::pending(Uuid::new_v4(), "web", ActionKind::Restart, "ops");
        record.transition(ActionStatus::Executing).unwrap();
        record.complete(success, "done").unwrap();
        let settled = record.clone();

        prop_assert!(record.transition(next).is_err());
        prop_assert!(record.complete(!success, "again").is_err());
        prop_assert_eq!(record, settled);
    }

    /// Property: action names parse back to their kind
    #[test]
    fn action_names_parse(kind in prop::sample::select(ActionKind::ALL.to_vec())) {
        prop_assert_eq!(kind.as_str().parse::<ActionKind>().ok(), Some(kind));
    }
}
