//! Property tests for settings clamping

use std::time::Duration;

use dockwatch_core::monitoring::{DEFAULT_LOG_TAIL_LINES, RuntimeSettings, ScheduleSettings};
use proptest::prelude::*;

proptest! {
    /// Property: the connect timeout always lands in 1..=120 seconds
    #[test]
    fn connect_timeout_clamped(secs in any::<u64>()) {
        let settings = RuntimeSettings {
            connect_timeout_secs: secs,
            ..RuntimeSettings::default()
        };
        let timeout = settings.effective_connect_timeout();
        prop_assert!(timeout >= Duration::from_secs(1));
        prop_assert!(timeout <= Duration::from_secs(120));
        if (1..=120).contains(&secs) {
            prop_assert_eq!(timeout, Duration::from_secs(secs));
        }
    }

    /// Property: a zero tail length means the default
    #[test]
    fn log_tail_never_zero(lines in any::<u32>()) {
        let settings = RuntimeSettings {
            log_tail_lines: lines,
            ..RuntimeSettings::default()
        };
        let effective = settings.effective_log_tail_lines();
        prop_assert!(effective > 0);
        if lines == 0 {
            prop_assert_eq!(effective, DEFAULT_LOG_TAIL_LINES);
        } else {
            prop_assert_eq!(effective, lines);
        }
    }

    /// Property: schedule intervals always land in 1..=3600 seconds
    #[test]
    fn intervals_clamped(a in any::<u64>(), b in any::<u64>(), c in any::<u64>()) {
        let schedule = ScheduleSettings {
            reconcile_interval_secs: a,
            stats_interval_secs: b,
            live_interval_secs: c,
        };
        for interval in [
            schedule.effective_reconcile_interval(),
            schedule.effective_stats_interval(),
            schedule.effective_live_interval(),
        ] {
            prop_assert!(interval >= Duration::from_secs(1));
            prop_assert!(interval <= Duration::from_secs(3600));
        }
    }
}
