//! Property tests for runtime output parsing

use dockwatch_core::ContainerStatus;
use dockwatch_core::monitoring::{OutputParser, normalize_status};
use proptest::prelude::*;

fn arb_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_.-]{0,15}"
}

fn arb_status() -> impl Strategy<Value = (String, ContainerStatus)> {
    prop_oneof![
        (1u32..100).prop_map(|n| (format!("Up {n} minutes"), ContainerStatus::Running)),
        (0u32..256).prop_map(|c| (format!("Exited ({c}) 2 hours ago"), ContainerStatus::Exited)),
        Just(("Paused".to_string(), ContainerStatus::Paused)),
        Just(("Created".to_string(), ContainerStatus::Unknown)),
        Just(("Restarting (1) 5 seconds ago".to_string(), ContainerStatus::Unknown)),
    ]
}

fn arb_row() -> impl Strategy<Value = (String, String, ContainerStatus, String)> {
    (arb_name(), arb_status(), "[a-z0-9:/._-]{1,20}")
        .prop_map(|(name, (text, status), image)| (name, text, status, image))
}

proptest! {
    /// Property: every well-formed row is kept, in order
    #[test]
    fn listing_keeps_well_formed_rows(rows in prop::collection::vec(arb_row(), 0..20)) {
        let mut output = String::from("NAMES|STATUS|IMAGE|PORTS|CONTAINER ID|CREATED AT\n");
        for (name, text, _, image) in &rows {
            output.push_str(&format!("{name}|{text}|{image}||id|2024-01-01\n"));
        }

        let parsed = OutputParser::parse_listing(&output);

        prop_assert_eq!(parsed.len(), rows.len());
        for (row, (name, _, status, image)) in parsed.iter().zip(&rows) {
            prop_assert_eq!(&row.name, name);
            prop_assert_eq!(row.status, *status);
            prop_assert_eq!(&row.image, image);
            prop_assert_eq!(row.ports.as_str(), "");
        }
    }

    /// Property: rows with fewer than six fields never appear
    #[test]
    fn listing_drops_short_rows(
        names in prop::collection::vec(arb_name(), 1..10),
        fields in 1usize..6,
    ) {
        let mut output = String::from("NAMES|STATUS\n");
        for name in &names {
            let mut parts = vec![name.clone()];
            parts.extend(std::iter::repeat_n("x".to_string(), fields - 1));
            output.push_str(&parts.join("|"));
            output.push('\n');
        }
        prop_assert!(OutputParser::parse_listing(&output).is_empty());
    }

    /// Property: the header line is never parsed as data
    #[test]
    fn header_is_discarded(name in arb_name()) {
        let output = format!("{name}|Up 1 second|img|p|id|created");
        prop_assert!(OutputParser::parse_listing(&output).is_empty());
    }

    /// Property: parsing arbitrary text never panics
    #[test]
    fn arbitrary_output_never_panics(output in "(.{0,40}\n){0,8}") {
        let _ = OutputParser::parse_listing(&output);
        let _ = OutputParser::parse_stats(&output);
    }

    /// Property: "Up" prefix always means running
    #[test]
    fn up_prefix_is_running(rest in ".{0,30}") {
        prop_assert_eq!(normalize_status(&format!("Up{rest}")), ContainerStatus::Running);
    }

    /// Property: stats rows map one-to-one onto names
    #[test]
    fn stats_keyed_by_name(
        entries in prop::collection::btree_map(arb_name(), (0u32..10_000, 1u64..4096), 0..10),
    ) {
        let mut output = String::from("NAME|CPU %|MEM USAGE / LIMIT|NET I/O|BLOCK I/O\n");
        for (name, (cpu, mem)) in &entries {
            output.push_str(&format!(
                "{name}|{}.{:02}%|{mem}MiB / 4GiB|0B / 0B|0B / 0B\n",
                cpu / 100,
                cpu % 100
            ));
        }

        let stats = OutputParser::parse_stats(&output);

        prop_assert_eq!(stats.len(), entries.len());
        for (name, (cpu, mem)) in &entries {
            let metrics = &stats[name];
            prop_assert!((metrics.cpu_percent - f64::from(*cpu) / 100.0).abs() < 1e-9);
            prop_assert_eq!(metrics.memory_usage_bytes, mem * 1024 * 1024);
            prop_assert_eq!(metrics.memory_limit_bytes, 4 * 1024 * 1024 * 1024);
        }
    }
}
