//! Property tests for size and percentage conversion

use dockwatch_core::monitoring::{parse_percentage, parse_size, parse_size_pair};
use proptest::prelude::*;

proptest! {
    /// Property: whole numbers with a binary suffix scale by the suffix
    #[test]
    fn suffixed_whole_numbers_scale(
        value in 0u64..1_000_000,
        (suffix, multiplier) in prop_oneof![
            Just(("B", 1u64)),
            Just(("KiB", 1024)),
            Just(("kB", 1024)),
            Just(("MiB", 1024 * 1024)),
            Just(("MB", 1024 * 1024)),
            Just(("GiB", 1024 * 1024 * 1024)),
        ],
    ) {
        prop_assert_eq!(parse_size(&format!("{value}{suffix}")), value * multiplier);
    }

    /// Property: bare numbers are bytes
    #[test]
    fn bare_numbers_are_bytes(value in 0u64..u64::from(u32::MAX)) {
        prop_assert_eq!(parse_size(&value.to_string()), value);
    }

    /// Property: conversion never panics on arbitrary text
    #[test]
    fn arbitrary_text_never_panics(text in ".{0,32}") {
        let _ = parse_size(&text);
        let _ = parse_percentage(&text);
        let _ = parse_size_pair(&text);
    }

    /// Property: text without digits converts to zero
    #[test]
    fn no_digits_is_zero(text in "[a-zA-Z /%]{0,16}") {
        prop_assert_eq!(parse_size(&text), 0);
        prop_assert_eq!(parse_size_pair(&text), (0, 0));
    }

    /// Property: percentages round-trip through their text form
    #[test]
    fn percentages_parse(hundredths in 0u32..100_000) {
        let value = f64::from(hundredths) / 100.0;
        let parsed = parse_percentage(&format!("{value:.2}%"));
        prop_assert!((parsed - value).abs() < 1e-9);
    }

    /// Property: each side of a pair converts independently
    #[test]
    fn pair_sides_are_independent(a in 0u64..10_000, b in 0u64..10_000) {
        prop_assert_eq!(
            parse_size_pair(&format!("{a}MiB / {b}KiB")),
            (a * 1024 * 1024, b * 1024)
        );
    }
}
