//! Best-effort conversion of human-readable sizes and percentages
//!
//! Everything here operates on untrusted remote text and never fails:
//! anything that cannot be understood becomes `0`.

/// Recognized size suffixes and their byte multipliers.
///
/// Ordered longest-first so `GiB` wins over `B` and `kB` over `B`.
pub const SIZE_SUFFIXES: [(&str, u64); 9] = [
    ("KiB", 1024),
    ("MiB", 1024 * 1024),
    ("GiB", 1024 * 1024 * 1024),
    ("TiB", 1024 * 1024 * 1024 * 1024),
    ("kB", 1024),
    ("MB", 1024 * 1024),
    ("GB", 1024 * 1024 * 1024),
    ("TB", 1024 * 1024 * 1024 * 1024),
    ("B", 1),
];

/// Converts a size like `1.5GiB`, `800kB` or `512` into bytes.
///
/// The first matching suffix is stripped and the remainder parsed as a
/// float; if that fails the whole text is tried as a plain number.
/// Fractions are truncated toward zero. Unparseable, negative or
/// non-finite input yields `0`.
#[must_use]
pub fn parse_size(text: &str) -> u64 {
    let text = text.trim();

    let suffixed = SIZE_SUFFIXES
        .iter()
        .find_map(|(suffix, multiplier)| {
            text.strip_suffix(suffix)
                .map(|number| (number.trim(), *multiplier))
        })
        .and_then(|(number, multiplier)| {
            number
                .parse::<f64>()
                .ok()
                .map(|value| to_bytes(value * multiplier as f64))
        });

    suffixed.unwrap_or_else(|| text.parse::<f64>().map(to_bytes).unwrap_or(0))
}

/// Parses `12.34%` into `12.34`; anything unparseable is `0.0`
#[must_use]
pub fn parse_percentage(text: &str) -> f64 {
    let text = text.trim();
    text.strip_suffix('%')
        .unwrap_or(text)
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parses a `"<size> / <size>"` pair such as `1.5GiB / 2GiB`.
///
/// Each side is converted independently. Text that is not exactly two
/// sides yields `(0, 0)`.
#[must_use]
pub fn parse_size_pair(text: &str) -> (u64, u64) {
    let parts: Vec<&str> = text.split(" / ").collect();
    if parts.len() == 2 {
        (parse_size(parts[0]), parse_size(parts[1]))
    } else {
        (0, 0)
    }
}

fn to_bytes(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value as u64
    } else {
        0
    }
}
