// src/core/parse.rs
//! Lossy number parsing for rating and count labels.
//! Nothing here fails: unreadable input maps to the documented zero default.

use std::sync::LazyLock;

use regex::Regex;

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("valid decimal pattern"));

// Either 3-digit groups joined by a thousands separator, or a plain digit run.
static GROUPED_INT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,3}(?:[,.\u{a0}\u{202f} ]\d{3})+\b|\d+").expect("valid integer pattern")
});

pub const MAX_RATING: f64 = 5.0;

/// "4.5 stars" → 4.5, "4,5 étoiles" → 4.5, "No rating" → 0.
/// Result is clamped to `0..=5`.
pub fn parse_rating(label: &str) -> f64 {
    DECIMAL
        .find(label)
        .and_then(|m| m.as_str().replace(',', ".").parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, MAX_RATING))
        .unwrap_or(0.0)
}

/// "1,234 reviews" → 1234, "87 reviews" → 87, "No reviews" → 0.
/// Thousands separators between 3-digit groups are dropped, not treated as a stop.
pub fn parse_reported_total(label: &str) -> u64 {
    GROUPED_INT
        .find(label)
        .map(|m| m.as_str().chars().filter(char::is_ascii_digit).collect::<String>())
        .and_then(|digits| digits.parse::<u64>().ok())
        .unwrap_or(0)
}
