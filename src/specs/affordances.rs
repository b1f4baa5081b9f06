// src/specs/affordances.rs
//! Controls the engine clicks or scrolls.

use super::EntrySpec;

/// Scrollable review list, newest layout first.
pub const SCROLL_CONTAINERS: &[&str] = &[
    "div[class*='section-scrollbox']",
    "div[class*='DxyBCb']",
    "div[class*='review-dialog-list']",
];

pub const SCROLL_FALLBACK: &str = "body";

/// "More" buttons that expand truncated review text.
pub const EXPAND_CONTROLS: &[&str] = &["button.w8nwRe", "button.LkLjZd"];

pub const ENTRIES: &[EntrySpec] = &[
    EntrySpec::CountAffordance { selectors: &["button"], pattern: r"(?i)\d[\d,.\u{a0}\u{202f}]*\s+reviews" },
    EntrySpec::LabelAffordance { selectors: &["button"], label: "All reviews" },
    EntrySpec::RatingAncestor { selectors: &["span.ceHvDb", "span.hqzQac"], ancestor: "button" },
];
