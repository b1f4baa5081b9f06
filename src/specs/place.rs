// src/specs/place.rs
//! Place-level tables, read once from the final snapshot.
//!
//! - Name: the page headline (`h1.fontHeadlineLarge`, newer `h1.DUwDvf`).
//! - Overall rating: the visible number next to the stars, kept as reported.
//! - Reported total: the `aria-label` of the review count ("1,234 reviews").

use super::{attr, text, Strategy};

pub const NAME: &[Strategy] = &[text("h1.fontHeadlineLarge"), text("h1.DUwDvf")];

pub const OVERALL_RATING: &[Strategy] = &[text("div.F7nice span[aria-hidden='true']")];

pub const REPORTED_TOTAL: &[Strategy] = &[
    attr("div.F7nice div[aria-label*='reviews']", "aria-label"),
    attr("div.F7nice span[aria-label*='reviews']", "aria-label"),
];

/// Present once the place panel has rendered.
pub const READY: &[&str] = &["div.fontHeadlineSmall", "h1.DUwDvf"];

/// Lookup: `{query}` is replaced by the `+`-joined words.
pub const SEARCH_URL: &str = "https://www.google.com/maps/search/{query}";

/// First place link in the lookup results.
pub const SEARCH_RESULT: &str = "a[href*='maps/place']";
