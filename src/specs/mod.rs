// src/specs/mod.rs
//! # Selector “specs” module
//!
//! This module hosts the **page-specific locator tables** for the review source.
//! Each table encodes *where the ground truth lives in the markup* as ordered
//! strategies; nothing here walks a document or talks to a browser.
//!
//! ## What lives here
//! - **Record boundary** and identity attribute for one review fragment.
//! - **Per-field strategies** (author, rating, date, body, verified contributor),
//!   each an ordered list of `(selector, read)` pairs. The first strategy that
//!   yields a non-empty value wins; otherwise the field keeps its default.
//! - **Place fields** read once from the final snapshot (name, overall rating,
//!   reported total).
//! - **Affordances** the engine drives: place-ready marker, scroll containers,
//!   "show more text" controls, and the records-view entry strategies.
//!
//! ## What does **not** live here
//! - **Compiling and applying** selectors – `engine::locators`.
//! - **Retry, pagination, dedup** – the rest of `engine` and `runner`.
//!
//! ## Conventions & invariants
//! - Tables are `'static` data. A new markup variant is a new row, not a new branch.
//! - Order is precedence: primary selector first, fallbacks after.
//! - A selector the parser rejects is skipped with a warning at compile time,
//!   never a run failure.
//!
//! In short: **`specs` knows how to read the pages.** Other layers decide when to
//! scroll, what to retry and how to persist.

pub mod affordances;
pub mod place;
pub mod reviews;

/// How a matched element is turned into a field value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Read {
    /// Visible text.
    Text,
    /// Value of the named attribute.
    Attr(&'static str),
    /// `"true"` when the element exists at all.
    Presence,
}

/// One locator strategy for a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Strategy {
    pub selector: &'static str,
    pub read: Read,
}

pub const fn text(selector: &'static str) -> Strategy {
    Strategy { selector, read: Read::Text }
}

pub const fn attr(selector: &'static str, name: &'static str) -> Strategy {
    Strategy { selector, read: Read::Attr(name) }
}

pub const fn presence(selector: &'static str) -> Strategy {
    Strategy { selector, read: Read::Presence }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Author,
    Rating,
    Date,
    Body,
    Verified,
}

#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    pub field: Field,
    pub strategies: &'static [Strategy],
}

/// Ways to reveal the records list, tried in order.
#[derive(Clone, Copy, Debug)]
pub enum EntrySpec {
    /// Clickable whose text matches `pattern` (e.g. "1,234 reviews").
    CountAffordance { selectors: &'static [&'static str], pattern: &'static str },
    /// Clickable whose text contains `label`.
    LabelAffordance { selectors: &'static [&'static str], label: &'static str },
    /// Star-rating element, clicked through its closest `ancestor`.
    RatingAncestor { selectors: &'static [&'static str], ancestor: &'static str },
}

/// Everything the engine needs to know about one source's markup vocabulary.
#[derive(Clone, Copy, Debug)]
pub struct PageSpec {
    pub record: &'static [&'static str],
    pub identity_attr: &'static str,
    pub fields: &'static [FieldSpec],
    pub place_name: &'static [Strategy],
    pub overall_rating: &'static [Strategy],
    pub reported_total: &'static [Strategy],
    pub ready: &'static [&'static str],
    pub scroll_containers: &'static [&'static str],
    pub scroll_fallback: &'static str,
    pub expand_controls: &'static [&'static str],
    pub entries: &'static [EntrySpec],
}

/// Google Maps place page, desktop layout.
pub static GOOGLE_MAPS: PageSpec = PageSpec {
    record: reviews::RECORD,
    identity_attr: reviews::IDENTITY_ATTR,
    fields: reviews::FIELDS,
    place_name: place::NAME,
    overall_rating: place::OVERALL_RATING,
    reported_total: place::REPORTED_TOTAL,
    ready: place::READY,
    scroll_containers: affordances::SCROLL_CONTAINERS,
    scroll_fallback: affordances::SCROLL_FALLBACK,
    expand_controls: affordances::EXPAND_CONTROLS,
    entries: affordances::ENTRIES,
};
