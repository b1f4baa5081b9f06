// src/engine/types.rs
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// Identity placeholder for fragments without an identity attribute.
pub const UNKNOWN_IDENTITY: &str = "unknown-id";

pub const DEFAULT_AUTHOR: &str = "Anonymous";
pub const DEFAULT_DATE: &str = "No date";
pub const DEFAULT_BODY: &str = "No text";
pub const DEFAULT_PLACE_NAME: &str = "Unknown Place";

/// One normalised review. Field order is the CSV column order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "reviewer_name")]
    pub author_name: String,
    /// 0..=5, 0 when the label was missing or unreadable.
    pub rating: f64,
    #[serde(rename = "date")]
    pub date_text: String,
    #[serde(rename = "text")]
    pub body_text: String,
    #[serde(rename = "is_local_guide")]
    pub is_verified_contributor: bool,
    #[serde(rename = "review_id")]
    pub identity: String,
}

impl Record {
    /// All-defaults record for `identity`.
    pub fn empty(identity: impl Into<String>) -> Self {
        Self {
            author_name: DEFAULT_AUTHOR.to_string(),
            rating: 0.0,
            date_text: DEFAULT_DATE.to_string(),
            body_text: DEFAULT_BODY.to_string(),
            is_verified_contributor: false,
            identity: identity.into(),
        }
    }

    pub fn has_identity(&self) -> bool {
        self.identity != UNKNOWN_IDENTITY
    }
}

/// Place-level metadata paired with the collected records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaceSummary {
    pub name: String,
    /// As displayed ("4.6"); `None` when the page shows none.
    pub overall_rating: Option<String>,
    #[serde(rename = "total_reviews")]
    pub reported_total: u64,
    #[serde(rename = "scraped_reviews_count")]
    pub collected_count: usize,
    #[serde(rename = "scrape_date")]
    pub collected_at: DateTime<Local>,
}

/// Result of one run: `{place_info, reviews}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionRun {
    #[serde(rename = "place_info")]
    pub place: PlaceSummary,
    #[serde(rename = "reviews")]
    pub records: Vec<Record>,
}

/// Limits for one pagination pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadPlan {
    pub target_count: usize,
    pub max_rounds: usize,
    pub max_stagnant_rounds: usize,
    pub pause: Duration,
    pub expand_batch: usize,
    /// Applied to setup lookups that must succeed before the first round.
    pub retry: RetryPolicy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    TargetMet,
    RoundsExhausted,
    Stagnated,
}

/// What pagination achieved. Never an error for "fewer than requested".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadReport {
    pub initial: usize,
    pub achieved: usize,
    pub rounds: usize,
    pub stop: StopReason,
}

/// Orchestrator states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Navigating,
    EnteringRecordsView,
    Paginating,
    Extracting,
    Finalizing,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
