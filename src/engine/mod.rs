// src/engine/mod.rs
//! Incremental collection engine.
//!
//! - [`paginate`] scrolls the source until the target, the round ceiling or stagnation.
//! - [`entry`] reveals the records list on a freshly loaded place page.
//! - [`extract`] turns record fragments into [`types::Record`]s.
//! - [`dedup`] keeps one record per identity across snapshots.
//! - [`summary`] reads place metadata and closes the run.

pub mod dedup;
pub mod entry;
pub mod extract;
pub mod locators;
pub mod paginate;
pub mod summary;
pub mod types;

pub use dedup::RecordSet;
pub use extract::{Extractor, Harvest, HarvestStats};
pub use locators::Locators;
pub use types::{CollectionRun, LoadPlan, LoadReport, PlaceSummary, Record, RunState, StopReason};
