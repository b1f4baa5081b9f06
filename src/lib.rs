// src/lib.rs
//! Incremental review harvester.
//!
//! A [`runner::Collector`] drives a [`source::Source`] (a live browser tab or
//! a scripted in-memory page) through navigation, records-view entry,
//! scroll pagination, extraction and deduplication, and hands the finished
//! [`engine::CollectionRun`] to an [`file::Output`].

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod specs;

pub mod engine;
pub mod error;
pub mod file;
pub mod log;
pub mod progress;
pub mod retry;
pub mod runner;
pub mod source;

pub use engine::{CollectionRun, PlaceSummary, Record};
pub use error::{CollectError, SourceError};
pub use runner::{Collector, Outcome, Target};
