// src/runner.rs
//! Collection orchestrator.
//!
//! One run walks `Idle → Navigating → EnteringRecordsView → Paginating →
//! Extracting → Finalizing → Done`, or ends in `Failed` from any of them.
//! Failure carries no partial data: [`Outcome::into_parts`] yields
//! `(None, None)`.

use std::path::PathBuf;

use scraper::Html;

use crate::config::options::CollectOptions;
use crate::engine::entry::{await_ready, enter_records_view, Entered, EntryTiming};
use crate::engine::paginate::load;
use crate::engine::summary::assemble;
use crate::engine::types::{CollectionRun, LoadReport, PlaceSummary, Record, RunState};
use crate::engine::{Extractor, Harvest, Locators, RecordSet};
use crate::error::{CollectError, Result};
use crate::file::Output;
use crate::progress::Progress;
use crate::retry::retry;
use crate::source::Source;

/// What to collect: a known place address, or a free-text lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Url(String),
    Query(String),
}

impl Target {
    pub fn label(&self) -> &str {
        match self {
            Target::Url(u) => u,
            Target::Query(q) => q,
        }
    }
}

#[derive(Debug)]
pub struct Completed {
    pub run: CollectionRun,
    /// Empty when nothing was written or writing failed.
    pub artifacts: Vec<PathBuf>,
    pub load: LoadReport,
    pub entered: Entered,
}

#[derive(Debug)]
pub enum Outcome {
    Done(Completed),
    Failed(CollectError),
}

impl Outcome {
    pub fn is_done(&self) -> bool { matches!(self, Outcome::Done(_)) }

    /// The caller-facing pair: both `Some` on success, `(None, None)` on failure.
    pub fn into_parts(self) -> (Option<PlaceSummary>, Option<Vec<Record>>) {
        match self {
            Outcome::Done(c) => (Some(c.run.place), Some(c.run.records)),
            Outcome::Failed(_) => (None, None),
        }
    }
}

/// Drives runs against one collaborator. Runs are sequential and share only
/// the source; every run starts from `Idle` with a fresh record set.
pub struct Collector<'p, S: Source> {
    source: S,
    locators: Locators,
    options: CollectOptions,
    sink: &'p dyn Progress,
    state: RunState,
}

impl<'p, S: Source> Collector<'p, S> {
    pub fn new(source: S, options: CollectOptions, sink: &'p dyn Progress) -> Self {
        Self { source, locators: Locators::default(), options, sink, state: RunState::Idle }
    }

    pub fn with_locators(mut self, locators: Locators) -> Self {
        self.locators = locators;
        self
    }

    pub fn state(&self) -> RunState { self.state }
    pub fn options(&self) -> &CollectOptions { &self.options }
    pub fn source(&self) -> &S { &self.source }
    pub fn source_mut(&mut self) -> &mut S { &mut self.source }
    pub fn into_source(self) -> S { self.source }

    pub fn run(&mut self, target: &Target, output: &mut dyn Output) -> Outcome {
        self.state = RunState::Idle;
        self.sink.info(&format!("Run: Starting target={:?}", target.label()));
        match self.drive(target, output) {
            Ok(done) => {
                transition(&mut self.state, self.sink, RunState::Done);
                Outcome::Done(done)
            }
            Err(e) => {
                self.sink.error(&format!("Run: Failed in {} state: {e}", self.state));
                transition(&mut self.state, self.sink, RunState::Failed);
                Outcome::Failed(e)
            }
        }
    }

    fn drive(&mut self, target: &Target, output: &mut dyn Output) -> Result<Completed> {
        transition(&mut self.state, self.sink, RunState::Navigating);
        let url = self.resolve(target)?;
        self.source
            .navigate(&url)
            .map_err(|e| CollectError::Unreachable(format!("{url}: {e}")))?;

        let timing = EntryTiming {
            policy: self.options.retry,
            ready_timeout: self.options.ready_timeout,
            settle: self.options.settle,
        };
        if !await_ready(&mut self.source, &self.locators, &timing, self.sink)? {
            self.sink.warn("Run: Place page never reported ready, trying entry strategies anyway");
        }

        transition(&mut self.state, self.sink, RunState::EnteringRecordsView);
        let entered = enter_records_view(&mut self.source, &self.locators, &timing, self.sink)?;

        transition(&mut self.state, self.sink, RunState::Paginating);
        let plan = self.options.load_plan();
        let extractor = Extractor::new(&self.locators);
        let mut set = RecordSet::new();
        let report = if self.options.incremental {
            let mut harvest = Harvest::new(extractor, &mut set);
            load(&mut self.source, &self.locators, &plan, self.sink, Some(&mut harvest))?
        } else {
            load(&mut self.source, &self.locators, &plan, self.sink, None)?
        };
        if report.achieved == 0 {
            return Err(CollectError::NoRecords);
        }

        transition(&mut self.state, self.sink, RunState::Extracting);
        let source = &mut self.source;
        let markup = retry(self.options.retry, self.sink, "final snapshot", |_| source.snapshot())?;
        let doc = Html::parse_document(&markup);
        let stats = extractor.harvest(&doc, &mut set, self.sink);
        if stats.degraded > 0 {
            self.sink.debug(&format!("Extract: degraded={} of fragments={}", stats.degraded, stats.fragments));
        }

        transition(&mut self.state, self.sink, RunState::Finalizing);
        let run = assemble(&self.locators, &doc, set);
        self.sink.info(&format!(
            "Extract: Successfully extracted {} reviews for {}",
            run.records.len(),
            run.place.name
        ));
        let artifacts = match output.persist(&run) {
            Ok(paths) => paths,
            Err(e) => {
                self.sink.error(&format!("Export: Error saving reviews: {e}"));
                Vec::new()
            }
        };

        Ok(Completed { run, artifacts, load: report, entered })
    }

    fn resolve(&mut self, target: &Target) -> Result<String> {
        match target {
            Target::Url(url) => Ok(url.clone()),
            Target::Query(query) => {
                let found = self
                    .source
                    .search(query)
                    .map_err(|e| CollectError::Unreachable(format!("lookup {query:?}: {e}")))?;
                match found {
                    Some(url) => {
                        self.sink.info(&format!("Run: Found place URL: {url}"));
                        Ok(url)
                    }
                    None => Err(CollectError::Unreachable(format!("Could not find URL for business: {query}"))),
                }
            }
        }
    }
}

fn transition(state: &mut RunState, sink: &dyn Progress, next: RunState) {
    sink.debug(&format!("Run: {state} -> {next}"));
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::NullOutput;
    use crate::progress::{Level, NullProgress, RecordingProgress};
    use crate::error::SourceError;
    use crate::source::{Handle, MemorySource, SelectorSet};
    use std::time::Duration;

    fn fast() -> CollectOptions {
        CollectOptions::default().without_waits()
    }

    const PLACE: &str = r#"<h1 class="DUwDvf">Corner Deli</h1><button>3 reviews</button>"#;

    fn reviews(n: usize) -> String {
        let body: String = (0..n)
            .map(|i| format!(r#"<div data-review-id="r{i}"><span aria-label="5 stars"></span></div>"#))
            .collect();
        format!(r#"<h1 class="DUwDvf">Corner Deli</h1><div class="DxyBCb">{body}</div>"#)
    }

    #[test]
    fn failed_run_yields_sentinel_pair() {
        let src = MemorySource::new(PLACE, vec![]);
        let mut c = Collector::new(src, fast(), &NullProgress);
        let outcome = c.run(&Target::Query("nowhere".into()), &mut NullOutput);
        assert!(matches!(outcome, Outcome::Failed(CollectError::Unreachable(_))));
        assert_eq!(outcome.into_parts(), (None, None));
        assert_eq!(c.state(), RunState::Failed);
    }

    #[test]
    fn state_walk_is_logged() {
        let src = MemorySource::new(PLACE, vec![reviews(3)]);
        let sink = RecordingProgress::new();
        let mut c = Collector::new(src, fast(), &sink);
        let outcome = c.run(&Target::Url("https://maps.test/deli".into()), &mut NullOutput);
        assert!(outcome.is_done());
        assert_eq!(c.state(), RunState::Done);
        for step in [
            "Idle -> Navigating",
            "Navigating -> EnteringRecordsView",
            "EnteringRecordsView -> Paginating",
            "Paginating -> Extracting",
            "Extracting -> Finalizing",
            "Finalizing -> Done",
        ] {
            assert!(sink.contains(Level::Debug, step), "missing {step}");
        }
    }

    /// Records render for the entry check, then the list comes back empty.
    struct Vanishing(MemorySource);

    impl Source for Vanishing {
        fn navigate(&mut self, url: &str) -> std::result::Result<(), SourceError> { self.0.navigate(url) }
        fn search(&mut self, q: &str) -> std::result::Result<Option<String>, SourceError> { self.0.search(q) }
        fn snapshot(&mut self) -> std::result::Result<String, SourceError> { self.0.snapshot() }
        fn locate(&mut self, set: &SelectorSet) -> std::result::Result<Vec<Handle>, SourceError> {
            if set.iter().any(|s| s.contains("data-review-id")) {
                return Ok(Vec::new());
            }
            self.0.locate(set)
        }
        fn text(&mut self, h: Handle) -> std::result::Result<String, SourceError> { self.0.text(h) }
        fn click(&mut self, h: Handle) -> std::result::Result<(), SourceError> { self.0.click(h) }
        fn click_ancestor(&mut self, h: Handle, a: &str) -> std::result::Result<bool, SourceError> {
            self.0.click_ancestor(h, a)
        }
        fn scroll_to_bottom(&mut self, h: Handle) -> std::result::Result<(), SourceError> { self.0.scroll_to_bottom(h) }
        fn wait_for_element(&mut self, set: &SelectorSet, t: Duration) -> std::result::Result<bool, SourceError> {
            self.0.wait_for_element(set, t)
        }
    }

    #[test]
    fn empty_records_view_is_no_records() {
        let src = Vanishing(MemorySource::new(PLACE, vec![reviews(3)]));
        let mut c = Collector::new(src, fast(), &NullProgress);
        let outcome = c.run(&Target::Url("u".into()), &mut NullOutput);
        assert!(matches!(outcome, Outcome::Failed(CollectError::NoRecords)));
        assert_eq!(c.state(), RunState::Failed);
    }

    #[test]
    fn collector_is_reusable_across_runs() {
        let src = MemorySource::new(PLACE, vec![reviews(2)]).with_search("deli", "https://maps.test/deli");
        let mut c = Collector::new(src, fast(), &NullProgress);
        let first = c.run(&Target::Query("deli".into()), &mut NullOutput);
        let second = c.run(&Target::Url("https://maps.test/deli".into()), &mut NullOutput);
        let (Outcome::Done(a), Outcome::Done(b)) = (first, second) else { panic!("both runs should complete") };
        assert_eq!(a.run.records.len(), 2);
        assert_eq!(b.run.records.len(), 2);
        assert_eq!(c.source().navigations().len(), 2);
    }

    struct BrokenOutput;
    impl Output for BrokenOutput {
        fn persist(&mut self, _run: &CollectionRun) -> std::result::Result<Vec<PathBuf>, crate::error::ExportError> {
            Err(crate::error::ExportError::NotADirectory("out".into()))
        }
    }

    #[test]
    fn export_failure_keeps_the_data() {
        let src = MemorySource::new(PLACE, vec![reviews(3)]);
        let sink = RecordingProgress::new();
        let mut c = Collector::new(src, fast(), &sink);
        let Outcome::Done(done) = c.run(&Target::Url("u".into()), &mut BrokenOutput) else { panic!("run should complete") };
        assert!(done.artifacts.is_empty());
        assert_eq!(done.run.place.collected_count, 3);
        assert!(sink.contains(Level::Error, "Error saving reviews"));
    }
}
