// src/engine/extract.rs
//! Field extractor: one fragment in, one [`Record`] out.
//!
//! Total by construction. Every field resolves through its strategy list and
//! falls back to its documented default; nothing here returns an error.

use scraper::{ElementRef, Html};

use super::dedup::RecordSet;
use super::locators::Locators;
use super::types::{Record, UNKNOWN_IDENTITY};
use crate::core::parse::parse_rating;
use crate::error::{Result, Retryable};
use crate::progress::Progress;
use crate::source::Source;
use crate::specs::Field;

#[derive(Clone, Copy)]
pub struct Extractor<'a> {
    locators: &'a Locators,
}

/// Per-snapshot tallies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HarvestStats {
    pub fragments: usize,
    pub admitted: usize,
    pub degraded: usize,
}

impl<'a> Extractor<'a> {
    pub fn new(locators: &'a Locators) -> Self {
        Self { locators }
    }

    pub fn extract(&self, fragment: ElementRef<'_>) -> Record {
        let loc = self.locators;
        let identity = fragment
            .value()
            .attr(&loc.identity_attr)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(UNKNOWN_IDENTITY);

        let mut record = Record::empty(identity);
        if let Some(name) = loc.field(fragment, Field::Author) {
            record.author_name = name;
        }
        if let Some(label) = loc.field(fragment, Field::Rating) {
            record.rating = parse_rating(&label);
        }
        if let Some(date) = loc.field(fragment, Field::Date) {
            record.date_text = date;
        }
        if let Some(body) = loc.field(fragment, Field::Body) {
            record.body_text = body;
        }
        record.is_verified_contributor = loc.field(fragment, Field::Verified).is_some();
        record
    }

    /// Extract every fragment of `doc` and admit the new ones into `set`.
    pub fn harvest(&self, doc: &Html, set: &mut RecordSet, sink: &dyn Progress) -> HarvestStats {
        let mut stats = HarvestStats::default();
        for fragment in self.locators.fragments(doc.root_element()) {
            stats.fragments += 1;
            let record = self.extract(fragment);
            if !record.has_identity() || record.rating == 0.0 {
                stats.degraded += 1;
                sink.debug(&format!(
                    "Extract: Degraded fragment id={} rating={} author={:?}",
                    record.identity, record.rating, record.author_name
                ));
            }
            if set.admit(record) {
                stats.admitted += 1;
            }
        }
        stats
    }

    /// Parse `markup` and harvest it.
    pub fn harvest_markup(&self, markup: &str, set: &mut RecordSet, sink: &dyn Progress) -> HarvestStats {
        let doc = Html::parse_document(markup);
        self.harvest(&doc, set, sink)
    }
}

/// Extractor plus the run's record set, fed one snapshot at a time.
pub struct Harvest<'a, 'b> {
    pub extractor: Extractor<'a>,
    pub set: &'b mut RecordSet,
}

impl<'a, 'b> Harvest<'a, 'b> {
    pub fn new(extractor: Extractor<'a>, set: &'b mut RecordSet) -> Self {
        Self { extractor, set }
    }

    /// Snapshot the source and admit what is new. A transient snapshot
    /// failure skips this round; its fragments are offered again next time.
    pub fn absorb<S: Source + ?Sized>(&mut self, source: &mut S, sink: &dyn Progress) -> Result<HarvestStats> {
        let markup = match source.snapshot() {
            Ok(m) => m,
            Err(e) if e.is_transient() => {
                sink.warn(&format!("Extract: Snapshot skipped: {e}"));
                return Ok(HarvestStats::default());
            }
            Err(e) => return Err(e.into()),
        };
        let stats = self.extractor.harvest_markup(&markup, self.set, sink);
        sink.debug(&format!(
            "Extract: fragments={} admitted={} total={}",
            stats.fragments, stats.admitted, self.set.len()
        ));
        Ok(stats)
    }
}
