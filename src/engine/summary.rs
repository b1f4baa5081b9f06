// src/engine/summary.rs
//! Aggregate builder: place metadata from the final snapshot, paired with the
//! deduplicated records.

use chrono::Local;
use scraper::Html;

use super::dedup::RecordSet;
use super::locators::Locators;
use super::types::{CollectionRun, PlaceSummary, DEFAULT_PLACE_NAME};
use crate::core::parse::parse_reported_total;

/// Read place-level fields from `doc`. `collected_at` is the time of this call.
pub fn summarize(locators: &Locators, doc: &Html, collected_count: usize) -> PlaceSummary {
    let root = doc.root_element();
    PlaceSummary {
        name: locators.place_name(root).unwrap_or_else(|| DEFAULT_PLACE_NAME.to_string()),
        overall_rating: locators.overall_rating(root),
        reported_total: locators.reported_total(root).map(|l| parse_reported_total(&l)).unwrap_or(0),
        collected_count,
        collected_at: Local::now(),
    }
}

/// Close the run: summary plus records in first-seen order.
pub fn assemble(locators: &Locators, doc: &Html, set: RecordSet) -> CollectionRun {
    let place = summarize(locators, doc, set.len());
    CollectionRun { place, records: set.into_records() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::Record;

    const PAGE: &str = r#"
        <h1 class="DUwDvf"> Blue  Door Cafe </h1>
        <div class="F7nice">
          <span aria-hidden="true">4.6</span>
          <span><span role="img" aria-label="4.6 stars"></span></span>
          <div aria-label="1,234 reviews">(1,234)</div>
        </div>"#;

    #[test]
    fn reads_place_fields() {
        let loc = Locators::google_maps();
        let doc = Html::parse_document(PAGE);
        let s = summarize(&loc, &doc, 7);
        assert_eq!(s.name, "Blue Door Cafe");
        assert_eq!(s.overall_rating.as_deref(), Some("4.6"));
        assert_eq!(s.reported_total, 1234);
        assert_eq!(s.collected_count, 7);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let loc = Locators::google_maps();
        let doc = Html::parse_document("<main>nothing here</main>");
        let s = summarize(&loc, &doc, 0);
        assert_eq!(s.name, DEFAULT_PLACE_NAME);
        assert_eq!(s.overall_rating, None);
        assert_eq!(s.reported_total, 0);
    }

    #[test]
    fn assemble_counts_the_deduplicated_set() {
        let loc = Locators::google_maps();
        let doc = Html::parse_document(PAGE);
        let mut set = RecordSet::new();
        for id in ["a", "b", "a"] {
            set.admit(Record::empty(id));
        }
        let run = assemble(&loc, &doc, set);
        assert_eq!(run.place.collected_count, 2);
        assert_eq!(run.records.len(), 2);
        assert_eq!(run.records[0].identity, "a");
    }
}
