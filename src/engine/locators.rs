// src/engine/locators.rs
//! Compiled form of a [`PageSpec`].
//!
//! Selectors used against the markup snapshot are parsed once here. Selector
//! sets handed to the collaborator stay as strings. Entry-strategy patterns are
//! compiled to `Regex`. Anything that fails to compile is dropped with a
//! warning so one bad row never takes the whole table down.

use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::core::html::{compile, element_attr, element_text, select_first};
use crate::progress::{Progress, TracingProgress};
use crate::source::SelectorSet;
use crate::specs::{EntrySpec, Field, PageSpec, Read, Strategy, GOOGLE_MAPS};

#[derive(Debug)]
pub struct CompiledStrategy {
    pub selector: Selector,
    pub read: Read,
}

/// Compiled records-view entry strategy.
#[derive(Debug)]
pub enum Entry {
    CountAffordance { selectors: SelectorSet, pattern: Regex },
    LabelAffordance { selectors: SelectorSet, label: String },
    RatingAncestor { selectors: SelectorSet, ancestor: String },
}

impl Entry {
    pub fn name(&self) -> &'static str {
        match self {
            Entry::CountAffordance { .. } => "count affordance",
            Entry::LabelAffordance { .. } => "all-records affordance",
            Entry::RatingAncestor { .. } => "rating affordance",
        }
    }
}

#[derive(Debug)]
pub struct Locators {
    pub record: SelectorSet,
    pub identity_attr: String,
    pub ready: SelectorSet,
    pub scroll_containers: SelectorSet,
    pub scroll_fallback: SelectorSet,
    pub expand_controls: SelectorSet,
    pub entries: Vec<Entry>,

    record_selectors: Vec<Selector>,
    fields: Vec<(Field, Vec<CompiledStrategy>)>,
    place_name: Vec<CompiledStrategy>,
    overall_rating: Vec<CompiledStrategy>,
    reported_total: Vec<CompiledStrategy>,
}

impl Default for Locators {
    fn default() -> Self {
        Self::google_maps()
    }
}

impl Locators {
    pub fn google_maps() -> Self {
        Self::compile(&GOOGLE_MAPS, &TracingProgress)
    }

    pub fn compile(spec: &PageSpec, sink: &dyn Progress) -> Self {
        let record_selectors = spec
            .record
            .iter()
            .filter_map(|s| compile_logged(s, sink))
            .collect();

        let fields = spec
            .fields
            .iter()
            .map(|f| (f.field, compile_strategies(f.strategies, sink)))
            .collect();

        let entries = spec
            .entries
            .iter()
            .filter_map(|e| match *e {
                EntrySpec::CountAffordance { selectors, pattern } => match Regex::new(pattern) {
                    Ok(pattern) => Some(Entry::CountAffordance { selectors: SelectorSet::from_static(selectors), pattern }),
                    Err(err) => {
                        sink.warn(&format!("Specs: Dropping count affordance, bad pattern {pattern:?}: {err}"));
                        None
                    }
                },
                EntrySpec::LabelAffordance { selectors, label } => Some(Entry::LabelAffordance {
                    selectors: SelectorSet::from_static(selectors),
                    label: label.to_string(),
                }),
                EntrySpec::RatingAncestor { selectors, ancestor } => Some(Entry::RatingAncestor {
                    selectors: SelectorSet::from_static(selectors),
                    ancestor: ancestor.to_string(),
                }),
            })
            .collect();

        Self {
            record: SelectorSet::from_static(spec.record),
            identity_attr: spec.identity_attr.to_string(),
            ready: SelectorSet::from_static(spec.ready),
            scroll_containers: SelectorSet::from_static(spec.scroll_containers),
            scroll_fallback: SelectorSet::from_static(&[spec.scroll_fallback]),
            expand_controls: SelectorSet::from_static(spec.expand_controls),
            entries,
            record_selectors,
            fields,
            place_name: compile_strategies(spec.place_name, sink),
            overall_rating: compile_strategies(spec.overall_rating, sink),
            reported_total: compile_strategies(spec.reported_total, sink),
        }
    }

    /// Record fragments in `root`, by the first record selector that matches.
    pub fn fragments<'a>(&self, root: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        for sel in &self.record_selectors {
            let found: Vec<_> = root.select(sel).collect();
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    pub fn field(&self, scope: ElementRef<'_>, field: Field) -> Option<String> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, strategies)| resolve(scope, strategies))
    }

    pub fn place_name(&self, root: ElementRef<'_>) -> Option<String> {
        resolve(root, &self.place_name)
    }

    pub fn overall_rating(&self, root: ElementRef<'_>) -> Option<String> {
        resolve(root, &self.overall_rating)
    }

    pub fn reported_total(&self, root: ElementRef<'_>) -> Option<String> {
        resolve(root, &self.reported_total)
    }
}

/// First strategy yielding a non-empty value wins.
pub fn resolve(scope: ElementRef<'_>, strategies: &[CompiledStrategy]) -> Option<String> {
    strategies.iter().find_map(|s| {
        let el = select_first(scope, &s.selector)?;
        let value = match s.read {
            Read::Text => element_text(el),
            Read::Attr(name) => element_attr(el, name)?,
            Read::Presence => "true".to_string(),
        };
        (!value.is_empty()).then_some(value)
    })
}

fn compile_strategies(strategies: &[Strategy], sink: &dyn Progress) -> Vec<CompiledStrategy> {
    strategies
        .iter()
        .filter_map(|s| compile_logged(s.selector, sink).map(|selector| CompiledStrategy { selector, read: s.read }))
        .collect()
}

fn compile_logged(selector: &str, sink: &dyn Progress) -> Option<Selector> {
    let compiled = compile(selector);
    if compiled.is_none() {
        sink.warn(&format!("Specs: Skipping selector the parser rejects: {selector:?}"));
    }
    compiled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{Level, RecordingProgress};
    use crate::specs::{attr, text, FieldSpec};
    use scraper::Html;

    #[test]
    fn google_maps_table_compiles_completely() {
        let sink = RecordingProgress::new();
        let loc = Locators::compile(&GOOGLE_MAPS, &sink);
        assert!(sink.lines().iter().all(|(l, _)| *l != Level::Warn), "{:?}", sink.lines());
        assert_eq!(loc.entries.len(), 3);
        assert_eq!(loc.record_selectors.len(), 2);
    }

    #[test]
    fn bad_rows_are_skipped_not_fatal() {
        static FIELDS: &[FieldSpec] = &[FieldSpec {
            field: Field::Author,
            strategies: &[text("span[[broken"), text(".name")],
        }];
        static SPEC: PageSpec = PageSpec {
            record: &["div[[", "div.r"],
            identity_attr: "data-id",
            fields: FIELDS,
            place_name: &[],
            overall_rating: &[],
            reported_total: &[],
            ready: &[],
            scroll_containers: &[],
            scroll_fallback: "body",
            expand_controls: &[],
            entries: &[EntrySpec::CountAffordance { selectors: &["button"], pattern: "(" }],
        };
        let sink = RecordingProgress::new();
        let loc = Locators::compile(&SPEC, &sink);
        assert!(loc.entries.is_empty());
        assert!(sink.contains(Level::Warn, "span[[broken"));

        let doc = Html::parse_document(r#"<div class="r"><span class="name">Ana</span></div>"#);
        let frags = loc.fragments(doc.root_element());
        assert_eq!(frags.len(), 1);
        assert_eq!(loc.field(frags[0], Field::Author).as_deref(), Some("Ana"));
    }

    #[test]
    fn empty_values_fall_through_to_next_strategy() {
        let strategies = compile_strategies(
            &[text(".primary"), attr(".labelled", "aria-label"), text(".fallback")],
            &crate::progress::NullProgress,
        );
        let doc = Html::parse_document(
            r#"<div><span class="primary">   </span><i class="labelled"></i><b class="fallback">ok</b></div>"#,
        );
        assert_eq!(resolve(doc.root_element(), &strategies).as_deref(), Some("ok"));
    }
}
