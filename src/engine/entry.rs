// src/engine/entry.rs
//! Revealing the records list once the place page is loaded.
//!
//! Strategies run in table order. Each one is retried on transient errors
//! under the run's [`RetryPolicy`]; a strategy whose affordance is simply not
//! on the page hands over to the next one without retrying.

use std::thread;
use std::time::Duration;

use super::locators::{Entry, Locators};
use super::paginate::count_visible;
use crate::error::{CollectError, Result, Retryable, SourceError};
use crate::progress::Progress;
use crate::retry::{retry, RetryPolicy};
use crate::source::Source;

/// Timing knobs used while entering the records view.
#[derive(Clone, Copy, Debug)]
pub struct EntryTiming {
    pub policy: RetryPolicy,
    pub ready_timeout: Duration,
    pub settle: Duration,
}

/// How the records view was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entered {
    Strategy(&'static str),
    AlreadyVisible,
}

/// Wait for the place page to report ready. `false` when it never did;
/// the caller decides whether that matters.
pub fn await_ready<S: Source + ?Sized>(
    source: &mut S,
    locators: &Locators,
    timing: &EntryTiming,
    sink: &dyn Progress,
) -> Result<bool> {
    let waited = retry(timing.policy, sink, "place page ready", |_| -> Result<(), SourceError> {
        match source.wait_for_element(&locators.ready, timing.ready_timeout)? {
            true => Ok(()),
            false => Err(SourceError::transient("place page not ready")),
        }
    });
    match waited {
        Ok(()) => Ok(true),
        Err(e) if e.is_transient() => Ok(false),
        Err(e) => Err(e.into()),
    }
}

pub fn enter_records_view<S: Source + ?Sized>(
    source: &mut S,
    locators: &Locators,
    timing: &EntryTiming,
    sink: &dyn Progress,
) -> Result<Entered> {
    for entry in &locators.entries {
        let name = entry.name();
        match retry(timing.policy, sink, name, |_| attempt(source, locators, entry, timing, sink)) {
            Ok(true) => return Ok(Entered::Strategy(name)),
            Ok(false) => sink.debug(&format!("Entry: No {name} on page")),
            Err(e) if e.is_transient() => sink.warn(&format!("Entry: Giving up on {name}: {e}")),
            Err(e) => return Err(e.into()),
        }
    }

    if count_visible(source, locators).unwrap_or(0) > 0 {
        sink.info("Entry: Reviews already visible without clicking");
        return Ok(Entered::AlreadyVisible);
    }

    sink.error("Entry: Failed to navigate to reviews section after multiple retries");
    Err(CollectError::RecordsViewUnreachable)
}

/// One try of one strategy. `Ok(false)` means the affordance is absent.
fn attempt<S: Source + ?Sized>(
    source: &mut S,
    locators: &Locators,
    entry: &Entry,
    timing: &EntryTiming,
    sink: &dyn Progress,
) -> Result<bool, SourceError> {
    match entry {
        Entry::CountAffordance { selectors, pattern } => {
            for handle in source.locate(selectors)? {
                let label = source.text(handle)?;
                if pattern.is_match(&label) {
                    source.click(handle)?;
                    sink.info(&format!("Entry: Clicked reviews section label={label:?}"));
                    return await_records(source, locators, timing);
                }
            }
            Ok(false)
        }
        Entry::LabelAffordance { selectors, label } => {
            for handle in source.locate(selectors)? {
                if source.text(handle)?.contains(label.as_str()) {
                    source.click(handle)?;
                    sink.info(&format!("Entry: Clicked {label:?} section"));
                    return await_records(source, locators, timing);
                }
            }
            Ok(false)
        }
        Entry::RatingAncestor { selectors, ancestor } => {
            for handle in source.locate(selectors)? {
                if !source.click_ancestor(handle, ancestor)? {
                    continue;
                }
                sink.info("Entry: Clicked star rating element to navigate to reviews");
                if !timing.settle.is_zero() {
                    thread::sleep(timing.settle);
                }
                if count_visible(source, locators)? > 0 {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

fn await_records<S: Source + ?Sized>(
    source: &mut S,
    locators: &Locators,
    timing: &EntryTiming,
) -> Result<bool, SourceError> {
    if source.wait_for_element(&locators.record, timing.ready_timeout)? {
        Ok(true)
    } else {
        Err(SourceError::transient("reviews did not render after click"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{Level, NullProgress, RecordingProgress};
    use crate::source::MemorySource;

    const REVIEWS: &str = r#"<div class="DxyBCb"><div data-review-id="a"></div></div>"#;

    fn timing() -> EntryTiming {
        EntryTiming { policy: RetryPolicy::new(3, Duration::ZERO), ready_timeout: Duration::ZERO, settle: Duration::ZERO }
    }

    fn landing(markup: &str) -> MemorySource {
        let mut src = MemorySource::new(markup, vec![REVIEWS.into()]);
        src.navigate("https://maps.test/place").unwrap();
        src
    }

    fn enter(src: &mut MemorySource, sink: &dyn Progress) -> Result<Entered> {
        enter_records_view(src, &Locators::google_maps(), &timing(), sink)
    }

    #[test]
    fn count_affordance_wins_first() {
        let mut src = landing(r#"<button>Overview</button><button>1,234 reviews</button><button>All reviews</button>"#);
        assert_eq!(enter(&mut src, &NullProgress).unwrap(), Entered::Strategy("count affordance"));
        assert_eq!(src.clicks(), 1);
    }

    #[test]
    fn label_affordance_is_second_choice() {
        let mut src = landing(r#"<button>Overview</button><button>All reviews</button>"#);
        assert_eq!(enter(&mut src, &NullProgress).unwrap(), Entered::Strategy("all-records affordance"));
    }

    #[test]
    fn star_rating_is_chased_to_its_button() {
        let mut src = landing(r#"<span class="ceHvDb">4.4</span><button><span class="ceHvDb">4.4</span></button>"#);
        assert_eq!(enter(&mut src, &NullProgress).unwrap(), Entered::Strategy("rating affordance"));
        assert_eq!(src.clicks(), 1);
    }

    #[test]
    fn already_visible_records_need_no_click() {
        let mut src = MemorySource::records_view(vec![REVIEWS.into()]);
        src.navigate("u").unwrap();
        assert_eq!(enter(&mut src, &NullProgress).unwrap(), Entered::AlreadyVisible);
        assert_eq!(src.clicks(), 0);
    }

    #[test]
    fn no_affordance_is_unreachable() {
        let mut src = landing("<h1>Closed</h1>");
        let sink = RecordingProgress::new();
        assert_eq!(enter(&mut src, &sink).unwrap_err(), CollectError::RecordsViewUnreachable);
        assert!(sink.contains(Level::Error, "Failed to navigate"));
    }

    #[test]
    fn transient_lookup_is_retried_within_the_strategy() {
        let mut src = landing(r#"<button>87 reviews</button>"#).fail_next(2);
        let sink = RecordingProgress::new();
        assert_eq!(enter(&mut src, &sink).unwrap(), Entered::Strategy("count affordance"));
        assert!(sink.contains(Level::Warn, "Retry 1/3: count affordance"));
        assert!(sink.contains(Level::Warn, "Retry 2/3: count affordance"));
    }

    #[test]
    fn exhausted_retries_move_on_to_next_strategy() {
        let mut src = landing(r#"<button>All reviews</button>"#).fail_next(3);
        let sink = RecordingProgress::new();
        assert_eq!(enter(&mut src, &sink).unwrap(), Entered::Strategy("all-records affordance"));
        assert!(sink.contains(Level::Warn, "Giving up on count affordance"));
    }

    #[test]
    fn ready_wait_reports_instead_of_failing() {
        let loc = Locators::google_maps();
        let mut ready = landing(r#"<h1 class="DUwDvf">Cafe</h1>"#);
        assert!(await_ready(&mut ready, &loc, &timing(), &NullProgress).unwrap());

        let mut blank = landing("<p>loading</p>");
        let sink = RecordingProgress::new();
        assert!(!await_ready(&mut blank, &loc, &timing(), &sink).unwrap());
        assert!(sink.contains(Level::Warn, "place page ready"));
    }
}
