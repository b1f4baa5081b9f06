// src/engine/paginate.rs
//! Pagination driver: scroll, wait, expand, re-count, until the target is met,
//! the round ceiling is hit, or the count stops growing.
//!
//! This is the only place where asynchronous rendering is bridged into the
//! sequential run: one action, one bounded wait, one measurement per round.

use std::thread;

use super::extract::Harvest;
use super::locators::Locators;
use super::types::{LoadPlan, LoadReport, StopReason};
use crate::error::{Result, Retryable, SourceError};
use crate::progress::Progress;
use crate::retry::retry;
use crate::source::{Handle, Source};

/// Drive the source until `plan` says stop. Returns the achieved count;
/// fewer records than requested is a normal outcome, not an error.
///
/// Errors only when the source reports a fatal error, or a setup lookup is
/// still transient after `plan.retry` runs out. With `harvest`, every round's snapshot is extracted.
pub fn load<S: Source + ?Sized>(
    source: &mut S,
    locators: &Locators,
    plan: &LoadPlan,
    sink: &dyn Progress,
    mut harvest: Option<&mut Harvest<'_, '_>>,
) -> Result<LoadReport> {
    let mut container = find_container(source, locators, plan, sink)?;

    let initial = retry(plan.retry, sink, "initial review count", |_| count_visible(source, locators))?;
    sink.info(&format!("Scroll: Initial review count: {initial}"));
    sink.begin(plan.target_count);
    if let Some(h) = harvest.as_deref_mut() {
        h.absorb(source, sink)?;
    }

    let mut current = initial;
    let mut rounds = 0usize;
    let mut stagnant = 0usize;

    while current < plan.target_count && rounds < plan.max_rounds && stagnant < plan.max_stagnant_rounds {
        rounds += 1;

        if let Err(e) = source.scroll_to_bottom(container) {
            if !e.is_transient() {
                return Err(e.into());
            }
            sink.warn(&format!("Scroll: round={rounds} scroll failed, re-locating container: {e}"));
            container = find_container(source, locators, plan, sink)?;
        }

        if !plan.pause.is_zero() {
            thread::sleep(plan.pause);
        }

        expand_truncated(source, locators, plan.expand_batch, sink);

        match count_visible(source, locators) {
            Ok(n) if n > current => {
                current = n;
                stagnant = 0;
                sink.info(&format!("Scroll: Loaded {n} reviews so far..."));
                sink.advance(n);
            }
            Ok(_) => stagnant += 1,
            Err(e) if e.is_transient() => {
                sink.warn(&format!("Scroll: round={rounds} count failed: {e}"));
                stagnant += 1;
            }
            Err(e) => return Err(e.into()),
        }

        if let Some(h) = harvest.as_deref_mut() {
            h.absorb(source, sink)?;
        }
    }

    let stop = if current >= plan.target_count {
        sink.info(&format!("Scroll: Successfully loaded requested {} reviews", plan.target_count));
        StopReason::TargetMet
    } else if stagnant >= plan.max_stagnant_rounds {
        sink.info(&format!("Scroll: Reached maximum available reviews: {current}"));
        StopReason::Stagnated
    } else {
        sink.warn(&format!("Scroll: Round ceiling {} hit at {current} reviews", plan.max_rounds));
        StopReason::RoundsExhausted
    };
    sink.finish(current);

    Ok(LoadReport { initial, achieved: current, rounds, stop })
}

/// Number of record fragments currently rendered.
pub fn count_visible<S: Source + ?Sized>(source: &mut S, locators: &Locators) -> Result<usize, SourceError> {
    source.locate(&locators.record).map(|h| h.len())
}

fn find_container<S: Source + ?Sized>(
    source: &mut S,
    locators: &Locators,
    plan: &LoadPlan,
    sink: &dyn Progress,
) -> Result<Handle> {
    match source.locate(&locators.scroll_containers) {
        Ok(found) if !found.is_empty() => return Ok(found[0]),
        Ok(_) => {}
        Err(e) if e.is_transient() => sink.debug(&format!("Scroll: container lookup failed: {e}")),
        Err(e) => return Err(e.into()),
    }
    sink.warn("Scroll: Could not find scroll container, trying body element instead");
    retry(plan.retry, sink, "scroll fallback", |_| source.locate(&locators.scroll_fallback))?
        .first()
        .copied()
        .ok_or_else(|| SourceError::fatal("no scrollable element").into())
}

/// Best-effort: click up to `batch` "More" controls, ignoring each failure.
fn expand_truncated<S: Source + ?Sized>(source: &mut S, locators: &Locators, batch: usize, sink: &dyn Progress) {
    let controls = match source.locate(&locators.expand_controls) {
        Ok(c) => c,
        Err(e) => {
            sink.debug(&format!("Scroll: expand lookup failed: {e}"));
            return;
        }
    };
    for handle in controls.into_iter().take(batch) {
        if let Err(e) = source.click(handle) {
            sink.debug(&format!("Scroll: expand click failed: {e}"));
        }
    }
}
