// src/source/memory.rs
//! Scripted in-memory [`Source`].
//!
//! The script is a landing document plus an ordered list of records-view
//! frames. Navigating shows the landing document; the first click on any
//! element enters the records view at frame 0; each scroll advances one frame
//! and sticks on the last one. With an empty landing document, navigation
//! lands straight in the records view (the "already visible" case).
//!
//! Handles name an element by selector and position and are resolved against
//! the current document on use. Clicking into the records view retires every
//! handle, so older ones report a transient "stale handle" error, like a live
//! DOM after a re-render.

use std::collections::HashMap;
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};

use super::{Handle, HandleTable, SelectorSet, Source};
use crate::core::html::element_text;
use crate::error::SourceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum View {
    Blank,
    Landing,
    Records(usize),
}

/// Selector that located the element and its position among the matches.
type Located = (String, usize);

pub struct MemorySource {
    landing: String,
    frames: Vec<String>,
    searches: HashMap<String, String>,
    unreachable: bool,
    fail_next: usize,
    fail_at: Vec<usize>,
    locate_calls: usize,
    fail_snapshots: usize,

    view: View,
    handles: HandleTable<Located>,

    navigations: Vec<String>,
    clicks: usize,
    scrolls: usize,
}

impl MemorySource {
    pub fn new(landing: impl Into<String>, frames: Vec<String>) -> Self {
        Self {
            landing: landing.into(),
            frames,
            searches: HashMap::new(),
            unreachable: false,
            fail_next: 0,
            fail_at: Vec::new(),
            locate_calls: 0,
            fail_snapshots: 0,
            view: View::Blank,
            handles: HandleTable::new(),
            navigations: Vec::new(),
            clicks: 0,
            scrolls: 0,
        }
    }

    /// Records already visible on arrival, no entry click needed.
    pub fn records_view(frames: Vec<String>) -> Self {
        Self::new(String::new(), frames)
    }

    pub fn with_search(mut self, query: impl Into<String>, url: impl Into<String>) -> Self {
        self.searches.insert(query.into(), url.into());
        self
    }

    /// Every navigation is rejected.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// The next `n` `locate` calls fail with a transient error.
    pub fn fail_next(mut self, n: usize) -> Self {
        self.fail_next = n;
        self
    }

    /// `locate` calls with these 1-based ordinals fail with a transient error.
    pub fn fail_locate_at(mut self, calls: &[usize]) -> Self {
        self.fail_at = calls.to_vec();
        self
    }

    /// The next `n` `snapshot` calls fail with a transient error.
    pub fn fail_snapshots(mut self, n: usize) -> Self {
        self.fail_snapshots = n;
        self
    }

    pub fn navigations(&self) -> &[String] { &self.navigations }
    pub fn clicks(&self) -> usize { self.clicks }
    pub fn scrolls(&self) -> usize { self.scrolls }

    fn current(&self) -> &str {
        match self.view {
            View::Blank => "",
            View::Landing => &self.landing,
            View::Records(i) => self.frames.get(i).map(String::as_str).unwrap_or(""),
        }
    }

    fn enter_records(&mut self) {
        self.view = View::Records(0);
        self.handles.retire();
    }

    /// Text of the element behind `handle` in the current document.
    fn resolve(&self, handle: Handle) -> Result<String, SourceError> {
        let (selector, index) = self.handles.get(handle)?;
        let doc = Html::parse_document(self.current());
        let sel = parse_selector(selector)?;
        doc.select(&sel)
            .nth(*index)
            .map(element_text)
            .ok_or_else(|| SourceError::transient(format!("stale handle {}", handle.0)))
    }
}

fn parse_selector(s: &str) -> Result<Selector, SourceError> {
    Selector::parse(s).map_err(|e| SourceError::fatal(format!("bad selector {s:?}: {e}")))
}

impl Source for MemorySource {
    fn navigate(&mut self, url: &str) -> Result<(), SourceError> {
        self.navigations.push(url.to_string());
        if self.unreachable {
            return Err(SourceError::fatal(format!("navigation rejected: {url}")));
        }
        self.handles.retire();
        self.view = if self.landing.is_empty() { View::Records(0) } else { View::Landing };
        Ok(())
    }

    fn search(&mut self, query: &str) -> Result<Option<String>, SourceError> {
        if self.unreachable {
            return Err(SourceError::fatal(format!("search rejected: {query}")));
        }
        Ok(self.searches.get(query).cloned())
    }

    fn snapshot(&mut self) -> Result<String, SourceError> {
        if self.fail_snapshots > 0 {
            self.fail_snapshots -= 1;
            return Err(SourceError::transient("page still rendering"));
        }
        match self.view {
            View::Blank => Err(SourceError::fatal("nothing loaded")),
            _ => Ok(self.current().to_string()),
        }
    }

    fn locate(&mut self, selectors: &SelectorSet) -> Result<Vec<Handle>, SourceError> {
        self.locate_calls += 1;
        if self.fail_next > 0 || self.fail_at.contains(&self.locate_calls) {
            self.fail_next = self.fail_next.saturating_sub(1);
            return Err(SourceError::transient("element not yet rendered"));
        }
        let doc = Html::parse_document(self.current());
        for raw in selectors.iter() {
            let sel = parse_selector(raw)?;
            let found = doc.select(&sel).count();
            if found == 0 { continue; }
            return Ok((0..found).map(|index| self.handles.intern((raw.to_string(), index))).collect());
        }
        Ok(Vec::new())
    }

    fn text(&mut self, handle: Handle) -> Result<String, SourceError> {
        self.resolve(handle)
    }

    fn click(&mut self, handle: Handle) -> Result<(), SourceError> {
        self.resolve(handle)?;
        self.clicks += 1;
        if self.view == View::Landing {
            self.enter_records();
        }
        Ok(())
    }

    fn click_ancestor(&mut self, handle: Handle, ancestor: &str) -> Result<bool, SourceError> {
        let (selector, index) = self.handles.get(handle)?.clone();
        let doc = Html::parse_document(self.current());
        let own = parse_selector(&selector)?;
        let wanted = parse_selector(ancestor)?;
        let el = doc
            .select(&own)
            .nth(index)
            .ok_or_else(|| SourceError::transient(format!("stale handle {}", handle.0)))?;
        let has_ancestor = el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| wanted.matches(&a));
        if !has_ancestor {
            return Ok(false);
        }
        self.clicks += 1;
        if self.view == View::Landing {
            self.enter_records();
        }
        Ok(true)
    }

    fn scroll_to_bottom(&mut self, container: Handle) -> Result<(), SourceError> {
        self.resolve(container)?;
        self.scrolls += 1;
        if let View::Records(i) = self.view {
            let last = self.frames.len().saturating_sub(1);
            self.view = View::Records((i + 1).min(last));
        }
        Ok(())
    }

    fn wait_for_element(&mut self, selectors: &SelectorSet, _timeout: Duration) -> Result<bool, SourceError> {
        let doc = Html::parse_document(self.current());
        for raw in selectors.iter() {
            let sel = parse_selector(raw)?;
            if doc.select(&sel).next().is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
