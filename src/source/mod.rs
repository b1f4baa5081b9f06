// src/source/mod.rs
//! # Collaborator boundary
//!
//! The engine never touches a browser directly. Everything it needs from the
//! rendering surface goes through [`Source`]: navigation, a markup snapshot,
//! and a handful of element primitives addressed by opaque [`Handle`]s.
//!
//! Handles are only valid for the document state they were located in. After
//! the page re-renders a source may report a stale handle as
//! [`SourceError::Transient`], which the engine retries or re-locates.
//!
//! Implementations:
//! - [`MemorySource`] – scripted, in-memory documents (tests, `--replay`).
//! - `ChromeSource` (feature `chrome`) – a live headless Chrome tab.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use crate::error::SourceError;

pub mod memory;
#[cfg(feature = "chrome")]
pub mod chrome;

pub use memory::MemorySource;

/// Opaque reference to an element located in the current document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle(pub u64);

/// Handle bookkeeping for a source. Locating an element that already has a
/// handle returns the same one, so the table grows with distinct elements
/// rather than with lookups. [`HandleTable::retire`] invalidates everything
/// issued so far; handle numbers keep increasing across retirements.
#[derive(Debug)]
pub struct HandleTable<K> {
    base: u64,
    slots: Vec<K>,
    index: HashMap<K, u64>,
}

impl<K: Clone + Eq + Hash> HandleTable<K> {
    pub fn new() -> Self {
        Self { base: 0, slots: Vec::new(), index: HashMap::new() }
    }

    pub fn intern(&mut self, key: K) -> Handle {
        if let Some(&id) = self.index.get(&key) {
            return Handle(id);
        }
        let id = self.base + self.slots.len() as u64;
        self.slots.push(key.clone());
        self.index.insert(key, id);
        Handle(id)
    }

    /// Transient for a retired handle, fatal for one never issued.
    pub fn get(&self, handle: Handle) -> Result<&K, SourceError> {
        if handle.0 < self.base {
            return Err(SourceError::transient(format!("stale handle {}", handle.0)));
        }
        self.slots
            .get((handle.0 - self.base) as usize)
            .ok_or_else(|| SourceError::fatal(format!("unknown handle {}", handle.0)))
    }

    pub fn retire(&mut self) {
        self.base += self.slots.len() as u64;
        self.slots.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize { self.slots.len() }
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }
}

impl<K: Clone + Eq + Hash> Default for HandleTable<K> {
    fn default() -> Self { Self::new() }
}

/// Ordered CSS selector alternatives. The first one that matches wins.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SelectorSet(Vec<String>);

impl SelectorSet {
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(selectors.into_iter().map(Into::into).collect())
    }

    pub fn from_static(selectors: &[&str]) -> Self {
        Self::new(selectors.iter().copied())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

/// What the collection engine requires from the browser-control boundary.
pub trait Source {
    /// Load `url` in the current session.
    fn navigate(&mut self, url: &str) -> Result<(), SourceError>;

    /// Resolve a free-text lookup to the address of its first match.
    fn search(&mut self, query: &str) -> Result<Option<String>, SourceError>;

    /// Currently rendered markup.
    fn snapshot(&mut self) -> Result<String, SourceError>;

    /// Elements matching the first selector in `selectors` that matches anything.
    fn locate(&mut self, selectors: &SelectorSet) -> Result<Vec<Handle>, SourceError>;

    /// Visible text of a located element.
    fn text(&mut self, handle: Handle) -> Result<String, SourceError>;

    fn click(&mut self, handle: Handle) -> Result<(), SourceError>;

    /// Click the closest ancestor of `handle` matching `ancestor`.
    /// `Ok(false)` when there is no such ancestor.
    fn click_ancestor(&mut self, handle: Handle, ancestor: &str) -> Result<bool, SourceError>;

    fn scroll_to_bottom(&mut self, container: Handle) -> Result<(), SourceError>;

    /// Block up to `timeout` for any of `selectors` to be present.
    fn wait_for_element(&mut self, selectors: &SelectorSet, timeout: Duration) -> Result<bool, SourceError>;
}

impl<S: Source + ?Sized> Source for &mut S {
    fn navigate(&mut self, url: &str) -> Result<(), SourceError> { (**self).navigate(url) }
    fn search(&mut self, query: &str) -> Result<Option<String>, SourceError> { (**self).search(query) }
    fn snapshot(&mut self) -> Result<String, SourceError> { (**self).snapshot() }
    fn locate(&mut self, selectors: &SelectorSet) -> Result<Vec<Handle>, SourceError> { (**self).locate(selectors) }
    fn text(&mut self, handle: Handle) -> Result<String, SourceError> { (**self).text(handle) }
    fn click(&mut self, handle: Handle) -> Result<(), SourceError> { (**self).click(handle) }
    fn click_ancestor(&mut self, handle: Handle, ancestor: &str) -> Result<bool, SourceError> {
        (**self).click_ancestor(handle, ancestor)
    }
    fn scroll_to_bottom(&mut self, container: Handle) -> Result<(), SourceError> { (**self).scroll_to_bottom(container) }
    fn wait_for_element(&mut self, selectors: &SelectorSet, timeout: Duration) -> Result<bool, SourceError> {
        (**self).wait_for_element(selectors, timeout)
    }
}
