// src/source/chrome.rs
//! Live collaborator: one headless Chrome tab.
//!
//! Handles map to DevTools node ids, one handle per node for the life of the
//! page. Nodes are re-resolved on every use; a node that left the DOM is reported as a
//! transient error so the engine re-locates instead of failing.

use std::ffi::OsStr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use serde_json::json;

use super::{Handle, HandleTable, SelectorSet, Source};
use crate::config::options::BrowserOptions;
use crate::error::SourceError;
use crate::specs::place::{SEARCH_RESULT, SEARCH_URL};

const POLL: Duration = Duration::from_millis(250);

const JS_CLICK: &str = "function() { this.click(); }";
const JS_SCROLL: &str = "function() { this.scrollTop = this.scrollHeight; }";
const JS_CLICK_ANCESTOR: &str = "function(sel) { \
    const a = this.parentElement && this.parentElement.closest(sel); \
    if (!a) { return false; } \
    a.click(); return true; }";

pub struct ChromeSource {
    // Dropping the browser kills the process; keep it for the tab's lifetime.
    _browser: Browser,
    tab: Arc<Tab>,
    nodes: HandleTable<u32>,
    timeout: Duration,
}

impl ChromeSource {
    pub fn launch(opts: &BrowserOptions) -> Result<Self, SourceError> {
        let launch = LaunchOptions::default_builder()
            .headless(opts.headless)
            .window_size(Some(opts.window))
            .idle_browser_timeout(opts.timeout.max(Duration::from_secs(60)))
            .args(vec![
                OsStr::new("--disable-notifications"),
                OsStr::new("--disable-popup-blocking"),
                OsStr::new("--disable-blink-features=AutomationControlled"),
                OsStr::new("--no-sandbox"),
                OsStr::new("--disable-dev-shm-usage"),
            ])
            .build()
            .map_err(|e| SourceError::fatal(format!("launch options: {e}")))?;

        let browser = Browser::new(launch).map_err(|e| SourceError::fatal(format!("Failed to start Chrome: {e}")))?;
        let tab = browser.new_tab().map_err(SourceError::fatal)?;
        tab.set_default_timeout(opts.timeout);
        tab.set_user_agent(opts.user_agent.as_str(), None, None).map_err(SourceError::fatal)?;
        tracing::info!("Chrome: Started headless={} ua={:?}", opts.headless, opts.user_agent);

        Ok(Self { _browser: browser, tab, nodes: HandleTable::new(), timeout: opts.timeout })
    }

    fn element(&self, handle: Handle) -> Result<Element<'_>, SourceError> {
        let node_id = *self.nodes.get(handle)?;
        Element::new(&self.tab, node_id).map_err(|e| SourceError::transient(format!("stale handle {}: {e}", handle.0)))
    }

    fn call(&self, handle: Handle, js: &str, args: Vec<serde_json::Value>) -> Result<Option<serde_json::Value>, SourceError> {
        let el = self.element(handle)?;
        let out = el.call_js_fn(js, args, false).map_err(classify)?;
        Ok(out.value)
    }

    fn present(&self, selector: &str) -> bool {
        self.tab.find_element(selector).is_ok()
    }
}

/// Map a driver error onto the transient/fatal split by its message.
fn classify(e: impl std::fmt::Display) -> SourceError {
    let msg = e.to_string();
    let lower = msg.to_ascii_lowercase();
    let transient = ["no element", "could not find node", "timed out", "timeout", "stale", "not attached"]
        .iter()
        .any(|needle| lower.contains(needle));
    if transient { SourceError::Transient(msg) } else { SourceError::Fatal(msg) }
}

impl Source for ChromeSource {
    fn navigate(&mut self, url: &str) -> Result<(), SourceError> {
        self.nodes.retire();
        self.tab
            .navigate_to(url)
            .and_then(|t| t.wait_until_navigated())
            .map_err(|e| SourceError::fatal(format!("navigation to {url} failed: {e}")))?;
        Ok(())
    }

    fn search(&mut self, query: &str) -> Result<Option<String>, SourceError> {
        let words: Vec<&str> = query.split_whitespace().collect();
        let url = SEARCH_URL.replace("{query}", &words.join("+"));
        self.navigate(&url)?;
        let link = match self.tab.wait_for_element_with_custom_timeout(SEARCH_RESULT, self.timeout) {
            Ok(el) => el,
            Err(e) => {
                tracing::warn!("Chrome: No place link for {query:?}: {e}");
                return Ok(None);
            }
        };
        link.get_attribute_value("href").map_err(classify)
    }

    fn snapshot(&mut self) -> Result<String, SourceError> {
        self.tab.get_content().map_err(classify)
    }

    fn locate(&mut self, selectors: &SelectorSet) -> Result<Vec<Handle>, SourceError> {
        for sel in selectors.iter() {
            let found = match self.tab.find_elements(sel) {
                Ok(found) => found,
                Err(e) => match classify(e) {
                    SourceError::Transient(_) => continue,
                    fatal => return Err(fatal),
                },
            };
            if found.is_empty() { continue; }
            return Ok(found.iter().map(|el| self.nodes.intern(el.node_id)).collect());
        }
        Ok(Vec::new())
    }

    fn text(&mut self, handle: Handle) -> Result<String, SourceError> {
        self.element(handle)?.get_inner_text().map_err(classify)
    }

    fn click(&mut self, handle: Handle) -> Result<(), SourceError> {
        self.call(handle, JS_CLICK, vec![]).map(|_| ())
    }

    fn click_ancestor(&mut self, handle: Handle, ancestor: &str) -> Result<bool, SourceError> {
        let clicked = self.call(handle, JS_CLICK_ANCESTOR, vec![json!(ancestor)])?;
        Ok(clicked.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    fn scroll_to_bottom(&mut self, container: Handle) -> Result<(), SourceError> {
        self.call(container, JS_SCROLL, vec![]).map(|_| ())
    }

    fn wait_for_element(&mut self, selectors: &SelectorSet, timeout: Duration) -> Result<bool, SourceError> {
        let deadline = Instant::now() + timeout;
        loop {
            if selectors.iter().any(|sel| self.present(sel)) {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            thread::sleep(POLL);
        }
    }
}
