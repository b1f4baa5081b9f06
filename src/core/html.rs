// src/core/html.rs
use scraper::{ElementRef, Selector};

use super::sanitize::normalize_ws;

/// Visible text of an element, whitespace-normalised.
pub fn element_text(el: ElementRef<'_>) -> String {
    let raw: String = el.text().collect::<Vec<_>>().join(" ");
    normalize_ws(&raw)
}

/// Attribute value, whitespace-normalised. `None` when absent.
pub fn element_attr(el: ElementRef<'_>, name: &str) -> Option<String> {
    el.value().attr(name).map(normalize_ws)
}

/// First descendant of `scope` matching `sel`.
pub fn select_first<'a>(scope: ElementRef<'a>, sel: &Selector) -> Option<ElementRef<'a>> {
    scope.select(sel).next()
}

/// Parse a CSS selector, `None` if the dialect rejects it.
pub fn compile(selector: &str) -> Option<Selector> {
    Selector::parse(selector).ok()
}
