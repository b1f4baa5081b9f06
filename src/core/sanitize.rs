// src/core/sanitize.rs

/// Collapse whitespace runs (NBSP and narrow NBSP included) to one space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// File-name stem for a business: lowercase ASCII alphanumerics, every other
/// character becomes `_`, runs of `_` collapse, edges are trimmed.
pub fn sanitize_business_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_us = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() { out.push(ch.to_ascii_lowercase()); last_us = false; }
        else if !last_us { out.push('_'); last_us = true; }
    }
    let out = out.trim_matches('_').to_string();
    if out.is_empty() { "business".to_string() } else { out }
}
