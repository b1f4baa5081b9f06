// src/engine/dedup.rs
//! Record deduplicator.
//!
//! Every pagination round re-reads the whole rendered list, so the same
//! fragment is extracted many times. The set keeps the first record seen per
//! identity, in first-seen order.
//!
//! Fragments without an identity get a content-derived one,
//! `unknown-<16 hex of SHA-256>`, over author, rating, date, the first
//! [`BODY_KEY_CHARS`] characters of the body and the verified flag. Expanding
//! a truncated body between rounds keeps its prefix, so both readings of one
//! review collapse; reviews that differ earlier than that never do.

use indexmap::IndexMap;
use sha2::{Digest, Sha256};

use super::types::Record;

/// Body characters that take part in a content identity.
pub const BODY_KEY_CHARS: usize = 48;

#[derive(Debug, Default)]
pub struct RecordSet {
    records: IndexMap<String, Record>,
}

impl RecordSet {
    pub fn new() -> Self { Self::default() }

    /// `true` if `record` was new and is now part of the set.
    pub fn admit(&mut self, mut record: Record) -> bool {
        if !record.has_identity() {
            record.identity = content_identity(&record);
        }
        if self.records.contains_key(&record.identity) {
            return false;
        }
        self.records.insert(record.identity.clone(), record);
        true
    }

    pub fn contains(&self, identity: &str) -> bool { self.records.contains_key(identity) }
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn into_records(self) -> Vec<Record> {
        self.records.into_values().collect()
    }
}

/// Stable stand-in identity for a record the source gave none.
pub fn content_identity(record: &Record) -> String {
    let rating = record.rating.to_string();
    let body_key = match record.body_text.char_indices().nth(BODY_KEY_CHARS) {
        Some((cut, _)) => &record.body_text[..cut],
        None => record.body_text.as_str(),
    };
    let mut h = Sha256::new();
    for part in [
        record.author_name.as_str(),
        rating.as_str(),
        record.date_text.as_str(),
        body_key,
        if record.is_verified_contributor { "1" } else { "0" },
    ] {
        h.update(part.as_bytes());
        h.update([0x1f_u8]);
    }
    let hex = format!("{:x}", h.finalize());
    format!("unknown-{}", &hex[..16])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::UNKNOWN_IDENTITY;

    fn rec(id: &str, body: &str) -> Record {
        let mut r = Record::empty(id);
        r.body_text = body.to_string();
        r
    }

    #[test]
    fn same_identity_admitted_once() {
        let mut set = RecordSet::new();
        assert!(set.admit(rec("a", "first")));
        assert!(!set.admit(rec("a", "second copy")));
        assert!(set.admit(rec("b", "other")));
        let out = set.into_records();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].body_text, "first");
        assert_eq!(out[1].identity, "b");
    }

    #[test]
    fn identity_less_records_do_not_collide() {
        let mut set = RecordSet::new();
        assert!(set.admit(rec(UNKNOWN_IDENTITY, "great")));
        assert!(set.admit(rec(UNKNOWN_IDENTITY, "awful")));
        assert!(!set.admit(rec(UNKNOWN_IDENTITY, "great")));
        let out = set.into_records();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.identity.starts_with("unknown-") && r.identity.len() == "unknown-".len() + 16));
        assert_ne!(out[0].identity, out[1].identity);
    }

    #[test]
    fn content_identity_is_stable() {
        let a = rec(UNKNOWN_IDENTITY, "same");
        assert_eq!(content_identity(&a), content_identity(&a.clone()));
        let mut b = a.clone();
        b.is_verified_contributor = true;
        assert_ne!(content_identity(&a), content_identity(&b));
    }

    #[test]
    fn expanded_body_keeps_the_truncated_identity() {
        let full = "The ramen broth was rich and the noodles had real bite. Service was quick, seating tight.";
        let truncated = format!("{}…", &full[..60]);
        let mut set = RecordSet::new();
        assert!(set.admit(rec(UNKNOWN_IDENTITY, &truncated)));
        assert!(!set.admit(rec(UNKNOWN_IDENTITY, full)));
        assert_eq!(set.len(), 1);
        assert_eq!(set.into_records()[0].body_text, truncated);
    }
}
