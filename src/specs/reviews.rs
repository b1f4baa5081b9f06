// src/specs/reviews.rs
//! Review fragment tables.
//!
//! Purpose:
//! - Locate one review's region (`div[data-review-id]`, older layouts `div.jftiEf`).
//! - Per field, the class names seen across layout variants, current first.
//!
//! Rating is read from the `aria-label` ("4 stars", "5 étoiles"), never from the
//! star glyphs. Identity is the `data-review-id` attribute on the fragment itself.

use super::{attr, presence, text, Field, FieldSpec, Strategy};

pub const RECORD: &[&str] = &["div[data-review-id]", "div.jftiEf"];

pub const IDENTITY_ATTR: &str = "data-review-id";

const AUTHOR: &[Strategy] = &[text(".d4r55"), text(".TSUbDb")];

const RATING: &[Strategy] = &[
    attr("span[aria-label*='stars']", "aria-label"),
    attr("span.kvMYJc", "aria-label"),
];

const DATE: &[Strategy] = &[text(".rsqaWe"), text(".dehysf")];

const BODY: &[Strategy] = &[text(".MyEned"), text(".wiI7pd")];

const VERIFIED: &[Strategy] = &[presence("img[src*='localguide']"), presence("img.tEfPIe")];

pub const FIELDS: &[FieldSpec] = &[
    FieldSpec { field: Field::Author, strategies: AUTHOR },
    FieldSpec { field: Field::Rating, strategies: RATING },
    FieldSpec { field: Field::Date, strategies: DATE },
    FieldSpec { field: Field::Body, strategies: BODY },
    FieldSpec { field: Field::Verified, strategies: VERIFIED },
];
