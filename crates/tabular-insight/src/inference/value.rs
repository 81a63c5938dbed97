//! Per-value semantic classification.
//!
//! Rules are checked in a fixed order and the first match wins. Structured
//! patterns (currency, flight code, email, url, phone) come before the generic
//! numeric and date fallbacks so `$100` is never read as a plain number.

use super::dates::parse_date;
use crate::dataset::Cell;
use crate::types::SemanticType;
use crate::utils::{is_boolean_token, parse_plain_number};
use once_cell::sync::Lazy;
use regex::Regex;

static CURRENCY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[$€£¥]|USD|EUR|GBP|JPY)\s?-?\d{1,3}(?:,?\d{3})*(?:\.\d+)?$")
        .expect("Invalid regex: currency")
});

static FLIGHT_NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}\d{2,4}$").expect("Invalid regex: flight number"));

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w\.-]+@[\w\.-]+\.\w+$").expect("Invalid regex: email"));

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("Invalid regex: url"));

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?\d{7,15}$").expect("Invalid regex: phone"));

// A separator or a month abbreviation; only then is the date parser consulted.
static DATE_HINT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[\-/:\s]|(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)")
        .expect("Invalid regex: date hint")
});

/// Classify one rendered value.
///
/// Surrounding whitespace is ignored. Empty input is a string, not a null:
/// missing values are filtered out before rendering.
pub fn classify_value(value: &str) -> SemanticType {
    let value = value.trim();

    if is_boolean_token(value) {
        SemanticType::Boolean
    } else if CURRENCY_PATTERN.is_match(value) {
        SemanticType::Currency
    } else if FLIGHT_NUMBER_PATTERN.is_match(value) {
        SemanticType::FlightNumber
    } else if EMAIL_PATTERN.is_match(value) {
        SemanticType::Email
    } else if URL_PATTERN.is_match(value) {
        SemanticType::Url
    } else if PHONE_PATTERN.is_match(value) {
        SemanticType::PhoneNumber
    } else if parse_plain_number(value).is_some() {
        SemanticType::Numeric
    } else if DATE_HINT_PATTERN.is_match(value) && parse_date(value).is_some() {
        SemanticType::Date
    } else {
        SemanticType::String
    }
}

/// Classify a cell; missing cells are [`SemanticType::Null`].
pub fn classify_cell(cell: &Cell) -> SemanticType {
    match cell.render() {
        Some(text) => classify_value(&text),
        None => SemanticType::Null,
    }
}
