//! Field rules for book payloads.
//!
//! Every rule runs; violations are reported in a fixed order: title, author,
//! year, isbn. In partial mode a field that is absent from the payload is not
//! checked, but a field that is present must still be valid.

use serde_json::Value;

use super::models::{BookFields, BookPayload};
use crate::utils;

pub const TITLE_REQUIRED: &str = "Title is required";
pub const AUTHOR_REQUIRED: &str = "Author is required";
pub const YEAR_REQUIRED: &str = "Year is required";
pub const YEAR_NOT_INTEGER: &str = "Year must be a valid integer";
pub const ISBN_REQUIRED: &str = "ISBN is required";

/// Range error for `year`, naming the current upper bound.
pub fn year_out_of_range(current_year: i32) -> String {
    format!("Year must be between 0 and {current_year}")
}

/// Check `payload` against the book rules using the current year.
pub fn validate(payload: &BookPayload, partial: bool) -> Vec<String> {
    validate_at(payload, partial, utils::current_year())
}

/// Check `payload` against the book rules with an explicit upper bound for `year`.
pub fn validate_at(payload: &BookPayload, partial: bool, current_year: i32) -> Vec<String> {
    check(payload, partial, current_year).errors
}

/// Validate a full payload and extract typed fields.
pub fn parse_fields(payload: &BookPayload) -> Result<BookFields, Vec<String>> {
    parse_fields_at(payload, utils::current_year())
}

pub fn parse_fields_at(payload: &BookPayload, current_year: i32) -> Result<BookFields, Vec<String>> {
    let checked = check(payload, false, current_year);
    if !checked.errors.is_empty() {
        return Err(checked.errors);
    }

    // In full mode every missing field has already produced an error.
    match (checked.title, checked.author, checked.year, checked.isbn) {
        (Some(title), Some(author), Some(year), Some(isbn)) => Ok(BookFields {
            title: title.to_string(),
            author: author.to_string(),
            year,
            isbn: isbn.to_string(),
        }),
        _ => Err(checked.errors),
    }
}

struct Checked<'a> {
    errors: Vec<String>,
    title: Option<&'a str>,
    author: Option<&'a str>,
    year: Option<i32>,
    isbn: Option<&'a str>,
}

fn check(payload: &BookPayload, partial: bool, current_year: i32) -> Checked<'_> {
    let mut errors = Vec::new();
    let checks = |field: &str| !partial || payload.contains_key(field);

    let title = non_blank(payload, "title");
    if checks("title") && title.is_none() {
        errors.push(TITLE_REQUIRED.to_string());
    }

    let author = non_blank(payload, "author");
    if checks("author") && author.is_none() {
        errors.push(AUTHOR_REQUIRED.to_string());
    }

    let mut year = None;
    if checks("year") {
        match payload.get("year").filter(|value| !value.is_null()) {
            Some(value) => match integer(value) {
                None => errors.push(YEAR_NOT_INTEGER.to_string()),
                Some(parsed) if !(0..=i64::from(current_year)).contains(&parsed) => {
                    errors.push(year_out_of_range(current_year));
                }
                Some(parsed) => year = i32::try_from(parsed).ok(),
            },
            None if !partial => errors.push(YEAR_REQUIRED.to_string()),
            None => {}
        }
    }

    // Presence only; the ISBN format is not checked.
    let isbn = match payload.get("isbn") {
        Some(Value::String(isbn)) if !isbn.is_empty() => Some(isbn.as_str()),
        _ => None,
    };
    if !partial && isbn.is_none() {
        errors.push(ISBN_REQUIRED.to_string());
    }

    Checked {
        errors,
        title,
        author,
        year,
        isbn,
    }
}

fn non_blank<'a>(payload: &'a BookPayload, field: &str) -> Option<&'a str> {
    match payload.get(field) {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text.as_str()),
        _ => None,
    }
}

/// Integers, integral floats, and strings holding a base-10 integer.
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.is_finite() && float.fract() == 0.0)
                .map(|float| float as i64)
        }),
        Value::String(text) => integer_text(text.trim()),
        _ => None,
    }
}

/// Digit strings beyond `i64` saturate so they fail the range check, not the type check.
fn integer_text(text: &str) -> Option<i64> {
    if let Ok(parsed) = text.parse() {
        return Some(parsed);
    }

    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    Some(if negative { i64::MIN } else { i64::MAX })
}
