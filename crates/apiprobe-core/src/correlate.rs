//! Cross-checks between payloads returned by two independent APIs.
//!
//! Every check returns a [`CorrelationCheck`]; a mismatch, an unreachable
//! source or a missing record is `holds = false` with an explanation,
//! never an error. The scenario driver decides what a mismatch means.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::apis::HistoricalBar;
use crate::error::ProbeResult;
use crate::request::Outcome;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationCheck {
    pub shared_key: String,
    pub source_a: Option<String>,
    pub source_b: Option<String>,
    pub holds: bool,
    /// Why the check does not hold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl CorrelationCheck {
    fn failed(
        shared_key: &str,
        source_a: Option<String>,
        source_b: Option<String>,
        explanation: String,
    ) -> Self {
        Self {
            shared_key: shared_key.to_string(),
            source_a,
            source_b,
            holds: false,
            explanation: Some(explanation),
        }
    }
}

/// How two extracted keys are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMatch {
    /// Byte-for-byte equality (`DIS` != `dis`).
    Exact,
    /// Source A's value occurs in source B's value, ignoring case.
    CaseInsensitiveContains,
}

impl KeyMatch {
    pub fn matches(self, a: &str, b: &str) -> bool {
        match self {
            Self::Exact => match_exact(a, b),
            Self::CaseInsensitiveContains => match_case_insensitive_contains(a, b),
        }
    }
}

pub fn match_exact(a: &str, b: &str) -> bool {
    a == b
}

pub fn match_case_insensitive_contains(needle: &str, haystack: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Extract a key from each side and compare them with `matcher`.
pub fn check_identifier_consistency<FA, FB>(
    shared_key: &str,
    source_a: &ProbeResult<Outcome>,
    source_b: &ProbeResult<Outcome>,
    extract_a: FA,
    extract_b: FB,
    matcher: KeyMatch,
) -> CorrelationCheck
where
    FA: Fn(&Value) -> Option<String>,
    FB: Fn(&Value) -> Option<String>,
{
    let a = side_value("source A", source_a, extract_a);
    let b = side_value("source B", source_b, extract_b);

    match (a, b) {
        (Ok(a), Ok(b)) => {
            let holds = matcher.matches(&a, &b);
            let explanation =
                (!holds).then(|| format!("{a:?} does not match {b:?} ({matcher:?})"));
            CorrelationCheck {
                shared_key: shared_key.to_string(),
                source_a: Some(a),
                source_b: Some(b),
                holds,
                explanation,
            }
        }
        (a, b) => {
            let reasons: Vec<String> = [a.as_ref().err(), b.as_ref().err()]
                .into_iter()
                .flatten()
                .cloned()
                .collect();
            CorrelationCheck::failed(shared_key, a.ok(), b.ok(), reasons.join("; "))
        }
    }
}

fn side_value<F>(side: &str, result: &ProbeResult<Outcome>, extract: F) -> Result<String, String>
where
    F: Fn(&Value) -> Option<String>,
{
    let outcome = result
        .as_ref()
        .map_err(|e| format!("{side} unreachable: {e}"))?;
    if !outcome.is_success() {
        return Err(format!(
            "{side} returned {}",
            outcome
                .status_code
                .map(|s| format!("HTTP {s}"))
                .unwrap_or_else(|| "no status".to_string())
        ));
    }
    let payload = outcome
        .payload
        .as_ref()
        .ok_or_else(|| format!("{side} returned no payload"))?;
    extract(payload).ok_or_else(|| format!("{side} payload has no key"))
}

/// Extractor for a top-level string field, e.g. `field("ticker")`.
pub fn field(name: &'static str) -> impl Fn(&Value) -> Option<String> {
    move |payload| payload.get(name).and_then(Value::as_str).map(String::from)
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("static regex"))
}

/// Every `YYYY-MM-DD` substring of the serialized payload, first
/// occurrence order, no duplicates.
///
/// This is the fallback for payloads without a known schema; it also picks
/// up dates inside free text and identifiers.
pub fn extract_dates_from_payload(payload: &Value) -> Vec<String> {
    let serialized = payload.to_string();
    let mut dates: Vec<String> = Vec::new();
    for m in date_pattern().find_iter(&serialized) {
        if !dates.iter().any(|d| d == m.as_str()) {
            dates.push(m.as_str().to_string());
        }
    }
    dates
}

/// Dates read from string fields named in `fields`, at any depth. Values
/// such as `2024-03-01T00:00:00Z` contribute their date part.
pub fn extract_dates_from_fields(payload: &Value, fields: &[&str]) -> Vec<String> {
    let mut dates = Vec::new();
    collect_field_dates(payload, fields, &mut dates);
    dates
}

fn collect_field_dates(value: &Value, fields: &[&str], out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, v) in map {
                if fields.contains(&key.as_str()) {
                    if let Some(date) = v.as_str().and_then(leading_date) {
                        if !out.iter().any(|d| d == date) {
                            out.push(date.to_string());
                        }
                    }
                }
                collect_field_dates(v, fields, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_field_dates(item, fields, out);
            }
        }
        _ => {}
    }
}

fn leading_date(s: &str) -> Option<&str> {
    let m = date_pattern().find(s)?;
    (m.start() == 0).then(|| m.as_str())
}

/// Where the dates of a [`DateExtraction`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DateSource {
    Fields,
    Pattern,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateExtraction {
    pub dates: Vec<String>,
    pub source: DateSource,
}

/// Dates from the known `fields` first; when none of them yields a date,
/// fall back to pattern matching over the whole serialized payload. The
/// chosen path is reported in `source`. An empty result means there is
/// nothing to correlate.
pub fn extract_dates(payload: &Value, fields: &[&str]) -> DateExtraction {
    let dates = extract_dates_from_fields(payload, fields);
    if !dates.is_empty() {
        return DateExtraction {
            dates,
            source: DateSource::Fields,
        };
    }

    debug!(?fields, "no dates in known fields, falling back to pattern scan");
    DateExtraction {
        dates: extract_dates_from_payload(payload),
        source: DateSource::Pattern,
    }
}

/// Record whose `date` field equals `date` exactly. No nearest-date or
/// range matching.
pub fn find_record_by_date<'a>(records: &'a [Value], date: &str) -> Option<&'a Value> {
    records
        .iter()
        .find(|r| r.get("date").and_then(Value::as_str) == Some(date))
}

/// Look `date` up in a price history response. `source_b` is the closing
/// price of the matching record.
pub fn check_date_correlation(date: &str, history: &ProbeResult<Outcome>) -> CorrelationCheck {
    let outcome = match history {
        Ok(o) if o.is_success() => o,
        Ok(o) => {
            return CorrelationCheck::failed(
                date,
                Some(date.to_string()),
                None,
                format!("history returned status {:?}", o.status_code),
            )
        }
        Err(e) => {
            return CorrelationCheck::failed(
                date,
                Some(date.to_string()),
                None,
                format!("history unreachable: {e}"),
            )
        }
    };

    let Some(records) = outcome.payload.as_ref().and_then(Value::as_array) else {
        return CorrelationCheck::failed(
            date,
            Some(date.to_string()),
            None,
            "history payload is not an array".to_string(),
        );
    };

    match find_record_by_date(records, date) {
        Some(record) => CorrelationCheck {
            shared_key: date.to_string(),
            source_a: Some(date.to_string()),
            source_b: HistoricalBar::deserialize(record)
                .ok()
                .and_then(|bar| bar.close)
                .map(|close| match close {
                    Value::String(s) => s,
                    other => other.to_string(),
                }),
            holds: true,
            explanation: None,
        },
        None => CorrelationCheck::failed(
            date,
            Some(date.to_string()),
            None,
            "price not found for this date".to_string(),
        ),
    }
}

/// Whether some record carries every field of `expected` with an equal
/// value. Extra fields on the record are ignored. Numbers compare by value,
/// so `24` matches `24.0`.
pub fn contains_matching_record(records: &[Value], expected: &Map<String, Value>) -> bool {
    records.iter().any(|record| {
        expected
            .iter()
            .all(|(key, value)| record.get(key).is_some_and(|v| values_match(v, value)))
    })
}

fn values_match(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}
