use serde_json::Value as JsonValue;

use super::model::{CanonicalRecord, RawRecord};

// ---------------------------------------------------------------------------
// Accepted key spellings, first present key wins
// ---------------------------------------------------------------------------

pub const COUNTRY_KEYS: &[&str] = &["País", "Pais", "country"];
pub const YEAR_KEYS: &[&str] = &["Año", "Ano", "Anio", "year"];
pub const VALUE_KEYS: &[&str] = &[
    "Inflación Anual",
    "Inflacion Anual",
    "Inflación anual",
    "Inflacion anual",
    "inflation",
];

/// Magnitudes strictly below this are read as fractions (0.045 → 4.5%).
pub const FRACTION_THRESHOLD: f64 = 3.0;

// ---------------------------------------------------------------------------
// Unit disambiguation
// ---------------------------------------------------------------------------

/// Convert a raw inflation figure to percent.
///
/// The source mixes fractions (`0.045`) with figures already in percent
/// (`1300.6`). Anything with `|v| < 3` is taken as a fraction. This
/// misreads genuine percentages below 3 (a literal `2.8` becomes `280`);
/// that is a known limitation of the dataset, not something to patch here.
pub fn to_percent(value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    if value.abs() < FRACTION_THRESHOLD {
        Some(value * 100.0)
    } else {
        Some(value)
    }
}

// ---------------------------------------------------------------------------
// Field extraction
// ---------------------------------------------------------------------------

/// Value of the first alias present with a non-null value.
pub fn first_present<'a>(raw: &'a RawRecord, aliases: &[&str]) -> Option<&'a JsonValue> {
    aliases
        .iter()
        .filter_map(|key| raw.get(*key))
        .find(|v| !v.is_null())
}

/// Trim and collapse internal whitespace runs to a single space.
pub fn clean_country(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn country_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => clean_country(s),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Coerce a JSON value to a finite number. Strings are trimmed and parsed;
/// an empty string is not a number.
pub fn coerce_number(value: &JsonValue) -> Option<f64> {
    let n = match value {
        JsonValue::Number(n) => n.as_f64()?,
        JsonValue::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn coerce_year(value: &JsonValue) -> Option<i32> {
    let n = coerce_number(value)?;
    if n.fract() != 0.0 || n < i32::MIN as f64 || n > i32::MAX as f64 {
        return None;
    }
    Some(n as i32)
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Normalize one raw row, or `None` if any field is unusable.
pub fn normalize_record(raw: &RawRecord) -> Option<CanonicalRecord> {
    let country = first_present(raw, COUNTRY_KEYS).map(country_text)?;
    if country.is_empty() {
        return None;
    }
    let year = first_present(raw, YEAR_KEYS).and_then(coerce_year)?;
    let value_pct = first_present(raw, VALUE_KEYS)
        .and_then(coerce_number)
        .and_then(to_percent)?;

    Some(CanonicalRecord {
        country,
        year,
        value_pct,
    })
}

/// Normalize every raw row, silently dropping the malformed ones.
pub fn normalize_records(raw: &[RawRecord]) -> Vec<CanonicalRecord> {
    raw.iter().filter_map(normalize_record).collect()
}
