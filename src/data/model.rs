use serde::Serialize;

use super::domain::{Domain, build_domain};
use super::normalize::normalize_records;

// ---------------------------------------------------------------------------
// RawRecord – one row exactly as it came out of the source file
// ---------------------------------------------------------------------------

/// An untyped source row. Key spellings vary between datasets
/// (`País` / `Pais`, `Año` / `Ano` / `Anio`, ...), so nothing is assumed
/// about its shape until the normalizer has looked at it.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// CanonicalRecord – a cleaned (country, year, value) tuple
// ---------------------------------------------------------------------------

/// A record that passed normalization.
///
/// `country` is trimmed with whitespace runs collapsed and never empty,
/// `value_pct` is always finite and expressed in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    pub country: String,
    pub year: i32,
    pub value_pct: f64,
}

// ---------------------------------------------------------------------------
// InflationDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Canonical records plus the domain derived from them.
#[derive(Debug, Clone, Default)]
pub struct InflationDataset {
    /// All canonical records, in source order.
    pub records: Vec<CanonicalRecord>,
    /// Distinct years and countries.
    pub domain: Domain,
    /// How many raw rows were rejected during normalization.
    pub dropped: usize,
}

impl InflationDataset {
    /// Normalize raw rows and build the domain.
    pub fn from_raw(raw: &[RawRecord]) -> Self {
        let records = normalize_records(raw);
        let dropped = raw.len() - records.len();
        if dropped > 0 {
            log::debug!("Dropped {dropped} of {} raw records during normalization", raw.len());
        }
        let domain = build_domain(&records);
        InflationDataset {
            records,
            domain,
            dropped,
        }
    }

    /// Number of canonical records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there is nothing to display.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawRecord {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_from_raw_counts_dropped_rows() {
        let rows = vec![
            raw(json!({"País": "Chile", "Año": 2020, "Inflación Anual": 0.03})),
            raw(json!({"País": "", "Año": 2020, "Inflación Anual": 0.05})),
            raw(json!({"País": "Perú", "Año": "abc", "Inflación Anual": 0.05})),
        ];
        let ds = InflationDataset::from_raw(&rows);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.dropped, 2);
        assert_eq!(ds.domain.countries, vec!["Chile".to_string()]);
        assert_eq!(ds.domain.years, vec![2020]);
    }

    #[test]
    fn test_empty_input_gives_empty_dataset() {
        let ds = InflationDataset::from_raw(&[]);
        assert!(ds.is_empty());
        assert!(ds.domain.is_empty());
    }
}
