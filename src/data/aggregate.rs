use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::Domain;
use super::filter::FilterState;
use super::model::CanonicalRecord;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One country's values on every year of the active range.
/// `None` marks a year without data; it is never folded into `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedSeries {
    pub country: String,
    pub values: Vec<Option<f64>>,
}

/// One country's observed `(year, value)` pairs, ascending by year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSeries {
    pub country: String,
    pub points: Vec<(i32, f64)>,
}

/// Mean / min / max of the filtered values. All `None` when nothing matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct KpiSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryDistribution {
    pub country: String,
    /// Mean of `|value|`, always non-negative.
    pub abs_mean: f64,
    /// Signed values in chronological order.
    pub values: Vec<f64>,
}

/// A category of the distribution charts.
#[derive(Debug, Clone, PartialEq)]
pub enum DistributionCategory<'a> {
    Country(&'a CountryDistribution),
    /// Stand-in shown when no selected country has data.
    NoData,
}

/// Per-country distributions. Countries without filtered records are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub entries: Vec<CountryDistribution>,
}

impl DistributionSummary {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Categories to chart: the entries, or a single placeholder.
    pub fn categories(&self) -> Vec<DistributionCategory<'_>> {
        if self.entries.is_empty() {
            return vec![DistributionCategory::NoData];
        }
        self.entries.iter().map(DistributionCategory::Country).collect()
    }
}

/// Everything the charts need for one filter state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    /// Domain years in the active range (x axis of the aligned series).
    pub years: Vec<i32>,
    pub aligned: Vec<AlignedSeries>,
    pub points: Vec<PointSeries>,
    pub kpi: KpiSummary,
    pub distribution: DistributionSummary,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Records passing the year range and country selection.
pub fn filter_records<'a>(
    records: &'a [CanonicalRecord],
    filters: &FilterState,
) -> Vec<&'a CanonicalRecord> {
    records
        .iter()
        .filter(|r| filters.includes(&r.country, r.year))
        .collect()
}

/// Group filtered records by country, each group sorted by year.
pub fn group_by_country<'a>(
    filtered: &[&'a CanonicalRecord],
) -> BTreeMap<&'a str, Vec<&'a CanonicalRecord>> {
    let mut groups: BTreeMap<&str, Vec<&CanonicalRecord>> = BTreeMap::new();
    for &rec in filtered {
        groups.entry(rec.country.as_str()).or_default().push(rec);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|r| r.year);
    }
    groups
}

/// Selected countries in domain order.
fn selected_in_order<'a>(
    domain: &'a Domain,
    filters: &'a FilterState,
) -> impl Iterator<Item = &'a String> {
    domain.countries.iter().filter(|c| filters.is_selected(c))
}

/// One series per selected country, one slot per year in `years`.
pub fn aligned_series(
    groups: &BTreeMap<&str, Vec<&CanonicalRecord>>,
    domain: &Domain,
    filters: &FilterState,
    years: &[i32],
) -> Vec<AlignedSeries> {
    selected_in_order(domain, filters)
        .map(|country| {
            let by_year: BTreeMap<i32, f64> = groups
                .get(country.as_str())
                .map(|g| g.iter().map(|r| (r.year, r.value_pct)).collect())
                .unwrap_or_default();
            AlignedSeries {
                country: country.clone(),
                values: years.iter().map(|y| by_year.get(y).copied()).collect(),
            }
        })
        .collect()
}

/// One point series per selected country, only for observed years.
pub fn point_series(
    groups: &BTreeMap<&str, Vec<&CanonicalRecord>>,
    domain: &Domain,
    filters: &FilterState,
) -> Vec<PointSeries> {
    selected_in_order(domain, filters)
        .map(|country| PointSeries {
            country: country.clone(),
            points: groups
                .get(country.as_str())
                .map(|g| g.iter().map(|r| (r.year, r.value_pct)).collect())
                .unwrap_or_default(),
        })
        .collect()
}

pub fn kpi_summary(filtered: &[&CanonicalRecord]) -> KpiSummary {
    if filtered.is_empty() {
        return KpiSummary::default();
    }
    let count = filtered.len();
    let sum: f64 = filtered.iter().map(|r| r.value_pct).sum();
    let min = filtered.iter().map(|r| r.value_pct).fold(f64::INFINITY, f64::min);
    let max = filtered
        .iter()
        .map(|r| r.value_pct)
        .fold(f64::NEG_INFINITY, f64::max);
    KpiSummary {
        count,
        mean: Some(sum / count as f64),
        min: Some(min),
        max: Some(max),
    }
}

pub fn distribution_summary(
    groups: &BTreeMap<&str, Vec<&CanonicalRecord>>,
    domain: &Domain,
    filters: &FilterState,
) -> DistributionSummary {
    let entries = selected_in_order(domain, filters)
        .filter_map(|country| {
            let group = groups.get(country.as_str()).filter(|g| !g.is_empty())?;
            let values: Vec<f64> = group.iter().map(|r| r.value_pct).collect();
            let abs_mean = values.iter().map(|v| v.abs()).sum::<f64>() / values.len() as f64;
            Some(CountryDistribution {
                country: country.clone(),
                abs_mean,
                values,
            })
        })
        .collect();
    DistributionSummary { entries }
}

/// Run the full aggregation for the current filter state.
pub fn aggregate(records: &[CanonicalRecord], domain: &Domain, filters: &FilterState) -> Aggregation {
    let years = filters.years_in_range(domain).to_vec();
    let filtered = filter_records(records, filters);
    let groups = group_by_country(&filtered);

    Aggregation {
        aligned: aligned_series(&groups, domain, filters, &years),
        points: point_series(&groups, domain, filters),
        kpi: kpi_summary(&filtered),
        distribution: distribution_summary(&groups, domain, filters),
        years,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::domain::build_domain;

    fn rec(country: &str, year: i32, value_pct: f64) -> CanonicalRecord {
        CanonicalRecord {
            country: country.to_string(),
            year,
            value_pct,
        }
    }

    fn setup(records: &[CanonicalRecord]) -> (Domain, FilterState) {
        let domain = build_domain(records);
        let mut filters = FilterState::new(&domain, 0);
        filters.select_all(&domain);
        (domain, filters)
    }

    #[test]
    fn test_aligned_series_keeps_gaps() {
        let records = vec![
            rec("Chile", 2018, 2.0),
            rec("Chile", 2020, 0.0),
            rec("Perú", 2019, 4.0),
        ];
        let (domain, filters) = setup(&records);
        let agg = aggregate(&records, &domain, &filters);

        assert_eq!(agg.years, vec![2018, 2019, 2020]);
        let chile = &agg.aligned[0];
        assert_eq!(chile.country, "Chile");
        assert_eq!(chile.values, vec![Some(2.0), None, Some(0.0)]);
    }

    #[test]
    fn test_aligned_series_for_country_without_data_in_range() {
        let records = vec![rec("Chile", 2018, 2.0), rec("Perú", 2020, 4.0)];
        let (domain, mut filters) = setup(&records);
        filters.set_year_range(&domain, 2020, 2020);
        let agg = aggregate(&records, &domain, &filters);
        assert_eq!(agg.aligned.len(), 2);
        assert_eq!(agg.aligned[0].values, vec![None]);
        assert_eq!(agg.aligned[1].values, vec![Some(4.0)]);
    }

    #[test]
    fn test_points_sorted_by_year_and_only_observed() {
        let records = vec![
            rec("Chile", 2020, 3.0),
            rec("Chile", 2018, 1.0),
            rec("Perú", 2019, 4.0),
        ];
        let (domain, filters) = setup(&records);
        let agg = aggregate(&records, &domain, &filters);
        assert_eq!(agg.points[0].points, vec![(2018, 1.0), (2020, 3.0)]);
        assert_eq!(agg.points[1].points, vec![(2019, 4.0)]);
    }

    #[test]
    fn test_filter_respects_range_and_selection() {
        let records = vec![
            rec("Chile", 2018, 1.0),
            rec("Chile", 2019, 2.0),
            rec("Perú", 2019, 4.0),
        ];
        let (domain, mut filters) = setup(&records);
        filters.set_year_range(&domain, 2019, 2019);
        filters.toggle_country(&domain, "Perú");
        let filtered = filter_records(&records, &filters);
        assert_eq!(filtered, vec![&records[1]]);
    }

    #[test]
    fn test_kpi_over_empty_selection_is_undefined() {
        let records = vec![rec("Chile", 2018, 1.0)];
        let (domain, mut filters) = setup(&records);
        filters.clear_all();
        let agg = aggregate(&records, &domain, &filters);
        assert_eq!(agg.kpi.count, 0);
        assert_eq!(agg.kpi.mean, None);
        assert_eq!(agg.kpi.min, None);
        assert_eq!(agg.kpi.max, None);
    }

    #[test]
    fn test_kpi_mean_min_max() {
        let records = vec![
            rec("Chile", 2018, -1.0),
            rec("Chile", 2019, 3.0),
            rec("Perú", 2019, 7.0),
        ];
        let (domain, filters) = setup(&records);
        let kpi = aggregate(&records, &domain, &filters).kpi;
        assert_eq!(kpi.count, 3);
        assert_eq!(kpi.mean, Some(3.0));
        assert_eq!(kpi.min, Some(-1.0));
        assert_eq!(kpi.max, Some(7.0));
    }

    #[test]
    fn test_distribution_excludes_countries_without_records() {
        let records = vec![
            rec("Bolivia", 2010, 1.0),
            rec("Chile", 2018, -2.0),
            rec("Chile", 2019, 4.0),
            rec("Perú", 2019, 4.0),
        ];
        let (domain, mut filters) = setup(&records);
        let full = aggregate(&records, &domain, &filters).distribution;
        assert_eq!(full.entries.len(), 3);

        filters.set_year_range(&domain, 2018, 2019);
        let dist = aggregate(&records, &domain, &filters).distribution;
        assert_eq!(dist.entries.len(), 2);
        assert_eq!(dist.entries[0].country, "Chile");
        assert_eq!(dist.entries[0].abs_mean, 3.0);
        assert_eq!(dist.entries[0].values, vec![-2.0, 4.0]);
        assert!(dist.entries.iter().all(|e| e.country != "Bolivia"));
    }

    #[test]
    fn test_distribution_placeholder_when_no_data() {
        let summary = DistributionSummary::default();
        assert_eq!(summary.categories(), vec![DistributionCategory::NoData]);

        let entry = CountryDistribution {
            country: "Chile".into(),
            abs_mean: 1.0,
            values: vec![1.0],
        };
        let summary = DistributionSummary {
            entries: vec![entry.clone()],
        };
        assert_eq!(summary.categories(), vec![DistributionCategory::Country(&entry)]);
    }

    #[test]
    fn test_empty_domain_aggregates_to_nothing() {
        let domain = Domain::default();
        let filters = FilterState::new(&domain, 8);
        let agg = aggregate(&[], &domain, &filters);
        assert!(agg.years.is_empty());
        assert!(agg.aligned.is_empty());
        assert!(agg.distribution.is_empty());
        assert_eq!(agg.kpi, KpiSummary::default());
    }

    #[test]
    fn test_chile_end_to_end() {
        use crate::data::model::InflationDataset;
        use serde_json::json;

        let raw: Vec<_> = [
            json!({"País": "Chile", "Año": 2020, "Inflación Anual": 0.03}),
            json!({"País": "Chile", "Año": 2021, "Inflación Anual": 5.0}),
        ]
        .iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();

        let ds = InflationDataset::from_raw(&raw);
        assert_eq!(ds.records.len(), 2);
        let filters = FilterState::new(&ds.domain, 8);
        let kpi = aggregate(&ds.records, &ds.domain, &filters).kpi;

        let close = |a: Option<f64>, b: f64| a.is_some_and(|a| (a - b).abs() < 1e-9);
        assert!(close(kpi.mean, 4.0));
        assert!(close(kpi.min, 3.0));
        assert!(close(kpi.max, 5.0));
    }
}
