use std::collections::BTreeSet;

use super::domain::Domain;

/// Default number of countries selected when a dataset is loaded.
pub const DEFAULT_SELECTION: usize = 8;

// ---------------------------------------------------------------------------
// YearRange
// ---------------------------------------------------------------------------

/// Inclusive year range. Both bounds are domain years and `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn contains(&self, year: i32) -> bool {
        year >= self.min && year <= self.max
    }
}

// ---------------------------------------------------------------------------
// FilterState – year range plus selected countries
// ---------------------------------------------------------------------------

/// Current user selection.
///
/// Every mutating method takes the [`Domain`] it must stay consistent with.
/// After any call, `range` is `None` only for an empty domain, and
/// `selected` is a subset of `domain.countries`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    range: Option<YearRange>,
    selected: BTreeSet<String>,
}

impl FilterState {
    /// Full year span and the first `default_selection` countries.
    pub fn new(domain: &Domain, default_selection: usize) -> Self {
        let range = match (domain.first_year(), domain.last_year()) {
            (Some(min), Some(max)) => Some(YearRange { min, max }),
            _ => None,
        };
        let selected = domain
            .countries
            .iter()
            .take(default_selection)
            .cloned()
            .collect();
        FilterState { range, selected }
    }

    pub fn range(&self) -> Option<YearRange> {
        self.range
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, country: &str) -> bool {
        self.selected.contains(country)
    }

    /// Whether a record passes both the year range and country selection.
    pub fn includes(&self, country: &str, year: i32) -> bool {
        self.range.is_some_and(|r| r.contains(year)) && self.selected.contains(country)
    }

    /// Set the range from typed years. Years that are not in the domain
    /// snap to the nearest one; reversed bounds are swapped.
    pub fn set_year_range(&mut self, domain: &Domain, min: i32, max: i32) {
        let (Some(mut lo), Some(mut hi)) = (domain.nearest_year(min), domain.nearest_year(max))
        else {
            self.range = None;
            return;
        };
        if lo > hi {
            std::mem::swap(&mut lo, &mut hi);
        }
        self.range = Some(YearRange { min: lo, max: hi });
    }

    /// Set the range from positions in `domain.years` (slider input).
    pub fn set_year_index_range(&mut self, domain: &Domain, i: usize, j: usize) {
        let Some(last) = domain.years.len().checked_sub(1) else {
            self.range = None;
            return;
        };
        let (i, j) = (i.min(last), j.min(last));
        self.range = Some(YearRange {
            min: domain.years[i.min(j)],
            max: domain.years[i.max(j)],
        });
    }

    /// Current range as positions in `domain.years`.
    pub fn year_index_range(&self, domain: &Domain) -> Option<(usize, usize)> {
        let r = self.range?;
        Some((domain.year_index(r.min)?, domain.year_index(r.max)?))
    }

    /// Domain years inside the current range.
    pub fn years_in_range<'a>(&self, domain: &'a Domain) -> &'a [i32] {
        let Some((lo, hi)) = self.year_index_range(domain) else {
            return &[];
        };
        &domain.years[lo..=hi]
    }

    /// Flip one country. Names outside the domain are ignored.
    pub fn toggle_country(&mut self, domain: &Domain, name: &str) {
        if !self.selected.remove(name) && domain.contains_country(name) {
            self.selected.insert(name.to_string());
        }
    }

    pub fn select_all(&mut self, domain: &Domain) {
        self.selected = domain.countries.iter().cloned().collect();
    }

    pub fn clear_all(&mut self) {
        self.selected.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> Domain {
        Domain {
            years: vec![2005, 2008, 2010, 2015],
            countries: ["Argentina", "Bolivia", "Chile", "Perú"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    fn range(f: &FilterState) -> (i32, i32) {
        let r = f.range().unwrap();
        (r.min, r.max)
    }

    #[test]
    fn test_defaults_cover_full_span() {
        let d = domain();
        let f = FilterState::new(&d, 2);
        assert_eq!(range(&f), (2005, 2015));
        assert_eq!(f.selected().len(), 2);
        assert!(f.is_selected("Argentina"));
        assert!(f.is_selected("Bolivia"));
        assert!(!f.is_selected("Chile"));
    }

    #[test]
    fn test_default_selection_capped_at_domain_size() {
        let d = domain();
        let f = FilterState::new(&d, DEFAULT_SELECTION);
        assert_eq!(f.selected().len(), 4);
    }

    #[test]
    fn test_set_year_range_swaps_reversed_bounds() {
        let d = domain();
        let mut f = FilterState::new(&d, 1);
        f.set_year_range(&d, 2015, 2005);
        assert_eq!(range(&f), (2005, 2015));
    }

    #[test]
    fn test_set_year_range_snaps_to_nearest() {
        let d = domain();
        let mut f = FilterState::new(&d, 1);
        f.set_year_range(&d, 2007, 2012);
        assert_eq!(range(&f), (2008, 2010));
        // 2009 is equidistant from 2008 and 2010: smaller wins.
        f.set_year_range(&d, 2009, 2099);
        assert_eq!(range(&f), (2008, 2015));
        f.set_year_range(&d, 2030, 1900);
        assert_eq!(range(&f), (2005, 2015));
    }

    #[test]
    fn test_index_range_is_clamped_and_ordered() {
        let d = domain();
        let mut f = FilterState::new(&d, 1);
        f.set_year_index_range(&d, 3, 1);
        assert_eq!(range(&f), (2008, 2015));
        f.set_year_index_range(&d, 0, 99);
        assert_eq!(range(&f), (2005, 2015));
        assert_eq!(f.year_index_range(&d), Some((0, 3)));
        f.set_year_index_range(&d, 2, 2);
        assert_eq!(f.years_in_range(&d), &[2010]);
    }

    #[test]
    fn test_toggle_ignores_unknown_countries() {
        let d = domain();
        let mut f = FilterState::new(&d, 0);
        f.toggle_country(&d, "Chile");
        assert!(f.is_selected("Chile"));
        f.toggle_country(&d, "Chile");
        assert!(!f.is_selected("Chile"));
        f.toggle_country(&d, "Atlantis");
        assert!(f.selected().is_empty());
    }

    #[test]
    fn test_select_all_and_clear_all() {
        let d = domain();
        let mut f = FilterState::new(&d, 1);
        f.select_all(&d);
        assert_eq!(f.selected().len(), d.countries.len());
        f.clear_all();
        assert!(f.selected().is_empty());
    }

    #[test]
    fn test_includes_requires_range_and_selection() {
        let d = domain();
        let mut f = FilterState::new(&d, 1);
        f.set_year_range(&d, 2008, 2010);
        assert!(f.includes("Argentina", 2008));
        assert!(!f.includes("Argentina", 2005));
        assert!(!f.includes("Bolivia", 2008));
    }

    #[test]
    fn test_empty_domain_has_no_range() {
        let d = Domain::default();
        let mut f = FilterState::new(&d, DEFAULT_SELECTION);
        assert_eq!(f.range(), None);
        f.set_year_range(&d, 2000, 2010);
        assert_eq!(f.range(), None);
        f.set_year_index_range(&d, 0, 1);
        assert_eq!(f.range(), None);
        assert!(f.years_in_range(&d).is_empty());
        assert!(!f.includes("Chile", 2000));
    }
}
