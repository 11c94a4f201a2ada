use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::model::CanonicalRecord;

// ---------------------------------------------------------------------------
// Domain – distinct years and countries
// ---------------------------------------------------------------------------

/// Distinct years (ascending) and countries (collated) present in the data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Domain {
    pub years: Vec<i32>,
    pub countries: Vec<String>,
}

impl Domain {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty() || self.countries.is_empty()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.years.first().copied()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.years.last().copied()
    }

    /// Position of `year` in `years`, if it is a member.
    pub fn year_index(&self, year: i32) -> Option<usize> {
        self.years.binary_search(&year).ok()
    }

    /// Position of `country` in domain order.
    pub fn country_index(&self, country: &str) -> Option<usize> {
        self.countries
            .binary_search_by(|c| collate(c, country))
            .ok()
    }

    pub fn contains_country(&self, country: &str) -> bool {
        self.country_index(country).is_some()
    }

    /// The domain year closest to `year`; ties go to the smaller year.
    pub fn nearest_year(&self, year: i32) -> Option<i32> {
        self.years
            .iter()
            .copied()
            .min_by_key(|y| ((*y as i64 - year as i64).abs(), *y))
    }
}

/// Derive the domain from canonical records.
pub fn build_domain(records: &[CanonicalRecord]) -> Domain {
    let years: BTreeSet<i32> = records.iter().map(|r| r.year).collect();
    let unique: BTreeSet<&str> = records.iter().map(|r| r.country.as_str()).collect();

    let mut countries: Vec<String> = unique.into_iter().map(str::to_string).collect();
    countries.sort_by(|a, b| collate(a, b));

    Domain {
        years: years.into_iter().collect(),
        countries,
    }
}

// ---------------------------------------------------------------------------
// Spanish-aware collation
// ---------------------------------------------------------------------------

/// Compare two names the way a Spanish reader expects:
/// case and accents are ignored at first (`Á` sorts with `A`), `ñ` is its
/// own letter after `n`, and only exact ties look at accents, then case.
pub fn collate(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| secondary_key(a).cmp(&secondary_key(b)))
        .then_with(|| lower_rank(a).cmp(&lower_rank(b)))
        .then_with(|| a.cmp(b))
}

fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ç' => 'c',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// Letters with accents folded; `ñ` becomes `n` plus a marker that sorts
/// after every ASCII letter.
fn primary_key(s: &str) -> Vec<char> {
    let mut key = Vec::with_capacity(s.len());
    for c in s.chars().flat_map(char::to_lowercase) {
        if c == 'ñ' {
            key.push('n');
            key.push('~');
        } else {
            key.push(fold_char(c));
        }
    }
    key
}

/// One weight per character: 0 for a plain letter, 1 for an accented one.
fn secondary_key(s: &str) -> Vec<u8> {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| u8::from(c != 'ñ' && fold_char(c) != c))
        .collect()
}

/// Lowercase before uppercase on otherwise identical names.
fn lower_rank(s: &str) -> Vec<u8> {
    s.chars().map(|c| u8::from(c.is_uppercase())).collect()
}
