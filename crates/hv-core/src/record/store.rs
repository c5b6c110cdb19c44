//! In-memory record table

use std::collections::BTreeSet;
use ahash::AHashMap;
use indexmap::IndexSet;

use super::{DerivedFlags, Record};
use crate::CoreError;

/// Partial update of derived flags; `None` leaves a flag untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FlagPatch {
    pub is_indicator_max: Option<bool>,
    pub is_indicator_min: Option<bool>,
    pub is_user_selected: Option<bool>,
    pub is_displayed: Option<bool>,
}

impl FlagPatch {
    pub fn extremes(is_max: bool, is_min: bool) -> Self {
        Self {
            is_indicator_max: Some(is_max),
            is_indicator_min: Some(is_min),
            ..Self::default()
        }
    }

    pub fn user_selected(selected: bool) -> Self {
        Self {
            is_user_selected: Some(selected),
            ..Self::default()
        }
    }

    pub fn displayed(displayed: bool) -> Self {
        Self {
            is_displayed: Some(displayed),
            ..Self::default()
        }
    }

    fn apply(&self, flags: &mut DerivedFlags) {
        if let Some(v) = self.is_indicator_max {
            flags.is_indicator_max = v;
        }
        if let Some(v) = self.is_indicator_min {
            flags.is_indicator_min = v;
        }
        if let Some(v) = self.is_user_selected {
            flags.is_user_selected = v;
        }
        if let Some(v) = self.is_displayed {
            flags.is_displayed = v;
        }
    }
}

/// The shared table of country/year records.
///
/// Outside this crate the store is read-only: derived flags are written only
/// through [`RecordStore::upsert_derived_flags`], which the selection engine
/// owns.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    by_key: AHashMap<(String, i32), usize>,
    countries: IndexSet<String>,
}

impl RecordStore {
    /// Build a store, rejecting duplicate `(country, year)` keys
    pub fn new(records: Vec<Record>) -> Result<Self, CoreError> {
        let mut by_key = AHashMap::with_capacity(records.len());
        let mut countries = IndexSet::new();

        for (idx, record) in records.iter().enumerate() {
            let key = (record.country_name.clone(), record.year);
            if by_key.insert(key, idx).is_some() {
                return Err(CoreError::DuplicateRecord {
                    country: record.country_name.clone(),
                    year: record.year,
                });
            }
            countries.insert(record.country_name.clone());
        }

        Ok(Self { records, by_key, countries })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in load order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Records of one year, in load order. Empty when the year is unknown.
    pub fn records_for_year(&self, year: i32) -> Vec<&Record> {
        self.records.iter().filter(|r| r.year == year).collect()
    }

    pub fn get(&self, country: &str, year: i32) -> Option<&Record> {
        self.by_key
            .get(&(country.to_string(), year))
            .map(|&idx| &self.records[idx])
    }

    /// Distinct years, ascending
    pub fn years(&self) -> Vec<i32> {
        self.records.iter().map(|r| r.year).collect::<BTreeSet<_>>().into_iter().collect()
    }

    /// Distinct country names in first-seen order
    pub fn country_names(&self) -> impl Iterator<Item = &str> {
        self.countries.iter().map(String::as_str)
    }

    pub fn contains_country(&self, country: &str) -> bool {
        self.countries.contains(country)
    }

    /// True if any record of the country is user-selected
    pub fn is_country_selected(&self, country: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.country_name == country && r.flags.is_user_selected)
    }

    pub fn any_user_selected(&self) -> bool {
        self.records.iter().any(|r| r.flags.is_user_selected)
    }

    /// Apply `patch` to every record matching `predicate`; returns the match count
    pub(crate) fn upsert_derived_flags<P>(&mut self, predicate: P, patch: FlagPatch) -> usize
    where
        P: Fn(&Record) -> bool,
    {
        let mut touched = 0;
        for record in self.records.iter_mut() {
            if predicate(record) {
                patch.apply(&mut record.flags);
                touched += 1;
            }
        }
        touched
    }

    /// Per-record patch, used where the patch depends on the record's own flags
    pub(crate) fn upsert_derived_flags_with<F>(&mut self, mut patch_for: F)
    where
        F: FnMut(&Record) -> Option<FlagPatch>,
    {
        for record in self.records.iter_mut() {
            if let Some(patch) = patch_for(record) {
                patch.apply(&mut record.flags);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AttributeKey, Indicators};

    fn record(country: &str, year: i32, ladder: f64) -> Record {
        Record::new(country, year, Indicators::missing().with(AttributeKey::LifeLadder, ladder))
    }

    #[test]
    fn test_records_for_year_keeps_order() {
        let store = RecordStore::new(vec![
            record("Togo", 2013, 2.8),
            record("Finland", 2014, 7.4),
            record("Finland", 2013, 7.8),
        ])
        .unwrap();

        let names: Vec<_> = store.records_for_year(2013).iter().map(|r| r.country_name.as_str()).collect();
        assert_eq!(names, vec!["Togo", "Finland"]);
        assert!(store.records_for_year(1999).is_empty());
        assert_eq!(store.years(), vec![2013, 2014]);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let err = RecordStore::new(vec![record("Togo", 2013, 2.8), record("Togo", 2013, 2.9)]).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateRecord { year: 2013, .. }));
    }

    #[test]
    fn test_upsert_derived_flags_only_touches_matches() {
        let mut store = RecordStore::new(vec![record("Togo", 2013, 2.8), record("Togo", 2014, 2.9), record("Chad", 2013, 3.1)]).unwrap();

        let touched = store.upsert_derived_flags(|r| r.country_name == "Togo", FlagPatch::user_selected(true));
        assert_eq!(touched, 2);
        assert!(store.is_country_selected("Togo"));
        assert!(!store.is_country_selected("Chad"));
        assert!(!store.get("Togo", 2013).unwrap().flags().is_indicator_max);
    }
}
