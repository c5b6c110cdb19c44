//! Year-scoped join of boundary entities to records

use ahash::{AHashMap, AHashSet};

use super::{normalize, AliasTable, EntityFlags, GeoEntity};
use crate::record::{Record, RecordStore};
use crate::selection::resolve_display_flag;
use crate::state::SelectionMode;

/// Outcome of a full rejoin
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinReport {
    pub year: i32,
    pub matched: usize,
    /// Boundary names with no record for the year
    pub unmatched: Vec<String>,
    /// Survey countries of the year with no boundary entity
    pub orphaned_records: Vec<String>,
    /// Boundaries that lost their survey country to a later alias; also listed in `unmatched`
    pub shadowed: Vec<String>,
}

/// Keeps boundary snapshots consistent with the record store
#[derive(Debug, Clone)]
pub struct GeoJoin {
    entities: Vec<GeoEntity>,
    aliases: AliasTable,
    joined_year: Option<i32>,
}

impl GeoJoin {
    pub fn new(entities: Vec<GeoEntity>, aliases: AliasTable) -> Self {
        Self {
            entities,
            aliases,
            joined_year: None,
        }
    }

    pub fn entities(&self) -> &[GeoEntity] {
        &self.entities
    }

    /// Look up an entity by its boundary name (case-insensitive)
    pub fn entity(&self, boundary_name: &str) -> Option<&GeoEntity> {
        let key = normalize(boundary_name);
        self.entities.iter().find(|e| normalize(&e.canonical_name) == key)
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Year of the last completed join
    pub fn joined_year(&self) -> Option<i32> {
        self.joined_year
    }

    /// Replace every snapshot with the values of `year`.
    ///
    /// Each entity is cleared before matching, so nothing from a previous
    /// year survives for countries without a record in `year`. When several
    /// boundaries resolve to the same survey country, only the one with the
    /// latest alias declaration claims it; an unaliased name ranks below any
    /// declaration, and the rest stay unmatched.
    pub fn rejoin(&mut self, store: &RecordStore, year: i32) -> JoinReport {
        let year_index: AHashMap<String, &Record> = store
            .records_for_year(year)
            .into_iter()
            .map(|r| (normalize(&r.country_name), r))
            .collect();
        let country_index: AHashMap<String, &str> = store
            .country_names()
            .map(|c| (normalize(c), c))
            .collect();

        let keys: Vec<String> = self
            .entities
            .iter()
            .map(|e| self.aliases.join_key(&e.canonical_name))
            .collect();
        let mut claims: AHashMap<&str, (usize, usize)> = AHashMap::new();
        for (idx, (entity, key)) in self.entities.iter().zip(&keys).enumerate() {
            let rank = self
                .aliases
                .declared_index(&entity.canonical_name)
                .map_or(0, |declared| declared + 1);
            match claims.get(key.as_str()) {
                Some(&(best, _)) if best > rank => {}
                _ => {
                    claims.insert(key.as_str(), (rank, idx));
                }
            }
        }

        let mut report = JoinReport {
            year,
            ..JoinReport::default()
        };
        let mut used: AHashSet<&str> = AHashSet::new();

        for (idx, entity) in self.entities.iter_mut().enumerate() {
            entity.clear();
            let key = keys[idx].as_str();

            if claims.get(key).map(|&(_, winner)| winner) != Some(idx) {
                tracing::warn!(
                    "Boundary '{}' left unmatched, a later alias claims '{}'",
                    entity.canonical_name,
                    key
                );
                report.shadowed.push(entity.canonical_name.clone());
                report.unmatched.push(entity.canonical_name.clone());
                continue;
            }

            match year_index.get(key) {
                Some(record) => {
                    entity.snapshot = record.indicators;
                    entity.country = Some(record.country_name.clone());
                    entity.matched_year = Some(year);
                    used.insert(record.country_name.as_str());
                    report.matched += 1;
                }
                None => {
                    entity.country = country_index.get(key).map(|c| c.to_string());
                    report.unmatched.push(entity.canonical_name.clone());
                }
            }
        }

        report.orphaned_records = year_index
            .values()
            .filter(|r| !used.contains(r.country_name.as_str()))
            .map(|r| r.country_name.clone())
            .collect();
        report.orphaned_records.sort();

        if !report.unmatched.is_empty() {
            tracing::debug!("{} boundary entities unmatched for {}", report.unmatched.len(), year);
        }

        self.joined_year = Some(year);
        report
    }

    /// Mirror the derived flags of each matched record onto its entity
    pub(crate) fn refresh_flags(&mut self, store: &RecordStore, mode: SelectionMode) {
        for entity in self.entities.iter_mut() {
            let record_flags = match (entity.country.as_deref(), entity.matched_year) {
                (Some(country), Some(year)) => store.get(country, year).map(Record::flags),
                _ => None,
            };
            // Selection is country-level, so it is mirrored even without a record this year
            let selected = entity
                .country
                .as_deref()
                .map(|c| store.is_country_selected(c))
                .unwrap_or(false);

            let is_max = record_flags.map(|f| f.is_indicator_max).unwrap_or(false);
            let is_min = record_flags.map(|f| f.is_indicator_min).unwrap_or(false);
            entity.flags = EntityFlags {
                is_entity_max: is_max,
                is_entity_min: is_min,
                is_entity_user_selected: selected,
                is_entity_displayed: resolve_display_flag(is_max, is_min, selected, mode),
            };
        }
    }
}
