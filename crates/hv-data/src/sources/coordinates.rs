//! Country coordinate lookup

use std::path::Path;
use ahash::AHashMap;
use csv::ReaderBuilder;
use tracing::{debug, info, warn};

use hv_core::{Coordinates, Record};

use crate::{DataError, config::NullConfig};

/// Country → (latitude, longitude), read from a `country,latitude,longitude` CSV
#[derive(Debug, Clone, Default)]
pub struct CoordinateTable {
    by_country: AHashMap<String, Coordinates>,
}

impl CoordinateTable {
    pub fn from_path(path: &Path, null_config: &NullConfig) -> Result<Self, DataError> {
        let source_name = path.display().to_string();
        let mut reader = ReaderBuilder::new().has_headers(true).flexible(true).from_path(path)?;

        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| DataError::MissingColumn {
                    column: name.to_string(),
                    source_name: source_name.clone(),
                })
        };
        let country_idx = column("country")?;
        let lat_idx = column("latitude")?;
        let lon_idx = column("longitude")?;

        let mut table = Self::default();
        for row in reader.records() {
            let row = row?;
            let country = row.get(country_idx).map(str::trim).unwrap_or_default();
            let latitude = row.get(lat_idx).and_then(|c| null_config.parse_number(c));
            let longitude = row.get(lon_idx).and_then(|c| null_config.parse_number(c));

            match (country.is_empty(), latitude, longitude) {
                (false, Some(latitude), Some(longitude)) => {
                    table.insert(country, Coordinates { latitude, longitude });
                }
                _ => debug!("{}: incomplete coordinate row for '{}'", source_name, country),
            }
        }

        info!("Loaded coordinates for {} countries from {}", table.len(), source_name);
        Ok(table)
    }

    pub fn insert(&mut self, country: impl Into<String>, coordinates: Coordinates) {
        self.by_country.insert(country.into(), coordinates);
    }

    pub fn get(&self, country: &str) -> Option<Coordinates> {
        self.by_country.get(country).copied()
    }

    pub fn len(&self) -> usize {
        self.by_country.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_country.is_empty()
    }

    /// Attach coordinates to every record that has them. With `require`,
    /// records without coordinates are dropped.
    pub fn apply(&self, records: Vec<Record>, require: bool) -> Vec<Record> {
        let total = records.len();
        let joined: Vec<Record> = records
            .into_iter()
            .filter_map(|record| match self.get(&record.country_name) {
                Some(coordinates) => Some(record.with_coordinates(coordinates)),
                None if require => None,
                None => Some(record),
            })
            .collect();

        if joined.len() < total {
            warn!("Dropped {} records without coordinates", total - joined.len());
        }
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use hv_core::Indicators;
    use tempfile::NamedTempFile;

    fn table() -> CoordinateTable {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "country_code,latitude,longitude,country").unwrap();
        writeln!(file, "FI,61.92,25.75,Finland").unwrap();
        writeln!(file, "TG,8.62,0.82,Togo").unwrap();
        writeln!(file, "XX,,,Nowhere").unwrap();
        CoordinateTable::from_path(file.path(), &NullConfig::default()).unwrap()
    }

    fn records() -> Vec<Record> {
        ["Finland", "Togo", "Kosovo"]
            .iter()
            .map(|c| Record::new(*c, 2013, Indicators::missing()))
            .collect()
    }

    #[test]
    fn test_reads_columns_by_name() {
        let table = table();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("Finland"), Some(Coordinates { latitude: 61.92, longitude: 25.75 }));
        assert_eq!(table.get("Nowhere"), None);
    }

    #[test]
    fn test_apply_keeps_records_without_coordinates() {
        let joined = table().apply(records(), false);
        assert_eq!(joined.len(), 3);
        assert!(joined[0].coordinates.is_some());
        assert!(joined[2].coordinates.is_none());
    }

    #[test]
    fn test_apply_required_filters() {
        let joined = table().apply(records(), true);
        let names: Vec<&str> = joined.iter().map(|r| r.country_name.as_str()).collect();
        assert_eq!(names, vec!["Finland", "Togo"]);
    }
}
