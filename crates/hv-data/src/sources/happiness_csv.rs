//! Country/year survey CSV source

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use csv::ReaderBuilder;
use tracing::{info, warn};

use hv_core::{AttributeKey, Indicators, Record, RecordSource};

use crate::{DataError, config::NullConfig};

pub const COUNTRY_COLUMN: &str = "Country name";
pub const YEAR_COLUMN: &str = "year";

/// Survey CSV with one row per country and year
pub struct HappinessCsvSource {
    path: PathBuf,
    null_config: NullConfig,
    source_name: String,
}

impl HappinessCsvSource {
    pub fn new(path: impl Into<PathBuf>, null_config: NullConfig) -> Self {
        let path = path.into();
        let source_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        Self {
            path,
            null_config,
            source_name,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSource for HappinessCsvSource {
    async fn load_records(&self) -> anyhow::Result<Vec<Record>> {
        let path = self.path.clone();
        let null_config = self.null_config.clone();
        let records = tokio::task::spawn_blocking(move || read_records(&path, &null_config)).await??;
        Ok(records)
    }

    fn source_name(&self) -> &str {
        &self.source_name
    }
}

/// Read every usable row. Rows without a country or a numeric year are
/// skipped; unparseable indicator cells become missing.
pub fn read_records(path: &Path, null_config: &NullConfig) -> Result<Vec<Record>, DataError> {
    let source_name = path.display().to_string();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let position = |column: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(column));

    let country_idx = position(COUNTRY_COLUMN).ok_or_else(|| DataError::MissingColumn {
        column: COUNTRY_COLUMN.to_string(),
        source_name: source_name.clone(),
    })?;
    let year_idx = position(YEAR_COLUMN).ok_or_else(|| DataError::MissingColumn {
        column: YEAR_COLUMN.to_string(),
        source_name: source_name.clone(),
    })?;

    let attribute_columns: Vec<(AttributeKey, Option<usize>)> = AttributeKey::ALL
        .into_iter()
        .map(|attr| (attr, position(attr.column_name())))
        .collect();
    for (attr, idx) in &attribute_columns {
        if idx.is_none() {
            warn!("{}: no '{}' column, values will be missing", source_name, attr.column_name());
        }
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (line, row) in reader.records().enumerate() {
        let row = row?;

        let country = row.get(country_idx).map(str::trim).unwrap_or_default();
        if country.is_empty() {
            skipped += 1;
            warn!("{}: row {} has no country name, skipped", source_name, line + 2);
            continue;
        }

        let Some(year) = row.get(year_idx).and_then(parse_year) else {
            skipped += 1;
            warn!("{}: row {} ('{}') has no valid year, skipped", source_name, line + 2, country);
            continue;
        };

        let mut indicators = Indicators::missing();
        for (attr, idx) in &attribute_columns {
            let value = idx.and_then(|i| row.get(i)).and_then(|cell| null_config.parse_number(cell));
            indicators.set(*attr, value);
        }

        records.push(Record::new(country, year, indicators));
    }

    info!("Loaded {} records from {} ({} skipped)", records.len(), source_name, skipped);
    Ok(records)
}

/// Years are integers, but exports sometimes write them as `2013.0`
fn parse_year(cell: &str) -> Option<i32> {
    let cell = cell.trim();
    cell.parse::<i32>().ok().or_else(|| {
        cell.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0 && v.abs() < i32::MAX as f64)
            .map(|v| v as i32)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Country name,year,Life Ladder,Log GDP per capita,Social support,Healthy life expectancy at birth,Freedom to make life choices,Generosity,Perceptions of corruption,Positive affect,Negative affect";

    fn fixture(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file
    }

    #[test]
    fn test_columns_by_name() {
        let file = fixture(&["Finland,2013,7.445,10.7,0.94,71.1,0.92,-0.0,0.23,0.78,0.18"]);
        let records = read_records(file.path(), &NullConfig::default()).unwrap();

        assert_eq!(records.len(), 1);
        let finland = &records[0];
        assert_eq!(finland.country_name, "Finland");
        assert_eq!(finland.year, 2013);
        assert_eq!(finland.value(AttributeKey::LifeLadder), Some(7.445));
        assert_eq!(finland.value(AttributeKey::LogGdpPerCapita), Some(10.7));
        assert_eq!(finland.value(AttributeKey::NegativeAffect), Some(0.18));
        assert!(finland.coordinates.is_none());
    }

    #[test]
    fn test_unparseable_cells_are_missing() {
        let file = fixture(&["Togo,2014,2.8,,0.5,n/a,abc,NaN,0.8,0.6,0.4"]);
        let records = read_records(file.path(), &NullConfig::default()).unwrap();

        let togo = &records[0];
        assert_eq!(togo.value(AttributeKey::LifeLadder), Some(2.8));
        assert_eq!(togo.value(AttributeKey::LogGdpPerCapita), None);
        assert_eq!(togo.value(AttributeKey::HealthyLifeExpectancy), None);
        assert_eq!(togo.value(AttributeKey::Freedom), None);
        assert_eq!(togo.value(AttributeKey::Generosity), None);
    }

    #[test]
    fn test_bad_rows_skipped() {
        let file = fixture(&[
            ",2013,5.0,,,,,,,,",
            "Chad,unknown,4.0,,,,,,,,",
            "Chad,2013.0,4.3,,,,,,,,",
        ]);
        let records = read_records(file.path(), &NullConfig::default()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year, 2013);
    }

    #[test]
    fn test_missing_year_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Country name,Life Ladder").unwrap();
        writeln!(file, "Finland,7.8").unwrap();

        let err = read_records(file.path(), &NullConfig::default()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { ref column, .. } if column == "year"));
    }

    #[test]
    fn test_absent_attribute_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Country name,year,Life Ladder").unwrap();
        writeln!(file, "Finland,2013,7.8").unwrap();

        let records = read_records(file.path(), &NullConfig::default()).unwrap();
        assert_eq!(records[0].value(AttributeKey::LifeLadder), Some(7.8));
        assert_eq!(records[0].value(AttributeKey::Generosity), None);
    }

    #[tokio::test]
    async fn test_async_load() {
        let file = fixture(&["Finland,2013,7.4,,,,,,,,", "Togo,2013,2.8,,,,,,,,"]);
        let source = HappinessCsvSource::new(file.path(), NullConfig::default());

        let records = source.load_records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(source.path(), file.path());
    }
}
