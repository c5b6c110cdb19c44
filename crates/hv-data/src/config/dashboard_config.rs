//! Dashboard configuration file

use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use tracing::info;

use hv_core::{AliasTable, Step, StepRegistry, ViewState};

use super::null_handling::NullConfig;
use crate::DataError;

/// Where the datasets live and how the dashboard starts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Country/year survey CSV
    pub records: PathBuf,

    /// Boundary GeoJSON feature collection
    pub boundaries: PathBuf,

    /// Optional country coordinate CSV
    pub coordinates: Option<PathBuf>,

    /// Optional alias table JSON; the bundled table is used otherwise
    pub aliases: Option<PathBuf>,

    /// Feature property holding the boundary display name
    pub boundary_name_property: String,

    pub initial_year: i32,

    pub initial_step: usize,

    /// Replaces the default narrative steps when present
    pub steps: Option<Vec<Step>>,

    /// Missing-value handling for numeric cells
    pub null_config: NullConfig,

    /// Drop records whose country has no coordinates
    pub require_coordinates: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            records: PathBuf::from("data/world-happiness-report.csv"),
            boundaries: PathBuf::from("data/world_countries.geojson"),
            coordinates: None,
            aliases: None,
            boundary_name_property: "name".to_string(),
            initial_year: 2013,
            initial_step: 0,
            steps: None,
            null_config: NullConfig::default(),
            require_coordinates: false,
        }
    }
}

impl DashboardConfig {
    /// Read a JSON configuration. Relative paths are resolved against the
    /// directory holding the file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&text)?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.validate()?;

        info!("Loaded dashboard configuration from {:?}", path);
        Ok(config)
    }

    /// Make every relative dataset path relative to `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.records);
        resolve(&mut self.boundaries);
        if let Some(p) = self.coordinates.as_mut() {
            resolve(p);
        }
        if let Some(p) = self.aliases.as_mut() {
            resolve(p);
        }
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.boundary_name_property.trim().is_empty() {
            return Err(DataError::Config("boundary_name_property is empty".to_string()));
        }
        let steps = self.step_registry();
        if self.initial_step >= steps.len() {
            return Err(DataError::Config(format!(
                "initial_step {} out of range (0..{})",
                self.initial_step,
                steps.len()
            )));
        }
        Ok(())
    }

    pub fn step_registry(&self) -> StepRegistry {
        match &self.steps {
            Some(steps) => StepRegistry::new(steps.clone()),
            None => StepRegistry::default(),
        }
    }

    pub fn initial_view_state(&self) -> ViewState {
        ViewState::new(self.initial_year, self.initial_step)
    }
}

/// Read a versioned alias table: `{ "version": 2, "entries": [{ "boundary": .., "canonical": .. }] }`
pub fn load_alias_table(path: impl AsRef<Path>) -> Result<AliasTable, DataError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let table: AliasTable = serde_json::from_str(&text)?;
    info!("Loaded alias table v{} ({} entries)", table.version, table.entries().len());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use hv_core::AttributeKey;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, r#"{ "records": "panel.csv", "require_coordinates": true }"#).unwrap();

        let config = DashboardConfig::from_file(&path).unwrap();
        assert_eq!(config.records, dir.path().join("panel.csv"));
        assert_eq!(config.boundaries, dir.path().join("data/world_countries.geojson"));
        assert_eq!(config.initial_year, 2013);
        assert_eq!(config.boundary_name_property, "name");
        assert!(config.require_coordinates);
        assert_eq!(config.initial_view_state(), ViewState::new(2013, 0));
    }

    #[test]
    fn test_absolute_paths_untouched() {
        let mut config = DashboardConfig {
            records: PathBuf::from("/srv/panel.csv"),
            ..Default::default()
        };
        config.resolve_paths(Path::new("/etc/dashboard"));
        assert_eq!(config.records, PathBuf::from("/srv/panel.csv"));
    }

    #[test]
    fn test_step_override() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "steps": [{{ "attribute": "gdp", "label": "Wealth" }}, {{ "attribute": "lifeLadder", "label": "Happiness" }}], "initial_step": 1 }}"#
        )
        .unwrap();

        let config = DashboardConfig::from_file(file.path()).unwrap();
        let registry = config.step_registry();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.steps()[0].attribute, AttributeKey::LogGdpPerCapita);
        assert_eq!(registry.steps()[1].label, "Happiness");
    }

    #[test]
    fn test_initial_step_out_of_range() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "initial_step": 9 }}"#).unwrap();

        let err = DashboardConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, DataError::Config(_)));
    }

    #[test]
    fn test_load_alias_table() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "version": 3, "entries": [{{ "boundary": "Republic of Serbia", "canonical": "Serbia" }}] }}"#
        )
        .unwrap();

        let table = load_alias_table(file.path()).unwrap();
        assert_eq!(table.version, 3);
        assert_eq!(table.resolve("republic of serbia"), "Serbia");
        assert!(table.ambiguities().is_empty());
    }
}
