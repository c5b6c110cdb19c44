//! Assemble a dashboard from its configured datasets

use anyhow::Context;
use tracing::info;

use hv_core::{
    AliasTable, BoundarySource, Dashboard, GeoEntity, GeoJoin, Record, RecordSource, RecordStore,
};

use crate::config::{load_alias_table, DashboardConfig};
use crate::sources::{CoordinateTable, GeoJsonBoundarySource, HappinessCsvSource};

/// Everything read from disk, before the store is built
pub struct Datasets {
    pub records: Vec<Record>,
    pub entities: Vec<GeoEntity>,
    pub aliases: AliasTable,
}

/// Read the records, boundaries, coordinates and aliases named by `config`
pub async fn load_datasets(config: &DashboardConfig) -> anyhow::Result<Datasets> {
    let record_source = HappinessCsvSource::new(&config.records, config.null_config.clone());
    let boundary_source = GeoJsonBoundarySource::new(&config.boundaries, config.boundary_name_property.clone());

    let (records, entities) = tokio::try_join!(record_source.load_records(), boundary_source.load_entities())?;

    let records = match &config.coordinates {
        Some(path) => {
            let path = path.clone();
            let null_config = config.null_config.clone();
            let table = tokio::task::spawn_blocking(move || CoordinateTable::from_path(&path, &null_config))
                .await?
                .with_context(|| format!("reading coordinates {:?}", config.coordinates))?;
            table.apply(records, config.require_coordinates)
        }
        None => records,
    };

    let aliases = match &config.aliases {
        Some(path) => load_alias_table(path).with_context(|| format!("reading alias table {:?}", path))?,
        None => AliasTable::builtin(),
    };

    Ok(Datasets {
        records,
        entities,
        aliases,
    })
}

/// Load every dataset and build the dashboard at the configured year and step
pub async fn load_dashboard(config: &DashboardConfig) -> anyhow::Result<Dashboard> {
    let datasets = load_datasets(config).await?;
    info!(
        "Building dashboard from {} records and {} boundaries",
        datasets.records.len(),
        datasets.entities.len()
    );

    let store = RecordStore::new(datasets.records)?;
    let geo = GeoJoin::new(datasets.entities, datasets.aliases);
    let dashboard = Dashboard::new(store, geo, config.step_registry(), config.initial_view_state())?;
    Ok(dashboard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hv_core::{AttributeKey, SelectionMode};

    const RECORDS: &str = "Country name,year,Life Ladder\n\
        Finland,2013,7.8\n\
        Togo,2013,2.8\n\
        France,2013,6.6\n\
        United States,2013,7.1\n\
        Atlantis,2013,9.9\n";

    const COORDINATES: &str = "country,latitude,longitude\n\
        Finland,61.9,25.7\n\
        Togo,8.6,0.8\n\
        France,46.2,2.2\n\
        United States,37.1,-95.7\n";

    const BOUNDARIES: &str = r#"{ "type": "FeatureCollection", "features": [
        { "type": "Feature", "properties": { "name": "Finland" }, "geometry": null },
        { "type": "Feature", "properties": { "name": "Togo" }, "geometry": null },
        { "type": "Feature", "properties": { "name": "France" }, "geometry": null },
        { "type": "Feature", "properties": { "name": "United States of America" }, "geometry": null }
    ] }"#;

    fn write_config(dir: &std::path::Path, extra: &str) -> DashboardConfig {
        std::fs::write(dir.join("panel.csv"), RECORDS).unwrap();
        std::fs::write(dir.join("coords.csv"), COORDINATES).unwrap();
        std::fs::write(dir.join("world.geojson"), BOUNDARIES).unwrap();
        let json = format!(
            r#"{{ "records": "panel.csv", "boundaries": "world.geojson", "coordinates": "coords.csv"{} }}"#,
            extra
        );
        std::fs::write(dir.join("dashboard.json"), json).unwrap();
        DashboardConfig::from_file(dir.join("dashboard.json")).unwrap()
    }

    #[tokio::test]
    async fn test_load_dashboard_settles_initial_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path(), "");

        let dashboard = load_dashboard(&config).await.unwrap();
        assert_eq!(dashboard.store().len(), 5);
        assert_eq!(dashboard.view_state().selection_mode, SelectionMode::Browsing);
        assert_eq!(dashboard.active_step().attribute, AttributeKey::LifeLadder);

        let geo = dashboard.geo();
        let usa = geo.entity("United States of America").unwrap();
        assert_eq!(usa.country(), Some("United States"));
        // Atlantis holds the maximum but has no boundary
        assert!(!geo.entity("Finland").unwrap().flags().is_entity_displayed);
        assert!(geo.entity("Togo").unwrap().flags().is_entity_min);
    }

    #[tokio::test]
    async fn test_require_coordinates_drops_records() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_config(dir.path(), r#", "require_coordinates": true"#);

        let datasets = load_datasets(&config).await.unwrap();
        assert_eq!(datasets.records.len(), 4);
        assert!(datasets.records.iter().all(|r| r.coordinates.is_some()));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig {
            records: dir.path().join("absent.csv"),
            boundaries: dir.path().join("absent.geojson"),
            ..Default::default()
        };
        assert!(load_dashboard(&config).await.is_err());
    }
}
