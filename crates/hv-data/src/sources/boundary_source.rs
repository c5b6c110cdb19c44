//! GeoJSON boundary source

use std::path::{Path, PathBuf};
use ahash::AHashSet;
use async_trait::async_trait;
use geojson::{Feature, GeoJson};
use tracing::{info, warn};

use hv_core::{BoundaryGeometry, BoundarySource, GeoEntity};

use crate::DataError;

/// Country boundaries from a GeoJSON feature collection
pub struct GeoJsonBoundarySource {
    path: PathBuf,
    name_property: String,
    source_name: String,
}

impl GeoJsonBoundarySource {
    pub fn new(path: impl Into<PathBuf>, name_property: impl Into<String>) -> Self {
        let path = path.into();
        let source_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        Self {
            path,
            name_property: name_property.into(),
            source_name,
        }
    }
}

#[async_trait]
impl BoundarySource for GeoJsonBoundarySource {
    async fn load_entities(&self) -> anyhow::Result<Vec<GeoEntity>> {
        let path = self.path.clone();
        let name_property = self.name_property.clone();
        let entities = tokio::task::spawn_blocking(move || read_entities(&path, &name_property)).await??;
        Ok(entities)
    }

    fn source_name(&self) -> &str {
        &self.source_name
    }
}

/// Decode boundary entities from a GeoJSON file
pub fn read_entities(path: &Path, name_property: &str) -> Result<Vec<GeoEntity>, DataError> {
    let text = std::fs::read_to_string(path)?;
    let entities = parse_entities(&text, name_property)?;
    info!("Loaded {} boundaries from {:?}", entities.len(), path);
    Ok(entities)
}

/// Decode boundary entities from GeoJSON text. Features without a name are
/// skipped, and a repeated name keeps its first feature.
pub fn parse_entities(text: &str, name_property: &str) -> Result<Vec<GeoEntity>, DataError> {
    let features: Vec<Feature> = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(DataError::GeoJson("expected features, found a bare geometry".to_string()));
        }
    };

    let mut seen = AHashSet::new();
    let mut entities = Vec::with_capacity(features.len());
    for (idx, feature) in features.into_iter().enumerate() {
        let Some(name) = feature
            .property(name_property)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
        else {
            warn!("Feature {} has no '{}' property, skipped", idx, name_property);
            continue;
        };

        if !seen.insert(name.clone()) {
            warn!("Boundary '{}' appears more than once, keeping the first", name);
            continue;
        }

        let geometry = match &feature.geometry {
            Some(geometry) => BoundaryGeometry::new(serde_json::to_value(geometry)?),
            None => BoundaryGeometry::default(),
        };
        entities.push(GeoEntity::new(name, geometry));
    }

    Ok(entities)
}
