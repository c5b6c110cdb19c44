//! Boundary entities and their join against the record store

use serde::Serialize;

use crate::record::{AttributeKey, Indicators};

mod alias;
mod join;

pub use alias::{normalize, AliasAmbiguity, AliasEntry, AliasTable};
pub use join::{GeoJoin, JoinReport};

/// Decoded boundary geometry. Opaque to the core; owned by the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoundaryGeometry(serde_json::Value);

impl BoundaryGeometry {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Flags mirrored from the matched record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntityFlags {
    pub is_entity_max: bool,
    pub is_entity_min: bool,
    pub is_entity_user_selected: bool,
    pub is_entity_displayed: bool,
}

/// One boundary polygon and the indicator snapshot of the active year
#[derive(Debug, Clone, Serialize)]
pub struct GeoEntity {
    /// Display name as it appears in the boundary dataset
    pub canonical_name: String,
    pub geometry: BoundaryGeometry,
    snapshot: Indicators,
    flags: EntityFlags,
    country: Option<String>,
    matched_year: Option<i32>,
}

impl GeoEntity {
    pub fn new(canonical_name: impl Into<String>, geometry: BoundaryGeometry) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            geometry,
            snapshot: Indicators::missing(),
            flags: EntityFlags::default(),
            country: None,
            matched_year: None,
        }
    }

    /// Indicator values copied from the active year's record
    pub fn snapshot(&self) -> &Indicators {
        &self.snapshot
    }

    pub fn value(&self, attribute: AttributeKey) -> Option<f64> {
        self.snapshot.get(attribute)
    }

    pub fn flags(&self) -> EntityFlags {
        self.flags
    }

    /// Survey country this entity resolves to, if the store knows it
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// Year of the record currently copied into the snapshot
    pub fn matched_year(&self) -> Option<i32> {
        self.matched_year
    }

    pub fn is_matched(&self) -> bool {
        self.matched_year.is_some()
    }

    fn clear(&mut self) {
        self.snapshot = Indicators::missing();
        self.flags = EntityFlags::default();
        self.country = None;
        self.matched_year = None;
    }
}
