//! Choropleth world map

use serde::Serialize;
use uuid::Uuid;

use hv_core::{AttributeKey, Extent, GeoEntity, SelectionMode, Step, UpdateContext};

use crate::{LinkedView, ViewId};
use super::utils::colors::{ColorRamp, Rgb, MAXIMUM_FILL, MINIMUM_FILL, NO_DATA_FILL, SELECTED_FILL};

/// How a region is painted
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum RegionFill {
    Maximum,
    Minimum,
    Selected,
    /// Position on the color ramp, in `[0, 1]`
    Scaled(f64),
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    /// Boundary display name
    pub name: String,
    /// Survey country joined for the active year
    pub country: Option<String>,
    pub value: Option<f64>,
    pub fill: RegionFill,
    pub color: Rgb,
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub min: f64,
    pub max: f64,
    pub min_label: String,
    pub max_label: String,
    pub ramp: ColorRamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapFrame {
    pub sequence: u64,
    pub year: i32,
    pub attribute: AttributeKey,
    pub label: String,
    pub mode: SelectionMode,
    pub regions: Vec<Region>,
    /// `None` when the active attribute has no spread this year
    pub legend: Option<Legend>,
}

impl MapFrame {
    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }
}

/// Colors each boundary by the active attribute of the active year
pub struct MapView {
    id: ViewId,
    title: String,
    ramp: ColorRamp,
}

impl MapView {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: "World Map".to_string(),
            ramp: ColorRamp::default(),
        }
    }

    fn fill(&self, entity: &GeoEntity, value: Option<f64>, extent: Option<Extent>, mode: SelectionMode) -> RegionFill {
        let flags = entity.flags();
        let scaled = match (value, extent) {
            (Some(v), Some(extent)) => RegionFill::Scaled(extent.normalize(v)),
            _ => RegionFill::NoData,
        };

        match mode {
            SelectionMode::Browsing if flags.is_entity_max => RegionFill::Maximum,
            SelectionMode::Browsing if flags.is_entity_min => RegionFill::Minimum,
            SelectionMode::Explicit if flags.is_entity_user_selected => RegionFill::Selected,
            _ => scaled,
        }
    }

    fn color(&self, fill: RegionFill) -> Rgb {
        match fill {
            RegionFill::Maximum => MAXIMUM_FILL,
            RegionFill::Minimum => MINIMUM_FILL,
            RegionFill::Selected => SELECTED_FILL,
            RegionFill::Scaled(t) => self.ramp.at(t),
            RegionFill::NoData => NO_DATA_FILL,
        }
    }
}

impl Default for MapView {
    fn default() -> Self {
        Self::new()
    }
}

/// Legend labels carry one decimal
fn legend_label(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round() / 10.0)
}

impl LinkedView for MapView {
    type Frame = MapFrame;

    fn id(&self) -> ViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "MapView"
    }

    fn on_step(&mut self, _index: usize, step: &Step) {
        self.ramp = ColorRamp::for_attribute(step.attribute);
    }

    fn render(&mut self, ctx: &UpdateContext<'_>) -> MapFrame {
        let attribute = ctx.step.attribute;
        let mode = ctx.view_state.selection_mode;
        let entities = ctx.geo.entities();
        let extent = Extent::of(entities.iter().map(|e| e.value(attribute)));

        let regions = entities
            .iter()
            .map(|entity| {
                let value = entity.value(attribute);
                let fill = self.fill(entity, value, extent, mode);
                let shown = value.map_or_else(|| "N/A".to_string(), |v| v.to_string());
                Region {
                    name: entity.canonical_name.clone(),
                    country: entity.country().map(str::to_string),
                    value,
                    fill,
                    color: self.color(fill),
                    tooltip: format!("{}: {}: {}", entity.canonical_name, ctx.step.label, shown),
                }
            })
            .collect();

        let legend = extent.filter(|e| !e.is_degenerate()).map(|e| Legend {
            min: e.min,
            max: e.max,
            min_label: legend_label(e.min),
            max_label: legend_label(e.max),
            ramp: self.ramp,
        });

        MapFrame {
            sequence: ctx.sequence,
            year: ctx.view_state.active_year,
            attribute,
            label: ctx.step.label.clone(),
            mode,
            regions,
            legend,
        }
    }
}
