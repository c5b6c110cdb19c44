//! Scatter plot of the active attribute against life ladder

use serde::Serialize;
use uuid::Uuid;

use hv_core::{AttributeKey, Extent, UpdateContext};

use crate::{LinkedView, ViewId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub country: String,
    pub x: f64,
    pub y: f64,
    pub highlighted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisDomain {
    pub min: f64,
    pub max: f64,
}

impl AxisDomain {
    /// Axes start at zero unless the data goes negative
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        Extent::of(values.into_iter().map(Some)).map(|e| AxisDomain {
            min: if e.min > 0.0 { 0.0 } else { e.min },
            max: e.max,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterFrame {
    pub sequence: u64,
    pub year: i32,
    pub x_attribute: AttributeKey,
    pub x_label: String,
    pub y_attribute: AttributeKey,
    pub points: Vec<ScatterPoint>,
    pub x_domain: Option<AxisDomain>,
    pub y_domain: Option<AxisDomain>,
}

impl ScatterFrame {
    pub fn point(&self, country: &str) -> Option<&ScatterPoint> {
        self.points.iter().find(|p| p.country == country)
    }
}

/// One point per country of the active year
pub struct ScatterView {
    id: ViewId,
    title: String,
    y_attribute: AttributeKey,
}

impl ScatterView {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: "Scatter Plot".to_string(),
            y_attribute: AttributeKey::LifeLadder,
        }
    }
}

impl Default for ScatterView {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkedView for ScatterView {
    type Frame = ScatterFrame;

    fn id(&self) -> ViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "ScatterView"
    }

    fn render(&mut self, ctx: &UpdateContext<'_>) -> ScatterFrame {
        let x_attribute = ctx.step.attribute;
        let year = ctx.view_state.active_year;

        // Points missing either coordinate are left out
        let points: Vec<ScatterPoint> = ctx
            .store
            .records_for_year(year)
            .into_iter()
            .filter_map(|record| {
                Some(ScatterPoint {
                    country: record.country_name.clone(),
                    x: record.value(x_attribute)?,
                    y: record.value(self.y_attribute)?,
                    highlighted: record.is_displayed(),
                })
            })
            .collect();

        ScatterFrame {
            sequence: ctx.sequence,
            year,
            x_attribute,
            x_label: ctx.step.label.clone(),
            y_attribute: self.y_attribute,
            x_domain: AxisDomain::from_values(points.iter().map(|p| p.x)),
            y_domain: AxisDomain::from_values(points.iter().map(|p| p.y)),
            points,
        }
    }
}
