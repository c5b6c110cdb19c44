//! Radial chart comparing the displayed countries across every indicator

use serde::Serialize;
use uuid::Uuid;

use hv_core::{AttributeKey, Extent, UpdateContext};

use crate::{LinkedView, ViewId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarAxis {
    pub attribute: AttributeKey,
    pub label: &'static str,
    /// Range of the attribute over the active year
    pub extent: Option<Extent>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarSeries {
    pub country: String,
    /// One entry per axis, normalized to `[0, 1]`
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarFrame {
    pub sequence: u64,
    pub year: i32,
    pub axes: Vec<RadarAxis>,
    pub series: Vec<RadarSeries>,
}

pub struct RadarView {
    id: ViewId,
    title: String,
}

impl RadarView {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: "Indicator Profile".to_string(),
        }
    }
}

impl Default for RadarView {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkedView for RadarView {
    type Frame = RadarFrame;

    fn id(&self) -> ViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "RadarView"
    }

    fn render(&mut self, ctx: &UpdateContext<'_>) -> RadarFrame {
        let year = ctx.view_state.active_year;
        let records = ctx.store.records_for_year(year);

        let axes: Vec<RadarAxis> = AttributeKey::ALL
            .into_iter()
            .map(|attribute| RadarAxis {
                attribute,
                label: attribute.column_name(),
                extent: Extent::of(records.iter().map(|r| r.value(attribute))),
                active: attribute == ctx.step.attribute,
            })
            .collect();

        let series = records
            .iter()
            .filter(|r| r.is_displayed())
            .map(|record| RadarSeries {
                country: record.country_name.clone(),
                values: axes
                    .iter()
                    .map(|axis| {
                        let value = record.value(axis.attribute)?;
                        Some(axis.extent.map_or(1.0, |e| e.normalize(value)))
                    })
                    .collect(),
            })
            .collect();

        RadarFrame {
            sequence: ctx.sequence,
            year,
            axes,
            series,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plots::test_support::dashboard;
    use crate::ViewAdapter;
    use std::sync::Arc;

    #[test]
    fn test_series_for_displayed_records() {
        let dashboard = dashboard();
        let radar = Arc::new(ViewAdapter::new(RadarView::new()));
        dashboard.subscribe(radar.clone());
        dashboard.refresh();

        let frame = radar.frame().unwrap();
        assert_eq!(frame.axes.len(), 9);
        assert!(frame.axes[0].active);

        let countries: Vec<&str> = frame.series.iter().map(|s| s.country.as_str()).collect();
        assert_eq!(countries, vec!["Finland", "Togo"]);
        assert_eq!(frame.series[0].values[0], Some(1.0));
        assert_eq!(frame.series[1].values[0], Some(0.0));
        // Generosity is missing for everyone
        assert_eq!(frame.series[0].values[8], None);
    }

    #[test]
    fn test_single_value_normalizes_to_one() {
        let dashboard = dashboard();
        let radar = Arc::new(ViewAdapter::new(RadarView::new()));
        dashboard.subscribe(radar.clone());

        // France alone has positive affect in 2013
        dashboard.select_countries(["France"]);
        let frame = radar.frame().unwrap();
        let positive = AttributeKey::ALL.iter().position(|a| *a == AttributeKey::PositiveAffect).unwrap();

        assert_eq!(frame.series.len(), 1);
        assert!(frame.axes[positive].extent.unwrap().is_degenerate());
        assert_eq!(frame.series[0].values[positive], Some(1.0));
        assert!(frame.series[0].values.iter().flatten().all(|v| v.is_finite()));
    }
}
