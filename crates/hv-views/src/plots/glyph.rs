//! Glyph strip: a row of faces per displayed country

use serde::Serialize;
use uuid::Uuid;

use hv_core::{AttributeKey, UpdateContext};

use crate::{LinkedView, ViewId};

pub const FACES_PER_ROW: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlyphRow {
    pub country: String,
    pub life_ladder: Option<f64>,
    /// Smiling faces out of [`FACES_PER_ROW`]
    pub filled: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlyphFrame {
    pub sequence: u64,
    pub year: i32,
    pub rows: Vec<GlyphRow>,
}

/// Half the ten-point ladder, rounded, one face per point
pub fn filled_faces(life_ladder: Option<f64>) -> u8 {
    match life_ladder {
        Some(v) if v.is_finite() => (v / 2.0).round().clamp(0.0, FACES_PER_ROW as f64) as u8,
        _ => 0,
    }
}

pub struct GlyphView {
    id: ViewId,
    title: String,
}

impl GlyphView {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: "Happiness Glyphs".to_string(),
        }
    }
}

impl Default for GlyphView {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkedView for GlyphView {
    type Frame = GlyphFrame;

    fn id(&self) -> ViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "GlyphView"
    }

    fn render(&mut self, ctx: &UpdateContext<'_>) -> GlyphFrame {
        let year = ctx.view_state.active_year;
        let rows = ctx
            .store
            .records_for_year(year)
            .into_iter()
            .filter(|r| r.is_displayed())
            .map(|record| {
                let life_ladder = record.value(AttributeKey::LifeLadder);
                GlyphRow {
                    country: record.country_name.clone(),
                    life_ladder,
                    filled: filled_faces(life_ladder),
                }
            })
            .collect();

        GlyphFrame {
            sequence: ctx.sequence,
            year,
            rows,
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
    fn test_filled_faces() {
        assert_eq!(filled_faces(Some(7.8)), 4);
        assert_eq!(filled_faces(Some(2.8)), 1);
        assert_eq!(filled_faces(Some(10.0)), 5);
        assert_eq!(filled_faces(Some(14.0)), 5);
        assert_eq!(filled_faces(Some(-1.0)), 0);
        assert_eq!(filled_faces(None), 0);
    }

    #[test]
    fn test_rows_follow_display_flag() {
        let dashboard = dashboard();
        let glyphs = Arc::new(ViewAdapter::new(GlyphView::new()));
        dashboard.subscribe(glyphs.clone());
        dashboard.refresh();

        let rows = glyphs.frame().unwrap().rows;
        let summary: Vec<(&str, u8)> = rows.iter().map(|r| (r.country.as_str(), r.filled)).collect();
        assert_eq!(summary, vec![("Finland", 4), ("Togo", 1)]);

        dashboard.select_countries(["France"]);
        let rows = glyphs.frame().unwrap().rows;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].filled, 3);
    }
}
