//! Plain-text rendering of viewport frames

use std::fmt::Write;

use hv_core::TransactionReport;
use hv_views::{RegionFill, ViewportFrames};
use hv_views::plots::glyph::FACES_PER_ROW;

/// One block of text describing every view's current frame
pub fn summarize(frames: &ViewportFrames) -> String {
    let mut out = String::new();

    if let Some(map) = &frames.map {
        let _ = writeln!(out, "[#{}] {} / {} / {:?}", map.sequence, map.year, map.label, map.mode);

        let legend = match &map.legend {
            Some(legend) => format!("{} .. {}", legend.min_label, legend.max_label),
            None => "none".to_string(),
        };
        let marked: Vec<String> = map
            .regions
            .iter()
            .filter_map(|r| match r.fill {
                RegionFill::Maximum => Some(format!("{} (max)", r.name)),
                RegionFill::Minimum => Some(format!("{} (min)", r.name)),
                RegionFill::Selected => Some(format!("{} (selected)", r.name)),
                _ => None,
            })
            .collect();
        let _ = writeln!(
            out,
            "  map: {} regions, legend {}, marked: {}",
            map.regions.len(),
            legend,
            list(&marked)
        );
    }

    if let Some(scatter) = &frames.scatter {
        let highlighted: Vec<String> = scatter
            .points
            .iter()
            .filter(|p| p.highlighted)
            .map(|p| format!("{} ({}, {})", p.country, p.x, p.y))
            .collect();
        let _ = writeln!(
            out,
            "  scatter: {} points of {} vs {}, highlighted: {}",
            scatter.points.len(),
            scatter.x_attribute.key(),
            scatter.y_attribute.key(),
            list(&highlighted)
        );
    }

    if let Some(radar) = &frames.radar {
        let countries: Vec<String> = radar.series.iter().map(|s| s.country.clone()).collect();
        let _ = writeln!(out, "  radar: {}", list(&countries));
    }

    if let Some(glyphs) = &frames.glyphs {
        let _ = writeln!(out, "  glyphs:");
        for row in &glyphs.rows {
            let faces: String = (0..FACES_PER_ROW)
                .map(|i| if i < row.filled { '*' } else { '.' })
                .collect();
            let _ = writeln!(out, "    {:<24} {}", row.country, faces);
        }
    }

    out
}

/// Recovered conditions of a transaction, one per line
pub fn describe_report(report: &TransactionReport) -> String {
    let mut out = String::new();
    if report.deferred {
        let _ = writeln!(out, "  (queued behind a running transaction)");
    }
    for err in &report.recovered {
        let _ = writeln!(out, "  note: {}", err);
    }
    out
}

fn list(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hv_core::{
        AliasTable, AttributeKey, BoundaryGeometry, CoreError, Dashboard, GeoEntity, GeoJoin, Indicators,
        Record, RecordStore, StepRegistry, ViewState,
    };
    use hv_views::Viewport;

    fn viewport() -> Viewport {
        let store = RecordStore::new(vec![
            Record::new("Finland", 2013, Indicators::missing().with(AttributeKey::LifeLadder, 7.8)),
            Record::new("Togo", 2013, Indicators::missing().with(AttributeKey::LifeLadder, 2.8)),
            Record::new("France", 2013, Indicators::missing().with(AttributeKey::LifeLadder, 6.6)),
        ])
        .unwrap();
        let entities = ["Finland", "Togo", "France"]
            .iter()
            .map(|n| GeoEntity::new(*n, BoundaryGeometry::default()))
            .collect();
        let dashboard = Dashboard::new(
            store,
            GeoJoin::new(entities, AliasTable::builtin()),
            StepRegistry::default(),
            ViewState::new(2013, 0),
        )
        .unwrap();
        Viewport::new(dashboard)
    }

    #[test]
    fn test_summary_lists_extremes() {
        let text = summarize(&viewport().frames());

        assert!(text.starts_with("[#0] 2013 / Life Ladder / Browsing"));
        assert!(text.contains("legend 2.8 .. 7.8"));
        assert!(text.contains("Finland (max), Togo (min)"));
        assert!(text.contains("radar: Finland, Togo"));
        assert!(text.contains("****."));
    }

    #[test]
    fn test_summary_after_selection() {
        let viewport = viewport();
        viewport.click_region("France");
        let text = summarize(&viewport.frames());

        assert!(text.contains("France (selected)"));
        assert!(text.contains("highlighted: France (6.6, 6.6)"));
    }

    #[test]
    fn test_describe_report() {
        let report = TransactionReport {
            sequence: Some(4),
            view_state: ViewState::default(),
            recovered: vec![CoreError::CountryNotFound { name: "Narnia".to_string() }],
            deferred: false,
        };
        assert_eq!(describe_report(&report), "  note: Country 'Narnia' not found\n");
    }
}
