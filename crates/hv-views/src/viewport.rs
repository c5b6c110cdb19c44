//! Viewport - owns the linked views and routes their gestures to the dashboard

use std::sync::Arc;
use serde::Serialize;
use tracing::info;

use hv_core::{Dashboard, TransactionReport};

use crate::plots::{GlyphFrame, GlyphView, MapFrame, MapView, RadarFrame, RadarView, ScatterFrame, ScatterView};
use crate::{LinkedView, ViewAdapter};

/// The latest frame of every view
#[derive(Debug, Clone, Serialize)]
pub struct ViewportFrames {
    pub map: Option<MapFrame>,
    pub scatter: Option<ScatterFrame>,
    pub radar: Option<RadarFrame>,
    pub glyphs: Option<GlyphFrame>,
}

/// The four linked views of the dashboard, subscribed in drawing order
pub struct Viewport {
    dashboard: Dashboard,
    map: Arc<ViewAdapter<MapView>>,
    scatter: Arc<ViewAdapter<ScatterView>>,
    radar: Arc<ViewAdapter<RadarView>>,
    glyphs: Arc<ViewAdapter<GlyphView>>,
}

impl Viewport {
    /// Subscribe every view and draw the initial frames
    pub fn new(dashboard: Dashboard) -> Self {
        let viewport = Self {
            map: Self::attach(&dashboard, MapView::new()),
            scatter: Self::attach(&dashboard, ScatterView::new()),
            radar: Self::attach(&dashboard, RadarView::new()),
            glyphs: Self::attach(&dashboard, GlyphView::new()),
            dashboard,
        };
        viewport.dashboard.refresh();
        viewport
    }

    fn attach<V: LinkedView>(dashboard: &Dashboard, view: V) -> Arc<ViewAdapter<V>> {
        info!("Adding view '{}' ({})", view.display_name(), view.view_type());
        let adapter = Arc::new(ViewAdapter::new(view));
        dashboard.subscribe(adapter.clone());
        adapter
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn map(&self) -> &ViewAdapter<MapView> {
        &self.map
    }

    pub fn scatter(&self) -> &ViewAdapter<ScatterView> {
        &self.scatter
    }

    pub fn radar(&self) -> &ViewAdapter<RadarView> {
        &self.radar
    }

    pub fn glyphs(&self) -> &ViewAdapter<GlyphView> {
        &self.glyphs
    }

    pub fn frames(&self) -> ViewportFrames {
        ViewportFrames {
            map: self.map.frame(),
            scatter: self.scatter.frame(),
            radar: self.radar.frame(),
            glyphs: self.glyphs.frame(),
        }
    }

    /// A click on a map region selects the country behind the boundary
    pub fn click_region(&self, boundary_name: &str) -> TransactionReport {
        self.dashboard.select_countries([boundary_name])
    }

    /// A click on a scatter point selects its country
    pub fn click_point(&self, country: &str) -> TransactionReport {
        self.dashboard.select_countries([country])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hv_core::{BusEvent, SelectionMode, UpdateContext};
    use crate::plots::test_support::dashboard;

    #[test]
    fn test_initial_frames() {
        let viewport = Viewport::new(dashboard());
        let frames = viewport.frames();

        assert_eq!(frames.map.unwrap().sequence, 0);
        assert_eq!(frames.scatter.unwrap().year, 2013);
        assert!(frames.radar.is_some());
        assert_eq!(frames.glyphs.unwrap().rows.len(), 2);
        assert_eq!(viewport.dashboard().subscriber_count(), 4);
    }

    #[test]
    fn test_views_agree_after_click() {
        let viewport = Viewport::new(dashboard());
        let report = viewport.click_region("France");
        assert!(report.is_clean());

        let frames = viewport.frames();
        let map = frames.map.unwrap();
        let scatter = frames.scatter.unwrap();
        let glyphs = frames.glyphs.unwrap();

        assert_eq!(map.mode, SelectionMode::Explicit);
        assert_eq!(map.sequence, scatter.sequence);
        assert_eq!(scatter.sequence, glyphs.sequence);
        assert_eq!(glyphs.rows[0].country, "France");
        assert_eq!(frames.radar.unwrap().series[0].country, "France");
    }

    #[test]
    fn test_click_point_toggles() {
        let viewport = Viewport::new(dashboard());
        viewport.click_point("Togo");
        viewport.click_point("Togo");

        assert_eq!(viewport.dashboard().view_state().selection_mode, SelectionMode::Browsing);
        assert_eq!(viewport.scatter().sequence(), Some(2));
    }

    #[test]
    fn test_unknown_region_click_is_harmless() {
        let viewport = Viewport::new(dashboard());
        let report = viewport.click_region("Atlantis");

        assert!(!report.is_clean());
        assert_eq!(viewport.dashboard().view_state().selection_mode, SelectionMode::Browsing);
        assert_eq!(viewport.glyphs().frame().unwrap().rows.len(), 2);
    }

    #[test]
    fn test_stale_update_dropped() {
        let viewport = Viewport::new(dashboard());
        viewport.dashboard().set_year(2014);
        viewport.dashboard().set_year(2013);
        assert_eq!(viewport.map().sequence(), Some(2));

        // Late delivery of the first transaction
        let dashboard = viewport.dashboard();
        let store = dashboard.store();
        let geo = dashboard.geo();
        let event = BusEvent::Timeline { year: 2014 };
        let mut state = dashboard.view_state();
        state.active_year = 2014;
        let ctx = UpdateContext {
            trigger: Some(&event),
            view_state: state,
            sequence: 1,
            step: dashboard.active_step(),
            store: &store,
            geo: &geo,
        };
        hv_core::ViewSubscriber::on_update(viewport.map(), &ctx);

        assert_eq!(viewport.map().discarded_count(), 1);
        assert_eq!(viewport.map().frame().unwrap().year, 2013);
        assert_eq!(viewport.map().rendered_count(), 3);
    }
}
