//! Linked views for the happiness dashboard
//!
//! Every view turns the settled record store into a renderer-agnostic
//! frame. Drawing those frames is left to the embedding application.

mod adapter;
mod linked_view;
mod viewport;
pub mod plots;

pub use adapter::ViewAdapter;
pub use linked_view::{LinkedView, ViewId};
pub use viewport::{Viewport, ViewportFrames};
pub use plots::{
    GlyphFrame, GlyphView, MapFrame, MapView, RadarFrame, RadarView, RegionFill, ScatterFrame, ScatterView,
};
