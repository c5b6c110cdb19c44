//! Linked view abstraction - base trait for every view on the dashboard

use std::fmt::Debug;
use serde::Serialize;
use uuid::Uuid;

use hv_core::{Step, UpdateContext};

/// Unique identifier for a view
pub type ViewId = Uuid;

/// A projection of the shared record store.
///
/// Views never mutate the store. They turn a settled update into a frame
/// that a renderer can draw, and they hand user gestures back to the
/// dashboard as bus events.
pub trait LinkedView: Send + 'static {
    /// Renderer-agnostic output of one render pass
    type Frame: Clone + Debug + Serialize + Send;

    /// Get the unique ID of this view
    fn id(&self) -> ViewId;

    /// Get the display name
    fn display_name(&self) -> &str;

    /// Get the view type (for serialization)
    fn view_type(&self) -> &str;

    /// Build a frame from the settled store and view state
    fn render(&mut self, ctx: &UpdateContext<'_>) -> Self::Frame;

    /// The narrative moved to another step
    fn on_step(&mut self, _index: usize, _step: &Step) {}

    /// The active year changed
    fn on_year_change(&mut self, _year: i32) {}
}
