//! Bus subscription for linked views

use parking_lot::Mutex;
use tracing::debug;

use hv_core::{UpdateContext, ViewState, ViewSubscriber};

use crate::{LinkedView, ViewId};

struct AdapterState<V: LinkedView> {
    view: V,
    frame: Option<V::Frame>,
    sequence: Option<u64>,
    last_state: Option<ViewState>,
    rendered: usize,
    discarded: usize,
}

/// Subscribes a [`LinkedView`] to the dashboard and keeps its latest frame.
///
/// Updates carrying a sequence number older than the last rendered one are
/// dropped, so a slow delivery never overwrites a newer frame.
pub struct ViewAdapter<V: LinkedView> {
    id: ViewId,
    name: String,
    state: Mutex<AdapterState<V>>,
}

impl<V: LinkedView> ViewAdapter<V> {
    pub fn new(view: V) -> Self {
        Self {
            id: view.id(),
            name: view.display_name().to_string(),
            state: Mutex::new(AdapterState {
                view,
                frame: None,
                sequence: None,
                last_state: None,
                rendered: 0,
                discarded: 0,
            }),
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    /// The most recent frame, if the view has rendered at all
    pub fn frame(&self) -> Option<V::Frame> {
        self.state.lock().frame.clone()
    }

    /// Sequence number of the most recent frame
    pub fn sequence(&self) -> Option<u64> {
        self.state.lock().sequence
    }

    pub fn rendered_count(&self) -> usize {
        self.state.lock().rendered
    }

    pub fn discarded_count(&self) -> usize {
        self.state.lock().discarded
    }

    /// Run `f` against the wrapped view
    pub fn with_view<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        f(&self.state.lock().view)
    }
}

impl<V: LinkedView> ViewSubscriber for ViewAdapter<V> {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_update(&self, ctx: &UpdateContext<'_>) {
        let mut state = self.state.lock();

        if let Some(last) = state.sequence {
            if ctx.sequence < last {
                debug!("{}: dropping stale update {} (have {})", self.name, ctx.sequence, last);
                state.discarded += 1;
                return;
            }
        }

        let previous = state.last_state;
        if previous.map_or(true, |p| p.active_step_index != ctx.view_state.active_step_index) {
            state.view.on_step(ctx.view_state.active_step_index, ctx.step);
        }
        if previous.map_or(true, |p| p.active_year != ctx.view_state.active_year) {
            state.view.on_year_change(ctx.view_state.active_year);
        }

        let frame = state.view.render(ctx);
        state.frame = Some(frame);
        state.sequence = Some(ctx.sequence);
        state.last_state = Some(ctx.view_state);
        state.rendered += 1;
    }
}
