use serde::{Deserialize, Serialize};

/// How the displayed flag is resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionMode {
    /// Highlight follows the extremes of the active attribute
    #[default]
    Browsing,
    /// Highlight follows the countries the user picked
    Explicit,
}

/// The process-wide view state. Views only ever receive copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub active_year: i32,
    pub active_step_index: usize,
    pub selection_mode: SelectionMode,
}

impl ViewState {
    pub fn new(active_year: i32, active_step_index: usize) -> Self {
        Self {
            active_year,
            active_step_index,
            selection_mode: SelectionMode::Browsing,
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(2013, 0)
    }
}
