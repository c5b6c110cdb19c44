//! Selection engine: extremal highlighting, user selection and the
//! displayed flag every view reads.
//!
//! The engine is the only writer of derived record flags. Every mutating
//! operation ends with [`SelectionEngine::resolve_display`], so the
//! displayed flag never lags behind the flags it is derived from.

mod extent;

pub use extent::Extent;

use crate::record::{AttributeKey, FlagPatch, Record, RecordStore};
use crate::state::{SelectionMode, ViewState};
use crate::CoreError;

/// The displayed flag as a pure function of the other flags and the mode
pub fn resolve_display_flag(is_max: bool, is_min: bool, is_user_selected: bool, mode: SelectionMode) -> bool {
    match mode {
        SelectionMode::Explicit => is_user_selected,
        SelectionMode::Browsing => is_max || is_min,
    }
}

/// Owns the view state and writes derived flags into the record store
#[derive(Debug, Clone)]
pub struct SelectionEngine {
    state: ViewState,
    sequence: u64,
}

impl SelectionEngine {
    pub fn new(state: ViewState) -> Self {
        Self { state, sequence: 0 }
    }

    /// A copy of the current view state
    pub fn view_state(&self) -> ViewState {
        self.state
    }

    pub(crate) fn set_active_year(&mut self, year: i32) {
        self.state.active_year = year;
    }

    pub(crate) fn set_active_step(&mut self, index: usize) {
        self.state.active_step_index = index;
    }

    /// Sequence number of the last settled transaction
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub(crate) fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Flag the records of `year` holding the min/max of `attribute`.
    ///
    /// Ties flag every record sharing the extremal value. Flags from any
    /// previous attribute or year are cleared first. When every value is
    /// missing nothing is flagged and the condition is returned as a
    /// recovered error; the flags are consistent either way.
    pub fn recompute_extremes(
        &mut self,
        store: &mut RecordStore,
        attribute: AttributeKey,
        year: i32,
    ) -> Result<Extent, CoreError> {
        store.upsert_derived_flags(|_| true, FlagPatch::extremes(false, false));

        let year_records = store.records_for_year(year);
        if year_records.is_empty() {
            self.resolve_display(store);
            return Err(CoreError::EmptyYear { year });
        }

        let Some(extent) = Extent::of(year_records.iter().map(|r| r.value(attribute))) else {
            self.resolve_display(store);
            return Err(CoreError::DegenerateExtent { attribute, year });
        };

        let in_year = |r: &Record, target: f64| r.year == year && r.value(attribute) == Some(target);
        let max_count = store.upsert_derived_flags(|r| in_year(r, extent.max), FlagPatch::extremes(true, false));

        // A single distinct value is reported as the maximum only
        let min_count = if extent.max == extent.min {
            0
        } else {
            store.upsert_derived_flags(
                |r| in_year(r, extent.min),
                FlagPatch {
                    is_indicator_min: Some(true),
                    ..FlagPatch::default()
                },
            )
        };

        tracing::debug!(
            "Extremes of {} in {}: max {} ({} records), min {} ({} records)",
            attribute,
            year,
            extent.max,
            max_count,
            extent.min,
            min_count
        );

        self.resolve_display(store);
        Ok(extent)
    }

    /// Flip the user selection of every record of `country`, across all years.
    ///
    /// Returns the new selection state of the country.
    pub fn toggle_user_selection(&mut self, store: &mut RecordStore, country: &str) -> Result<bool, CoreError> {
        if !store.contains_country(country) {
            return Err(CoreError::CountryNotFound {
                name: country.to_string(),
            });
        }

        let selected = !store.is_country_selected(country);
        store.upsert_derived_flags(|r| r.country_name == country, FlagPatch::user_selected(selected));
        self.resolve_display(store);

        tracing::debug!("Country '{}' selected: {}", country, selected);
        Ok(selected)
    }

    /// Drop every user selection and resume browsing-mode highlighting
    pub fn clear_selection(&mut self, store: &mut RecordStore, attribute: AttributeKey) -> Result<Extent, CoreError> {
        store.upsert_derived_flags(|_| true, FlagPatch::user_selected(false));
        self.state.selection_mode = SelectionMode::Browsing;
        self.recompute_extremes(store, attribute, self.state.active_year)
    }

    /// Recompute the selection mode and the displayed flag of every record
    pub fn resolve_display(&mut self, store: &mut RecordStore) {
        self.state.selection_mode = if store.any_user_selected() {
            SelectionMode::Explicit
        } else {
            SelectionMode::Browsing
        };

        let mode = self.state.selection_mode;
        store.upsert_derived_flags_with(|r| {
            let flags = r.flags();
            let displayed = resolve_display_flag(flags.is_indicator_max, flags.is_indicator_min, flags.is_user_selected, mode);
            (flags.is_displayed != displayed).then(|| FlagPatch::displayed(displayed))
        });
    }
}
