//! Transaction coordinator for the linked views.
//!
//! Every user action enters through [`Dashboard::publish`] (or one of the
//! helpers built on it). A transaction mutates the store and the geo-join
//! under write locks, resolves the displayed flags, releases the locks and
//! only then fans out to subscribers, so no view ever observes a partially
//! applied event.

use std::sync::Arc;
use parking_lot::{Mutex, RwLock, RwLockReadGuard};

use crate::events::{BusEvent, DispatchGuard, EventBus, UpdateContext, ViewSubscriber};
use crate::geo::{AliasAmbiguity, GeoJoin};
use crate::geo::normalize;
use crate::record::RecordStore;
use crate::selection::SelectionEngine;
use crate::state::ViewState;
use crate::steps::{Step, StepRegistry};
use crate::CoreError;

/// What happened to one published event
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionReport {
    /// Sequence number of the settled transaction; `None` if it was queued or rejected
    pub sequence: Option<u64>,
    pub view_state: ViewState,
    /// Conditions recovered locally while applying the event
    pub recovered: Vec<CoreError>,
    /// The event was queued behind a running transaction
    pub deferred: bool,
}

impl TransactionReport {
    pub fn is_clean(&self) -> bool {
        self.recovered.is_empty()
    }
}

/// Shared state of the linked views: record store, geo-join, selection
/// engine, step registry and event bus
#[derive(Clone)]
pub struct Dashboard {
    store: Arc<RwLock<RecordStore>>,
    geo: Arc<RwLock<GeoJoin>>,
    engine: Arc<Mutex<SelectionEngine>>,
    registry: Arc<StepRegistry>,
    bus: Arc<EventBus>,
    startup: Arc<Vec<CoreError>>,
}

impl Dashboard {
    /// Create the dashboard and settle the initial year and step
    pub fn new(
        store: RecordStore,
        geo: GeoJoin,
        registry: StepRegistry,
        initial: ViewState,
    ) -> Result<Self, CoreError> {
        let step = registry.get(initial.active_step_index)?.clone();

        let mut recovered = Vec::new();
        for ambiguity in geo.aliases().ambiguities() {
            let message = match ambiguity {
                AliasAmbiguity::RepeatedBoundary { boundary, winner } => {
                    format!("'{}' declared more than once, resolves to '{}'", boundary, winner)
                }
                AliasAmbiguity::SharedCanonical { canonical, boundaries } => {
                    format!("'{}' targeted by {}", canonical, boundaries.join(", "))
                }
            };
            tracing::warn!("Alias table v{}: {}", geo.aliases().version, message);
            recovered.push(CoreError::AliasAmbiguity(message));
        }

        let dashboard = Self {
            store: Arc::new(RwLock::new(store)),
            geo: Arc::new(RwLock::new(geo)),
            engine: Arc::new(Mutex::new(SelectionEngine::new(initial))),
            registry: Arc::new(registry),
            bus: Arc::new(EventBus::new()),
            startup: Arc::new(Vec::new()),
        };

        {
            let mut engine = dashboard.engine.lock();
            let mut store = dashboard.store.write();
            let mut geo = dashboard.geo.write();
            Self::settle_year(&mut engine, &mut store, &mut geo, &step, initial.active_year, &mut recovered);
        }

        tracing::info!(
            "Dashboard ready: {} records, {} boundaries, year {}, step '{}'",
            dashboard.store.read().len(),
            dashboard.geo.read().entities().len(),
            initial.active_year,
            step.label
        );

        Ok(Self {
            startup: Arc::new(recovered),
            ..dashboard
        })
    }

    /// Conditions recovered while building the dashboard
    pub fn startup_diagnostics(&self) -> &[CoreError] {
        &self.startup
    }

    pub fn subscribe(&self, subscriber: Arc<dyn ViewSubscriber>) {
        self.bus.subscribe(subscriber);
    }

    pub fn subscriber_count(&self) -> usize {
        self.bus.subscriber_count()
    }

    /// A copy of the current view state
    pub fn view_state(&self) -> ViewState {
        self.engine.lock().view_state()
    }

    pub fn sequence(&self) -> u64 {
        self.engine.lock().sequence()
    }

    /// Read access to the record store. Do not hold it across a publish.
    pub fn store(&self) -> RwLockReadGuard<'_, RecordStore> {
        self.store.read()
    }

    /// Read access to the boundary entities. Do not hold it across a publish.
    pub fn geo(&self) -> RwLockReadGuard<'_, GeoJoin> {
        self.geo.read()
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn active_step(&self) -> &Step {
        let index = self.view_state().active_step_index;
        &self.registry.steps()[index]
    }

    /// Publish an event and run it as one transaction.
    ///
    /// If a transaction is already fanning out, the event is queued and
    /// runs right after it; the returned report is then marked deferred.
    pub fn publish(&self, event: BusEvent) -> TransactionReport {
        let Some(event) = self.bus.begin_or_enqueue(event) else {
            return TransactionReport {
                sequence: None,
                view_state: self.view_state(),
                recovered: Vec::new(),
                deferred: true,
            };
        };
        let _guard = DispatchGuard::new(&self.bus);

        let report = self.run_transaction(&event);

        while let Some(queued) = self.bus.next_or_finish() {
            let queued_report = self.run_transaction(&queued);
            if !queued_report.is_clean() {
                tracing::debug!("Queued '{}' recovered: {:?}", queued.channel().name(), queued_report.recovered);
            }
        }

        report
    }

    /// Move the narrative to step `index`
    pub fn go_to_step(&self, index: usize) -> Result<TransactionReport, CoreError> {
        if let Err(err) = self.registry.get(index) {
            tracing::warn!("Rejected step change: {}", err);
            return Err(err);
        }
        Ok(self.publish(BusEvent::AttributeHighlighted { step_index: index }))
    }

    pub fn set_year(&self, year: i32) -> TransactionReport {
        self.publish(BusEvent::Timeline { year })
    }

    pub fn select_countries<I, S>(&self, names: I) -> TransactionReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.publish(BusEvent::CountrySelected {
            names: names.into_iter().map(Into::into).collect(),
        })
    }

    pub fn clear(&self) -> TransactionReport {
        self.publish(BusEvent::Clear)
    }

    /// Resolve a search query to known country names, case-insensitively.
    ///
    /// An exact match wins; otherwise a unique prefix match is accepted.
    pub fn resolve_search(&self, query: &str) -> Vec<String> {
        let query = normalize(query);
        if query.is_empty() {
            return Vec::new();
        }

        let store = self.store.read();
        if let Some(exact) = store.country_names().find(|c| normalize(c) == query) {
            return vec![exact.to_string()];
        }

        let prefixed: Vec<String> = store
            .country_names()
            .filter(|c| normalize(c).starts_with(&query))
            .map(str::to_string)
            .collect();
        if prefixed.len() == 1 {
            prefixed
        } else {
            Vec::new()
        }
    }

    /// Submit a search; publishes the resolved names as a selection
    pub fn search(&self, query: &str) -> TransactionReport {
        let names = self.resolve_search(query);
        if names.is_empty() {
            tracing::warn!("Search '{}' matched no country", query);
            return TransactionReport {
                sequence: None,
                view_state: self.view_state(),
                recovered: vec![CoreError::CountryNotFound {
                    name: query.to_string(),
                }],
                deferred: false,
            };
        }
        self.select_countries(names)
    }

    /// Re-deliver the current state to every subscriber without mutating anything
    pub fn refresh(&self) {
        if !self.bus.begin() {
            tracing::debug!("Refresh skipped, a transaction is running");
            return;
        }
        let _guard = DispatchGuard::new(&self.bus);
        self.fan_out(None);
        while let Some(queued) = self.bus.next_or_finish() {
            self.run_transaction(&queued);
        }
    }

    fn run_transaction(&self, event: &BusEvent) -> TransactionReport {
        let (applied, recovered) = self.apply(event);
        for err in &recovered {
            tracing::debug!("Recovered on '{}': {}", event.channel().name(), err);
        }

        if !applied {
            return TransactionReport {
                sequence: None,
                view_state: self.view_state(),
                recovered,
                deferred: false,
            };
        }

        let sequence = self.engine.lock().next_sequence();
        self.fan_out(Some(event));

        TransactionReport {
            sequence: Some(sequence),
            view_state: self.view_state(),
            recovered,
            deferred: false,
        }
    }

    /// Mutate store, geo-join and engine for one event. Returns whether the
    /// event was applied, and the conditions recovered along the way.
    fn apply(&self, event: &BusEvent) -> (bool, Vec<CoreError>) {
        let mut recovered = Vec::new();
        let mut engine = self.engine.lock();
        let mut store = self.store.write();
        let mut geo = self.geo.write();
        let state = engine.view_state();

        match event {
            BusEvent::Timeline { year } => {
                let step = &self.registry.steps()[state.active_step_index];
                engine.set_active_year(*year);
                Self::settle_year(&mut engine, &mut store, &mut geo, step, *year, &mut recovered);
            }
            BusEvent::CountrySelected { names } => {
                for name in names {
                    let country = if store.contains_country(name) {
                        name.clone()
                    } else {
                        // Boundary names coming from the map resolve through the alias table
                        match geo.entity(name).and_then(|e| e.country()) {
                            Some(country) => country.to_string(),
                            None => name.clone(),
                        }
                    };
                    if let Err(err) = engine.toggle_user_selection(&mut store, &country) {
                        tracing::warn!("{}", err);
                        recovered.push(err);
                    }
                }
                geo.refresh_flags(&store, engine.view_state().selection_mode);
            }
            BusEvent::AttributeHighlighted { step_index } => {
                let step = match self.registry.get(*step_index) {
                    Ok(step) => step,
                    Err(err) => {
                        tracing::warn!("Rejected step change: {}", err);
                        recovered.push(err);
                        return (false, recovered);
                    }
                };
                engine.set_active_step(*step_index);
                if let Err(err) = engine.recompute_extremes(&mut store, step.attribute, state.active_year) {
                    tracing::debug!("{}", err);
                    recovered.push(err);
                }
                geo.refresh_flags(&store, engine.view_state().selection_mode);
            }
            BusEvent::Clear => {
                let step = &self.registry.steps()[state.active_step_index];
                if let Err(err) = engine.clear_selection(&mut store, step.attribute) {
                    tracing::debug!("{}", err);
                    recovered.push(err);
                }
                geo.refresh_flags(&store, engine.view_state().selection_mode);
            }
        }

        (true, recovered)
    }

    /// Full rejoin for `year` followed by the extremes of `step`
    fn settle_year(
        engine: &mut SelectionEngine,
        store: &mut RecordStore,
        geo: &mut GeoJoin,
        step: &Step,
        year: i32,
        recovered: &mut Vec<CoreError>,
    ) {
        let report = geo.rejoin(store, year);
        if !report.unmatched.is_empty() {
            recovered.push(CoreError::UnmatchedBoundaries {
                year,
                count: report.unmatched.len(),
            });
        }
        if !report.orphaned_records.is_empty() {
            tracing::debug!("Records without boundary in {}: {:?}", year, report.orphaned_records);
        }

        if let Err(err) = engine.recompute_extremes(store, step.attribute, year) {
            tracing::warn!("{}", err);
            recovered.push(err);
        }
        geo.refresh_flags(store, engine.view_state().selection_mode);
    }

    fn fan_out(&self, trigger: Option<&BusEvent>) {
        let (view_state, sequence) = {
            let engine = self.engine.lock();
            (engine.view_state(), engine.sequence())
        };
        let step = &self.registry.steps()[view_state.active_step_index];
        let store = self.store.read();
        let geo = self.geo.read();

        let ctx = UpdateContext {
            trigger,
            view_state,
            sequence,
            step,
            store: &store,
            geo: &geo,
        };
        self.bus.notify(&ctx);
    }
}
