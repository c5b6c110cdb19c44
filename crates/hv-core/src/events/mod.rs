use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::geo::GeoJoin;
use crate::record::RecordStore;
use crate::state::ViewState;
use crate::steps::Step;

/// The fixed set of bus channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Timeline,
    CountrySelected,
    AttributeHighlighted,
    Clear,
}

impl Channel {
    pub fn name(self) -> &'static str {
        match self {
            Channel::Timeline => "timeline",
            Channel::CountrySelected => "countrySelected",
            Channel::AttributeHighlighted => "attributeHighlighted",
            Channel::Clear => "clear",
        }
    }
}

/// An event published on the bus. Each channel has exactly one payload shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusEvent {
    /// The year control moved
    Timeline { year: i32 },
    /// A map region, scatter point or search submission picked countries
    CountrySelected { names: Vec<String> },
    /// The narrative moved to another step
    AttributeHighlighted { step_index: usize },
    /// The clear control was pressed
    Clear,
}

impl BusEvent {
    pub fn channel(&self) -> Channel {
        match self {
            BusEvent::Timeline { .. } => Channel::Timeline,
            BusEvent::CountrySelected { .. } => Channel::CountrySelected,
            BusEvent::AttributeHighlighted { .. } => Channel::AttributeHighlighted,
            BusEvent::Clear => Channel::Clear,
        }
    }
}

/// Everything a subscriber may read once a transaction has settled
pub struct UpdateContext<'a> {
    /// The event that caused this update; `None` for a plain refresh
    pub trigger: Option<&'a BusEvent>,
    pub view_state: ViewState,
    /// Sequence number of the settled transaction
    pub sequence: u64,
    pub step: &'a Step,
    pub store: &'a RecordStore,
    pub geo: &'a GeoJoin,
}

/// Trait for views that re-render after every settled transaction
pub trait ViewSubscriber: Send + Sync {
    fn name(&self) -> &str;

    /// Called once per transaction, after all mutation has completed
    fn on_update(&self, ctx: &UpdateContext<'_>);
}

#[derive(Default)]
struct DispatchState {
    dispatching: bool,
    pending: VecDeque<BusEvent>,
}

/// Subscriber list plus the bookkeeping that keeps transactions serialized.
///
/// Events published while a fan-out is running are queued and handed back
/// to the dispatcher once the current transaction is finished.
pub struct EventBus {
    subscribers: RwLock<Vec<Weak<dyn ViewSubscriber>>>,
    dispatch: Mutex<DispatchState>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            dispatch: Mutex::new(DispatchState::default()),
        }
    }

    /// Add a subscriber. Only a weak reference is kept; dropped views are pruned.
    pub fn subscribe(&self, subscriber: Arc<dyn ViewSubscriber>) {
        tracing::debug!("View '{}' subscribed", subscriber.name());
        self.subscribers.write().push(Arc::downgrade(&subscriber));
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().iter().filter(|w| w.strong_count() > 0).count()
    }

    /// Become the dispatcher for `event`, or queue it if a transaction is running
    pub(crate) fn begin_or_enqueue(&self, event: BusEvent) -> Option<BusEvent> {
        let mut dispatch = self.dispatch.lock();
        if dispatch.dispatching {
            tracing::debug!("Queued '{}' behind the running transaction", event.channel().name());
            dispatch.pending.push_back(event);
            None
        } else {
            dispatch.dispatching = true;
            Some(event)
        }
    }

    /// Become the dispatcher for a refresh; false if a transaction is running
    pub(crate) fn begin(&self) -> bool {
        let mut dispatch = self.dispatch.lock();
        if dispatch.dispatching {
            false
        } else {
            dispatch.dispatching = true;
            true
        }
    }

    /// Next queued event, or release the dispatcher role when the queue is empty
    pub(crate) fn next_or_finish(&self) -> Option<BusEvent> {
        let mut dispatch = self.dispatch.lock();
        let next = dispatch.pending.pop_front();
        if next.is_none() {
            dispatch.dispatching = false;
        }
        next
    }

    /// Drop the dispatcher role and anything queued behind it
    pub(crate) fn abandon(&self) {
        let mut dispatch = self.dispatch.lock();
        if !dispatch.pending.is_empty() {
            tracing::warn!("Dropping {} queued events after an aborted transaction", dispatch.pending.len());
        }
        dispatch.pending.clear();
        dispatch.dispatching = false;
    }

    /// Deliver a settled update to every live subscriber, in subscription order.
    ///
    /// A subscriber that panics is logged and skipped; the others still run.
    pub(crate) fn notify(&self, ctx: &UpdateContext<'_>) {
        let live: Vec<Arc<dyn ViewSubscriber>> = {
            let mut subscribers = self.subscribers.write();
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };

        for subscriber in live {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| subscriber.on_update(ctx))) {
                tracing::error!(
                    "View '{}' failed on update #{}: {}",
                    subscriber.name(),
                    ctx.sequence,
                    panic_message(payload.as_ref())
                );
            }
        }
    }
}

/// Releases the dispatcher role if a transaction unwinds
pub(crate) struct DispatchGuard<'a> {
    bus: &'a EventBus,
}

impl<'a> DispatchGuard<'a> {
    pub(crate) fn new(bus: &'a EventBus) -> Self {
        Self { bus }
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.bus.abandon();
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
