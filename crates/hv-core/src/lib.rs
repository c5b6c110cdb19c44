//! Core functionality for the linked happiness views
//!
//! This crate holds the shared record store, the year-scoped join against
//! boundary entities, the step registry, the selection engine and the event
//! bus that keeps every view consistent.

pub mod dashboard;
pub mod events;
pub mod geo;
pub mod record;
pub mod selection;
pub mod state;
pub mod steps;

use thiserror::Error;

// Re-export commonly used types
pub use dashboard::{Dashboard, TransactionReport};
pub use events::{BusEvent, Channel, EventBus, UpdateContext, ViewSubscriber};
pub use geo::{AliasEntry, AliasTable, BoundaryGeometry, GeoEntity, GeoJoin};
pub use record::{AttributeKey, Coordinates, DerivedFlags, Indicators, Record, RecordStore};
pub use selection::{Extent, SelectionEngine};
pub use state::{SelectionMode, ViewState};
pub use steps::{ScrollDirection, Step, StepRegistry};
pub use data::{BoundarySource, RecordSource};

/// Conditions raised by the core.
///
/// Apart from `DuplicateRecord`, these are recovered where they occur and
/// reported in a [`TransactionReport`]; none of them crosses the bus.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Country '{name}' not found")]
    CountryNotFound { name: String },

    #[error("Step index {index} out of range (0..{len})")]
    InvalidStep { index: usize, len: usize },

    #[error("No records for year {year}")]
    EmptyYear { year: i32 },

    #[error("No values of '{attribute}' for year {year}")]
    DegenerateExtent { attribute: AttributeKey, year: i32 },

    #[error("{count} boundary entities without a record for {year}")]
    UnmatchedBoundaries { year: i32, count: usize },

    #[error("Ambiguous alias: {0}")]
    AliasAmbiguity(String),

    #[error("Duplicate record for '{country}' in {year}")]
    DuplicateRecord { country: String, year: i32 },
}

/// Contracts for the parsing collaborators
pub mod data {
    use crate::geo::GeoEntity;
    use crate::record::Record;

    /// Source of typed country/year records
    #[async_trait::async_trait]
    pub trait RecordSource: Send + Sync {
        /// Load every record, numbers already parsed
        async fn load_records(&self) -> anyhow::Result<Vec<Record>>;

        /// Get the source name/path
        fn source_name(&self) -> &str;
    }

    /// Source of decoded boundary entities
    #[async_trait::async_trait]
    pub trait BoundarySource: Send + Sync {
        async fn load_entities(&self) -> anyhow::Result<Vec<GeoEntity>>;

        fn source_name(&self) -> &str;
    }
}
