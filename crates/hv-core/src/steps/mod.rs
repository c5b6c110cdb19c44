use serde::{Serialize, Deserialize};

use crate::record::AttributeKey;

mod registry;

pub use registry::StepRegistry;

/// One stop of the guided narrative: an indicator and its label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub attribute: AttributeKey,
    pub label: String,
}

impl Step {
    pub fn new(attribute: AttributeKey, label: impl Into<String>) -> Self {
        Self {
            attribute,
            label: label.into(),
        }
    }
}

/// Direction the reader scrolled past a waypoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollDirection {
    Down,
    Up,
}
