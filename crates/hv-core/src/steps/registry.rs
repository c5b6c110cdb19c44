//! Ordered step list

use super::{ScrollDirection, Step};
use crate::record::AttributeKey;
use crate::CoreError;

/// Ordered list of steps; a step index selects the active attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRegistry {
    steps: Vec<Step>,
}

impl StepRegistry {
    /// Build from `(attribute, label)` pairs. An empty list falls back to the default steps.
    pub fn new(steps: Vec<Step>) -> Self {
        if steps.is_empty() {
            tracing::warn!("Empty step configuration, using default steps");
            return Self::default();
        }
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The step at `index`, or `InvalidStep` when out of range
    pub fn get(&self, index: usize) -> Result<&Step, CoreError> {
        self.steps.get(index).ok_or(CoreError::InvalidStep {
            index,
            len: self.steps.len(),
        })
    }

    /// First step showing `attribute`
    pub fn index_of(&self, attribute: AttributeKey) -> Option<usize> {
        self.steps.iter().position(|s| s.attribute == attribute)
    }

    /// Step to activate when the reader crosses waypoint `index`
    pub fn step_for_waypoint(&self, index: usize, direction: ScrollDirection) -> usize {
        let step = match direction {
            ScrollDirection::Down => index,
            ScrollDirection::Up => index.saturating_sub(1),
        };
        step.min(self.steps.len().saturating_sub(1))
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        let steps = [
            (AttributeKey::LifeLadder, "Life Ladder"),
            (AttributeKey::SocialSupport, "Social Support"),
            (AttributeKey::LogGdpPerCapita, "Log GDP per capita"),
            (AttributeKey::HealthyLifeExpectancy, "Healthy life expectancy at birth"),
            (AttributeKey::Freedom, "Freedom to make life choices"),
            (AttributeKey::PerceptionsOfCorruption, "Perceptions of corruption"),
            (AttributeKey::PositiveAffect, "Positive affect"),
            (AttributeKey::NegativeAffect, "Negative affect"),
            (AttributeKey::Generosity, "Generosity"),
        ];
        Self {
            steps: steps.into_iter().map(|(attr, label)| Step::new(attr, label)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_nine_steps() {
        let registry = StepRegistry::default();
        assert_eq!(registry.len(), 9);
        assert_eq!(registry.get(0).unwrap().attribute, AttributeKey::LifeLadder);
        assert_eq!(registry.get(8).unwrap().attribute, AttributeKey::Generosity);
        assert_eq!(registry.index_of(AttributeKey::PositiveAffect), Some(6));
    }

    #[test]
    fn test_out_of_range_step_rejected() {
        let registry = StepRegistry::default();
        let err = registry.get(9).unwrap_err();
        assert!(matches!(err, CoreError::InvalidStep { index: 9, len: 9 }));
    }

    #[test]
    fn test_waypoint_direction() {
        let registry = StepRegistry::default();
        assert_eq!(registry.step_for_waypoint(3, ScrollDirection::Down), 3);
        assert_eq!(registry.step_for_waypoint(3, ScrollDirection::Up), 2);
        assert_eq!(registry.step_for_waypoint(0, ScrollDirection::Up), 0);
        assert_eq!(registry.step_for_waypoint(42, ScrollDirection::Down), 8);
    }

    #[test]
    fn test_empty_configuration_uses_defaults() {
        assert_eq!(StepRegistry::new(Vec::new()), StepRegistry::default());
    }
}
