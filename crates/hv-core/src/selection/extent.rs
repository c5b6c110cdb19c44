use serde::Serialize;

/// Closed value range of an attribute over a set of records
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    /// Extent of the present values; `None` when every value is missing
    pub fn of<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        values
            .into_iter()
            .flatten()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<Extent>, v| match acc {
                None => Some(Extent { min: v, max: v }),
                Some(e) => Some(Extent {
                    min: e.min.min(v),
                    max: e.max.max(v),
                }),
            })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// True when min and max coincide
    pub fn is_degenerate(&self) -> bool {
        self.span() <= f64::EPSILON
    }

    /// Position of `value` in the range, in `[0, 1]`. A degenerate range maps to 1.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return 1.0;
        }
        ((value - self.min) / self.span()).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_ignores_missing() {
        let extent = Extent::of([Some(2.8), None, Some(7.8), Some(6.6)]).unwrap();
        assert_eq!(extent, Extent { min: 2.8, max: 7.8 });
        assert!(Extent::of([None, None]).is_none());
        assert!(Extent::of(Vec::new()).is_none());
    }

    #[test]
    fn test_degenerate_normalize_is_finite() {
        let extent = Extent::of([Some(5.0), Some(5.0)]).unwrap();
        assert!(extent.is_degenerate());
        assert_eq!(extent.normalize(5.0), 1.0);

        let extent = Extent { min: 0.0, max: 10.0 };
        assert_eq!(extent.normalize(2.5), 0.25);
        assert_eq!(extent.normalize(-1.0), 0.0);
    }
}
