//! Symmetric confidence band around a point estimate.
//!
//! The band half-width is a fixed constant calibrated offline against the
//! model's residual distribution; it is configuration, never recomputed at
//! request time.

use derive_more::Display;
use serde::Serialize;
use thiserror::Error;

/// Offline-calibrated band half-width, in currency units.
pub const DEFAULT_MARGIN: f64 = 26_101.587_770_846_49;

/// Rejected interval configuration.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum IntervalError {
    /// Margin must be finite and strictly positive
    #[error("margin must be finite and positive, got {0}")]
    InvalidMargin(f64),
}

/// A point estimate with its symmetric confidence band.
///
/// Bounds are exact (`point ∓ margin`); rounding to whole currency units is
/// a display concern and happens in the output layer only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Display)]
#[serde(rename_all = "camelCase")]
#[display("{lower_bound:.0}..{upper_bound:.0} (point {point_estimate:.2})")]
pub struct PredictionResult {
    /// Raw model output, unrounded.
    pub point_estimate: f64,
    /// `point_estimate - margin`.
    pub lower_bound: f64,
    /// `point_estimate + margin`.
    pub upper_bound: f64,
}

impl PredictionResult {
    /// The band half-width this result was built with.
    pub const fn margin(&self) -> f64 {
        self.upper_bound - self.point_estimate
    }
}

/// Applies the fixed margin to point estimates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalEstimator {
    margin: f64,
}

impl IntervalEstimator {
    /// Create an estimator with the given band half-width.
    pub fn new(margin: f64) -> Result<Self, IntervalError> {
        if !margin.is_finite() || margin <= 0.0 {
            return Err(IntervalError::InvalidMargin(margin));
        }
        Ok(Self { margin })
    }

    /// The configured band half-width.
    pub const fn margin(&self) -> f64 {
        self.margin
    }

    /// Wrap a point estimate in its symmetric band.
    pub const fn estimate(&self, point_estimate: f64) -> PredictionResult {
        PredictionResult {
            point_estimate,
            lower_bound: point_estimate - self.margin,
            upper_bound: point_estimate + self.margin,
        }
    }
}

impl Default for IntervalEstimator {
    fn default() -> Self {
        Self { margin: DEFAULT_MARGIN }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_band_is_symmetric() {
        let estimator = IntervalEstimator::default();
        let result = estimator.estimate(480_000.0);

        assert!(result.lower_bound < result.point_estimate);
        assert!(result.point_estimate < result.upper_bound);
        assert_relative_eq!(
            result.upper_bound - result.point_estimate,
            result.point_estimate - result.lower_bound
        );
        assert_relative_eq!(result.margin(), DEFAULT_MARGIN);
    }

    #[test]
    fn test_default_margin_value() {
        assert_relative_eq!(DEFAULT_MARGIN, 26_101.587_770_846_49);
    }

    #[test]
    fn test_custom_margin() {
        let estimator = IntervalEstimator::new(10_000.0).unwrap();
        let result = estimator.estimate(500_000.0);
        assert_relative_eq!(result.lower_bound, 490_000.0);
        assert_relative_eq!(result.upper_bound, 510_000.0);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-5.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn test_rejects_bad_margin(#[case] margin: f64) {
        assert!(IntervalEstimator::new(margin).is_err());
    }

    #[test]
    fn test_serializes_camel_case() {
        let result = IntervalEstimator::default().estimate(480_000.0);
        let json = serde_json::to_value(result).unwrap();
        assert!(json.get("pointEstimate").is_some());
        assert!(json.get("lowerBound").is_some());
        assert!(json.get("upperBound").is_some());
    }
}
