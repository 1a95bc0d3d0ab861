//! End-to-end prediction pipeline.
//!
//! Wires the three stages into a single synchronous call chain: validate
//! the raw query against the domain catalog, encode it into the model's
//! feature layout, score once, and wrap the point estimate in the fixed
//! margin. Stateless per request; the only process-wide state is the
//! loaded, read-only model handle, passed in explicitly at construction.
//!
//! There are no retries anywhere: every stage is deterministic given its
//! input, so retrying identical input cannot change the outcome.

use std::path::Path;
use std::sync::Arc;
use tanglin_data::{DomainCatalog, PropertyQuery, RawPropertyQuery, ValidationError};
use tanglin_model::{
    ArtifactError, Encoder, EncodingError, GbdtModel, IntervalError, IntervalEstimator,
    PredictionResult, ScalerMode, ScoringError, ScoringModel,
};
use thiserror::Error;

/// Pipeline construction failures. Fatal at startup, never per-request.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Model artifact failed to load or validate
    #[error("Model artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// Interval configuration rejected
    #[error("Interval configuration error: {0}")]
    Interval(#[from] IntervalError),
}

/// A prediction request failure, tagged with the stage that rejected it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    /// Raw input outside its declared domain
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Encoding failed (label unseen at training time)
    #[error("Encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    /// The scoring model failed
    #[error("Scoring failed: {0}")]
    Scoring(#[from] ScoringError),
}

impl PredictError {
    /// Stage name for the external `{stage, reason}` error contract.
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Encoding(_) => "encoding",
            Self::Scoring(_) => "scoring",
        }
    }
}

/// The assembled prediction pipeline.
///
/// Construct once per process (model load is the expensive part), then
/// share freely; `predict` takes `&self` and mutates nothing.
#[derive(Clone)]
pub struct Pipeline {
    catalog: DomainCatalog,
    encoder: Encoder,
    model: Arc<dyn ScoringModel>,
    interval: IntervalEstimator,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("model", &self.model.name())
            .field("margin", &self.interval.margin())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Assemble a pipeline from explicit parts.
    pub fn new(
        catalog: DomainCatalog,
        encoder: Encoder,
        model: Arc<dyn ScoringModel>,
        interval: IntervalEstimator,
    ) -> Self {
        Self {
            catalog,
            encoder,
            model,
            interval,
        }
    }

    /// Load a GBDT artifact and assemble the default pipeline around it.
    ///
    /// The encoder standardizes against the artifact's fitted scaler when
    /// one is present, and per-request (source parity) otherwise. The
    /// margin is [`tanglin_model::DEFAULT_MARGIN`].
    pub fn from_artifact_path<P: AsRef<Path>>(
        catalog: DomainCatalog,
        path: P,
    ) -> Result<Self, PipelineError> {
        let model = GbdtModel::load(path)?;
        let scaler = model
            .scaler()
            .copied()
            .map_or(ScalerMode::PerRequest, ScalerMode::Fitted);
        let encoder = Encoder::new(scaler, model.vocabulary().clone());
        Ok(Self::new(
            catalog,
            encoder,
            Arc::new(model),
            IntervalEstimator::default(),
        ))
    }

    /// Replace the interval margin.
    pub fn with_margin(mut self, margin: f64) -> Result<Self, PipelineError> {
        self.interval = IntervalEstimator::new(margin)?;
        Ok(self)
    }

    /// The domain catalog requests are validated against.
    pub const fn catalog(&self) -> &DomainCatalog {
        &self.catalog
    }

    /// Identifier of the loaded model.
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// The configured band half-width.
    pub const fn margin(&self) -> f64 {
        self.interval.margin()
    }

    /// Run the full pipeline on a raw query.
    ///
    /// Exactly one scoring call per invocation; identical input yields an
    /// identical result.
    pub fn predict(&self, raw: &RawPropertyQuery) -> Result<PredictionResult, PredictError> {
        let query = self.catalog.validate(raw)?;
        self.predict_validated(&query)
    }

    /// Run encoding and scoring on an already-validated query.
    pub fn predict_validated(
        &self,
        query: &PropertyQuery,
    ) -> Result<PredictionResult, PredictError> {
        let features = self.encoder.encode(query)?;
        let point = self.model.score(&features)?;
        Ok(self.interval.estimate(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tanglin_model::{DEFAULT_MARGIN, FeatureVector, ModelArtifact};

    /// Inline artifact whose vocabulary matches the reference catalog, with
    /// a small hand-checkable ensemble.
    fn artifact_json() -> String {
        let catalog = DomainCatalog::reference().unwrap();
        let towns = serde_json::to_string(catalog.towns()).unwrap();
        format!(
            r#"{{
                "metadata": {{ "name": "hdb-gbdt-test", "base_score": 420000.0 }},
                "vocabulary": {{
                    "flat_type": ["1 Room", "2 Room", "3 Room", "4 Room", "5 Room", "Executive", "Multi-Generation"],
                    "town": {towns},
                    "storey_range": ["01 To 03", "04 To 06", "07 To 09", "10 To 12",
                                     "13 To 15", "16 To 18", "19 To 21", "22 To 24",
                                     "25 To 27", "28 To 30", "31 To 33", "34 To 36",
                                     "37 To 39", "40 To 42", "43 To 45", "46 To 48",
                                     "49 To 51"]
                }},
                "trees": [
                    {{ "nodes": [
                        {{ "kind": "category_split", "feature": "flat_type",
                           "members": ["5 Room", "Executive", "Multi-Generation"],
                           "left": 1, "right": 2 }},
                        {{ "kind": "leaf", "value": 90000.0 }},
                        {{ "kind": "leaf", "value": -20000.0 }}
                    ] }},
                    {{ "nodes": [
                        {{ "kind": "numeric_split", "feature": "floor_area_sqm",
                           "threshold": -1.41, "left": 1, "right": 2 }},
                        {{ "kind": "leaf", "value": -15000.0 }},
                        {{ "kind": "leaf", "value": 30000.0 }}
                    ] }}
                ]
            }}"#
        )
    }

    fn pipeline() -> Pipeline {
        let artifact = ModelArtifact::from_json(&artifact_json()).unwrap();
        let model = GbdtModel::from_artifact(artifact);
        let encoder = Encoder::new(ScalerMode::PerRequest, model.vocabulary().clone());
        Pipeline::new(
            DomainCatalog::reference().unwrap(),
            encoder,
            Arc::new(model),
            IntervalEstimator::default(),
        )
    }

    fn sample_query() -> RawPropertyQuery {
        RawPropertyQuery {
            town: "Bedok".to_string(),
            flat_type: "4 Room".to_string(),
            storey_range: "04 To 06".to_string(),
            year_purchased: 2025,
            floor_area_sqm: 90.0,
            lease_commence_year: 2000,
        }
    }

    #[test]
    fn test_end_to_end_example() {
        let result = pipeline().predict(&sample_query()).unwrap();

        assert!(result.point_estimate.is_finite());
        assert!(result.lower_bound.is_finite());
        assert!(result.upper_bound.is_finite());
        assert!(result.lower_bound < result.point_estimate);
        assert!(result.point_estimate < result.upper_bound);
        assert_relative_eq!(
            result.upper_bound - result.point_estimate,
            result.point_estimate - result.lower_bound
        );
        assert_relative_eq!(result.margin(), DEFAULT_MARGIN);
    }

    #[test]
    fn test_end_to_end_pinned_value() {
        // 4 Room misses the first split (-20000). Standardized floor area
        // for (2025, 90, 2000) is -1.4141 <= -1.41, so the second tree goes
        // left (-15000). 420000 - 20000 - 15000 = 385000.
        let result = pipeline().predict(&sample_query()).unwrap();
        assert_relative_eq!(result.point_estimate, 385_000.0);
        assert_relative_eq!(result.lower_bound, 385_000.0 - DEFAULT_MARGIN);
        assert_relative_eq!(result.upper_bound, 385_000.0 + DEFAULT_MARGIN);
    }

    #[test]
    fn test_idempotence() {
        let pipeline = pipeline();
        let first = pipeline.predict(&sample_query()).unwrap();
        let second = pipeline.predict(&sample_query()).unwrap();
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_validation_stage_tagged() {
        let mut raw = sample_query();
        raw.town = "Atlantis".to_string();
        let err = pipeline().predict(&raw).unwrap_err();
        assert_eq!(err.stage(), "validation");
        match err {
            PredictError::Validation(inner) => assert_eq!(inner.field(), "town"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_rejected_before_encoding() {
        let mut raw = sample_query();
        raw.floor_area_sqm = 500.0;
        let err = pipeline().predict(&raw).unwrap_err();
        assert_eq!(err.stage(), "validation");
    }

    #[test]
    fn test_encoding_stage_tagged() {
        // Catalog accepts the town; the model's vocabulary does not list it.
        let artifact = ModelArtifact::from_json(&artifact_json()).unwrap();
        let model = GbdtModel::from_artifact(artifact);
        let narrow = tanglin_model::Vocabulary::new(
            vec!["4 Room".to_string()],
            vec!["Punggol".to_string()],
            vec!["04 To 06".to_string()],
        );
        let pipeline = Pipeline::new(
            DomainCatalog::reference().unwrap(),
            Encoder::new(ScalerMode::PerRequest, narrow),
            Arc::new(model),
            IntervalEstimator::default(),
        );
        let err = pipeline.predict(&sample_query()).unwrap_err();
        assert_eq!(err.stage(), "encoding");
    }

    /// External scoring backend that always fails, standing in for model
    /// families outside this crate.
    struct FailingModel;

    impl ScoringModel for FailingModel {
        fn name(&self) -> &str {
            "failing"
        }

        fn score(&self, _features: &FeatureVector) -> Result<f64, ScoringError> {
            Err(ScoringError::Model("backend unavailable".to_string()))
        }
    }

    #[test]
    fn test_scoring_stage_tagged() {
        let artifact = ModelArtifact::from_json(&artifact_json()).unwrap();
        let model = GbdtModel::from_artifact(artifact);
        let pipeline = Pipeline::new(
            DomainCatalog::reference().unwrap(),
            Encoder::new(ScalerMode::PerRequest, model.vocabulary().clone()),
            Arc::new(FailingModel),
            IntervalEstimator::default(),
        );
        let err = pipeline.predict(&sample_query()).unwrap_err();
        assert_eq!(err.stage(), "scoring");
        assert!(matches!(err, PredictError::Scoring(ScoringError::Model(_))));
    }

    #[test]
    fn test_predict_validated_matches_predict() {
        let pipeline = pipeline();
        let raw = sample_query();
        let query = pipeline.catalog().validate(&raw).unwrap();
        let via_raw = pipeline.predict(&raw).unwrap();
        let via_query = pipeline.predict_validated(&query).unwrap();
        assert_eq!(via_raw, via_query);
    }

    #[test]
    fn test_margin_override() {
        let pipeline = pipeline().with_margin(10_000.0).unwrap();
        let result = pipeline.predict(&sample_query()).unwrap();
        assert_relative_eq!(result.upper_bound - result.lower_bound, 20_000.0);
        assert!(pipeline.with_margin(-1.0).is_err());
    }

    #[test]
    fn test_boundary_floor_areas_accepted() {
        let pipeline = pipeline();
        for area in [0.0, 400.0] {
            let mut raw = sample_query();
            raw.floor_area_sqm = area;
            assert!(pipeline.predict(&raw).is_ok(), "area {area} rejected");
        }
    }
}
