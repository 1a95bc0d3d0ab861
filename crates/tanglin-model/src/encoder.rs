//! Feature encoding: raw property attributes to the model's input layout.
//!
//! The scoring model was trained on three standardized numeric columns
//! (`year`, `floor_area_sqm`, `lease_commence_date`) and three categorical
//! text columns (`flat_type`, `town`, `storey_range`) handled internally by
//! the booster. The encoder reproduces that representation exactly.
//!
//! Numeric standardization supports two modes. [`ScalerMode::PerRequest`]
//! reproduces the deployed system's behavior: mean and standard deviation
//! are computed from the single request's three numeric values, so the
//! encoded numerics form roughly the same pattern whatever the magnitudes.
//! That is statistically unsound but required for parity with the model as
//! it was calibrated. [`ScalerMode::Fitted`] normalizes against per-feature
//! training-time moments supplied as configuration instead.

use crate::scoring::artifact::Vocabulary;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tanglin_data::PropertyQuery;

/// Numeric model features, in training column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericFeature {
    /// Purchase year (`year`).
    Year,
    /// Floor area in square metres (`floor_area_sqm`).
    FloorAreaSqm,
    /// Lease commencement year (`lease_commence_date`).
    LeaseCommenceDate,
}

/// Categorical model features, in training column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalFeature {
    /// Unit category (`flat_type`).
    FlatType,
    /// Region name (`town`).
    Town,
    /// Floor band (`storey_range`).
    StoreyRange,
}

/// Encoding failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodingError {
    /// A label was never seen by the model during training.
    #[error("{feature}: label {value:?} not in training vocabulary")]
    UnknownCategory {
        /// Training column name of the offending feature.
        feature: &'static str,
        /// The rejected label.
        value: String,
    },
}

/// Mean and standard deviation for one numeric feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureMoments {
    /// Training-time mean.
    pub mean: f64,
    /// Training-time standard deviation.
    pub std: f64,
}

/// Training-time moments for all three numeric features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerStats {
    /// Moments of the `year` column.
    pub year: FeatureMoments,
    /// Moments of the `floor_area_sqm` column.
    pub floor_area_sqm: FeatureMoments,
    /// Moments of the `lease_commence_date` column.
    pub lease_commence_date: FeatureMoments,
}

/// How the numeric features are standardized.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScalerMode {
    /// Source parity: standardize against the mean and population standard
    /// deviation of the request's own three numeric values.
    #[default]
    PerRequest,
    /// Standardize each feature against training-time moments.
    Fitted(ScalerStats),
}

/// The exact representation consumed by the scoring model.
///
/// Ephemeral; produced per request and discarded after scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    /// Standardized purchase year.
    pub year: f64,
    /// Standardized floor area.
    pub floor_area_sqm: f64,
    /// Standardized lease commencement year.
    pub lease_commence_date: f64,
    /// Flat-type label, verbatim.
    pub flat_type: String,
    /// Town label, verbatim.
    pub town: String,
    /// Storey-band label, verbatim.
    pub storey_range: String,
}

impl FeatureVector {
    /// Value of a numeric feature.
    pub const fn numeric(&self, feature: NumericFeature) -> f64 {
        match feature {
            NumericFeature::Year => self.year,
            NumericFeature::FloorAreaSqm => self.floor_area_sqm,
            NumericFeature::LeaseCommenceDate => self.lease_commence_date,
        }
    }

    /// Label of a categorical feature.
    pub fn categorical(&self, feature: CategoricalFeature) -> &str {
        match feature {
            CategoricalFeature::FlatType => &self.flat_type,
            CategoricalFeature::Town => &self.town,
            CategoricalFeature::StoreyRange => &self.storey_range,
        }
    }
}

/// Encodes validated queries into the model's feature layout.
#[derive(Debug, Clone)]
pub struct Encoder {
    scaler: ScalerMode,
    vocabulary: Vocabulary,
}

impl Encoder {
    /// Create an encoder with the given scaler mode and training vocabulary.
    pub const fn new(scaler: ScalerMode, vocabulary: Vocabulary) -> Self {
        Self { scaler, vocabulary }
    }

    /// The configured scaler mode.
    pub const fn scaler(&self) -> &ScalerMode {
        &self.scaler
    }

    /// Encode a validated query.
    ///
    /// Labels pass through verbatim after a vocabulary check; numerics are
    /// standardized according to the scaler mode.
    pub fn encode(&self, query: &PropertyQuery) -> Result<FeatureVector, EncodingError> {
        for (feature, name, value) in [
            (CategoricalFeature::FlatType, "flat_type", query.flat_type()),
            (CategoricalFeature::Town, "town", query.town()),
            (
                CategoricalFeature::StoreyRange,
                "storey_range",
                query.storey_range(),
            ),
        ] {
            if !self.vocabulary.contains(feature, value) {
                return Err(EncodingError::UnknownCategory {
                    feature: name,
                    value: value.to_string(),
                });
            }
        }

        let raw = [
            f64::from(query.year_purchased()),
            query.floor_area_sqm(),
            f64::from(query.lease_commence_year()),
        ];
        let [year, floor_area_sqm, lease_commence_date] = match &self.scaler {
            ScalerMode::PerRequest => standardize_per_request(raw),
            ScalerMode::Fitted(stats) => [
                standardize(raw[0], stats.year),
                standardize(raw[1], stats.floor_area_sqm),
                standardize(raw[2], stats.lease_commence_date),
            ],
        };

        Ok(FeatureVector {
            year,
            floor_area_sqm,
            lease_commence_date,
            flat_type: query.flat_type().to_string(),
            town: query.town().to_string(),
            storey_range: query.storey_range().to_string(),
        })
    }
}

fn standardize(value: f64, moments: FeatureMoments) -> f64 {
    if moments.std > 0.0 {
        (value - moments.mean) / moments.std
    } else {
        0.0
    }
}

/// Standardize three values against their own mean and population standard
/// deviation. Zero spread degenerates to all zeros.
fn standardize_per_request(values: [f64; 3]) -> [f64; 3] {
    let mean = values.iter().sum::<f64>() / 3.0;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 3.0;
    let std = variance.sqrt();
    if std == 0.0 {
        return [0.0; 3];
    }
    values.map(|v| (v - mean) / std)
}
