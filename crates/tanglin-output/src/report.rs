//! Human-readable prediction reports.
//!
//! Rounding to whole currency units happens here and nowhere else; the
//! stored [`PredictionResult`] keeps exact bounds so the band symmetry
//! invariant survives serialization.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tanglin_data::PropertyQuery;
use tanglin_model::PredictionResult;

/// Format a currency amount as whole units with thousands separators.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round() as i64;
    let negative = rounded < 0;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i).is_multiple_of(3) {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// A completed prediction, packaged for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    /// The validated query the prediction was made for.
    pub query: PropertyQuery,
    /// The prediction with exact bounds.
    pub result: PredictionResult,
    /// Identifier of the model that produced the estimate.
    pub model_name: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
}

impl PredictionReport {
    /// Package a prediction, stamped with the current time.
    pub fn new(query: PropertyQuery, result: PredictionResult, model_name: String) -> Self {
        Self {
            query,
            result,
            model_name,
            generated_at: Utc::now(),
        }
    }
}

impl fmt::Display for PredictionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Predicted resale price")?;
        writeln!(
            f,
            "  {} | {} | storeys {} | {} sqm | purchased {} | lease from {}",
            self.query.town(),
            self.query.flat_type(),
            self.query.storey_range(),
            self.query.floor_area_sqm(),
            self.query.year_purchased(),
            self.query.lease_commence_year(),
        )?;
        writeln!(
            f,
            "  Approximately between S${} and S${}",
            format_currency(self.result.lower_bound),
            format_currency(self.result.upper_bound),
        )?;
        write!(
            f,
            "  Point estimate S${} (model: {})",
            format_currency(self.result.point_estimate),
            self.model_name,
        )
    }
}
