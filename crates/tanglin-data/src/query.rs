//! Property query types and input validation.
//!
//! A [`RawPropertyQuery`] is whatever the caller supplied (form, API
//! payload, CLI flags). Passing it through [`DomainCatalog::validate`]
//! yields an immutable [`PropertyQuery`] whose every field is known to be a
//! member of its domain; the prediction pipeline only ever sees the latter.

use crate::catalog::DomainCatalog;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw, unvalidated property attributes as supplied by a caller.
///
/// Field names follow the external camelCase contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPropertyQuery {
    /// Town (region) label, e.g. `"Bedok"`.
    pub town: String,
    /// Flat-type label, e.g. `"4 Room"`.
    pub flat_type: String,
    /// Storey-band label, e.g. `"04 To 06"`.
    pub storey_range: String,
    /// Year the transaction takes place.
    pub year_purchased: i32,
    /// Floor area in square metres.
    pub floor_area_sqm: f64,
    /// Year the lease commenced.
    pub lease_commence_year: i32,
}

/// A raw input rejected by the input contract.
///
/// Always names the offending field so the caller can surface a
/// `{field, reason}` error without parsing message text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A label field is not a member of its configured domain.
    #[error("{field}: unknown label {value:?}")]
    UnknownLabel {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected label.
        value: String,
    },

    /// A numeric field is outside its configured inclusive range.
    #[error("{field}: value {value} outside [{min}, {max}]")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// Smallest accepted value.
        min: f64,
        /// Largest accepted value.
        max: f64,
    },
}

impl ValidationError {
    /// Name of the field that failed validation.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::UnknownLabel { field, .. } | Self::OutOfRange { field, .. } => field,
        }
    }
}

/// A property query whose every field has passed the input contract.
///
/// Construction goes through [`DomainCatalog::validate`] only; the fields
/// are immutable thereafter. Cross-field consistency (lease year vs.
/// purchase year ordering) is deliberately not checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyQuery {
    town: String,
    flat_type: String,
    storey_range: String,
    year_purchased: i32,
    floor_area_sqm: f64,
    lease_commence_year: i32,
}

impl PropertyQuery {
    /// Town label.
    pub fn town(&self) -> &str {
        &self.town
    }

    /// Flat-type label.
    pub fn flat_type(&self) -> &str {
        &self.flat_type
    }

    /// Storey-band label.
    pub fn storey_range(&self) -> &str {
        &self.storey_range
    }

    /// Year of purchase.
    pub const fn year_purchased(&self) -> i32 {
        self.year_purchased
    }

    /// Floor area in square metres.
    pub const fn floor_area_sqm(&self) -> f64 {
        self.floor_area_sqm
    }

    /// Lease commencement year.
    pub const fn lease_commence_year(&self) -> i32 {
        self.lease_commence_year
    }
}

impl DomainCatalog {
    /// Validate a raw query against the catalog's domains.
    ///
    /// Label fields must be members of their configured sets; numeric
    /// fields must be finite and within their inclusive ranges. The first
    /// violation encountered is returned. No side effects.
    pub fn validate(&self, raw: &RawPropertyQuery) -> Result<PropertyQuery, ValidationError> {
        if !self.contains_town(&raw.town) {
            return Err(ValidationError::UnknownLabel {
                field: "town",
                value: raw.town.clone(),
            });
        }
        if !self.contains_flat_type(&raw.flat_type) {
            return Err(ValidationError::UnknownLabel {
                field: "flatType",
                value: raw.flat_type.clone(),
            });
        }
        if !self.contains_storey_range(&raw.storey_range) {
            return Err(ValidationError::UnknownLabel {
                field: "storeyRange",
                value: raw.storey_range.clone(),
            });
        }

        let year_range = self.year_purchased_range();
        if !year_range.contains(f64::from(raw.year_purchased)) {
            return Err(ValidationError::OutOfRange {
                field: "yearPurchased",
                value: f64::from(raw.year_purchased),
                min: year_range.min,
                max: year_range.max,
            });
        }
        let area_range = self.floor_area_range();
        if !area_range.contains(raw.floor_area_sqm) {
            return Err(ValidationError::OutOfRange {
                field: "floorAreaSqm",
                value: raw.floor_area_sqm,
                min: area_range.min,
                max: area_range.max,
            });
        }
        let lease_range = self.lease_commence_range();
        if !lease_range.contains(f64::from(raw.lease_commence_year)) {
            return Err(ValidationError::OutOfRange {
                field: "leaseCommenceYear",
                value: f64::from(raw.lease_commence_year),
                min: lease_range.min,
                max: lease_range.max,
            });
        }

        Ok(PropertyQuery {
            town: raw.town.clone(),
            flat_type: raw.flat_type.clone(),
            storey_range: raw.storey_range.clone(),
            year_purchased: raw.year_purchased,
            floor_area_sqm: raw.floor_area_sqm,
            lease_commence_year: raw.lease_commence_year,
        })
    }
}
