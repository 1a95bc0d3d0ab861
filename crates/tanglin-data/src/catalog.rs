//! Domain catalog: the closed attribute domains of the input contract.
//!
//! The sets of towns, flat types, and storey bands (and the numeric ranges)
//! are configuration data loaded at startup, not code. The reference
//! deployment's catalog (24 towns, 7 flat types, 17 storey bands) ships
//! embedded in the crate; deployments with a different attribute universe
//! load their own document with [`DomainCatalog::from_path`].

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Reference catalog document embedded at build time.
const REFERENCE_CATALOG: &str = include_str!("../data/domains.json");

/// Inclusive numeric bounds for one input field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    /// Smallest accepted value.
    pub min: f64,
    /// Largest accepted value.
    pub max: f64,
}

impl NumericRange {
    /// Whether `value` is finite and within the inclusive bounds.
    pub const fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// On-disk shape of the catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogDocument {
    towns: Vec<String>,
    flat_types: Vec<String>,
    storey_ranges: Vec<String>,
    year_purchased: NumericRange,
    floor_area_sqm: NumericRange,
    lease_commence_year: NumericRange,
}

/// The closed attribute domains accepted by the prediction pipeline.
#[derive(Debug, Clone)]
pub struct DomainCatalog {
    towns: Vec<String>,
    flat_types: Vec<String>,
    storey_ranges: Vec<String>,
    town_set: HashSet<String>,
    flat_type_set: HashSet<String>,
    storey_range_set: HashSet<String>,
    year_purchased: NumericRange,
    floor_area_sqm: NumericRange,
    lease_commence_year: NumericRange,
}

impl DomainCatalog {
    /// Load the embedded reference catalog.
    ///
    /// Fails only if the embedded document is corrupt, which is a packaging
    /// defect rather than a runtime condition.
    pub fn reference() -> Result<Self> {
        Self::from_json(REFERENCE_CATALOG)
    }

    /// Load a catalog from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: CatalogDocument = serde_json::from_str(json)?;
        Self::from_document(doc)
    }

    /// Load a catalog from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut json = String::new();
        file.read_to_string(&mut json)?;
        Self::from_json(&json)
    }

    fn from_document(doc: CatalogDocument) -> Result<Self> {
        for (name, labels) in [
            ("towns", &doc.towns),
            ("flat_types", &doc.flat_types),
            ("storey_ranges", &doc.storey_ranges),
        ] {
            if labels.is_empty() {
                return Err(DataError::InvalidCatalog(format!("{name} is empty")));
            }
            let unique: HashSet<&str> = labels.iter().map(String::as_str).collect();
            if unique.len() != labels.len() {
                return Err(DataError::InvalidCatalog(format!(
                    "{name} contains duplicate labels"
                )));
            }
        }
        for (name, range) in [
            ("year_purchased", doc.year_purchased),
            ("floor_area_sqm", doc.floor_area_sqm),
            ("lease_commence_year", doc.lease_commence_year),
        ] {
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                return Err(DataError::InvalidCatalog(format!(
                    "{name} range [{}, {}] is invalid",
                    range.min, range.max
                )));
            }
        }

        let town_set = doc.towns.iter().cloned().collect();
        let flat_type_set = doc.flat_types.iter().cloned().collect();
        let storey_range_set = doc.storey_ranges.iter().cloned().collect();

        Ok(Self {
            towns: doc.towns,
            flat_types: doc.flat_types,
            storey_ranges: doc.storey_ranges,
            town_set,
            flat_type_set,
            storey_range_set,
            year_purchased: doc.year_purchased,
            floor_area_sqm: doc.floor_area_sqm,
            lease_commence_year: doc.lease_commence_year,
        })
    }

    /// All towns, in catalog order.
    pub fn towns(&self) -> &[String] {
        &self.towns
    }

    /// All flat types, in catalog order.
    pub fn flat_types(&self) -> &[String] {
        &self.flat_types
    }

    /// All storey bands, in catalog order.
    pub fn storey_ranges(&self) -> &[String] {
        &self.storey_ranges
    }

    /// Whether `town` is a member of the town domain.
    pub fn contains_town(&self, town: &str) -> bool {
        self.town_set.contains(town)
    }

    /// Whether `flat_type` is a member of the flat-type domain.
    pub fn contains_flat_type(&self, flat_type: &str) -> bool {
        self.flat_type_set.contains(flat_type)
    }

    /// Whether `storey_range` is a member of the storey-band domain.
    pub fn contains_storey_range(&self, storey_range: &str) -> bool {
        self.storey_range_set.contains(storey_range)
    }

    /// Accepted purchase-year bounds.
    pub const fn year_purchased_range(&self) -> NumericRange {
        self.year_purchased
    }

    /// Accepted floor-area bounds (square metres).
    pub const fn floor_area_range(&self) -> NumericRange {
        self.floor_area_sqm
    }

    /// Accepted lease-commencement-year bounds.
    pub const fn lease_commence_range(&self) -> NumericRange {
        self.lease_commence_year
    }
}
