//! Regression tests against the model artifact shipped in `model/`.

use approx::assert_relative_eq;
use std::path::PathBuf;
use tanglin::{DomainCatalog, Pipeline, RawPropertyQuery};
use tanglin_model::DEFAULT_MARGIN;

fn shipped_artifact() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../model/resale_gbdt.json")
}

fn pipeline() -> Pipeline {
    let catalog = DomainCatalog::reference().unwrap();
    Pipeline::from_artifact_path(catalog, shipped_artifact()).unwrap()
}

fn example() -> RawPropertyQuery {
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
fn shipped_artifact_loads() {
    let pipeline = pipeline();
    assert_eq!(pipeline.model_name(), "hdb-resale-gbdt");
    assert_relative_eq!(pipeline.margin(), DEFAULT_MARGIN);
}

#[test]
fn golden_prediction_for_reference_query() {
    // Pinned against the shipped ensemble, walked by hand:
    // 420000 + 14000 + 6000 - 18000 + 4000 + 11000 + 9000 + 3000 - 2000.
    let result = pipeline().predict(&example()).unwrap();
    assert_relative_eq!(result.point_estimate, 447_000.0);
    assert_relative_eq!(result.lower_bound, 447_000.0 - DEFAULT_MARGIN);
    assert_relative_eq!(result.upper_bound, 447_000.0 + DEFAULT_MARGIN);
}

#[test]
fn every_catalog_combination_scores_finite() {
    let pipeline = pipeline();
    let catalog = DomainCatalog::reference().unwrap();

    // Cheap sweep over the full categorical space at a fixed numeric point.
    for town in catalog.towns() {
        for flat_type in catalog.flat_types() {
            for storey_range in catalog.storey_ranges() {
                let raw = RawPropertyQuery {
                    town: town.clone(),
                    flat_type: flat_type.clone(),
                    storey_range: storey_range.clone(),
                    year_purchased: 2020,
                    floor_area_sqm: 100.0,
                    lease_commence_year: 1995,
                };
                let result = pipeline.predict(&raw).unwrap();
                assert!(result.point_estimate.is_finite());
                assert!(result.lower_bound < result.upper_bound);
            }
        }
    }
}

#[test]
fn predictions_are_idempotent() {
    let pipeline = pipeline();
    let first = pipeline.predict(&example()).unwrap();
    let second = pipeline.predict(&example()).unwrap();
    assert_eq!(first.point_estimate.to_bits(), second.point_estimate.to_bits());
    assert_eq!(first.lower_bound.to_bits(), second.lower_bound.to_bits());
    assert_eq!(first.upper_bound.to_bits(), second.upper_bound.to_bits());
}
