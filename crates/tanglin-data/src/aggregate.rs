//! Read-only aggregations over the transaction dataset.
//!
//! These back the market-summary views: mean resale price ranked by town,
//! broken down by flat type, and trended by purchase year. They never feed
//! the prediction pipeline.

use crate::dataset::ResaleDataset;
use crate::error::Result;
use polars::prelude::*;

/// Mean resale price per town, most expensive first.
///
/// Columns: `town`, `mean_resale_price`, `transactions`.
pub fn mean_price_by_town(dataset: &ResaleDataset) -> Result<DataFrame> {
    let df = dataset
        .lazy()
        .group_by([col("town")])
        .agg([
            col("resale_price").mean().alias("mean_resale_price"),
            col("resale_price").count().alias("transactions"),
        ])
        .sort(
            ["mean_resale_price"],
            SortMultipleOptions::default().with_order_descending(true),
        )
        .collect()?;
    Ok(df)
}

/// Mean resale price per flat type, most expensive first.
///
/// Columns: `flat_type`, `mean_resale_price`, `transactions`.
pub fn mean_price_by_flat_type(dataset: &ResaleDataset) -> Result<DataFrame> {
    let df = dataset
        .lazy()
        .group_by([col("flat_type")])
        .agg([
            col("resale_price").mean().alias("mean_resale_price"),
            col("resale_price").count().alias("transactions"),
        ])
        .sort(
            ["mean_resale_price"],
            SortMultipleOptions::default().with_order_descending(true),
        )
        .collect()?;
    Ok(df)
}

/// Mean resale price per transaction year, chronological.
///
/// The `month` column is `YYYY-MM`; the year is its first four characters.
/// Columns: `year`, `mean_resale_price`, `transactions`.
pub fn mean_price_by_year(dataset: &ResaleDataset) -> Result<DataFrame> {
    let df = dataset
        .lazy()
        .with_column(
            col("month")
                .str()
                .slice(lit(0), lit(4))
                .cast(DataType::Int32)
                .alias("year"),
        )
        .group_by([col("year")])
        .agg([
            col("resale_price").mean().alias("mean_resale_price"),
            col("resale_price").count().alias("transactions"),
        ])
        .sort(["year"], SortMultipleOptions::default())
        .collect()?;
    Ok(df)
}

/// Headline statistics for the whole dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetOverview {
    /// Number of transaction records.
    pub transactions: usize,
    /// Mean resale price across all records.
    pub mean_price: f64,
    /// Median resale price across all records.
    pub median_price: f64,
    /// Mean floor area in square metres.
    pub mean_floor_area_sqm: f64,
}

/// Compute headline statistics in a single pass.
pub fn overview(dataset: &ResaleDataset) -> Result<DatasetOverview> {
    let df = dataset
        .lazy()
        .select([
            col("resale_price").count().alias("transactions"),
            col("resale_price").mean().alias("mean_price"),
            col("resale_price").median().alias("median_price"),
            col("floor_area_sqm").mean().alias("mean_floor_area_sqm"),
        ])
        .collect()?;

    let scalar = |name: &str| -> Result<f64> {
        Ok(df.column(name)?.f64()?.get(0).unwrap_or(f64::NAN))
    };
    let transactions = df.column("transactions")?.u32()?.get(0).unwrap_or(0) as usize;

    Ok(DatasetOverview {
        transactions,
        mean_price: scalar("mean_price")?,
        median_price: scalar("median_price")?,
        mean_floor_area_sqm: scalar("mean_floor_area_sqm")?,
    })
}
