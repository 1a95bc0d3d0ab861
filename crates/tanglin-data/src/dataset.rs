//! Resale transaction dataset access.
//!
//! Wraps a lazy view over the cleaned resale transaction records. The
//! prediction pipeline never touches this data; it exists for the read-only
//! aggregation layer and shares no mutable state with anything.

use crate::error::{DataError, Result};
use polars::prelude::*;
use std::path::Path;

/// Columns every transaction dataset must carry.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "month",
    "town",
    "flat_type",
    "storey_range",
    "floor_area_sqm",
    "lease_commence_date",
    "resale_price",
];

/// A lazy view over resale transaction records.
#[derive(Clone)]
pub struct ResaleDataset {
    frame: LazyFrame,
}

impl ResaleDataset {
    /// Open a dataset from a CSV file with a header row.
    ///
    /// The scan is lazy; the file is only read when an aggregation is
    /// collected. Schema problems surface on first collection.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let frame = LazyCsvReader::new(path.as_ref())
            .with_has_header(true)
            .finish()?;
        Ok(Self { frame })
    }

    /// Wrap an in-memory dataframe, checking the required columns up front.
    pub fn from_dataframe(df: DataFrame) -> Result<Self> {
        let names = df.get_column_names_str();
        for required in REQUIRED_COLUMNS {
            if !names.contains(&required) {
                return Err(DataError::MissingColumn(required.to_string()));
            }
        }
        Ok(Self { frame: df.lazy() })
    }

    /// The underlying lazy frame.
    pub fn lazy(&self) -> LazyFrame {
        self.frame.clone()
    }

    /// Restrict the dataset to the given towns.
    pub fn filter_towns(&self, towns: &[String]) -> Self {
        let members = Series::new("towns".into(), towns);
        Self {
            frame: self
                .frame
                .clone()
                .filter(col("town").is_in(lit(members))),
        }
    }

    /// Number of transaction records.
    pub fn len(&self) -> Result<usize> {
        let df = self
            .frame
            .clone()
            .select([col("town").count().alias("n")])
            .collect()?;
        let n = df
            .column("n")?
            .u32()?
            .get(0)
            .ok_or_else(|| DataError::EmptyDataset("no rows".to_string()))?;
        Ok(n as usize)
    }

    /// Whether the dataset has no records.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_frame() -> DataFrame {
        df!(
            "month" => ["2024-01", "2024-01", "2024-02", "2024-02", "2025-01", "2025-03"],
            "town" => ["Bedok", "Bedok", "Punggol", "Punggol", "Bedok", "Yishun"],
            "flat_type" => ["4 Room", "5 Room", "4 Room", "4 Room", "3 Room", "Executive"],
            "storey_range" => ["04 To 06", "07 To 09", "10 To 12", "01 To 03", "04 To 06", "13 To 15"],
            "floor_area_sqm" => [92.0, 110.0, 93.0, 90.0, 68.0, 145.0],
            "lease_commence_date" => [1998i32, 2001, 2015, 2014, 1987, 2003],
            "resale_price" => [520_000.0, 640_000.0, 560_000.0, 540_000.0, 380_000.0, 790_000.0],
        )
        .unwrap()
    }

    #[test]
    fn test_from_dataframe_checks_columns() {
        let df = df!("town" => ["Bedok"]).unwrap();
        assert!(matches!(
            ResaleDataset::from_dataframe(df),
            Err(DataError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_len() {
        let dataset = ResaleDataset::from_dataframe(sample_frame()).unwrap();
        assert_eq!(dataset.len().unwrap(), 6);
        assert!(!dataset.is_empty().unwrap());
    }

    #[test]
    fn test_filter_towns() {
        let dataset = ResaleDataset::from_dataframe(sample_frame()).unwrap();
        let filtered = dataset.filter_towns(&["Bedok".to_string()]);
        assert_eq!(filtered.len().unwrap(), 3);
    }
}
