//! CSV and JSON export of predictions and market summaries.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tanglin_model::PredictionResult;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Summary frame is missing an expected column.
    #[error("Summary frame error: {0}")]
    Frame(#[from] PolarsError),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// One prediction flattened into an exportable row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionExport {
    /// Town label.
    pub town: String,
    /// Flat-type label.
    pub flat_type: String,
    /// Storey-band label.
    pub storey_range: String,
    /// Year of purchase.
    pub year_purchased: i32,
    /// Floor area in square metres.
    pub floor_area_sqm: f64,
    /// Lease commencement year.
    pub lease_commence_year: i32,
    /// Raw point estimate.
    pub point_estimate: f64,
    /// Lower band bound (exact).
    pub lower_bound: f64,
    /// Upper band bound (exact).
    pub upper_bound: f64,
}

impl PredictionExport {
    /// Flatten a query and its prediction into a row.
    pub fn new(query: &tanglin_data::PropertyQuery, result: &PredictionResult) -> Self {
        Self {
            town: query.town().to_string(),
            flat_type: query.flat_type().to_string(),
            storey_range: query.storey_range().to_string(),
            year_purchased: query.year_purchased(),
            floor_area_sqm: query.floor_area_sqm(),
            lease_commence_year: query.lease_commence_year(),
            point_estimate: result.point_estimate,
            lower_bound: result.lower_bound,
            upper_bound: result.upper_bound,
        }
    }
}

/// One group of a market summary (by town, flat type, or year).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryExport {
    /// Group label (town name, flat type, or year).
    pub group: String,
    /// Mean resale price within the group.
    pub mean_resale_price: f64,
    /// Number of transactions in the group.
    pub transactions: u32,
}

/// Flatten an aggregation frame (`<group>`, `mean_resale_price`,
/// `transactions`) into exportable rows, preserving frame order.
pub fn summary_rows(frame: &DataFrame, group_column: &str) -> Result<Vec<SummaryExport>, ExportError> {
    let groups = frame.column(group_column)?.cast(&DataType::String)?;
    let groups = groups.str()?;
    let means = frame.column("mean_resale_price")?.f64()?;
    let counts = frame.column("transactions")?.u32()?;

    let mut rows = Vec::with_capacity(frame.height());
    for i in 0..frame.height() {
        rows.push(SummaryExport {
            group: groups.get(i).unwrap_or_default().to_string(),
            mean_resale_price: means.get(i).unwrap_or(f64::NAN),
            transactions: counts.get(i).unwrap_or(0),
        });
    }
    Ok(rows)
}

/// Serialize rows to a writer in the chosen format.
pub fn write_rows<T: Serialize, W: Write>(
    rows: &[T],
    format: ExportFormat,
    writer: W,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Csv => {
            let mut csv_writer = csv::Writer::from_writer(writer);
            for row in rows {
                csv_writer.serialize(row)?;
            }
            csv_writer.flush()?;
        }
        ExportFormat::Json => serde_json::to_writer(writer, rows)?,
        ExportFormat::PrettyJson => serde_json::to_writer_pretty(writer, rows)?,
    }
    Ok(())
}

/// Serialize rows to a file in the chosen format, replacing any existing
/// content.
pub fn write_rows_to_path<T: Serialize, P: AsRef<Path>>(
    rows: &[T],
    format: ExportFormat,
    path: P,
) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_rows(rows, format, file)
}

/// Append rows to a CSV file, creating it if absent.
///
/// The header row is written only when the file is new or empty, so
/// repeated calls accumulate a single well-formed CSV.
pub fn append_rows_to_path<T: Serialize, P: AsRef<Path>>(
    rows: &[T],
    path: P,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let write_header = match std::fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(_) => true,
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(write_header)
        .from_writer(file);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<SummaryExport> {
        vec![
            SummaryExport {
                group: "Yishun".to_string(),
                mean_resale_price: 790_000.0,
                transactions: 1,
            },
            SummaryExport {
                group: "Punggol".to_string(),
                mean_resale_price: 550_000.0,
                transactions: 2,
            },
        ]
    }

    #[test]
    fn test_format_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }

    #[test]
    fn test_csv_export() {
        let mut buffer = Vec::new();
        write_rows(&rows(), ExportFormat::Csv, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("group,meanResalePrice,transactions"));
        assert!(text.contains("Yishun,790000.0,1"));
    }

    #[test]
    fn test_append_accumulates_rows() {
        let path = std::env::temp_dir().join(format!(
            "tanglin-export-append-{}.csv",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        // Two invocations against the same file must not lose the first row.
        append_rows_to_path(&rows()[..1], &path).unwrap();
        append_rows_to_path(&rows()[1..], &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "group,meanResalePrice,transactions");
        assert!(lines[1].starts_with("Yishun"));
        assert!(lines[2].starts_with("Punggol"));
    }

    #[test]
    fn test_json_export_round_trips() {
        let mut buffer = Vec::new();
        write_rows(&rows(), ExportFormat::Json, &mut buffer).unwrap();
        let parsed: Vec<SummaryExport> = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed, rows());
    }

    #[test]
    fn test_summary_rows_from_frame() {
        let frame = df!(
            "town" => ["Yishun", "Punggol"],
            "mean_resale_price" => [790_000.0, 550_000.0],
            "transactions" => [1u32, 2],
        )
        .unwrap();
        let exported = summary_rows(&frame, "town").unwrap();
        assert_eq!(exported, rows());
    }

    #[test]
    fn test_summary_rows_casts_year_groups() {
        let frame = df!(
            "year" => [2024i32, 2025],
            "mean_resale_price" => [565_000.0, 585_000.0],
            "transactions" => [4u32, 2],
        )
        .unwrap();
        let exported = summary_rows(&frame, "year").unwrap();
        assert_eq!(exported[0].group, "2024");
        assert_eq!(exported[1].transactions, 2);
    }
}
