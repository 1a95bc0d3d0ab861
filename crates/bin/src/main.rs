//! Tanglin CLI binary.
//!
//! Command-line interface for the resale price prediction pipeline and the
//! dataset summary views.

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tanglin::{DomainCatalog, Pipeline, PredictError, RawPropertyQuery};
use tanglin_data::{ResaleDataset, aggregate};
use tanglin_output::{
    ExportFormat, PredictionExport, PredictionReport, append_rows_to_path, summary_rows,
    write_rows_to_path,
};

#[derive(Parser)]
#[command(name = "tanglin")]
#[command(about = "Tanglin: HDB resale price predictor and market summaries", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Grouping key for the summary view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SummaryBy {
    /// Mean price per town, most expensive first
    Town,
    /// Mean price per flat type
    FlatType,
    /// Mean price per transaction year
    Year,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the resale price for a property
    Predict {
        /// Town, e.g. "Bedok"
        #[arg(long)]
        town: String,

        /// Flat type, e.g. "4 Room"
        #[arg(long)]
        flat_type: String,

        /// Storey band, e.g. "04 To 06"
        #[arg(long)]
        storey_range: String,

        /// Year of purchase
        #[arg(long)]
        year: i32,

        /// Floor area in square metres
        #[arg(long)]
        floor_area: f64,

        /// Lease commencement year
        #[arg(long)]
        lease_commence_year: i32,

        /// Path to the model artifact (defaults to ./model/resale_gbdt.json,
        /// then the per-user data directory)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Override the confidence band half-width
        #[arg(long)]
        margin: Option<f64>,

        /// Path to a domain catalog document (defaults to the embedded one)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Emit the result as JSON instead of a report
        #[arg(long)]
        json: bool,

        /// Append the query and prediction to a CSV file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Summarize a resale transaction dataset
    Summary {
        /// Path to the cleaned transaction CSV
        #[arg(long)]
        data: PathBuf,

        /// Grouping key
        #[arg(long, value_enum, default_value_t = SummaryBy::Town)]
        by: SummaryBy,

        /// Show only the top N groups
        #[arg(long)]
        top: Option<usize>,

        /// Restrict to the given towns (repeatable)
        #[arg(long)]
        town: Vec<String>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Write the summary to a CSV file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List the configured attribute domains
    Domains {
        /// Path to a domain catalog document (defaults to the embedded one)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Predict {
            town,
            flat_type,
            storey_range,
            year,
            floor_area,
            lease_commence_year,
            model,
            margin,
            catalog,
            json,
            out,
        } => {
            let raw = RawPropertyQuery {
                town,
                flat_type,
                storey_range,
                year_purchased: year,
                floor_area_sqm: floor_area,
                lease_commence_year,
            };
            predict(&raw, model, margin, catalog, json, out)?;
        }
        Commands::Summary {
            data,
            by,
            top,
            town,
            json,
            out,
        } => {
            summarize(&data, by, top, &town, json, out)?;
        }
        Commands::Domains { catalog } => {
            list_domains(catalog)?;
        }
    }

    Ok(())
}

fn load_catalog(path: Option<PathBuf>) -> Result<DomainCatalog, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => DomainCatalog::from_path(path)?,
        None => DomainCatalog::reference()?,
    })
}

/// Model artifact search order: explicit flag, working directory, per-user
/// data directory.
fn resolve_model_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    let local = PathBuf::from("model/resale_gbdt.json");
    if local.exists() {
        return local;
    }
    dirs::data_dir()
        .map(|d| d.join("tanglin").join("resale_gbdt.json"))
        .unwrap_or(local)
}

fn predict(
    raw: &RawPropertyQuery,
    model: Option<PathBuf>,
    margin: Option<f64>,
    catalog: Option<PathBuf>,
    json: bool,
    out: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load_catalog(catalog)?;
    let model_path = resolve_model_path(model);

    let mut pipeline = Pipeline::from_artifact_path(catalog, &model_path)?;
    if let Some(margin) = margin {
        pipeline = pipeline.with_margin(margin)?;
    }

    // Validate once; the validated query backs both the export row and the
    // report.
    let outcome = pipeline
        .catalog()
        .validate(raw)
        .map_err(PredictError::from)
        .and_then(|query| {
            pipeline
                .predict_validated(&query)
                .map(|result| (query, result))
        });

    match outcome {
        Ok((query, result)) => {
            if let Some(out) = &out {
                let row = PredictionExport::new(&query, &result);
                append_rows_to_path(&[row], out)?;
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let report =
                    PredictionReport::new(query, result, pipeline.model_name().to_string());
                println!("{report}");
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", serde_json::to_string(&error_body(&err))?);
            process::exit(1);
        }
    }
}

/// Structured error for the external contract: `{field, reason}` for
/// validation failures, `{stage, reason}` otherwise.
fn error_body(err: &PredictError) -> serde_json::Value {
    match err {
        PredictError::Validation(inner) => json!({
            "field": inner.field(),
            "reason": inner.to_string(),
        }),
        other => json!({
            "stage": other.stage(),
            "reason": other.to_string(),
        }),
    }
}

fn summarize(
    data: &Path,
    by: SummaryBy,
    top: Option<usize>,
    towns: &[String],
    json: bool,
    out: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message(format!("Scanning {}", data.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut dataset = ResaleDataset::from_csv_path(data)?;
    if !towns.is_empty() {
        dataset = dataset.filter_towns(towns);
    }

    let (frame, group_column) = match by {
        SummaryBy::Town => (aggregate::mean_price_by_town(&dataset)?, "town"),
        SummaryBy::FlatType => (aggregate::mean_price_by_flat_type(&dataset)?, "flat_type"),
        SummaryBy::Year => (aggregate::mean_price_by_year(&dataset)?, "year"),
    };
    let overview = aggregate::overview(&dataset)?;
    spinner.finish_and_clear();

    let mut rows = summary_rows(&frame, group_column)?;
    if let Some(top) = top {
        rows.truncate(top);
    }

    if let Some(out) = out {
        write_rows_to_path(&rows, ExportFormat::Csv, &out)?;
        println!("Wrote {} rows to {}", rows.len(), out.display());
        return Ok(());
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "transactions": overview.transactions,
                "meanPrice": overview.mean_price,
                "medianPrice": overview.median_price,
                "meanFloorAreaSqm": overview.mean_floor_area_sqm,
                "groups": rows,
            }))?
        );
        return Ok(());
    }

    println!(
        "{} transactions | mean S${} | median S${}",
        overview.transactions,
        tanglin_output::format_currency(overview.mean_price),
        tanglin_output::format_currency(overview.median_price),
    );
    println!();
    println!("{:<20} {:>16} {:>14}", "group", "mean price", "transactions");
    for row in &rows {
        println!(
            "{:<20} {:>16} {:>14}",
            row.group,
            format!("S${}", tanglin_output::format_currency(row.mean_resale_price)),
            row.transactions,
        );
    }

    Ok(())
}

fn list_domains(catalog: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load_catalog(catalog)?;

    println!("Towns ({}):", catalog.towns().len());
    for town in catalog.towns() {
        println!("  {town}");
    }
    println!("\nFlat types ({}):", catalog.flat_types().len());
    for flat_type in catalog.flat_types() {
        println!("  {flat_type}");
    }
    println!("\nStorey bands ({}):", catalog.storey_ranges().len());
    for band in catalog.storey_ranges() {
        println!("  {band}");
    }
    println!(
        "\nYear purchased: [{}, {}]  Floor area (sqm): [{}, {}]  Lease commence: [{}, {}]",
        catalog.year_purchased_range().min,
        catalog.year_purchased_range().max,
        catalog.floor_area_range().min,
        catalog.floor_area_range().max,
        catalog.lease_commence_range().min,
        catalog.lease_commence_range().max,
    );

    Ok(())
}
