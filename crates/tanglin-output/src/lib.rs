#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tanglin-labs/tanglin/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod report;

pub use export::{
    ExportError, ExportFormat, PredictionExport, SummaryExport, append_rows_to_path, summary_rows,
    write_rows, write_rows_to_path,
};
pub use report::{PredictionReport, format_currency};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
