#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/tanglin-labs/tanglin/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod aggregate;
pub mod catalog;
pub mod dataset;
pub mod error;
pub mod query;

pub use catalog::{DomainCatalog, NumericRange};
pub use dataset::ResaleDataset;
pub use error::{DataError, Result};
pub use query::{PropertyQuery, RawPropertyQuery, ValidationError};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
