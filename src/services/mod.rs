//! Services at the edge of the report
//!
//! This module contains the parts that touch the outside world:
//! - CSV export and the background export runner
//! - Dataset loading and host-side filtering for the bundled binary

pub mod dataset;
pub mod export;

pub use dataset::{host_filter, load_rows};
pub use export::{
    to_csv, write_export, ExportRequest, ExportRunner, ExportSource, ExportStatus,
    DEFAULT_EXPORT_FILENAME,
};
