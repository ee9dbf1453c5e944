//! HCA Export
//!
//! CSV export of analytics tables and reports.
//!
//! ## Layout
//!
//! Single tables are written as `<export_dir>/<name>.csv`. Multi-sheet reports are written as
//! workbooks: a directory per report with one CSV file per sheet.
//!
//! ```text
//! exports/
//! ├── patient_risk_scores.csv
//! ├── readmission_risk.csv
//! ├── cost_analysis.csv
//! ├── executive_summary/
//! │   ├── Executive_Summary.csv
//! │   ├── Gender_Distribution.csv
//! │   └── Top_10_Conditions.csv
//! └── patient_report_<first>_<last>_<id8>/
//!     ├── Patient_Info.csv
//!     └── ...
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use hca_export::CsvExporter;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! #[derive(serde::Serialize)]
//! struct Row { description: String, occurrences: u64 }
//!
//! let exporter = CsvExporter::new("exports");
//! let rows = vec![Row { description: "Hypertension".into(), occurrences: 42 }];
//! exporter.write_table("common_conditions_report", &rows)?;
//! # Ok(())
//! # }
//! ```

pub mod constants;
mod exporter;
pub mod records;
mod reports;

pub use exporter::{sanitize_name, CsvExporter, Workbook};
pub use reports::ReportExporter;

use std::path::PathBuf;

/// Errors that can occur while exporting.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Table, workbook or sheet name is not usable as a file name
    #[error("Invalid export name: {0}")]
    InvalidName(String),

    /// Failed to create or write an output file
    #[error("I/O error (path: {path}): {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Row could not be encoded as CSV
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The analytics layer failed to produce the table
    #[error(transparent)]
    Analytics(#[from] hca_core::AnalyticsError),
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;
