//! # HCA Core
//!
//! Core analytics for the healthcare reporting system.
//!
//! This crate contains pure, synchronous computation over materialized tables:
//! - Aggregate row types and the scored rows derived from them
//! - Explicit bin tables shared by every categorizer
//! - Patient risk, readmission risk and cost scoring
//! - Cohort statistics, demographic breakdowns and the executive summary
//! - The [`AggregateSource`] trait implemented by the query layer
//!
//! **No I/O concerns**: database access lives in `hca-store`; HTTP, CLI and file exports belong
//! in `api-rest`, `cli` and `export`.

pub mod bins;
pub mod config;
pub mod constants;
pub mod demographics;
pub mod error;
pub mod records;
pub mod reports;
pub mod rows;
pub mod scoring;
pub mod service;
pub mod source;
pub mod stats;
pub mod summary;
pub mod validation;

pub use config::{config_from_lookup, CoreConfig};
pub use constants::{DEFAULT_DATABASE_PATH, DEFAULT_EXPORT_DIR, DEFAULT_ROW_LIMIT};
pub use error::{AnalyticsError, AnalyticsResult};
pub use records::ClinicalTable;
pub use rows::{
    CategorizedRow, CostAggregateRow, EncounterAggregateRow, Gender, PatientAggregateRow,
    ReadmissionTier, ScoredRow, Tier,
};
pub use service::AnalyticsService;
pub use source::AggregateSource;
pub use summary::ExecutiveSummary;
