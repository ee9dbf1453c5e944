//! Constants used throughout the HCA core crate.
//!
//! Configuration defaults, scoring weights and category labels live here so adapters and tests
//! refer to one definition.

/// Default SQLite database path when no explicit path is configured.
pub const DEFAULT_DATABASE_PATH: &str = "healthcare.db";

/// Default directory for CSV exports.
pub const DEFAULT_EXPORT_DIR: &str = "exports";

/// Default number of rows requested from the per-patient aggregate queries.
pub const DEFAULT_ROW_LIMIT: usize = 100;

/// Environment variables read at startup.
pub const ENV_DATABASE_PATH: &str = "HCA_DATABASE_PATH";
pub const ENV_EXPORT_DIR: &str = "HCA_EXPORT_DIR";
pub const ENV_REFERENCE_DATE: &str = "HCA_REFERENCE_DATE";
pub const ENV_ROW_LIMIT: &str = "HCA_ROW_LIMIT";

/// Lower and upper clamp for every risk score.
pub const SCORE_FLOOR: f64 = 0.0;
pub const SCORE_CEILING: f64 = 100.0;

/// Patient risk weights.
pub const CONDITION_WEIGHT: f64 = 15.0;
pub const MEDICATION_WEIGHT: f64 = 10.0;
pub const ALLERGY_WEIGHT: f64 = 5.0;
pub const AGE_WEIGHT: f64 = 0.5;

/// Readmission risk weights.
pub const EMERGENCY_VISIT_WEIGHT: f64 = 20.0;
pub const INPATIENT_VISIT_WEIGHT: f64 = 15.0;
pub const LENGTH_OF_STAY_WEIGHT: f64 = 2.0;

/// Minimum encounters in the trailing window for a patient to be considered for readmission.
pub const MIN_READMISSION_ENCOUNTERS: u32 = 2;

/// Trailing window, in years, used by the readmission aggregate.
pub const READMISSION_WINDOW_YEARS: u32 = 1;

/// Trailing window, in years, used by seasonal condition trends.
pub const SEASONAL_WINDOW_YEARS: u32 = 2;

/// Number of rows surfaced in the "top N" parts of report overviews.
pub const OVERVIEW_HEAD: usize = 10;

/// Number of states listed in demographic insights.
pub const TOP_STATES: usize = 5;

/// Tier labels. Consumers hard-code these strings.
pub const LABEL_LOW: &str = "Low";
pub const LABEL_MEDIUM: &str = "Medium";
pub const LABEL_HIGH: &str = "High";
pub const LABEL_LOW_RISK: &str = "Low Risk";
pub const LABEL_MODERATE_RISK: &str = "Moderate Risk";
pub const LABEL_HIGH_RISK: &str = "High Risk";
