//! Output names for every export.

pub const COMMON_CONDITIONS_REPORT: &str = "common_conditions_report";
pub const COMMON_ALLERGIES_REPORT: &str = "common_allergies_report";
pub const MEDICATIONS_REPORT: &str = "medications_report";
pub const IMMUNIZATIONS_REPORT: &str = "immunizations_report";
pub const DEVICES_REPORT: &str = "devices_report";

pub const PATIENT_RISK_REPORT: &str = "patient_risk_scores";
pub const READMISSION_REPORT: &str = "readmission_risk";
pub const COST_REPORT: &str = "cost_analysis";

pub const COMPREHENSIVE_WORKBOOK: &str = "comprehensive_healthcare_report";
pub const EXECUTIVE_SUMMARY_WORKBOOK: &str = "executive_summary";
pub const PATIENT_WORKBOOK_PREFIX: &str = "patient_report";

/// Rows in the `Patients` sheet of the comprehensive workbook.
pub const COMPREHENSIVE_PATIENT_LIMIT: usize = 1000;

/// Rows in the condition and medication sheets of the comprehensive workbook.
pub const COMPREHENSIVE_TOP_LIMIT: usize = 50;

/// Rows in the `Top_10_Conditions` sheet.
pub const SUMMARY_TOP_CONDITIONS: usize = 10;
