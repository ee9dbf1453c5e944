//! Aggregate rows handed over by the query layer and the scored rows the engine produces.
//!
//! Aggregate rows are owned by the caller that requested them. The engine never mutates them:
//! scoring moves each row into a [`ScoredRow`] or [`CategorizedRow`] alongside its result.

use crate::constants::{
    LABEL_HIGH, LABEL_HIGH_RISK, LABEL_LOW, LABEL_LOW_RISK, LABEL_MEDIUM, LABEL_MODERATE_RISK,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Administrative gender as recorded in the patients table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "U")]
    Unknown,
}

impl Gender {
    /// Parses the dataset's gender code. Anything other than `M`/`F` (case-insensitive, also
    /// accepting `male`/`female`) is `Unknown`.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Gender::Male,
            "f" | "female" => Gender::Female,
            _ => Gender::Unknown,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Unknown => "U",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Three-level tier used for patient risk and cost categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Low => LABEL_LOW,
            Tier::Medium => LABEL_MEDIUM,
            Tier::High => LABEL_HIGH,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Readmission risk tier. Serialized with the spaced labels (`"Low Risk"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadmissionTier {
    #[serde(rename = "Low Risk")]
    LowRisk,
    #[serde(rename = "Moderate Risk")]
    ModerateRisk,
    #[serde(rename = "High Risk")]
    HighRisk,
}

impl ReadmissionTier {
    pub fn label(&self) -> &'static str {
        match self {
            ReadmissionTier::LowRisk => LABEL_LOW_RISK,
            ReadmissionTier::ModerateRisk => LABEL_MODERATE_RISK,
            ReadmissionTier::HighRisk => LABEL_HIGH_RISK,
        }
    }
}

impl fmt::Display for ReadmissionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One patient with counts of active conditions, medications and allergies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientAggregateRow {
    pub patient_id: String,
    pub patient_name: String,
    pub age: u32,
    pub gender: Gender,
    pub condition_count: u32,
    pub medication_count: u32,
    pub allergy_count: u32,
}

/// One patient's encounter history over the trailing readmission window.
///
/// The query layer only produces rows with at least two encounters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterAggregateRow {
    pub patient_id: String,
    pub patient_name: String,
    pub age: u32,
    pub total_encounters: u32,
    pub emergency_visits: u32,
    pub inpatient_visits: u32,
    pub avg_length_of_stay_days: f64,
}

/// One patient's lifetime healthcare expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostAggregateRow {
    pub patient_id: String,
    pub patient_name: String,
    pub total_cost: f64,
    pub coverage: f64,
    pub medication_count: u32,
    pub encounter_count: u32,
}

impl CostAggregateRow {
    pub fn out_of_pocket(&self) -> f64 {
        self.total_cost - self.coverage
    }
}

/// An aggregate row with a bounded score and the tier derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRow<R, C> {
    #[serde(flatten)]
    pub row: R,
    pub score: f64,
    pub category: C,
}

/// An aggregate row with a category derived directly from one of its fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorizedRow<R, C> {
    #[serde(flatten)]
    pub row: R,
    pub category: C,
}
