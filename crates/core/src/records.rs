//! Read models returned by the query layer alongside the aggregate rows.
//!
//! These are plain tables: the engine reshapes some of them (summaries, age groups) and the
//! adapters ship the rest unchanged.

use crate::rows::Gender;
use serde::Serialize;

/// Clinical tables that can be counted by description.
///
/// The set is closed so that table identifiers never come from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClinicalTable {
    Conditions,
    Medications,
    Allergies,
    Devices,
}

impl ClinicalTable {
    pub fn table_name(&self) -> &'static str {
        match self {
            ClinicalTable::Conditions => "conditions",
            ClinicalTable::Medications => "medications",
            ClinicalTable::Allergies => "allergies",
            ClinicalTable::Devices => "devices",
        }
    }
}

/// A patient as listed by `/api/patients`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientListing {
    pub id: String,
    pub first: String,
    pub last: String,
    pub birthdate: String,
    pub gender: Gender,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// Occurrences of one description in a clinical table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptionCount {
    pub description: String,
    pub occurrences: u64,
}

/// Condition prevalence with average duration (open conditions run to the reference date).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionPrevalence {
    pub condition: String,
    pub total_cases: u64,
    pub unique_patients: u64,
    pub avg_duration_days: Option<f64>,
}

/// Prescription volume and cost for one medication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicationUsage {
    pub medication: String,
    pub prescriptions: u64,
    pub unique_patients: u64,
    pub avg_cost: Option<f64>,
    pub total_cost: Option<f64>,
}

/// Encounter volume and cost for one encounter class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncounterClassSummary {
    pub encounter_type: String,
    pub total_encounters: u64,
    pub avg_cost: Option<f64>,
    pub total_cost: Option<f64>,
}

/// A per-patient count (e.g. immunizations received).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientCount {
    pub patient: String,
    pub count: u64,
}

/// Conditions recorded in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalCount {
    pub month: u32,
    pub description: String,
    pub count: u64,
}

/// A medication paired with the condition it was prescribed for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicationOutcome {
    pub medication: String,
    pub condition_treated: String,
    pub patient_count: u64,
    pub avg_duration_days: Option<f64>,
    pub avg_cost: Option<f64>,
}

/// Encounters attended by one provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderWorkload {
    pub name: String,
    pub speciality: Option<String>,
    pub encounter_count: u64,
}

/// The demographic slice of one patient with recorded expenses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortMember {
    pub age: i64,
    pub gender: Gender,
    pub healthcare_expenses: f64,
    pub state: Option<String>,
}

/// Raw counts behind the executive summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryCounts {
    pub total_patients: u64,
    pub patients_with_active_conditions: u64,
    pub total_encounters: u64,
    pub total_medications: u64,
    pub total_conditions: u64,
    pub total_healthcare_costs: f64,
    pub average_patient_age: Option<f64>,
}

/// One dated entry in a patient's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub description: String,
    pub start: String,
    pub stop: Option<String>,
    /// Encounter class, reason or cost detail, depending on the table.
    pub detail: Option<String>,
}

/// Everything recorded for one patient, newest entries first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientDetail {
    pub patient: PatientListing,
    pub healthcare_expenses: f64,
    pub healthcare_coverage: f64,
    pub conditions: Vec<TimelineEntry>,
    pub medications: Vec<TimelineEntry>,
    pub encounters: Vec<TimelineEntry>,
    pub allergies: Vec<TimelineEntry>,
}
