//! Flat row shapes for CSV output.
//!
//! The csv writer cannot serialize nested or flattened structs, so scored rows are spelled out
//! column by column here. Category columns carry the exact tier labels. Read models that are
//! already flat are written as they are.

use hca_core::records::{PatientCount, PatientDetail};
use hca_core::reports::{CategorizedCost, ScoredPatient, ScoredReadmission};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskScoreRecord {
    pub patient_id: String,
    pub patient_name: String,
    pub age: u32,
    pub gender: &'static str,
    pub condition_count: u32,
    pub medication_count: u32,
    pub allergy_count: u32,
    pub risk_score: f64,
    pub risk_category: &'static str,
}

impl From<&ScoredPatient> for RiskScoreRecord {
    fn from(scored: &ScoredPatient) -> Self {
        let row = &scored.row;
        Self {
            patient_id: row.patient_id.clone(),
            patient_name: row.patient_name.clone(),
            age: row.age,
            gender: row.gender.code(),
            condition_count: row.condition_count,
            medication_count: row.medication_count,
            allergy_count: row.allergy_count,
            risk_score: scored.score,
            risk_category: scored.category.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadmissionRecord {
    pub patient_id: String,
    pub patient_name: String,
    pub age: u32,
    pub total_encounters: u32,
    pub emergency_visits: u32,
    pub inpatient_visits: u32,
    pub avg_length_of_stay: f64,
    pub readmission_risk: f64,
    pub risk_level: &'static str,
}

impl From<&ScoredReadmission> for ReadmissionRecord {
    fn from(scored: &ScoredReadmission) -> Self {
        let row = &scored.row;
        Self {
            patient_id: row.patient_id.clone(),
            patient_name: row.patient_name.clone(),
            age: row.age,
            total_encounters: row.total_encounters,
            emergency_visits: row.emergency_visits,
            inpatient_visits: row.inpatient_visits,
            avg_length_of_stay: row.avg_length_of_stay_days,
            readmission_risk: scored.score,
            risk_level: scored.category.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostRecord {
    pub patient_id: String,
    pub patient_name: String,
    pub total_cost: f64,
    pub healthcare_coverage: f64,
    pub out_of_pocket: f64,
    pub medication_count: u32,
    pub encounter_count: u32,
    pub cost_category: &'static str,
}

impl From<&CategorizedCost> for CostRecord {
    fn from(categorized: &CategorizedCost) -> Self {
        let row = &categorized.row;
        Self {
            patient_id: row.patient_id.clone(),
            patient_name: row.patient_name.clone(),
            total_cost: row.total_cost,
            healthcare_coverage: row.coverage,
            out_of_pocket: row.out_of_pocket(),
            medication_count: row.medication_count,
            encounter_count: row.encounter_count,
            cost_category: categorized.category.label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricRecord {
    pub metric: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImmunizationRecord {
    pub patient: String,
    pub immunization_count: u64,
}

impl From<&PatientCount> for ImmunizationRecord {
    fn from(count: &PatientCount) -> Self {
        Self {
            patient: count.patient.clone(),
            immunization_count: count.count,
        }
    }
}

/// The `Patient_Info` sheet of a patient workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientInfoRecord {
    pub id: String,
    pub first: String,
    pub last: String,
    pub birthdate: String,
    pub gender: &'static str,
    pub city: Option<String>,
    pub state: Option<String>,
    pub healthcare_expenses: f64,
    pub healthcare_coverage: f64,
}

impl From<&PatientDetail> for PatientInfoRecord {
    fn from(detail: &PatientDetail) -> Self {
        let p = &detail.patient;
        Self {
            id: p.id.clone(),
            first: p.first.clone(),
            last: p.last.clone(),
            birthdate: p.birthdate.clone(),
            gender: p.gender.code(),
            city: p.city.clone(),
            state: p.state.clone(),
            healthcare_expenses: detail.healthcare_expenses,
            healthcare_coverage: detail.healthcare_coverage,
        }
    }
}

pub(crate) fn convert<'a, S: 'a, T: From<&'a S>>(rows: &'a [S]) -> Vec<T> {
    rows.iter().map(T::from).collect()
}
