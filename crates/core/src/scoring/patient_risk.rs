//! Patient risk score.
//!
//! `raw = conditions × 15 + medications × 10 + allergies × 5 + age × 0.5`, clamped to `[0, 100]`
//! and labelled `Low` / `Medium` / `High`.

use super::{clamp_score, classify, PATIENT_RISK_BINS};
use crate::constants::{AGE_WEIGHT, ALLERGY_WEIGHT, CONDITION_WEIGHT, MEDICATION_WEIGHT};
use crate::error::AnalyticsResult;
use crate::rows::{PatientAggregateRow, ScoredRow, Tier};

/// Bounded risk score for one patient.
pub fn patient_risk_score(row: &PatientAggregateRow) -> f64 {
    let raw = f64::from(row.condition_count) * CONDITION_WEIGHT
        + f64::from(row.medication_count) * MEDICATION_WEIGHT
        + f64::from(row.allergy_count) * ALLERGY_WEIGHT
        + f64::from(row.age) * AGE_WEIGHT;
    clamp_score(raw)
}

/// Scores every row, preserving input order. An empty input yields an empty output.
pub fn score_patients(
    rows: Vec<PatientAggregateRow>,
) -> AnalyticsResult<Vec<ScoredRow<PatientAggregateRow, Tier>>> {
    rows.into_iter()
        .map(|row| {
            let score = patient_risk_score(&row);
            let category = classify(&PATIENT_RISK_BINS, "risk_score", score)?;
            Ok(ScoredRow {
                row,
                score,
                category,
            })
        })
        .collect()
}
