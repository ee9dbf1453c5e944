//! Overviews of scored tables, as served by the API and printed by the CLI.
//!
//! Each overview is built from an already-scored table. An empty table has no overview: callers
//! receive `None` and report "no data" instead of an error.

use crate::constants::OVERVIEW_HEAD;
use crate::rows::{
    CategorizedRow, CostAggregateRow, EncounterAggregateRow, PatientAggregateRow,
    ReadmissionTier, ScoredRow, Tier,
};
use serde::Serialize;

pub type ScoredPatient = ScoredRow<PatientAggregateRow, Tier>;
pub type ScoredReadmission = ScoredRow<EncounterAggregateRow, ReadmissionTier>;
pub type CategorizedCost = CategorizedRow<CostAggregateRow, Tier>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskOverview {
    pub total_patients_analyzed: usize,
    pub high_risk_count: usize,
    pub medium_risk_count: usize,
    pub low_risk_count: usize,
    pub top_high_risk_patients: Vec<ScoredPatient>,
}

impl RiskOverview {
    pub fn from_scored(rows: &[ScoredPatient]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let count = |tier: Tier| rows.iter().filter(|r| r.category == tier).count();
        Some(Self {
            total_patients_analyzed: rows.len(),
            high_risk_count: count(Tier::High),
            medium_risk_count: count(Tier::Medium),
            low_risk_count: count(Tier::Low),
            top_high_risk_patients: rows
                .iter()
                .filter(|r| r.category == Tier::High)
                .take(OVERVIEW_HEAD)
                .cloned()
                .collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadmissionOverview {
    pub total_patients_analyzed: usize,
    /// The head of the descending-score table.
    pub high_risk_patients: Vec<ScoredReadmission>,
}

impl ReadmissionOverview {
    pub fn from_scored(rows: &[ScoredReadmission]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        Some(Self {
            total_patients_analyzed: rows.len(),
            high_risk_patients: rows.iter().take(OVERVIEW_HEAD).cloned().collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostOverview {
    pub total_patients_analyzed: usize,
    pub total_healthcare_expenses: f64,
    pub average_cost_per_patient: f64,
    pub highest_cost_patients: Vec<CategorizedCost>,
}

impl CostOverview {
    pub fn from_categorized(rows: &[CategorizedCost]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let total: f64 = rows.iter().map(|r| r.row.total_cost).sum();
        Some(Self {
            total_patients_analyzed: rows.len(),
            total_healthcare_expenses: total,
            average_cost_per_patient: total / rows.len() as f64,
            highest_cost_patients: rows.iter().take(OVERVIEW_HEAD).cloned().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::Gender;
    use crate::scoring::{categorize_costs, score_patients, score_readmissions};

    fn patient(id: usize, conditions: u32) -> PatientAggregateRow {
        PatientAggregateRow {
            patient_id: format!("p{id}"),
            patient_name: format!("Patient {id}"),
            age: 20,
            gender: Gender::Male,
            condition_count: conditions,
            medication_count: 0,
            allergy_count: 0,
        }
    }

    #[test]
    fn test_risk_overview_counts_and_head() {
        // 20 + conditions × 15: 0 → 10 (Low), 2 → 40 (Medium), 5 → 85 (High)
        let mut rows: Vec<PatientAggregateRow> = (0..12).map(|i| patient(i, 5)).collect();
        rows.push(patient(100, 2));
        rows.push(patient(101, 0));
        let scored = score_patients(rows).unwrap();

        let overview = RiskOverview::from_scored(&scored).unwrap();
        assert_eq!(overview.total_patients_analyzed, 14);
        assert_eq!(overview.high_risk_count, 12);
        assert_eq!(overview.medium_risk_count, 1);
        assert_eq!(overview.low_risk_count, 1);
        assert_eq!(overview.top_high_risk_patients.len(), OVERVIEW_HEAD);
        assert_eq!(overview.top_high_risk_patients[0].row.patient_id, "p0");
    }

    #[test]
    fn test_empty_tables_have_no_overview() {
        assert!(RiskOverview::from_scored(&[]).is_none());
        assert!(ReadmissionOverview::from_scored(&[]).is_none());
        assert!(CostOverview::from_categorized(&[]).is_none());
    }

    #[test]
    fn test_readmission_overview_takes_head_of_sorted_table() {
        let rows = (0..3)
            .map(|i| EncounterAggregateRow {
                patient_id: format!("e{i}"),
                patient_name: format!("Encounter {i}"),
                age: 60,
                total_encounters: 4,
                emergency_visits: i,
                inpatient_visits: 0,
                avg_length_of_stay_days: 1.0,
            })
            .collect();
        let scored = score_readmissions(rows).unwrap();
        let overview = ReadmissionOverview::from_scored(&scored).unwrap();
        assert_eq!(overview.total_patients_analyzed, 3);
        assert_eq!(overview.high_risk_patients[0].row.patient_id, "e2");
    }

    #[test]
    fn test_cost_overview_totals() {
        let rows = [60_000.0, 20_000.0, 4_000.0]
            .iter()
            .enumerate()
            .map(|(i, cost)| CostAggregateRow {
                patient_id: format!("c{i}"),
                patient_name: format!("Cost {i}"),
                total_cost: *cost,
                coverage: 1_000.0,
                medication_count: 1,
                encounter_count: 1,
            })
            .collect();
        let categorized = categorize_costs(rows).unwrap();
        let overview = CostOverview::from_categorized(&categorized).unwrap();
        assert_eq!(overview.total_healthcare_expenses, 84_000.0);
        assert_eq!(overview.average_cost_per_patient, 28_000.0);
        assert_eq!(overview.highest_cost_patients[0].category, Tier::High);
        assert_eq!(overview.highest_cost_patients[2].category, Tier::Low);
    }
}
