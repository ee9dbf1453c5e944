//! Executive summary.
//!
//! There is one canonical summary shape. It carries the headline totals, the per-patient
//! averages shown on the dashboard overview and the active-condition rate used by the API.

use crate::records::SummaryCounts;
use crate::stats::round_to;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveSummary {
    pub total_patients: u64,
    pub patients_with_active_conditions: u64,
    pub total_encounters: u64,
    pub total_medications: u64,
    pub total_conditions: u64,
    pub total_healthcare_costs: f64,
    pub average_patient_age: f64,
    pub avg_encounters_per_patient: f64,
    pub avg_medications_per_patient: f64,
    pub avg_conditions_per_patient: f64,
    /// Percentage of patients with at least one active condition.
    pub condition_rate: f64,
}

impl ExecutiveSummary {
    /// Derives ratios from raw counts. With zero patients every ratio is `0.0`.
    pub fn from_counts(counts: &SummaryCounts) -> Self {
        let per_patient = |total: u64| -> f64 {
            if counts.total_patients == 0 {
                0.0
            } else {
                round_to(total as f64 / counts.total_patients as f64, 1)
            }
        };

        let condition_rate = if counts.total_patients == 0 {
            0.0
        } else {
            round_to(
                counts.patients_with_active_conditions as f64 * 100.0
                    / counts.total_patients as f64,
                2,
            )
        };

        Self {
            total_patients: counts.total_patients,
            patients_with_active_conditions: counts.patients_with_active_conditions,
            total_encounters: counts.total_encounters,
            total_medications: counts.total_medications,
            total_conditions: counts.total_conditions,
            total_healthcare_costs: counts.total_healthcare_costs,
            average_patient_age: counts
                .average_patient_age
                .map_or(0.0, |age| round_to(age, 1)),
            avg_encounters_per_patient: per_patient(counts.total_encounters),
            avg_medications_per_patient: per_patient(counts.total_medications),
            avg_conditions_per_patient: per_patient(counts.total_conditions),
            condition_rate,
        }
    }

    /// `(metric, value)` pairs in display order, for tabular exports and the CLI.
    pub fn metrics(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Patients", self.total_patients.to_string()),
            (
                "Patients With Active Conditions",
                self.patients_with_active_conditions.to_string(),
            ),
            ("Total Encounters", self.total_encounters.to_string()),
            ("Total Medications", self.total_medications.to_string()),
            ("Total Conditions", self.total_conditions.to_string()),
            (
                "Total Healthcare Costs",
                format!("{:.2}", self.total_healthcare_costs),
            ),
            ("Average Patient Age", format!("{:.1}", self.average_patient_age)),
            (
                "Avg Encounters Per Patient",
                format!("{:.1}", self.avg_encounters_per_patient),
            ),
            (
                "Avg Medications Per Patient",
                format!("{:.1}", self.avg_medications_per_patient),
            ),
            (
                "Avg Conditions Per Patient",
                format!("{:.1}", self.avg_conditions_per_patient),
            ),
            ("Condition Rate (%)", format!("{:.2}", self.condition_rate)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_patients_has_zero_ratios() {
        let summary = ExecutiveSummary::from_counts(&SummaryCounts::default());
        assert_eq!(summary.total_patients, 0);
        assert_eq!(summary.avg_encounters_per_patient, 0.0);
        assert_eq!(summary.condition_rate, 0.0);
        assert_eq!(summary.average_patient_age, 0.0);
    }

    #[test]
    fn test_ratios_are_rounded() {
        let counts = SummaryCounts {
            total_patients: 3,
            patients_with_active_conditions: 2,
            total_encounters: 10,
            total_medications: 4,
            total_conditions: 5,
            total_healthcare_costs: 125_000.5,
            average_patient_age: Some(41.666),
        };
        let summary = ExecutiveSummary::from_counts(&counts);
        assert_eq!(summary.avg_encounters_per_patient, 3.3);
        assert_eq!(summary.avg_medications_per_patient, 1.3);
        assert_eq!(summary.avg_conditions_per_patient, 1.7);
        assert_eq!(summary.condition_rate, 66.67);
        assert_eq!(summary.average_patient_age, 41.7);
        assert_eq!(summary.total_healthcare_costs, 125_000.5);
    }

    #[test]
    fn test_metrics_are_listed_in_order() {
        let summary = ExecutiveSummary::from_counts(&SummaryCounts {
            total_patients: 2,
            ..SummaryCounts::default()
        });
        let metrics = summary.metrics();
        assert_eq!(metrics[0], ("Total Patients", "2".to_string()));
        assert_eq!(metrics.len(), 11);
    }
}
