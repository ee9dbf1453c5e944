//! Readmission risk score.
//!
//! `raw = emergency × 20 + inpatient × 15 + avg length of stay × 2`, clamped to `[0, 100]`.
//! The scored table is returned highest risk first.

use super::{clamp_score, classify, READMISSION_BINS};
use crate::constants::{EMERGENCY_VISIT_WEIGHT, INPATIENT_VISIT_WEIGHT, LENGTH_OF_STAY_WEIGHT};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::rows::{EncounterAggregateRow, ReadmissionTier, ScoredRow};

/// Bounded readmission score for one patient.
///
/// A non-finite average length of stay propagates as NaN and is rejected by [`score_readmissions`].
pub fn readmission_risk_score(row: &EncounterAggregateRow) -> f64 {
    let raw = f64::from(row.emergency_visits) * EMERGENCY_VISIT_WEIGHT
        + f64::from(row.inpatient_visits) * INPATIENT_VISIT_WEIGHT
        + row.avg_length_of_stay_days * LENGTH_OF_STAY_WEIGHT;
    clamp_score(raw)
}

/// Scores every row and sorts the result by descending score. Ties keep their input order.
pub fn score_readmissions(
    rows: Vec<EncounterAggregateRow>,
) -> AnalyticsResult<Vec<ScoredRow<EncounterAggregateRow, ReadmissionTier>>> {
    let mut scored = rows
        .into_iter()
        .map(|row| {
            if row.avg_length_of_stay_days < 0.0 {
                return Err(AnalyticsError::malformed(
                    "avg_length_of_stay_days",
                    format!("negative length of stay {}", row.avg_length_of_stay_days),
                ));
            }
            let score = readmission_risk_score(&row);
            let category = classify(&READMISSION_BINS, "readmission_risk", score)?;
            Ok(ScoredRow {
                row,
                score,
                category,
            })
        })
        .collect::<AnalyticsResult<Vec<_>>>()?;

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, emergency: u32, inpatient: u32, stay: f64) -> EncounterAggregateRow {
        EncounterAggregateRow {
            patient_id: id.into(),
            patient_name: format!("Patient {id}"),
            age: 50,
            total_encounters: emergency + inpatient + 2,
            emergency_visits: emergency,
            inpatient_visits: inpatient,
            avg_length_of_stay_days: stay,
        }
    }

    #[test]
    fn test_single_emergency_visit_is_low_risk() {
        // 20 + 0 + 4 = 24
        let scored = score_readmissions(vec![row("a", 1, 0, 2.0)]).unwrap();
        assert_eq!(scored[0].score, 24.0);
        assert_eq!(scored[0].category, ReadmissionTier::LowRisk);
    }

    #[test]
    fn test_output_is_sorted_descending() {
        let scored = score_readmissions(vec![
            row("low", 0, 0, 1.0),
            row("high", 3, 2, 5.0),
            row("mid", 1, 1, 0.0),
            row("zero", 0, 0, 0.0),
        ])
        .unwrap();

        let ids: Vec<&str> = scored.iter().map(|s| s.row.patient_id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low", "zero"]);
        for pair in scored.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_ties_keep_input_order() {
        let scored =
            score_readmissions(vec![row("first", 1, 0, 0.0), row("second", 1, 0, 0.0)]).unwrap();
        assert_eq!(scored[0].row.patient_id, "first");
        assert_eq!(scored[1].row.patient_id, "second");
    }

    #[test]
    fn test_tiers_at_boundaries() {
        // 30 = 1 emergency + 5 days; 60 = 3 emergency; 60.5 = 3 emergency + 0.25 days
        let scored = score_readmissions(vec![
            row("thirty", 1, 0, 5.0),
            row("sixty", 3, 0, 0.0),
            row("above", 3, 0, 0.25),
        ])
        .unwrap();
        assert_eq!(scored[0].category, ReadmissionTier::HighRisk);
        assert_eq!(scored[1].category, ReadmissionTier::ModerateRisk);
        assert_eq!(scored[2].category, ReadmissionTier::LowRisk);
    }

    #[test]
    fn test_tiers_just_above_boundaries() {
        // stay 15.00005 -> 30.0001; stay 30.00005 -> 60.0001
        let scored = score_readmissions(vec![
            row("at-low", 0, 0, 15.0),
            row("over-low", 0, 0, 15.00005),
            row("at-moderate", 0, 0, 30.0),
            row("over-moderate", 0, 0, 30.00005),
        ])
        .unwrap();
        let tier = |id: &str| {
            scored
                .iter()
                .find(|s| s.row.patient_id == id)
                .map(|s| s.category)
                .unwrap()
        };
        assert_eq!(tier("at-low"), ReadmissionTier::LowRisk);
        assert_eq!(tier("over-low"), ReadmissionTier::ModerateRisk);
        assert_eq!(tier("at-moderate"), ReadmissionTier::ModerateRisk);
        assert_eq!(tier("over-moderate"), ReadmissionTier::HighRisk);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let input = vec![row("a", 2, 1, 3.5), row("b", 0, 0, 0.0), row("c", 1, 1, 1.0)];
        let first = score_readmissions(input.clone()).unwrap();
        let second = score_readmissions(input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_score_is_clamped() {
        let scored = score_readmissions(vec![row("busy", 10, 10, 30.0)]).unwrap();
        assert_eq!(scored[0].score, 100.0);
        assert_eq!(scored[0].category, ReadmissionTier::HighRisk);
    }

    #[test]
    fn test_empty_input_is_empty_output() {
        assert!(score_readmissions(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_non_finite_stay_is_rejected() {
        let err = score_readmissions(vec![row("nan", 1, 0, f64::NAN)]).unwrap_err();
        assert!(matches!(err, AnalyticsError::MalformedRow { .. }));
    }

    #[test]
    fn test_negative_stay_is_rejected() {
        let err = score_readmissions(vec![row("neg", 0, 0, -3.0)]).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::MalformedRow {
                field: "avg_length_of_stay_days",
                ..
            }
        ));
    }
}
