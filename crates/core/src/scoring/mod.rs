//! Risk scoring and categorization.
//!
//! Each scorer is a pure function from materialized aggregate rows to scored rows. Scores are
//! clamped to `[SCORE_FLOOR, SCORE_CEILING]` and labelled through the bin tables defined here.

pub mod cost;
pub mod patient_risk;
pub mod readmission;

pub use cost::categorize_costs;
pub use patient_risk::{patient_risk_score, score_patients};
pub use readmission::{readmission_risk_score, score_readmissions};

use crate::bins::{Bin, BinTable};
use crate::constants::{SCORE_CEILING, SCORE_FLOOR};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::rows::{ReadmissionTier, Tier};

/// `[0,30] → Low`, `(30,60] → Medium`, `(60,100] → High`.
pub const PATIENT_RISK_BINS: BinTable<Tier> = BinTable::new(
    "patient risk",
    SCORE_FLOOR,
    &[
        Bin { upper: 30.0, label: Tier::Low },
        Bin { upper: 60.0, label: Tier::Medium },
        Bin { upper: SCORE_CEILING, label: Tier::High },
    ],
);

/// `[0,30] → Low Risk`, `(30,60] → Moderate Risk`, `(60,100] → High Risk`.
pub const READMISSION_BINS: BinTable<ReadmissionTier> = BinTable::new(
    "readmission risk",
    SCORE_FLOOR,
    &[
        Bin { upper: 30.0, label: ReadmissionTier::LowRisk },
        Bin { upper: 60.0, label: ReadmissionTier::ModerateRisk },
        Bin { upper: SCORE_CEILING, label: ReadmissionTier::HighRisk },
    ],
);

/// `[0,10000] → Low`, `(10000,50000] → Medium`, `(50000,∞) → High`.
pub const COST_BINS: BinTable<Tier> = BinTable::new(
    "total cost",
    0.0,
    &[
        Bin { upper: 10_000.0, label: Tier::Low },
        Bin { upper: 50_000.0, label: Tier::Medium },
        Bin { upper: f64::INFINITY, label: Tier::High },
    ],
);

pub(crate) fn clamp_score(raw: f64) -> f64 {
    raw.clamp(SCORE_FLOOR, SCORE_CEILING)
}

/// Classifies `value`, turning an unlabelled value into a malformed-row error for `field`.
pub(crate) fn classify<L: Copy>(
    table: &BinTable<L>,
    field: &'static str,
    value: f64,
) -> AnalyticsResult<L> {
    table.classify(value).ok_or_else(|| {
        AnalyticsError::malformed(
            field,
            format!("{value} falls outside the {} bins", table.name()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_risk_bins_just_above_boundaries() {
        assert_eq!(PATIENT_RISK_BINS.classify(30.0), Some(Tier::Low));
        assert_eq!(PATIENT_RISK_BINS.classify(30.0001), Some(Tier::Medium));
        assert_eq!(PATIENT_RISK_BINS.classify(60.0), Some(Tier::Medium));
        assert_eq!(PATIENT_RISK_BINS.classify(60.0001), Some(Tier::High));
    }

    #[test]
    fn test_readmission_bins_just_above_boundaries() {
        assert_eq!(READMISSION_BINS.classify(30.0), Some(ReadmissionTier::LowRisk));
        assert_eq!(READMISSION_BINS.classify(30.0001), Some(ReadmissionTier::ModerateRisk));
        assert_eq!(READMISSION_BINS.classify(60.0), Some(ReadmissionTier::ModerateRisk));
        assert_eq!(READMISSION_BINS.classify(60.0001), Some(ReadmissionTier::HighRisk));
    }
}
