//! Demographic breakdowns: age groups and cohort insights.

use crate::bins::{Bin, BinTable};
use crate::constants::TOP_STATES;
use crate::records::CohortMember;
use crate::rows::Gender;
use crate::stats::{summarize, FrequencyTable, NumericSummary};
use serde::Serialize;

/// `<18`, `18-30`, `31-45`, `46-60`, `61-75`, `>75` (ages are whole years).
pub const AGE_GROUP_BINS: BinTable<&'static str> = BinTable::new(
    "age group",
    0.0,
    &[
        Bin { upper: 17.0, label: "0-17" },
        Bin { upper: 30.0, label: "18-30" },
        Bin { upper: 45.0, label: "31-45" },
        Bin { upper: 60.0, label: "46-60" },
        Bin { upper: 75.0, label: "61-75" },
        Bin { upper: f64::INFINITY, label: "75+" },
    ],
);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeGroupCount {
    pub age_group: &'static str,
    pub count: usize,
}

/// Counts patients per age group. Empty groups are omitted; groups keep their natural order.
pub fn age_distribution(ages: &[i64]) -> Vec<AgeGroupCount> {
    let groups = FrequencyTable::from_values(
        ages.iter()
            .filter_map(|age| AGE_GROUP_BINS.classify(*age as f64)),
    );
    AGE_GROUP_BINS
        .labels()
        .filter_map(|label| {
            let count = groups.count_of(&label);
            (count > 0).then_some(AgeGroupCount {
                age_group: label,
                count,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenderCount {
    pub gender: Gender,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateCount {
    pub state: String,
    pub count: usize,
}

/// Statistical profile of the patients with recorded expenses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemographicInsights {
    pub cohort_size: usize,
    pub age_statistics: Option<NumericSummary>,
    pub gender_distribution: Vec<GenderCount>,
    pub cost_statistics: Option<NumericSummary>,
    pub top_states: Vec<StateCount>,
}

impl DemographicInsights {
    pub fn from_members(members: &[CohortMember]) -> Self {
        let ages: Vec<f64> = members.iter().map(|m| m.age as f64).collect();
        let costs: Vec<f64> = members.iter().map(|m| m.healthcare_expenses).collect();

        let genders: Vec<Gender> = members.iter().map(|m| m.gender).collect();

        let states =
            FrequencyTable::from_values(members.iter().filter_map(|m| m.state.clone()));
        let top_states = states
            .top_k(TOP_STATES)
            .into_iter()
            .map(|(state, count)| StateCount { state, count })
            .collect();

        Self {
            cohort_size: members.len(),
            age_statistics: summarize(&ages),
            gender_distribution: gender_distribution(&genders),
            cost_statistics: summarize(&costs),
            top_states,
        }
    }
}

/// Gender split with percentages, most frequent first.
pub fn gender_distribution(genders: &[Gender]) -> Vec<GenderCount> {
    FrequencyTable::from_values(genders.iter().copied())
        .shares()
        .into_iter()
        .map(|share| GenderCount {
            gender: share.value,
            count: share.count,
            percentage: share.percentage,
        })
        .collect()
}
