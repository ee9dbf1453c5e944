//! Wire models for the HCA APIs.
//!
//! Field names follow the JSON contract of the analytics API: scored rows carry `risk_score` /
//! `risk_category`, `readmission_risk` / `risk_level` and `cost_category`, each holding the exact
//! tier label.

use hca_core::demographics::{AgeGroupCount, DemographicInsights, GenderCount, StateCount};
use hca_core::records::{
    ConditionPrevalence, DescriptionCount, EncounterClassSummary, MedicationOutcome,
    MedicationUsage, PatientDetail, PatientListing, ProviderWorkload, SeasonalCount,
    TimelineEntry,
};
use hca_core::reports::{
    CategorizedCost, CostOverview, ReadmissionOverview, RiskOverview, ScoredPatient,
    ScoredReadmission,
};
use hca_core::stats::NumericSummary;
use hca_core::ExecutiveSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    /// `healthy` or `unhealthy`
    pub status: String,
    pub database: Option<String>,
    pub error: Option<String>,
}

/// Informational body used when a report has no rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

impl MessageRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RootRes {
    pub message: String,
    pub version: String,
    pub endpoints: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SummaryRes {
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
    pub condition_rate: f64,
}

impl From<&ExecutiveSummary> for SummaryRes {
    fn from(s: &ExecutiveSummary) -> Self {
        Self {
            total_patients: s.total_patients,
            patients_with_active_conditions: s.patients_with_active_conditions,
            total_encounters: s.total_encounters,
            total_medications: s.total_medications,
            total_conditions: s.total_conditions,
            total_healthcare_costs: s.total_healthcare_costs,
            average_patient_age: s.average_patient_age,
            avg_encounters_per_patient: s.avg_encounters_per_patient,
            avg_medications_per_patient: s.avg_medications_per_patient,
            avg_conditions_per_patient: s.avg_conditions_per_patient,
            condition_rate: s.condition_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    pub id: String,
    pub first: String,
    pub last: String,
    pub birthdate: String,
    pub gender: String,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl From<&PatientListing> for PatientRes {
    fn from(p: &PatientListing) -> Self {
        Self {
            id: p.id.clone(),
            first: p.first.clone(),
            last: p.last.clone(),
            birthdate: p.birthdate.clone(),
            gender: p.gender.code().into(),
            city: p.city.clone(),
            state: p.state.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DescriptionCountRes {
    pub description: String,
    pub occurrences: u64,
}

impl From<&DescriptionCount> for DescriptionCountRes {
    fn from(d: &DescriptionCount) -> Self {
        Self {
            description: d.description.clone(),
            occurrences: d.occurrences,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MedicationRes {
    pub description: String,
    pub prescriptions: u64,
    pub unique_patients: u64,
    pub avg_cost: Option<f64>,
}

impl From<&MedicationUsage> for MedicationRes {
    fn from(m: &MedicationUsage) -> Self {
        Self {
            description: m.medication.clone(),
            prescriptions: m.prescriptions,
            unique_patients: m.unique_patients,
            avg_cost: m.avg_cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RiskScoreRes {
    pub patient_id: String,
    pub patient_name: String,
    pub age: u32,
    pub gender: String,
    pub condition_count: u32,
    pub medication_count: u32,
    pub allergy_count: u32,
    pub risk_score: f64,
    pub risk_category: String,
}

impl From<&ScoredPatient> for RiskScoreRes {
    fn from(s: &ScoredPatient) -> Self {
        Self {
            patient_id: s.row.patient_id.clone(),
            patient_name: s.row.patient_name.clone(),
            age: s.row.age,
            gender: s.row.gender.code().into(),
            condition_count: s.row.condition_count,
            medication_count: s.row.medication_count,
            allergy_count: s.row.allergy_count,
            risk_score: s.score,
            risk_category: s.category.label().into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RiskOverviewRes {
    pub total_patients_analyzed: usize,
    pub high_risk_count: usize,
    pub medium_risk_count: usize,
    pub low_risk_count: usize,
    pub top_high_risk_patients: Vec<RiskScoreRes>,
}

impl From<&RiskOverview> for RiskOverviewRes {
    fn from(o: &RiskOverview) -> Self {
        Self {
            total_patients_analyzed: o.total_patients_analyzed,
            high_risk_count: o.high_risk_count,
            medium_risk_count: o.medium_risk_count,
            low_risk_count: o.low_risk_count,
            top_high_risk_patients: o.top_high_risk_patients.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReadmissionRes {
    pub patient_id: String,
    pub patient_name: String,
    pub age: u32,
    pub total_encounters: u32,
    pub emergency_visits: u32,
    pub inpatient_visits: u32,
    pub avg_length_of_stay: f64,
    pub readmission_risk: f64,
    pub risk_level: String,
}

impl From<&ScoredReadmission> for ReadmissionRes {
    fn from(s: &ScoredReadmission) -> Self {
        Self {
            patient_id: s.row.patient_id.clone(),
            patient_name: s.row.patient_name.clone(),
            age: s.row.age,
            total_encounters: s.row.total_encounters,
            emergency_visits: s.row.emergency_visits,
            inpatient_visits: s.row.inpatient_visits,
            avg_length_of_stay: s.row.avg_length_of_stay_days,
            readmission_risk: s.score,
            risk_level: s.category.label().into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReadmissionOverviewRes {
    pub total_patients_analyzed: usize,
    pub high_risk_patients: Vec<ReadmissionRes>,
}

impl From<&ReadmissionOverview> for ReadmissionOverviewRes {
    fn from(o: &ReadmissionOverview) -> Self {
        Self {
            total_patients_analyzed: o.total_patients_analyzed,
            high_risk_patients: o.high_risk_patients.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CostRes {
    pub patient_id: String,
    pub patient_name: String,
    pub total_cost: f64,
    pub healthcare_coverage: f64,
    pub out_of_pocket: f64,
    pub medication_count: u32,
    pub encounter_count: u32,
    pub cost_category: String,
}

impl From<&CategorizedCost> for CostRes {
    fn from(c: &CategorizedCost) -> Self {
        Self {
            patient_id: c.row.patient_id.clone(),
            patient_name: c.row.patient_name.clone(),
            total_cost: c.row.total_cost,
            healthcare_coverage: c.row.coverage,
            out_of_pocket: c.row.out_of_pocket(),
            medication_count: c.row.medication_count,
            encounter_count: c.row.encounter_count,
            cost_category: c.category.label().into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CostOverviewRes {
    pub total_patients_analyzed: usize,
    pub total_healthcare_expenses: f64,
    pub average_cost_per_patient: f64,
    pub highest_cost_patients: Vec<CostRes>,
}

impl From<&CostOverview> for CostOverviewRes {
    fn from(o: &CostOverview) -> Self {
        Self {
            total_patients_analyzed: o.total_patients_analyzed,
            total_healthcare_expenses: o.total_healthcare_expenses,
            average_cost_per_patient: o.average_cost_per_patient,
            highest_cost_patients: o.highest_cost_patients.iter().map(Into::into).collect(),
        }
    }
}

/// Risk overview, or a message when no patient qualified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum RiskScoresRes {
    Overview(RiskOverviewRes),
    NoData(MessageRes),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ReadmissionRiskRes {
    Overview(ReadmissionOverviewRes),
    NoData(MessageRes),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CostAnalysisRes {
    Overview(CostOverviewRes),
    NoData(MessageRes),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NumericSummaryRes {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub total: f64,
}

impl From<&NumericSummary> for NumericSummaryRes {
    fn from(s: &NumericSummary) -> Self {
        Self {
            count: s.count,
            mean: s.mean,
            median: s.median,
            std_dev: s.std_dev,
            min: s.min,
            max: s.max,
            total: s.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GenderShareRes {
    pub gender: String,
    pub count: usize,
    pub percentage: f64,
}

impl From<&GenderCount> for GenderShareRes {
    fn from(g: &GenderCount) -> Self {
        Self {
            gender: g.gender.code().into(),
            count: g.count,
            percentage: g.percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StateCountRes {
    pub state: String,
    pub count: usize,
}

impl From<&StateCount> for StateCountRes {
    fn from(s: &StateCount) -> Self {
        Self {
            state: s.state.clone(),
            count: s.count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InsightsRes {
    pub cohort_size: usize,
    pub age_statistics: Option<NumericSummaryRes>,
    pub gender_distribution: Vec<GenderShareRes>,
    pub cost_statistics: Option<NumericSummaryRes>,
    pub top_states: Vec<StateCountRes>,
}

impl From<&DemographicInsights> for InsightsRes {
    fn from(i: &DemographicInsights) -> Self {
        Self {
            cohort_size: i.cohort_size,
            age_statistics: i.age_statistics.as_ref().map(Into::into),
            gender_distribution: i.gender_distribution.iter().map(Into::into).collect(),
            cost_statistics: i.cost_statistics.as_ref().map(Into::into),
            top_states: i.top_states.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AgeGroupRes {
    pub age_group: String,
    pub count: usize,
}

impl From<&AgeGroupCount> for AgeGroupRes {
    fn from(g: &AgeGroupCount) -> Self {
        Self {
            age_group: g.age_group.into(),
            count: g.count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SeasonalTrendRes {
    pub month: u32,
    pub description: String,
    pub count: u64,
}

impl From<&SeasonalCount> for SeasonalTrendRes {
    fn from(s: &SeasonalCount) -> Self {
        Self {
            month: s.month,
            description: s.description.clone(),
            count: s.count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MedicationOutcomeRes {
    pub medication: String,
    pub condition_treated: String,
    pub patient_count: u64,
    pub avg_duration_days: Option<f64>,
    pub avg_cost: Option<f64>,
}

impl From<&MedicationOutcome> for MedicationOutcomeRes {
    fn from(m: &MedicationOutcome) -> Self {
        Self {
            medication: m.medication.clone(),
            condition_treated: m.condition_treated.clone(),
            patient_count: m.patient_count,
            avg_duration_days: m.avg_duration_days,
            avg_cost: m.avg_cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EncounterClassRes {
    pub encounter_type: String,
    pub total_encounters: u64,
    pub avg_cost: Option<f64>,
    pub total_cost: Option<f64>,
}

impl From<&EncounterClassSummary> for EncounterClassRes {
    fn from(e: &EncounterClassSummary) -> Self {
        Self {
            encounter_type: e.encounter_type.clone(),
            total_encounters: e.total_encounters,
            avg_cost: e.avg_cost,
            total_cost: e.total_cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProviderRes {
    pub name: String,
    pub speciality: Option<String>,
    pub encounter_count: u64,
}

impl From<&ProviderWorkload> for ProviderRes {
    fn from(p: &ProviderWorkload) -> Self {
        Self {
            name: p.name.clone(),
            speciality: p.speciality.clone(),
            encounter_count: p.encounter_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConditionPrevalenceRes {
    pub condition: String,
    pub total_cases: u64,
    pub unique_patients: u64,
    pub avg_duration_days: Option<f64>,
}

impl From<&ConditionPrevalence> for ConditionPrevalenceRes {
    fn from(c: &ConditionPrevalence) -> Self {
        Self {
            condition: c.condition.clone(),
            total_cases: c.total_cases,
            unique_patients: c.unique_patients,
            avg_duration_days: c.avg_duration_days,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimelineRes {
    pub description: String,
    pub start: String,
    pub stop: Option<String>,
    pub detail: Option<String>,
}

impl From<&TimelineEntry> for TimelineRes {
    fn from(t: &TimelineEntry) -> Self {
        Self {
            description: t.description.clone(),
            start: t.start.clone(),
            stop: t.stop.clone(),
            detail: t.detail.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientDetailRes {
    pub patient: PatientRes,
    pub healthcare_expenses: f64,
    pub healthcare_coverage: f64,
    pub conditions: Vec<TimelineRes>,
    pub medications: Vec<TimelineRes>,
    pub encounters: Vec<TimelineRes>,
    pub allergies: Vec<TimelineRes>,
}

impl From<&PatientDetail> for PatientDetailRes {
    fn from(d: &PatientDetail) -> Self {
        Self {
            patient: (&d.patient).into(),
            healthcare_expenses: d.healthcare_expenses,
            healthcare_coverage: d.healthcare_coverage,
            conditions: d.conditions.iter().map(Into::into).collect(),
            medications: d.medications.iter().map(Into::into).collect(),
            encounters: d.encounters.iter().map(Into::into).collect(),
            allergies: d.allergies.iter().map(Into::into).collect(),
        }
    }
}

/// Converts every row of a slice.
pub fn convert_all<'a, S: 'a, T: From<&'a S>>(rows: &'a [S]) -> Vec<T> {
    rows.iter().map(T::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hca_core::scoring::{categorize_costs, score_readmissions};
    use hca_core::{CostAggregateRow, EncounterAggregateRow};

    #[test]
    fn test_readmission_res_uses_contract_field_names() {
        let scored = score_readmissions(vec![EncounterAggregateRow {
            patient_id: "p1".into(),
            patient_name: "Ann Lee".into(),
            age: 70,
            total_encounters: 5,
            emergency_visits: 3,
            inpatient_visits: 1,
            avg_length_of_stay_days: 2.5,
        }])
        .unwrap();

        let json = serde_json::to_value(ReadmissionRes::from(&scored[0])).unwrap();
        // 60 + 15 + 5 = 80
        assert_eq!(json["readmission_risk"], 80.0);
        assert_eq!(json["risk_level"], "High Risk");
        assert_eq!(json["avg_length_of_stay"], 2.5);
    }

    #[test]
    fn test_cost_res_carries_label_and_out_of_pocket() {
        let categorized = categorize_costs(vec![CostAggregateRow {
            patient_id: "p1".into(),
            patient_name: "Ann Lee".into(),
            total_cost: 50000.01,
            coverage: 10000.01,
            medication_count: 1,
            encounter_count: 2,
        }])
        .unwrap();

        let res = CostRes::from(&categorized[0]);
        assert_eq!(res.cost_category, "High");
        assert!((res.out_of_pocket - 40000.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_data_serializes_as_bare_message() {
        let res = CostAnalysisRes::NoData(MessageRes::new("No cost data available"));
        let json = serde_json::to_value(res).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "No cost data available" }));
    }

    #[test]
    fn test_insights_without_cohort() {
        let insights = DemographicInsights::from_members(&[]);
        let res = InsightsRes::from(&insights);
        assert_eq!(res.cohort_size, 0);
        assert!(res.age_statistics.is_none());
        assert!(res.gender_distribution.is_empty());
    }
}
