//! The seam between the engine and the aggregation query layer.
//!
//! Implementations materialize every row before returning. Failures to reach the store must be
//! reported as [`AnalyticsError::SourceUnavailable`](crate::AnalyticsError::SourceUnavailable),
//! never as an empty table.

use crate::error::AnalyticsResult;
use crate::records::{
    ClinicalTable, CohortMember, ConditionPrevalence, DescriptionCount, EncounterClassSummary,
    MedicationOutcome, MedicationUsage, PatientCount, PatientDetail, PatientListing,
    ProviderWorkload, SeasonalCount, SummaryCounts,
};
use crate::rows::{CostAggregateRow, EncounterAggregateRow, PatientAggregateRow};
use chrono::NaiveDate;

pub trait AggregateSource {
    /// Patients with at least one active condition or medication, most conditions first.
    fn patient_aggregates(
        &self,
        reference_date: NaiveDate,
        limit: usize,
    ) -> AnalyticsResult<Vec<PatientAggregateRow>>;

    /// Patients with two or more encounters in the year ending at `reference_date`.
    fn encounter_aggregates(
        &self,
        reference_date: NaiveDate,
    ) -> AnalyticsResult<Vec<EncounterAggregateRow>>;

    /// Patients with positive healthcare expenses, most expensive first.
    fn cost_aggregates(&self, limit: usize) -> AnalyticsResult<Vec<CostAggregateRow>>;

    fn summary_counts(&self, reference_date: NaiveDate) -> AnalyticsResult<SummaryCounts>;

    /// Age, gender, expenses and state of every patient with positive expenses.
    fn cohort_members(&self, reference_date: NaiveDate) -> AnalyticsResult<Vec<CohortMember>>;

    /// Age of every patient.
    fn patient_ages(&self, reference_date: NaiveDate) -> AnalyticsResult<Vec<i64>>;

    /// Most frequent descriptions in `table`. `None` returns every description.
    fn description_counts(
        &self,
        table: ClinicalTable,
        limit: Option<usize>,
    ) -> AnalyticsResult<Vec<DescriptionCount>>;

    fn condition_prevalence(
        &self,
        reference_date: NaiveDate,
        limit: usize,
    ) -> AnalyticsResult<Vec<ConditionPrevalence>>;

    fn medication_usage(&self, limit: usize) -> AnalyticsResult<Vec<MedicationUsage>>;

    fn encounter_classes(&self) -> AnalyticsResult<Vec<EncounterClassSummary>>;

    fn immunizations_per_patient(&self) -> AnalyticsResult<Vec<PatientCount>>;

    fn patients(&self, limit: usize) -> AnalyticsResult<Vec<PatientListing>>;

    /// `Ok(None)` when no patient has this id.
    fn patient_detail(&self, patient_id: &str) -> AnalyticsResult<Option<PatientDetail>>;

    /// Condition onsets per month over the two years ending at `reference_date`.
    fn seasonal_condition_trends(
        &self,
        reference_date: NaiveDate,
    ) -> AnalyticsResult<Vec<SeasonalCount>>;

    /// Medications linked to the condition they treat, prescribed to at least `min_patients`.
    fn medication_effectiveness(
        &self,
        reference_date: NaiveDate,
        min_patients: u32,
        limit: usize,
    ) -> AnalyticsResult<Vec<MedicationOutcome>>;

    fn provider_workload(&self, limit: usize) -> AnalyticsResult<Vec<ProviderWorkload>>;

    /// Checks that the store is reachable and returns a version string.
    fn ping(&self) -> AnalyticsResult<String>;
}
