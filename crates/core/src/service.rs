//! Analytics service.
//!
//! Pulls materialized tables from an [`AggregateSource`] and runs them through the scoring
//! engine. The service itself holds no mutable state; each call is independent.

use crate::config::CoreConfig;
use crate::constants::OVERVIEW_HEAD;
use crate::demographics::{age_distribution, AgeGroupCount, DemographicInsights};
use crate::error::AnalyticsResult;
use crate::records::{
    ClinicalTable, ConditionPrevalence, DescriptionCount, EncounterClassSummary,
    MedicationOutcome, MedicationUsage, PatientCount, PatientDetail, PatientListing,
    ProviderWorkload, SeasonalCount,
};
use crate::reports::{CategorizedCost, ScoredPatient, ScoredReadmission};
use crate::scoring::{categorize_costs, score_patients, score_readmissions};
use crate::source::AggregateSource;
use crate::summary::ExecutiveSummary;
use std::sync::Arc;

/// Minimum distinct patients for a medication/condition pairing to be reported.
const MIN_PATIENTS_PER_OUTCOME: u32 = 5;

/// Number of pairings returned by [`AnalyticsService::medication_effectiveness`].
const OUTCOME_LIMIT: usize = 30;

#[derive(Clone, Debug)]
pub struct AnalyticsService<S> {
    cfg: Arc<CoreConfig>,
    source: S,
}

impl<S: AggregateSource> AnalyticsService<S> {
    pub fn new(cfg: Arc<CoreConfig>, source: S) -> Self {
        Self { cfg, source }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    /// Patient risk scores in query order (most conditions first).
    pub fn patient_risk_scores(&self) -> AnalyticsResult<Vec<ScoredPatient>> {
        let rows = self
            .source
            .patient_aggregates(self.cfg.reference_date(), self.cfg.row_limit())?;
        let scored = score_patients(rows)?;
        tracing::info!("scored {} patients for risk", scored.len());
        Ok(scored)
    }

    /// Readmission risk, highest score first.
    pub fn readmission_risk(&self) -> AnalyticsResult<Vec<ScoredReadmission>> {
        let rows = self.source.encounter_aggregates(self.cfg.reference_date())?;
        let scored = score_readmissions(rows)?;
        tracing::info!("scored {} patients for readmission", scored.len());
        Ok(scored)
    }

    /// Cost categories in query order (most expensive first).
    pub fn cost_analysis(&self) -> AnalyticsResult<Vec<CategorizedCost>> {
        let rows = self.source.cost_aggregates(self.cfg.row_limit())?;
        let categorized = categorize_costs(rows)?;
        tracing::info!("categorized costs for {} patients", categorized.len());
        Ok(categorized)
    }

    pub fn executive_summary(&self) -> AnalyticsResult<ExecutiveSummary> {
        let counts = self.source.summary_counts(self.cfg.reference_date())?;
        Ok(ExecutiveSummary::from_counts(&counts))
    }

    pub fn demographic_insights(&self) -> AnalyticsResult<DemographicInsights> {
        let members = self.source.cohort_members(self.cfg.reference_date())?;
        Ok(DemographicInsights::from_members(&members))
    }

    pub fn age_distribution(&self) -> AnalyticsResult<Vec<AgeGroupCount>> {
        let ages = self.source.patient_ages(self.cfg.reference_date())?;
        Ok(age_distribution(&ages))
    }

    pub fn top_descriptions(
        &self,
        table: ClinicalTable,
        limit: usize,
    ) -> AnalyticsResult<Vec<DescriptionCount>> {
        self.source.description_counts(table, Some(limit))
    }

    pub fn all_descriptions(&self, table: ClinicalTable) -> AnalyticsResult<Vec<DescriptionCount>> {
        self.source.description_counts(table, None)
    }

    pub fn condition_prevalence(&self, limit: usize) -> AnalyticsResult<Vec<ConditionPrevalence>> {
        self.source
            .condition_prevalence(self.cfg.reference_date(), limit)
    }

    pub fn medication_usage(&self, limit: usize) -> AnalyticsResult<Vec<MedicationUsage>> {
        self.source.medication_usage(limit)
    }

    pub fn encounter_classes(&self) -> AnalyticsResult<Vec<EncounterClassSummary>> {
        self.source.encounter_classes()
    }

    pub fn immunizations_per_patient(&self) -> AnalyticsResult<Vec<PatientCount>> {
        self.source.immunizations_per_patient()
    }

    pub fn patients(&self, limit: usize) -> AnalyticsResult<Vec<PatientListing>> {
        self.source.patients(limit)
    }

    pub fn patient_detail(&self, patient_id: &str) -> AnalyticsResult<Option<PatientDetail>> {
        self.source.patient_detail(patient_id)
    }

    pub fn seasonal_trends(&self) -> AnalyticsResult<Vec<SeasonalCount>> {
        self.source
            .seasonal_condition_trends(self.cfg.reference_date())
    }

    pub fn medication_effectiveness(&self) -> AnalyticsResult<Vec<MedicationOutcome>> {
        self.source.medication_effectiveness(
            self.cfg.reference_date(),
            MIN_PATIENTS_PER_OUTCOME,
            OUTCOME_LIMIT,
        )
    }

    pub fn provider_workload(&self) -> AnalyticsResult<Vec<ProviderWorkload>> {
        self.source.provider_workload(OVERVIEW_HEAD * 2)
    }

    pub fn ping(&self) -> AnalyticsResult<String> {
        self.source.ping()
    }
}
