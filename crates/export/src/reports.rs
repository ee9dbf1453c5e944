//! Report builders.
//!
//! Each builder pulls its tables from an [`AnalyticsService`] and hands them to a
//! [`CsvExporter`]. Source failures propagate; they never produce an empty report.

use crate::constants::{
    COMMON_ALLERGIES_REPORT, COMMON_CONDITIONS_REPORT, COMPREHENSIVE_PATIENT_LIMIT,
    COMPREHENSIVE_TOP_LIMIT, COMPREHENSIVE_WORKBOOK, COST_REPORT, DEVICES_REPORT,
    EXECUTIVE_SUMMARY_WORKBOOK, IMMUNIZATIONS_REPORT, MEDICATIONS_REPORT, PATIENT_RISK_REPORT,
    PATIENT_WORKBOOK_PREFIX, READMISSION_REPORT, SUMMARY_TOP_CONDITIONS,
};
use crate::exporter::{sanitize_name, CsvExporter, Workbook};
use crate::records::{
    convert, CostRecord, ImmunizationRecord, MetricRecord, PatientInfoRecord, ReadmissionRecord,
    RiskScoreRecord,
};
use crate::ExportResult;
use hca_core::demographics::gender_distribution;
use hca_core::validation::validate_patient_id;
use hca_core::{AggregateSource, AnalyticsService, ClinicalTable};
use std::path::PathBuf;

/// Writes reports for one analytics service into one export directory.
#[derive(Debug)]
pub struct ReportExporter<'a, S> {
    service: &'a AnalyticsService<S>,
    exporter: CsvExporter,
}

impl<'a, S: AggregateSource> ReportExporter<'a, S> {
    pub fn new(service: &'a AnalyticsService<S>, exporter: CsvExporter) -> Self {
        Self { service, exporter }
    }

    /// Exports to the directory configured in the service's [`hca_core::CoreConfig`].
    pub fn from_config(service: &'a AnalyticsService<S>) -> Self {
        let exporter = CsvExporter::new(service.config().export_dir());
        Self::new(service, exporter)
    }

    /// Frequency reports: conditions, allergies, medications, devices and immunizations per
    /// patient.
    pub fn export_basic_reports(&self) -> ExportResult<Vec<PathBuf>> {
        let mut written = Vec::new();
        for (table, name) in [
            (ClinicalTable::Conditions, COMMON_CONDITIONS_REPORT),
            (ClinicalTable::Allergies, COMMON_ALLERGIES_REPORT),
            (ClinicalTable::Medications, MEDICATIONS_REPORT),
            (ClinicalTable::Devices, DEVICES_REPORT),
        ] {
            let counts = self.service.all_descriptions(table)?;
            written.push(self.exporter.write_table(name, &counts)?);
        }

        let immunizations = self.service.immunizations_per_patient()?;
        let rows: Vec<ImmunizationRecord> = convert(&immunizations);
        written.push(self.exporter.write_table(IMMUNIZATIONS_REPORT, &rows)?);

        Ok(written)
    }

    /// Patient risk, readmission risk and cost tables with their category labels.
    pub fn export_scored_reports(&self) -> ExportResult<Vec<PathBuf>> {
        let risk: Vec<RiskScoreRecord> = convert(&self.service.patient_risk_scores()?);
        let readmission: Vec<ReadmissionRecord> = convert(&self.service.readmission_risk()?);
        let costs: Vec<CostRecord> = convert(&self.service.cost_analysis()?);

        Ok(vec![
            self.exporter.write_table(PATIENT_RISK_REPORT, &risk)?,
            self.exporter.write_table(READMISSION_REPORT, &readmission)?,
            self.exporter.write_table(COST_REPORT, &costs)?,
        ])
    }

    /// Patients, top conditions, medications, cost analysis and encounter classes in one
    /// workbook.
    pub fn export_comprehensive_report(&self) -> ExportResult<PathBuf> {
        let patients = self.service.patients(COMPREHENSIVE_PATIENT_LIMIT)?;
        let conditions = self.service.condition_prevalence(COMPREHENSIVE_TOP_LIMIT)?;
        let medications = self.service.medication_usage(COMPREHENSIVE_TOP_LIMIT)?;
        let costs: Vec<CostRecord> = convert(&self.service.cost_analysis()?);
        let encounters = self.service.encounter_classes()?;

        let workbook = Workbook::new(COMPREHENSIVE_WORKBOOK)?
            .sheet("Patients", &patients)?
            .sheet("Top_Conditions", &conditions)?
            .sheet("Medications", &medications)?
            .sheet("Cost_Analysis", &costs)?
            .sheet("Encounters", &encounters)?;

        self.exporter.write_workbook(&workbook)
    }

    /// Headline metrics, gender split of every patient and the ten most common conditions.
    pub fn export_executive_summary(&self) -> ExportResult<PathBuf> {
        let summary = self.service.executive_summary()?;
        let metrics: Vec<MetricRecord> = summary
            .metrics()
            .into_iter()
            .map(|(metric, value)| MetricRecord { metric, value })
            .collect();

        let genders: Vec<_> = self
            .service
            .patients(usize::MAX)?
            .into_iter()
            .map(|p| p.gender)
            .collect();
        let gender_split = gender_distribution(&genders);

        let top_conditions = self
            .service
            .top_descriptions(ClinicalTable::Conditions, SUMMARY_TOP_CONDITIONS)?;

        let workbook = Workbook::new(EXECUTIVE_SUMMARY_WORKBOOK)?
            .sheet("Executive_Summary", &metrics)?
            .sheet("Gender_Distribution", &gender_split)?
            .sheet("Top_10_Conditions", &top_conditions)?;

        self.exporter.write_workbook(&workbook)
    }

    /// Everything recorded for one patient. `Ok(None)` if the patient does not exist.
    pub fn export_patient_report(&self, patient_id: &str) -> ExportResult<Option<PathBuf>> {
        let patient_id = validate_patient_id(patient_id)?;
        let Some(detail) = self.service.patient_detail(patient_id)? else {
            tracing::warn!("patient {patient_id} not found; no report written");
            return Ok(None);
        };

        let short_id: String = patient_id.chars().take(8).collect();
        let name = format!(
            "{PATIENT_WORKBOOK_PREFIX}_{}_{}_{}",
            sanitize_name(&detail.patient.first),
            sanitize_name(&detail.patient.last),
            short_id
        );

        let info = [PatientInfoRecord::from(&detail)];
        let workbook = Workbook::new(name)?
            .sheet("Patient_Info", &info)?
            .sheet("Conditions", &detail.conditions)?
            .sheet("Medications", &detail.medications)?
            .sheet("Encounters", &detail.encounters)?
            .sheet("Allergies", &detail.allergies)?;

        self.exporter.write_workbook(&workbook).map(Some)
    }
}
