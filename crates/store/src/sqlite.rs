//! SQLite implementation of [`AggregateSource`].
//!
//! Every call opens its own read-only connection and drops it before returning, so a source can
//! be shared freely between request handlers. Values from callers (reference date, limits,
//! patient ids) are always bound as parameters.
//!
//! Rows are read as raw SQLite values inside the statement closures and converted afterwards,
//! so that a NULL or negative count surfaces as [`AnalyticsError::MalformedRow`] naming the
//! offending column instead of a generic driver error.

use crate::error::StoreResult;
use crate::schema::open_read_only;
use chrono::NaiveDate;
use hca_core::constants::{
    MIN_READMISSION_ENCOUNTERS, READMISSION_WINDOW_YEARS, SEASONAL_WINDOW_YEARS,
};
use hca_core::records::{
    ClinicalTable, CohortMember, ConditionPrevalence, DescriptionCount, EncounterClassSummary,
    MedicationOutcome, MedicationUsage, PatientCount, PatientDetail, PatientListing,
    ProviderWorkload, SeasonalCount, SummaryCounts, TimelineEntry,
};
use hca_core::{
    AggregateSource, AnalyticsError, AnalyticsResult, CostAggregateRow, EncounterAggregateRow,
    Gender, PatientAggregateRow,
};
use rusqlite::{Connection, OptionalExtension, Params, Row};
use std::path::PathBuf;

/// An [`AggregateSource`] backed by a SQLite database file.
#[derive(Clone, Debug)]
pub struct SqliteSource {
    path: PathBuf,
}

impl SqliteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn connect(&self) -> StoreResult<Connection> {
        open_read_only(&self.path)
    }

    /// Runs `sql` on a fresh connection and materializes every row.
    fn fetch<T, P, F>(&self, sql: &str, params: P, map: F) -> StoreResult<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.connect()?;
        let rows = query_all(&conn, sql, params, map)?;
        tracing::debug!("query returned {} rows", rows.len());
        Ok(rows)
    }
}

fn query_all<T, P, F>(conn: &Connection, sql: &str, params: P, map: F) -> StoreResult<Vec<T>>
where
    P: Params,
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, map)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// SQLite date modifier for a window of `years` ending at the reference date.
fn years_back(years: u32) -> String {
    format!("-{years} years")
}

/// SQLite treats a negative LIMIT as "no limit".
fn sql_limit(limit: Option<usize>) -> i64 {
    limit.map_or(-1, |limit| i64::try_from(limit).unwrap_or(i64::MAX))
}

fn required<T>(value: Option<T>, field: &'static str) -> AnalyticsResult<T> {
    value.ok_or_else(|| AnalyticsError::malformed(field, "value is NULL"))
}

fn count(value: i64, field: &'static str) -> AnalyticsResult<u32> {
    u32::try_from(value)
        .map_err(|_| AnalyticsError::malformed(field, format!("expected a count, got {value}")))
}

fn total(value: i64, field: &'static str) -> AnalyticsResult<u64> {
    u64::try_from(value)
        .map_err(|_| AnalyticsError::malformed(field, format!("expected a count, got {value}")))
}

fn age(value: Option<i64>) -> AnalyticsResult<u32> {
    count(required(value, "age")?, "age")
}

fn gender(code: Option<String>) -> Gender {
    code.as_deref().map_or(Gender::Unknown, Gender::from_code)
}

fn timeline_entry(row: &Row<'_>) -> rusqlite::Result<TimelineEntry> {
    Ok(TimelineEntry {
        description: row.get(0)?,
        start: row.get(1)?,
        stop: row.get(2)?,
        detail: row.get(3)?,
    })
}

type PatientRaw = (String, String, Option<i64>, Option<String>, i64, i64, i64);
type EncounterRaw = (String, String, Option<i64>, i64, i64, i64, f64);
type CostRaw = (String, String, f64, f64, i64, i64);

impl AggregateSource for SqliteSource {
    fn patient_aggregates(
        &self,
        reference_date: NaiveDate,
        limit: usize,
    ) -> AnalyticsResult<Vec<PatientAggregateRow>> {
        let raw: Vec<PatientRaw> = self.fetch(
            r"
            SELECT p.id,
                   p.first || ' ' || p.last,
                   CAST(strftime('%Y', ?1) AS INTEGER) - CAST(strftime('%Y', p.birthdate) AS INTEGER),
                   p.gender,
                   COUNT(DISTINCT c.description) AS condition_count,
                   COUNT(DISTINCT m.description) AS medication_count,
                   COUNT(DISTINCT a.description) AS allergy_count
            FROM patients p
            LEFT JOIN conditions c ON c.patient = p.id AND c.stop IS NULL
            LEFT JOIN medications m ON m.patient = p.id
            LEFT JOIN allergies a ON a.patient = p.id
            GROUP BY p.id
            HAVING condition_count > 0 OR medication_count > 0
            ORDER BY condition_count DESC, medication_count DESC, p.id
            LIMIT ?2
            ",
            (iso(reference_date), sql_limit(Some(limit))),
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            },
        )?;

        raw.into_iter()
            .map(|(patient_id, patient_name, years, code, conditions, medications, allergies)| {
                Ok(PatientAggregateRow {
                    patient_id,
                    patient_name,
                    age: age(years)?,
                    gender: gender(code),
                    condition_count: count(conditions, "condition_count")?,
                    medication_count: count(medications, "medication_count")?,
                    allergy_count: count(allergies, "allergy_count")?,
                })
            })
            .collect()
    }

    fn encounter_aggregates(
        &self,
        reference_date: NaiveDate,
    ) -> AnalyticsResult<Vec<EncounterAggregateRow>> {
        let raw: Vec<EncounterRaw> = self.fetch(
            r"
            SELECT p.id,
                   p.first || ' ' || p.last,
                   CAST(strftime('%Y', ?1) AS INTEGER) - CAST(strftime('%Y', p.birthdate) AS INTEGER),
                   COUNT(e.id) AS total_encounters,
                   SUM(CASE WHEN e.encounterclass = 'emergency' THEN 1 ELSE 0 END),
                   SUM(CASE WHEN e.encounterclass = 'inpatient' THEN 1 ELSE 0 END),
                   COALESCE(AVG(CAST(julianday(e.stop) - julianday(e.start) AS INTEGER)), 0.0)
            FROM patients p
            JOIN encounters e ON e.patient = p.id
            WHERE date(e.start) >= date(?1, ?2)
              AND date(e.start) <= date(?1)
            GROUP BY p.id
            HAVING total_encounters >= ?3
            ORDER BY p.id
            ",
            (
                iso(reference_date),
                years_back(READMISSION_WINDOW_YEARS),
                i64::from(MIN_READMISSION_ENCOUNTERS),
            ),
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            },
        )?;

        raw.into_iter()
            .map(|(patient_id, patient_name, years, encounters, emergency, inpatient, stay)| {
                Ok(EncounterAggregateRow {
                    patient_id,
                    patient_name,
                    age: age(years)?,
                    total_encounters: count(encounters, "total_encounters")?,
                    emergency_visits: count(emergency, "emergency_visits")?,
                    inpatient_visits: count(inpatient, "inpatient_visits")?,
                    avg_length_of_stay_days: stay,
                })
            })
            .collect()
    }

    fn cost_aggregates(&self, limit: usize) -> AnalyticsResult<Vec<CostAggregateRow>> {
        let raw: Vec<CostRaw> = self.fetch(
            r"
            SELECT p.id,
                   p.first || ' ' || p.last,
                   p.healthcare_expenses,
                   COALESCE(p.healthcare_coverage, 0.0),
                   COUNT(DISTINCT m.id),
                   COUNT(DISTINCT e.id)
            FROM patients p
            LEFT JOIN medications m ON m.patient = p.id
            LEFT JOIN encounters e ON e.patient = p.id
            WHERE p.healthcare_expenses > 0
            GROUP BY p.id
            ORDER BY p.healthcare_expenses DESC, p.id
            LIMIT ?1
            ",
            [sql_limit(Some(limit))],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            },
        )?;

        raw.into_iter()
            .map(|(patient_id, patient_name, total_cost, coverage, medications, encounters)| {
                Ok(CostAggregateRow {
                    patient_id,
                    patient_name,
                    total_cost,
                    coverage,
                    medication_count: count(medications, "medication_count")?,
                    encounter_count: count(encounters, "encounter_count")?,
                })
            })
            .collect()
    }

    fn summary_counts(&self, reference_date: NaiveDate) -> AnalyticsResult<SummaryCounts> {
        let mut raw = self.fetch(
            r"
            SELECT (SELECT COUNT(*) FROM patients),
                   (SELECT COUNT(DISTINCT patient) FROM conditions WHERE stop IS NULL),
                   (SELECT COUNT(*) FROM encounters),
                   (SELECT COUNT(*) FROM medications),
                   (SELECT COUNT(*) FROM conditions),
                   (SELECT COALESCE(SUM(healthcare_expenses), 0.0) FROM patients),
                   (SELECT AVG(CAST(strftime('%Y', ?1) AS INTEGER)
                               - CAST(strftime('%Y', birthdate) AS INTEGER))
                    FROM patients),
                   (SELECT MIN(CAST(strftime('%Y', ?1) AS INTEGER)
                               - CAST(strftime('%Y', birthdate) AS INTEGER))
                    FROM patients)
            ",
            [iso(reference_date)],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, f64>(5)?,
                    row.get::<_, Option<f64>>(6)?,
                    row.get::<_, Option<i64>>(7)?,
                ))
            },
        )?;

        let (patients, active, encounters, medications, conditions, costs, average_age, youngest) =
            raw.pop().ok_or_else(|| {
                AnalyticsError::malformed("total_patients", "summary query returned no row")
            })?;

        // The average only holds when every age is non-negative.
        if let Some(youngest) = youngest {
            count(youngest, "age")?;
        }

        Ok(SummaryCounts {
            total_patients: total(patients, "total_patients")?,
            patients_with_active_conditions: total(active, "patients_with_active_conditions")?,
            total_encounters: total(encounters, "total_encounters")?,
            total_medications: total(medications, "total_medications")?,
            total_conditions: total(conditions, "total_conditions")?,
            total_healthcare_costs: costs,
            average_patient_age: average_age,
        })
    }

    fn cohort_members(&self, reference_date: NaiveDate) -> AnalyticsResult<Vec<CohortMember>> {
        let raw: Vec<(Option<i64>, Option<String>, f64, Option<String>)> = self.fetch(
            r"
            SELECT CAST(strftime('%Y', ?1) AS INTEGER) - CAST(strftime('%Y', birthdate) AS INTEGER),
                   gender,
                   healthcare_expenses,
                   state
            FROM patients
            WHERE healthcare_expenses > 0
            ORDER BY id
            ",
            [iso(reference_date)],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        raw.into_iter()
            .map(|(years, code, healthcare_expenses, state)| {
                Ok(CohortMember {
                    age: i64::from(age(years)?),
                    gender: gender(code),
                    healthcare_expenses,
                    state,
                })
            })
            .collect()
    }

    fn patient_ages(&self, reference_date: NaiveDate) -> AnalyticsResult<Vec<i64>> {
        let raw: Vec<Option<i64>> = self.fetch(
            r"
            SELECT CAST(strftime('%Y', ?1) AS INTEGER) - CAST(strftime('%Y', birthdate) AS INTEGER)
            FROM patients
            ",
            [iso(reference_date)],
            |row| row.get(0),
        )?;

        raw.into_iter()
            .map(|years| age(years).map(i64::from))
            .collect()
    }

    fn description_counts(
        &self,
        table: ClinicalTable,
        limit: Option<usize>,
    ) -> AnalyticsResult<Vec<DescriptionCount>> {
        // The table name comes from a closed enum, never from callers.
        let sql = format!(
            "SELECT description, COUNT(*) AS occurrences
             FROM {}
             GROUP BY description
             ORDER BY occurrences DESC, description
             LIMIT ?1",
            table.table_name()
        );
        let raw: Vec<(String, i64)> =
            self.fetch(&sql, [sql_limit(limit)], |row| Ok((row.get(0)?, row.get(1)?)))?;

        raw.into_iter()
            .map(|(description, occurrences)| {
                Ok(DescriptionCount {
                    description,
                    occurrences: total(occurrences, "occurrences")?,
                })
            })
            .collect()
    }

    fn condition_prevalence(
        &self,
        reference_date: NaiveDate,
        limit: usize,
    ) -> AnalyticsResult<Vec<ConditionPrevalence>> {
        let raw: Vec<(String, i64, i64, Option<f64>)> = self.fetch(
            r"
            SELECT description,
                   COUNT(*) AS total_cases,
                   COUNT(DISTINCT patient),
                   ROUND(AVG(julianday(date(COALESCE(stop, ?1))) - julianday(date(start))))
            FROM conditions
            GROUP BY description
            ORDER BY total_cases DESC, description
            LIMIT ?2
            ",
            (iso(reference_date), sql_limit(Some(limit))),
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        raw.into_iter()
            .map(|(condition, cases, patients, avg_duration_days)| {
                Ok(ConditionPrevalence {
                    condition,
                    total_cases: total(cases, "total_cases")?,
                    unique_patients: total(patients, "unique_patients")?,
                    avg_duration_days,
                })
            })
            .collect()
    }

    fn medication_usage(&self, limit: usize) -> AnalyticsResult<Vec<MedicationUsage>> {
        let raw: Vec<(String, i64, i64, Option<f64>, Option<f64>)> = self.fetch(
            r"
            SELECT description,
                   COUNT(*) AS prescriptions,
                   COUNT(DISTINCT patient),
                   ROUND(AVG(base_cost), 2),
                   ROUND(SUM(base_cost), 2)
            FROM medications
            GROUP BY description
            ORDER BY prescriptions DESC, description
            LIMIT ?1
            ",
            [sql_limit(Some(limit))],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                ))
            },
        )?;

        raw.into_iter()
            .map(|(medication, prescriptions, patients, avg_cost, total_cost)| {
                Ok(MedicationUsage {
                    medication,
                    prescriptions: total(prescriptions, "prescriptions")?,
                    unique_patients: total(patients, "unique_patients")?,
                    avg_cost,
                    total_cost,
                })
            })
            .collect()
    }

    fn encounter_classes(&self) -> AnalyticsResult<Vec<EncounterClassSummary>> {
        let raw: Vec<(Option<String>, i64, Option<f64>, Option<f64>)> = self.fetch(
            r"
            SELECT encounterclass,
                   COUNT(*) AS total_encounters,
                   ROUND(AVG(base_encounter_cost), 2),
                   ROUND(SUM(base_encounter_cost), 2)
            FROM encounters
            GROUP BY encounterclass
            ORDER BY total_encounters DESC, encounterclass
            ",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        raw.into_iter()
            .map(|(class, encounters, avg_cost, total_cost)| {
                Ok(EncounterClassSummary {
                    encounter_type: class.unwrap_or_else(|| "unknown".into()),
                    total_encounters: total(encounters, "total_encounters")?,
                    avg_cost,
                    total_cost,
                })
            })
            .collect()
    }

    fn immunizations_per_patient(&self) -> AnalyticsResult<Vec<PatientCount>> {
        let raw: Vec<(String, i64)> = self.fetch(
            r"
            SELECT patient, COUNT(*) AS immunization_count
            FROM immunizations
            GROUP BY patient
            ORDER BY immunization_count DESC, patient
            ",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        raw.into_iter()
            .map(|(patient, n)| {
                Ok(PatientCount {
                    patient,
                    count: total(n, "immunization_count")?,
                })
            })
            .collect()
    }

    fn patients(&self, limit: usize) -> AnalyticsResult<Vec<PatientListing>> {
        let listings = self.fetch(
            r"
            SELECT id, first, last, COALESCE(birthdate, ''), gender, city, state
            FROM patients
            ORDER BY last, first, id
            LIMIT ?1
            ",
            [sql_limit(Some(limit))],
            patient_listing,
        )?;
        Ok(listings)
    }

    fn patient_detail(&self, patient_id: &str) -> AnalyticsResult<Option<PatientDetail>> {
        let conn = self.connect()?;
        Ok(load_patient_detail(&conn, patient_id)?)
    }

    fn seasonal_condition_trends(
        &self,
        reference_date: NaiveDate,
    ) -> AnalyticsResult<Vec<SeasonalCount>> {
        let raw: Vec<(Option<i64>, String, i64)> = self.fetch(
            r"
            SELECT CAST(strftime('%m', start) AS INTEGER) AS month,
                   description,
                   COUNT(*) AS count
            FROM conditions
            WHERE start IS NOT NULL
              AND date(start) >= date(?1, ?2)
              AND date(start) <= date(?1)
            GROUP BY month, description
            ORDER BY month, count DESC, description
            ",
            (iso(reference_date), years_back(SEASONAL_WINDOW_YEARS)),
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        raw.into_iter()
            .map(|(month, description, n)| {
                Ok(SeasonalCount {
                    month: count(required(month, "month")?, "month")?,
                    description,
                    count: total(n, "count")?,
                })
            })
            .collect()
    }

    fn medication_effectiveness(
        &self,
        reference_date: NaiveDate,
        min_patients: u32,
        limit: usize,
    ) -> AnalyticsResult<Vec<MedicationOutcome>> {
        let raw: Vec<(String, String, i64, Option<f64>, Option<f64>)> = self.fetch(
            r"
            SELECT m.description AS medication,
                   c.description AS condition_treated,
                   COUNT(DISTINCT m.patient) AS patient_count,
                   AVG(julianday(date(COALESCE(m.stop, ?1))) - julianday(date(m.start))),
                   AVG(m.base_cost)
            FROM medications m
            JOIN conditions c ON c.patient = m.patient AND c.code = m.reasoncode
            WHERE m.reasoncode IS NOT NULL
            GROUP BY m.description, c.description
            HAVING patient_count >= ?2
            ORDER BY patient_count DESC, medication, condition_treated
            LIMIT ?3
            ",
            (iso(reference_date), i64::from(min_patients), sql_limit(Some(limit))),
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                ))
            },
        )?;

        raw.into_iter()
            .map(|(medication, condition_treated, patients, avg_duration_days, avg_cost)| {
                Ok(MedicationOutcome {
                    medication,
                    condition_treated,
                    patient_count: total(patients, "patient_count")?,
                    avg_duration_days,
                    avg_cost,
                })
            })
            .collect()
    }

    fn provider_workload(&self, limit: usize) -> AnalyticsResult<Vec<ProviderWorkload>> {
        let raw: Vec<(String, Option<String>, i64)> = self.fetch(
            r"
            SELECT pr.name, pr.speciality, COUNT(e.id) AS encounter_count
            FROM providers pr
            LEFT JOIN encounters e ON e.provider = pr.id
            GROUP BY pr.id
            ORDER BY encounter_count DESC, pr.name
            LIMIT ?1
            ",
            [sql_limit(Some(limit))],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        raw.into_iter()
            .map(|(name, speciality, encounters)| {
                Ok(ProviderWorkload {
                    name,
                    speciality,
                    encounter_count: total(encounters, "encounter_count")?,
                })
            })
            .collect()
    }

    fn ping(&self) -> AnalyticsResult<String> {
        let conn = self.connect()?;
        let version: String = conn
            .query_row("SELECT sqlite_version()", [], |row| row.get(0))
            .map_err(crate::error::StoreError::from)?;
        Ok(format!("SQLite {version}"))
    }
}

fn patient_listing(row: &Row<'_>) -> rusqlite::Result<PatientListing> {
    Ok(PatientListing {
        id: row.get(0)?,
        first: row.get(1)?,
        last: row.get(2)?,
        birthdate: row.get(3)?,
        gender: gender(row.get(4)?),
        city: row.get(5)?,
        state: row.get(6)?,
    })
}

fn load_patient_detail(conn: &Connection, patient_id: &str) -> StoreResult<Option<PatientDetail>> {
    let header = conn
        .query_row(
            r"
            SELECT id, first, last, COALESCE(birthdate, ''), gender, city, state,
                   COALESCE(healthcare_expenses, 0.0), COALESCE(healthcare_coverage, 0.0)
            FROM patients
            WHERE id = ?1
            ",
            [patient_id],
            |row| Ok((patient_listing(row)?, row.get::<_, f64>(7)?, row.get::<_, f64>(8)?)),
        )
        .optional()?;

    let Some((patient, healthcare_expenses, healthcare_coverage)) = header else {
        return Ok(None);
    };

    let conditions = query_all(
        conn,
        r"
        SELECT description, COALESCE(start, ''), stop, NULL
        FROM conditions
        WHERE patient = ?1
        ORDER BY start DESC
        ",
        [patient_id],
        timeline_entry,
    )?;

    let medications = query_all(
        conn,
        r"
        SELECT description, COALESCE(start, ''), stop,
               COALESCE(reasondescription, printf('%.2f', base_cost))
        FROM medications
        WHERE patient = ?1
        ORDER BY start DESC
        ",
        [patient_id],
        timeline_entry,
    )?;

    let encounters = query_all(
        conn,
        r"
        SELECT COALESCE(description, encounterclass, ''), COALESCE(start, ''), stop, encounterclass
        FROM encounters
        WHERE patient = ?1
        ORDER BY start DESC
        ",
        [patient_id],
        timeline_entry,
    )?;

    let allergies = query_all(
        conn,
        r"
        SELECT description, COALESCE(start, ''), stop, NULL
        FROM allergies
        WHERE patient = ?1
        ORDER BY start DESC
        ",
        [patient_id],
        timeline_entry,
    )?;

    Ok(Some(PatientDetail {
        patient,
        healthcare_expenses,
        healthcare_coverage,
        conditions,
        medications,
        encounters,
        allergies,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::initialise;
    use tempfile::TempDir;

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    const FIXTURE: &str = r"
        INSERT INTO patients (id, birthdate, first, last, gender, city, state, healthcare_expenses, healthcare_coverage) VALUES
            ('p1', '1950-03-01', 'Ann', 'Lee', 'F', 'Boston', 'MA', 60000.0, 10000.0),
            ('p2', '1990-07-15', 'Bob', 'Ray', 'M', 'Austin', 'TX', 20000.0, 5000.0),
            ('p3', '2010-01-01', 'Cy', 'Dee', 'M', 'Boston', 'MA', 0.0, 0.0),
            ('p4', '1980-05-05', 'Di', 'Fox', 'F', NULL, NULL, 5000.0, 5000.0);

        INSERT INTO conditions (start, stop, patient, code, description) VALUES
            ('2015-01-01', NULL, 'p1', 'C1', 'Hypertension'),
            ('2018-04-01', NULL, 'p1', 'C2', 'Diabetes'),
            ('2020-01-01', NULL, 'p1', 'C1', 'Hypertension'),
            ('2023-12-01', '2023-12-10', 'p1', 'C3', 'Flu'),
            ('2024-02-10', NULL, 'p2', 'C4', 'Asthma'),
            ('2024-01-15', '2024-01-20', 'p3', 'C3', 'Flu');

        INSERT INTO medications (start, stop, patient, code, description, base_cost, reasoncode, reasondescription) VALUES
            ('2018-04-02', NULL, 'p1', 'M1', 'Metformin', 10.0, 'C2', 'Diabetes'),
            ('2015-01-02', NULL, 'p1', 'M2', 'Lisinopril', 5.0, 'C1', 'Hypertension'),
            ('2024-01-15', '2024-01-20', 'p3', 'M3', 'Ibuprofen', 2.0, 'C3', NULL);

        INSERT INTO allergies (start, patient, code, description) VALUES
            ('2001-01-01', 'p1', 'A1', 'Peanuts');

        INSERT INTO providers (id, name, speciality) VALUES
            ('pr1', 'Dr A', 'GENERAL PRACTICE'),
            ('pr2', 'Dr B', NULL),
            ('pr3', 'Dr C', 'CARDIOLOGY');

        INSERT INTO encounters (id, start, stop, patient, provider, encounterclass, description, base_encounter_cost) VALUES
            ('e1', '2023-09-01T08:00:00Z', '2023-09-04T08:00:00Z', 'p1', 'pr1', 'inpatient', 'Admission', 1000.0),
            ('e2', '2024-01-10T10:00:00Z', '2024-01-10T14:00:00Z', 'p1', 'pr1', 'emergency', 'ER visit', 500.0),
            ('e3', '2024-05-01T09:00:00Z', '2024-05-01T09:30:00Z', 'p1', 'pr2', 'ambulatory', 'Check-up', 100.0),
            ('e4', '2024-03-01T09:00:00Z', '2024-03-01T12:00:00Z', 'p2', 'pr2', 'emergency', 'ER visit', 400.0),
            ('e5', '2020-03-01T09:00:00Z', '2020-03-01T12:00:00Z', 'p2', 'pr2', 'emergency', 'ER visit', 400.0),
            ('e6', '2024-07-15T09:00:00Z', '2024-07-15T10:00:00Z', 'p3', 'pr1', 'ambulatory', 'Check-up', 100.0),
            ('e7', '2024-04-01T09:00:00Z', '2024-04-01T09:20:00Z', 'p2', 'pr2', 'ambulatory', 'Check-up', 100.0);

        INSERT INTO immunizations (date, patient, code, description, base_cost) VALUES
            ('2023-10-01', 'p1', 'I1', 'Influenza', 140.0),
            ('2022-10-01', 'p1', 'I1', 'Influenza', 140.0),
            ('2023-10-01', 'p2', 'I1', 'Influenza', 140.0);
    ";

    fn fixture() -> (TempDir, SqliteSource) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hca.db");
        let conn = initialise(&path).unwrap();
        conn.execute_batch(FIXTURE).unwrap();
        drop(conn);
        (dir, SqliteSource::new(path))
    }

    #[test]
    fn test_patient_aggregates_count_distinct_active_conditions() {
        let (_dir, source) = fixture();
        let rows = source.patient_aggregates(reference_date(), 100).unwrap();

        let ids: Vec<_> = rows.iter().map(|r| r.patient_id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);

        let ann = &rows[0];
        assert_eq!(ann.patient_name, "Ann Lee");
        assert_eq!(ann.age, 74);
        assert_eq!(ann.gender, Gender::Female);
        assert_eq!(ann.condition_count, 2);
        assert_eq!(ann.medication_count, 2);
        assert_eq!(ann.allergy_count, 1);

        let cy = &rows[2];
        assert_eq!(cy.condition_count, 0);
        assert_eq!(cy.medication_count, 1);
    }

    #[test]
    fn test_patient_aggregates_respects_limit() {
        let (_dir, source) = fixture();
        let rows = source.patient_aggregates(reference_date(), 1).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].patient_id, "p1");
    }

    #[test]
    fn test_birthdate_after_reference_date_is_malformed() {
        let (dir, source) = fixture();
        let conn = initialise(&dir.path().join("hca.db")).unwrap();
        conn.execute_batch(
            "INSERT INTO patients (id, birthdate, first, last, gender) VALUES ('p9', '2030-01-01', 'Eve', 'Ng', 'F');
             INSERT INTO conditions (start, patient, code, description) VALUES ('2031-01-01', 'p9', 'C9', 'Future');",
        )
        .unwrap();
        drop(conn);

        let err = source.patient_aggregates(reference_date(), 100).unwrap_err();
        assert!(matches!(err, AnalyticsError::MalformedRow { field: "age", .. }));
    }

    fn insert_future_patient(dir: &TempDir) {
        let conn = initialise(&dir.path().join("hca.db")).unwrap();
        conn.execute(
            "INSERT INTO patients (id, birthdate, first, last, gender, state, healthcare_expenses)
             VALUES ('p9', '2030-01-01', 'Eve', 'Ng', 'F', 'MA', 100.0)",
            [],
        )
        .unwrap();
    }

    #[test]
    fn test_future_birthdate_rejected_by_demographic_queries() {
        let (dir, source) = fixture();
        insert_future_patient(&dir);

        let err = source.patient_ages(reference_date()).unwrap_err();
        assert!(matches!(err, AnalyticsError::MalformedRow { field: "age", .. }));

        let err = source.cohort_members(reference_date()).unwrap_err();
        assert!(matches!(err, AnalyticsError::MalformedRow { field: "age", .. }));
    }

    #[test]
    fn test_future_birthdate_rejected_by_summary_counts() {
        let (dir, source) = fixture();
        insert_future_patient(&dir);

        let err = source.summary_counts(reference_date()).unwrap_err();
        assert!(matches!(err, AnalyticsError::MalformedRow { field: "age", .. }));
    }

    #[test]
    fn test_encounter_aggregates_use_trailing_year() {
        let (_dir, source) = fixture();
        let rows = source.encounter_aggregates(reference_date()).unwrap();
        assert_eq!(rows.len(), 2);

        let ann = &rows[0];
        assert_eq!(ann.patient_id, "p1");
        assert_eq!(ann.total_encounters, 3);
        assert_eq!(ann.emergency_visits, 1);
        assert_eq!(ann.inpatient_visits, 1);
        assert!((ann.avg_length_of_stay_days - 1.0).abs() < 1e-9);

        let bob = &rows[1];
        assert_eq!(bob.patient_id, "p2");
        assert_eq!(bob.total_encounters, 2);
        assert_eq!(bob.emergency_visits, 1);
        assert_eq!(bob.avg_length_of_stay_days, 0.0);
    }

    #[test]
    fn test_cost_aggregates_most_expensive_first() {
        let (_dir, source) = fixture();
        let rows = source.cost_aggregates(100).unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.patient_id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p4"]);
        assert_eq!(rows[0].medication_count, 2);
        assert_eq!(rows[0].encounter_count, 3);
        assert_eq!(rows[0].out_of_pocket(), 50000.0);
        assert_eq!(rows[1].encounter_count, 3);
    }

    #[test]
    fn test_summary_counts() {
        let (_dir, source) = fixture();
        let counts = source.summary_counts(reference_date()).unwrap();
        assert_eq!(counts.total_patients, 4);
        assert_eq!(counts.patients_with_active_conditions, 2);
        assert_eq!(counts.total_encounters, 7);
        assert_eq!(counts.total_medications, 3);
        assert_eq!(counts.total_conditions, 6);
        assert_eq!(counts.total_healthcare_costs, 85000.0);
        assert_eq!(counts.average_patient_age, Some(41.5));
    }

    #[test]
    fn test_summary_counts_on_empty_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");
        initialise(&path).unwrap();
        let counts = SqliteSource::new(path).summary_counts(reference_date()).unwrap();
        assert_eq!(counts, SummaryCounts::default());
    }

    #[test]
    fn test_description_counts_with_and_without_limit() {
        let (_dir, source) = fixture();
        let all = source
            .description_counts(ClinicalTable::Conditions, None)
            .unwrap();
        let names: Vec<_> = all.iter().map(|d| d.description.as_str()).collect();
        assert_eq!(names, vec!["Flu", "Hypertension", "Asthma", "Diabetes"]);
        assert_eq!(all[0].occurrences, 2);

        let top = source
            .description_counts(ClinicalTable::Conditions, Some(1))
            .unwrap();
        assert_eq!(top.len(), 1);

        let devices = source
            .description_counts(ClinicalTable::Devices, None)
            .unwrap();
        assert!(devices.is_empty());
    }

    #[test]
    fn test_cohort_and_ages() {
        let (_dir, source) = fixture();
        let cohort = source.cohort_members(reference_date()).unwrap();
        assert_eq!(cohort.len(), 3);
        assert_eq!(cohort[0].age, 74);
        assert_eq!(cohort[2].state, None);

        let mut ages = source.patient_ages(reference_date()).unwrap();
        ages.sort_unstable();
        assert_eq!(ages, vec![14, 34, 44, 74]);
    }

    #[test]
    fn test_condition_prevalence_and_medication_usage() {
        let (_dir, source) = fixture();
        let prevalence = source.condition_prevalence(reference_date(), 50).unwrap();
        assert_eq!(prevalence[0].condition, "Flu");
        assert_eq!(prevalence[0].unique_patients, 2);
        // Flu episodes last 9 and 5 days.
        assert_eq!(prevalence[0].avg_duration_days, Some(7.0));

        let usage = source.medication_usage(50).unwrap();
        assert_eq!(usage.len(), 3);
        assert!(usage.iter().all(|m| m.prescriptions == 1));
        assert_eq!(usage[0].medication, "Ibuprofen");
        assert_eq!(usage[0].avg_cost, Some(2.0));
    }

    #[test]
    fn test_encounter_classes_and_providers() {
        let (_dir, source) = fixture();
        let classes = source.encounter_classes().unwrap();
        assert_eq!(classes[0].encounter_type, "ambulatory");
        assert_eq!(classes[0].total_encounters, 3);
        assert_eq!(classes[0].total_cost, Some(300.0));

        let providers = source.provider_workload(20).unwrap();
        let workload: Vec<_> = providers
            .iter()
            .map(|p| (p.name.as_str(), p.encounter_count))
            .collect();
        assert_eq!(workload, vec![("Dr B", 4), ("Dr A", 3), ("Dr C", 0)]);
    }

    #[test]
    fn test_immunizations_per_patient() {
        let (_dir, source) = fixture();
        let counts = source.immunizations_per_patient().unwrap();
        assert_eq!(
            counts,
            vec![
                PatientCount { patient: "p1".into(), count: 2 },
                PatientCount { patient: "p2".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_seasonal_trends_by_month() {
        let (_dir, source) = fixture();
        let trends = source.seasonal_condition_trends(reference_date()).unwrap();
        let months: Vec<_> = trends
            .iter()
            .map(|t| (t.month, t.description.as_str()))
            .collect();
        assert_eq!(months, vec![(1, "Flu"), (2, "Asthma"), (12, "Flu")]);
    }

    #[test]
    fn test_medication_effectiveness_threshold() {
        let (_dir, source) = fixture();
        let outcomes = source
            .medication_effectiveness(reference_date(), 1, 30)
            .unwrap();
        assert_eq!(outcomes.len(), 3);
        let metformin = outcomes
            .iter()
            .find(|o| o.medication == "Metformin")
            .unwrap();
        assert_eq!(metformin.condition_treated, "Diabetes");

        let none = source
            .medication_effectiveness(reference_date(), 2, 30)
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_patients_listing() {
        let (_dir, source) = fixture();
        let patients = source.patients(2).unwrap();
        assert_eq!(patients.len(), 2);
        assert_eq!(patients[0].last, "Dee");
        assert_eq!(patients[0].gender, Gender::Male);
    }

    #[test]
    fn test_patient_detail_newest_first() {
        let (_dir, source) = fixture();
        let detail = source.patient_detail("p1").unwrap().unwrap();
        assert_eq!(detail.patient.first, "Ann");
        assert_eq!(detail.healthcare_expenses, 60000.0);
        assert_eq!(detail.conditions.len(), 4);
        assert_eq!(detail.conditions[0].description, "Flu");
        assert_eq!(detail.medications[0].detail.as_deref(), Some("Diabetes"));
        assert_eq!(detail.encounters[0].detail.as_deref(), Some("ambulatory"));
        assert_eq!(detail.allergies.len(), 1);
    }

    #[test]
    fn test_hostile_patient_id_is_bound_not_interpolated() {
        let (_dir, source) = fixture();
        assert!(source.patient_detail("p1' OR '1'='1").unwrap().is_none());
        assert!(
            source
                .patient_detail("x'; DROP TABLE patients; --")
                .unwrap()
                .is_none()
        );
        assert_eq!(source.summary_counts(reference_date()).unwrap().total_patients, 4);
    }

    #[test]
    fn test_missing_database_is_unavailable_not_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = SqliteSource::new(dir.path().join("missing.db"));
        let err = source.patient_aggregates(reference_date(), 100).unwrap_err();
        assert!(err.is_source_unavailable());
        assert!(source.ping().unwrap_err().is_source_unavailable());
    }

    #[test]
    fn test_ping_reports_version() {
        let (_dir, source) = fixture();
        assert!(source.ping().unwrap().starts_with("SQLite 3."));
    }
}
