//! CSV importer for Synthea-style exports.
//!
//! Each known file (`patients.csv`, `conditions.csv`, ...) is loaded into the table of the same
//! name. Header names are matched case-insensitively and columns the schema does not know about
//! are ignored. Files that are absent are skipped with a warning. Everything runs in a single
//! transaction: a malformed file leaves the database exactly as it was.

use crate::error::{StoreError, StoreResult};
use crate::schema::initialise;
use rusqlite::{params, Statement, Transaction};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Rows loaded into one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableImport {
    pub table: &'static str,
    pub rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: Vec<TableImport>,
    /// Expected files that were not present in the import directory.
    pub skipped: Vec<PathBuf>,
}

impl ImportSummary {
    pub fn total_rows(&self) -> usize {
        self.imported.iter().map(|t| t.rows).sum()
    }
}

/// A CSV file that maps onto one table.
trait CsvTable: DeserializeOwned {
    const FILE: &'static str;
    const TABLE: &'static str;
    const INSERT: &'static str;

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize>;
}

#[derive(Debug, Deserialize)]
struct PatientCsv {
    id: String,
    birthdate: Option<String>,
    deathdate: Option<String>,
    first: String,
    last: String,
    gender: Option<String>,
    city: Option<String>,
    state: Option<String>,
    healthcare_expenses: Option<f64>,
    healthcare_coverage: Option<f64>,
}

impl CsvTable for PatientCsv {
    const FILE: &'static str = "patients.csv";
    const TABLE: &'static str = "patients";
    const INSERT: &'static str = "INSERT OR REPLACE INTO patients
        (id, birthdate, deathdate, first, last, gender, city, state, healthcare_expenses, healthcare_coverage)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id,
            self.birthdate,
            self.deathdate,
            self.first,
            self.last,
            self.gender,
            self.city,
            self.state,
            self.healthcare_expenses,
            self.healthcare_coverage,
        ])
    }
}

/// Shared shape of conditions, allergies and devices.
#[derive(Debug, Deserialize)]
struct EpisodeCsv {
    start: Option<String>,
    stop: Option<String>,
    patient: String,
    encounter: Option<String>,
    code: Option<String>,
    description: String,
}

impl EpisodeCsv {
    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.start,
            self.stop,
            self.patient,
            self.encounter,
            self.code,
            self.description,
        ])
    }
}

macro_rules! episode_table {
    ($name:ident, $file:literal, $table:literal) => {
        #[derive(Debug, Deserialize)]
        #[serde(transparent)]
        struct $name(EpisodeCsv);

        impl CsvTable for $name {
            const FILE: &'static str = $file;
            const TABLE: &'static str = $table;
            const INSERT: &'static str = concat!(
                "INSERT INTO ",
                $table,
                " (start, stop, patient, encounter, code, description) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
            );

            fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
                self.0.bind(stmt)
            }
        }
    };
}

episode_table!(ConditionCsv, "conditions.csv", "conditions");
episode_table!(AllergyCsv, "allergies.csv", "allergies");
episode_table!(DeviceCsv, "devices.csv", "devices");

#[derive(Debug, Deserialize)]
struct MedicationCsv {
    start: Option<String>,
    stop: Option<String>,
    patient: String,
    encounter: Option<String>,
    code: Option<String>,
    description: String,
    base_cost: Option<f64>,
    reasoncode: Option<String>,
    reasondescription: Option<String>,
}

impl CsvTable for MedicationCsv {
    const FILE: &'static str = "medications.csv";
    const TABLE: &'static str = "medications";
    const INSERT: &'static str = "INSERT INTO medications
        (start, stop, patient, encounter, code, description, base_cost, reasoncode, reasondescription)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.start,
            self.stop,
            self.patient,
            self.encounter,
            self.code,
            self.description,
            self.base_cost,
            self.reasoncode,
            self.reasondescription,
        ])
    }
}

#[derive(Debug, Deserialize)]
struct EncounterCsv {
    id: String,
    start: Option<String>,
    stop: Option<String>,
    patient: String,
    provider: Option<String>,
    encounterclass: Option<String>,
    code: Option<String>,
    description: Option<String>,
    base_encounter_cost: Option<f64>,
    reasondescription: Option<String>,
}

impl CsvTable for EncounterCsv {
    const FILE: &'static str = "encounters.csv";
    const TABLE: &'static str = "encounters";
    const INSERT: &'static str = "INSERT OR REPLACE INTO encounters
        (id, start, stop, patient, provider, encounterclass, code, description, base_encounter_cost, reasondescription)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id,
            self.start,
            self.stop,
            self.patient,
            self.provider,
            self.encounterclass,
            self.code,
            self.description,
            self.base_encounter_cost,
            self.reasondescription,
        ])
    }
}

#[derive(Debug, Deserialize)]
struct ImmunizationCsv {
    date: Option<String>,
    patient: String,
    encounter: Option<String>,
    code: Option<String>,
    description: String,
    base_cost: Option<f64>,
}

impl CsvTable for ImmunizationCsv {
    const FILE: &'static str = "immunizations.csv";
    const TABLE: &'static str = "immunizations";
    const INSERT: &'static str = "INSERT INTO immunizations
        (date, patient, encounter, code, description, base_cost)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.date,
            self.patient,
            self.encounter,
            self.code,
            self.description,
            self.base_cost,
        ])
    }
}

#[derive(Debug, Deserialize)]
struct ProviderCsv {
    id: String,
    organization: Option<String>,
    name: String,
    gender: Option<String>,
    speciality: Option<String>,
}

impl CsvTable for ProviderCsv {
    const FILE: &'static str = "providers.csv";
    const TABLE: &'static str = "providers";
    const INSERT: &'static str = "INSERT OR REPLACE INTO providers
        (id, organization, name, gender, speciality)
        VALUES (?1, ?2, ?3, ?4, ?5)";

    fn insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.id,
            self.organization,
            self.name,
            self.gender,
            self.speciality,
        ])
    }
}

/// Imports every known CSV file in `csv_dir` into the database at `db_path`.
///
/// The schema is created if needed. Tables whose file is present are emptied and reloaded;
/// tables whose file is absent are left untouched.
///
/// # Errors
///
/// Returns `StoreError::MissingImportDir` if `csv_dir` is not a directory, `StoreError::Csv` if a
/// file cannot be parsed (nothing is committed in that case) and `StoreError::Open`/`Database`
/// for SQLite failures.
pub fn import_csv_dir(db_path: &Path, csv_dir: &Path) -> StoreResult<ImportSummary> {
    if !csv_dir.is_dir() {
        return Err(StoreError::MissingImportDir {
            path: csv_dir.to_path_buf(),
        });
    }

    let mut conn = initialise(db_path)?;
    let tx = conn.transaction()?;
    let mut summary = ImportSummary::default();

    import_table::<PatientCsv>(&tx, csv_dir, &mut summary)?;
    import_table::<ConditionCsv>(&tx, csv_dir, &mut summary)?;
    import_table::<MedicationCsv>(&tx, csv_dir, &mut summary)?;
    import_table::<EncounterCsv>(&tx, csv_dir, &mut summary)?;
    import_table::<AllergyCsv>(&tx, csv_dir, &mut summary)?;
    import_table::<DeviceCsv>(&tx, csv_dir, &mut summary)?;
    import_table::<ImmunizationCsv>(&tx, csv_dir, &mut summary)?;
    import_table::<ProviderCsv>(&tx, csv_dir, &mut summary)?;

    tx.commit()?;

    tracing::info!(
        "imported {} rows into {} tables from {}",
        summary.total_rows(),
        summary.imported.len(),
        csv_dir.display()
    );
    Ok(summary)
}

fn import_table<T: CsvTable>(
    tx: &Transaction<'_>,
    dir: &Path,
    summary: &mut ImportSummary,
) -> StoreResult<()> {
    let path = dir.join(T::FILE);
    if !path.is_file() {
        tracing::warn!("skipping {}: file not found", path.display());
        summary.skipped.push(path);
        return Ok(());
    }

    let records = read_records::<T>(&path)?;

    tx.execute(&format!("DELETE FROM {}", T::TABLE), [])?;
    let mut stmt = tx.prepare(T::INSERT)?;
    for record in &records {
        record.insert(&mut stmt)?;
    }

    tracing::debug!("loaded {} rows into {}", records.len(), T::TABLE);
    summary.imported.push(TableImport {
        table: T::TABLE,
        rows: records.len(),
    });
    Ok(())
}

/// Reads `path` with lower-cased, trimmed headers.
fn read_records<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    let csv_err = |source| StoreError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let headers: csv::StringRecord = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_ascii_lowercase)
        .collect();
    reader.set_headers(headers);

    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(csv_err)
}
