//! Relational schema for the healthcare extract.
//!
//! Column names follow the Synthea CSV export, lower-cased. Dates are stored as ISO-8601 text so
//! SQLite's date functions can work on them directly.

use crate::error::{StoreError, StoreResult};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS patients (
        id TEXT PRIMARY KEY,
        birthdate TEXT,
        deathdate TEXT,
        first TEXT NOT NULL,
        last TEXT NOT NULL,
        gender TEXT,
        city TEXT,
        state TEXT,
        healthcare_expenses REAL,
        healthcare_coverage REAL
    );

    CREATE TABLE IF NOT EXISTS conditions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        start TEXT,
        stop TEXT,
        patient TEXT NOT NULL,
        encounter TEXT,
        code TEXT,
        description TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS medications (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        start TEXT,
        stop TEXT,
        patient TEXT NOT NULL,
        encounter TEXT,
        code TEXT,
        description TEXT NOT NULL,
        base_cost REAL,
        reasoncode TEXT,
        reasondescription TEXT
    );

    CREATE TABLE IF NOT EXISTS encounters (
        id TEXT PRIMARY KEY,
        start TEXT,
        stop TEXT,
        patient TEXT NOT NULL,
        provider TEXT,
        encounterclass TEXT,
        code TEXT,
        description TEXT,
        base_encounter_cost REAL,
        reasondescription TEXT
    );

    CREATE TABLE IF NOT EXISTS allergies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        start TEXT,
        stop TEXT,
        patient TEXT NOT NULL,
        encounter TEXT,
        code TEXT,
        description TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS devices (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        start TEXT,
        stop TEXT,
        patient TEXT NOT NULL,
        encounter TEXT,
        code TEXT,
        description TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS immunizations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT,
        patient TEXT NOT NULL,
        encounter TEXT,
        code TEXT,
        description TEXT NOT NULL,
        base_cost REAL
    );

    CREATE TABLE IF NOT EXISTS providers (
        id TEXT PRIMARY KEY,
        organization TEXT,
        name TEXT NOT NULL,
        gender TEXT,
        speciality TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_conditions_patient ON conditions(patient);
    CREATE INDEX IF NOT EXISTS idx_medications_patient ON medications(patient);
    CREATE INDEX IF NOT EXISTS idx_encounters_patient ON encounters(patient);
    CREATE INDEX IF NOT EXISTS idx_encounters_provider ON encounters(provider);
    CREATE INDEX IF NOT EXISTS idx_allergies_patient ON allergies(patient);
    CREATE INDEX IF NOT EXISTS idx_devices_patient ON devices(patient);
    CREATE INDEX IF NOT EXISTS idx_immunizations_patient ON immunizations(patient);
";

/// Opens (creating if needed) a writable database at `path` and applies the schema.
///
/// # Errors
///
/// Returns `StoreError::Open` if the file cannot be opened or created, and
/// `StoreError::Database` if the schema cannot be applied.
pub fn initialise(path: &Path) -> StoreResult<Connection> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
    )
    .map_err(|source| StoreError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}

/// Opens an existing database read-only. Missing files are an error, not an empty database.
pub(crate) fn open_read_only(path: &Path) -> StoreResult<Connection> {
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(|source| {
        StoreError::Open {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialise_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hca.db");
        initialise(&path).unwrap();
        let conn = initialise(&path).unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 8);
    }

    #[test]
    fn test_read_only_open_of_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_read_only(&dir.path().join("missing.db")).unwrap_err();
        assert!(matches!(err, StoreError::Open { .. }));
    }
}
