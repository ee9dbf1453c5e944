//! CSV writer for single tables and multi-sheet workbooks.
//!
//! # Output layout
//!
//! ```text
//! <export_dir>/
//! ├── <table>.csv
//! └── <workbook>/
//!     ├── <sheet>.csv
//!     └── <sheet>.csv
//! ```
//!
//! Table, workbook and sheet names become file names, so they are restricted to ASCII
//! alphanumerics, `_` and `-`. Rows are written with their serde field names as the header.
//! An empty table produces an empty file: there is no row to take the header from.

use crate::{ExportError, ExportResult};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes tables under one export directory. The directory is created on first write.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    export_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Writes `rows` to `<export_dir>/<name>.csv`, replacing any previous file.
    pub fn write_table<T: Serialize>(&self, name: &str, rows: &[T]) -> ExportResult<PathBuf> {
        validate_name(name)?;
        let bytes = encode(rows)?;
        let path = self.export_dir.join(format!("{name}.csv"));
        write_file(&path, &bytes)?;
        tracing::info!("exported {} rows to {}", rows.len(), path.display());
        Ok(path)
    }

    /// Writes every sheet of `workbook` to `<export_dir>/<workbook>/<sheet>.csv`.
    pub fn write_workbook(&self, workbook: &Workbook) -> ExportResult<PathBuf> {
        let dir = self.export_dir.join(&workbook.name);
        for sheet in &workbook.sheets {
            write_file(&dir.join(format!("{}.csv", sheet.name)), &sheet.bytes)?;
        }
        tracing::info!(
            "exported workbook {} ({} sheets) to {}",
            workbook.name,
            workbook.sheets.len(),
            dir.display()
        );
        Ok(dir)
    }
}

#[derive(Debug)]
struct Sheet {
    name: String,
    bytes: Vec<u8>,
}

/// A named set of sheets, each already encoded as CSV.
///
/// Sheets may hold different row types; each one is serialized when it is added.
#[derive(Debug)]
pub struct Workbook {
    name: String,
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(name: impl Into<String>) -> ExportResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            sheets: Vec::new(),
        })
    }

    /// Appends a sheet. Sheet order is preserved.
    pub fn sheet<T: Serialize>(mut self, name: &str, rows: &[T]) -> ExportResult<Self> {
        validate_name(name)?;
        if self.sheets.iter().any(|s| s.name == name) {
            return Err(ExportError::InvalidName(format!(
                "duplicate sheet `{name}` in workbook `{}`",
                self.name
            )));
        }
        self.sheets.push(Sheet {
            name: name.to_string(),
            bytes: encode(rows)?,
        });
        Ok(self)
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }
}

fn validate_name(name: &str) -> ExportResult<()> {
    let ok = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if ok {
        Ok(())
    } else {
        Err(ExportError::InvalidName(format!(
            "`{name}` (only alphanumeric, '_' and '-' allowed)"
        )))
    }
}

/// Replaces anything that is not allowed in an export name with `_`.
pub fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn encode<T: Serialize>(rows: &[T]) -> ExportResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|err| ExportError::Csv(err.into_error().into()))
}

fn write_file(path: &Path, bytes: &[u8]) -> ExportResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, bytes).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        description: &'static str,
        count: u32,
    }

    #[test]
    fn test_write_table_creates_directory_and_header() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(tmp.path().join("exports"));

        let path = exporter
            .write_table(
                "conditions",
                &[
                    Row { description: "Asthma", count: 3 },
                    Row { description: "Flu, seasonal", count: 1 },
                ],
            )
            .unwrap();

        assert_eq!(path, tmp.path().join("exports").join("conditions.csv"));
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text, "description,count\nAsthma,3\n\"Flu, seasonal\",1\n");
    }

    #[test]
    fn test_empty_table_writes_empty_file() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(tmp.path());
        let path = exporter.write_table::<Row>("empty", &[]).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "");
    }

    #[test]
    fn test_rejects_path_like_names() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(tmp.path());
        for name in ["", "../escape", "a/b", "name.csv"] {
            let err = exporter.write_table::<Row>(name, &[]).unwrap_err();
            assert!(matches!(err, ExportError::InvalidName(_)), "{name}");
        }
        assert!(Workbook::new("bad name").is_err());
    }

    #[test]
    fn test_workbook_writes_one_file_per_sheet() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(tmp.path());

        let workbook = Workbook::new("summary")
            .unwrap()
            .sheet("First", &[Row { description: "a", count: 1 }])
            .unwrap()
            .sheet("Second", &[("x", 2.5)])
            .unwrap();
        assert_eq!(workbook.sheet_names().collect::<Vec<_>>(), vec!["First", "Second"]);

        let dir = exporter.write_workbook(&workbook).unwrap();
        assert_eq!(
            fs::read_to_string(dir.join("First.csv")).unwrap(),
            "description,count\na,1\n"
        );
        assert_eq!(fs::read_to_string(dir.join("Second.csv")).unwrap(), "x,2.5\n");
    }

    #[test]
    fn test_duplicate_sheet_rejected() {
        let err = Workbook::new("wb")
            .unwrap()
            .sheet::<Row>("S", &[])
            .unwrap()
            .sheet::<Row>("S", &[])
            .unwrap_err();
        assert!(matches!(err, ExportError::InvalidName(_)));
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("O'Brien Jr."), "O_Brien_Jr_");
        assert_eq!(sanitize_name("Ann-Marie"), "Ann-Marie");
    }
}
