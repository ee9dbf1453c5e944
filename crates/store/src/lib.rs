//! # HCA Store
//!
//! SQLite persistence for the healthcare analytics engine.
//!
//! - [`SqliteSource`] implements [`hca_core::AggregateSource`] with one read-only connection per
//!   call and bound parameters throughout.
//! - [`import_csv_dir`] loads a directory of CSV exports into the schema in one transaction.

pub mod error;
pub mod import;
pub mod schema;
pub mod sqlite;

pub use error::{StoreError, StoreResult};
pub use import::{import_csv_dir, ImportSummary, TableImport};
pub use schema::initialise;
pub use sqlite::SqliteSource;
