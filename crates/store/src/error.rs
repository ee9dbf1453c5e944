use hca_core::AnalyticsError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to open database (path: {path}): {source}", path = path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("failed to read CSV file (path: {path}): {source}", path = path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("import directory does not exist: {path}", path = path.display())]
    MissingImportDir { path: PathBuf },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for AnalyticsError {
    fn from(err: StoreError) -> Self {
        AnalyticsError::SourceUnavailable(Box::new(err))
    }
}
