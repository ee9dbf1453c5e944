/// Errors raised by the analytics engine and its query-layer collaborators.
///
/// An empty result set is never an error. Callers branch on row count to decide "no data".
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("aggregate source unavailable: {0}")]
    SourceUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("malformed aggregate row (field `{field}`): {reason}")]
    MalformedRow { field: &'static str, reason: String },
    #[error("invalid reference date `{0}` (expected YYYY-MM-DD)")]
    InvalidReferenceDate(String),
}

impl AnalyticsError {
    pub fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedRow {
            field,
            reason: reason.into(),
        }
    }

    /// `true` when the failure came from the query layer rather than the engine.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, Self::SourceUnavailable(_))
    }
}

pub type AnalyticsResult<T> = std::result::Result<T, AnalyticsError>;
