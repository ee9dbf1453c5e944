//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into services. Request
//! handling never reads process-wide environment variables.

use crate::constants::{
    DEFAULT_DATABASE_PATH, DEFAULT_EXPORT_DIR, DEFAULT_ROW_LIMIT, ENV_DATABASE_PATH,
    ENV_EXPORT_DIR, ENV_REFERENCE_DATE, ENV_ROW_LIMIT,
};
use crate::{AnalyticsError, AnalyticsResult};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    database_path: PathBuf,
    export_dir: PathBuf,
    reference_date: NaiveDate,
    row_limit: usize,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `AnalyticsError::InvalidInput` if `row_limit` is zero.
    pub fn new(
        database_path: PathBuf,
        export_dir: PathBuf,
        reference_date: NaiveDate,
        row_limit: usize,
    ) -> AnalyticsResult<Self> {
        if row_limit == 0 {
            return Err(AnalyticsError::InvalidInput(
                "row_limit must be at least 1".into(),
            ));
        }

        Ok(Self {
            database_path,
            export_dir,
            reference_date,
            row_limit,
        })
    }

    /// Configuration with every default and the given reference date.
    pub fn with_defaults(reference_date: NaiveDate) -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            reference_date,
            row_limit: DEFAULT_ROW_LIMIT,
        }
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// The "today" used for ages and trailing windows.
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn row_limit(&self) -> usize {
        self.row_limit
    }
}

/// Parse the reference date from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns `today`.
pub fn reference_date_from_env_value(
    value: Option<String>,
    today: NaiveDate,
) -> AnalyticsResult<NaiveDate> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        Some(v) => NaiveDate::parse_from_str(&v, "%Y-%m-%d")
            .map_err(|_| AnalyticsError::InvalidReferenceDate(v)),
        None => Ok(today),
    }
}

/// Parse the per-query row limit from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_ROW_LIMIT`].
pub fn row_limit_from_env_value(value: Option<String>) -> AnalyticsResult<usize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        Some(v) => match v.parse::<usize>() {
            Ok(limit) if limit > 0 => Ok(limit),
            _ => Err(AnalyticsError::InvalidInput(format!(
                "row limit must be a positive integer, got `{v}`"
            ))),
        },
        None => Ok(DEFAULT_ROW_LIMIT),
    }
}

/// Resolve a `CoreConfig` from the `HCA_*` variables, read through `lookup`.
///
/// Binaries pass `|key| std::env::var(key).ok()`. Unset or blank variables take their defaults.
///
/// # Errors
///
/// Returns an error if the reference date or row limit cannot be parsed.
pub fn config_from_lookup<F>(lookup: F, today: NaiveDate) -> AnalyticsResult<CoreConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let path_or = |key: &str, default: &str| {
        lookup(key)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(default))
    };

    CoreConfig::new(
        path_or(ENV_DATABASE_PATH, DEFAULT_DATABASE_PATH),
        path_or(ENV_EXPORT_DIR, DEFAULT_EXPORT_DIR),
        reference_date_from_env_value(lookup(ENV_REFERENCE_DATE), today)?,
        row_limit_from_env_value(lookup(ENV_ROW_LIMIT))?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_reference_date_defaults_to_today() {
        assert_eq!(reference_date_from_env_value(None, today()).unwrap(), today());
        assert_eq!(
            reference_date_from_env_value(Some("  ".into()), today()).unwrap(),
            today()
        );
    }

    #[test]
    fn test_reference_date_parses_iso_date() {
        let parsed = reference_date_from_env_value(Some("2020-02-29".into()), today()).unwrap();
        assert_eq!(parsed, NaiveDate::from_ymd_opt(2020, 2, 29).unwrap());
    }

    #[test]
    fn test_reference_date_rejects_garbage() {
        let err = reference_date_from_env_value(Some("29/02/2020".into()), today()).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidReferenceDate(_)));
    }

    #[test]
    fn test_row_limit() {
        assert_eq!(row_limit_from_env_value(None).unwrap(), DEFAULT_ROW_LIMIT);
        assert_eq!(row_limit_from_env_value(Some("25".into())).unwrap(), 25);
        assert!(row_limit_from_env_value(Some("0".into())).is_err());
        assert!(row_limit_from_env_value(Some("-3".into())).is_err());
    }

    #[test]
    fn test_config_from_lookup() {
        let cfg = config_from_lookup(
            |key| match key {
                "HCA_DATABASE_PATH" => Some("/data/hc.db".into()),
                "HCA_REFERENCE_DATE" => Some("2023-01-31".into()),
                "HCA_EXPORT_DIR" => Some(" ".into()),
                _ => None,
            },
            today(),
        )
        .unwrap();

        assert_eq!(cfg.database_path(), Path::new("/data/hc.db"));
        assert_eq!(cfg.export_dir(), Path::new(DEFAULT_EXPORT_DIR));
        assert_eq!(cfg.reference_date(), NaiveDate::from_ymd_opt(2023, 1, 31).unwrap());
        assert_eq!(cfg.row_limit(), DEFAULT_ROW_LIMIT);
    }

    #[test]
    fn test_config_from_lookup_propagates_bad_limit() {
        let err = config_from_lookup(
            |key| (key == "HCA_ROW_LIMIT").then(|| "lots".to_string()),
            today(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput(_)));
    }

    #[test]
    fn test_new_rejects_zero_limit() {
        let err = CoreConfig::new("db".into(), "out".into(), today(), 0).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput(_)));
    }
}
