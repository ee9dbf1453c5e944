//! Input validation utilities.
//!
//! Values arriving from the CLI or HTTP layer are checked here before they reach the query layer.
//! Queries bind every value as a parameter; these checks only reject input that can never match.

use crate::{AnalyticsError, AnalyticsResult};

/// Maximum accepted length of a patient identifier.
const MAX_PATIENT_ID_LEN: usize = 64;

/// Validates a patient identifier and returns it trimmed.
///
/// Dataset identifiers are UUID-like: ASCII alphanumerics and hyphens.
///
/// # Errors
///
/// Returns `AnalyticsError::InvalidInput` if the identifier is empty, too long or contains other
/// characters.
pub fn validate_patient_id(patient_id: &str) -> AnalyticsResult<&str> {
    let patient_id = patient_id.trim();

    if patient_id.is_empty() {
        return Err(AnalyticsError::InvalidInput(
            "patient id cannot be empty".into(),
        ));
    }

    if patient_id.len() > MAX_PATIENT_ID_LEN {
        return Err(AnalyticsError::InvalidInput(format!(
            "patient id exceeds maximum length of {} characters",
            MAX_PATIENT_ID_LEN
        )));
    }

    let ok = patient_id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-');

    if !ok {
        return Err(AnalyticsError::InvalidInput(
            "patient id contains invalid characters (only alphanumeric and '-' allowed)".into(),
        ));
    }

    Ok(patient_id)
}

/// Checks that `limit` lies within `min..=max`.
pub fn validate_limit(limit: usize, min: usize, max: usize) -> AnalyticsResult<usize> {
    if (min..=max).contains(&limit) {
        Ok(limit)
    } else {
        Err(AnalyticsError::InvalidInput(format!(
            "limit must be between {min} and {max}, got {limit}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_uuid() {
        let id = " 1d604da9-9a81-4ba9-80c2-de3375d59b40 ";
        assert_eq!(
            validate_patient_id(id).unwrap(),
            "1d604da9-9a81-4ba9-80c2-de3375d59b40"
        );
    }

    #[test]
    fn test_rejects_empty() {
        assert!(validate_patient_id("   ").is_err());
    }

    #[test]
    fn test_rejects_quotes_and_spaces() {
        assert!(validate_patient_id("x' OR '1'='1").is_err());
        assert!(validate_patient_id("abc def").is_err());
    }

    #[test]
    fn test_rejects_overlong() {
        assert!(validate_patient_id(&"a".repeat(65)).is_err());
        assert!(validate_patient_id(&"a".repeat(64)).is_ok());
    }

    #[test]
    fn test_limit_bounds() {
        assert_eq!(validate_limit(1, 1, 100).unwrap(), 1);
        assert_eq!(validate_limit(100, 1, 100).unwrap(), 100);
        assert!(validate_limit(0, 1, 100).is_err());
        assert!(validate_limit(101, 1, 100).is_err());
    }
}
