use crate::models::HealthRes;
use hca_core::{AggregateSource, AnalyticsService};

/// Health service shared by the API surfaces.
///
/// A health check always answers. An unreachable database is reported in the body rather than
/// as a failed request.
#[derive(Clone)]
pub struct HealthService;

impl HealthService {
    /// Creates a new instance of HealthService.
    pub fn new() -> Self {
        Self
    }

    /// Pings the data source behind `service` and reports the result.
    pub fn check_health<S: AggregateSource>(service: &AnalyticsService<S>) -> HealthRes {
        match service.ping() {
            Ok(version) => HealthRes {
                status: "healthy".into(),
                database: Some(format!("connected ({version})")),
                error: None,
            },
            Err(e) => {
                tracing::warn!("health check failed: {}", e);
                HealthRes {
                    status: "unhealthy".into(),
                    database: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

impl Default for HealthService {
    fn default() -> Self {
        Self::new()
    }
}
