//! # API REST
//!
//! REST API implementation for HCA.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (query validation, status codes, CORS)
//!
//! Uses `api-shared` for the wire models and the health check.
//!
//! Report endpoints with nothing to report answer `200` with a `{ "message": ... }` body. A
//! failing data source is logged and answered with `500 Internal error`.

#![warn(rust_2018_idioms)]

use api_shared::{
    convert_all, AgeGroupRes, CostAnalysisRes, CostOverviewRes, DescriptionCountRes,
    EncounterClassRes, HealthRes, HealthService, InsightsRes, MedicationOutcomeRes, MedicationRes,
    MessageRes, PatientDetailRes, PatientRes, ProviderRes, ReadmissionOverviewRes,
    ReadmissionRiskRes, RiskOverviewRes, RiskScoresRes, RootRes, SeasonalTrendRes, SummaryRes,
};
use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use hca_core::reports::{CostOverview, ReadmissionOverview, RiskOverview};
use hca_core::validation::{validate_limit, validate_patient_id};
use hca_core::{AnalyticsError, AnalyticsService, ClinicalTable, CoreConfig};
use hca_store::SqliteSource;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Address the server binds to when `HCA_REST_ADDR` is unset.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:8000";

const API_VERSION: &str = "1.0.0";

const PATIENT_LIMIT_DEFAULT: usize = 100;
const PATIENT_LIMIT_MAX: usize = 1000;
const TOP_LIMIT_DEFAULT: usize = 20;
const TOP_LIMIT_MAX: usize = 100;

/// Application state for the REST API server.
///
/// Every handler shares one analytics service over the configured SQLite database.
#[derive(Clone)]
pub struct AppState {
    service: Arc<AnalyticsService<SqliteSource>>,
}

impl AppState {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        let source = SqliteSource::new(cfg.database_path());
        Self {
            service: Arc::new(AnalyticsService::new(cfg, source)),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    /// Maximum number of rows to return
    limit: Option<usize>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        root,
        health,
        summary,
        list_patients,
        patient_detail,
        conditions,
        medications,
        allergies,
        risk_scores,
        readmission_risk,
        cost_analysis,
        insights,
        seasonal_trends,
        medication_effectiveness,
        age_distribution,
        encounter_classes,
        providers,
    ),
    components(schemas(
        RootRes,
        HealthRes,
        MessageRes,
        SummaryRes,
        PatientRes,
        PatientDetailRes,
        api_shared::TimelineRes,
        DescriptionCountRes,
        MedicationRes,
        RiskScoresRes,
        RiskOverviewRes,
        api_shared::RiskScoreRes,
        ReadmissionRiskRes,
        ReadmissionOverviewRes,
        api_shared::ReadmissionRes,
        CostAnalysisRes,
        CostOverviewRes,
        api_shared::CostRes,
        InsightsRes,
        api_shared::NumericSummaryRes,
        api_shared::GenderShareRes,
        api_shared::StateCountRes,
        SeasonalTrendRes,
        MedicationOutcomeRes,
        AgeGroupRes,
        EncounterClassRes,
        ProviderRes,
    ))
)]
pub struct ApiDoc;

/// Builds the HCA router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/summary", get(summary))
        .route("/api/patients", get(list_patients))
        .route("/api/patients/:id", get(patient_detail))
        .route("/api/conditions", get(conditions))
        .route("/api/medications", get(medications))
        .route("/api/allergies", get(allergies))
        .route("/api/analytics/risk-scores", get(risk_scores))
        .route("/api/analytics/readmission-risk", get(readmission_risk))
        .route("/api/analytics/costs", get(cost_analysis))
        .route("/api/analytics/insights", get(insights))
        .route("/api/analytics/seasonal-trends", get(seasonal_trends))
        .route(
            "/api/analytics/medication-effectiveness",
            get(medication_effectiveness),
        )
        .route("/api/demographics/age-distribution", get(age_distribution))
        .route("/api/encounters/classes", get(encounter_classes))
        .route("/api/providers", get(providers))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

type ApiError = (StatusCode, &'static str);

/// Logs a data source failure and hides it behind a generic 500.
fn internal_error(context: &str, e: AnalyticsError) -> ApiError {
    tracing::error!("{} error: {:?}", context, e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
}

fn resolve_limit(query: &LimitQuery, default: usize, max: usize) -> Result<usize, ApiError> {
    validate_limit(query.limit.unwrap_or(default), 1, max).map_err(|e| {
        tracing::debug!("rejected limit: {}", e);
        (StatusCode::BAD_REQUEST, "Invalid limit")
    })
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "API welcome message and endpoint index", body = RootRes)
    )
)]
/// API root: welcome message and an index of the main endpoints.
#[axum::debug_handler]
async fn root() -> Json<RootRes> {
    let endpoints = [
        ("summary", "/api/summary"),
        ("patients", "/api/patients"),
        ("conditions", "/api/conditions"),
        ("medications", "/api/medications"),
        ("risk_scores", "/api/analytics/risk-scores"),
        ("readmission_risk", "/api/analytics/readmission-risk"),
        ("costs", "/api/analytics/costs"),
    ]
    .into_iter()
    .map(|(name, path)| (name.to_string(), path.to_string()))
    .collect::<BTreeMap<_, _>>();

    Json(RootRes {
        message: "Welcome to Healthcare Analytics API".into(),
        version: API_VERSION.into(),
        endpoints,
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Always answers `200`; an unreachable database is reported as `unhealthy` in the body.
#[axum::debug_handler]
async fn health(State(state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health(state.service.as_ref()))
}

#[utoipa::path(
    get,
    path = "/api/summary",
    responses(
        (status = 200, description = "Executive summary", body = SummaryRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn summary(State(state): State<AppState>) -> Result<Json<SummaryRes>, ApiError> {
    match state.service.executive_summary() {
        Ok(summary) => Ok(Json(SummaryRes::from(&summary))),
        Err(e) => Err(internal_error("Executive summary", e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/patients",
    params(LimitQuery),
    responses(
        (status = 200, description = "List of patients", body = [PatientRes]),
        (status = 400, description = "Limit outside 1..=1000"),
        (status = 500, description = "Internal server error")
    )
)]
/// List patients, up to `limit` (default 100).
#[axum::debug_handler]
async fn list_patients(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<PatientRes>>, ApiError> {
    let limit = resolve_limit(&query, PATIENT_LIMIT_DEFAULT, PATIENT_LIMIT_MAX)?;
    let patients = state
        .service
        .patients(limit)
        .map_err(|e| internal_error("List patients", e))?;
    Ok(Json(convert_all(&patients)))
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    params(("id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Patient record with clinical timeline", body = PatientDetailRes),
        (status = 400, description = "Invalid patient id"),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Retrieve one patient with conditions, medications, encounters and allergies.
///
/// # Errors
/// Returns `400 Bad Request` for a malformed id and `404 Not Found` when no patient matches.
#[axum::debug_handler]
async fn patient_detail(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<PatientDetailRes>, ApiError> {
    let id = match validate_patient_id(&id) {
        Ok(id) => id,
        Err(e) => {
            tracing::debug!("rejected patient id: {}", e);
            return Err((StatusCode::BAD_REQUEST, "Invalid patient id"));
        }
    };

    match state.service.patient_detail(id) {
        Ok(Some(detail)) => Ok(Json(PatientDetailRes::from(&detail))),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Patient not found")),
        Err(e) => Err(internal_error("Patient detail", e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/conditions",
    params(LimitQuery),
    responses(
        (status = 200, description = "Most common conditions", body = [DescriptionCountRes]),
        (status = 400, description = "Limit outside 1..=100"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn conditions(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<DescriptionCountRes>>, ApiError> {
    let limit = resolve_limit(&query, TOP_LIMIT_DEFAULT, TOP_LIMIT_MAX)?;
    let rows = state
        .service
        .top_descriptions(ClinicalTable::Conditions, limit)
        .map_err(|e| internal_error("Conditions", e))?;
    Ok(Json(convert_all(&rows)))
}

#[utoipa::path(
    get,
    path = "/api/medications",
    params(LimitQuery),
    responses(
        (status = 200, description = "Most prescribed medications", body = [MedicationRes]),
        (status = 400, description = "Limit outside 1..=100"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn medications(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<MedicationRes>>, ApiError> {
    let limit = resolve_limit(&query, TOP_LIMIT_DEFAULT, TOP_LIMIT_MAX)?;
    let rows = state
        .service
        .medication_usage(limit)
        .map_err(|e| internal_error("Medications", e))?;
    Ok(Json(convert_all(&rows)))
}

#[utoipa::path(
    get,
    path = "/api/allergies",
    params(LimitQuery),
    responses(
        (status = 200, description = "Most common allergies", body = [DescriptionCountRes]),
        (status = 400, description = "Limit outside 1..=100"),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn allergies(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<DescriptionCountRes>>, ApiError> {
    let limit = resolve_limit(&query, TOP_LIMIT_DEFAULT, TOP_LIMIT_MAX)?;
    let rows = state
        .service
        .top_descriptions(ClinicalTable::Allergies, limit)
        .map_err(|e| internal_error("Allergies", e))?;
    Ok(Json(convert_all(&rows)))
}

#[utoipa::path(
    get,
    path = "/api/analytics/risk-scores",
    responses(
        (status = 200, description = "Patient risk overview, or a no-data message", body = RiskScoresRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Patient risk overview: tier counts and the first ten high risk patients.
#[axum::debug_handler]
async fn risk_scores(State(state): State<AppState>) -> Result<Json<RiskScoresRes>, ApiError> {
    let scored = state
        .service
        .patient_risk_scores()
        .map_err(|e| internal_error("Risk scores", e))?;

    Ok(Json(match RiskOverview::from_scored(&scored) {
        Some(overview) => RiskScoresRes::Overview((&overview).into()),
        None => RiskScoresRes::NoData(MessageRes::new("No risk data available")),
    }))
}

#[utoipa::path(
    get,
    path = "/api/analytics/readmission-risk",
    responses(
        (status = 200, description = "Readmission risk overview, or a no-data message", body = ReadmissionRiskRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn readmission_risk(
    State(state): State<AppState>,
) -> Result<Json<ReadmissionRiskRes>, ApiError> {
    let scored = state
        .service
        .readmission_risk()
        .map_err(|e| internal_error("Readmission risk", e))?;

    Ok(Json(match ReadmissionOverview::from_scored(&scored) {
        Some(overview) => ReadmissionRiskRes::Overview((&overview).into()),
        None => ReadmissionRiskRes::NoData(MessageRes::new(
            "Insufficient data for readmission prediction",
        )),
    }))
}

#[utoipa::path(
    get,
    path = "/api/analytics/costs",
    responses(
        (status = 200, description = "Cost overview, or a no-data message", body = CostAnalysisRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn cost_analysis(State(state): State<AppState>) -> Result<Json<CostAnalysisRes>, ApiError> {
    let categorized = state
        .service
        .cost_analysis()
        .map_err(|e| internal_error("Cost analysis", e))?;

    Ok(Json(match CostOverview::from_categorized(&categorized) {
        Some(overview) => CostAnalysisRes::Overview((&overview).into()),
        None => CostAnalysisRes::NoData(MessageRes::new("No cost data available")),
    }))
}

#[utoipa::path(
    get,
    path = "/api/analytics/insights",
    responses(
        (status = 200, description = "Demographic and cost statistics of the cohort", body = InsightsRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn insights(State(state): State<AppState>) -> Result<Json<InsightsRes>, ApiError> {
    match state.service.demographic_insights() {
        Ok(insights) => Ok(Json(InsightsRes::from(&insights))),
        Err(e) => Err(internal_error("Demographic insights", e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/analytics/seasonal-trends",
    responses(
        (status = 200, description = "Condition onsets per month over the trailing window", body = [SeasonalTrendRes]),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn seasonal_trends(
    State(state): State<AppState>,
) -> Result<Json<Vec<SeasonalTrendRes>>, ApiError> {
    let rows = state
        .service
        .seasonal_trends()
        .map_err(|e| internal_error("Seasonal trends", e))?;
    Ok(Json(convert_all(&rows)))
}

#[utoipa::path(
    get,
    path = "/api/analytics/medication-effectiveness",
    responses(
        (status = 200, description = "Medication and condition pairings", body = [MedicationOutcomeRes]),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn medication_effectiveness(
    State(state): State<AppState>,
) -> Result<Json<Vec<MedicationOutcomeRes>>, ApiError> {
    let rows = state
        .service
        .medication_effectiveness()
        .map_err(|e| internal_error("Medication effectiveness", e))?;
    Ok(Json(convert_all(&rows)))
}

#[utoipa::path(
    get,
    path = "/api/demographics/age-distribution",
    responses(
        (status = 200, description = "Patients per age group", body = [AgeGroupRes]),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn age_distribution(
    State(state): State<AppState>,
) -> Result<Json<Vec<AgeGroupRes>>, ApiError> {
    let groups = state
        .service
        .age_distribution()
        .map_err(|e| internal_error("Age distribution", e))?;
    Ok(Json(convert_all(&groups)))
}

#[utoipa::path(
    get,
    path = "/api/encounters/classes",
    responses(
        (status = 200, description = "Encounter volume and cost per class", body = [EncounterClassRes]),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn encounter_classes(
    State(state): State<AppState>,
) -> Result<Json<Vec<EncounterClassRes>>, ApiError> {
    let rows = state
        .service
        .encounter_classes()
        .map_err(|e| internal_error("Encounter classes", e))?;
    Ok(Json(convert_all(&rows)))
}

#[utoipa::path(
    get,
    path = "/api/providers",
    responses(
        (status = 200, description = "Busiest providers", body = [ProviderRes]),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn providers(State(state): State<AppState>) -> Result<Json<Vec<ProviderRes>>, ApiError> {
    let rows = state
        .service
        .provider_workload()
        .map_err(|e| internal_error("Provider workload", e))?;
    Ok(Json(convert_all(&rows)))
}
