//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the report endpoints and the master
//! definition for the OpenAPI specification.

use axum::{
    extract::{Extension, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use civic_connect_core::{
    domain::{Location, Report, ReportCategory, ReportDraft, ReportStatus, Requester},
    ports::{PortError, ScoringMode},
    stats::ReportStats,
    store::{LoadState, ReportsSnapshot},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody};
use crate::web::auth::{self, LoginRequest, SignupRequest, UserResponse};
use crate::web::extract::ApiJson;
use crate::web::middleware::resolve_requester;
use crate::web::state::AppState;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        list_reports_handler,
        report_stats_handler,
        get_report_handler,
        create_report_handler,
        update_status_handler,
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
    ),
    components(
        schemas(
            HealthResponse,
            GeoPoint,
            ReportResponse,
            ReportsResponse,
            StatsResponse,
            CategoryCountResponse,
            CreateReportRequest,
            UpdateStatusRequest,
            SignupRequest,
            LoginRequest,
            UserResponse,
            ErrorBody,
        )
    ),
    tags(
        (name = "Civic Connect API", description = "Civic issue reports with AI priority scoring.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// A GeoJSON point: `coordinates` is `[longitude, latitude]`.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    #[schema(example = "Point")]
    pub kind: String,
    pub coordinates: Vec<f64>,
}

impl GeoPoint {
    fn to_domain(&self) -> Result<Location, ApiError> {
        if self.kind != "Point" {
            return Err(ApiError::BadRequest(format!(
                "Unsupported location type '{}'",
                self.kind
            )));
        }
        match self.coordinates.as_slice() {
            [longitude, latitude] => Ok(Location::new(*longitude, *latitude)),
            _ => Err(ApiError::BadRequest(
                "Location coordinates must be [longitude, latitude]".to_string(),
            )),
        }
    }
}

impl From<Location> for GeoPoint {
    fn from(location: Location) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: vec![location.longitude, location.latitude],
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[schema(example = "pothole")]
    pub category: String,
    pub address: String,
    pub location: GeoPoint,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub upvotes: u32,
    pub upvoters: Vec<Uuid>,
    #[schema(example = "open")]
    pub status: String,
    pub ai_score: u8,
    pub ai_summary: String,
    pub admin_notified: bool,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        Self {
            id: report.id,
            title: report.title,
            description: report.description,
            category: report.category.as_str().to_string(),
            address: report.address,
            location: report.location.into(),
            images: report.images,
            created_at: report.created_at,
            created_by: report.created_by,
            upvotes: report.upvotes,
            upvoters: report.upvoters,
            status: report.status.as_str().to_string(),
            ai_score: report.ai_score,
            ai_summary: report.ai_summary,
            admin_notified: report.admin_notified,
        }
    }
}

/// The report list, or an explicit marker that the initial load is still running.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReportsResponse {
    Loading,
    Ready { reports: Vec<ReportResponse> },
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct CategoryCountResponse {
    pub category: String,
    pub count: usize,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total: usize,
    pub pending: usize,
    pub resolved: usize,
    pub top_category: Option<CategoryCountResponse>,
}

impl From<ReportStats> for StatsResponse {
    fn from(stats: ReportStats) -> Self {
        Self {
            total: stats.total,
            pending: stats.pending,
            resolved: stats.resolved,
            top_category: stats.top_category.map(|c| CategoryCountResponse {
                category: c.category.as_str().to_string(),
                count: c.count,
            }),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct HealthResponse {
    #[schema(example = "live")]
    pub scoring_mode: String,
    /// The configured model, present only when live scoring is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "gemini-2.5-flash")]
    pub scoring_model: Option<String>,
    #[schema(example = "ready")]
    pub store: String,
}

#[derive(Deserialize, Serialize, ToSchema, Debug)]
pub struct CreateReportRequest {
    pub title: String,
    pub description: String,
    #[schema(example = "pothole")]
    pub category: String,
    pub address: String,
    pub location: GeoPoint,
    #[serde(default)]
    pub images: Vec<String>,
}

impl CreateReportRequest {
    fn into_draft(self) -> Result<ReportDraft, ApiError> {
        Ok(ReportDraft {
            category: self.category.parse::<ReportCategory>()?,
            location: self.location.to_domain()?,
            title: self.title,
            description: self.description,
            address: self.address,
            images: self.images,
        })
    }
}

#[derive(Deserialize, Serialize, ToSchema, Debug)]
pub struct UpdateStatusRequest {
    #[schema(example = "in-progress")]
    pub status: String,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Report which scoring mode is active and whether the store is ready.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service status", body = HealthResponse))
)]
pub async fn health_handler(State(app_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store = match app_state.store.load_state() {
        LoadState::Uninitialized => "uninitialized",
        LoadState::Loading => "loading",
        LoadState::Ready => "ready",
    };
    let mode = app_state.store.scoring_mode();
    Json(HealthResponse {
        scoring_mode: mode.as_str().to_string(),
        scoring_model: (mode == ScoringMode::Live).then(|| app_state.config.scoring_model.clone()),
        store: store.to_string(),
    })
}

/// List all reports, most recent first.
#[utoipa::path(
    get,
    path = "/reports",
    responses(
        (status = 200, description = "Reports, or a loading marker", body = ReportsResponse)
    )
)]
pub async fn list_reports_handler(State(app_state): State<Arc<AppState>>) -> Json<ReportsResponse> {
    let response = match app_state.store.reports() {
        ReportsSnapshot::Loading => ReportsResponse::Loading,
        ReportsSnapshot::Ready(reports) => ReportsResponse::Ready {
            reports: reports.iter().cloned().map(ReportResponse::from).collect(),
        },
    };
    Json(response)
}

/// Dashboard statistics.
#[utoipa::path(
    get,
    path = "/reports/stats",
    responses(
        (status = 200, description = "Statistics", body = StatsResponse),
        (status = 503, description = "Reports are still loading", body = ErrorBody)
    )
)]
pub async fn report_stats_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = app_state.store.stats()?;
    Ok(Json(StatsResponse::from(stats)))
}

/// Fetch a single report.
#[utoipa::path(
    get,
    path = "/reports/{id}",
    params(("id" = Uuid, Path, description = "Report id")),
    responses(
        (status = 200, description = "The report", body = ReportResponse),
        (status = 404, description = "No such report", body = ErrorBody),
        (status = 503, description = "Reports are still loading", body = ErrorBody)
    )
)]
pub async fn get_report_handler(
    State(app_state): State<Arc<AppState>>,
    Path(report_id): Path<Uuid>,
) -> Result<Json<ReportResponse>, ApiError> {
    let report = app_state.store.get(report_id)?;
    Ok(Json(report.into()))
}

/// Submit a new report. It is scored before it is stored.
///
/// The `session` cookie identifies the submitting user; without one the
/// store refuses the submission.
#[utoipa::path(
    post,
    path = "/reports",
    request_body = CreateReportRequest,
    responses(
        (status = 201, description = "Report created", body = ReportResponse),
        (status = 400, description = "Invalid report", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 502, description = "AI assessment failed", body = ErrorBody)
    )
)]
pub async fn create_report_handler(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<ApiJson<CreateReportRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let requester = resolve_requester(&app_state, &headers).await;
    let draft = match payload.and_then(|ApiJson(body)| body.into_draft()) {
        Ok(draft) => draft,
        // Anonymous callers are told to sign in before anything else.
        Err(_) if requester.is_none() => return Err(PortError::Unauthenticated.into()),
        Err(e) => return Err(e),
    };
    let report = app_state.store.create(draft, requester.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(ReportResponse::from(report))))
}

/// Set the triage status of a report. Admins only.
#[utoipa::path(
    patch,
    path = "/reports/{id}/status",
    params(("id" = Uuid, Path, description = "Report id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ReportResponse),
        (status = 400, description = "Unknown status", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 403, description = "Not an admin", body = ErrorBody),
        (status = 404, description = "No such report", body = ErrorBody)
    )
)]
pub async fn update_status_handler(
    State(app_state): State<Arc<AppState>>,
    Path(report_id): Path<Uuid>,
    Extension(admin): Extension<Requester>,
    ApiJson(payload): ApiJson<UpdateStatusRequest>,
) -> Result<Json<ReportResponse>, ApiError> {
    let status = payload.status.parse::<ReportStatus>()?;
    let report = app_state.store.update_status(report_id, status)?;
    info!(%report_id, admin_id = %admin.id, "Status changed by admin");
    Ok(Json(report.into()))
}
