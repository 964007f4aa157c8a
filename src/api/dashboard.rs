//! Dashboard endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, services::dashboard::DashboardMetrics, AppState};

use super::{envelope::ApiResponse, guard::ViewDashboard, Authorized};

/// Aggregate library metrics
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard metrics", body = DashboardMetrics),
        (status = 403, description = "Role not allowed")
    )
)]
pub async fn get_metrics(
    State(state): State<AppState>,
    _: Authorized<ViewDashboard>,
) -> AppResult<Json<ApiResponse<DashboardMetrics>>> {
    let metrics = state.services.dashboard.get_metrics().await?;
    Ok(Json(ApiResponse::ok("Dashboard metrics fetched successfully", metrics)))
}
