//! Health check endpoint

use axum::Json;

use super::envelope::ApiResponse;

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health_check() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("MyLib API is healthy"))
}
