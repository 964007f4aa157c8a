//! User profile endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::user::{UpdateUser, UserProfile},
    AppState,
};

use super::{envelope::ApiResponse, ApiJson, ApiPath, AuthenticatedUser};

/// Get a user profile (own profile, or any profile for admins)
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = UserProfile),
        (status = 403, description = "Not your profile"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    AuthenticatedUser(requester): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let user = state.services.users.get(&requester, id).await?;
    Ok(Json(ApiResponse::ok("User retrieved successfully", user.into())))
}

/// Update a user profile (own profile, or any profile for admins)
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Invalid fields"),
        (status = 403, description = "Not your profile"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email taken by another user")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    AuthenticatedUser(requester): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(update): ApiJson<UpdateUser>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let user = state.services.users.update(&requester, id, update).await?;
    Ok(Json(ApiResponse::ok("Profile updated successfully", user.into())))
}
