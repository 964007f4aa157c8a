//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::{LoginRequest, RegisterUser, UserProfile},
    AppState,
};

use super::{envelope::ApiResponse, ApiJson};

/// `data` of a registration response
#[derive(Serialize, ToSchema)]
pub struct UserPayload {
    pub user: UserProfile,
}

/// `data` of a login response
#[derive(Serialize, ToSchema)]
pub struct LoginPayload {
    /// Bearer token for the `Authorization` header
    pub token: String,
    pub user: UserProfile,
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "User registered", body = UserPayload),
        (status = 400, description = "Invalid fields, role or password confirmation"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterUser>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserPayload>>)> {
    let user = state.services.auth.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "User registered successfully",
            UserPayload { user: user.into() },
        )),
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginPayload),
        (status = 400, description = "Invalid fields"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginPayload>>> {
    let (token, user) = state.services.auth.login(request).await?;

    Ok(Json(ApiResponse::ok(
        "Login successful",
        LoginPayload {
            token,
            user: user.into(),
        },
    )))
}
