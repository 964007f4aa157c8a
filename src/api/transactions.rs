//! Borrow, reserve and return endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        book::Book,
        transaction::{Transaction, TransactionRequest, TransactionWithBook},
    },
    AppState,
};

use super::{envelope::ApiResponse, ApiJson, ApiPath, AuthenticatedUser};

/// `data` of borrow and return responses
#[derive(Serialize, ToSchema)]
pub struct TransactionBookPayload {
    pub transaction: Transaction,
    /// The book with its updated copy counts
    pub book: Book,
}

/// `data` of a reserve response
#[derive(Serialize, ToSchema)]
pub struct TransactionPayload {
    pub transaction: Transaction,
}

#[derive(Serialize, ToSchema)]
pub struct TransactionsPayload {
    pub transactions: Vec<TransactionWithBook>,
}

/// Borrow a copy of a book
#[utoipa::path(
    post,
    path = "/transactions/borrow",
    tag = "transactions",
    security(("bearer_auth" = [])),
    request_body = TransactionRequest,
    responses(
        (status = 201, description = "Book borrowed", body = TransactionBookPayload),
        (status = 400, description = "Invalid ids or no copy available"),
        (status = 404, description = "User or book not found")
    )
)]
pub async fn borrow_book(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    ApiJson(request): ApiJson<TransactionRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<TransactionBookPayload>>)> {
    let (transaction, book) = state.services.transactions.borrow(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Book borrowed successfully",
            TransactionBookPayload { transaction, book },
        )),
    ))
}

/// Reserve a book that has no copy available
#[utoipa::path(
    post,
    path = "/transactions/reserve",
    tag = "transactions",
    security(("bearer_auth" = [])),
    request_body = TransactionRequest,
    responses(
        (status = 201, description = "Book reserved", body = TransactionPayload),
        (status = 400, description = "Invalid ids or book still available"),
        (status = 404, description = "User or book not found")
    )
)]
pub async fn reserve_book(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    ApiJson(request): ApiJson<TransactionRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<TransactionPayload>>)> {
    let transaction = state.services.transactions.reserve(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Book reserved successfully",
            TransactionPayload { transaction },
        )),
    ))
}

/// Return a borrowed or reserved book
#[utoipa::path(
    post,
    path = "/transactions/return",
    tag = "transactions",
    security(("bearer_auth" = [])),
    request_body = TransactionRequest,
    responses(
        (status = 200, description = "Book returned", body = TransactionBookPayload),
        (status = 400, description = "Invalid ids or all copies already returned"),
        (status = 404, description = "Book or active transaction not found")
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    ApiJson(request): ApiJson<TransactionRequest>,
) -> AppResult<Json<ApiResponse<TransactionBookPayload>>> {
    let (transaction, book) = state.services.transactions.return_book(&request).await?;

    Ok(Json(ApiResponse::ok(
        "Book returned successfully",
        TransactionBookPayload { transaction, book },
    )))
}

/// Active transactions of a user
#[utoipa::path(
    get,
    path = "/transactions/mybooks/{user_id}",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Borrowed and reserved books, newest first", body = TransactionsPayload),
        (status = 400, description = "Invalid user id")
    )
)]
pub async fn get_user_books(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    ApiPath(user_id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<TransactionsPayload>>> {
    let transactions = state.services.transactions.get_user_books(user_id).await?;

    Ok(Json(ApiResponse::ok(
        "User transactions fetched successfully",
        TransactionsPayload { transactions },
    )))
}
