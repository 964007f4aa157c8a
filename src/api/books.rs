//! Book catalog endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
    AppState,
};

use super::{
    envelope::ApiResponse,
    guard::{DeleteBooks, ManageCatalog},
    ApiJson, ApiPath, ApiQuery, AuthenticatedUser, Authorized,
};

#[derive(Serialize, ToSchema)]
pub struct BookPayload {
    pub book: Book,
}

#[derive(Serialize, ToSchema)]
pub struct BooksPayload {
    pub books: Vec<Book>,
}

/// List books, optionally filtered
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(BookQuery),
    responses(
        (status = 200, description = "Matching books, newest first", body = BooksPayload),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    ApiQuery(query): ApiQuery<BookQuery>,
) -> AppResult<Json<ApiResponse<BooksPayload>>> {
    let books = state.services.catalog.search_books(&query).await?;
    Ok(Json(ApiResponse::ok("Books fetched successfully", BooksPayload { books })))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/books/add",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book added", body = BookPayload),
        (status = 400, description = "Invalid fields or copy counts"),
        (status = 403, description = "Role not allowed"),
        (status = 409, description = "ISBN already in the catalog")
    )
)]
pub async fn add_book(
    State(state): State<AppState>,
    _: Authorized<ManageCatalog>,
    ApiJson(request): ApiJson<CreateBook>,
) -> AppResult<(StatusCode, Json<ApiResponse<BookPayload>>)> {
    let book = state.services.catalog.add_book(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Book added successfully", BookPayload { book })),
    ))
}

/// Partially update a book
#[utoipa::path(
    put,
    path = "/books/edit/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = BookPayload),
        (status = 400, description = "Invalid fields or copy counts"),
        (status = 403, description = "Role not allowed"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "ISBN already in the catalog")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    _: Authorized<ManageCatalog>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(update): ApiJson<UpdateBook>,
) -> AppResult<Json<ApiResponse<BookPayload>>> {
    let book = state.services.catalog.update_book(id, update).await?;
    Ok(Json(ApiResponse::ok("Book updated successfully", BookPayload { book })))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/delete/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted"),
        (status = 403, description = "Role not allowed"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book has transaction history")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    _: Authorized<DeleteBooks>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.catalog.delete_book(id).await?;
    Ok(Json(ApiResponse::message("Book deleted successfully")))
}
