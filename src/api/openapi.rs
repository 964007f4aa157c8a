//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, dashboard, health, transactions, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MyLib API",
        version = "1.0.0",
        description = "Library Management REST API"
    ),
    servers(
        (url = "/api", description = "API"),
        (url = "/", description = "Legacy unprefixed routes")
    ),
    paths(
        // Health
        health::health_check,
        // Auth
        auth::register,
        auth::login,
        // Books
        books::list_books,
        books::add_book,
        books::update_book,
        books::delete_book,
        // Transactions
        transactions::borrow_book,
        transactions::reserve_book,
        transactions::return_book,
        transactions::get_user_books,
        // Users
        users::get_user,
        users::update_user,
        // Dashboard
        dashboard::get_metrics,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::RegisterUser,
            crate::models::user::LoginRequest,
            crate::models::user::Role,
            auth::UserPayload,
            auth::LoginPayload,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            books::BookPayload,
            books::BooksPayload,
            // Transactions
            crate::models::transaction::Transaction,
            crate::models::transaction::TransactionStatus,
            crate::models::transaction::TransactionRequest,
            crate::models::transaction::TransactionWithBook,
            transactions::TransactionBookPayload,
            transactions::TransactionPayload,
            transactions::TransactionsPayload,
            // Users
            crate::models::user::UserProfile,
            crate::models::user::UpdateUser,
            // Dashboard
            crate::services::dashboard::DashboardMetrics,
            // Errors
            crate::error::FieldError,
            crate::error::ValidationDetails,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and login"),
        (name = "books", description = "Book catalog management"),
        (name = "transactions", description = "Borrow, reserve and return"),
        (name = "users", description = "User profiles"),
        (name = "dashboard", description = "Aggregate metrics")
    )
)]
pub struct ApiDoc;

/// Declares the `bearer_auth` scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
