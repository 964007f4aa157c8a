//! API handlers for MyLib REST endpoints

pub mod auth;
pub mod books;
pub mod dashboard;
pub mod envelope;
pub mod health;
pub mod openapi;
pub mod transactions;
pub mod users;

use std::{any::Any, marker::PhantomData};

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, State},
    http::{request::Parts, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    RequestPartsExt, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult, InternalErrorDetail},
    models::user::{Capability, User},
    AppState,
};

/// Extractor for the user behind a valid bearer token
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    /// Fail with 403 unless the user's role holds `capability`
    pub fn require(&self, capability: Capability) -> AppResult<()> {
        if self.0.role.can(capability) {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "You do not have permission to perform this action".to_string(),
            ))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| {
                AppError::Authentication("Authorization header missing or malformed".to_string())
            })?;

        let user = state.services.auth.authenticate_token(bearer.token()).await?;
        Ok(AuthenticatedUser(user))
    }
}

/// Capability demanded by an [`Authorized`] extractor
pub trait Guard {
    const CAPABILITY: Capability;
}

/// Guard markers, one per capability checked at the route level
pub mod guard {
    use super::Guard;
    use crate::models::user::Capability;

    pub struct ManageCatalog;
    pub struct DeleteBooks;
    pub struct ViewDashboard;

    impl Guard for ManageCatalog {
        const CAPABILITY: Capability = Capability::ManageCatalog;
    }

    impl Guard for DeleteBooks {
        const CAPABILITY: Capability = Capability::DeleteBooks;
    }

    impl Guard for ViewDashboard {
        const CAPABILITY: Capability = Capability::ViewDashboard;
    }
}

/// Authenticated user whose role holds `G::CAPABILITY`.
///
/// Placed before body and path extractors so a forbidden caller gets 403
/// whatever the rest of the request looks like.
pub struct Authorized<G>(pub User, PhantomData<G>);

impl<G: Guard> Authorized<G> {
    fn check(user: AuthenticatedUser) -> AppResult<Self> {
        user.require(G::CAPABILITY)?;
        Ok(Authorized(user.0, PhantomData))
    }
}

#[async_trait]
impl<G: Guard> FromRequestParts<AppState> for Authorized<G> {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        Self::check(user)
    }
}

/// JSON body whose rejections are rendered in the API envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path parameters whose rejections are rendered in the API envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Query string whose rejections are rendered in the API envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Every endpoint, relative to the mount point
fn routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Authentication
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Books
        .route("/books", get(books::list_books))
        .route("/books/add", post(books::add_book))
        .route("/books/edit/:id", put(books::update_book))
        .route("/books/delete/:id", delete(books::delete_book))
        // Transactions
        .route("/transactions/borrow", post(transactions::borrow_book))
        .route("/transactions/reserve", post(transactions::reserve_book))
        .route("/transactions/return", post(transactions::return_book))
        .route("/transactions/mybooks/:user_id", get(transactions::get_user_books))
        // Users
        .route("/users/:id", get(users::get_user).put(users::update_user))
        // Dashboard
        .route("/dashboard", get(dashboard::get_metrics))
}

/// Create the application router with all routes and middleware.
///
/// Routes are served both under `/api` and unprefixed for legacy clients.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    Router::new()
        .nest("/api", routes())
        .merge(routes())
        .fallback(not_found)
        .with_state(state.clone())
        .merge(openapi::create_openapi_router())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::map_response_with_state(state, log_internal_errors))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}

async fn not_found(uri: Uri) -> AppError {
    let path = uri
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_else(|| uri.path());
    AppError::NotFound(format!("Route {} not found", path))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    AppError::Internal(format!("Handler panicked: {}", detail)).into_response()
}

/// 500 responses carry their cause; production keeps it out of the default log level
async fn log_internal_errors(State(state): State<AppState>, response: Response) -> Response {
    if let Some(InternalErrorDetail(detail)) = response.extensions().get::<InternalErrorDetail>() {
        if state.config.is_production() {
            tracing::debug!(error = %detail, "Request failed");
        } else {
            tracing::error!(error = %detail, "Request failed");
        }
    }
    response
}
