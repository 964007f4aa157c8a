//! Error types for MyLib server

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::api::envelope::ApiResponse;

/// A single rejected request field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// `data` payload of a "Validation failed" response
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationDetails {
    pub errors: Vec<FieldError>,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed")]
    InvalidFields(Vec<FieldError>),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A request that is well-formed but not allowed in the current state
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Detail of an unexpected failure, attached to the 500 response so the
/// logging layer can decide how much of it to emit.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidFields(_) | AppError::Validation(_) | AppError::BusinessRule(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to the client
    fn public_message(&self) -> String {
        match self {
            AppError::InvalidFields(_) => "Validation failed".to_string(),
            AppError::Validation(msg)
            | AppError::Authentication(msg)
            | AppError::Authorization(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::BusinessRule(msg) => msg.clone(),
            AppError::Database(_) | AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Map a unique-constraint violation to `Conflict`, leaving other errors untouched
    pub fn on_unique_violation(self, message: &str) -> Self {
        match &self {
            AppError::Database(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                AppError::Conflict(message.to_string())
            }
            _ => self,
        }
    }

    /// Map a foreign-key violation to `Conflict`, leaving other errors untouched
    pub fn on_foreign_key_violation(self, message: &str) -> Self {
        match &self {
            AppError::Database(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                AppError::Conflict(message.to_string())
            }
            _ => self,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.public_message();
        let detail = self.to_string();

        let mut response = match self {
            AppError::InvalidFields(errors) => (
                status,
                Json(ApiResponse::failure(message, Some(ValidationDetails { errors }))),
            )
                .into_response(),
            _ => (status, Json(ApiResponse::<()>::failure(message, None))).into_response(),
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            response.extensions_mut().insert(InternalErrorDetail(detail));
        }

        response
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = to_camel_case(&field);
                errs.iter().map(move |e| FieldError {
                    field: field.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field)),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field).then(a.message.cmp(&b.message)));
        AppError::InvalidFields(fields)
    }
}

/// Request fields are reported with their JSON (camelCase) names
fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(format!("Invalid query string: {}", rejection.body_text()))
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
