//! Book (catalog) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{validate_non_negative, validate_not_blank, IntInput};
use crate::error::{AppError, AppResult};

const COPIES_EXCEEDED: &str = "Available copies cannot exceed total copies";

/// Book model from database
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    #[serde(rename = "ISBN")]
    pub isbn: String,
    pub category: String,
    pub total_copies: i32,
    pub available_copies: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// A borrow needs at least one copy on the shelf
    pub fn ensure_can_borrow(&self) -> AppResult<()> {
        if self.available_copies <= 0 {
            return Err(AppError::BusinessRule("No available copies to borrow".to_string()));
        }
        Ok(())
    }

    /// A reservation only makes sense once every copy is out
    pub fn ensure_can_reserve(&self) -> AppResult<()> {
        if self.available_copies > 0 {
            return Err(AppError::BusinessRule(
                "Book is currently available and cannot be reserved".to_string(),
            ));
        }
        Ok(())
    }

    /// A return must leave room below `total_copies`
    pub fn ensure_can_return(&self) -> AppResult<()> {
        if self.available_copies >= self.total_copies {
            return Err(AppError::BusinessRule("All copies are already returned".to_string()));
        }
        Ok(())
    }
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Author is required"))]
    pub author: String,
    #[serde(default, rename = "ISBN")]
    #[validate(custom(function = "validate_not_blank", message = "ISBN is required"))]
    pub isbn: String,
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Category is required"))]
    pub category: String,
    #[validate(
        required(message = "Total copies must be a non-negative integer"),
        custom(function = "validate_non_negative", message = "Total copies must be a non-negative integer")
    )]
    #[schema(value_type = i32)]
    pub total_copies: Option<IntInput>,
    #[validate(
        required(message = "Available copies must be a non-negative integer"),
        custom(function = "validate_non_negative", message = "Available copies must be a non-negative integer")
    )]
    #[schema(value_type = i32)]
    pub available_copies: Option<IntInput>,
}

/// Book fields ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub category: String,
    pub total_copies: i32,
    pub available_copies: i32,
}

impl CreateBook {
    /// Validate the request and produce trimmed, checked values
    pub fn into_new_book(self) -> AppResult<NewBook> {
        self.validate()?;

        let total_copies = copies(self.total_copies).unwrap_or_default();
        let available_copies = copies(self.available_copies).unwrap_or_default();
        if available_copies > total_copies {
            return Err(AppError::Validation(COPIES_EXCEEDED.to_string()));
        }

        Ok(NewBook {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            isbn: self.isbn.trim().to_string(),
            category: self.category.trim().to_string(),
            total_copies,
            available_copies,
        })
    }
}

/// Update book request; every field is optional
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    #[validate(custom(function = "validate_not_blank", message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(custom(function = "validate_not_blank", message = "Author cannot be empty"))]
    pub author: Option<String>,
    #[serde(rename = "ISBN")]
    #[validate(custom(function = "validate_not_blank", message = "ISBN cannot be empty"))]
    pub isbn: Option<String>,
    #[validate(custom(function = "validate_not_blank", message = "Category cannot be empty"))]
    pub category: Option<String>,
    #[validate(custom(function = "validate_non_negative", message = "Total copies must be a non-negative integer"))]
    #[schema(value_type = Option<i32>)]
    pub total_copies: Option<IntInput>,
    #[validate(custom(function = "validate_non_negative", message = "Available copies must be a non-negative integer"))]
    #[schema(value_type = Option<i32>)]
    pub available_copies: Option<IntInput>,
}

impl UpdateBook {
    /// Merge the supplied fields over `existing`.
    ///
    /// The copy counts are checked against the merged values, so lowering
    /// `totalCopies` alone can still be rejected.
    pub fn merge_into(&self, existing: &Book) -> AppResult<NewBook> {
        let total_copies = copies(self.total_copies).unwrap_or(existing.total_copies);
        let available_copies = copies(self.available_copies).unwrap_or(existing.available_copies);
        if available_copies > total_copies {
            return Err(AppError::BusinessRule(COPIES_EXCEEDED.to_string()));
        }

        let pick = |incoming: &Option<String>, current: &str| {
            incoming
                .as_deref()
                .map(str::trim)
                .unwrap_or(current)
                .to_string()
        };

        Ok(NewBook {
            title: pick(&self.title, &existing.title),
            author: pick(&self.author, &existing.author),
            isbn: pick(&self.isbn, &existing.isbn),
            category: pick(&self.category, &existing.category),
            total_copies,
            available_copies,
        })
    }
}

fn copies(value: Option<IntInput>) -> Option<i32> {
    value.and_then(|v| v.as_i32())
}

/// Catalog search parameters; every filter is an optional case-insensitive substring
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub category: Option<String>,
}

impl BookQuery {
    /// Non-empty filters as (column, pattern) pairs, in a fixed column order
    pub fn filters(&self) -> Vec<(&'static str, String)> {
        [
            ("title", &self.title),
            ("author", &self.author),
            ("isbn", &self.isbn),
            ("category", &self.category),
        ]
        .into_iter()
        .filter_map(|(column, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (column, format!("%{}%", escape_like(v))))
        })
        .collect()
    }
}

/// Escape LIKE wildcards so user input matches literally
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
