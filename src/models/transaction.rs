//! Borrow/reserve/return transaction model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{book::Book, impl_text_column, validate_positive_id, IntInput};

/// Transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Borrowed,
    Reserved,
    Returned,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Borrowed => "borrowed",
            TransactionStatus::Reserved => "reserved",
            TransactionStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "borrowed" => Ok(TransactionStatus::Borrowed),
            "reserved" => Ok(TransactionStatus::Reserved),
            "returned" => Ok(TransactionStatus::Returned),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

impl_text_column!(TransactionStatus);

/// Transaction model from database
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Active transaction with its book, for "my books" listings
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransactionWithBook {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub book: Book,
}

/// Borrow, reserve and return requests; ids may be sent as numbers or numeric strings
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[validate(
        required(message = "Valid userId is required"),
        custom(function = "validate_positive_id", message = "Valid userId is required")
    )]
    #[schema(value_type = i32)]
    pub user_id: Option<IntInput>,
    #[validate(
        required(message = "Valid bookId is required"),
        custom(function = "validate_positive_id", message = "Valid bookId is required")
    )]
    #[schema(value_type = i32)]
    pub book_id: Option<IntInput>,
}

impl TransactionRequest {
    /// Validated `(user_id, book_id)` pair
    pub fn ids(&self) -> Result<(i32, i32), validator::ValidationErrors> {
        self.validate()?;
        let id = |field: &Option<IntInput>| field.and_then(|v| v.as_i32()).unwrap_or_default();
        Ok((id(&self.user_id), id(&self.book_id)))
    }
}
