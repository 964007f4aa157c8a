//! Data models for MyLib

pub mod book;
pub mod transaction;
pub mod user;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::ValidationError;

/// Reject strings that are empty once surrounding whitespace is removed
pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some(Cow::Borrowed("Value must not be empty"));
        return Err(error);
    }
    Ok(())
}

/// Integer request field that also accepts a numeric string (`"3"`).
///
/// Values that are neither are kept as `Invalid` so validation reports them
/// against the field instead of rejecting the whole body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawInt")]
pub enum IntInput {
    Value(i64),
    Invalid,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInt {
    Int(i64),
    Text(String),
    Other(serde_json::Value),
}

impl From<RawInt> for IntInput {
    fn from(raw: RawInt) -> Self {
        match raw {
            RawInt::Int(v) => IntInput::Value(v),
            RawInt::Text(s) => s
                .trim()
                .parse()
                .map(IntInput::Value)
                .unwrap_or(IntInput::Invalid),
            RawInt::Other(_) => IntInput::Invalid,
        }
    }
}

impl From<i32> for IntInput {
    fn from(value: i32) -> Self {
        IntInput::Value(value.into())
    }
}

impl IntInput {
    /// The value, when it is an integer that fits a column
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            IntInput::Value(v) => i32::try_from(*v).ok(),
            IntInput::Invalid => None,
        }
    }
}

fn int_at_least(value: &IntInput, min: i32) -> Result<(), ValidationError> {
    match value.as_i32() {
        Some(v) if v >= min => Ok(()),
        _ => {
            let mut error = ValidationError::new("range");
            error.message = Some(Cow::Owned(format!("Value must be an integer of at least {}", min)));
            Err(error)
        }
    }
}

pub(crate) fn validate_non_negative(value: &IntInput) -> Result<(), ValidationError> {
    int_at_least(value, 0)
}

pub(crate) fn validate_positive_id(value: &IntInput) -> Result<(), ValidationError> {
    int_at_least(value, 1)
}

/// Store text columns backed by a closed enum as plain TEXT.
///
/// The type must provide `as_str()` and a `FromStr` impl with `Err = String`.
macro_rules! impl_text_column {
    ($ty:ty) => {
        impl sqlx::Type<sqlx::Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

pub(crate) use impl_text_column;
