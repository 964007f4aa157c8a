//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{impl_text_column, validate_not_blank};
use crate::error::AppError;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Librarian,
    Staff,
    Member,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Librarian, Role::Staff, Role::Member];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Librarian => "librarian",
            Role::Staff => "staff",
            Role::Member => "member",
        }
    }

    /// Whether this role is in the allow-list of the given capability
    pub fn can(&self, capability: Capability) -> bool {
        capability.allowed_roles().contains(self)
    }

    /// Comma separated list of every role, for error messages
    pub fn allowed_list() -> String {
        Role::ALL
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "librarian" => Ok(Role::Librarian),
            "staff" => Ok(Role::Staff),
            "member" => Ok(Role::Member),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl_text_column!(Role);

/// Operations gated by role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Add and edit catalog entries
    ManageCatalog,
    /// Remove books from the catalog
    DeleteBooks,
    /// Read the aggregate dashboard
    ViewDashboard,
    /// Read and edit profiles other than one's own
    ManageAnyProfile,
}

impl Capability {
    /// The capability → role mapping table
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Capability::ManageCatalog => &[Role::Admin, Role::Librarian, Role::Staff],
            Capability::DeleteBooks => &[Role::Admin],
            Capability::ViewDashboard => &[Role::Admin, Role::Librarian],
            Capability::ManageAnyProfile => &[Role::Admin],
        }
    }
}

/// User row as stored in the database
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub full_name: String,
    pub role: Role,
    pub email: String,
    /// Hashed password (argon2)
    pub password: String,
    pub phone_number: Option<String>,
    pub id_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User as exposed by the API (never carries the password hash)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i32,
    pub full_name: String,
    pub role: Role,
    pub email: String,
    pub phone_number: Option<String>,
    pub id_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            full_name: user.full_name,
            role: user.role,
            email: user.email,
            phone_number: user.phone_number,
            id_number: user.id_number,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Full name is required"))]
    pub full_name: String,
    /// One of admin, librarian, staff, member (case-insensitive)
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "Role is required"))]
    pub role: String,
    #[serde(default)]
    #[validate(email(message = "Valid email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[serde(default)]
    #[validate(
        length(min = 6, message = "Confirm password must match password"),
        must_match(other = "password", message = "Passwords do not match")
    )]
    pub confirm_password: String,
    pub phone_number: Option<String>,
    pub id_number: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "Valid email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Validated user ready to be inserted
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub role: Role,
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub id_number: Option<String>,
}

/// Profile update request.
///
/// `phoneNumber` and `idNumber` distinguish "absent" (left unchanged) from
/// `null` or `""` (cleared).
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(custom(function = "validate_not_blank", message = "Full name cannot be empty"))]
    pub full_name: Option<String>,
    #[validate(email(message = "Valid email is required"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "clearable")]
    #[schema(value_type = Option<String>)]
    pub phone_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "clearable")]
    #[schema(value_type = Option<String>)]
    pub id_number: Option<Option<String>>,
}

/// `Some(None)` for `null` and blank strings, `Some(Some(v))` otherwise.
/// Combined with `#[serde(default)]` a missing field stays `None`.
fn clearable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(Some(
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()),
    ))
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub id: i32,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    pub fn new(user: &User, lifetime_hours: u64) -> Result<Self, AppError> {
        let now = Utc::now();
        let expires_at = i64::try_from(lifetime_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| AppError::Internal("Token lifetime out of range".to_string()))?;

        Ok(Self {
            id: user.id,
            role: user.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a JWT token (signature and expiry)
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

/// Parse the free-form role of a registration request
pub fn parse_role(raw: &str) -> Result<Role, AppError> {
    raw.parse().map_err(|_| {
        AppError::Validation(format!("Invalid role. Allowed roles: {}", Role::allowed_list()))
    })
}
