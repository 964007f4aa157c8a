//! Registration, login and token verification

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{parse_role, LoginRequest, NewUser, RegisterUser, User, UserClaims},
    repository::Repository,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new account
    pub async fn register(&self, request: RegisterUser) -> AppResult<User> {
        request.validate()?;
        let role = parse_role(&request.role)?;

        let email = request.email.trim().to_string();
        if self.repository.users.email_exists(&email, None).await? {
            return Err(AppError::Conflict("User with this email already exists".to_string()));
        }

        let new_user = NewUser {
            full_name: request.full_name.trim().to_string(),
            role,
            email,
            password_hash: hash_password(&request.password)?,
            phone_number: request.phone_number,
            id_number: request.id_number,
        };

        let user = self.repository.users.create(&new_user).await?;
        tracing::info!(user_id = user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Check credentials and issue a bearer token
    pub async fn login(&self, request: LoginRequest) -> AppResult<(String, User)> {
        request.validate()?;

        let user = match self.repository.users.get_by_email(request.email.trim()).await? {
            Some(user) => user,
            None => {
                tracing::warn!("Login failed: unknown email");
                return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
            }
        };

        if !verify_password(&request.password, &user.password)? {
            tracing::warn!(user_id = user.id, "Login failed: wrong password");
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        let token = UserClaims::new(&user, self.config.jwt_expiration_hours)?
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, user))
    }

    /// Resolve a bearer token to the user it was issued for.
    ///
    /// The user is re-read so that deleted accounts lose access immediately.
    pub async fn authenticate_token(&self, token: &str) -> AppResult<User> {
        let claims = UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|_| AppError::Authentication("Invalid or expired token".to_string()))?;

        self.repository
            .users
            .find_by_id(claims.id)
            .await?
            .ok_or_else(|| {
                AppError::Authentication("User associated with token no longer exists".to_string())
            })
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
