//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{NewUser, UpdateUser, User},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Find user by ID, `None` when absent
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Get user by email (login identifier)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND ($2::int IS NULL OR id != $2))",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Create a new user
    pub async fn create(&self, user: &NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, role, email, password, phone_number, id_number)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&user.full_name)
        .bind(user.role)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone_number)
        .bind(&user.id_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from(e).on_unique_violation("User with this email already exists"))
    }

    /// Insert or leave untouched a user keyed on email; returns the stored row
    pub async fn upsert_by_email(&self, user: &NewUser) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, role, email, password, phone_number, id_number)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING *
            "#,
        )
        .bind(&user.full_name)
        .bind(user.role)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone_number)
        .bind(&user.id_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Apply a profile update; absent fields are left unchanged
    pub async fn update(&self, id: i32, update: &UpdateUser) -> AppResult<User> {
        let full_name = update.full_name.as_deref().map(str::trim);
        let email = update.email.as_deref().map(str::trim);

        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                full_name = COALESCE($2, full_name),
                email = COALESCE($3, email),
                phone_number = CASE WHEN $4 THEN $5 ELSE phone_number END,
                id_number = CASE WHEN $6 THEN $7 ELSE id_number END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(full_name)
        .bind(email)
        .bind(update.phone_number.is_some())
        .bind(update.phone_number.clone().flatten())
        .bind(update.id_number.is_some())
        .bind(update.id_number.clone().flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from(e).on_unique_violation("Email is already taken by another user"))?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Count all users
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
