//! User profile service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{Capability, UpdateUser, User},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Read a profile; members may only read their own
    pub async fn get(&self, requester: &User, id: i32) -> AppResult<User> {
        ensure_self_or_admin(requester, id, "You can only view your own profile")?;
        self.repository.users.get_by_id(id).await
    }

    /// Apply a partial profile update; members may only update their own
    pub async fn update(&self, requester: &User, id: i32, update: UpdateUser) -> AppResult<User> {
        update.validate()?;
        ensure_self_or_admin(requester, id, "You can only update your own profile")?;

        // Surface a missing target before the email check reports a conflict
        self.repository.users.get_by_id(id).await?;

        if let Some(email) = update.email.as_deref() {
            if self.repository.users.email_exists(email.trim(), Some(id)).await? {
                return Err(AppError::Conflict(
                    "Email is already taken by another user".to_string(),
                ));
            }
        }

        let user = self.repository.users.update(id, &update).await?;
        tracing::info!(user_id = id, updated_by = requester.id, "Profile updated");
        Ok(user)
    }
}

fn ensure_self_or_admin(requester: &User, id: i32, message: &str) -> AppResult<()> {
    if requester.id == id || requester.role.can(Capability::ManageAnyProfile) {
        Ok(())
    } else {
        Err(AppError::Authorization(message.to_string()))
    }
}
