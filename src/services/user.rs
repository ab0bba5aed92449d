//! User service implementation
//!
//! This service handles get-or-create of users from verified token identities
//! and profile management.

use tracing::{debug, info};
use crate::database::repositories::UserRepository;
use crate::models::user::{UpdateProfileRequest, User, UserIdentity};
use crate::utils::errors::{BaropotError, Result};
use crate::utils::helpers::normalize_whitespace;

/// User service for managing user operations
#[derive(Clone)]
pub struct UserService {
    user_repository: UserRepository,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(user_repository: UserRepository) -> Self {
        Self { user_repository }
    }

    /// Register the token's user or get the existing row
    pub async fn ensure_user(&self, identity: &UserIdentity) -> Result<User> {
        if self.user_repository.insert_if_absent(identity).await? {
            info!(user_id = identity.id, "New user registered from access token");
        }

        self.user_repository
            .find_by_id(identity.id)
            .await?
            .ok_or_else(|| BaropotError::conflict(format!("email {} is registered to another user", identity.email)))
    }

    /// Get user by ID
    pub async fn me(&self, user_id: i64) -> Result<User> {
        debug!(user_id = user_id, "Getting user by ID");
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| BaropotError::not_found("User", user_id))
    }

    /// Update user profile
    pub async fn update_profile(&self, user_id: i64, request: UpdateProfileRequest) -> Result<User> {
        let Some(name) = request.name else {
            return self.me(user_id).await;
        };

        let name = normalize_whitespace(&name);
        if name.is_empty() {
            return Err(BaropotError::validation("name cannot be empty"));
        }

        let user = self
            .user_repository
            .update_name(user_id, &name)
            .await?
            .ok_or_else(|| BaropotError::not_found("User", user_id))?;

        info!(user_id = user_id, "User profile updated successfully");
        Ok(user)
    }
}
