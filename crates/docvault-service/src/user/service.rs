//! The user directory.
//!
//! Deleting a user is all-or-nothing across services: the local record is
//! removed only after the document side confirmed erasure of everything
//! the user owned, via the deletion saga. An unconfirmed saga leaves the
//! user fully intact.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::types::id::UserId;
use docvault_saga::SagaCoordinator;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User identity.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact email, unique across the directory.
    pub email: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// In-memory user directory with saga-gated deletion.
pub struct UserService {
    users: DashMap<UserId, User>,
    coordinator: Arc<SagaCoordinator>,
}

impl UserService {
    pub fn new(coordinator: Arc<SagaCoordinator>) -> Self {
        Self {
            users: DashMap::new(),
            coordinator,
        }
    }

    /// Register a new user.
    pub fn register(&self, name: &str, email: &str) -> AppResult<User> {
        if name.trim().is_empty() {
            return Err(AppError::validation("User name must not be empty"));
        }
        if email.trim().is_empty() || !email.contains('@') {
            return Err(AppError::validation("A valid email address is required"));
        }
        if self.users.iter().any(|u| u.email == email) {
            return Err(AppError::conflict(format!(
                "A user with email '{email}' already exists"
            )));
        }

        let user = User {
            id: UserId::new(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        self.users.insert(user.id, user.clone());
        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Look up a user by id.
    pub fn get(&self, user_id: UserId) -> AppResult<User> {
        self.users
            .get(&user_id)
            .map(|u| u.clone())
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    /// Number of registered users.
    pub fn count(&self) -> usize {
        self.users.len()
    }

    /// Delete a user and everything they own, all-or-nothing.
    ///
    /// Runs the deletion saga first; the local record is removed only
    /// after the document side confirmed erasure. On an unconfirmed saga
    /// (failure reply or timeout) the user is retained and the call fails.
    pub async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        if !self.users.contains_key(&user_id) {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }

        let confirmed = self.coordinator.delete_documents_for(user_id).await?;
        if !confirmed {
            warn!(%user_id, "Deletion saga unconfirmed, user retained");
            return Err(AppError::saga(format!(
                "Document erasure for user {user_id} was not confirmed; user retained"
            )));
        }

        self.users.remove(&user_id);
        info!(%user_id, "User deleted");
        Ok(())
    }
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService")
            .field("users", &self.users.len())
            .finish_non_exhaustive()
    }
}
