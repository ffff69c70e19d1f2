use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::{ErrorKind, ServiceError};
use crate::db::models::{CreateUser, NewUser, UpdateUser, User};
use crate::repository::DynUserRepository;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    async fn create_user(&self, input: CreateUser) -> Result<User, ServiceError>;

    async fn update_user(&self, id: i64, input: UpdateUser) -> Result<(), ServiceError>;

    async fn delete_user(&self, id: i64) -> Result<(), ServiceError>;

    async fn get_all_users(&self) -> Result<Vec<User>, ServiceError>;

    async fn get_user_by_id(&self, id: i64) -> Result<User, ServiceError>;

    async fn get_user_by_username(&self, username: &str) -> Result<User, ServiceError>;

    async fn get_user_by_email(&self, email: &str) -> Result<User, ServiceError>;
}

/// Default [`UserService`] backed by a [`crate::repository::UserRepository`].
pub struct UserManager {
    repository: DynUserRepository,
    password_cost: u32,
}

impl UserManager {
    pub fn new(repository: DynUserRepository, password_cost: u32) -> Self {
        Self {
            repository,
            password_cost,
        }
    }
}

fn not_found(message: String, err: crate::repository::RepositoryError) -> ServiceError {
    if err.is_not_found() {
        ServiceError::new(ErrorKind::ResourceNotFound, message, err.to_string())
    } else {
        ServiceError::from_repository(
            err,
            ErrorKind::ErrorGettingUser,
            "An error occurred while looking for a user.",
        )
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn create_user(&self, input: CreateUser) -> Result<User, ServiceError> {
        let created_at = Utc::now();

        let password_hash = bcrypt::hash(&input.password, self.password_cost).map_err(|e| {
            tracing::error!("Failed to hash password: {}", e);
            ServiceError::new(
                ErrorKind::ErrorHashingPassword,
                "An error occurred while hashing the user password.",
                "The password could not be processed.",
            )
        })?;

        let new_user = NewUser {
            first_name: input.first_name,
            last_name: input.last_name,
            username: input.username,
            email: input.email,
            password_hash,
            picture: input.picture,
            created_at,
        };

        let user = self.repository.create(&new_user).await.map_err(|e| {
            ServiceError::from_repository(
                e,
                ErrorKind::ErrorCreatingUser,
                "An error occurred while creating the user.",
            )
        })?;

        tracing::info!("Created user {} ({})", user.id, user.username);
        Ok(user)
    }

    async fn update_user(&self, id: i64, input: UpdateUser) -> Result<(), ServiceError> {
        let mut existing = self.get_user_by_id(id).await?;

        if input.first_name.is_empty() || input.last_name.is_empty() || input.email.is_empty() {
            return Err(ServiceError::new(
                ErrorKind::EmptyFields,
                "You cannot leave user fields empty.",
                "Fill the corresponding fields to update the user.",
            ));
        }

        // Another user already owning the email is a conflict; the same user is not.
        match self.repository.get_by_email(&input.email).await {
            Ok(owner) if owner.id != id => {
                return Err(ServiceError::new(
                    ErrorKind::RepeatedEmail,
                    "There can't be two users with the same email.",
                    "You need to choose another email for this user.",
                ));
            }
            Ok(_) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                return Err(ServiceError::from_repository(
                    e,
                    ErrorKind::ErrorUpdatingUser,
                    "An error occurred while updating the user.",
                ));
            }
        }

        existing.first_name = input.first_name;
        existing.last_name = input.last_name;
        existing.email = input.email;
        existing.updated_at = Some(Utc::now());

        self.repository
            .update(id, &existing)
            .await
            .map_err(|e| {
                ServiceError::from_repository(
                    e,
                    ErrorKind::ErrorUpdatingUser,
                    "An error occurred while updating the user.",
                )
            })?;

        tracing::info!("Updated user {}", id);
        Ok(())
    }

    async fn delete_user(&self, id: i64) -> Result<(), ServiceError> {
        self.get_user_by_id(id).await?;

        self.repository.delete(id).await.map_err(|e| {
            ServiceError::from_repository(
                e,
                ErrorKind::ErrorDeleting,
                "An error occurred while removing the user.",
            )
        })?;

        tracing::info!("Deleted user {}", id);
        Ok(())
    }

    async fn get_all_users(&self) -> Result<Vec<User>, ServiceError> {
        self.repository.get_all().await.map_err(|e| {
            ServiceError::from_repository(
                e,
                ErrorKind::ErrorGettingUsers,
                "An error occurred while looking for all users.",
            )
        })
    }

    async fn get_user_by_id(&self, id: i64) -> Result<User, ServiceError> {
        self.repository
            .get_by_id(id)
            .await
            .map_err(|e| not_found(format!("There is not a user with id '{}'.", id), e))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, ServiceError> {
        self.repository.get_by_username(username).await.map_err(|e| {
            not_found(
                format!("There is not a user with username '{}'.", username),
                e,
            )
        })
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, ServiceError> {
        self.repository
            .get_by_email(email)
            .await
            .map_err(|e| not_found(format!("There is not a user with email '{}'.", email), e))
    }
}

pub type DynUserService = Arc<dyn UserService>;
