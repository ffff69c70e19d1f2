use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::{ErrorKind, ServiceError};
use crate::db::models::{CreatePost, NewPost, Post, UpdatePost};
use crate::repository::DynPostRepository;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostService: Send + Sync {
    async fn create_post(&self, input: CreatePost) -> Result<Post, ServiceError>;

    async fn update_post(&self, id: i64, input: UpdatePost) -> Result<(), ServiceError>;

    async fn delete_post(&self, id: i64) -> Result<(), ServiceError>;

    async fn get_all_posts(&self) -> Result<Vec<Post>, ServiceError>;

    async fn get_post_by_id(&self, id: i64) -> Result<Post, ServiceError>;

    async fn get_posts_by_user_id(&self, user_id: i64) -> Result<Vec<Post>, ServiceError>;
}

pub struct PostManager {
    repository: DynPostRepository,
}

impl PostManager {
    pub fn new(repository: DynPostRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl PostService for PostManager {
    async fn create_post(&self, input: CreatePost) -> Result<Post, ServiceError> {
        let new_post = NewPost {
            user_id: input.user_id,
            title: input.title,
            body: input.body,
            created_at: Utc::now(),
        };

        let post = self.repository.create(&new_post).await.map_err(|e| {
            ServiceError::from_repository(
                e,
                ErrorKind::ErrorCreatingPost,
                "An error occurred while creating the post.",
            )
        })?;

        tracing::info!("Created post {} for user {}", post.id, post.user_id);
        Ok(post)
    }

    async fn update_post(&self, id: i64, input: UpdatePost) -> Result<(), ServiceError> {
        let mut existing = self.get_post_by_id(id).await?;

        existing.title = input.title;
        existing.body = input.body;
        existing.updated_at = Some(Utc::now());

        self.repository.update(id, &existing).await.map_err(|e| {
            ServiceError::from_repository(
                e,
                ErrorKind::ErrorUpdatingPost,
                "An error occurred while updating the post.",
            )
        })?;

        tracing::info!("Updated post {}", id);
        Ok(())
    }

    async fn delete_post(&self, id: i64) -> Result<(), ServiceError> {
        self.get_post_by_id(id).await?;

        self.repository.delete(id).await.map_err(|e| {
            ServiceError::from_repository(
                e,
                ErrorKind::ErrorDeletingPost,
                "An error occurred while deleting the post.",
            )
        })?;

        tracing::info!("Deleted post {}", id);
        Ok(())
    }

    async fn get_all_posts(&self) -> Result<Vec<Post>, ServiceError> {
        self.repository.get_all().await.map_err(|e| {
            ServiceError::from_repository(
                e,
                ErrorKind::ErrorGettingPosts,
                "An error occurred while getting all posts.",
            )
        })
    }

    async fn get_post_by_id(&self, id: i64) -> Result<Post, ServiceError> {
        self.repository.get_by_id(id).await.map_err(|e| {
            if e.is_not_found() {
                ServiceError::new(
                    ErrorKind::ResourceNotFound,
                    format!("There is not a post with id '{}'.", id),
                    e.to_string(),
                )
            } else {
                ServiceError::from_repository(
                    e,
                    ErrorKind::ErrorGettingPost,
                    "An error occurred while getting a post by its id.",
                )
            }
        })
    }

    async fn get_posts_by_user_id(&self, user_id: i64) -> Result<Vec<Post>, ServiceError> {
        self.repository.get_by_user(user_id).await.map_err(|e| {
            ServiceError::from_repository(
                e,
                ErrorKind::ErrorGettingPosts,
                "An error occurred while getting the posts of a user.",
            )
        })
    }
}

pub type DynPostService = Arc<dyn PostService>;
