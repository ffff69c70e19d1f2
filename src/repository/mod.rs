// Repository pattern - isolates all database side effects
pub mod post;
pub mod user;

use thiserror::Error;

pub use post::{DynPostRepository, PostRepository, SqlitePostRepository};
pub use user::{DynUserRepository, SqliteUserRepository, UserRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("{0}")]
    NotFound(String),
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}
