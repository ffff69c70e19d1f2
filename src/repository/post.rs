use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Row};

use super::RepositoryError;
use crate::db::models::{NewPost, Post};
use crate::state::DbPool;

const POST_COLUMNS: &str = "id, user_id, title, body, created_at, updated_at";

/// CRUD operations for posts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Post>, RepositoryError>;

    async fn get_by_id(&self, id: i64) -> Result<Post, RepositoryError>;

    async fn get_by_user(&self, user_id: i64) -> Result<Vec<Post>, RepositoryError>;

    /// Insert a post and return it with its generated id
    async fn create(&self, post: &NewPost) -> Result<Post, RepositoryError>;

    /// Overwrite title, body and updated_at of an existing post
    async fn update(&self, id: i64, post: &Post) -> Result<(), RepositoryError>;

    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;
}

/// SQLite implementation
pub struct SqlitePostRepository {
    pool: DbPool,
}

impl SqlitePostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        body: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn missing_id(id: i64) -> String {
    format!("the post with id '{}' does not exist", id)
}

#[async_trait]
impl PostRepository for SqlitePostRepository {
    async fn get_all(&self) -> Result<Vec<Post>, RepositoryError> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(&format!("SELECT {POST_COLUMNS} FROM posts ORDER BY id"))?;
        let posts = stmt
            .query_map([], post_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    async fn get_by_id(&self, id: i64) -> Result<Post, RepositoryError> {
        let conn = self.pool.get()?;

        let result = conn.query_row(
            &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
            params![id],
            post_from_row,
        );

        match result {
            Ok(post) => Ok(post),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(RepositoryError::NotFound(missing_id(id)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_by_user(&self, user_id: i64) -> Result<Vec<Post>, RepositoryError> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE user_id = ?1 ORDER BY id"
        ))?;
        let posts = stmt
            .query_map(params![user_id], post_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    async fn create(&self, post: &NewPost) -> Result<Post, RepositoryError> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO posts (user_id, title, body, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![post.user_id, post.title, post.body, post.created_at],
        )?;

        Ok(Post {
            id: conn.last_insert_rowid(),
            user_id: post.user_id,
            title: post.title.clone(),
            body: post.body.clone(),
            created_at: post.created_at,
            updated_at: None,
        })
    }

    async fn update(&self, id: i64, post: &Post) -> Result<(), RepositoryError> {
        let conn = self.pool.get()?;

        let rows = conn.execute(
            "UPDATE posts SET title = ?1, body = ?2, updated_at = ?3 WHERE id = ?4",
            params![post.title, post.body, post.updated_at, id],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound(missing_id(id)));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let conn = self.pool.get()?;

        let rows = conn.execute("DELETE FROM posts WHERE id = ?1", params![id])?;

        if rows == 0 {
            return Err(RepositoryError::NotFound(missing_id(id)));
        }
        Ok(())
    }
}

pub type DynPostRepository = Arc<dyn PostRepository>;
