use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, Row};

use super::RepositoryError;
use crate::db::models::{NewUser, User};
use crate::state::DbPool;

const USER_COLUMNS: &str =
    "id, first_name, last_name, username, email, password, picture, created_at, updated_at";

/// CRUD operations for users
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<User>, RepositoryError>;

    async fn get_by_id(&self, id: i64) -> Result<User, RepositoryError>;

    async fn get_by_username(&self, username: &str) -> Result<User, RepositoryError>;

    async fn get_by_email(&self, email: &str) -> Result<User, RepositoryError>;

    /// Insert a user and return it with its generated id
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError>;

    /// Overwrite the mutable fields of an existing user
    async fn update(&self, id: i64, user: &User) -> Result<(), RepositoryError>;

    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;
}

/// SQLite implementation
pub struct SqliteUserRepository {
    pool: DbPool,
}

impl SqliteUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn find_one(
        &self,
        column: &str,
        value: &dyn rusqlite::ToSql,
        missing: impl FnOnce() -> String,
    ) -> Result<User, RepositoryError> {
        let conn = self.pool.get()?;

        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");
        match conn.query_row(&sql, params![value], user_from_row) {
            Ok(user) => Ok(user),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(RepositoryError::NotFound(missing())),
            Err(e) => Err(e.into()),
        }
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        username: row.get(3)?,
        email: row.get(4)?,
        password_hash: row.get(5)?,
        picture: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn missing_id(id: i64) -> String {
    format!("the user with id '{}' does not exist", id)
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn get_all(&self) -> Result<Vec<User>, RepositoryError> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    async fn get_by_id(&self, id: i64) -> Result<User, RepositoryError> {
        self.find_one("id", &id, || missing_id(id))
    }

    async fn get_by_username(&self, username: &str) -> Result<User, RepositoryError> {
        self.find_one("username", &username, || {
            format!("the user with username '{}' does not exist", username)
        })
    }

    async fn get_by_email(&self, email: &str) -> Result<User, RepositoryError> {
        self.find_one("email", &email, || {
            format!("the user with email '{}' does not exist", email)
        })
    }

    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO users (first_name, last_name, username, password, email, picture, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.first_name,
                user.last_name,
                user.username,
                user.password_hash,
                user.email,
                user.picture,
                user.created_at
            ],
        )?;

        Ok(User {
            id: conn.last_insert_rowid(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            picture: user.picture.clone(),
            created_at: user.created_at,
            updated_at: None,
        })
    }

    async fn update(&self, id: i64, user: &User) -> Result<(), RepositoryError> {
        let conn = self.pool.get()?;

        let rows = conn.execute(
            "UPDATE users SET first_name = ?1, last_name = ?2, email = ?3, picture = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                user.first_name,
                user.last_name,
                user.email,
                user.picture,
                user.updated_at,
                id
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound(missing_id(id)));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let conn = self.pool.get()?;

        let rows = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;

        if rows == 0 {
            return Err(RepositoryError::NotFound(missing_id(id)));
        }
        Ok(())
    }
}

/// Type alias for Arc-wrapped repository (for services)
pub type DynUserRepository = Arc<dyn UserRepository>;
