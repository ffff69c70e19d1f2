use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::config::Config;
use crate::repository::{SqlitePostRepository, SqliteUserRepository};
use crate::service::{DynPostService, DynUserService, PostManager, UserManager};

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub users: DynUserService,
    pub posts: DynPostService,
}

impl AppState {
    /// Wire the SQLite repositories and their services onto one pool.
    pub fn from_pool(pool: DbPool, config: &Config) -> Self {
        let users = UserManager::new(
            Arc::new(SqliteUserRepository::new(pool.clone())),
            config.security.password_cost,
        );
        let posts = PostManager::new(Arc::new(SqlitePostRepository::new(pool)));

        Self {
            users: Arc::new(users),
            posts: Arc::new(posts),
        }
    }
}
