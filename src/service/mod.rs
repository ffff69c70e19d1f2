//! Business rules on top of the repositories.
//!
//! Services never hand storage errors upward; every failure is re-wrapped as
//! a [`ServiceError`] carrying a stable [`ErrorKind`] tag.

pub mod post;
pub mod user;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::repository::RepositoryError;

pub use post::{DynPostService, PostManager, PostService};
pub use user::{DynUserService, UserManager, UserService};

/// Client-facing details for failures below the service layer. The native
/// error is logged, never returned.
pub const STORAGE_FAILURE_DETAILS: &str = "The data store could not complete the operation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ResourceNotFound,
    EmptyFields,
    RepeatedEmail,
    ErrorHashingPassword,
    ErrorCreatingUser,
    ErrorUpdatingUser,
    ErrorDeleting,
    ErrorGettingUsers,
    ErrorGettingUser,
    ErrorCreatingPost,
    ErrorUpdatingPost,
    ErrorDeletingPost,
    ErrorGettingPosts,
    ErrorGettingPost,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ResourceNotFound => "RESOURCE_NOT_FOUND",
            ErrorKind::EmptyFields => "EMPTY_FIELDS",
            ErrorKind::RepeatedEmail => "REPEATED_EMAIL",
            ErrorKind::ErrorHashingPassword => "ERROR_HASHING_PASSWORD",
            ErrorKind::ErrorCreatingUser => "ERROR_CREATING_USER",
            ErrorKind::ErrorUpdatingUser => "ERROR_UPDATING_USER",
            ErrorKind::ErrorDeleting => "ERROR_DELETING",
            ErrorKind::ErrorGettingUsers => "ERROR_GETTING_USERS",
            ErrorKind::ErrorGettingUser => "ERROR_GETTING_USER",
            ErrorKind::ErrorCreatingPost => "ERROR_CREATING_POST",
            ErrorKind::ErrorUpdatingPost => "ERROR_UPDATING_POST",
            ErrorKind::ErrorDeletingPost => "ERROR_DELETING_POST",
            ErrorKind::ErrorGettingPosts => "ERROR_GETTING_POSTS",
            ErrorKind::ErrorGettingPost => "ERROR_GETTING_POST",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message} ({details})")]
pub struct ServiceError {
    pub kind: ErrorKind,
    pub message: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

impl ServiceError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: details.into(),
            timestamp: Utc::now(),
        }
    }

    /// Wrap a repository failure: missing rows become `RESOURCE_NOT_FOUND`,
    /// anything else becomes `kind`.
    pub(crate) fn from_repository(
        err: RepositoryError,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        if err.is_not_found() {
            Self::new(
                ErrorKind::ResourceNotFound,
                "The requested resource was not found.",
                err.to_string(),
            )
        } else {
            tracing::error!("{}: {}", kind, err);
            Self::new(kind, message, STORAGE_FAILURE_DETAILS)
        }
    }
}
