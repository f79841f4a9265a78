//! The user-store seam.

use std::future::Future;

use super::model::{CreateUserOverwriteOptions, User, UserMeta};

/// Errors reported by a [`UserStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Another account already uses this name.
    #[error("user already exists [name: {0}]")]
    NameTaken(String),

    /// Another account already uses this e-mail address.
    #[error("e-mail has been used [email: {0}]")]
    EmailTaken(String),

    /// The name cannot be used for an account.
    #[error("name is invalid [name: {0:?}]")]
    InvalidName(String),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistent storage for local accounts.
///
/// Implementations own their concurrency control: two concurrent creations
/// of the same account must leave exactly one row and fail the other call.
pub trait UserStore: Send + Sync {
    /// Persists a new account.
    ///
    /// On success `user.id` is set and `overwrite` has been applied to
    /// `user`.
    ///
    /// # Errors
    ///
    /// Returns an error if the account cannot be stored.
    fn create_user(
        &self,
        user: &mut User,
        meta: &UserMeta,
        overwrite: &CreateUserOverwriteOptions,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
