//! First-login provisioning of local accounts.

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::source::SmtpSource;
use crate::user::{CreateUserOverwriteOptions, LoginType, User, UserMeta, UserStore};

/// The local part of a login identifier, or the whole identifier when it
/// has no `@`.
#[must_use]
pub fn local_username(login: &str) -> &str {
    login.split_once('@').map_or(login, |(local, _)| local)
}

/// Builds the account a first successful login materializes.
#[must_use]
pub fn materialize_user(source: &SmtpSource, login: &str, password: &str) -> User {
    let name = local_username(login).to_lowercase();
    User {
        id: None,
        lower_name: name.clone(),
        name,
        email: login.to_string(),
        passwd: password.to_string(),
        login_type: LoginType::Smtp,
        login_source: source.auth_source_id,
        login_name: login.to_string(),
        is_active: false,
    }
}

/// Creates the local account for a verified login.
///
/// Creation is attempted once. On failure the attempted account comes back
/// inside [`Error::Store`].
///
/// # Errors
///
/// Returns [`Error::Store`] if the store rejects the account.
pub async fn create_local_user<S: UserStore>(
    source: &SmtpSource,
    store: &S,
    login: &str,
    password: &str,
) -> Result<User> {
    let mut user = materialize_user(source, login, password);
    let overwrite = CreateUserOverwriteOptions {
        is_active: Some(true),
    };

    match store
        .create_user(&mut user, &UserMeta::default(), &overwrite)
        .await
    {
        Ok(()) => {
            info!(name = %user.name, source = source.auth_source_id, "provisioned SMTP user on first login");
            Ok(user)
        }
        Err(source_err) => {
            warn!(name = %user.name, error = %source_err, "could not provision SMTP user");
            Err(Error::Store {
                user: Box::new(user),
                source: source_err,
            })
        }
    }
}
