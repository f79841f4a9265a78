//! The login pipeline: allow-list, remote verification, local account.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::model::SmtpSource;
use crate::error::{Error, Result};
use crate::mechanism::Credentials;
use crate::policy;
use crate::reconcile;
use crate::user::{User, UserStore};
use crate::verifier::{SmtpTransport, Transport};

impl SmtpSource {
    /// Authenticates `login`/`password` against this source's SMTP server.
    ///
    /// `user` is the local account already linked to `login`, if the caller
    /// found one; it is returned as-is on success. Otherwise a new active
    /// account is created in `store`.
    ///
    /// # Errors
    ///
    /// See [`SmtpSource::authenticate_with`].
    pub async fn authenticate<S: UserStore>(
        &self,
        cancel: &CancellationToken,
        store: &S,
        user: Option<User>,
        login: &str,
        password: &str,
    ) -> Result<User> {
        self.authenticate_with(&SmtpTransport, cancel, store, user, login, password)
            .await
    }

    /// Like [`SmtpSource::authenticate`], over any [`Transport`].
    ///
    /// # Errors
    ///
    /// - [`Error::UserNotExist`] if the allow-list rejects `login`
    /// - [`Error::UnsupportedAuth`] if the configured mechanism is unknown
    /// - [`Error::InvalidCredentials`] if the server replied with an error
    /// - [`Error::Smtp`] for connection, TLS and other transport failures
    /// - [`Error::Cancelled`] if `cancel` fires first
    /// - [`Error::Store`] if the new account cannot be created
    pub async fn authenticate_with<T: Transport, S: UserStore>(
        &self,
        transport: &T,
        cancel: &CancellationToken,
        store: &S,
        user: Option<User>,
        login: &str,
        password: &str,
    ) -> Result<User> {
        policy::check_allowed_domain(login, &self.allowed_domains)?;

        let mut credentials = Credentials::select(&self.auth, login, password, &self.host)?;

        debug!(source = self.auth_source_id, auth = %self.auth, login, "verifying credentials with SMTP server");
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            outcome = transport.exchange(self, &mut credentials) => outcome,
        };

        if let Err(err) = outcome {
            let err = Error::from_exchange(err);
            match &err {
                Error::InvalidCredentials(cause) if cause.is_transient() => {
                    warn!(login, error = %cause, "SMTP server temporarily refused authentication");
                }
                Error::InvalidCredentials(cause) => {
                    warn!(login, error = %cause, "SMTP server rejected credentials");
                }
                Error::Smtp(cause) if cause.is_protocol_reply() => warn!(
                    login,
                    error = %cause,
                    permanent = cause.is_permanent(),
                    "SMTP server refused the session before AUTH"
                ),
                other => warn!(login, error = %other, "SMTP authentication failed"),
            }
            return Err(err);
        }

        if let Some(user) = user {
            return Ok(user);
        }

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        reconcile::create_local_user(self, store, login, password).await
    }
}
