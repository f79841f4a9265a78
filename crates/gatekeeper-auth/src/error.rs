//! Error types for the authentication source.
//!
//! Errors fall into four classes (see [`ErrorKind`]). Callers show
//! [`Error::user_message`] to the person logging in and log the full
//! `Display` + [`std::error::Error::source`] chain for operators.

use thiserror::Error;

use crate::user::{StoreError, User};

/// Errors that can occur while authenticating against an SMTP source.
#[derive(Debug, Error)]
pub enum Error {
    /// The login was rejected by the domain allow-list.
    ///
    /// Indistinguishable from an unknown account on purpose.
    #[error("user does not exist [name: {name}]")]
    UserNotExist {
        /// The rejected login identifier.
        name: String,
    },

    /// The SMTP server rejected the credentials with an error reply.
    #[error("invalid argument: username or password is incorrect")]
    InvalidCredentials(#[source] gatekeeper_smtp::Error),

    /// The configured mechanism is not one this source can run.
    #[error("unsupported SMTP auth type: {0}")]
    UnsupportedAuth(String),

    /// Transport failure that is not a verdict on the credentials.
    #[error(transparent)]
    Smtp(gatekeeper_smtp::Error),

    /// The local user store refused the new account.
    #[error("failed to create local user {:?}: {source}", .user.name)]
    Store {
        /// The account that was being created.
        user: Box<User>,
        /// Store failure.
        source: StoreError,
    },

    /// The caller cancelled the attempt.
    #[error("authentication cancelled")]
    Cancelled,

    /// The persisted source configuration could not be read.
    #[error("invalid SMTP source configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No such account (includes allow-list rejections).
    NotFound,
    /// The remote server refused the credentials.
    InvalidCredential,
    /// The caller cancelled the attempt.
    Cancelled,
    /// Configuration, network, TLS or store failure.
    Infrastructure,
}

impl Error {
    /// Classifies a failed SMTP exchange.
    ///
    /// Error replies to the AUTH exchange are verdicts on the credentials.
    /// Everything else, including error replies to the greeting, EHLO or
    /// STARTTLS, is an infrastructure problem and passes through untouched.
    #[must_use]
    pub fn from_exchange(err: gatekeeper_smtp::Error) -> Self {
        if err.is_auth_rejection() {
            Self::InvalidCredentials(err)
        } else {
            Self::Smtp(err)
        }
    }

    /// Returns the error class.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UserNotExist { .. } => ErrorKind::NotFound,
            Self::InvalidCredentials(_) => ErrorKind::InvalidCredential,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::UnsupportedAuth(_) | Self::Smtp(_) | Self::Store { .. } | Self::Config(_) => {
                ErrorKind::Infrastructure
            }
        }
    }

    /// Text safe to show to the person logging in.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound | ErrorKind::InvalidCredential => {
                "Username or password is incorrect."
            }
            ErrorKind::Cancelled => "The sign-in request was cancelled.",
            ErrorKind::Infrastructure => {
                "Sign-in is temporarily unavailable. Please contact your administrator."
            }
        }
    }

    /// The server's error reply behind an invalid-credential error.
    #[must_use]
    pub const fn protocol_error(&self) -> Option<&gatekeeper_smtp::Error> {
        match self {
            Self::InvalidCredentials(err) => Some(err),
            _ => None,
        }
    }

    /// The account that was being created when the store failed.
    #[must_use]
    pub fn attempted_user(&self) -> Option<&User> {
        match self {
            Self::Store { user, .. } => Some(&**user),
            _ => None,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn error_reply_becomes_invalid_credentials() {
        let err = Error::from_exchange(gatekeeper_smtp::Error::auth_rejected(
            535,
            "5.7.8 Authentication credentials invalid",
        ));
        assert_eq!(err.kind(), ErrorKind::InvalidCredential);
        assert_eq!(err.user_message(), "Username or password is incorrect.");

        let cause = err.source().unwrap();
        assert_eq!(
            cause.to_string(),
            "SMTP AUTH rejected 535: 5.7.8 Authentication credentials invalid"
        );
        assert_eq!(err.protocol_error().unwrap().reply_code(), Some(535));
    }

    #[test]
    fn session_error_replies_are_infrastructure() {
        for (code, text) in [
            (421, "4.3.2 Service not available"),
            (554, "5.7.1 Access denied"),
            (454, "4.7.0 TLS not available"),
        ] {
            let err = Error::from_exchange(gatekeeper_smtp::Error::smtp_error(code, text));
            assert_eq!(err.kind(), ErrorKind::Infrastructure);
            assert!(err.protocol_error().is_none());
            assert_ne!(err.user_message(), "Username or password is incorrect.");
        }
    }

    #[test]
    fn transport_failure_passes_through() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = Error::from_exchange(gatekeeper_smtp::Error::from(io));
        assert_eq!(err.kind(), ErrorKind::Infrastructure);
        assert!(err.protocol_error().is_none());
        assert!(matches!(err, Error::Smtp(gatekeeper_smtp::Error::Io(_))));
    }

    #[test]
    fn not_found_looks_like_bad_credentials_to_users() {
        let err = Error::UserNotExist {
            name: "bob@other.org".into(),
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.user_message(), "Username or password is incorrect.");
        assert_eq!(err.to_string(), "user does not exist [name: bob@other.org]");
    }

    #[test]
    fn unsupported_auth_is_infrastructure() {
        let err = Error::UnsupportedAuth("GSSAPI".into());
        assert_eq!(err.kind(), ErrorKind::Infrastructure);
        assert_eq!(err.to_string(), "unsupported SMTP auth type: GSSAPI");
    }
}
