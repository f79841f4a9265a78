//! Error types for SMTP operations.

use std::io;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TLS error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Server returned an error reply outside the AUTH exchange.
    #[error("SMTP error {code}: {message}")]
    SmtpError {
        /// Reply code (e.g., 535).
        code: u16,
        /// Error message from server.
        message: String,
    },

    /// Server answered the AUTH exchange with an error reply.
    #[error("SMTP AUTH rejected {code}: {message}")]
    AuthRejected {
        /// Reply code (e.g., 535).
        code: u16,
        /// Error message from server.
        message: String,
    },

    /// Protocol error (unexpected or malformed response).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The local SASL mechanism refused to continue the exchange.
    #[error("Authentication mechanism error: {0}")]
    Mechanism(String),

    /// Feature not supported by server.
    #[error("Server does not support {0}")]
    NotSupported(String),
}

impl Error {
    /// Creates an SMTP error from a reply code and message.
    #[must_use]
    pub fn smtp_error(code: u16, message: impl Into<String>) -> Self {
        Self::SmtpError {
            code,
            message: message.into(),
        }
    }

    /// Creates an AUTH rejection from a reply code and message.
    #[must_use]
    pub fn auth_rejected(code: u16, message: impl Into<String>) -> Self {
        Self::AuthRejected {
            code,
            message: message.into(),
        }
    }

    /// Creates a mechanism error.
    #[must_use]
    pub fn mechanism(message: impl Into<String>) -> Self {
        Self::Mechanism(message.into())
    }

    /// Returns true if the server answered with a structured error reply,
    /// at any stage of the session.
    #[must_use]
    pub const fn is_protocol_reply(&self) -> bool {
        matches!(self, Self::SmtpError { .. } | Self::AuthRejected { .. })
    }

    /// Returns true if the server refused the AUTH exchange itself.
    #[must_use]
    pub const fn is_auth_rejection(&self) -> bool {
        matches!(self, Self::AuthRejected { .. })
    }

    /// Returns the reply code for server error replies.
    #[must_use]
    pub const fn reply_code(&self) -> Option<u16> {
        match self {
            Self::SmtpError { code, .. } | Self::AuthRejected { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns true if this is a permanent error (5xx).
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self.reply_code(), Some(500..=599))
    }

    /// Returns true if this is a transient error (4xx).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self.reply_code(), Some(400..=499))
    }
}
