//! SMTP reply types.

/// SMTP reply from server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply code (e.g., 250).
    pub code: ReplyCode,
    /// Reply message lines.
    pub message: Vec<String>,
}

impl Reply {
    /// Creates a new reply.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec is not const-compatible
    pub fn new(code: ReplyCode, message: Vec<String>) -> Self {
        Self { code, message }
    }

    /// Returns true if this is a success reply (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code.is_success()
    }

    /// Returns true if the server expects another SASL response (334).
    #[must_use]
    pub fn is_auth_continue(&self) -> bool {
        self.code == ReplyCode::AUTH_CONTINUE
    }

    /// Returns the full message as a single string.
    #[must_use]
    pub fn message_text(&self) -> String {
        self.message.join("\n")
    }

    /// Converts a non-success reply into a structured SMTP error.
    #[must_use]
    pub fn into_error(self) -> crate::Error {
        crate::Error::smtp_error(self.code.as_u16(), self.message_text())
    }

    /// Converts the final reply of a failed AUTH exchange into an error.
    #[must_use]
    pub fn into_auth_error(self) -> crate::Error {
        crate::Error::auth_rejected(self.code.as_u16(), self.message_text())
    }
}

/// SMTP reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// Creates a new reply code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns true if this is a success code (2xx).
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Returns true if this is an intermediate reply (3xx).
    #[must_use]
    pub const fn is_intermediate(self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// Returns true if this is a transient error (4xx).
    #[must_use]
    pub const fn is_transient(self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    /// Returns true if this is a permanent error (5xx).
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        self.0 >= 500 && self.0 < 600
    }
}

impl std::fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Reply codes seen during greeting, EHLO, STARTTLS and AUTH (RFC 5321, RFC 4954)
impl ReplyCode {
    /// 220 Service ready
    pub const SERVICE_READY: Self = Self(220);
    /// 221 Service closing transmission channel
    pub const CLOSING: Self = Self(221);
    /// 235 Authentication succeeded
    pub const AUTH_SUCCEEDED: Self = Self(235);
    /// 250 Requested mail action okay, completed
    pub const OK: Self = Self(250);
    /// 334 Continue with authentication
    pub const AUTH_CONTINUE: Self = Self(334);
    /// 421 Service not available, closing transmission channel
    pub const SERVICE_UNAVAILABLE: Self = Self(421);
    /// 454 Temporary authentication failure
    pub const AUTH_TEMPORARY_FAILURE: Self = Self(454);
    /// 500 Syntax error, command unrecognized
    pub const SYNTAX_ERROR: Self = Self(500);
    /// 501 Syntax error in parameters or arguments
    pub const PARAMETER_ERROR: Self = Self(501);
    /// 502 Command not implemented
    pub const NOT_IMPLEMENTED: Self = Self(502);
    /// 503 Bad sequence of commands
    pub const BAD_SEQUENCE: Self = Self(503);
    /// 504 Command parameter not implemented (unrecognized mechanism)
    pub const PARAMETER_NOT_IMPLEMENTED: Self = Self(504);
    /// 530 Authentication required
    pub const AUTH_REQUIRED: Self = Self(530);
    /// 534 Authentication mechanism is too weak
    pub const MECHANISM_TOO_WEAK: Self = Self(534);
    /// 535 Authentication credentials invalid
    pub const AUTH_FAILED: Self = Self(535);
    /// 538 Encryption required for requested authentication mechanism
    pub const ENCRYPTION_REQUIRED: Self = Self(538);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod reply_code_tests {
        use super::*;

        #[test]
        fn classes() {
            assert!(ReplyCode::AUTH_SUCCEEDED.is_success());
            assert!(ReplyCode::SERVICE_READY.is_success());
            assert!(ReplyCode::AUTH_CONTINUE.is_intermediate());
            assert!(ReplyCode::AUTH_TEMPORARY_FAILURE.is_transient());
            assert!(ReplyCode::AUTH_FAILED.is_permanent());
            assert!(ReplyCode::ENCRYPTION_REQUIRED.is_permanent());
            assert!(!ReplyCode::AUTH_CONTINUE.is_success());
        }

        #[test]
        fn display() {
            assert_eq!(ReplyCode::AUTH_FAILED.to_string(), "535");
            assert_eq!(ReplyCode::new(334).as_u16(), 334);
        }
    }

    mod reply_tests {
        use super::*;

        #[test]
        fn auth_continue() {
            let reply = Reply::new(ReplyCode::AUTH_CONTINUE, vec!["VXNlcm5hbWU6".into()]);
            assert!(reply.is_auth_continue());
            assert!(!reply.is_success());
        }

        #[test]
        fn message_text_joins_lines() {
            let reply = Reply::new(
                ReplyCode::SERVICE_READY,
                vec!["smtp.example.com ESMTP".to_string(), "Ready".to_string()],
            );
            assert_eq!(reply.message_text(), "smtp.example.com ESMTP\nReady");
            assert_eq!(Reply::new(ReplyCode::OK, vec![]).message_text(), "");
        }

        #[test]
        fn into_error_keeps_code_and_text() {
            let reply = Reply::new(
                ReplyCode::AUTH_FAILED,
                vec!["5.7.8 Authentication credentials invalid".to_string()],
            );
            match reply.into_error() {
                crate::Error::SmtpError { code, message } => {
                    assert_eq!(code, 535);
                    assert_eq!(message, "5.7.8 Authentication credentials invalid");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[test]
        fn into_auth_error_is_auth_rejection() {
            let reply = Reply::new(ReplyCode::AUTH_FAILED, vec!["bad credentials".to_string()]);
            let err = reply.into_auth_error();
            assert!(err.is_auth_rejection());
            assert_eq!(err.reply_code(), Some(535));
        }
    }
}
