//! Mechanism selection.
//!
//! Maps the configured [`AuthType`] to a strategy value that carries exactly
//! the parameters its mechanism needs.

use gatekeeper_smtp::sasl::{CramMd5, Mechanism, Plain};
use gatekeeper_smtp::{AuthMechanism, ServerInfo};

use crate::error::{Error, Result};
use crate::source::AuthType;

/// Responder for the LOGIN mechanism.
///
/// LOGIN servers prompt for each field separately; the prompt text decides
/// which one is sent.
#[derive(Clone)]
pub struct LoginResponder {
    username: String,
    password: String,
}

impl LoginResponder {
    /// Creates a responder for the given credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for LoginResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponder")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Mechanism for LoginResponder {
    fn mechanism(&self) -> AuthMechanism {
        AuthMechanism::Login
    }

    fn start(&mut self, _server: &ServerInfo) -> gatekeeper_smtp::Result<Option<Vec<u8>>> {
        Ok(None)
    }

    fn next(&mut self, challenge: &[u8]) -> gatekeeper_smtp::Result<Vec<u8>> {
        // Some servers NUL-terminate the prompt
        let prompt = challenge.strip_suffix(b"\0").unwrap_or(challenge);
        match prompt {
            b"Username:" | b"User Name" => Ok(self.username.clone().into_bytes()),
            b"Password:" => Ok(self.password.clone().into_bytes()),
            other => Err(gatekeeper_smtp::Error::mechanism(format!(
                "unexpected server challenge: {:?}",
                String::from_utf8_lossy(other)
            ))),
        }
    }
}

/// The strategy chosen for one authentication attempt.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// PLAIN, bound to the configured host.
    Plain(Plain),
    /// LOGIN.
    Login(LoginResponder),
    /// CRAM-MD5.
    CramMd5(CramMd5),
}

impl Credentials {
    /// Selects the strategy for `auth`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedAuth`] for unknown mechanisms.
    pub fn select(auth: &AuthType, username: &str, password: &str, host: &str) -> Result<Self> {
        match auth {
            AuthType::Plain => Ok(Self::Plain(Plain::new("", username, password, host))),
            AuthType::Login => Ok(Self::Login(LoginResponder::new(username, password))),
            AuthType::CramMd5 => Ok(Self::CramMd5(CramMd5::new(username, password))),
            AuthType::Unsupported(name) => Err(Error::UnsupportedAuth(name.clone())),
        }
    }

    fn inner(&mut self) -> &mut (dyn Mechanism + Send) {
        match self {
            Self::Plain(m) => m,
            Self::Login(m) => m,
            Self::CramMd5(m) => m,
        }
    }
}

impl Mechanism for Credentials {
    fn mechanism(&self) -> AuthMechanism {
        match self {
            Self::Plain(_) => AuthMechanism::Plain,
            Self::Login(_) => AuthMechanism::Login,
            Self::CramMd5(_) => AuthMechanism::CramMd5,
        }
    }

    fn start(&mut self, server: &ServerInfo) -> gatekeeper_smtp::Result<Option<Vec<u8>>> {
        self.inner().start(server)
    }

    fn next(&mut self, challenge: &[u8]) -> gatekeeper_smtp::Result<Vec<u8>> {
        self.inner().next(challenge)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn local_server() -> ServerInfo {
        ServerInfo {
            name: "localhost".into(),
            ..ServerInfo::default()
        }
    }

    #[test]
    fn login_answers_username_and_password_prompts() {
        let mut login = LoginResponder::new("alice", "secret");
        assert_eq!(login.start(&local_server()).unwrap(), None);
        assert_eq!(login.next(b"Username:").unwrap(), b"alice");
        assert_eq!(login.next(b"Password:").unwrap(), b"secret");
        assert_eq!(login.next(b"User Name\0").unwrap(), b"alice");
    }

    #[test]
    fn login_rejects_other_prompts() {
        let mut login = LoginResponder::new("alice", "secret");
        let prompts: [&[u8]; 4] = [b"Token:", b"", b"username:", b"Password"];
        for prompt in prompts {
            let err = login.next(prompt).unwrap_err();
            assert!(matches!(err, gatekeeper_smtp::Error::Mechanism(_)));
        }
        let err = login.next(b"Realm:").unwrap_err();
        assert!(err.to_string().contains("Realm:"));
    }

    #[test]
    fn login_debug_hides_password() {
        let login = LoginResponder::new("alice", "hunter2");
        assert!(!format!("{login:?}").contains("hunter2"));
    }

    #[test]
    fn selects_each_mechanism() {
        let plain = Credentials::select(&AuthType::Plain, "a", "p", "mx").unwrap();
        assert_eq!(plain.mechanism(), AuthMechanism::Plain);
        let login = Credentials::select(&AuthType::Login, "a", "p", "mx").unwrap();
        assert_eq!(login.mechanism(), AuthMechanism::Login);
        let cram = Credentials::select(&AuthType::CramMd5, "a", "p", "mx").unwrap();
        assert_eq!(cram.mechanism(), AuthMechanism::CramMd5);
    }

    #[test]
    fn unsupported_mechanism_fails() {
        let err = Credentials::select(&AuthType::Unsupported("NTLM".into()), "a", "p", "mx")
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedAuth(ref n) if n == "NTLM"));
    }

    #[test]
    fn plain_is_bound_to_configured_host() {
        let mut plain = Credentials::select(&AuthType::Plain, "alice", "secret", "localhost")
            .unwrap();
        assert_eq!(
            plain.start(&local_server()).unwrap().unwrap(),
            b"\0alice\0secret"
        );

        let mut plain = Credentials::select(&AuthType::Plain, "alice", "secret", "mx").unwrap();
        assert!(plain.start(&local_server()).is_err());
    }

    #[test]
    fn login_strategy_delegates() {
        let mut login = Credentials::select(&AuthType::Login, "alice", "secret", "mx").unwrap();
        assert_eq!(login.next(b"Password:").unwrap(), b"secret");
    }
}
