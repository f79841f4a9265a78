//! SASL mechanisms for SMTP AUTH.
//!
//! A [`Mechanism`] is a strategy object: it names itself, optionally
//! produces an initial response, and then answers each decoded server
//! challenge. The client owns base64 framing and the 334 loop.
//!
//! Implements:
//! - PLAIN (RFC 4616)
//! - CRAM-MD5 (RFC 2195)
//!
//! LOGIN has no standard definition and is left to callers.

use crate::connection::ServerInfo;
use crate::error::{Error, Result};
use crate::types::AuthMechanism;
use hmac::{Hmac, Mac};
use md5::Md5;

/// A client-side SASL mechanism.
pub trait Mechanism {
    /// The mechanism name sent with `AUTH`.
    fn mechanism(&self) -> AuthMechanism;

    /// Begins the exchange, returning the initial response if the mechanism
    /// sends one.
    ///
    /// # Errors
    ///
    /// Returns an error if the mechanism refuses to run against this server.
    fn start(&mut self, server: &ServerInfo) -> Result<Option<Vec<u8>>>;

    /// Produces the response to a decoded server challenge.
    ///
    /// # Errors
    ///
    /// Returns an error if the challenge is not one the mechanism expects.
    fn next(&mut self, challenge: &[u8]) -> Result<Vec<u8>>;
}

/// PLAIN mechanism (RFC 4616).
///
/// Credentials are only sent over TLS or to the local machine, and only to
/// the host the mechanism was configured for.
#[derive(Clone)]
pub struct Plain {
    identity: String,
    username: String,
    password: String,
    host: String,
}

impl Plain {
    /// Creates a PLAIN mechanism bound to `host`.
    #[must_use]
    pub fn new(
        identity: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            identity: identity.into(),
            username: username.into(),
            password: password.into(),
            host: host.into(),
        }
    }
}

impl std::fmt::Debug for Plain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plain")
            .field("identity", &self.identity)
            .field("username", &self.username)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl Mechanism for Plain {
    fn mechanism(&self) -> AuthMechanism {
        AuthMechanism::Plain
    }

    fn start(&mut self, server: &ServerInfo) -> Result<Option<Vec<u8>>> {
        if !server.tls && !server.is_localhost() {
            return Err(Error::mechanism("unencrypted connection"));
        }
        if server.name != self.host {
            return Err(Error::mechanism("wrong host name"));
        }
        let response = format!("{}\0{}\0{}", self.identity, self.username, self.password);
        Ok(Some(response.into_bytes()))
    }

    fn next(&mut self, _challenge: &[u8]) -> Result<Vec<u8>> {
        Err(Error::mechanism("unexpected server challenge"))
    }
}

/// CRAM-MD5 mechanism (RFC 2195).
#[derive(Clone)]
pub struct CramMd5 {
    username: String,
    secret: String,
}

impl CramMd5 {
    /// Creates a CRAM-MD5 mechanism.
    #[must_use]
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for CramMd5 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CramMd5")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Mechanism for CramMd5 {
    fn mechanism(&self) -> AuthMechanism {
        AuthMechanism::CramMd5
    }

    fn start(&mut self, _server: &ServerInfo) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    fn next(&mut self, challenge: &[u8]) -> Result<Vec<u8>> {
        let mut mac = Hmac::<Md5>::new_from_slice(self.secret.as_bytes())
            .map_err(|e| Error::mechanism(format!("CRAM-MD5 key: {e}")))?;
        mac.update(challenge);
        let digest = hex::encode(mac.finalize().into_bytes());
        Ok(format!("{} {digest}", self.username).into_bytes())
    }
}
