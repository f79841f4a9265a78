//! Type-state SMTP client.

use super::{ServerInfo, SmtpStream, TlsOptions};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::sasl::Mechanism;
use crate::types::{Extension, Reply, ReplyCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashSet;
use std::marker::PhantomData;
use tracing::debug;

/// Type-state marker for connected state.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker for authenticated state.
#[derive(Debug)]
pub struct Authenticated;

/// SMTP client with type-state pattern.
#[derive(Debug)]
pub struct Client<State> {
    stream: SmtpStream,
    server_info: ServerInfo,
    helo_name: String,
    _state: PhantomData<State>,
}

/// Connection trait for all states.
pub trait SmtpConnection {
    /// Returns the server information.
    fn server_info(&self) -> &ServerInfo;
}

impl<S> SmtpConnection for Client<S> {
    fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }
}

impl Client<Connected> {
    /// Creates a client from a stream and reads the server greeting.
    ///
    /// `server_name` is the host name that was dialed; it is used for
    /// STARTTLS and handed to SASL mechanisms.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the greeting fails or if the server returns an error.
    pub async fn from_stream(mut stream: SmtpStream, server_name: &str) -> Result<Self> {
        let greeting = Self::read_reply(&mut stream).await?;
        if !greeting.is_success() {
            return Err(greeting.into_error());
        }

        // Extract hostname from greeting (first word after code)
        let hostname = greeting
            .message
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            server_info: ServerInfo {
                name: server_name.to_string(),
                hostname,
                tls: stream.is_tls(),
                extensions: HashSet::new(),
            },
            stream,
            helo_name: String::new(),
            _state: PhantomData,
        })
    }

    /// Sends EHLO and discovers server capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the EHLO command fails.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Self> {
        self.helo_name = client_hostname.to_string();
        self.send_ehlo().await?;
        Ok(self)
    }

    /// Upgrades the connection to TLS using STARTTLS and repeats EHLO.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is not supported or if the upgrade fails.
    pub async fn starttls(mut self, options: TlsOptions) -> Result<Self> {
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }

        let reply = self.send_command(Command::StartTls).await?;
        if !reply.is_success() {
            return Err(reply.into_error());
        }

        self.stream = self
            .stream
            .upgrade_to_tls(&self.server_info.name, options)
            .await?;
        self.server_info.tls = self.stream.is_tls();

        // Capabilities learned before the handshake must be discarded
        self.send_ehlo().await?;
        Ok(self)
    }

    /// Runs a SASL `AUTH` exchange driven by `mechanism`.
    ///
    /// Every 334 reply is base64-decoded and passed to the mechanism. If the
    /// mechanism rejects a challenge the exchange is aborted with `*` and the
    /// mechanism's error is returned. A final non-2xx reply is returned as
    /// [`Error::AuthRejected`].
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the credentials, the mechanism
    /// fails, or the connection breaks.
    pub async fn authenticate<M>(mut self, mechanism: &mut M) -> Result<Client<Authenticated>>
    where
        M: Mechanism + Send,
    {
        let name = mechanism.mechanism();
        let initial_response = mechanism
            .start(&self.server_info)?
            .map(|resp| STANDARD.encode(resp));

        debug!(mechanism = %name, "starting SMTP AUTH exchange");
        let mut reply = self
            .send_command(Command::Auth {
                mechanism: name,
                initial_response,
            })
            .await?;

        while reply.is_auth_continue() {
            let response = STANDARD
                .decode(reply.message_text().trim())
                .map_err(|e| Error::Protocol(format!("Invalid base64 challenge: {e}")))
                .and_then(|challenge| mechanism.next(&challenge));

            let response = match response {
                Ok(response) => response,
                Err(err) => {
                    if let Err(cancel_err) = self.send_command(Command::AuthCancel).await {
                        debug!(error = %cancel_err, "failed to abort AUTH exchange");
                    }
                    return Err(err);
                }
            };

            reply = self
                .send_command(Command::AuthResponse(STANDARD.encode(response)))
                .await?;
        }

        if !reply.is_success() {
            return Err(reply.into_auth_error());
        }

        debug!(mechanism = %name, "SMTP AUTH accepted");
        Ok(Client {
            stream: self.stream,
            server_info: self.server_info,
            helo_name: self.helo_name,
            _state: PhantomData,
        })
    }

    async fn send_ehlo(&mut self) -> Result<()> {
        let cmd = Command::Ehlo {
            hostname: self.helo_name.clone(),
        };
        let reply = self.send_command(cmd).await?;

        if !reply.is_success() {
            return Err(reply.into_error());
        }

        // Skip first line which is the greeting
        self.server_info.extensions = reply
            .message
            .iter()
            .skip(1)
            .map(|line| Extension::parse(line))
            .collect();
        Ok(())
    }
}

// Common implementation for all states
impl<S> Client<S> {
    async fn send_command(&mut self, cmd: Command) -> Result<Reply> {
        let data = cmd.serialize();
        self.stream.write_all(&data).await?;
        Self::read_reply(&mut self.stream).await
    }

    async fn read_reply(stream: &mut SmtpStream) -> Result<Reply> {
        let mut lines = Vec::new();
        loop {
            let line = stream.read_line().await?;
            if line.is_empty() {
                continue;
            }

            let is_last = is_last_reply_line(&line);
            lines.push(line);

            if is_last {
                break;
            }
        }

        parse_reply(&lines)
    }

    /// Sends QUIT and closes the connection (available in any state).
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT command fails.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.send_command(Command::Quit).await?;

        if !reply.is_success() && reply.code != ReplyCode::CLOSING {
            return Err(reply.into_error());
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::sasl::{CramMd5, Plain};
    use crate::types::AuthMechanism;
    use tokio_test::io::Builder;

    const GREETING: &[u8] = b"220 mx.example.com ESMTP ready\r\n";
    const EHLO: &[u8] = b"EHLO client.test\r\n";
    const EHLO_REPLY: &[u8] = b"250-mx.example.com greets client.test\r\n250-SIZE 1000000\r\n250 AUTH PLAIN LOGIN CRAM-MD5\r\n";

    async fn connected(mock: tokio_test::io::Mock, name: &str) -> Client<Connected> {
        Client::from_stream(SmtpStream::mock(mock), name)
            .await
            .unwrap()
            .ehlo("client.test")
            .await
            .unwrap()
    }

    /// Mechanism that answers scripted challenges and fails on anything else.
    struct Scripted(Vec<(&'static [u8], &'static [u8])>);

    impl Mechanism for Scripted {
        fn mechanism(&self) -> AuthMechanism {
            AuthMechanism::Login
        }

        fn start(&mut self, _server: &ServerInfo) -> Result<Option<Vec<u8>>> {
            Ok(None)
        }

        fn next(&mut self, challenge: &[u8]) -> Result<Vec<u8>> {
            if self.0.is_empty() || self.0[0].0 != challenge {
                return Err(Error::mechanism("unexpected challenge"));
            }
            Ok(self.0.remove(0).1.to_vec())
        }
    }

    #[tokio::test]
    async fn greeting_and_ehlo_capabilities() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(EHLO_REPLY)
            .build();
        let client = connected(mock, "localhost").await;
        let info = client.server_info();
        assert_eq!(info.hostname, "mx.example.com");
        assert_eq!(info.name, "localhost");
        assert!(!info.tls);
        assert!(info.supports_auth());
        assert!(!info.supports_starttls());
    }

    #[tokio::test]
    async fn rejected_greeting() {
        let mock = Builder::new().read(b"554 no service\r\n").build();
        let err = Client::from_stream(SmtpStream::mock(mock), "localhost")
            .await
            .unwrap_err();
        assert_eq!(err.reply_code(), Some(554));
        assert!(err.is_protocol_reply());
        assert!(!err.is_auth_rejection());
    }

    #[tokio::test]
    async fn closed_connection_is_io_error() {
        let mock = Builder::new().build();
        let err = Client::from_stream(SmtpStream::mock(mock), "localhost")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn auth_plain_success() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(EHLO_REPLY)
            .write(b"AUTH PLAIN AGFsaWNlAHNlY3JldA==\r\n")
            .read(b"235 2.7.0 Authentication successful\r\n")
            .build();
        let client = connected(mock, "localhost").await;
        let mut plain = Plain::new("", "alice", "secret", "localhost");
        client.authenticate(&mut plain).await.unwrap();
    }

    #[tokio::test]
    async fn auth_failure_is_auth_rejection() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(EHLO_REPLY)
            .write(b"AUTH PLAIN AGFsaWNlAHdyb25n\r\n")
            .read(b"535 5.7.8 Authentication credentials invalid\r\n")
            .build();
        let client = connected(mock, "localhost").await;
        let mut plain = Plain::new("", "alice", "wrong", "localhost");
        let err = client.authenticate(&mut plain).await.unwrap_err();
        assert!(err.is_auth_rejection());
        assert!(err.is_permanent());
        assert_eq!(err.reply_code(), Some(535));
    }

    #[tokio::test]
    async fn auth_plain_refused_before_sending() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(EHLO_REPLY)
            .build();
        let client = connected(mock, "mx.example.com").await;
        let mut plain = Plain::new("", "alice", "secret", "mx.example.com");
        let err = client.authenticate(&mut plain).await.unwrap_err();
        assert!(matches!(err, Error::Mechanism(_)));
    }

    #[tokio::test]
    async fn auth_cram_md5_challenge() {
        // "<1896.697170952@postoffice.reston.mci.net>"
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(EHLO_REPLY)
            .write(b"AUTH CRAM-MD5\r\n")
            .read(b"334 PDE4OTYuNjk3MTcwOTUyQHBvc3RvZmZpY2UucmVzdG9uLm1jaS5uZXQ+\r\n")
            .write(b"dGltIGI5MTNhNjAyYzdlZGE3YTQ5NWI0ZTZlNzMzNGQzODkw\r\n")
            .read(b"235 Authentication successful\r\n")
            .build();
        let client = connected(mock, "mx.example.com").await;
        let mut cram = CramMd5::new("tim", "tanstaaftanstaaf");
        client.authenticate(&mut cram).await.unwrap();
    }

    #[tokio::test]
    async fn multi_step_exchange() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(EHLO_REPLY)
            .write(b"AUTH LOGIN\r\n")
            .read(b"334 VXNlcm5hbWU6\r\n")
            .write(b"YWxpY2U=\r\n")
            .read(b"334 UGFzc3dvcmQ6\r\n")
            .write(b"c2VjcmV0\r\n")
            .read(b"235 ok\r\n")
            .build();
        let client = connected(mock, "localhost").await;
        let mut mech = Scripted(vec![(b"Username:", b"alice"), (b"Password:", b"secret")]);
        client.authenticate(&mut mech).await.unwrap();
    }

    #[tokio::test]
    async fn mechanism_error_aborts_exchange() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(EHLO_REPLY)
            .write(b"AUTH LOGIN\r\n")
            .read(b"334 VXNlcm5hbWU6\r\n")
            .write(b"*\r\n")
            .read(b"501 5.7.0 Authentication aborted\r\n")
            .build();
        let client = connected(mock, "localhost").await;
        let mut mech = Scripted(vec![]);
        let err = client.authenticate(&mut mech).await.unwrap_err();
        assert!(matches!(err, Error::Mechanism(_)));
    }

    #[tokio::test]
    async fn invalid_base64_challenge_aborts_exchange() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(EHLO_REPLY)
            .write(b"AUTH LOGIN\r\n")
            .read(b"334 not base64!\r\n")
            .write(b"*\r\n")
            .read(b"501 aborted\r\n")
            .build();
        let client = connected(mock, "localhost").await;
        let mut mech = Scripted(vec![]);
        let err = client.authenticate(&mut mech).await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[tokio::test]
    async fn starttls_requires_capability() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(EHLO_REPLY)
            .build();
        let client = connected(mock, "localhost").await;
        let err = client.starttls(TlsOptions::default()).await.unwrap_err();
        assert!(matches!(err, Error::NotSupported(_)));
    }

    #[tokio::test]
    async fn quit_after_auth() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(EHLO_REPLY)
            .write(b"AUTH PLAIN AGFsaWNlAHNlY3JldA==\r\n")
            .read(b"235 ok\r\n")
            .write(b"QUIT\r\n")
            .read(b"221 bye\r\n")
            .build();
        let client = connected(mock, "localhost").await;
        let mut plain = Plain::new("", "alice", "secret", "localhost");
        let client = client.authenticate(&mut plain).await.unwrap();
        client.quit().await.unwrap();
    }
}
