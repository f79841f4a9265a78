//! Remote credential verification.

use std::future::Future;

use gatekeeper_smtp::connection::{connect, connect_tls};
use gatekeeper_smtp::sasl::Mechanism;
use gatekeeper_smtp::{Client, Error, Result, SmtpConnection, TlsOptions};
use tracing::debug;

use crate::source::SmtpSource;

/// Something that can run one SMTP AUTH exchange for a source.
pub trait Transport: Send + Sync {
    /// Connects to the source's server and authenticates with `mechanism`.
    ///
    /// Exactly one connection is made; there are no retries.
    ///
    /// # Errors
    ///
    /// Returns the client error unchanged; classification is the caller's job.
    fn exchange<M>(
        &self,
        source: &SmtpSource,
        mechanism: &mut M,
    ) -> impl Future<Output = Result<()>> + Send
    where
        M: Mechanism + Send;
}

/// Production transport over TCP/TLS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpTransport;

impl Transport for SmtpTransport {
    async fn exchange<M>(&self, source: &SmtpSource, mechanism: &mut M) -> Result<()>
    where
        M: Mechanism + Send,
    {
        let tls = TlsOptions {
            skip_verify: source.skip_verify,
        };

        debug!(host = %source.host, port = source.port, implicit_tls = source.use_tls(), "connecting to SMTP server");
        let stream = if source.use_tls() {
            connect_tls(&source.host, source.port, tls).await?
        } else {
            connect(&source.host, source.port).await?
        };

        let client = Client::from_stream(stream, &source.host).await?;
        let client = client.ehlo(&source.helo_name()).await?;

        let client = if !client.server_info().tls && client.server_info().supports_starttls() {
            client.starttls(tls).await?
        } else {
            client
        };

        if !client.server_info().supports_auth() {
            return Err(Error::NotSupported("AUTH".into()));
        }
        debug!(
            mechanisms = ?client.server_info().auth_mechanisms(),
            tls = client.server_info().tls,
            "server offers AUTH"
        );

        let client = client.authenticate(mechanism).await?;

        if let Err(err) = client.quit().await {
            debug!(error = %err, "QUIT after successful AUTH failed");
        }
        Ok(())
    }
}
