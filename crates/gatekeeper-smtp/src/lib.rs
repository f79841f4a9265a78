//! # gatekeeper-smtp
//!
//! An async SMTP client that gets a connection as far as a SASL `AUTH`
//! exchange, for servers used as credential oracles.
//!
//! ## Features
//!
//! - **Type-state connection management**: `AUTH` is only reachable from a
//!   greeted connection
//! - **TLS support**: Both implicit TLS (port 465) and STARTTLS, with an
//!   opt-in mode that skips certificate verification
//! - **Pluggable SASL**: any [`sasl::Mechanism`] can drive the 334
//!   challenge loop; PLAIN and CRAM-MD5 are built in
//!
//! ## Quick Start
//!
//! ```ignore
//! use gatekeeper_smtp::{Client, TlsOptions};
//! use gatekeeper_smtp::connection::connect;
//! use gatekeeper_smtp::sasl::Plain;
//!
//! #[tokio::main]
//! async fn main() -> gatekeeper_smtp::Result<()> {
//!     let stream = connect("smtp.example.com", 587).await?;
//!     let client = Client::from_stream(stream, "smtp.example.com").await?;
//!     let client = client.ehlo("client.example.com").await?;
//!     let client = client.starttls(TlsOptions::default()).await?;
//!
//!     let mut plain = Plain::new("", "user@example.com", "password", "smtp.example.com");
//!     let client = client.authenticate(&mut plain).await?;
//!
//!     client.quit().await
//! }
//! ```
//!
//! ## Modules
//!
//! - [`command`]: SMTP command builders
//! - [`connection`]: Connection management and type-state client
//! - [`parser`]: Response parser
//! - [`sasl`]: SASL mechanisms
//! - [`types`]: Core SMTP types (extensions, replies)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod sasl;
pub mod types;

pub use connection::{Authenticated, Client, Connected, ServerInfo, SmtpConnection, TlsOptions};
pub use error::{Error, Result};
pub use types::{AuthMechanism, Extension, Reply, ReplyCode};

/// Port on which servers expect implicit TLS (SMTPS).
pub const SMTPS_PORT: u16 = 465;
