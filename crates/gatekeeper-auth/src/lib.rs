//! # gatekeeper-auth
//!
//! Login source that delegates password checks to an external SMTP server.
//!
//! This crate provides:
//! - Source configuration, persisted as JSON, with validation
//! - A domain allow-list gate that runs before any network traffic
//! - Mechanism selection (PLAIN, LOGIN, CRAM-MD5) and remote verification
//! - First-login provisioning of local accounts (`SQLite` store included)
//! - Error classification for callers: not found, bad credentials,
//!   cancelled, infrastructure
//!
//! ```ignore
//! use gatekeeper_auth::{CancellationToken, SmtpSource, SqliteUserStore};
//!
//! let source = SmtpSource::from_json(1, r#"{"Auth":"PLAIN","Host":"smtp.example.com"}"#)?;
//! let store = SqliteUserStore::in_memory().await?;
//! let user = source
//!     .authenticate(&CancellationToken::new(), &store, None, "alice@example.com", "secret")
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod mechanism;
pub mod policy;
pub mod reconcile;
pub mod source;
pub mod user;
pub mod verifier;

pub use error::{Error, ErrorKind, Result};
pub use mechanism::{Credentials, LoginResponder};
pub use source::{
    AuthType, DEFAULT_PORT, SmtpSource, ValidationError, ValidationResult, validate_source,
};
pub use tokio_util::sync::CancellationToken;
pub use user::{
    CreateUserOverwriteOptions, LoginType, SqliteUserStore, StoreError, User, UserMeta, UserStore,
};
pub use verifier::{SmtpTransport, Transport};
