//! SMTP source configuration.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Default submission port.
pub const DEFAULT_PORT: u16 = 587;

/// Mechanism configured for a source.
///
/// Persisted as the mechanism's wire name. Unknown names load fine and
/// fail when someone tries to authenticate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthType {
    /// PLAIN (RFC 4616).
    #[default]
    Plain,
    /// LOGIN.
    Login,
    /// CRAM-MD5 (RFC 2195).
    CramMd5,
    /// Anything else found in the stored configuration.
    Unsupported(String),
}

impl AuthType {
    /// Returns the configured name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain => "PLAIN",
            Self::Login => "LOGIN",
            Self::CramMd5 => "CRAM-MD5",
            Self::Unsupported(name) => name,
        }
    }
}

impl From<String> for AuthType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "PLAIN" => Self::Plain,
            "LOGIN" => Self::Login,
            "CRAM-MD5" => Self::CramMd5,
            _ => Self::Unsupported(name),
        }
    }
}

impl From<AuthType> for String {
    fn from(auth: AuthType) -> Self {
        auth.as_str().to_string()
    }
}

impl std::fmt::Display for AuthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Configuration of one SMTP authentication source.
///
/// Stored as JSON in the source record; `auth_source_id` is the record's
/// own key and is supplied when loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SmtpSource {
    /// SASL mechanism.
    pub auth: AuthType,
    /// SMTP server host name.
    pub host: String,
    /// SMTP server port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Comma-separated e-mail domains allowed to log in; empty allows all.
    #[serde(default)]
    pub allowed_domains: String,
    /// Use implicit TLS regardless of port.
    #[serde(default, rename = "ForceSMTPS")]
    pub force_smtps: bool,
    /// Accept any server certificate.
    #[serde(default)]
    pub skip_verify: bool,
    /// Name sent with EHLO; empty uses the machine's host name.
    #[serde(default)]
    pub helo_hostname: String,
    /// Don't greet with `helo_hostname`; `localhost` is sent instead.
    #[serde(default)]
    pub disable_helo: bool,
    /// Accounts from this source skip local two-factor checks.
    #[serde(default, rename = "SkipLocalTwoFA")]
    pub skip_local_two_fa: bool,
    /// Identifier of the owning authentication-source record.
    #[serde(skip)]
    pub auth_source_id: i64,
}

impl SmtpSource {
    /// Creates a source for `host` with default settings.
    #[must_use]
    pub fn new(auth_source_id: i64, auth: AuthType, host: impl Into<String>) -> Self {
        Self {
            auth,
            host: host.into(),
            port: DEFAULT_PORT,
            allowed_domains: String::new(),
            force_smtps: false,
            skip_verify: false,
            helo_hostname: String::new(),
            disable_helo: false,
            skip_local_two_fa: false,
            auth_source_id,
        }
    }

    /// Loads a source from its stored JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(auth_source_id: i64, json: &str) -> Result<Self> {
        let mut source: Self = serde_json::from_str(json)?;
        source.auth_source_id = auth_source_id;
        Ok(source)
    }

    /// Serializes the configuration for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Whether to connect with implicit TLS.
    #[must_use]
    pub const fn use_tls(&self) -> bool {
        self.force_smtps || self.port == gatekeeper_smtp::SMTPS_PORT
    }

    /// Whether accounts from this source skip local two-factor checks.
    #[must_use]
    pub const fn is_skip_local_two_fa(&self) -> bool {
        self.skip_local_two_fa
    }

    /// Name to greet the server with.
    #[must_use]
    pub fn helo_name(&self) -> String {
        if self.disable_helo {
            return "localhost".to_string();
        }
        if !self.helo_hostname.is_empty() {
            return self.helo_hostname.clone();
        }
        whoami::fallible::hostname().unwrap_or_else(|_| "localhost".to_string())
    }
}
