//! Source configuration validation.

use super::model::{AuthType, SmtpSource};
use crate::policy;

/// Validation error for a source configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// SMTP host is empty.
    EmptyHost,
    /// SMTP port is zero.
    InvalidPort,
    /// The configured mechanism is unknown.
    UnsupportedAuth(String),
    /// An allowed-domain entry can never match.
    InvalidAllowedDomain(String),
    /// The allowed-domain list is set but names no domain, so it rejects
    /// every login.
    NoAllowedDomains,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyHost => "SMTP host is required",
            Self::InvalidPort => "SMTP port must be 1-65535",
            Self::UnsupportedAuth(_) => "Authentication type must be PLAIN, LOGIN or CRAM-MD5",
            Self::InvalidAllowedDomain(_) => "Allowed domains must be bare domain names",
            Self::NoAllowedDomains => {
                "Allowed domains list contains no domain; leave it empty to allow every domain"
            }
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyHost => "host",
            Self::InvalidPort => "port",
            Self::UnsupportedAuth(_) => "auth",
            Self::InvalidAllowedDomain(_) | Self::NoAllowedDomains => "allowed_domains",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedAuth(value) | Self::InvalidAllowedDomain(value) => {
                write!(f, "{}: {value:?}", self.message())
            }
            _ => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating a source.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate a source configuration.
///
/// Returns all errors found, not just the first.
///
/// # Errors
///
/// Returns a list of validation errors if the configuration is invalid.
pub fn validate_source(source: &SmtpSource) -> ValidationResult {
    let mut errors = Vec::new();

    if source.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if source.port == 0 {
        errors.push(ValidationError::InvalidPort);
    }
    if let AuthType::Unsupported(name) = &source.auth {
        errors.push(ValidationError::UnsupportedAuth(name.clone()));
    }
    if !source.allowed_domains.is_empty()
        && policy::allowed_domains(&source.allowed_domains).next().is_none()
    {
        errors.push(ValidationError::NoAllowedDomains);
    }
    for domain in policy::allowed_domains(&source.allowed_domains) {
        if domain.contains('@') || domain.chars().any(char::is_whitespace) {
            errors.push(ValidationError::InvalidAllowedDomain(domain.to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl SmtpSource {
    /// Validate this configuration. See [`validate_source`].
    ///
    /// # Errors
    ///
    /// Returns a list of validation errors if the configuration is invalid.
    pub fn validate(&self) -> ValidationResult {
        validate_source(self)
    }
}
