//! SMTP authentication sources.
//!
//! Provides source configuration, validation, and the login pipeline.

mod authenticate;
mod model;
mod validation;

pub use model::{AuthType, DEFAULT_PORT, SmtpSource};
pub use validation::{ValidationError, ValidationResult, validate_source};
