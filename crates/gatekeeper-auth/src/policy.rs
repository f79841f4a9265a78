//! Domain allow-list gate.
//!
//! Runs before any network traffic. A rejected login is reported as an
//! unknown user so the allow-list itself is not revealed.

use crate::error::{Error, Result};

/// Iterates the entries of a comma-separated allow-list, trimmed, skipping
/// empty entries.
pub fn allowed_domains(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|d| !d.is_empty())
}

/// Returns true if `login` may authenticate under `allowed`.
///
/// An empty list allows every login, with or without a domain. Any other
/// list, even one holding only separators, closes the gate: the login must
/// be `local@domain` with exactly one `@`, and `domain` must equal an entry
/// ignoring case.
#[must_use]
pub fn is_allowed(login: &str, allowed: &str) -> bool {
    if allowed.is_empty() {
        return true;
    }

    let Some((_, domain)) = login.split_once('@') else {
        return false;
    };
    if domain.contains('@') {
        return false;
    }

    let domain = domain.to_lowercase();
    allowed_domains(allowed).any(|entry| entry.to_lowercase() == domain)
}

/// Checks `login` against the allow-list.
///
/// # Errors
///
/// Returns [`Error::UserNotExist`] if the login is not allowed.
pub fn check_allowed_domain(login: &str, allowed: &str) -> Result<()> {
    if is_allowed(login, allowed) {
        Ok(())
    } else {
        tracing::debug!(login, "login rejected by domain allow-list");
        Err(Error::UserNotExist {
            name: login.to_string(),
        })
    }
}
