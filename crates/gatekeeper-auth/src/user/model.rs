//! Local user model types.

use serde::{Deserialize, Serialize};

/// How a local account authenticates.
///
/// The discriminants are stable storage codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i64)]
pub enum LoginType {
    /// Not linked to any source.
    #[default]
    NoType = 0,
    /// Local password.
    Plain = 1,
    /// LDAP bind.
    Ldap = 2,
    /// SMTP AUTH.
    Smtp = 3,
    /// PAM.
    Pam = 4,
    /// LDAP simple auth.
    DldapDirect = 5,
    /// OAuth2 provider.
    OAuth2 = 6,
    /// Windows SSPI.
    Sspi = 7,
}

impl LoginType {
    /// Returns the storage code.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self as i64
    }

    /// Parses a storage code; unknown codes map to [`LoginType::NoType`].
    #[must_use]
    pub const fn from_i64(code: i64) -> Self {
        match code {
            1 => Self::Plain,
            2 => Self::Ldap,
            3 => Self::Smtp,
            4 => Self::Pam,
            5 => Self::DldapDirect,
            6 => Self::OAuth2,
            7 => Self::Sspi,
            _ => Self::NoType,
        }
    }
}

/// A local user account.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier; `None` until persisted.
    pub id: Option<i64>,
    /// Display/login name.
    pub name: String,
    /// Lowercase form of `name`, used for uniqueness.
    pub lower_name: String,
    /// Primary e-mail address.
    pub email: String,
    /// Password as handed to the store; hashing is the store's business.
    #[serde(skip_serializing, default)]
    pub passwd: String,
    /// Which kind of source authenticates this user.
    pub login_type: LoginType,
    /// Identifier of the authentication source record.
    pub login_source: i64,
    /// Name the user logs in with at the source.
    pub login_name: String,
    /// Whether the account may sign in.
    pub is_active: bool,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("lower_name", &self.lower_name)
            .field("email", &self.email)
            .field("login_type", &self.login_type)
            .field("login_source", &self.login_source)
            .field("login_name", &self.login_name)
            .field("is_active", &self.is_active)
            .finish_non_exhaustive()
    }
}

/// Request metadata recorded with a newly created user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserMeta {
    /// IP address the account was created from.
    pub initial_ip: Option<String>,
    /// User agent the account was created from.
    pub initial_user_agent: Option<String>,
}

/// Field values that override the store's defaults when creating a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateUserOverwriteOptions {
    /// Force the initial activation state.
    pub is_active: Option<bool>,
}
