//! SMTP extension types.

/// SMTP extensions discovered from EHLO response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extension {
    /// STARTTLS - TLS upgrade
    StartTls,
    /// AUTH - Authentication, with the advertised mechanism names
    Auth(Vec<AuthMechanism>),
    /// SIZE - Maximum message size
    Size(Option<usize>),
    /// PIPELINING - Command pipelining
    Pipelining,
    /// SMTPUTF8 - UTF-8 email addresses
    SmtpUtf8,
    /// Unknown extension
    Unknown(String),
}

impl Extension {
    /// Parses an extension line from EHLO response.
    ///
    /// Old servers advertise `AUTH=PLAIN LOGIN`; that form is accepted too.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            return Self::Unknown(line.to_string());
        }

        let keyword = parts[0].to_uppercase();
        let (keyword, first_arg) = match keyword.split_once('=') {
            Some((k, arg)) => (k.to_string(), Some(arg.to_string())),
            None => (keyword, None),
        };

        match keyword.as_str() {
            "STARTTLS" => Self::StartTls,
            "AUTH" => {
                let mechanisms = first_arg
                    .iter()
                    .map(String::as_str)
                    .chain(parts[1..].iter().copied())
                    .filter_map(AuthMechanism::parse)
                    .collect();
                Self::Auth(mechanisms)
            }
            "SIZE" => {
                let size = parts.get(1).and_then(|s| s.parse().ok());
                Self::Size(size)
            }
            "PIPELINING" => Self::Pipelining,
            "SMTPUTF8" => Self::SmtpUtf8,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

/// SASL authentication mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMechanism {
    /// PLAIN - plaintext authentication (RFC 4616)
    Plain,
    /// LOGIN - legacy plaintext
    Login,
    /// CRAM-MD5 - challenge-response (RFC 2195)
    CramMd5,
}

impl AuthMechanism {
    /// Parses an authentication mechanism name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PLAIN" => Some(Self::Plain),
            "LOGIN" => Some(Self::Login),
            "CRAM-MD5" => Some(Self::CramMd5),
            _ => None,
        }
    }

    /// Returns the mechanism name as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::Login => "LOGIN",
            Self::CramMd5 => "CRAM-MD5",
        }
    }
}

impl std::fmt::Display for AuthMechanism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod extension_parse_tests {
        use super::*;

        #[test]
        fn parse_starttls() {
            assert_eq!(Extension::parse("STARTTLS"), Extension::StartTls);
            assert_eq!(Extension::parse("starttls"), Extension::StartTls);
        }

        #[test]
        fn parse_auth_mechanisms() {
            let ext = Extension::parse("AUTH PLAIN LOGIN CRAM-MD5 XOAUTH2");
            if let Extension::Auth(mechs) = ext {
                assert_eq!(
                    mechs,
                    vec![
                        AuthMechanism::Plain,
                        AuthMechanism::Login,
                        AuthMechanism::CramMd5
                    ]
                );
            } else {
                panic!("Expected Auth variant");
            }
        }

        #[test]
        fn parse_legacy_auth_equals_form() {
            let ext = Extension::parse("AUTH=LOGIN PLAIN");
            if let Extension::Auth(mechs) = ext {
                assert_eq!(mechs, vec![AuthMechanism::Login, AuthMechanism::Plain]);
            } else {
                panic!("Expected Auth variant");
            }
        }

        #[test]
        fn parse_auth_without_known_mechanisms() {
            assert_eq!(Extension::parse("AUTH GSSAPI"), Extension::Auth(vec![]));
        }

        #[test]
        fn parse_size() {
            assert_eq!(
                Extension::parse("SIZE 52428800"),
                Extension::Size(Some(52_428_800))
            );
            assert_eq!(Extension::parse("SIZE"), Extension::Size(None));
        }

        #[test]
        fn parse_unknown() {
            assert_eq!(
                Extension::parse("SOMECUSTOMEXT"),
                Extension::Unknown("SOMECUSTOMEXT".to_string())
            );
            assert!(matches!(Extension::parse(""), Extension::Unknown(_)));
        }
    }

    mod auth_mechanism_tests {
        use super::*;

        #[test]
        fn parse_is_case_insensitive() {
            assert_eq!(AuthMechanism::parse("plain"), Some(AuthMechanism::Plain));
            assert_eq!(AuthMechanism::parse("Login"), Some(AuthMechanism::Login));
            assert_eq!(
                AuthMechanism::parse("cram-md5"),
                Some(AuthMechanism::CramMd5)
            );
            assert_eq!(AuthMechanism::parse("UNKNOWN"), None);
        }

        #[test]
        fn display_matches_wire_name() {
            assert_eq!(AuthMechanism::Plain.to_string(), "PLAIN");
            assert_eq!(AuthMechanism::Login.to_string(), "LOGIN");
            assert_eq!(AuthMechanism::CramMd5.to_string(), "CRAM-MD5");
        }
    }
}
