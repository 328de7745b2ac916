//! Wire and token types for the authentication exchange.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque bearer token returned by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wraps a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value, for the `Authorization` header.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Login request body.
#[derive(Debug, Serialize)]
pub(crate) struct AuthRequest<'a> {
    pub(crate) username: &'a str,
    pub(crate) password: &'a str,
}

/// Login response body. Fields other than the token are informational.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct AuthResult {
    pub(crate) access_token: Option<String>,
    pub(crate) error: Option<String>,
    pub(crate) message: Option<String>,
}

impl AuthResult {
    /// Server-provided explanation, if any.
    pub(crate) fn detail(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}
