//! Error types for the CZDS client.
//!
//! Every failure surfaced by the client carries a [`ErrorKind`] so callers can
//! branch on the condition (bad credentials, not entitled, terms not accepted,
//! ...) without matching on message text.

use std::path::PathBuf;

use thiserror::Error;

/// Default message when the server answers 428 without explaining why.
pub const DEFAULT_PRECONDITION_MESSAGE: &str = "You need to first login to CZDS web interface and accept new Terms & Conditions";

/// Classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or invalid settings, or an endpoint URL that does not exist.
    Configuration,
    /// Credentials rejected, or a token rejected again after reauthentication.
    Authentication,
    /// Authenticated but not entitled to the requested resource (HTTP 403).
    AuthorizationDenied,
    /// Terms must be accepted out-of-band before downloading (HTTP 428).
    PreconditionRequired,
    /// Service temporarily unavailable (HTTP 503).
    ServiceUnavailable,
    /// Authentication server failed internally (HTTP 500).
    TransientServer,
    /// Resource does not exist (HTTP 404).
    ResourceNotFound,
    /// Response carried no usable `Content-Disposition` filename.
    MetadataMissing,
    /// Local filesystem failure.
    Io,
    /// Transport-level failure (DNS, connect, TLS, body read).
    Network,
    /// Request did not complete within the configured timeout.
    Timeout,
    /// Response body could not be decoded.
    InvalidResponse,
    /// Any other non-success HTTP status.
    UnexpectedStatus,
}

impl ErrorKind {
    /// Returns true for conditions that may clear up if retried later.
    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable | Self::TransientServer | Self::Network | Self::Timeout
        )
    }

    /// Stable label for logs and diagnostics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Authentication => "authentication",
            Self::AuthorizationDenied => "authorization_denied",
            Self::PreconditionRequired => "precondition_required",
            Self::ServiceUnavailable => "service_unavailable",
            Self::TransientServer => "transient_server",
            Self::ResourceNotFound => "resource_not_found",
            Self::MetadataMissing => "metadata_missing",
            Self::Io => "io",
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::InvalidResponse => "invalid_response",
            Self::UnexpectedStatus => "unexpected_status",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while authenticating or downloading zone files.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid settings or an endpoint that answered 404.
    #[error("configuration error: {message}")]
    Configuration {
        /// What is wrong with the configuration.
        message: String,
    },

    /// Credentials were rejected.
    #[error("authentication failed for user {username}: {reason}")]
    Authentication {
        /// User whose credentials were rejected.
        username: String,
        /// Why authentication failed.
        reason: String,
    },

    /// The user is authenticated but not entitled to the resource.
    #[error("{username} is not authorized to download {url}")]
    AuthorizationDenied {
        /// Authenticated user.
        username: String,
        /// Resource that was refused.
        url: String,
    },

    /// The server requires an out-of-band action first.
    #[error("precondition required: {message}")]
    PreconditionRequired {
        /// Server message or [`DEFAULT_PRECONDITION_MESSAGE`].
        message: String,
    },

    /// The service answered 503.
    #[error("service unavailable: {url}")]
    ServiceUnavailable {
        /// Endpoint that is unavailable.
        url: String,
    },

    /// The authentication server answered 500.
    #[error("internal server error at {url}, please try again later")]
    TransientServer {
        /// Endpoint that failed.
        url: String,
    },

    /// The resource does not exist.
    #[error("resource not found, please check url {url}")]
    ResourceNotFound {
        /// URL that returned 404.
        url: String,
    },

    /// No filename metadata on an otherwise successful response.
    #[error(
        "no Content-Disposition filename in response from {url}: either you are not authorized to download this zone file or the zone does not exist"
    )]
    MetadataMissing {
        /// URL whose response lacked the header.
        url: String,
    },

    /// File system error while saving a zone file.
    #[error("failed to save file to {path}: {source}")]
    Io {
        /// Path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Transport-level error.
    #[error("network error requesting {url}: {source}")]
    Network {
        /// URL being requested.
        url: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The request timed out.
    #[error("timeout requesting {url}")]
    Timeout {
        /// URL being requested.
        url: String,
    },

    /// The response body could not be decoded.
    #[error("invalid response from {url}: {reason}")]
    InvalidResponse {
        /// URL whose body was malformed.
        url: String,
        /// Decoding failure description.
        reason: String,
    },

    /// Any status the client has no specific handling for.
    #[error("HTTP {status} requesting {url}")]
    UnexpectedStatus {
        /// URL being requested.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
}

impl ClientError {
    /// Returns the classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::AuthorizationDenied { .. } => ErrorKind::AuthorizationDenied,
            Self::PreconditionRequired { .. } => ErrorKind::PreconditionRequired,
            Self::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            Self::TransientServer { .. } => ErrorKind::TransientServer,
            Self::ResourceNotFound { .. } => ErrorKind::ResourceNotFound,
            Self::MetadataMissing { .. } => ErrorKind::MetadataMissing,
            Self::Io { .. } => ErrorKind::Io,
            Self::Network { .. } => ErrorKind::Network,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            Self::UnexpectedStatus { .. } => ErrorKind::UnexpectedStatus,
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an authentication error.
    pub fn authentication(username: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Authentication {
            username: username.into(),
            reason: reason.into(),
        }
    }

    /// Creates an authorization-denied error.
    pub fn authorization_denied(username: impl Into<String>, url: impl Into<String>) -> Self {
        Self::AuthorizationDenied {
            username: username.into(),
            url: url.into(),
        }
    }

    /// Creates a precondition-required error, falling back to the default
    /// terms-and-conditions message when the server gave none.
    pub fn precondition_required(message: Option<&str>) -> Self {
        let message = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_PRECONDITION_MESSAGE);
        Self::PreconditionRequired {
            message: message.to_string(),
        }
    }

    /// Creates a service-unavailable error.
    pub fn service_unavailable(url: impl Into<String>) -> Self {
        Self::ServiceUnavailable { url: url.into() }
    }

    /// Creates a transient server error.
    pub fn transient_server(url: impl Into<String>) -> Self {
        Self::TransientServer { url: url.into() }
    }

    /// Creates a resource-not-found error.
    pub fn resource_not_found(url: impl Into<String>) -> Self {
        Self::ResourceNotFound { url: url.into() }
    }

    /// Creates a metadata-missing error.
    pub fn metadata_missing(url: impl Into<String>) -> Self {
        Self::MetadataMissing { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a network or timeout error from a reqwest error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an invalid-response error.
    pub fn invalid_response(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unexpected-status error.
    pub fn unexpected_status(url: impl Into<String>, status: u16) -> Self {
        Self::UnexpectedStatus {
            url: url.into(),
            status,
        }
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// url or path the source error does not carry.
