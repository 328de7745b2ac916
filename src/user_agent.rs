//! User-Agent string sent with every CZDS request.

/// Project URL for User-Agent identification (RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/icann/czds-api-client-java";

/// Default User-Agent for authentication and download requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("czds-downloader/{version} (zone-file-client; +{PROJECT_UA_URL})")
}
