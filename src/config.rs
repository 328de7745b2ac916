//! Validated client configuration.
//!
//! A [`ClientConfiguration`] is built once at startup, validated before any
//! network call, and shared immutably by every component of the client.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::error::ClientError;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default idle read timeout (5 minutes). Applies between body chunks, so
/// multi-gigabyte zone files are not cut off while data keeps flowing.
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Path of the authentication endpoint relative to the account API base URL.
pub const AUTHENTICATE_PATH: &str = "api/authenticate";

/// Path of the download API relative to the CZDS base URL.
pub const DOWNLOADS_PATH: &str = "czds/downloads";

/// Link-list resource relative to the download URL.
pub const LINKS_RESOURCE: &str = "links";

/// Suffix appended to a zone name to form its download resource.
pub const ZONE_SUFFIX: &str = ".zone";

/// Subdirectory of the output directory that receives zone files.
pub const ZONEFILE_SUBDIRECTORY: &str = "zonefiles";

/// HTTP timeouts applied to every request made by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// Maximum time to establish a connection.
    pub connect: Duration,
    /// Maximum idle time between reads of a response.
    pub read: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read: Duration::from_secs(READ_TIMEOUT_SECS),
        }
    }
}

impl HttpTimeouts {
    /// Creates timeouts from whole seconds.
    #[must_use]
    pub fn from_secs(connect_secs: u64, read_secs: u64) -> Self {
        Self {
            connect: Duration::from_secs(connect_secs),
            read: Duration::from_secs(read_secs),
        }
    }
}

/// Credentials, endpoints and output location for a CZDS client.
///
/// All string fields are trimmed and must be non-blank. Endpoint URLs must be
/// absolute http(s) URLs and are normalized to end with exactly one `/`.
#[derive(Clone)]
pub struct ClientConfiguration {
    username: String,
    password: String,
    authentication_url: String,
    resource_list_url: String,
    output_directory: PathBuf,
    timeouts: HttpTimeouts,
}

impl ClientConfiguration {
    /// Creates a configuration from explicit endpoint URLs.
    ///
    /// `authentication_url` is the full login endpoint; `resource_list_url` is
    /// the download API root under which `links` and `<zone>.zone` live.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] naming every blank field, or the
    /// first URL that does not parse.
    pub fn new(
        username: &str,
        password: &str,
        authentication_url: &str,
        resource_list_url: &str,
        output_directory: impl Into<PathBuf>,
    ) -> Result<Self, ClientError> {
        let output_directory = output_directory.into();
        let output_display = output_directory.to_string_lossy().into_owned();
        ensure_present(&[
            ("username", username),
            ("password", password),
            ("authentication_url", authentication_url),
            ("resource_list_url", resource_list_url),
            ("output_directory", output_display.as_str()),
        ])?;

        Ok(Self {
            username: username.trim().to_string(),
            password: password.trim().to_string(),
            authentication_url: normalize_url("authentication_url", authentication_url)?,
            resource_list_url: normalize_url("resource_list_url", resource_list_url)?,
            output_directory,
            timeouts: HttpTimeouts::default(),
        })
    }

    /// Creates a configuration from service base URLs, deriving the
    /// authentication endpoint (`{base}/api/authenticate/`) and the download
    /// root (`{base}/czds/downloads/`).
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfiguration::new`].
    pub fn from_base_urls(
        username: &str,
        password: &str,
        authentication_base_url: &str,
        czds_base_url: &str,
        output_directory: impl Into<PathBuf>,
    ) -> Result<Self, ClientError> {
        let output_directory = output_directory.into();
        let output_display = output_directory.to_string_lossy().into_owned();
        ensure_present(&[
            ("username", username),
            ("password", password),
            ("authentication_base_url", authentication_base_url),
            ("czds_base_url", czds_base_url),
            ("output_directory", output_display.as_str()),
        ])?;

        let authentication_url = format!(
            "{}{AUTHENTICATE_PATH}",
            normalize_url("authentication_base_url", authentication_base_url)?
        );
        let resource_list_url = format!(
            "{}{DOWNLOADS_PATH}",
            normalize_url("czds_base_url", czds_base_url)?
        );
        Self::new(
            username,
            password,
            &authentication_url,
            &resource_list_url,
            output_directory,
        )
    }

    /// Replaces the default HTTP timeouts.
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: HttpTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Account username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Account password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Normalized authentication endpoint.
    #[must_use]
    pub fn authentication_url(&self) -> &str {
        &self.authentication_url
    }

    /// Normalized download API root.
    #[must_use]
    pub fn resource_list_url(&self) -> &str {
        &self.resource_list_url
    }

    /// Base output directory as configured.
    #[must_use]
    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// HTTP timeouts.
    #[must_use]
    pub fn timeouts(&self) -> HttpTimeouts {
        self.timeouts
    }

    /// Directory zone files are written to.
    #[must_use]
    pub fn zonefile_directory(&self) -> PathBuf {
        self.output_directory.join(ZONEFILE_SUBDIRECTORY)
    }

    /// URL of the link-list endpoint.
    #[must_use]
    pub fn links_url(&self) -> String {
        format!("{}{LINKS_RESOURCE}", self.resource_list_url)
    }

    /// URL of the download resource for `zone` (trimmed).
    #[must_use]
    pub fn zone_url(&self, zone: &str) -> String {
        format!("{}{}{ZONE_SUFFIX}", self.resource_list_url, zone.trim())
    }
}

impl fmt::Debug for ClientConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfiguration")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("authentication_url", &self.authentication_url)
            .field("resource_list_url", &self.resource_list_url)
            .field("output_directory", &self.output_directory)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

fn ensure_present(fields: &[(&str, &str)]) -> Result<(), ClientError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ClientError::configuration(format!(
            "missing required configuration: {}",
            missing.join(", ")
        )))
    }
}

/// Validates an endpoint URL and normalizes it to end with a single `/`.
fn normalize_url(field: &str, raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|e| {
        ClientError::configuration(format!("invalid `{field}` URL '{trimmed}': {e}"))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClientError::configuration(format!(
            "invalid `{field}` URL '{trimmed}': expected http or https"
        )));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ClientError::configuration(format!(
            "invalid `{field}` URL '{trimmed}': query strings and fragments are not supported"
        )));
    }
    Ok(format!("{}/", trimmed.trim_end_matches('/')))
}
