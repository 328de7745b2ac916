//! Construction of the shared reqwest client.

use reqwest::Client;

use crate::config::HttpTimeouts;
use crate::error::ClientError;
use crate::user_agent;

/// Builds the HTTP client used for both authentication and downloads.
///
/// Gzip is negotiated by reqwest itself (`Accept-Encoding: gzip` plus
/// transparent decompression); setting the header by hand would disable the
/// decompression.
pub(crate) fn build_http_client(timeouts: HttpTimeouts) -> Result<Client, ClientError> {
    Client::builder()
        .connect_timeout(timeouts.connect)
        .read_timeout(timeouts.read)
        .gzip(true)
        .user_agent(user_agent::default_user_agent())
        .build()
        .map_err(|e| ClientError::configuration(format!("failed to build HTTP client: {e}")))
}
