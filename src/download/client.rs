//! The zone download client.
//!
//! This module provides [`ZoneDownloader`], which ties configuration,
//! authentication and authorized requests together into the two public
//! workflows: downloading every approved zone file, and downloading specific
//! zones by name.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument, warn};
use url::Url;

use super::batch::{BatchFailure, BatchOutcome, BatchPolicy, DownloadedFile, parse_link_list};
use super::filename::filename_from_headers;
use super::persistence::persist_response;
use crate::auth::AuthenticationManager;
use crate::config::ClientConfiguration;
use crate::error::ClientError;
use crate::http::build_http_client;
use crate::request::RequestExecutor;

/// Downloads zone files for an authenticated CZDS user.
///
/// One instance holds one bearer token, obtained lazily on the first request
/// and renewed transparently when the server rejects it.
///
/// # Example
///
/// ```no_run
/// use czds_core::{ClientConfiguration, ZoneDownloader};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfiguration::from_base_urls(
///     "jane@example.com",
///     "secret",
///     "https://account-api.icann.org",
///     "https://czds-api.icann.org",
///     "./downloads",
/// )?;
/// let downloader = ZoneDownloader::new(config)?;
/// for file in downloader.download_all().await? {
///     println!("{}", file.path.display());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ZoneDownloader {
    config: Arc<ClientConfiguration>,
    auth: Arc<AuthenticationManager>,
    executor: RequestExecutor,
}

impl ZoneDownloader {
    /// Creates a downloader. No network call is made until the first download.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfiguration) -> Result<Self, ClientError> {
        let config = Arc::new(config);
        let client = build_http_client(config.timeouts())?;
        let auth = Arc::new(AuthenticationManager::new(
            Arc::clone(&config),
            client.clone(),
        ));
        let executor = RequestExecutor::new(Arc::clone(&config), client, Arc::clone(&auth));
        Ok(Self {
            config,
            auth,
            executor,
        })
    }

    /// The configuration this downloader was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfiguration {
        &self.config
    }

    /// The authentication manager holding this downloader's token.
    #[must_use]
    pub fn authentication(&self) -> &AuthenticationManager {
        &self.auth
    }

    /// Downloads every zone file the user is approved for, best-effort.
    ///
    /// Per-link failures are logged and skipped; see
    /// [`download_all_with_policy`](Self::download_all_with_policy) to inspect
    /// them or to stop at the first one.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication or the link-list request fails.
    pub async fn download_all(&self) -> Result<Vec<DownloadedFile>, ClientError> {
        Ok(self
            .download_all_with_policy(BatchPolicy::BestEffort)
            .await?
            .files)
    }

    /// Downloads every approved zone file under the given batch policy.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication or the link-list request fails, or,
    /// under [`BatchPolicy::FailFast`], the first per-link failure.
    #[instrument(skip(self))]
    pub async fn download_all_with_policy(
        &self,
        policy: BatchPolicy,
    ) -> Result<BatchOutcome, ClientError> {
        let links = self.list_links().await?;
        info!(links = links.len(), "discovered approved zone files");
        self.run_batch(links, policy).await
    }

    /// Fetches the de-duplicated list of download links for this user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a JSON array
    /// of strings.
    pub async fn list_links(&self) -> Result<Vec<String>, ClientError> {
        let url = self.config.links_url();
        let response = self.executor.get(&url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::transport(&url, e))?;
        parse_link_list(&url, &body)
    }

    /// Downloads the zone file of a single TLD, e.g. `"aaa"` for `aaa.zone`.
    ///
    /// # Errors
    ///
    /// Every failure is returned unchanged; a blank name is a
    /// [`ClientError::Configuration`] error.
    pub async fn download_zone(&self, zone: &str) -> Result<DownloadedFile, ClientError> {
        let url = self.zone_url(zone)?;
        self.download_link(&url).await
    }

    /// Downloads several zones by name under the given batch policy.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any name is blank (before any
    /// request), or, under [`BatchPolicy::FailFast`], the first failure.
    pub async fn download_zones<S: AsRef<str>>(
        &self,
        zones: &[S],
        policy: BatchPolicy,
    ) -> Result<BatchOutcome, ClientError> {
        let urls = zones
            .iter()
            .map(|zone| self.zone_url(zone.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.run_batch(urls, policy).await
    }

    /// Downloads one explicit link into the zone file directory.
    ///
    /// # Errors
    ///
    /// Returns a classified request error, [`ClientError::MetadataMissing`]
    /// when the response names no file, or [`ClientError::Io`] when saving
    /// fails.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn download_link(&self, url: &str) -> Result<DownloadedFile, ClientError> {
        info!("downloading zone file");
        if !same_origin(url, self.config.resource_list_url()) {
            warn!("link is outside the CZDS download origin, bearer token is still sent");
        }
        let response = self.executor.get(url).await?;
        let filename = filename_from_headers(response.headers(), url)?;

        let dir = self.config.zonefile_directory();
        let (path, bytes_written) = persist_response(response, &dir, &filename, url).await?;
        let path = absolute(&path);
        info!(path = %path.display(), bytes = bytes_written, "saved zone file");

        Ok(DownloadedFile {
            path,
            source_filename: filename,
            source_url: url.to_string(),
            bytes_written,
        })
    }

    async fn run_batch(
        &self,
        urls: Vec<String>,
        policy: BatchPolicy,
    ) -> Result<BatchOutcome, ClientError> {
        let mut outcome = BatchOutcome::default();

        for url in urls {
            match self.download_link(&url).await {
                Ok(file) => outcome.files.push(file),
                Err(error) if policy == BatchPolicy::BestEffort => {
                    warn!(url = %url, kind = %error.kind(), error = %error, "failed to download zone file, continuing");
                    outcome.failures.push(BatchFailure { url, error });
                }
                Err(error) => return Err(error),
            }
        }

        info!(
            completed = outcome.completed(),
            failed = outcome.failed(),
            "batch complete"
        );
        Ok(outcome)
    }

    fn zone_url(&self, zone: &str) -> Result<String, ClientError> {
        if zone.trim().is_empty() {
            return Err(ClientError::configuration("zone name must not be blank"));
        }
        Ok(self.config.zone_url(zone))
    }
}

/// True when both URLs parse and share scheme, host and port.
fn same_origin(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(a), Ok(b)) => a.origin() == b.origin(),
        _ => false,
    }
}

fn absolute(path: &Path) -> std::path::PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
