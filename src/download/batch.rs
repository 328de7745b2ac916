//! Batch retrieval policy, outcomes and link-list decoding.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::ClientError;

/// How a batch reacts to a failed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// Stop at the first failure and return its error.
    FailFast,
    /// Log the failure, record it, and continue with the remaining items.
    #[default]
    BestEffort,
}

/// A zone file saved to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// Absolute path of the saved file.
    pub path: PathBuf,
    /// Filename announced by the server.
    pub source_filename: String,
    /// URL the file was downloaded from.
    pub source_url: String,
    /// Number of bytes written.
    pub bytes_written: u64,
}

/// An item that failed during a best-effort batch.
#[derive(Debug)]
pub struct BatchFailure {
    /// URL that could not be downloaded.
    pub url: String,
    /// Why it failed.
    pub error: ClientError,
}

/// Result of a batch run: files saved, in request order, plus any failures.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Successfully saved files.
    pub files: Vec<DownloadedFile>,
    /// Items skipped under [`BatchPolicy::BestEffort`].
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    /// Number of saved files.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.files.len()
    }

    /// Number of failed items.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Returns true when no item failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Decodes the link-list body into a set of URLs, keeping first-seen order.
///
/// An empty (or `null`) body means there is nothing to download.
pub(crate) fn parse_link_list(url: &str, body: &[u8]) -> Result<Vec<String>, ClientError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let links: Option<Vec<String>> = serde_json::from_slice(body)
        .map_err(|e| ClientError::invalid_response(url, format!("malformed link list: {e}")))?;

    let mut seen = HashSet::new();
    Ok(links
        .unwrap_or_default()
        .into_iter()
        .map(|link| link.trim().to_string())
        .filter(|link| !link.is_empty() && seen.insert(link.clone()))
        .collect())
}
