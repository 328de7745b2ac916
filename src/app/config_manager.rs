//! Configuration lifecycle: load the config file, merge CLI overrides, and
//! build the client configuration.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use czds_core::config::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use czds_core::{ClientConfiguration, HttpTimeouts};
use tracing::debug;

use crate::app_config::{FileConfig, load_file_config};
use crate::cli::Args;

/// Public ICANN account API.
pub(crate) const DEFAULT_AUTHENTICATION_BASE_URL: &str = "https://account-api.icann.org";

/// Public ICANN CZDS API.
pub(crate) const DEFAULT_CZDS_BASE_URL: &str = "https://czds-api.icann.org";

/// Prefix of the diagnostic printed when required settings are absent.
pub(crate) const MISSING_CONFIGURATION_MESSAGE: &str = "missing the required configurations";

/// Loads the config file (explicit `--config` or the default location) and
/// merges it with CLI arguments into a validated client configuration.
pub(crate) fn resolve_config(args: &Args) -> Result<ClientConfiguration> {
    let loaded = load_file_config(args.config.as_deref())?;
    if let Some(path) = loaded.path.as_deref() {
        debug!(path = %path.display(), found = loaded.config.is_some(), "config file lookup");
    }
    merge_config(args, loaded.config.unwrap_or_default())
}

/// CLI values win over file values; unset values fall back to defaults.
pub(crate) fn merge_config(args: &Args, file: FileConfig) -> Result<ClientConfiguration> {
    let username = non_blank(args.username.clone()).or_else(|| non_blank(file.username));
    let password = non_blank(args.password.clone()).or_else(|| non_blank(file.password));

    let mut missing = Vec::new();
    if username.is_none() {
        missing.push("username");
    }
    if password.is_none() {
        missing.push("password");
    }
    let (Some(username), Some(password)) = (username, password) else {
        bail!("{MISSING_CONFIGURATION_MESSAGE}: {}", missing.join(", "));
    };

    let authentication_base_url = non_blank(args.authentication_url.clone())
        .or_else(|| non_blank(file.authentication_base_url))
        .unwrap_or_else(|| DEFAULT_AUTHENTICATION_BASE_URL.to_string());
    let czds_base_url = non_blank(args.czds_url.clone())
        .or_else(|| non_blank(file.czds_base_url))
        .unwrap_or_else(|| DEFAULT_CZDS_BASE_URL.to_string());
    let working_directory = args
        .output
        .clone()
        .or(file.working_directory)
        .unwrap_or_else(|| PathBuf::from("."));

    let timeouts = HttpTimeouts::from_secs(
        args.connect_timeout
            .or(file.connect_timeout_secs)
            .unwrap_or(CONNECT_TIMEOUT_SECS),
        args.read_timeout
            .or(file.read_timeout_secs)
            .unwrap_or(READ_TIMEOUT_SECS),
    );

    let config = ClientConfiguration::from_base_urls(
        &username,
        &password,
        &authentication_base_url,
        &czds_base_url,
        working_directory,
    )
    .context("invalid client configuration")?;
    Ok(config.with_timeouts(timeouts))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
