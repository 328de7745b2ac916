//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Download zone files from the ICANN Centralized Zone Data Service.
///
/// Without `--tld`, every zone file the account is approved for is downloaded.
/// Settings not given on the command line are read from
/// `$XDG_CONFIG_HOME/czds-downloader/config.toml` (or `--config`).
#[derive(Parser, Debug)]
#[command(name = "czds-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// CZDS account username
    #[arg(short, long)]
    pub username: Option<String>,

    /// CZDS account password
    #[arg(short, long)]
    pub password: Option<String>,

    /// Account API base URL, e.g. https://account-api.icann.org
    #[arg(short = 'a', long = "authen-url")]
    pub authentication_url: Option<String>,

    /// CZDS API base URL, e.g. https://czds-api.icann.org
    #[arg(short = 'c', long = "czds-url")]
    pub czds_url: Option<String>,

    /// Only download these TLDs (comma-separated or repeated)
    #[arg(short, long = "tld", value_delimiter = ',')]
    pub tlds: Vec<String>,

    /// Directory under which zonefiles/ is created
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Read settings from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// HTTP connect timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: Option<u64>,

    /// HTTP idle read timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: Option<u64>,

    /// Stop at the first failed zone when downloading everything
    #[arg(long)]
    pub fail_fast: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Requested TLDs with surrounding whitespace and empty entries removed.
    #[must_use]
    pub fn requested_tlds(&self) -> Vec<String> {
        self.tlds
            .iter()
            .map(|tld| tld.trim())
            .filter(|tld| !tld.is_empty())
            .map(str::to_string)
            .collect()
    }
}
