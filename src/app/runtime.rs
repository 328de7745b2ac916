use anyhow::Result;
use czds_core::{BatchOutcome, BatchPolicy, ZoneDownloader};
use tracing::{debug, info, warn};

use crate::ProcessExit;
use crate::app::{config_manager, exit_handler};
use crate::cli::Args;

/// Header printed before the list of saved files.
pub(crate) const COMPLETION_BANNER: &str = "Downloading completed. Here are the file(s):";

pub(crate) async fn run_downloader(args: &Args) -> Result<ProcessExit> {
    let config = config_manager::resolve_config(args)?;
    debug!(?config, "configuration resolved");
    info!(
        output = %config.zonefile_directory().display(),
        "CZDS downloader starting"
    );

    let downloader = ZoneDownloader::new(config)?;
    let tlds = args.requested_tlds();

    let outcome = if tlds.is_empty() {
        let policy = if args.fail_fast {
            BatchPolicy::FailFast
        } else {
            BatchPolicy::BestEffort
        };
        downloader.download_all_with_policy(policy).await?
    } else {
        info!(count = tlds.len(), "downloading requested zones");
        downloader.download_zones(&tlds, BatchPolicy::FailFast).await?
    };

    print_completion_summary(&outcome);
    Ok(exit_handler::determine_exit_outcome(
        outcome.completed(),
        outcome.failed(),
    ))
}

fn print_completion_summary(outcome: &BatchOutcome) {
    println!("{COMPLETION_BANNER}");
    for file in &outcome.files {
        println!("{}", file.path.display());
    }
    for failure in &outcome.failures {
        warn!(url = %failure.url, kind = %failure.error.kind(), "zone file was not downloaded");
        eprintln!("Failed: {} ({})", failure.url, failure.error);
    }
}
