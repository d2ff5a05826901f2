//! Crawl command - check each platform and download new releases.

use std::path::Path;
use std::sync::Arc;

use releasewatch::crawler::{Crawler, ProgressFactory};
use releasewatch::discovery::{Discovery, MacDiscovery, WindowsDiscovery};
use releasewatch::download::ParallelDownloadEngine;
use releasewatch::ledger::{Platform, VersionLedger};
use tracing::warn;

use super::common::{progress_bar_callback, selected_platforms, PlatformArg};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the crawl command.
pub struct CrawlArgs<'a> {
    pub config_path: Option<&'a Path>,
    pub platform: Option<PlatformArg>,
}

/// Run the crawl command.
///
/// A failed platform is reported but does not fail the command.
pub fn run(args: CrawlArgs<'_>) -> Result<(), CliError> {
    let runner = CliRunner::new(args.config_path)?;
    runner.log_startup("crawl");
    let config = runner.config();

    let engine = ParallelDownloadEngine::with_reqwest(config.download_config())?;
    let transport = Arc::clone(engine.transport());

    let discoveries: Vec<Box<dyn Discovery>> = selected_platforms(args.platform)
        .into_iter()
        .map(|platform| -> Box<dyn Discovery> {
            match platform {
                Platform::Windows => Box::new(WindowsDiscovery::new(
                    Arc::clone(&transport),
                    config.windows_discovery(),
                )),
                Platform::MacOs => Box::new(MacDiscovery::new(
                    Arc::clone(&transport),
                    config.mac_discovery(),
                )),
            }
        })
        .collect();

    let layout = config.storage_layout();
    let ledger = VersionLedger::load(&layout.ledger_file);
    let progress: ProgressFactory = Arc::new(|name: &str| progress_bar_callback(name));
    let mut crawler = Crawler::new(engine, ledger, layout).with_progress(progress);

    let reports = crawler.crawl_all(&discoveries);

    println!();
    for report in &reports {
        println!("  {}", report);
        if let Some(path) = &report.record().local_file {
            println!("    {}", path.display());
        }
    }

    let failures = reports.iter().filter(|r| r.is_failure()).count();
    if failures > 0 {
        warn!(failures, "Crawl finished with failures");
    }

    Ok(())
}
