//! History command - list recorded releases.

use std::path::Path;

use releasewatch::crawler::read_version_file;
use releasewatch::ledger::{VersionLedger, VersionRecord};

use super::common::{selected_platforms, PlatformArg};
use crate::error::CliError;
use crate::runner::load_config;

/// Arguments for the history command.
pub struct HistoryArgs<'a> {
    pub config_path: Option<&'a Path>,
    pub platform: Option<PlatformArg>,
}

/// Run the history command.
pub fn run(args: HistoryArgs<'_>) -> Result<(), CliError> {
    let config = load_config(args.config_path)?;
    let layout = config.storage_layout();
    let ledger = VersionLedger::load(&layout.ledger_file);

    println!("Version history: {}", ledger.path().display());

    for platform in selected_platforms(args.platform) {
        println!();
        println!("[{}]", platform);

        if let Some(current) = read_version_file(&layout, platform) {
            println!("  current: {}", describe(&current));
        }

        let records = ledger.records(platform);
        if records.is_empty() {
            println!("  (no releases recorded)");
            continue;
        }
        for record in records {
            println!("  {}", describe(record));
            if let Some(hash) = &record.file_hash {
                println!("      sha256 {}", hash);
            }
        }
    }

    Ok(())
}

fn describe(record: &VersionRecord) -> String {
    let mut line = record.version.clone();
    if let Some(build) = &record.build_number {
        line.push_str(&format!(" build {}", build));
    }
    if let Some(date) = record.release_date {
        line.push_str(&format!(" released {}", date));
    }
    line.push_str(&format!(
        " (recorded {})",
        record.update_time.format("%Y-%m-%d %H:%M UTC")
    ));
    line
}
