//! Common types and utilities shared across CLI commands.

use std::time::Duration;

use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use releasewatch::download::DownloadProgressCallback;
use releasewatch::ledger::Platform;

/// Platform selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PlatformArg {
    /// Windows installers (.exe)
    Windows,
    /// macOS installers (.zip)
    Macos,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Windows => Platform::Windows,
            PlatformArg::Macos => Platform::MacOs,
        }
    }
}

/// Platforms selected by an optional `--platform` flag.
pub fn selected_platforms(arg: Option<PlatformArg>) -> Vec<Platform> {
    match arg {
        Some(p) => vec![p.into()],
        None => Platform::ALL.to_vec(),
    }
}

const TICK_INTERVAL_MS: u64 = 80;
const BYTES_TEMPLATE: &str =
    "  {spinner:.cyan} {msg} [{bar:30.cyan/dim}] {bytes}/{total_bytes} {bytes_per_sec} ({eta})";
const STREAM_TEMPLATE: &str = "  {spinner:.cyan} {msg} {bytes} {bytes_per_sec}";

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━╸━")
}

/// Progress callback drawing an indicatif bar labelled `label`.
///
/// The bar starts as a byte counter and switches to a bounded bar once the
/// total size is reported.
pub fn progress_bar_callback(label: &str) -> DownloadProgressCallback {
    let bar = ProgressBar::new(0);
    bar.set_style(style(STREAM_TEMPLATE));
    bar.set_message(label.to_string());
    bar.enable_steady_tick(Duration::from_millis(TICK_INTERVAL_MS));

    Box::new(move |bytes, total, chunks_done, total_chunks| {
        if total > 0 && bar.length() != Some(total) {
            bar.set_length(total);
            bar.set_style(style(BYTES_TEMPLATE));
        }
        bar.set_position(bytes);

        if total_chunks > 0 && chunks_done == total_chunks {
            bar.finish();
        }
    })
}

/// Human-readable byte count.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_platforms() {
        assert_eq!(selected_platforms(None), vec![Platform::Windows, Platform::MacOs]);
        assert_eq!(selected_platforms(Some(PlatformArg::Macos)), vec![Platform::MacOs]);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(4 * 1024 * 1024), "4.0 MiB");
        assert_eq!(format_bytes(1536), "1.5 KiB");
    }
}
