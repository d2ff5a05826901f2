//! ReleaseWatch - installer release tracking and retrieval
//!
//! This library watches the published installers of a desktop application
//! on Windows and macOS, records every release it observes, and downloads
//! new installers with a parallel, retrying range downloader.
//!
//! # Modules
//!
//! - [`download`]: parallel chunked downloads with single-stream fallback
//! - [`ledger`]: persisted version history
//! - [`update`]: skip-or-download decision
//! - [`discovery`]: resolving the latest release per platform
//! - [`crawler`]: the end-to-end crawl pipeline
//! - [`config`]: INI configuration file
//! - [`logging`]: tracing subscriber setup

pub mod config;
pub mod crawler;
pub mod discovery;
pub mod download;
pub mod ledger;
pub mod logging;
pub mod naming;
pub mod update;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
