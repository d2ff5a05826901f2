//! CLI subcommands.

pub mod common;
pub mod config;
pub mod crawl;
pub mod fetch;
pub mod hash;
pub mod history;
pub mod init;
