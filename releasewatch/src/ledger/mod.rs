//! Version history.
//!
//! A [`VersionLedger`] holds every release observed per [`Platform`],
//! keyed by [`VersionKey`] so re-discovering a release refreshes it in place.

mod error;
mod record;
mod store;

pub use error::{LedgerError, LedgerResult};
pub use record::{Platform, VersionKey, VersionRecord, UNKNOWN_VERSION};
pub use store::VersionLedger;
