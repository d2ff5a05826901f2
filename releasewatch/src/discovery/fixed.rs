//! Discovery that always reports the same release.

use super::{Discovery, DiscoveryResult, VersionDescriptor};
use crate::ledger::Platform;

/// Reports a fixed descriptor. Useful for pinning a release by hand.
#[derive(Debug, Clone)]
pub struct StaticDiscovery {
    platform: Platform,
    descriptor: VersionDescriptor,
}

impl StaticDiscovery {
    pub fn new(platform: Platform, descriptor: VersionDescriptor) -> Self {
        Self {
            platform,
            descriptor,
        }
    }
}

impl Discovery for StaticDiscovery {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn discover(&self) -> DiscoveryResult<VersionDescriptor> {
        Ok(self.descriptor.clone())
    }
}
