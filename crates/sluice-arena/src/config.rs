//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for arena regions and the pool that recycles them.
///
/// Validated by [`ArenaPool::new`](crate::ArenaPool::new); all values are
/// immutable after the pool is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of each arena region in bytes.
    ///
    /// Default: 64 MiB. The region is allocated and zeroed once when an
    /// arena is first created, then reused for the life of the pool.
    pub region_bytes: usize,

    /// Maximum number of released regions the pool retains.
    ///
    /// Default: 4. Releasing into a full pool drops the region.
    pub pool_capacity: usize,
}

impl ArenaConfig {
    /// Default region size: 64 MiB.
    pub const DEFAULT_REGION_BYTES: usize = 64 * 1024 * 1024;

    /// Default number of pooled regions.
    pub const DEFAULT_POOL_CAPACITY: usize = 4;

    /// Create a config with the given region size and the default pool capacity.
    pub fn new(region_bytes: usize) -> Self {
        Self {
            region_bytes,
            pool_capacity: Self::DEFAULT_POOL_CAPACITY,
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.region_bytes == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "region_bytes must be at least 1",
            });
        }
        if self.pool_capacity == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "pool_capacity must be at least 1",
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_REGION_BYTES)
    }
}
