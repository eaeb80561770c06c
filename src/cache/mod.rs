//! Collection query cache.
//!
//! One explicit cache object per session, shared by handle. Views observe it
//! through [`QueryCache::subscribe`]; mutation coordinators call
//! [`QueryCache::invalidate`] when a write settles.

mod query_cache;
mod snapshot;
mod subscription;

pub use query_cache::{QueryCache, SnapshotCallback};
pub use snapshot::{CacheStats, QuerySnapshot};
pub use subscription::Subscription;
