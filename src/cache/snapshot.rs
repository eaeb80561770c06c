use crate::core::{ClientError, Page, PageKey};
use std::fmt;
use std::sync::Arc;

/// What a view subscribed to one page key gets to render.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySnapshot {
    pub key: PageKey,
    /// Data to show: the key's own page, or the last displayed page as placeholder
    pub page: Option<Arc<Page>>,
    /// No data at all and a fetch is in flight
    pub is_loading: bool,
    /// A fetch for this key is in flight
    pub is_fetching: bool,
    /// `page` is not fresh data for this key
    pub is_placeholder: bool,
    /// Last fetch for this key failed
    pub error: Option<ClientError>,
}

impl QuerySnapshot {
    pub fn empty(key: PageKey) -> Self {
        Self {
            key,
            page: None,
            is_loading: false,
            is_fetching: false,
            is_placeholder: false,
            error: None,
        }
    }

    pub fn total_count(&self) -> u64 {
        self.page.as_ref().map(|p| p.total_count).unwrap_or(0)
    }

    pub fn is_fresh(&self) -> bool {
        self.page.is_some() && !self.is_placeholder
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub fetches: u64,
    /// Responses stored but not displayed because another key was requested meanwhile
    pub superseded: u64,
    /// Responses dropped because the cache was invalidated while they were in flight
    pub discarded: u64,
    /// Fetches abandoned by their caller before the response arrived
    pub cancelled: u64,
    pub invalidations: u64,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cache Stats: {} hits, {} misses, {} fetches, {} superseded, {} discarded, {} cancelled, {} invalidations",
            self.hits,
            self.misses,
            self.fetches,
            self.superseded,
            self.discarded,
            self.cancelled,
            self.invalidations
        )
    }
}
