// ============================================================================
// Restaurant Admin Library
// ============================================================================
//
// Headless client side of a restaurant admin panel: a paginated query cache,
// a mutation coordinator that invalidates it, dialog and table view models,
// plus the REST backend they talk to.

pub mod cache;
pub mod client;
pub mod core;
pub mod dialog;
pub mod mutation;
pub mod store;
pub mod view;
pub mod web;

pub use cache::{QueryCache, QuerySnapshot, Subscription};
pub use client::{ClientConfig, HttpRestaurantsApi, InMemoryRestaurantsApi, RestaurantsApi};
pub use core::{
    ClientError, Page, PageKey, Restaurant, RestaurantCreate, RestaurantUpdate, RestaurantsPublic,
    Result,
};
pub use dialog::{DeleteDialog, RestaurantDialog};
pub use mutation::{MutationCoordinator, MutationPhase, MutationState};
pub use store::RestaurantStore;
pub use view::{Pagination, RestaurantsTable, TableView};

use std::sync::Arc;

/// Everything a session needs, wired from one [`ClientConfig`].
///
/// # Examples
///
/// ```no_run
/// use resto_admin::{AdminClient, ClientConfig};
///
/// # async fn run() -> resto_admin::Result<()> {
/// let client = AdminClient::connect(ClientConfig::new("http://localhost:8000"))?;
/// let page = client.cache().fetch_page(1, client.page_size()).await?;
/// println!("{} of {}", page.len(), page.total_count);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AdminClient {
    cache: QueryCache,
    coordinator: MutationCoordinator,
    page_size: u32,
}

impl AdminClient {
    /// Build an HTTP-backed client. Fails on an invalid configuration.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let page_size = config.page_size;
        let capacity = config.cache_capacity;
        let api: Arc<dyn RestaurantsApi> = Arc::new(HttpRestaurantsApi::new(config)?);
        Ok(Self::with_api(api, page_size, capacity))
    }

    pub fn with_api(api: Arc<dyn RestaurantsApi>, page_size: u32, cache_capacity: usize) -> Self {
        let cache = QueryCache::new(api, cache_capacity);
        let coordinator =
            MutationCoordinator::new(cache.clone(), Arc::new(mutation::TracingNotifier));
        Self {
            cache,
            coordinator,
            page_size: page_size.max(1),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn coordinator(&self) -> &MutationCoordinator {
        &self.coordinator
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// A fresh, unmounted table starting at page 1.
    pub fn table(&self) -> RestaurantsTable {
        RestaurantsTable::new(self.cache.clone(), self.page_size)
    }
}
