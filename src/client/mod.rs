//! API collaborator.
//!
//! Everything above this module talks to the backend through [`RestaurantsApi`].
//! Implementors are annotated with `#[async_trait::async_trait]` so the
//! returned futures are `Send`.

pub mod config;
pub mod http;
pub mod memory;

use crate::core::{Restaurant, RestaurantCreate, RestaurantUpdate, RestaurantsPublic, Result};
use async_trait::async_trait;

pub use config::ClientConfig;
pub use http::HttpRestaurantsApi;
pub use memory::{ApiCallStats, InMemoryRestaurantsApi};

#[async_trait]
pub trait RestaurantsApi: Send + Sync {
    /// One slice of the collection plus the total count. `limit` must be > 0.
    async fn list(&self, skip: u64, limit: u64) -> Result<RestaurantsPublic>;

    async fn get(&self, id: &str) -> Result<Restaurant>;

    async fn create(&self, body: &RestaurantCreate) -> Result<Restaurant>;

    async fn update(&self, id: &str, body: &RestaurantUpdate) -> Result<Restaurant>;

    async fn delete(&self, id: &str) -> Result<()>;
}
