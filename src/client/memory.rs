//! Store-backed API implementation.
//!
//! Answers the same way the HTTP backend does, without a socket. Scripted
//! failures, per-offset latency and oversized list responses let callers
//! reproduce slow or misbehaving servers.

use super::RestaurantsApi;
use crate::core::{
    ClientError, Restaurant, RestaurantCreate, RestaurantUpdate, RestaurantsPublic, Result,
};
use crate::store::{RestaurantStore, StoreError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Number of calls received per operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiCallStats {
    pub list: usize,
    pub get: usize,
    pub create: usize,
    pub update: usize,
    pub delete: usize,
}

impl ApiCallStats {
    pub fn total(&self) -> usize {
        self.list + self.get + self.create + self.update + self.delete
    }

    pub fn mutations(&self) -> usize {
        self.create + self.update + self.delete
    }
}

#[derive(Default)]
struct Behavior {
    list_faults: VecDeque<ClientError>,
    mutation_faults: VecDeque<ClientError>,
    list_delays: HashMap<u64, Duration>,
    mutation_delay: Option<Duration>,
    list_padding: u64,
    stats: ApiCallStats,
}

#[derive(Default)]
pub struct InMemoryRestaurantsApi {
    store: RestaurantStore,
    behavior: Mutex<Behavior>,
}

impl InMemoryRestaurantsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: RestaurantStore) -> Self {
        Self {
            store,
            behavior: Mutex::default(),
        }
    }

    pub fn store(&self) -> &RestaurantStore {
        &self.store
    }

    /// Fail the next `list` call with `err`. Queued failures are consumed in order.
    pub fn fail_next_list(&self, err: ClientError) {
        self.behavior().list_faults.push_back(err);
    }

    /// Fail the next create, update or delete call with `err`.
    pub fn fail_next_mutation(&self, err: ClientError) {
        self.behavior().mutation_faults.push_back(err);
    }

    /// Delay `list` responses for the page starting at `skip`.
    pub fn delay_list(&self, skip: u64, delay: Duration) {
        self.behavior().list_delays.insert(skip, delay);
    }

    pub fn delay_mutations(&self, delay: Duration) {
        self.behavior().mutation_delay = Some(delay);
    }

    /// Return up to `extra` rows beyond the requested limit.
    pub fn pad_list_responses(&self, extra: u64) {
        self.behavior().list_padding = extra;
    }

    pub fn stats(&self) -> ApiCallStats {
        self.behavior().stats.clone()
    }

    fn behavior(&self) -> MutexGuard<'_, Behavior> {
        self.behavior.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the call and returns the scripted delay and failure, if any.
    fn begin_mutation(
        &self,
        record: impl FnOnce(&mut ApiCallStats),
    ) -> (Option<Duration>, Option<ClientError>) {
        let mut behavior = self.behavior();
        record(&mut behavior.stats);
        (behavior.mutation_delay, behavior.mutation_faults.pop_front())
    }
}

fn store_error(err: StoreError) -> ClientError {
    match err {
        StoreError::NotFound => ClientError::server(404, err.to_string()),
        StoreError::Validation { message, .. } => ClientError::server(422, message),
    }
}

async fn pause(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl RestaurantsApi for InMemoryRestaurantsApi {
    async fn list(&self, skip: u64, limit: u64) -> Result<RestaurantsPublic> {
        if limit == 0 {
            return Err(ClientError::validation("limit", "limit must be > 0"));
        }

        let (delay, fault, padding) = {
            let mut behavior = self.behavior();
            behavior.stats.list += 1;
            (
                behavior.list_delays.get(&skip).copied(),
                behavior.list_faults.pop_front(),
                behavior.list_padding,
            )
        };

        pause(delay).await;
        if let Some(err) = fault {
            return Err(err);
        }

        Ok(self.store.list(skip, limit + padding).await)
    }

    async fn get(&self, id: &str) -> Result<Restaurant> {
        self.behavior().stats.get += 1;
        self.store.get(id).await.map_err(store_error)
    }

    async fn create(&self, body: &RestaurantCreate) -> Result<Restaurant> {
        let (delay, fault) = self.begin_mutation(|stats| stats.create += 1);
        pause(delay).await;
        if let Some(err) = fault {
            return Err(err);
        }

        self.store.create(body.clone()).await.map_err(store_error)
    }

    async fn update(&self, id: &str, body: &RestaurantUpdate) -> Result<Restaurant> {
        let (delay, fault) = self.begin_mutation(|stats| stats.update += 1);
        pause(delay).await;
        if let Some(err) = fault {
            return Err(err);
        }

        self.store.update(id, body.clone()).await.map_err(store_error)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let (delay, fault) = self.begin_mutation(|stats| stats.delete += 1);
        pause(delay).await;
        if let Some(err) = fault {
            return Err(err);
        }

        self.store.delete(id).await.map_err(store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_not_found_maps_to_server_error() {
        let api = InMemoryRestaurantsApi::new();
        let err = api.get("missing").await.unwrap_err();
        assert_eq!(err, ClientError::server(404, "restaurant not found"));
    }

    #[tokio::test]
    async fn test_scripted_failure_is_consumed_once() {
        let api = InMemoryRestaurantsApi::new();
        api.fail_next_mutation(ClientError::network("connection reset"));

        assert!(api.create(&RestaurantCreate::new("A")).await.is_err());
        assert!(api.create(&RestaurantCreate::new("A")).await.is_ok());
        assert_eq!(api.stats().create, 2);
        assert_eq!(api.store().len().await, 1);
    }

    #[tokio::test]
    async fn test_padding_returns_extra_rows() {
        let api = InMemoryRestaurantsApi::new();
        for i in 0..6 {
            api.create(&RestaurantCreate::new(format!("R{i}"))).await.unwrap();
        }
        api.pad_list_responses(3);

        let response = api.list(0, 2).await.unwrap();
        assert_eq!(response.data.len(), 5);
        assert_eq!(response.count, 6);
    }

    #[tokio::test]
    async fn test_zero_limit_is_rejected() {
        let api = InMemoryRestaurantsApi::new();
        assert!(api.list(0, 0).await.unwrap_err().is_validation());
        assert_eq!(api.stats().total(), 0);
    }
}
