//! In-memory restaurant store.
//!
//! Records keep insertion order, which is the order `list` pages through them.
//! Shared by the HTTP backend and `InMemoryRestaurantsApi`; clones share storage.

use crate::core::{Restaurant, RestaurantCreate, RestaurantUpdate, RestaurantsPublic};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

pub const NOT_FOUND_MESSAGE: &str = "restaurant not found";
pub const BLANK_NAME_MESSAGE: &str = "String should have at least 1 character";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Default)]
pub struct RestaurantStore {
    records: Arc<RwLock<Vec<Restaurant>>>,
}

impl RestaurantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list(&self, skip: u64, limit: u64) -> RestaurantsPublic {
        let records = self.records.read().await;
        let data = records
            .iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        RestaurantsPublic {
            data,
            count: records.len() as u64,
        }
    }

    pub async fn get(&self, id: &str) -> StoreResult<Restaurant> {
        let records = self.records.read().await;
        records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    pub async fn create(&self, input: RestaurantCreate) -> StoreResult<Restaurant> {
        ensure_name(&input.name)?;

        let restaurant = Restaurant {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            revo_tenant: input.revo_tenant,
            revo_client_key: input.revo_client_key,
            revo_api_key: input.revo_api_key,
        };

        self.records.write().await.push(restaurant.clone());
        Ok(restaurant)
    }

    pub async fn update(&self, id: &str, input: RestaurantUpdate) -> StoreResult<Restaurant> {
        if let Some(name) = input.name.as_deref() {
            ensure_name(name)?;
        }

        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(name) = input.name {
            record.name = name;
        }
        if let Some(tenant) = input.revo_tenant {
            record.revo_tenant = tenant;
        }
        if let Some(key) = input.revo_client_key {
            record.revo_client_key = key;
        }
        if let Some(key) = input.revo_api_key {
            record.revo_api_key = key;
        }

        Ok(record.clone())
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let position = records
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound)?;
        records.remove(position);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn ensure_name(name: &str) -> StoreResult<()> {
    if name.trim().is_empty() {
        return Err(StoreError::Validation {
            field: "name",
            message: BLANK_NAME_MESSAGE.to_string(),
        });
    }
    Ok(())
}
