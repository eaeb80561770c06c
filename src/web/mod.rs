//! Restaurant REST backend.
//!
//! An axum router over [`RestaurantStore`], serving the same API the client
//! side consumes. Used by the `serve` subcommand and by the HTTP client tests.

mod error;
mod handlers;

pub use error::{INVALID_UUID_MESSAGE, WebError, WebResult};
pub use handlers::{DELETED_MESSAGE, ListQuery};

use crate::store::RestaurantStore;
use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use std::env;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub const RESTAURANTS_PATH: &str = "/api/v1/restaurants";

#[derive(Clone, Default)]
pub struct AppState {
    pub store: RestaurantStore,
}

impl AppState {
    pub fn new(store: RestaurantStore) -> Self {
        Self { store }
    }
}

pub fn build_router(state: AppState) -> Router {
    let collection = get(handlers::list_restaurants).post(handlers::create_restaurant);
    let item = get(handlers::get_restaurant)
        .put(handlers::update_restaurant)
        .delete(handlers::delete_restaurant);

    Router::new()
        .route(RESTAURANTS_PATH, collection.clone())
        .route(&format!("{RESTAURANTS_PATH}/"), collection)
        .route(&format!("{RESTAURANTS_PATH}/:id"), item)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    /// Reads `RESTO_HOST` and `RESTO_PORT`, falling back to the defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let host = env::var("RESTO_HOST").unwrap_or(defaults.host);
        let port = match env::var("RESTO_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .context("RESTO_PORT must be a valid u16")?,
            Err(_) => defaults.port,
        };

        Ok(Self { host, port })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
