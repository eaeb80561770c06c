use super::AppState;
use super::error::{WebError, WebResult};
use crate::core::{Message, Restaurant, RestaurantCreate, RestaurantUpdate, RestaurantsPublic};
use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

pub const DELETED_MESSAGE: &str = "restaurant deleted successfully";
const DEFAULT_LIMIT: u64 = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

pub async fn list_restaurants(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<RestaurantsPublic> {
    Json(state.store.list(query.skip, query.limit).await)
}

pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Json<Restaurant>> {
    let id = parse_id(&id)?;
    Ok(Json(state.store.get(&id).await?))
}

pub async fn create_restaurant(
    State(state): State<AppState>,
    Json(payload): Json<RestaurantCreate>,
) -> WebResult<Json<Restaurant>> {
    ensure_name(Some(&payload.name))?;

    let restaurant = state.store.create(payload).await?;
    info!(id = %restaurant.id, "restaurant created");
    Ok(Json(restaurant))
}

pub async fn update_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<RestaurantUpdate>,
) -> WebResult<Json<Restaurant>> {
    let id = parse_id(&id)?;
    ensure_name(payload.name.as_deref())?;

    let restaurant = state.store.update(&id, payload).await?;
    info!(id = %restaurant.id, "restaurant updated");
    Ok(Json(restaurant))
}

pub async fn delete_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Json<Message>> {
    let id = parse_id(&id)?;
    state.store.delete(&id).await?;
    info!(id = %id, "restaurant deleted");
    Ok(Json(Message::new(DELETED_MESSAGE)))
}

/// Ids are UUIDs; anything else is a 422 before the store is touched.
fn parse_id(raw: &str) -> WebResult<String> {
    Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .map_err(|_| WebError::invalid_id(raw))
}

fn ensure_name(name: Option<&str>) -> WebResult<()> {
    match name {
        Some(name) if name.trim().is_empty() => Err(WebError::body_field(
            "name",
            crate::store::BLANK_NAME_MESSAGE,
            serde_json::Value::String(name.to_string()),
        )),
        _ => Ok(()),
    }
}
