use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use resto_admin::RestaurantStore;
use resto_admin::web::{AppState, build_router};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> axum::Router {
    build_router(AppState::new(RestaurantStore::new()))
}

async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    payload: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match payload {
        Some(payload) => builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("response expected");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should be readable");

    if body.is_empty() {
        return (status, Value::Null);
    }

    let json = serde_json::from_slice::<Value>(&body).expect("body should be valid JSON");
    (status, json)
}

async fn create(app: &axum::Router, name: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/restaurants/",
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn create_and_get_restaurant() {
    let app = app();

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/v1/restaurants/",
        Some(json!({ "name": "Bistro", "revo_tenant": "bistro-tenant" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["name"], "Bistro");
    assert_eq!(created["revo_tenant"], "bistro-tenant");
    assert_eq!(created["revo_api_key"], Value::Null);

    let id = created["id"].as_str().expect("created response should have id");
    let uri = format!("/api/v1/restaurants/{id}");
    let (status, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn list_pages_with_full_count() {
    let app = app();
    for n in 1..=7 {
        create(&app, &format!("Restaurant {n}")).await;
    }

    let uri = "/api/v1/restaurants/?skip=5&limit=5";
    let (status, page) = send(&app, Method::GET, uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 7);
    assert_eq!(page["data"].as_array().unwrap().len(), 2);
    assert_eq!(page["data"][0]["name"], "Restaurant 6");

    let (status, all) = send(&app, Method::GET, "/api/v1/restaurants", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["data"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn update_is_partial() {
    let app = app();
    let created = create(&app, "Cafe").await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/restaurants/{id}"),
        Some(json!({ "revo_api_key": "secret" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Cafe");
    assert_eq!(updated["revo_api_key"], "secret");
}

#[tokio::test]
async fn update_with_null_clears_field() {
    let app = app();
    let (_, created) = send(
        &app,
        Method::POST,
        "/api/v1/restaurants/",
        Some(json!({ "name": "Tavern", "revo_tenant": "tavern", "revo_api_key": "k" })),
    )
    .await;
    let uri = format!("/api/v1/restaurants/{}", created["id"].as_str().unwrap());

    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "revo_tenant": null })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["revo_tenant"], Value::Null);
    assert_eq!(updated["revo_api_key"], "k");
    assert_eq!(updated["name"], "Tavern");
}

#[tokio::test]
async fn delete_then_missing() {
    let app = app();
    let created = create(&app, "Diner").await;
    let uri = format!("/api/v1/restaurants/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "restaurant deleted successfully" }));

    for method in [Method::GET, Method::DELETE] {
        let (status, body) = send(&app, method, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "detail": "restaurant not found" }));
    }
}

#[tokio::test]
async fn blank_name_is_unprocessable() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/restaurants/",
        Some(json!({ "name": "  " })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["body", "name"]));
    assert_eq!(
        body["detail"][0]["msg"],
        "String should have at least 1 character"
    );

    let (_, listed) = send(&app, Method::GET, "/api/v1/restaurants/", None).await;
    assert_eq!(listed["count"], 0);
}

#[tokio::test]
async fn malformed_id_is_unprocessable() {
    let app = app();

    let uri = "/api/v1/restaurants/not-a-uuid";
    let (status, body) = send(&app, Method::GET, uri, None).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["path", "id"]));
    assert_eq!(body["detail"][0]["input"], "not-a-uuid");
}
