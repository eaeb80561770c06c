use super::{ClientConfig, RestaurantsApi};
use crate::core::{
    ClientError, Message, Restaurant, RestaurantCreate, RestaurantUpdate, RestaurantsPublic,
    Result,
};
use async_trait::async_trait;
use reqwest::{IntoUrl, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// reqwest-backed API client.
#[derive(Debug, Clone)]
pub struct HttpRestaurantsApi {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpRestaurantsApi {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate().map_err(ClientError::Config)?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, url: impl IntoUrl) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match self.config.token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn record_url(&self, id: &str) -> Result<Url> {
        self.config.restaurant_url(id).map_err(ClientError::Config)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::network(e.to_string()))?;
        let response = check_status(response).await?;

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::network(format!("invalid response body: {e}")))
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), body = %body, "request failed");
    Err(ClientError::server(status.as_u16(), error_detail(&body)))
}

/// Pulls the human-readable message out of an error body.
///
/// Understands `{"detail": "..."}` and the validation form
/// `{"detail": [{"msg": "..."}]}`. Anything else yields an empty string.
pub fn error_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return String::new();
    };

    match value.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        Some(Value::Array(items)) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

#[async_trait]
impl RestaurantsApi for HttpRestaurantsApi {
    async fn list(&self, skip: u64, limit: u64) -> Result<RestaurantsPublic> {
        if limit == 0 {
            return Err(ClientError::validation("limit", "limit must be > 0"));
        }

        let request = self
            .request(Method::GET, self.config.restaurants_url())
            .query(&[("skip", skip), ("limit", limit)]);
        self.send(request).await
    }

    async fn get(&self, id: &str) -> Result<Restaurant> {
        let request = self.request(Method::GET, self.record_url(id)?);
        self.send(request).await
    }

    async fn create(&self, body: &RestaurantCreate) -> Result<Restaurant> {
        let request = self
            .request(Method::POST, self.config.restaurants_url())
            .json(body);
        self.send(request).await
    }

    async fn update(&self, id: &str, body: &RestaurantUpdate) -> Result<Restaurant> {
        let request = self
            .request(Method::PUT, self.record_url(id)?)
            .json(body);
        self.send(request).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let request = self.request(Method::DELETE, self.record_url(id)?);
        let _: Message = self.send(request).await?;
        Ok(())
    }
}
