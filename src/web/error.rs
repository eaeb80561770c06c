use crate::store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

pub const INVALID_UUID_MESSAGE: &str = "Input should be a valid UUID";

/// Errors produced by the restaurant HTTP handlers.
///
/// Bodies follow the `{"detail": ...}` convention: a string for 404s and a
/// list of `{type, loc, msg, input}` objects for 422s.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("{0}")]
    NotFound(String),

    #[error("{}: {message}", .loc.join("."))]
    Unprocessable {
        kind: &'static str,
        loc: Vec<String>,
        message: String,
        input: Value,
    },
}

#[derive(Debug, Serialize)]
struct ValidationDetail {
    #[serde(rename = "type")]
    kind: &'static str,
    loc: Vec<String>,
    msg: String,
    input: Value,
}

impl WebError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn invalid_id(raw: &str) -> Self {
        Self::Unprocessable {
            kind: "uuid_parsing",
            loc: vec!["path".to_string(), "id".to_string()],
            message: INVALID_UUID_MESSAGE.to_string(),
            input: Value::String(raw.to_string()),
        }
    }

    pub fn body_field(field: &str, message: impl Into<String>, input: Value) -> Self {
        Self::Unprocessable {
            kind: "string_too_short",
            loc: vec!["body".to_string(), field.to_string()],
            message: message.into(),
            input,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl From<StoreError> for WebError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound(err.to_string()),
            StoreError::Validation { field, message } => {
                Self::body_field(field, message, Value::String(String::new()))
            }
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            WebError::NotFound(message) => json!({ "detail": message }),
            WebError::Unprocessable {
                kind,
                loc,
                message,
                input,
            } => json!({
                "detail": [ValidationDetail {
                    kind,
                    loc,
                    msg: message,
                    input,
                }]
            }),
        };

        (status, Json(body)).into_response()
    }
}

pub type WebResult<T> = std::result::Result<T, WebError>;
