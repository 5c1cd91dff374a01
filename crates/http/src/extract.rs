//! Request extractors shared by module handlers.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde_json::{Map, Value};

use crate::error::{AppError, NO_JSON_MESSAGE};

/// A request body that must be a non-empty JSON object.
///
/// Field types are left untouched so that handlers can report per-field
/// validation errors instead of a blanket deserialization failure.
#[derive(Debug, Clone)]
pub struct JsonObject(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::warn!(reason = %rejection.body_text(), "request body rejected");
                AppError::bad_request(NO_JSON_MESSAGE)
            })?;

        match value {
            Value::Object(map) if !map.is_empty() => Ok(JsonObject(map)),
            _ => {
                tracing::warn!("request body is not a non-empty JSON object");
                Err(AppError::bad_request(NO_JSON_MESSAGE))
            }
        }
    }
}
