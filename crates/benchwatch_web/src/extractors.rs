//! Extractors whose rejections go through [`ApiError`].

use axum::extract::{FromRequest, FromRequestParts, Json, Path, Request};
use axum::http::request::Parts;
use benchwatch_core::BenchId;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Bench id taken from the `{id}` path segment.
pub struct BenchPath(pub BenchId);

impl<S> FromRequestParts<S> for BenchPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        let id = raw
            .parse::<BenchId>()
            .map_err(|_| ApiError::BadRequest(format!("invalid bench id `{raw}`")))?;
        Ok(Self(id))
    }
}

/// JSON request body; malformed or incomplete bodies are a 400.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}
