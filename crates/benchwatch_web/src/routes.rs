//! Route handlers.
//!
//! Storage calls block, so each one runs on tokio's blocking pool with its
//! own short-lived connection.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use benchwatch_core::{
    availability_label, Bench, BenchId, BenchService, BenchUpdate, NewBench, RepoResult,
    ANONYMOUS,
};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{BenchPath, JsonBody};
use crate::pages;
use crate::AppState;

/// Flat bench record handed to the map page and the JSON API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapBench {
    pub id: BenchId,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub is_available: bool,
    pub last_updated: String,
    pub added_by: String,
}

impl From<Bench> for MapBench {
    fn from(bench: Bench) -> Self {
        Self {
            id: bench.id,
            latitude: bench.latitude,
            longitude: bench.longitude,
            description: bench.description,
            is_available: bench.is_available,
            last_updated: bench.last_updated,
            added_by: bench.added_by,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBenchRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub added_by: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedBench {
    pub id: BenchId,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub is_available: bool,
    #[serde(default)]
    pub updated_by: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /
pub async fn home() -> Html<&'static str> {
    info!("event=page_view module=web page=home");
    Html(pages::INDEX_HTML)
}

/// GET /map
pub async fn map(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let benches = project(run_storage(&state, |service| service.list_benches()).await?);
    info!(
        "event=page_view module=web page=map bench_count={}",
        benches.len()
    );
    Ok(Html(pages::render_map(&benches)?))
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/benches
pub async fn list_benches(State(state): State<AppState>) -> ApiResult<Json<Vec<MapBench>>> {
    let benches = run_storage(&state, |service| service.list_benches()).await?;
    Ok(Json(project(benches)))
}

/// GET /api/benches/{id}
pub async fn get_bench(
    State(state): State<AppState>,
    BenchPath(id): BenchPath,
) -> ApiResult<Json<MapBench>> {
    run_storage(&state, move |service| service.find_bench(id))
        .await?
        .map(|bench| Json(MapBench::from(bench)))
        .ok_or_else(|| ApiError::NotFound(format!("bench not found: {id}")))
}

/// POST /api/benches
pub async fn create_bench(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateBenchRequest>,
) -> ApiResult<(StatusCode, Json<CreatedBench>)> {
    validate_coordinates(request.latitude, request.longitude)?;

    let bench = NewBench::new(request.latitude, request.longitude)
        .with_description(request.description)
        .with_added_by(reporter_name(request.added_by.as_deref()));
    let id = run_storage(&state, move |service| service.create(&bench)).await?;

    Ok((StatusCode::CREATED, Json(CreatedBench { id })))
}

/// POST /api/benches/{id}/availability
pub async fn update_availability(
    State(state): State<AppState>,
    BenchPath(id): BenchPath,
    JsonBody(request): JsonBody<AvailabilityRequest>,
) -> ApiResult<Json<BenchUpdate>> {
    let updated_by = reporter_name(request.updated_by.as_deref());
    let is_available = request.is_available;
    let update = run_storage(&state, move |service| {
        service.update_availability(id, is_available, &updated_by)
    })
    .await?;
    info!(
        "event=bench_marked module=web bench_id={id} state={}",
        availability_label(update.is_available)
    );
    Ok(Json(update))
}

/// GET /api/benches/{id}/history
pub async fn bench_history(
    State(state): State<AppState>,
    BenchPath(id): BenchPath,
) -> ApiResult<Json<Vec<BenchUpdate>>> {
    let history = run_storage(&state, move |service| service.bench_history(id)).await?;
    Ok(Json(history))
}

async fn run_storage<T, F>(state: &AppState, op: F) -> ApiResult<T>
where
    F: FnOnce(&BenchService) -> RepoResult<T> + Send + 'static,
    T: Send + 'static,
{
    let service = state.service.clone();
    let result = tokio::task::spawn_blocking(move || op(&service)).await?;
    Ok(result?)
}

fn project(benches: Vec<Bench>) -> Vec<MapBench> {
    benches.into_iter().map(MapBench::from).collect()
}

fn reporter_name(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => ANONYMOUS.to_string(),
    }
}

fn validate_coordinates(latitude: f64, longitude: f64) -> ApiResult<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ApiError::BadRequest(format!(
            "latitude {latitude} is outside -90..=90"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ApiError::BadRequest(format!(
            "longitude {longitude} is outside -180..=180"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{reporter_name, validate_coordinates};
    use benchwatch_core::ANONYMOUS;

    #[test]
    fn blank_reporter_becomes_anonymous() {
        assert_eq!(reporter_name(None), ANONYMOUS);
        assert_eq!(reporter_name(Some("   ")), ANONYMOUS);
        assert_eq!(reporter_name(Some(" Bob ")), "Bob");
    }

    #[test]
    fn coordinates_outside_the_globe_are_rejected() {
        assert!(validate_coordinates(37.7749, -122.4194).is_ok());
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, -180.5).is_err());
    }
}
