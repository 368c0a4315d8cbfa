// HTTP request handlers
use crate::application::error::QueryError;
use crate::domain::batch::{DailyStats, EmptyFullTracking, Incident, StationAggregate};
use crate::domain::pagination::{
    DEFAULT_AGGREGATED_LIMIT, DEFAULT_CRITICAL_THRESHOLD, DEFAULT_TOP_LIMIT, PageRequest,
    positive_or,
};
use crate::domain::station::Station;
use crate::domain::stats::GlobalStats;
use crate::infrastructure::http_response::{ApiError, Envelope};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::PathRejection},
};
use serde_json::{Value, json};
use std::sync::Arc;

type ApiResult<T> = Result<Envelope<T>, ApiError>;

// Query strings are taken as raw pairs so extraction never rejects: a
// malformed or repeated parameter falls back to the lenient parsing below
// instead of a bare 400.
type QueryPairs = Query<Vec<(String, String)>>;

/// First value given for `key`; later repeats are ignored.
fn param<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
}

/// Empty strings (`?date=`) mean "no filter".
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Liveness only; never touches the store
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "Vélib Backend API is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Paged station listing, ordered by name
pub async fn list_stations(
    State(state): State<Arc<AppState>>,
    Query(query): QueryPairs,
) -> ApiResult<Vec<Station>> {
    let request = PageRequest::from_query(param(&query, "page"), param(&query, "limit"));

    let (stations, pagination) = state
        .station_service
        .list_stations(request)
        .await
        .map_err(|e| ApiError::new(e, "Failed to fetch stations", state.expose_errors))?;

    Ok(Envelope::paginated(stations, pagination))
}

/// Installed stations with the most bikes available
pub async fn top_stations(
    State(state): State<Arc<AppState>>,
    Query(query): QueryPairs,
) -> ApiResult<Vec<Station>> {
    let limit = positive_or(param(&query, "limit"), DEFAULT_TOP_LIMIT);

    let stations = state
        .station_service
        .top_stations(limit)
        .await
        .map_err(|e| ApiError::new(e, "Failed to fetch top stations", state.expose_errors))?;

    Ok(Envelope::data(stations))
}

/// Installed stations that are nearly empty or nearly full
pub async fn critical_stations(
    State(state): State<Arc<AppState>>,
    Query(query): QueryPairs,
) -> ApiResult<Vec<Station>> {
    let threshold = positive_or(param(&query, "threshold"), DEFAULT_CRITICAL_THRESHOLD);

    let stations = state
        .station_service
        .critical_stations(threshold)
        .await
        .map_err(|e| {
            ApiError::new(e, "Failed to fetch critical stations", state.expose_errors)
        })?;

    Ok(Envelope::data(stations))
}

pub async fn get_station(
    State(state): State<Arc<AppState>>,
    station_code: Result<Path<String>, PathRejection>,
) -> ApiResult<Station> {
    // A code that does not decode (`%FF`) cannot name any station
    let Path(station_code) = station_code.map_err(|rejection| {
        ApiError::new(
            QueryError::NotFound(rejection.body_text()),
            "Station not found",
            state.expose_errors,
        )
    })?;

    let station = state
        .station_service
        .get_station(&station_code)
        .await
        .map_err(|e| {
            let summary = match e {
                QueryError::NotFound(_) => "Station not found",
                _ => "Failed to fetch station",
            };
            ApiError::new(e, summary, state.expose_errors)
        })?;

    Ok(Envelope::data(station))
}

pub async fn global_stats(State(state): State<Arc<AppState>>) -> ApiResult<GlobalStats> {
    let stats = state
        .station_service
        .global_stats()
        .await
        .map_err(|e| ApiError::new(e, "Failed to fetch stats", state.expose_errors))?;

    Ok(Envelope::data(stats))
}

pub async fn batch_incidents(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Incident>> {
    let incidents = state
        .batch_service
        .incidents()
        .await
        .map_err(|e| ApiError::new(e, "Failed to fetch incidents", state.expose_errors))?;

    Ok(Envelope::counted(incidents))
}

pub async fn batch_empty_full(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<EmptyFullTracking>> {
    let rows = state
        .batch_service
        .empty_full_tracking()
        .await
        .map_err(|e| {
            ApiError::new(e, "Failed to fetch empty-full stations", state.expose_errors)
        })?;

    Ok(Envelope::counted(rows))
}

pub async fn batch_daily_stats(
    State(state): State<Arc<AppState>>,
    Query(query): QueryPairs,
) -> ApiResult<Vec<DailyStats>> {
    let stats = state
        .batch_service
        .daily_stats(non_empty(param(&query, "date")))
        .await
        .map_err(|e| ApiError::new(e, "Failed to fetch daily stats", state.expose_errors))?;

    Ok(Envelope::counted(stats))
}

pub async fn batch_aggregated(
    State(state): State<Arc<AppState>>,
    Query(query): QueryPairs,
) -> ApiResult<Vec<StationAggregate>> {
    let limit = positive_or(param(&query, "limit"), DEFAULT_AGGREGATED_LIMIT);

    let rows = state
        .batch_service
        .aggregated(non_empty(param(&query, "stationCode")), limit)
        .await
        .map_err(|e| {
            ApiError::new(e, "Failed to fetch aggregated data", state.expose_errors)
        })?;

    Ok(Envelope::counted(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_param_takes_first_repeat() {
        let query = pairs(&[("limit", "5"), ("page", "2"), ("limit", "6")]);
        assert_eq!(param(&query, "limit"), Some("5"));
        assert_eq!(param(&query, "page"), Some("2"));
        assert_eq!(param(&query, "threshold"), None);
    }

    #[test]
    fn test_param_is_case_sensitive() {
        let query = pairs(&[("stationcode", "16107")]);
        assert_eq!(param(&query, "stationCode"), None);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(Some("2024-01-15")), Some("2024-01-15"));
        assert_eq!(non_empty(None), None);
    }
}
