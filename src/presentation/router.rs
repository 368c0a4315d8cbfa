// Router assembly
use crate::infrastructure::http_response::route_not_found;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    batch_aggregated, batch_daily_stats, batch_empty_full, batch_incidents, critical_stations,
    get_station, global_stats, health_check, list_stations, top_stations,
};
use axum::{
    Router,
    handler::Handler,
    response::Response,
    routing::{MethodRouter, get},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

async fn unmatched() -> Response {
    route_not_found()
}

/// GET-only route; any other method gets the same 404 body as an unknown path.
fn read<H, T>(handler: H) -> MethodRouter<Arc<AppState>>
where
    H: Handler<T, Arc<AppState>>,
    T: 'static,
{
    get(handler).fallback(unmatched)
}

/// Builds the full HTTP surface. The static `/stations/top` and
/// `/stations/critical` segments win over the `/stations/:id` capture.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/stations", read(list_stations))
        .route("/stations/top", read(top_stations))
        .route("/stations/critical", read(critical_stations))
        .route("/stations/:id", read(get_station))
        .route("/stats", read(global_stats))
        .route("/batch/incidents", read(batch_incidents))
        .route("/batch/empty-full", read(batch_empty_full))
        .route("/batch/daily-stats", read(batch_daily_stats))
        .route("/batch/aggregated", read(batch_aggregated));

    Router::new()
        .route("/health", read(health_check))
        .nest("/api", api)
        .fallback(unmatched)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
