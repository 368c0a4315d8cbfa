// Application state for HTTP handlers
use crate::application::batch_service::BatchService;
use crate::application::station_service::StationService;

#[derive(Clone)]
pub struct AppState {
    pub station_service: StationService,
    pub batch_service: BatchService,
    /// Attach internal error detail to 5xx bodies (development only).
    pub expose_errors: bool,
}
