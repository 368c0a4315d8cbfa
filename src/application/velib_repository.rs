// Repository trait for station and batch-aggregate data access
use crate::application::error::StoreError;
use crate::domain::batch::{DailyStats, EmptyFullTracking, Incident, StationAggregate};
use crate::domain::station::Station;
use crate::domain::stats::StationTotals;
use async_trait::async_trait;

pub type StoreResult<T> = Result<T, StoreError>;

/// Read-only access to the station store and the batch collections.
///
/// Every method is a single round-trip; implementations hold no per-request
/// state. Batch collections that do not exist yet read as empty.
#[async_trait]
pub trait VelibRepository: Send + Sync {
    /// Stations ordered by name ascending, `skip` then take `limit`.
    async fn list_stations(&self, skip: u64, limit: u64) -> StoreResult<Vec<Station>>;

    /// Number of stations in the store, installed or not.
    async fn count_stations(&self) -> StoreResult<u64>;

    /// Installed stations ordered by available bikes descending.
    async fn top_stations(&self, limit: u64) -> StoreResult<Vec<Station>>;

    /// Installed stations with bikes or docks at or below `threshold`,
    /// ordered by available bikes ascending. `max_results` of `None` is unbounded.
    async fn critical_stations(
        &self,
        threshold: u64,
        max_results: Option<u64>,
    ) -> StoreResult<Vec<Station>>;

    /// Exact, case-sensitive match on the station code.
    async fn find_station(&self, station_code: &str) -> StoreResult<Option<Station>>;

    /// Sums and means over installed stations; `None` when there are none.
    async fn installed_totals(&self) -> StoreResult<Option<StationTotals>>;

    /// Ordered by date then incident count, both descending.
    async fn incidents(&self, limit: u64) -> StoreResult<Vec<Incident>>;

    /// Ordered by empty percentage descending.
    async fn empty_full_tracking(&self, limit: u64) -> StoreResult<Vec<EmptyFullTracking>>;

    /// Newest insertion first, optionally restricted to one date.
    async fn daily_stats(&self, date: Option<&str>, limit: u64) -> StoreResult<Vec<DailyStats>>;

    /// Ordered by date descending, optionally restricted to one station.
    async fn aggregated(
        &self,
        station_code: Option<&str>,
        limit: u64,
    ) -> StoreResult<Vec<StationAggregate>>;
}
