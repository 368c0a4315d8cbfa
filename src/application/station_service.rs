// Station service - listing, ranking, lookup and global statistics
use crate::application::error::{QueryError, bounded};
use crate::application::velib_repository::VelibRepository;
use crate::domain::pagination::{PageRequest, Pagination};
use crate::domain::station::Station;
use crate::domain::stats::GlobalStats;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct StationService {
    repository: Arc<dyn VelibRepository>,
    store_timeout: Duration,
    critical_max_results: Option<u64>,
}

impl StationService {
    pub fn new(repository: Arc<dyn VelibRepository>, store_timeout: Duration) -> Self {
        Self {
            repository,
            store_timeout,
            critical_max_results: None,
        }
    }

    /// Caps the critical-station list. Unbounded unless set; zero means unbounded.
    pub fn with_critical_max_results(mut self, max_results: Option<u64>) -> Self {
        self.critical_max_results = max_results.filter(|max| *max > 0);
        self
    }

    pub async fn list_stations(
        &self,
        request: PageRequest,
    ) -> Result<(Vec<Station>, Pagination), QueryError> {
        let stations = bounded(
            self.store_timeout,
            self.repository.list_stations(request.skip(), request.limit),
        )
        .await?;
        let total = bounded(self.store_timeout, self.repository.count_stations()).await?;

        Ok((stations, Pagination::new(request, total)))
    }

    pub async fn top_stations(&self, limit: u64) -> Result<Vec<Station>, QueryError> {
        bounded(self.store_timeout, self.repository.top_stations(limit)).await
    }

    pub async fn critical_stations(&self, threshold: u64) -> Result<Vec<Station>, QueryError> {
        bounded(
            self.store_timeout,
            self.repository
                .critical_stations(threshold, self.critical_max_results),
        )
        .await
    }

    pub async fn get_station(&self, station_code: &str) -> Result<Station, QueryError> {
        let station = bounded(self.store_timeout, self.repository.find_station(station_code))
            .await?
            .ok_or_else(|| QueryError::NotFound(format!("station {station_code}")))?;

        if !station.counts_consistent() {
            tracing::debug!(
                station_code = %station.station_code,
                bikes = station.num_bikes_available,
                docks = station.num_docks_available,
                capacity = station.capacity,
                "Station counters exceed capacity"
            );
        }

        Ok(station)
    }

    pub async fn global_stats(&self) -> Result<GlobalStats, QueryError> {
        let totals = bounded(self.store_timeout, self.repository.installed_totals()).await?;
        Ok(GlobalStats::from_totals(totals))
    }
}
