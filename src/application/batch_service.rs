// Batch service - pass-through views over the batch job's collections
use crate::application::error::{QueryError, bounded};
use crate::application::velib_repository::VelibRepository;
use crate::domain::batch::{DailyStats, EmptyFullTracking, Incident, StationAggregate};
use std::sync::Arc;
use std::time::Duration;

pub const INCIDENTS_LIMIT: u64 = 100;
pub const EMPTY_FULL_LIMIT: u64 = 100;
pub const DAILY_STATS_LIMIT: u64 = 30;

#[derive(Clone)]
pub struct BatchService {
    repository: Arc<dyn VelibRepository>,
    store_timeout: Duration,
}

impl BatchService {
    pub fn new(repository: Arc<dyn VelibRepository>, store_timeout: Duration) -> Self {
        Self {
            repository,
            store_timeout,
        }
    }

    pub async fn incidents(&self) -> Result<Vec<Incident>, QueryError> {
        bounded(self.store_timeout, self.repository.incidents(INCIDENTS_LIMIT)).await
    }

    pub async fn empty_full_tracking(&self) -> Result<Vec<EmptyFullTracking>, QueryError> {
        bounded(
            self.store_timeout,
            self.repository.empty_full_tracking(EMPTY_FULL_LIMIT),
        )
        .await
    }

    pub async fn daily_stats(&self, date: Option<&str>) -> Result<Vec<DailyStats>, QueryError> {
        bounded(
            self.store_timeout,
            self.repository.daily_stats(date, DAILY_STATS_LIMIT),
        )
        .await
    }

    pub async fn aggregated(
        &self,
        station_code: Option<&str>,
        limit: u64,
    ) -> Result<Vec<StationAggregate>, QueryError> {
        bounded(
            self.store_timeout,
            self.repository.aggregated(station_code, limit),
        )
        .await
    }
}
