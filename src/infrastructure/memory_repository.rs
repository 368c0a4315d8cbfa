// In-memory repository - same ordering semantics as the Mongo queries
use crate::application::velib_repository::{StoreResult, VelibRepository};
use crate::domain::batch::{DailyStats, EmptyFullTracking, Incident, StationAggregate};
use crate::domain::station::Station;
use crate::domain::stats::StationTotals;
use async_trait::async_trait;
use std::cmp::Ordering;
use tokio::sync::RwLock;

/// Collections kept in insertion order, which stands in for the store's
/// natural order. All sorts are stable so ties keep that order.
#[derive(Default)]
pub struct InMemoryRepository {
    stations: RwLock<Vec<Station>>,
    incidents: RwLock<Vec<Incident>>,
    empty_full: RwLock<Vec<EmptyFullTracking>>,
    daily_stats: RwLock<Vec<DailyStats>>,
    aggregated: RwLock<Vec<StationAggregate>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the record with the same station code, keeping its position.
    pub async fn upsert_station(&self, station: Station) {
        let mut stations = self.stations.write().await;
        match stations
            .iter()
            .position(|s| s.station_code == station.station_code)
        {
            Some(index) => stations[index] = station,
            None => stations.push(station),
        }
    }

    pub async fn push_incident(&self, incident: Incident) {
        self.incidents.write().await.push(incident);
    }

    pub async fn push_empty_full(&self, tracking: EmptyFullTracking) {
        self.empty_full.write().await.push(tracking);
    }

    pub async fn push_daily_stats(&self, stats: DailyStats) {
        self.daily_stats.write().await.push(stats);
    }

    pub async fn push_aggregate(&self, aggregate: StationAggregate) {
        self.aggregated.write().await.push(aggregate);
    }
}

fn as_len(limit: u64) -> usize {
    usize::try_from(limit).unwrap_or(usize::MAX)
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

#[async_trait]
impl VelibRepository for InMemoryRepository {
    async fn list_stations(&self, skip: u64, limit: u64) -> StoreResult<Vec<Station>> {
        let mut stations = self.stations.read().await.clone();
        stations.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.station_code.cmp(&b.station_code))
        });
        Ok(stations.into_iter().skip(as_len(skip)).take(as_len(limit)).collect())
    }

    async fn count_stations(&self) -> StoreResult<u64> {
        Ok(self.stations.read().await.len() as u64)
    }

    async fn top_stations(&self, limit: u64) -> StoreResult<Vec<Station>> {
        let mut stations: Vec<Station> = self
            .stations
            .read()
            .await
            .iter()
            .filter(|s| s.is_installed)
            .cloned()
            .collect();
        stations.sort_by(|a, b| b.num_bikes_available.cmp(&a.num_bikes_available));
        stations.truncate(as_len(limit));
        Ok(stations)
    }

    async fn critical_stations(
        &self,
        threshold: u64,
        max_results: Option<u64>,
    ) -> StoreResult<Vec<Station>> {
        let threshold = u32::try_from(threshold).unwrap_or(u32::MAX);
        let mut stations: Vec<Station> = self
            .stations
            .read()
            .await
            .iter()
            .filter(|s| s.is_critical(threshold))
            .cloned()
            .collect();
        stations.sort_by_key(|s| s.num_bikes_available);
        if let Some(max_results) = max_results.filter(|max| *max > 0) {
            stations.truncate(as_len(max_results));
        }
        Ok(stations)
    }

    async fn find_station(&self, station_code: &str) -> StoreResult<Option<Station>> {
        Ok(self
            .stations
            .read()
            .await
            .iter()
            .find(|s| s.station_code == station_code)
            .cloned())
    }

    async fn installed_totals(&self) -> StoreResult<Option<StationTotals>> {
        let stations = self.stations.read().await;
        Ok(StationTotals::from_counts(
            stations
                .iter()
                .filter(|s| s.is_installed)
                .map(|s| (s.num_bikes_available, s.num_docks_available, s.capacity)),
        ))
    }

    async fn incidents(&self, limit: u64) -> StoreResult<Vec<Incident>> {
        let mut incidents = self.incidents.read().await.clone();
        incidents.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.incident_count.cmp(&a.incident_count))
        });
        incidents.truncate(as_len(limit));
        Ok(incidents)
    }

    async fn empty_full_tracking(&self, limit: u64) -> StoreResult<Vec<EmptyFullTracking>> {
        let mut rows = self.empty_full.read().await.clone();
        rows.sort_by(|a, b| descending(a.empty_percentage, b.empty_percentage));
        rows.truncate(as_len(limit));
        Ok(rows)
    }

    async fn daily_stats(&self, date: Option<&str>, limit: u64) -> StoreResult<Vec<DailyStats>> {
        Ok(self
            .daily_stats
            .read()
            .await
            .iter()
            .rev()
            .filter(|s| date.is_none_or(|d| s.date.as_deref() == Some(d)))
            .take(as_len(limit))
            .cloned()
            .collect())
    }

    async fn aggregated(
        &self,
        station_code: Option<&str>,
        limit: u64,
    ) -> StoreResult<Vec<StationAggregate>> {
        let mut rows: Vec<StationAggregate> = self
            .aggregated
            .read()
            .await
            .iter()
            .filter(|a| station_code.is_none_or(|code| a.station_code == code))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        rows.truncate(as_len(limit));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_keeps_one_record_per_code() {
        let repository = InMemoryRepository::new();
        repository
            .upsert_station(Station::new("16107", "Old name").with_counts(1, 1, 2))
            .await;
        repository
            .upsert_station(Station::new("16107", "New name").with_counts(2, 0, 2))
            .await;

        assert_eq!(repository.count_stations().await.unwrap(), 1);
        let station = repository.find_station("16107").await.unwrap().unwrap();
        assert_eq!(station.name, "New name");
        assert_eq!(station.num_bikes_available, 2);
    }

    #[tokio::test]
    async fn test_lookup_is_exact_and_case_sensitive() {
        let repository = InMemoryRepository::new();
        repository.upsert_station(Station::new("TEST001", "Test")).await;

        assert!(repository.find_station("TEST001").await.unwrap().is_some());
        assert!(repository.find_station("test001").await.unwrap().is_none());
        assert!(repository.find_station("TEST").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_pages_split_duplicate_names_by_code() {
        let repository = InMemoryRepository::new();
        for code in ["c", "a", "d", "b"] {
            repository.upsert_station(Station::new(code, "Gare")).await;
        }

        let first = repository.list_stations(0, 2).await.unwrap();
        let second = repository.list_stations(2, 2).await.unwrap();
        let codes: Vec<&str> = first
            .iter()
            .chain(second.iter())
            .map(|s| s.station_code.as_str())
            .collect();
        assert_eq!(codes, vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_zero_critical_cap_is_unbounded() {
        let repository = InMemoryRepository::new();
        for code in ["a", "b", "c"] {
            repository
                .upsert_station(Station::new(code, code).with_counts(0, 5, 5))
                .await;
        }

        assert_eq!(repository.critical_stations(3, Some(0)).await.unwrap().len(), 3);
        assert_eq!(repository.critical_stations(3, Some(2)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_top_ties_keep_insertion_order() {
        let repository = InMemoryRepository::new();
        repository
            .upsert_station(Station::new("a", "A").with_counts(4, 0, 4))
            .await;
        repository
            .upsert_station(Station::new("b", "B").with_counts(7, 0, 7))
            .await;
        repository
            .upsert_station(Station::new("c", "C").with_counts(4, 0, 4))
            .await;

        let top = repository.top_stations(10).await.unwrap();
        let codes: Vec<&str> = top.iter().map(|s| s.station_code.as_str()).collect();
        assert_eq!(codes, vec!["b", "a", "c"]);
    }
}
