// MongoDB repository implementation
use crate::application::error::StoreError;
use crate::application::velib_repository::{StoreResult, VelibRepository};
use crate::domain::batch::{DailyStats, EmptyFullTracking, Incident, StationAggregate};
use crate::domain::station::Station;
use crate::domain::stats::StationTotals;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::error::ErrorKind;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const STATIONS: &str = "stations";
pub const INCIDENTS: &str = "station_incidents";
pub const EMPTY_FULL: &str = "stations_empty_full_tracking";
pub const DAILY_STATS: &str = "daily_stats";
pub const AGGREGATED: &str = "stations_aggregated";

#[derive(Debug, Clone)]
pub struct MongoRepository {
    client: Client,
    database: Database,
}

impl MongoRepository {
    /// Builds the pooled client and pings the server once.
    ///
    /// Fails when the server cannot be selected within `timeout`, so the
    /// process never starts serving against a store it has not reached.
    pub async fn connect(
        uri: &str,
        database: &str,
        max_pool_size: u32,
        timeout: Duration,
    ) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(uri).await.map_err(store_error)?;
        options.app_name = Some("velib-api".to_string());
        options.max_pool_size = Some(max_pool_size);
        options.server_selection_timeout = Some(timeout);
        options.connect_timeout = Some(timeout);

        let client = Client::with_options(options).map_err(store_error)?;
        let database = client.database(database);

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(store_error)?;

        tracing::info!(database = %database.name(), "Connected to MongoDB");
        Ok(Self { client, database })
    }

    /// Creates the indexes the read paths rely on. Failures are logged, not fatal.
    pub async fn ensure_indexes(&self) {
        let indexes = [
            (STATIONS, doc! { "stationCode": 1 }, true),
            (STATIONS, doc! { "timestamp": -1 }, false),
            (STATIONS, doc! { "name": 1 }, false),
            (STATIONS, doc! { "coordinates": "2dsphere" }, false),
            (AGGREGATED, doc! { "stationCode": 1, "date": -1 }, false),
            (DAILY_STATS, doc! { "date": -1 }, false),
        ];

        for (collection, keys, unique) in indexes {
            let model = IndexModel::builder()
                .keys(keys.clone())
                .options(IndexOptions::builder().unique(unique).build())
                .build();

            match self
                .database
                .collection::<Document>(collection)
                .create_index(model)
                .await
            {
                Ok(_) => tracing::debug!(collection, %keys, "Index ready"),
                Err(e) => tracing::warn!(collection, %keys, "Could not create index: {}", e),
            }
        }
    }

    pub async fn shutdown(self) {
        self.client.shutdown().await;
        tracing::info!("MongoDB connection closed");
    }

    fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.database.collection::<T>(name)
    }
}

/// Connectivity problems become `Unavailable`; everything else is a query failure.
fn store_error(err: mongodb::error::Error) -> StoreError {
    match *err.kind {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::ConnectionPoolCleared { .. } => StoreError::Unavailable(err.to_string()),
        _ => StoreError::Query(err.to_string()),
    }
}

fn as_limit(limit: u64) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

async fn collect<T>(cursor: mongodb::Cursor<T>) -> StoreResult<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    cursor.try_collect().await.map_err(store_error)
}

pub(crate) fn installed_filter() -> Document {
    doc! { "isInstalled": true }
}

pub(crate) fn critical_filter(threshold: u64) -> Document {
    let threshold = as_limit(threshold);
    doc! {
        "isInstalled": true,
        "$or": [
            { "numBikesAvailable": { "$lte": threshold } },
            { "numDocksAvailable": { "$lte": threshold } },
        ],
    }
}

/// Exact match on `field` when a value is given, otherwise match everything.
pub(crate) fn optional_match(field: &str, value: Option<&str>) -> Document {
    match value {
        Some(value) => doc! { field: value },
        None => Document::new(),
    }
}

pub(crate) fn totals_pipeline() -> Vec<Document> {
    vec![
        doc! { "$match": installed_filter() },
        doc! {
            "$group": {
                "_id": Bson::Null,
                "totalStations": { "$sum": 1 },
                "totalBikes": { "$sum": "$numBikesAvailable" },
                "totalDocks": { "$sum": "$numDocksAvailable" },
                "totalCapacity": { "$sum": "$capacity" },
                "avgBikesPerStation": { "$avg": "$numBikesAvailable" },
                "avgDocksPerStation": { "$avg": "$numDocksAvailable" },
            }
        },
    ]
}

/// Reads a numeric field whatever width the server chose for it.
fn number(group: &Document, key: &str) -> f64 {
    match group.get(key) {
        Some(Bson::Int32(v)) => f64::from(*v),
        Some(Bson::Int64(v)) => *v as f64,
        Some(Bson::Double(v)) => *v,
        _ => 0.0,
    }
}

fn count(group: &Document, key: &str) -> u64 {
    match group.get(key) {
        Some(Bson::Int32(v)) => u64::try_from(*v).unwrap_or(0),
        Some(Bson::Int64(v)) => u64::try_from(*v).unwrap_or(0),
        Some(Bson::Double(v)) if *v > 0.0 => *v as u64,
        _ => 0,
    }
}

pub(crate) fn totals_from_group(group: &Document) -> StationTotals {
    StationTotals {
        station_count: count(group, "totalStations"),
        bikes: count(group, "totalBikes"),
        docks: count(group, "totalDocks"),
        capacity: count(group, "totalCapacity"),
        avg_bikes: number(group, "avgBikesPerStation"),
        avg_docks: number(group, "avgDocksPerStation"),
    }
}

/// One `find` round-trip: filter, sort and optional paging.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FindSpec {
    pub filter: Document,
    pub sort: Document,
    pub skip: Option<u64>,
    pub limit: Option<i64>,
}

impl FindSpec {
    fn new(filter: Document, sort: Document) -> Self {
        Self {
            filter,
            sort,
            skip: None,
            limit: None,
        }
    }

    fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(as_limit(limit));
        self
    }
}

/// Name order with the unique code as tiebreak, so pages never overlap.
pub(crate) fn list_spec(skip: u64, limit: u64) -> FindSpec {
    FindSpec::new(doc! {}, doc! { "name": 1, "stationCode": 1 })
        .skip(skip)
        .limit(limit)
}

pub(crate) fn top_spec(limit: u64) -> FindSpec {
    FindSpec::new(installed_filter(), doc! { "numBikesAvailable": -1 }).limit(limit)
}

/// A cap of zero reads as "no cap", matching the server's own `limit(0)`.
pub(crate) fn critical_spec(threshold: u64, max_results: Option<u64>) -> FindSpec {
    let spec = FindSpec::new(critical_filter(threshold), doc! { "numBikesAvailable": 1 });
    match max_results.filter(|max| *max > 0) {
        Some(max) => spec.limit(max),
        None => spec,
    }
}

pub(crate) fn incidents_spec(limit: u64) -> FindSpec {
    FindSpec::new(doc! {}, doc! { "date": -1, "incidentCount": -1 }).limit(limit)
}

pub(crate) fn empty_full_spec(limit: u64) -> FindSpec {
    FindSpec::new(doc! {}, doc! { "emptyPercentage": -1 }).limit(limit)
}

/// ObjectIds grow with insertion time, so `_id` descending is newest first.
pub(crate) fn daily_stats_spec(date: Option<&str>, limit: u64) -> FindSpec {
    FindSpec::new(optional_match("date", date), doc! { "_id": -1 }).limit(limit)
}

pub(crate) fn aggregated_spec(station_code: Option<&str>, limit: u64) -> FindSpec {
    FindSpec::new(
        optional_match("stationCode", station_code),
        doc! { "date": -1 },
    )
    .limit(limit)
}

impl MongoRepository {
    async fn find_all<T>(&self, name: &str, spec: FindSpec) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        let collection = self.collection::<T>(name);
        let mut find = collection.find(spec.filter).sort(spec.sort);
        if let Some(skip) = spec.skip {
            find = find.skip(skip);
        }
        if let Some(limit) = spec.limit {
            find = find.limit(limit);
        }
        let cursor = find.await.map_err(store_error)?;
        collect(cursor).await
    }
}

#[async_trait]
impl VelibRepository for MongoRepository {
    async fn list_stations(&self, skip: u64, limit: u64) -> StoreResult<Vec<Station>> {
        self.find_all(STATIONS, list_spec(skip, limit)).await
    }

    async fn count_stations(&self) -> StoreResult<u64> {
        self.collection::<Station>(STATIONS)
            .count_documents(doc! {})
            .await
            .map_err(store_error)
    }

    async fn top_stations(&self, limit: u64) -> StoreResult<Vec<Station>> {
        self.find_all(STATIONS, top_spec(limit)).await
    }

    async fn critical_stations(
        &self,
        threshold: u64,
        max_results: Option<u64>,
    ) -> StoreResult<Vec<Station>> {
        self.find_all(STATIONS, critical_spec(threshold, max_results))
            .await
    }

    async fn find_station(&self, station_code: &str) -> StoreResult<Option<Station>> {
        self.collection::<Station>(STATIONS)
            .find_one(doc! { "stationCode": station_code })
            .await
            .map_err(store_error)
    }

    async fn installed_totals(&self) -> StoreResult<Option<StationTotals>> {
        let cursor = self
            .collection::<Document>(STATIONS)
            .aggregate(totals_pipeline())
            .await
            .map_err(store_error)?;
        let groups = collect(cursor).await?;

        Ok(groups.first().map(totals_from_group))
    }

    async fn incidents(&self, limit: u64) -> StoreResult<Vec<Incident>> {
        self.find_all(INCIDENTS, incidents_spec(limit)).await
    }

    async fn empty_full_tracking(&self, limit: u64) -> StoreResult<Vec<EmptyFullTracking>> {
        self.find_all(EMPTY_FULL, empty_full_spec(limit)).await
    }

    async fn daily_stats(&self, date: Option<&str>, limit: u64) -> StoreResult<Vec<DailyStats>> {
        self.find_all(DAILY_STATS, daily_stats_spec(date, limit))
            .await
    }

    async fn aggregated(
        &self,
        station_code: Option<&str>,
        limit: u64,
    ) -> StoreResult<Vec<StationAggregate>> {
        self.find_all(AGGREGATED, aggregated_spec(station_code, limit))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_spec_pages_by_name_then_code() {
        let spec = list_spec(100, 50);
        assert!(spec.filter.is_empty());
        assert_eq!(spec.sort, doc! { "name": 1, "stationCode": 1 });
        let keys: Vec<&String> = spec.sort.keys().collect();
        assert_eq!(keys, vec!["name", "stationCode"]);
        assert_eq!(spec.skip, Some(100));
        assert_eq!(spec.limit, Some(50));
    }

    #[test]
    fn test_top_spec() {
        let spec = top_spec(10);
        assert_eq!(spec.filter, installed_filter());
        assert_eq!(spec.sort, doc! { "numBikesAvailable": -1 });
        assert_eq!(spec.skip, None);
        assert_eq!(spec.limit, Some(10));
    }

    #[test]
    fn test_critical_spec_cap() {
        let unbounded = critical_spec(3, None);
        assert_eq!(unbounded.filter, critical_filter(3));
        assert_eq!(unbounded.sort, doc! { "numBikesAvailable": 1 });
        assert_eq!(unbounded.limit, None);

        assert_eq!(critical_spec(3, Some(25)).limit, Some(25));
        assert_eq!(critical_spec(3, Some(0)).limit, None);
    }

    #[test]
    fn test_batch_specs() {
        let incidents = incidents_spec(100);
        assert_eq!(incidents.sort, doc! { "date": -1, "incidentCount": -1 });
        assert_eq!(incidents.limit, Some(100));

        let empty_full = empty_full_spec(100);
        assert_eq!(empty_full.sort, doc! { "emptyPercentage": -1 });
        assert_eq!(empty_full.limit, Some(100));

        let daily = daily_stats_spec(Some("2024-01-15"), 30);
        assert_eq!(daily.filter, doc! { "date": "2024-01-15" });
        assert_eq!(daily.sort, doc! { "_id": -1 });
        assert_eq!(daily.limit, Some(30));
        assert!(daily_stats_spec(None, 30).filter.is_empty());

        let aggregated = aggregated_spec(Some("16107"), 7);
        assert_eq!(aggregated.filter, doc! { "stationCode": "16107" });
        assert_eq!(aggregated.sort, doc! { "date": -1 });
        assert_eq!(aggregated.limit, Some(7));
    }

    #[test]
    fn test_limit_saturates() {
        assert_eq!(top_spec(u64::MAX).limit, Some(i64::MAX));
    }

    #[test]
    fn test_critical_filter_shape() {
        let filter = critical_filter(3);
        assert_eq!(filter.get_bool("isInstalled").unwrap(), true);

        let branches = filter.get_array("$or").unwrap();
        assert_eq!(branches.len(), 2);
        assert_eq!(
            branches[0],
            Bson::Document(doc! { "numBikesAvailable": { "$lte": 3_i64 } })
        );
        assert_eq!(
            branches[1],
            Bson::Document(doc! { "numDocksAvailable": { "$lte": 3_i64 } })
        );
    }

    #[test]
    fn test_optional_match() {
        assert!(optional_match("date", None).is_empty());
        assert_eq!(
            optional_match("stationCode", Some("16107")),
            doc! { "stationCode": "16107" }
        );
    }

    #[test]
    fn test_totals_pipeline_matches_installed_only() {
        let pipeline = totals_pipeline();
        assert_eq!(pipeline.len(), 2);
        assert_eq!(
            pipeline[0].get_document("$match").unwrap(),
            &doc! { "isInstalled": true }
        );
        let group = pipeline[1].get_document("$group").unwrap();
        assert_eq!(group.get("_id"), Some(&Bson::Null));
        assert!(group.contains_key("totalCapacity"));
    }

    #[test]
    fn test_totals_from_mixed_width_group() {
        let group = doc! {
            "_id": Bson::Null,
            "totalStations": 2_i32,
            "totalBikes": 14_i64,
            "totalDocks": 6_i32,
            "totalCapacity": 20.0,
            "avgBikesPerStation": 7.0,
            "avgDocksPerStation": 3_i32,
        };

        let totals = totals_from_group(&group);
        assert_eq!(totals.station_count, 2);
        assert_eq!(totals.bikes, 14);
        assert_eq!(totals.docks, 6);
        assert_eq!(totals.capacity, 20);
        assert_eq!(totals.avg_bikes, 7.0);
        assert_eq!(totals.avg_docks, 3.0);
    }

    #[test]
    fn test_store_error_classification() {
        let io = mongodb::error::Error::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert!(matches!(store_error(io), StoreError::Unavailable(_)));
    }
}
