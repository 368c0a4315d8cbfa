// Batch aggregate records - produced by the periodic batch job, read-only here
use crate::domain::station::Coordinates;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Fields the batch job wrote that this crate has no name for.
///
/// Carried through untouched so the views stay faithful to the producer;
/// only the store's `_id` is withheld.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ExtraFields(pub BTreeMap<String, Value>);

impl Serialize for ExtraFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.0.iter().filter(|(key, _)| key.as_str() != "_id") {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Accepts whatever the producer stored: strings pass through, anything
/// else is rendered as JSON text, null and missing become empty.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentType {
    Offline,
    CapacityAnomaly,
    BrutalChange,
    /// A kind the batch job added after this build.
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    #[serde(default, deserialize_with = "lenient_string")]
    pub station_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    pub incident_type: IncidentType,
    #[serde(default)]
    pub incident_count: u32,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OccupancyStatus {
    Empty,
    Full,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptyFullTracking {
    #[serde(default, deserialize_with = "lenient_string")]
    pub station_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OccupancyStatus>,
    #[serde(default)]
    pub empty_percentage: f64,
    #[serde(default)]
    pub full_percentage: f64,
    #[serde(default)]
    pub total_observations: u64,
    #[serde(default)]
    pub avg_occupancy_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Network-wide totals for one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub total_stations: u64,
    #[serde(default)]
    pub total_bikes: u64,
    #[serde(default)]
    pub total_docks: u64,
    #[serde(default)]
    pub avg_bikes_per_station: f64,
    #[serde(default)]
    pub avg_docks_per_station: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// One station's averages over one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationAggregate {
    #[serde(default, deserialize_with = "lenient_string")]
    pub station_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default)]
    pub avg_bikes_available: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_bikes_available: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bikes_available: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_docks_available: Option<f64>,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub record_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}
