// Station domain model - latest known state of one docking site
use serde::{Deserialize, Serialize};

/// `[longitude, latitude]`, the order GeoJSON and the `2dsphere` index expect.
pub type Coordinates = [f64; 2];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub station_code: String,
    pub name: String,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub num_bikes_available: u32,
    #[serde(default)]
    pub num_docks_available: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_mechanical_bikes: Option<u32>,
    #[serde(
        default,
        alias = "numElectricalBikes",
        skip_serializing_if = "Option::is_none"
    )]
    pub num_electric_bikes: Option<u32>,
    #[serde(default)]
    pub is_installed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    pub timestamp: String,

    // Written by the ingestion job when the upstream feed provides them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_returning: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_renting: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
}

impl Station {
    pub fn new(station_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            station_code: station_code.into(),
            name: name.into(),
            capacity: 0,
            num_bikes_available: 0,
            num_docks_available: 0,
            num_mechanical_bikes: None,
            num_electric_bikes: None,
            is_installed: true,
            coordinates: None,
            timestamp: String::new(),
            contract_name: None,
            address: None,
            status: None,
            is_returning: None,
            is_renting: None,
            last_update: None,
        }
    }

    /// Builder-style helper for the counters the query layer filters on.
    pub fn with_counts(mut self, bikes: u32, docks: u32, capacity: u32) -> Self {
        self.num_bikes_available = bikes;
        self.num_docks_available = docks;
        self.capacity = capacity;
        self
    }

    pub fn installed(mut self, is_installed: bool) -> Self {
        self.is_installed = is_installed;
        self
    }

    /// Near-empty or near-full, inclusive of the threshold.
    pub fn is_critical(&self, threshold: u32) -> bool {
        self.is_installed
            && (self.num_bikes_available <= threshold || self.num_docks_available <= threshold)
    }

    /// Soft invariant: bikes + docks never exceed the dock count.
    pub fn counts_consistent(&self) -> bool {
        let counted = u64::from(self.num_bikes_available) + u64::from(self.num_docks_available);
        let bikes_split = match (self.num_mechanical_bikes, self.num_electric_bikes) {
            (Some(mechanical), Some(electric)) => {
                u64::from(mechanical) + u64::from(electric)
                    == u64::from(self.num_bikes_available)
            }
            _ => true,
        };
        counted <= u64::from(self.capacity) && bikes_split
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_is_inclusive_and_requires_installation() {
        let station = Station::new("16107", "Benjamin Godard").with_counts(3, 12, 15);
        assert!(station.is_critical(3));
        assert!(!station.is_critical(2));

        let offline = station.clone().installed(false);
        assert!(!offline.is_critical(3));

        let full = Station::new("16108", "Victor Hugo").with_counts(20, 0, 20);
        assert!(full.is_critical(0));
    }

    #[test]
    fn test_deserialize_ingestion_document() {
        let json = serde_json::json!({
            "_id": "ignored",
            "stationCode": "16107",
            "name": "16107 - BENJAMIN GODARD - VICTOR HUGO",
            "capacity": 35,
            "numBikesAvailable": 10,
            "numDocksAvailable": 25,
            "numMechanicalBikes": 4,
            "numElectricalBikes": 6,
            "isInstalled": true,
            "coordinates": [2.275725, 48.865983],
            "timestamp": "2024-01-15T14:29:45.000Z",
            "contractName": "Paris",
            "status": "OPEN"
        });

        let station: Station = serde_json::from_value(json).unwrap();
        assert_eq!(station.num_electric_bikes, Some(6));
        assert_eq!(station.coordinates, Some([2.275725, 48.865983]));
        assert_eq!(station.contract_name.as_deref(), Some("Paris"));
        assert!(station.counts_consistent());

        let out = serde_json::to_value(&station).unwrap();
        assert_eq!(out["numElectricBikes"], 6);
        assert!(out.get("_id").is_none());
        assert!(out.get("address").is_none());
    }

    #[test]
    fn test_counts_consistent_flags_overfull_station() {
        let station = Station::new("1", "Overfull").with_counts(10, 10, 15);
        assert!(!station.counts_consistent());
    }
}
