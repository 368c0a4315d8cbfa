// Global statistics over installed stations
use serde::Serialize;

/// Raw sums and means as returned by the store's grouping stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationTotals {
    pub station_count: u64,
    pub bikes: u64,
    pub docks: u64,
    pub capacity: u64,
    pub avg_bikes: f64,
    pub avg_docks: f64,
}

impl StationTotals {
    /// Fold a set of stations the same way the store's `$group` stage does.
    pub fn from_counts<I>(counts: I) -> Option<Self>
    where
        I: IntoIterator<Item = (u32, u32, u32)>,
    {
        let mut totals = Self::default();
        for (bikes, docks, capacity) in counts {
            totals.station_count += 1;
            totals.bikes += u64::from(bikes);
            totals.docks += u64::from(docks);
            totals.capacity += u64::from(capacity);
        }

        if totals.station_count == 0 {
            return None;
        }

        totals.avg_bikes = totals.bikes as f64 / totals.station_count as f64;
        totals.avg_docks = totals.docks as f64 / totals.station_count as f64;
        Some(totals)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total_stations: u64,
    pub total_bikes: u64,
    pub total_docks: u64,
    pub avg_occupancy: f64,
    pub avg_bikes_per_station: f64,
    pub avg_docks_per_station: f64,
}

impl GlobalStats {
    /// `None` means no installed station matched; the result is then zero-filled.
    pub fn from_totals(totals: Option<StationTotals>) -> Self {
        let Some(totals) = totals else {
            return Self::default();
        };

        let occupancy = if totals.capacity > 0 {
            totals.bikes as f64 / totals.capacity as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total_stations: totals.station_count,
            total_bikes: totals.bikes,
            total_docks: totals.docks,
            avg_occupancy: round_one_decimal(occupancy),
            avg_bikes_per_station: round_one_decimal(totals.avg_bikes),
            avg_docks_per_station: round_one_decimal(totals.avg_docks),
        }
    }
}

/// Half-up rounding to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_is_zero_filled() {
        let stats = GlobalStats::from_totals(None);
        assert_eq!(stats.total_stations, 0);
        assert_eq!(stats.total_bikes, 0);
        assert_eq!(stats.total_docks, 0);
        assert_eq!(stats.avg_occupancy, 0.0);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["avgOccupancy"], 0.0);
        assert_eq!(json["totalStations"], 0);
    }

    #[test]
    fn test_occupancy_rounding() {
        let totals = StationTotals::from_counts([(5, 10, 15)]);
        let stats = GlobalStats::from_totals(totals);
        assert_eq!(stats.total_stations, 1);
        assert_eq!(stats.avg_occupancy, 33.3);
        assert_eq!(stats.avg_bikes_per_station, 5.0);
    }

    #[test]
    fn test_zero_capacity_does_not_divide() {
        let totals = StationTotals::from_counts([(0, 0, 0), (0, 0, 0)]);
        let stats = GlobalStats::from_totals(totals);
        assert_eq!(stats.total_stations, 2);
        assert_eq!(stats.avg_occupancy, 0.0);
    }

    #[test]
    fn test_averages() {
        let totals = StationTotals::from_counts([(2, 8, 10), (3, 7, 10), (4, 2, 10)]).unwrap();
        assert_eq!(totals.bikes, 9);
        assert_eq!(totals.capacity, 30);

        let stats = GlobalStats::from_totals(Some(totals));
        assert_eq!(stats.avg_bikes_per_station, 3.0);
        assert_eq!(stats.avg_docks_per_station, 5.7);
        assert_eq!(stats.avg_occupancy, 30.0);
    }
}
