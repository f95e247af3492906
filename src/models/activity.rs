use serde::{Deserialize, Serialize};

/// Wire shape for activity timestamps: `{ "epochSecond": n }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTime {
    pub epoch_second: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BikeActivity {
    /// Overwritten with the remote document id at ingestion time; the
    /// remote identifier is authoritative over any embedded value.
    #[serde(default)]
    pub uid: String,
    pub start_time: ActivityTime,
    pub end_time: ActivityTime,
}

/// Geographic extent of one recorded activity, four floats on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityBounds {
    pub lon_west: f64,
    pub lon_east: f64,
    pub lat_north: f64,
    pub lat_south: f64,
}

/// Decoded activity record plus its spatial bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityMetadataEnvelope {
    pub bike_activity: BikeActivity,
    pub bike_activity_bounds: ActivityBounds,
}
