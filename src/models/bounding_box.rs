use serde::{Deserialize, Serialize};

use super::ActivityBounds;

/// Camera-framing rectangle for a selected activity.
///
/// The camera interface consumes the extents in (west, north, east, south)
/// order; `to_lnglat_array` produces exactly that order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub lon_west: f64,
    pub lat_north: f64,
    pub lon_east: f64,
    pub lat_south: f64,
}

impl BoundingBox {
    pub fn to_lnglat_array(self) -> [f64; 4] {
        [self.lon_west, self.lat_north, self.lon_east, self.lat_south]
    }
}

impl From<ActivityBounds> for BoundingBox {
    fn from(bounds: ActivityBounds) -> Self {
        Self {
            lon_west: bounds.lon_west,
            lat_north: bounds.lat_north,
            lon_east: bounds.lon_east,
            lat_south: bounds.lat_south,
        }
    }
}
