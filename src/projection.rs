//! Campus coordinates to latitude/longitude
//!
//! The campus data uses a planar system with (0, 0) at the top-left of the
//! campus map. A fixed affine transform per axis maps it onto WGS84.

use serde::{Deserialize, Serialize};

/// Geographic position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// Affine mapping constants for one campus
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Projection {
    /// Longitude at `lon_offset`
    pub ref_lon: f64,
    /// Latitude at `lat_offset`
    pub ref_lat: f64,
    pub lon_offset: f64,
    pub lat_offset: f64,
    /// Degrees of longitude per campus unit
    pub lon_scale: f64,
    /// Degrees of latitude per campus unit (negative: y grows southwards)
    pub lat_scale: f64,
}

impl Default for Projection {
    /// UW Seattle campus
    fn default() -> Self {
        Self {
            ref_lon: -122.30800790573106,
            ref_lat: 47.65878405511131,
            lon_offset: 1370.6408,
            lat_offset: 807.35188,
            lon_scale: 0.00004062444728,
            lat_scale: -0.00002749250654,
        }
    }
}

impl Projection {
    pub fn x_to_lon(&self, x: f64) -> f64 {
        self.ref_lon + (x - self.lon_offset) * self.lon_scale
    }

    pub fn y_to_lat(&self, y: f64) -> f64 {
        self.ref_lat + (y - self.lat_offset) * self.lat_scale
    }

    pub fn project(&self, x: f64, y: f64) -> LatLon {
        LatLon {
            lat: self.y_to_lat(y),
            lon: self.x_to_lon(x),
        }
    }
}
