use hifitime::Epoch;
use map_3d::deg2rad;
use nalgebra::Vector3;

use serde::{Deserialize, Serialize};

/// Mean Earth radius, in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// [Fix] is one timestamped position fix, immutable once constructed.
///
/// Two [Fix]es compare equal when their timestamps match, regardless of
/// coordinates: result batches are compared positionally by timestamp and
/// this type carries that contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fix {
    /// Geodetic coordinates: latitude (ddeg), longitude (ddeg),
    /// altitude above sea level (m).
    pub geodetic: Vector3<f64>,
    /// Sampling instant.
    pub timestamp: Epoch,
    /// Estimated horizontal accuracy (m). 0 when unknown.
    pub accuracy_m: f64,
    /// Originating provider label, when known.
    pub provider: Option<String>,
}

impl PartialEq for Fix {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
    }
}

impl std::fmt::Display for Fix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} lat={:.6}° lon={:.6}°",
            self.timestamp, self.geodetic[0], self.geodetic[1]
        )
    }
}

impl Fix {
    /// Builds a new [Fix] from latitude and longitude in decimal degrees,
    /// at sampling instant `t`.
    pub fn new(lat_deg: f64, lon_deg: f64, t: Epoch) -> Self {
        Self {
            geodetic: Vector3::new(lat_deg, lon_deg, 0.0),
            timestamp: t,
            accuracy_m: 0.0,
            provider: None,
        }
    }

    /// Copies and returns [Fix] with altitude above sea level, in meters.
    pub fn with_altitude_m(mut self, alt_m: f64) -> Self {
        self.geodetic[2] = alt_m;
        self
    }

    /// Copies and returns [Fix] with estimated horizontal accuracy, in meters.
    pub fn with_accuracy_m(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = accuracy_m;
        self
    }

    /// Copies and returns [Fix] with originating provider label.
    pub fn with_provider(mut self, provider: &str) -> Self {
        self.provider = Some(provider.to_string());
        self
    }

    /// Latitude in decimal degrees.
    pub fn latitude_deg(&self) -> f64 {
        self.geodetic[0]
    }

    /// Longitude in decimal degrees.
    pub fn longitude_deg(&self) -> f64 {
        self.geodetic[1]
    }

    /// Altitude above sea level, in meters.
    pub fn altitude_m(&self) -> f64 {
        self.geodetic[2]
    }

    /// Great-circle (haversine) displacement to `rhs`, in meters.
    /// Altitude is ignored.
    pub fn distance_m(&self, rhs: &Self) -> f64 {
        let (lat1, lon1) = (deg2rad(self.geodetic[0]), deg2rad(self.geodetic[1]));
        let (lat2, lon2) = (deg2rad(rhs.geodetic[0]), deg2rad(rhs.geodetic[1]));

        let dlat = lat2 - lat1;
        let dlon = lon2 - lon1;

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }
}
