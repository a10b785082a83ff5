//! Great-circle geometry on a spherical Earth.
//!
//! Distance, initial bearing and the upwind test used when relating a
//! receptor (monitoring station) to a candidate source location.
//!
//! # Conventions
//!
//! - Latitude/longitude in decimal degrees (WGS84, treated as a sphere)
//! - Bearings are compass bearings: 0° = North, 90° = East, clockwise
//! - Wind direction is the direction the wind blows FROM, so a source is
//!   upwind of a station when the bearing from the station to the source
//!   lines up with the wind direction
//!
//! # References
//!
//! - Sinnott, R.W. (1984). "Virtues of the Haversine." Sky and Telescope, 68(2), 159.

use crate::core_types::units::{Degrees, Kilometers};
use serde::{Deserialize, Serialize};

/// Mean Earth radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Default half-width of the upwind cone
pub const DEFAULT_UPWIND_TOLERANCE: Degrees = Degrees::new(45.0);

/// Great-circle distance between two points.
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Kilometers {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    Kilometers::new(EARTH_RADIUS_KM * c)
}

/// Initial bearing from point 1 to point 2, in `[0, 360)`.
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Degrees {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let x = d_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();

    Degrees::new(x.atan2(y).to_degrees()).normalized()
}

/// Smallest angle between two bearings, in `[0, 180]`.
///
/// Handles wraparound: 350° and 10° are 20° apart, not 340°.
pub fn angular_diff(a: Degrees, b: Degrees) -> Degrees {
    let diff = (*a - *b).abs().rem_euclid(360.0);
    Degrees::new(if diff > 180.0 { 360.0 - diff } else { diff })
}

/// True when a source at `source_bearing` (seen from the station) sits
/// inside the upwind cone of half-width `tolerance` around `wind_direction`.
///
/// The cone edge is inclusive.
pub fn is_upwind(source_bearing: Degrees, wind_direction: Degrees, tolerance: Degrees) -> bool {
    angular_diff(source_bearing, wind_direction) <= tolerance
}

/// A point on the Earth's surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lon")]
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another point
    pub fn distance_to(&self, other: &GeoPoint) -> Kilometers {
        haversine(self.latitude, self.longitude, other.latitude, other.longitude)
    }

    /// Initial bearing towards another point
    pub fn bearing_to(&self, other: &GeoPoint) -> Degrees {
        bearing(self.latitude, self.longitude, other.latitude, other.longitude)
    }

    /// True when `source` lies upwind of this point for the given wind,
    /// using the default 45° cone.
    pub fn has_upwind(&self, source: &GeoPoint, wind_direction: Degrees) -> bool {
        is_upwind(self.bearing_to(source), wind_direction, DEFAULT_UPWIND_TOLERANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // Anand Vihar (Delhi) and Sangrur (Punjab)
    const ANAND_VIHAR: GeoPoint = GeoPoint::new(28.6469, 77.3164);
    const SANGRUR: GeoPoint = GeoPoint::new(30.2331, 75.8406);

    #[test]
    fn delhi_to_punjab_distance_and_bearing() {
        let dist = ANAND_VIHAR.distance_to(&SANGRUR);
        assert!(*dist > 225.0 && *dist < 240.0, "distance {dist}");

        let b = ANAND_VIHAR.bearing_to(&SANGRUR);
        assert!(*b > 310.0 && *b < 325.0, "bearing {b}");

        // Punjab is upwind under a north-westerly
        assert!(ANAND_VIHAR.has_upwind(&SANGRUR, Degrees::new(290.0)));
        assert!(!ANAND_VIHAR.has_upwind(&SANGRUR, Degrees::new(120.0)));
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine(0.0, 0.0, 1.0, 0.0);
        assert_abs_diff_eq!(*d, 111.195, epsilon = 0.01);
        assert_abs_diff_eq!(*haversine(10.0, 20.0, 10.0, 20.0), 0.0);
    }

    #[test]
    fn cardinal_bearings() {
        assert_abs_diff_eq!(*bearing(0.0, 0.0, 1.0, 0.0), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(*bearing(0.0, 0.0, 0.0, 1.0), 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(*bearing(0.0, 0.0, -1.0, 0.0), 180.0, epsilon = 1e-9);
        assert_abs_diff_eq!(*bearing(0.0, 0.0, 0.0, -1.0), 270.0, epsilon = 1e-9);
    }

    #[test]
    fn angular_diff_wraps() {
        assert_eq!(angular_diff(Degrees::new(350.0), Degrees::new(10.0)), Degrees::new(20.0));
        assert_eq!(angular_diff(Degrees::new(10.0), Degrees::new(350.0)), Degrees::new(20.0));
        assert_eq!(angular_diff(Degrees::new(0.0), Degrees::new(180.0)), Degrees::new(180.0));
        assert_eq!(angular_diff(Degrees::new(90.0), Degrees::new(90.0)), Degrees::new(0.0));
    }

    #[test]
    fn upwind_cone_edges_are_inclusive() {
        assert!(is_upwind(Degrees::new(45.0), Degrees::new(0.0), DEFAULT_UPWIND_TOLERANCE));
        assert!(!is_upwind(Degrees::new(46.0), Degrees::new(0.0), DEFAULT_UPWIND_TOLERANCE));
        assert!(is_upwind(Degrees::new(330.0), Degrees::new(10.0), DEFAULT_UPWIND_TOLERANCE));
    }
}
