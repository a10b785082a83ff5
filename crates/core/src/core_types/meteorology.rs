//! Meteorology and fire activity accompanying a sensor reading.
//!
//! Every meteorological field is optional. Reanalysis rows are frequently
//! missing wind or boundary-layer values, and each attribution signal
//! decides for itself what an unknown value means (neutral factor, half
//! weight, or a hard gate).

use crate::core_types::units::{Degrees, Meters, MetersPerSecond};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wind and mixing conditions at the receptor.
///
/// Wind direction follows the meteorological convention: the compass
/// bearing the wind blows FROM (270° is a westerly).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Meteorology {
    /// Wind speed at 10 m (m/s)
    pub wind_speed: Option<MetersPerSecond>,
    /// Direction the wind blows from (degrees, 0 = North)
    #[serde(rename = "wind_dir")]
    pub wind_direction: Option<Degrees>,
    /// Boundary-layer height (m)
    #[serde(rename = "blh")]
    pub boundary_layer_height: Option<Meters>,
}

impl Meteorology {
    /// Conditions with nothing known
    pub const UNKNOWN: Meteorology = Meteorology {
        wind_speed: None,
        wind_direction: None,
        boundary_layer_height: None,
    };

    /// Build from raw optional numbers, dropping non-finite values.
    ///
    /// This mirrors what a data layer produces after reading a reanalysis row
    /// where blanks come through as NaN.
    pub fn from_raw(wind_speed: Option<f64>, wind_dir: Option<f64>, blh: Option<f64>) -> Self {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        Meteorology {
            wind_speed: finite(wind_speed).map(MetersPerSecond::new),
            wind_direction: finite(wind_dir).map(Degrees::new),
            boundary_layer_height: finite(blh).map(Meters::new),
        }
    }

    /// Set both wind components
    pub fn with_wind(mut self, speed: MetersPerSecond, direction: Degrees) -> Self {
        self.wind_speed = Some(speed);
        self.wind_direction = Some(direction);
        self
    }

    /// Set the boundary-layer height
    pub fn with_blh(mut self, blh: Meters) -> Self {
        self.boundary_layer_height = Some(blh);
        self
    }

    /// Range check a calling layer may apply before handing data to the
    /// engines. The engines themselves never reject input.
    ///
    /// Plausible means: speed ≥ 0, direction in `[0, 360]`, BLH > 0 when
    /// present.
    pub fn is_physically_plausible(&self) -> bool {
        let speed_ok = self.wind_speed.is_none_or(|s| *s >= 0.0);
        let dir_ok = self
            .wind_direction
            .is_none_or(|d| (0.0..=360.0).contains(&*d));
        let blh_ok = self.boundary_layer_height.is_none_or(|h| *h > 0.0);
        speed_ok && dir_ok && blh_ok
    }
}

/// Count of satellite fire detections inside the caller's lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FireActivity(u32);

impl FireActivity {
    /// No detections
    pub const NONE: FireActivity = FireActivity(0);

    /// Wrap a detection count
    pub const fn new(count: u32) -> Self {
        FireActivity(count)
    }

    /// Raw detection count
    pub fn count(self) -> u32 {
        self.0
    }

    /// True when nothing was detected
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for FireActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fires", self.0)
    }
}

/// Coarse mixing descriptor shown next to meteorology in responses.
///
/// Thresholds: below 300 m is a low (trapping) layer, below 700 m is
/// moderate, anything higher mixes well. Unknown heights report good mixing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryLayerClass {
    Low,
    Moderate,
    #[serde(rename = "Good mixing")]
    GoodMixing,
}

impl BoundaryLayerClass {
    /// Classify an optional boundary-layer height
    pub fn classify(blh: Option<Meters>) -> Self {
        match blh.map(Meters::value) {
            Some(h) if h > 0.0 && h < 300.0 => BoundaryLayerClass::Low,
            Some(h) if h > 0.0 && h < 700.0 => BoundaryLayerClass::Moderate,
            _ => BoundaryLayerClass::GoodMixing,
        }
    }
}

impl fmt::Display for BoundaryLayerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BoundaryLayerClass::Low => "Low",
            BoundaryLayerClass::Moderate => "Moderate",
            BoundaryLayerClass::GoodMixing => "Good mixing",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_drops_nan() {
        let met = Meteorology::from_raw(Some(f64::NAN), Some(308.0), None);
        assert_eq!(met.wind_speed, None);
        assert_eq!(met.wind_direction, Some(Degrees::new(308.0)));
        assert_eq!(met.boundary_layer_height, None);
    }

    #[test]
    fn plausibility_is_advisory() {
        assert!(Meteorology::UNKNOWN.is_physically_plausible());
        let bad = Meteorology::UNKNOWN.with_wind(MetersPerSecond::new(-1.0), Degrees::new(90.0));
        assert!(!bad.is_physically_plausible());
        let bad_dir = Meteorology::UNKNOWN.with_wind(MetersPerSecond::new(3.0), Degrees::new(400.0));
        assert!(!bad_dir.is_physically_plausible());
    }

    #[test]
    fn wire_names() {
        let met: Meteorology =
            serde_json::from_str(r#"{"wind_dir": 308, "wind_speed": 4.0, "blh": null}"#).unwrap();
        assert_eq!(met.wind_speed, Some(MetersPerSecond::new(4.0)));
        assert_eq!(met.wind_direction, Some(Degrees::new(308.0)));
        assert_eq!(met.boundary_layer_height, None);
    }

    #[test]
    fn mixing_classes() {
        assert_eq!(BoundaryLayerClass::classify(Some(Meters::new(250.0))), BoundaryLayerClass::Low);
        assert_eq!(
            BoundaryLayerClass::classify(Some(Meters::new(650.0))),
            BoundaryLayerClass::Moderate
        );
        assert_eq!(BoundaryLayerClass::classify(None), BoundaryLayerClass::GoodMixing);
        assert_eq!(BoundaryLayerClass::GoodMixing.to_string(), "Good mixing");
    }
}
