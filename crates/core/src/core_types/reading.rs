//! Pollutant readings supplied per attribution call.
//!
//! A [`Reading`] maps pollutant codes to concentrations. Any code may be
//! absent: an unmeasured pollutant is simply missing from the map, and the
//! attribution signals that depend on it fall back to a neutral factor.
//! Non-finite values are treated exactly like missing ones. On the wire a
//! `null` value or an unrecognised code is dropped rather than rejected.

use crate::error::AirshedError;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Pollutant codes reported by monitoring stations.
///
/// Concentrations are µg/m³ for particulates, NO2 and SO2, and mg/m³ for CO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pollutant {
    /// Fine particulate matter (≤2.5 µm)
    #[serde(rename = "PM25", alias = "PM2.5")]
    Pm25,
    /// Coarse particulate matter (≤10 µm)
    #[serde(rename = "PM10")]
    Pm10,
    /// Nitrogen dioxide, the traffic marker
    #[serde(rename = "NO2")]
    No2,
    /// Sulphur dioxide, the industry marker
    #[serde(rename = "SO2")]
    So2,
    /// Carbon monoxide, the combustion marker
    #[serde(rename = "CO")]
    Co,
}

impl Pollutant {
    /// Every pollutant code, in wire order.
    pub const ALL: [Pollutant; 5] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::No2,
        Pollutant::So2,
        Pollutant::Co,
    ];

    /// Wire code (`"PM25"`, `"NO2"`, ...)
    pub fn code(self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM25",
            Pollutant::Pm10 => "PM10",
            Pollutant::No2 => "NO2",
            Pollutant::So2 => "SO2",
            Pollutant::Co => "CO",
        }
    }

    /// Human label used in explanations (`"PM2.5"`)
    pub fn label(self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            other => other.code(),
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Pollutant {
    type Err = AirshedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PM25" | "PM2.5" | "PM2_5" => Ok(Pollutant::Pm25),
            "PM10" => Ok(Pollutant::Pm10),
            "NO2" => Ok(Pollutant::No2),
            "SO2" => Ok(Pollutant::So2),
            "CO" => Ok(Pollutant::Co),
            _ => Err(AirshedError::UnknownPollutant(s.to_string())),
        }
    }
}

/// Concentrations keyed by pollutant.
///
/// # Example
/// ```
/// use airshed_core::core_types::{Pollutant, Reading};
///
/// let reading = Reading::new()
///     .with(Pollutant::Pm25, 200.0)
///     .with(Pollutant::Pm10, f64::NAN);
///
/// assert_eq!(reading.pm25(), Some(200.0));
/// assert_eq!(reading.pm10(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "FxHashMap<String, Option<f64>>")]
pub struct Reading {
    values: FxHashMap<Pollutant, f64>,
}

impl Reading {
    /// Empty reading (nothing measured)
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, pollutant: Pollutant, value: f64) -> Self {
        self.insert(pollutant, value);
        self
    }

    /// Record a concentration, replacing any previous value
    pub fn insert(&mut self, pollutant: Pollutant, value: f64) {
        self.values.insert(pollutant, value);
    }

    /// Measured concentration, or `None` when absent or not finite
    pub fn get(&self, pollutant: Pollutant) -> Option<f64> {
        self.values
            .get(&pollutant)
            .copied()
            .filter(|v| v.is_finite())
    }

    /// PM2.5 concentration (µg/m³)
    pub fn pm25(&self) -> Option<f64> {
        self.get(Pollutant::Pm25)
    }

    /// PM10 concentration (µg/m³)
    pub fn pm10(&self) -> Option<f64> {
        self.get(Pollutant::Pm10)
    }

    /// NO2 concentration (µg/m³)
    pub fn no2(&self) -> Option<f64> {
        self.get(Pollutant::No2)
    }

    /// SO2 concentration (µg/m³)
    pub fn so2(&self) -> Option<f64> {
        self.get(Pollutant::So2)
    }

    /// CO concentration (mg/m³)
    pub fn co(&self) -> Option<f64> {
        self.get(Pollutant::Co)
    }

    /// PM2.5/PM10 ratio when both are known and PM10 is non-zero
    pub fn pm_ratio(&self) -> Option<f64> {
        match (self.pm25(), self.pm10()) {
            (Some(fine), Some(coarse)) if coarse != 0.0 => Some(fine / coarse),
            _ => None,
        }
    }

    /// Number of pollutants with a usable value
    pub fn measured_count(&self) -> usize {
        Pollutant::ALL
            .iter()
            .filter(|p| self.get(**p).is_some())
            .count()
    }

    /// True when no pollutant has a usable value
    pub fn is_empty(&self) -> bool {
        self.measured_count() == 0
    }
}

impl Serialize for Reading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

impl From<FxHashMap<String, Option<f64>>> for Reading {
    fn from(raw: FxHashMap<String, Option<f64>>) -> Self {
        raw.into_iter()
            .filter_map(|(code, value)| match (code.parse::<Pollutant>(), value) {
                (Ok(pollutant), Some(value)) => Some((pollutant, value)),
                (Ok(pollutant), None) => {
                    debug!(%pollutant, "null reading treated as missing");
                    None
                }
                (Err(_), _) => {
                    debug!(code, "skipping unrecognised pollutant code");
                    None
                }
            })
            .collect()
    }
}

impl FromIterator<(Pollutant, f64)> for Reading {
    fn from_iter<T: IntoIterator<Item = (Pollutant, f64)>>(iter: T) -> Self {
        Reading {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!("pm2.5".parse::<Pollutant>().unwrap(), Pollutant::Pm25);
        assert_eq!(" so2 ".parse::<Pollutant>().unwrap(), Pollutant::So2);
        assert!(matches!(
            "O3".parse::<Pollutant>(),
            Err(AirshedError::UnknownPollutant(code)) if code == "O3"
        ));
    }

    #[test]
    fn ratio_requires_both_and_nonzero_pm10() {
        let only_fine = Reading::new().with(Pollutant::Pm25, 100.0);
        assert_eq!(only_fine.pm_ratio(), None);

        let zero_coarse = only_fine.clone().with(Pollutant::Pm10, 0.0);
        assert_eq!(zero_coarse.pm_ratio(), None);

        let both = only_fine.with(Pollutant::Pm10, 400.0);
        assert_eq!(both.pm_ratio(), Some(0.25));
    }

    #[test]
    fn deserializes_wire_map() {
        let reading: Reading =
            serde_json::from_str(r#"{"PM25": 200, "PM10": 350, "NO2": 120, "CO": 1.2}"#).unwrap();
        assert_eq!(reading.pm25(), Some(200.0));
        assert_eq!(reading.no2(), Some(120.0));
        assert_eq!(reading.so2(), None);
        assert_eq!(reading.measured_count(), 4);
    }

    #[test]
    fn wire_nulls_and_unknown_codes_are_dropped() {
        let reading: Reading =
            serde_json::from_str(r#"{"PM2.5": 180, "NO2": null, "O3": 40}"#).unwrap();
        assert_eq!(reading.pm25(), Some(180.0));
        assert_eq!(reading.no2(), None);
        assert_eq!(reading.measured_count(), 1);
    }

    #[test]
    fn non_finite_values_count_as_missing() {
        let reading: Reading = [(Pollutant::No2, f64::INFINITY), (Pollutant::So2, 12.0)]
            .into_iter()
            .collect();
        assert_eq!(reading.no2(), None);
        assert_eq!(reading.measured_count(), 1);
        assert!(!reading.is_empty());
        assert!(Reading::new().is_empty());
    }
}
