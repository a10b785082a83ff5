//! Read-only reference tables for attribution and outfall forecasting.
//!
//! [`AirshedConfig`] bundles the seasonal baselines, the source priors and
//! the dispersion constants. Build it once at start-up (from defaults or a
//! JSON override file), validate it, then lend `&AirshedConfig` to
//! [`AttributionEngine`](crate::attribution::AttributionEngine) and
//! [`DispersionForecaster`](crate::dispersion::DispersionForecaster). The
//! engines only ever hold shared references, so any number of threads can
//! evaluate requests against the same tables without locking.
//!
//! # Sources
//!
//! - ARAI & TERI (2018). "Source Apportionment of PM2.5 & PM10 of Delhi NCR for
//!   Identification of Major Sources." Report ARAI/16-17/DHI-SA-NCR, §4.4.1 (priors).
//! - Sharma, M. & Dikshit, O. (2016). "Comprehensive Study on Air Pollution and
//!   Green House Gases in Delhi." IIT Kanpur (NO2 averages, PM2.5/PM10 ratio).
//! - BLH seasonal means from ERA5 rows, fire means from VIIRS detections, PM
//!   seasonal means from the Anand Vihar (DPCC) station record.

use crate::attribution::SourceCategory;
use crate::core_types::units::Meters;
use crate::dispersion::WindAngleConvention;
use crate::error::{AirshedError, Result};
use serde::{Deserialize, Serialize};

/// Seasonal and contextual reference values each signal is compared against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Baselines {
    /// Nov-Feb mean boundary-layer height
    pub blh_winter_avg: Meters,
    /// Mar-May mean boundary-layer height
    pub blh_summer_avg: Meters,
    /// Jun-Oct mean boundary-layer height
    pub blh_monsoon_avg: Meters,

    /// Mean daily fire detections across the whole record
    pub fires_daily_avg: f64,
    /// Mean daily fire detections in Oct-Nov
    pub fires_stubble_season_avg: f64,
    /// Peak single-day detections in stubble season
    pub fires_stubble_peak: f64,

    /// Annual NO2 mean (µg/m³), midpoint of winter and summer
    pub no2_overall_avg: f64,
    pub no2_winter_avg: f64,
    pub no2_summer_avg: f64,
    /// Rush-hour NO2 estimate (µg/m³)
    pub no2_rush_hour_avg: f64,
    /// Night NO2 estimate, roughly half of daytime (µg/m³)
    pub no2_night_avg: f64,

    /// SO2 mean (µg/m³); the study only reports it as consistently low
    pub so2_avg: f64,

    pub pm25_winter_avg: f64,
    pub pm25_summer_avg: f64,
    pub pm25_monsoon_avg: f64,
    /// October mean, Diwali included
    pub pm25_postmonsoon_avg: f64,

    /// PM10 seasonal means, derived from PM2.5 through the winter ratio
    pub pm10_winter_avg: f64,
    pub pm10_summer_avg: f64,
    pub pm10_monsoon_avg: f64,
    pub pm10_postmonsoon_avg: f64,

    /// Winter PM2.5/PM10 ratio (375 / 600)
    pub pm_ratio_avg: f64,

    /// Typical ambient CO (mg/m³)
    pub co_ambient_avg: f64,
}

impl Default for Baselines {
    fn default() -> Self {
        Baselines {
            blh_winter_avg: Meters::new(381.0),
            blh_summer_avg: Meters::new(1106.0),
            blh_monsoon_avg: Meters::new(669.0),

            fires_daily_avg: 183.0,
            fires_stubble_season_avg: 193.0,
            fires_stubble_peak: 529.0,

            no2_overall_avg: 71.0,
            no2_winter_avg: 83.0,
            no2_summer_avg: 59.0,
            no2_rush_hour_avg: 100.0,
            no2_night_avg: 40.0,

            so2_avg: 15.0,

            pm25_winter_avg: 228.0,
            pm25_summer_avg: 80.0,
            pm25_monsoon_avg: 49.0,
            pm25_postmonsoon_avg: 139.0,

            pm10_winter_avg: 365.0,
            pm10_summer_avg: 128.0,
            pm10_monsoon_avg: 78.0,
            pm10_postmonsoon_avg: 222.0,

            pm_ratio_avg: 0.625,

            co_ambient_avg: 1.5,
        }
    }
}

impl Baselines {
    fn named_values(&self) -> [(&'static str, f64); 22] {
        [
            ("blh_winter_avg", *self.blh_winter_avg),
            ("blh_summer_avg", *self.blh_summer_avg),
            ("blh_monsoon_avg", *self.blh_monsoon_avg),
            ("fires_daily_avg", self.fires_daily_avg),
            ("fires_stubble_season_avg", self.fires_stubble_season_avg),
            ("fires_stubble_peak", self.fires_stubble_peak),
            ("no2_overall_avg", self.no2_overall_avg),
            ("no2_winter_avg", self.no2_winter_avg),
            ("no2_summer_avg", self.no2_summer_avg),
            ("no2_rush_hour_avg", self.no2_rush_hour_avg),
            ("no2_night_avg", self.no2_night_avg),
            ("so2_avg", self.so2_avg),
            ("pm25_winter_avg", self.pm25_winter_avg),
            ("pm25_summer_avg", self.pm25_summer_avg),
            ("pm25_monsoon_avg", self.pm25_monsoon_avg),
            ("pm25_postmonsoon_avg", self.pm25_postmonsoon_avg),
            ("pm10_winter_avg", self.pm10_winter_avg),
            ("pm10_summer_avg", self.pm10_summer_avg),
            ("pm10_monsoon_avg", self.pm10_monsoon_avg),
            ("pm10_postmonsoon_avg", self.pm10_postmonsoon_avg),
            ("pm_ratio_avg", self.pm_ratio_avg),
            ("co_ambient_avg", self.co_ambient_avg),
        ]
    }

    /// Every baseline is a divisor and must be finite and strictly positive.
    ///
    /// # Errors
    ///
    /// Returns [`AirshedError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in self.named_values() {
            if !value.is_finite() || value <= 0.0 {
                return Err(AirshedError::invalid_config(
                    field,
                    format!("must be finite and positive, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

/// Baseline share of each source (PM2.5, winter, Delhi NCR average).
///
/// The published shares are 22/12/15/22/26/4 %, which sum to 101 % because of
/// rounding in the study. The table is kept as published; only the
/// modulated output is normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Priors {
    pub traffic: f64,
    pub stubble_burning: f64,
    pub secondary_aerosols: f64,
    pub industry: f64,
    pub dust: f64,
    pub local_combustion: f64,
}

impl Default for Priors {
    fn default() -> Self {
        Priors {
            traffic: 0.22,
            stubble_burning: 0.22,
            secondary_aerosols: 0.26,
            industry: 0.12,
            dust: 0.15,
            local_combustion: 0.04,
        }
    }
}

impl Priors {
    /// Prior share of one source, as a fraction
    pub fn get(&self, source: SourceCategory) -> f64 {
        match source {
            SourceCategory::Traffic => self.traffic,
            SourceCategory::StubbleBurning => self.stubble_burning,
            SourceCategory::SecondaryAerosols => self.secondary_aerosols,
            SourceCategory::Industry => self.industry,
            SourceCategory::Dust => self.dust,
            SourceCategory::LocalCombustion => self.local_combustion,
        }
    }

    /// Raw sum of the shares (1.01 for the published table)
    pub fn total(&self) -> f64 {
        SourceCategory::ALL.iter().map(|s| self.get(*s)).sum()
    }

    /// Shares must be finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`AirshedError::InvalidConfig`] naming the first offending source.
    pub fn validate(&self) -> Result<()> {
        for source in SourceCategory::ALL {
            let share = self.get(source);
            if !share.is_finite() || share < 0.0 {
                return Err(AirshedError::invalid_config(
                    "priors",
                    format!("{source} share must be finite and non-negative, got {share}"),
                ));
            }
        }
        Ok(())
    }
}

/// Constants of the straight-line outfall model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispersionConfig {
    /// Flat-earth conversion between degrees and kilometers
    pub km_per_degree: f64,
    /// Forecast horizon when the caller does not give one (hours)
    pub default_hours: u32,
    /// Multiplier in the decay denominator `scale * dispersion * wind`
    pub decay_scale: f64,
    /// BLH that corresponds to a dispersion coefficient of 1 (m)
    pub blh_reference_m: f64,
    /// Floor on the BLH-derived dispersion coefficient
    pub min_dispersion: f64,
    /// Dispersion coefficient used when BLH is unknown
    pub unknown_blh_dispersion: f64,
    /// How the wind direction is turned into a displacement vector
    pub angle_convention: WindAngleConvention,
}

impl Default for DispersionConfig {
    fn default() -> Self {
        DispersionConfig {
            km_per_degree: 111.0,
            default_hours: 3,
            decay_scale: 3.0,
            blh_reference_m: 800.0,
            min_dispersion: 0.4,
            unknown_blh_dispersion: 0.6,
            angle_convention: WindAngleConvention::default(),
        }
    }
}

impl DispersionConfig {
    /// # Errors
    ///
    /// Returns [`AirshedError::InvalidConfig`] for a non-positive or
    /// non-finite constant.
    pub fn validate(&self) -> Result<()> {
        let constants = [
            ("km_per_degree", self.km_per_degree),
            ("decay_scale", self.decay_scale),
            ("blh_reference_m", self.blh_reference_m),
            ("min_dispersion", self.min_dispersion),
            ("unknown_blh_dispersion", self.unknown_blh_dispersion),
        ];
        for (field, value) in constants {
            if !value.is_finite() || value <= 0.0 {
                return Err(AirshedError::invalid_config(
                    field,
                    format!("must be finite and positive, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

/// Everything the engines read, built once per process.
///
/// # Example
/// ```
/// use airshed_core::config::{AirshedConfig, DispersionConfig};
///
/// let config = AirshedConfig {
///     dispersion: DispersionConfig {
///         default_hours: 5,
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// assert!((config.priors.total() - 1.01).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirshedConfig {
    pub baselines: Baselines,
    pub priors: Priors,
    pub dispersion: DispersionConfig,
}

impl AirshedConfig {
    /// # Errors
    ///
    /// Returns the first [`AirshedError::InvalidConfig`] found in any table.
    pub fn validate(&self) -> Result<()> {
        self.baselines.validate()?;
        self.priors.validate()?;
        self.dispersion.validate()
    }

    /// Parse a JSON override document and validate it. Missing keys keep
    /// their defaults, so `{"priors": {"dust": 0.2}}` is a complete file.
    ///
    /// # Errors
    ///
    /// [`AirshedError::ConfigParse`] for malformed JSON,
    /// [`AirshedError::InvalidConfig`] for values that fail validation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AirshedConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn published_priors_sum_to_101_percent() {
        let priors = Priors::default();
        assert_relative_eq!(priors.total(), 1.01, epsilon = 1e-12);
    }

    #[test]
    fn defaults_validate() {
        assert!(AirshedConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_override_keeps_defaults() {
        let config =
            AirshedConfig::from_json_str(r#"{"priors": {"dust": 0.2}, "baselines": {"so2_avg": 20}}"#)
                .unwrap();
        assert_eq!(config.priors.dust, 0.2);
        assert_eq!(config.priors.traffic, 0.22);
        assert_eq!(config.baselines.so2_avg, 20.0);
        assert_eq!(config.baselines.blh_winter_avg, Meters::new(381.0));
        assert_eq!(config.dispersion, DispersionConfig::default());
    }

    #[test]
    fn rejects_zero_baseline() {
        let err = AirshedConfig::from_json_str(r#"{"baselines": {"no2_night_avg": 0}}"#).unwrap_err();
        assert!(matches!(
            err,
            AirshedError::InvalidConfig { field: "no2_night_avg", .. }
        ));
    }

    #[test]
    fn rejects_negative_prior_and_bad_json() {
        let err = AirshedConfig::from_json_str(r#"{"priors": {"industry": -0.1}}"#).unwrap_err();
        assert!(matches!(err, AirshedError::InvalidConfig { field: "priors", .. }));

        let err = AirshedConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, AirshedError::ConfigParse(_)));
    }

    #[test]
    fn rejects_non_positive_km_per_degree() {
        let config = AirshedConfig {
            dispersion: DispersionConfig {
                km_per_degree: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
