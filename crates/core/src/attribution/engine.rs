//! Attribution engine: modulate the validated priors and normalize.
//!
//! Each of the six sub-calculations turns one real-time signal into a
//! [`ModulationFactor`]. The engine multiplies every prior by its factor and
//! renormalizes the weighted shares so the reported percentages sum to 100:
//!
//! ```text
//! weighted[s] = prior[s] * M[s]
//! total       = Σ weighted            (1.0 if exactly zero)
//! pct[s]      = weighted[s] / total * 100
//! ```
//!
//! The engine borrows an [`AirshedConfig`] and holds no other state, so a
//! single engine can serve any number of threads (see
//! [`AttributionEngine::attribute_batch`]).

use super::combustion::{local_combustion_modulation, CombustionSeason};
use super::dust::dust_modulation;
use super::industry::industry_modulation;
use super::modulation::{ModulationFactor, ModulationReason};
use super::secondary::{secondary_modulation, MixingSeason};
use super::source::{ContributionLevel, SourceCategory};
use super::stubble::stubble_modulation;
use super::traffic::{traffic_modulation, TrafficPeriod};
use crate::config::{AirshedConfig, Baselines};
use crate::core_types::units::round_dp;
use crate::core_types::{FireActivity, Meters, Meteorology, Percent, Reading};
use crate::error::{AirshedError, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use rayon::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, trace};

/// Method tag reported with every result
pub const METHOD: &str = "validated_prior_modulation";

/// Offset-free layouts tried after RFC 3339, in order.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp into local wall-clock time.
///
/// Accepts RFC 3339 with an offset (the offset is dropped, the wall-clock
/// time kept), `YYYY-MM-DDTHH:MM:SS[.fff]`, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM` and a bare `YYYY-MM-DD` (midnight).
///
/// # Errors
///
/// [`AirshedError::InvalidTimestamp`] when no layout matches.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.naive_local());
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt);
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| AirshedError::InvalidTimestamp(text.to_string()))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_timestamp(&text).map_err(serde::de::Error::custom)
}

/// One attribution request as it arrives on the wire.
///
/// ```json
/// {"timestamp": "2025-11-08T09:00:00",
///  "readings": {"PM25": 200, "NO2": 120},
///  "wind_dir": 308, "wind_speed": 4.0, "blh": 300, "fire_count": 150}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionRequest {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub readings: Reading,
    #[serde(flatten)]
    pub meteorology: Meteorology,
    #[serde(default)]
    pub fire_count: FireActivity,
}

impl AttributionRequest {
    pub fn new(timestamp: NaiveDateTime, readings: Reading, meteorology: Meteorology, fire_count: FireActivity) -> Self {
        AttributionRequest {
            timestamp,
            readings,
            meteorology,
            fire_count,
        }
    }

    /// Build a request from ISO-8601 text.
    ///
    /// # Errors
    ///
    /// Fails when the timestamp cannot be parsed.
    pub fn parse(
        timestamp: &str,
        readings: Reading,
        meteorology: Meteorology,
        fire_count: FireActivity,
    ) -> Result<Self> {
        Ok(Self::new(parse_timestamp(timestamp)?, readings, meteorology, fire_count))
    }
}

/// Final share of one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Normalized share, one decimal
    pub percentage: Percent,
    /// Clamped factor, two decimals
    pub modulation_factor: f64,
    /// Un-modulated prior share
    pub prior: Percent,
    pub explanation: String,
    pub level: ContributionLevel,
    pub reason: ModulationReason,
}

/// Baseline values the run actually selected, for traceability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselinesUsed {
    pub blh_baseline: Meters,
    pub blh_season: MixingSeason,
    pub fires_baseline: f64,
    pub no2_baseline: f64,
    pub traffic_period: TrafficPeriod,
    pub so2_baseline: f64,
    pub pm25_baseline: f64,
    pub pm10_baseline: f64,
    pub combustion_season: CombustionSeason,
    pub pm_ratio_baseline: f64,
}

impl BaselinesUsed {
    fn select(hour: u32, month: u32, baselines: &Baselines) -> Self {
        let blh_season = MixingSeason::from_month(month);
        let traffic_period = TrafficPeriod::from_hour(hour);
        let combustion_season = CombustionSeason::from_month(month);

        BaselinesUsed {
            blh_baseline: blh_season.baseline(baselines),
            blh_season,
            fires_baseline: baselines.fires_stubble_season_avg,
            no2_baseline: traffic_period.baseline(baselines),
            traffic_period,
            so2_baseline: baselines.so2_avg,
            pm25_baseline: combustion_season.pm25_baseline(baselines),
            pm10_baseline: combustion_season.pm10_baseline(baselines),
            combustion_season,
            pm_ratio_baseline: baselines.pm_ratio_avg,
        }
    }
}

/// Output of one attribution run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionResult {
    pub method: String,
    pub timestamp: NaiveDateTime,
    pub contributions: BTreeMap<SourceCategory, Contribution>,
    pub baselines_used: BaselinesUsed,
}

impl AttributionResult {
    pub fn get(&self, source: SourceCategory) -> Option<&Contribution> {
        self.contributions.get(&source)
    }

    /// Sum of the rounded percentages (≈ 100)
    pub fn percentage_total(&self) -> f64 {
        self.contributions.values().map(|c| *c.percentage).sum()
    }

    /// The `n` largest contributions, largest first. Ties keep reporting order.
    pub fn primary_sources(&self, n: usize) -> Vec<(SourceCategory, &Contribution)> {
        let mut ranked: Vec<_> = self.contributions.iter().map(|(s, c)| (*s, c)).collect();
        ranked.sort_by_key(|(_, c)| Reverse(c.percentage));
        ranked.truncate(n);
        ranked
    }

    /// One-line digest naming the two largest sources.
    pub fn summary(&self) -> String {
        let parts: Vec<String> = self
            .primary_sources(2)
            .into_iter()
            .map(|(source, c)| format!("{} ({:.0}%)", source.title(), *c.percentage))
            .collect();
        format!("Primary sources: {}", parts.join(", "))
    }
}

impl fmt::Display for AttributionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} @ {}", self.method, self.timestamp)?;
        for (source, c) in &self.contributions {
            writeln!(
                f,
                "  {:<20} {:>5.1}% -> {:>5.1}%  (M={:.2}, {})  {}",
                source.key(),
                *c.prior,
                *c.percentage,
                c.modulation_factor,
                c.level,
                c.explanation
            )?;
        }
        write!(f, "  total {:.1}%", self.percentage_total())
    }
}

/// How much of the input the attribution could actually draw on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// `High` with wind direction, BLH and PM2.5; `Medium` with PM2.5 alone.
    pub fn assess(readings: &Reading, meteorology: &Meteorology) -> Self {
        let has_pm25 = readings.pm25().is_some();
        if has_pm25 && meteorology.wind_direction.is_some() && meteorology.boundary_layer_height.is_some() {
            Confidence::High
        } else if has_pm25 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Confidence::Low => "Low",
            Confidence::Medium => "Medium",
            Confidence::High => "High",
        })
    }
}

/// Prior-modulation attribution over a borrowed configuration.
#[derive(Debug, Clone, Copy)]
pub struct AttributionEngine<'a> {
    config: &'a AirshedConfig,
}

impl<'a> AttributionEngine<'a> {
    pub fn new(config: &'a AirshedConfig) -> Self {
        debug!(prior_total = config.priors.total(), "attribution engine ready");
        AttributionEngine { config }
    }

    pub fn config(&self) -> &'a AirshedConfig {
        self.config
    }

    /// Raw factor for every source, before weighting.
    pub fn modulation_factors(
        &self,
        timestamp: NaiveDateTime,
        readings: &Reading,
        meteorology: &Meteorology,
        fire_count: FireActivity,
    ) -> BTreeMap<SourceCategory, ModulationFactor> {
        let baselines = &self.config.baselines;
        let hour = timestamp.hour();
        let month = timestamp.month();

        SourceCategory::ALL
            .into_iter()
            .map(|source| {
                let factor = match source {
                    SourceCategory::Traffic => traffic_modulation(readings.no2(), hour, baselines),
                    SourceCategory::StubbleBurning => {
                        stubble_modulation(fire_count, meteorology.wind_direction, month, baselines)
                    }
                    SourceCategory::SecondaryAerosols => {
                        secondary_modulation(meteorology.boundary_layer_height, month, baselines)
                    }
                    SourceCategory::Industry => industry_modulation(readings.so2(), baselines),
                    SourceCategory::Dust => dust_modulation(readings, meteorology.wind_speed, baselines),
                    SourceCategory::LocalCombustion => {
                        local_combustion_modulation(readings, meteorology.wind_speed, hour, month, baselines)
                    }
                };
                trace!(%source, factor = factor.value(), reason = %factor.reason(), "modulation");
                (source, factor)
            })
            .collect()
    }

    /// Attribute one reading to the six source categories.
    pub fn attribute(
        &self,
        timestamp: NaiveDateTime,
        readings: &Reading,
        meteorology: &Meteorology,
        fire_count: FireActivity,
    ) -> AttributionResult {
        let priors = &self.config.priors;
        let factors = self.modulation_factors(timestamp, readings, meteorology, fire_count);

        let weighted: BTreeMap<SourceCategory, f64> = factors
            .iter()
            .map(|(source, factor)| (*source, priors.get(*source) * factor.value()))
            .collect();

        let mut total: f64 = weighted.values().sum();
        if total == 0.0 {
            total = 1.0;
        }

        let contributions = factors
            .into_iter()
            .map(|(source, factor)| {
                let percentage = weighted[&source] / total * 100.0;
                let contribution = Contribution {
                    percentage: Percent::new(round_dp(percentage, 1)),
                    modulation_factor: round_dp(factor.value(), 2),
                    prior: Percent::new(round_dp(priors.get(source) * 100.0, 2)),
                    level: ContributionLevel::classify(percentage),
                    reason: factor.reason(),
                    explanation: factor.explanation().to_string(),
                };
                (source, contribution)
            })
            .collect();

        let baselines_used = BaselinesUsed::select(timestamp.hour(), timestamp.month(), &self.config.baselines);
        debug!(
            %timestamp,
            traffic_period = %baselines_used.traffic_period,
            blh_season = %baselines_used.blh_season,
            combustion_season = %baselines_used.combustion_season,
            "attribution complete"
        );

        AttributionResult {
            method: METHOD.to_string(),
            timestamp,
            contributions,
            baselines_used,
        }
    }

    pub fn attribute_request(&self, request: &AttributionRequest) -> AttributionResult {
        self.attribute(
            request.timestamp,
            &request.readings,
            &request.meteorology,
            request.fire_count,
        )
    }

    /// Attribute many requests in parallel. Output order matches input order.
    pub fn attribute_batch(&self, requests: &[AttributionRequest]) -> Vec<AttributionResult> {
        debug!(count = requests.len(), "batch attribution");
        requests
            .par_iter()
            .map(|request| self.attribute_request(request))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{Degrees, MetersPerSecond, Pollutant};
    use approx::assert_abs_diff_eq;

    fn rush_hour() -> AttributionRequest {
        AttributionRequest::parse(
            "2025-11-08T09:00:00",
            Reading::new()
                .with(Pollutant::Pm25, 200.0)
                .with(Pollutant::Pm10, 350.0)
                .with(Pollutant::No2, 120.0)
                .with(Pollutant::So2, 15.0)
                .with(Pollutant::Co, 1.2),
            Meteorology::UNKNOWN
                .with_wind(MetersPerSecond::new(4.0), Degrees::new(308.0))
                .with_blh(Meters::new(300.0)),
            FireActivity::new(150),
        )
        .unwrap()
    }

    #[test]
    fn timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 11, 8).unwrap().and_hms_opt(9, 0, 0).unwrap();
        for text in [
            "2025-11-08T09:00:00",
            "2025-11-08T09:00:00.000",
            "2025-11-08 09:00:00",
            "2025-11-08T09:00",
            "2025-11-08T09:00:00+05:30",
            "2025-11-08T09:00:00Z",
        ] {
            assert_eq!(parse_timestamp(text).unwrap(), expected, "{text}");
        }
        assert_eq!(
            parse_timestamp("2025-11-08").unwrap(),
            expected.date().and_hms_opt(0, 0, 0).unwrap()
        );
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(AirshedError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn request_deserializes_from_flat_json() {
        let request: AttributionRequest = serde_json::from_str(
            r#"{"timestamp": "2025-11-08T09:00:00",
                "readings": {"PM25": 200, "PM10": 350, "NO2": 120, "SO2": 15, "CO": 1.2},
                "wind_dir": 308, "wind_speed": 4.0, "blh": 300, "fire_count": 150}"#,
        )
        .unwrap();
        assert_eq!(request, rush_hour());

        let sparse: AttributionRequest =
            serde_json::from_str(r#"{"timestamp": "2025-07-01T12:00:00", "readings": {}}"#).unwrap();
        assert_eq!(sparse.meteorology, Meteorology::UNKNOWN);
        assert!(sparse.fire_count.is_none());
    }

    #[test]
    fn null_and_unknown_readings_fall_back_to_neutral() {
        let request: AttributionRequest = serde_json::from_str(
            r#"{"timestamp": "2025-11-08T09:00:00", "readings": {"PM25": 200, "NO2": null, "O3": 40}}"#,
        )
        .unwrap();
        assert_eq!(request.readings.pm25(), Some(200.0));
        assert_eq!(request.readings.measured_count(), 1);

        let config = AirshedConfig::default();
        let result = AttributionEngine::new(&config).attribute_request(&request);
        let traffic = result.get(SourceCategory::Traffic).unwrap();
        assert_eq!(traffic.reason, ModulationReason::NeutralMissingData);
        assert_eq!(traffic.modulation_factor, 1.0);
    }

    #[test]
    fn rush_hour_selects_rush_baselines() {
        let config = AirshedConfig::default();
        let result = AttributionEngine::new(&config).attribute_request(&rush_hour());

        assert_eq!(result.method, METHOD);
        assert_eq!(result.baselines_used.traffic_period, TrafficPeriod::RushHour);
        assert_eq!(result.baselines_used.no2_baseline, 100.0);
        assert_eq!(result.baselines_used.blh_baseline, Meters::new(381.0));
        assert_eq!(result.baselines_used.combustion_season, CombustionSeason::Winter);
        assert_abs_diff_eq!(result.percentage_total(), 100.0, epsilon = 0.2);
    }

    #[test]
    fn all_zero_weights_do_not_divide_by_zero() {
        let config = AirshedConfig {
            priors: crate::config::Priors {
                traffic: 0.0,
                stubble_burning: 0.0,
                secondary_aerosols: 0.0,
                industry: 0.0,
                dust: 0.0,
                local_combustion: 0.0,
            },
            ..AirshedConfig::default()
        };
        let result = AttributionEngine::new(&config).attribute_request(&rush_hour());
        assert!(result.contributions.values().all(|c| *c.percentage == 0.0));
        assert!(result
            .contributions
            .values()
            .all(|c| c.level == ContributionLevel::Low));
    }

    #[test]
    fn summary_names_two_largest() {
        let config = AirshedConfig::default();
        let result = AttributionEngine::new(&config).attribute_request(&rush_hour());
        let top = result.primary_sources(2);
        assert_eq!(top[0].0, SourceCategory::SecondaryAerosols);
        assert_eq!(top[1].0, SourceCategory::Traffic);
        assert_eq!(result.summary(), "Primary sources: Secondary Aerosols (30%), Traffic (24%)");
    }

    #[test]
    fn confidence_levels() {
        let pm = Reading::new().with(Pollutant::Pm25, 80.0);
        let full = Meteorology::UNKNOWN
            .with_wind(MetersPerSecond::new(2.0), Degrees::new(300.0))
            .with_blh(Meters::new(500.0));
        assert_eq!(Confidence::assess(&pm, &full), Confidence::High);
        assert_eq!(Confidence::assess(&pm, &Meteorology::UNKNOWN), Confidence::Medium);
        assert_eq!(Confidence::assess(&Reading::new(), &full), Confidence::Low);
    }
}
