//! Local-combustion signal: particulate load, time of day, season and CO.
//!
//! Two mutually exclusive paths:
//!
//! 1. **Fireworks override.** Diwali-style events are recognised from the
//!    pollution signature itself rather than a calendar: extreme PM2.5, a
//!    fine-dominated PM2.5/PM10 ratio, elevated CO and stagnant air must all
//!    be present. The factor is then PM2.5 over its seasonal mean, capped at
//!    25, and none of the normal-path multipliers apply.
//! 2. **Normal path.** Average of the PM2.5 and PM10 anomaly ratios that are
//!    available, scaled for cooking/heating hours, winter heating and CO.
//!
//! ```text
//! base   = mean(PM25/pm25_avg(season), PM10/pm10_avg(season))   (1.0 if none)
//! base  *= 1.3  if hour ∈ {6,7,8,19,20,21,22}
//!        | 1.1  if hour ∈ {0..5}
//! base  *= 1.2  if winter
//! base  *= min(CO / co_avg, 2.0)  if CO known
//! M      = clamp(base, 0.3, 10.0)
//! ```

use super::modulation::{ClampRange, ModulationFactor};
use crate::config::Baselines;
use crate::core_types::{MetersPerSecond, Pollutant, Reading};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Normal-path interval
pub const COMBUSTION_BOUNDS: ClampRange = ClampRange::new(0.3, 10.0);

/// Fireworks-override interval
pub const FIREWORKS_BOUNDS: ClampRange = ClampRange::new(0.0, 25.0);

/// Winter heating multiplier
pub const WINTER_MULTIPLIER: f64 = 1.2;

/// Upper cap on the CO multiplier
pub const MAX_CO_MULTIPLIER: f64 = 2.0;

/// Four-way season split used for the PM baselines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombustionSeason {
    /// November to February
    Winter,
    /// October
    PostMonsoon,
    /// March to May
    Summer,
    /// June to September
    Monsoon,
}

impl CombustionSeason {
    pub fn from_month(month: u32) -> Self {
        match month {
            11 | 12 | 1 | 2 => CombustionSeason::Winter,
            10 => CombustionSeason::PostMonsoon,
            3..=5 => CombustionSeason::Summer,
            _ => CombustionSeason::Monsoon,
        }
    }

    /// Seasonal PM2.5 mean (µg/m³)
    pub fn pm25_baseline(self, baselines: &Baselines) -> f64 {
        match self {
            CombustionSeason::Winter => baselines.pm25_winter_avg,
            CombustionSeason::PostMonsoon => baselines.pm25_postmonsoon_avg,
            CombustionSeason::Summer => baselines.pm25_summer_avg,
            CombustionSeason::Monsoon => baselines.pm25_monsoon_avg,
        }
    }

    /// Seasonal PM10 mean (µg/m³)
    pub fn pm10_baseline(self, baselines: &Baselines) -> f64 {
        match self {
            CombustionSeason::Winter => baselines.pm10_winter_avg,
            CombustionSeason::PostMonsoon => baselines.pm10_postmonsoon_avg,
            CombustionSeason::Summer => baselines.pm10_summer_avg,
            CombustionSeason::Monsoon => baselines.pm10_monsoon_avg,
        }
    }
}

impl fmt::Display for CombustionSeason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CombustionSeason::Winter => "winter",
            CombustionSeason::PostMonsoon => "post-monsoon",
            CombustionSeason::Summer => "summer",
            CombustionSeason::Monsoon => "monsoon",
        })
    }
}

/// Hour-of-day window for domestic combustion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HourWindow {
    /// 06-08 and 19-22
    CookingHeating,
    /// 00-05
    NightHeating,
    Other,
}

impl HourWindow {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=8 | 19..=22 => HourWindow::CookingHeating,
            0..=5 => HourWindow::NightHeating,
            _ => HourWindow::Other,
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            HourWindow::CookingHeating => 1.3,
            HourWindow::NightHeating => 1.1,
            HourWindow::Other => 1.0,
        }
    }
}

/// The four conditions of the fireworks signature, evaluated independently
/// so callers (and tests) can see which ones held.
#[allow(clippy::struct_excessive_bools)] // one flag per condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FireworksSignature {
    /// PM2.5 known and above 500 µg/m³
    pub extreme_pm25: bool,
    /// PM2.5/PM10 above 0.75
    pub fine_dominated: bool,
    /// CO known and above 2.0 mg/m³
    pub combustion_marker: bool,
    /// Wind unknown or below 3 m/s
    pub stagnant: bool,
}

impl FireworksSignature {
    pub const PM25_THRESHOLD: f64 = 500.0;
    pub const RATIO_THRESHOLD: f64 = 0.75;
    pub const CO_THRESHOLD: f64 = 2.0;
    pub const STAGNANT_BELOW: MetersPerSecond = MetersPerSecond::new(3.0);

    pub fn evaluate(readings: &Reading, wind_speed: Option<MetersPerSecond>) -> Self {
        FireworksSignature {
            extreme_pm25: readings.pm25().is_some_and(|v| v > Self::PM25_THRESHOLD),
            fine_dominated: readings
                .pm_ratio()
                .is_some_and(|r| r > Self::RATIO_THRESHOLD),
            combustion_marker: readings.co().is_some_and(|v| v > Self::CO_THRESHOLD),
            stagnant: wind_speed.is_none_or(|w| w < Self::STAGNANT_BELOW),
        }
    }

    /// All four conditions hold
    pub fn is_present(&self) -> bool {
        self.extreme_pm25 && self.fine_dominated && self.combustion_marker && self.stagnant
    }
}

/// Local-combustion factor; see the module docs for both paths.
pub fn local_combustion_modulation(
    readings: &Reading,
    wind_speed: Option<MetersPerSecond>,
    hour: u32,
    month: u32,
    baselines: &Baselines,
) -> ModulationFactor {
    let season = CombustionSeason::from_month(month);
    let pm25_baseline = season.pm25_baseline(baselines);
    let pm10_baseline = season.pm10_baseline(baselines);

    if FireworksSignature::evaluate(readings, wind_speed).is_present() {
        // extreme_pm25 guarantees PM2.5 is present
        let pm25 = readings.pm25().unwrap_or_default();
        info!(pm25, %season, "fireworks signature detected, overriding local combustion");
        return ModulationFactor::anomaly(
            pm25 / pm25_baseline,
            FIREWORKS_BOUNDS,
            format!(
                "fireworks ({}={pm25:.0} vs {season} avg {pm25_baseline:.0})",
                Pollutant::Pm25.label()
            ),
        );
    }

    let mut notes: Vec<String> = Vec::new();
    let mut ratios: Vec<f64> = Vec::with_capacity(2);

    if let Some(pm25) = readings.pm25() {
        ratios.push(pm25 / pm25_baseline);
        notes.push(format!(
            "{}={pm25:.0} vs {season} avg {pm25_baseline:.0}",
            Pollutant::Pm25.label()
        ));
    }
    if let Some(pm10) = readings.pm10() {
        ratios.push(pm10 / pm10_baseline);
        notes.push(format!(
            "{}={pm10:.0} vs {season} avg {pm10_baseline:.0}",
            Pollutant::Pm10.label()
        ));
    }

    let mut factor = if ratios.is_empty() {
        notes.push("PM unavailable (using baseline)".to_string());
        1.0
    } else {
        ratios.iter().sum::<f64>() / ratios.len() as f64
    };

    let window = HourWindow::from_hour(hour);
    factor *= window.multiplier();
    match window {
        HourWindow::CookingHeating => notes.push("cooking/heating hours".to_string()),
        HourWindow::NightHeating => notes.push("night heating".to_string()),
        HourWindow::Other => {}
    }

    if season == CombustionSeason::Winter {
        factor *= WINTER_MULTIPLIER;
        notes.push("winter".to_string());
    }

    if let Some(co) = readings.co() {
        let co_baseline = baselines.co_ambient_avg;
        factor *= (co / co_baseline).min(MAX_CO_MULTIPLIER);
        if co > co_baseline {
            notes.push(format!("CO={co:.1} vs avg {co_baseline}"));
        }
    }

    ModulationFactor::normal(factor, COMBUSTION_BOUNDS, notes.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::ModulationReason;
    use approx::assert_relative_eq;

    fn diwali() -> Reading {
        Reading::new()
            .with(Pollutant::Pm25, 900.0)
            .with(Pollutant::Pm10, 1000.0)
            .with(Pollutant::Co, 3.5)
    }

    #[test]
    fn season_and_hour_buckets() {
        assert_eq!(CombustionSeason::from_month(10), CombustionSeason::PostMonsoon);
        assert_eq!(CombustionSeason::from_month(2), CombustionSeason::Winter);
        assert_eq!(CombustionSeason::from_month(9), CombustionSeason::Monsoon);
        assert_eq!(HourWindow::from_hour(22), HourWindow::CookingHeating);
        assert_eq!(HourWindow::from_hour(5), HourWindow::NightHeating);
        assert_eq!(HourWindow::from_hour(9), HourWindow::Other);
    }

    #[test]
    fn fireworks_override_uses_pm25_only() {
        let factor = local_combustion_modulation(
            &diwali(),
            Some(MetersPerSecond::new(1.0)),
            22,
            10,
            &Baselines::default(),
        );
        assert_eq!(factor.reason(), ModulationReason::AnomalyOverride);
        assert_relative_eq!(factor.value(), 900.0 / 139.0);
        assert_eq!(factor.explanation(), "fireworks (PM2.5=900 vs post-monsoon avg 139)");
    }

    #[test]
    fn fireworks_capped_at_25() {
        let reading = diwali().with(Pollutant::Pm25, 4000.0).with(Pollutant::Pm10, 4100.0);
        let factor = local_combustion_modulation(&reading, None, 1, 7, &Baselines::default());
        assert_eq!(factor.reason(), ModulationReason::AnomalyOverride);
        assert_eq!(factor.value(), 25.0);
    }

    #[test]
    fn each_missing_condition_falls_back_to_normal_path() {
        let baselines = Baselines::default();
        let calm = Some(MetersPerSecond::new(1.0));

        let low_co = diwali().with(Pollutant::Co, 1.0);
        let windy = Some(MetersPerSecond::new(3.0));
        let coarse = diwali().with(Pollutant::Pm10, 1300.0);
        let moderate = diwali().with(Pollutant::Pm25, 500.0).with(Pollutant::Pm10, 550.0);

        for (reading, wind) in [(low_co, calm), (diwali(), windy), (coarse, calm), (moderate, calm)] {
            let factor = local_combustion_modulation(&reading, wind, 22, 10, &baselines);
            assert_eq!(factor.reason(), ModulationReason::Normal);
            assert!(COMBUSTION_BOUNDS.contains(factor.value()));
        }
    }

    #[test]
    fn normal_path_multipliers() {
        // Nov 09:00, PM25 200, PM10 350, CO 1.2
        let reading = Reading::new()
            .with(Pollutant::Pm25, 200.0)
            .with(Pollutant::Pm10, 350.0)
            .with(Pollutant::Co, 1.2);
        let factor = local_combustion_modulation(&reading, Some(MetersPerSecond::new(4.0)), 9, 11, &Baselines::default());
        let expected = (200.0 / 228.0 + 350.0 / 365.0) / 2.0 * 1.2 * (1.2 / 1.5);
        assert_relative_eq!(factor.value(), expected, epsilon = 1e-12);
        assert_eq!(
            factor.explanation(),
            "PM2.5=200 vs winter avg 228, PM10=350 vs winter avg 365, winter"
        );
    }

    #[test]
    fn no_particulates_is_neutral_base() {
        let factor = local_combustion_modulation(&Reading::new(), None, 20, 7, &Baselines::default());
        assert_relative_eq!(factor.value(), 1.3);
        assert!(factor.explanation().starts_with("PM unavailable"));
    }

    #[test]
    fn co_multiplier_capped() {
        let reading = Reading::new().with(Pollutant::Pm25, 49.0).with(Pollutant::Co, 30.0);
        let factor = local_combustion_modulation(&reading, Some(MetersPerSecond::new(6.0)), 12, 7, &Baselines::default());
        assert_relative_eq!(factor.value(), 2.0);
        assert!(factor.explanation().contains("CO=30.0 vs avg 1.5"));
    }
}
