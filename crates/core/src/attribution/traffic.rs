//! Traffic signal: NO2 against a time-of-day baseline.
//!
//! NO2 is dominated by vehicle exhaust in Delhi, and its expected level
//! swings strongly through the day, so the comparison baseline depends on
//! the hour: rush hours compare against the rush-hour estimate, night hours
//! against the night estimate, the rest against the annual mean.

use super::modulation::{ClampRange, ModulationFactor};
use crate::config::Baselines;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Traffic factor interval
pub const TRAFFIC_BOUNDS: ClampRange = ClampRange::new(0.3, 3.0);

/// Hour-of-day bucket for the NO2 baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficPeriod {
    /// 07-10 and 17-20
    RushHour,
    /// 00-05
    Night,
    /// Everything else
    Daytime,
}

impl TrafficPeriod {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            7..=10 | 17..=20 => TrafficPeriod::RushHour,
            0..=5 => TrafficPeriod::Night,
            _ => TrafficPeriod::Daytime,
        }
    }

    /// NO2 baseline for this period (µg/m³)
    pub fn baseline(self, baselines: &Baselines) -> f64 {
        match self {
            TrafficPeriod::RushHour => baselines.no2_rush_hour_avg,
            TrafficPeriod::Night => baselines.no2_night_avg,
            TrafficPeriod::Daytime => baselines.no2_overall_avg,
        }
    }
}

impl fmt::Display for TrafficPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrafficPeriod::RushHour => "rush hour",
            TrafficPeriod::Night => "night",
            TrafficPeriod::Daytime => "daytime",
        })
    }
}

/// `M = NO2 / baseline(hour)`, clamped to [0.3, 3.0]. Missing NO2 is neutral.
pub fn traffic_modulation(no2: Option<f64>, hour: u32, baselines: &Baselines) -> ModulationFactor {
    let Some(no2) = no2 else {
        return ModulationFactor::missing("NO2", TRAFFIC_BOUNDS);
    };

    let period = TrafficPeriod::from_hour(hour);
    let baseline = period.baseline(baselines);

    ModulationFactor::normal(
        no2 / baseline,
        TRAFFIC_BOUNDS,
        format!("NO2={no2:.0} vs avg {baseline:.0} ({period})"),
    )
}
