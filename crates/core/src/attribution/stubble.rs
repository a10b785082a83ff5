//! Stubble-burning signal: satellite fire counts gated by season and wind.
//!
//! Crop-residue fires in Punjab and Haryana only reach Delhi when two things
//! line up: it is harvest season, and the wind blows from the north-west.
//! Both are hard gates applied before the fire-count ratio, so an easterly
//! in November contributes nothing no matter how many fires are burning.
//!
//! # Gates
//!
//! ```text
//! Season:  Oct-Nov            -> 1.0
//!          Dec-Jan            -> 0.5   (late-season residual)
//!          otherwise          -> closed (factor 0)
//!
//! Wind:    [250°, 340°]       -> 1.0   (from NW, Punjab corridor)
//!          [200°, 250°)       -> 0.5
//!          (340°, 360°]       -> 0.5
//!          unknown            -> 0.5   (uncertain)
//!          otherwise          -> closed (factor 0)
//!
//! M = (fires / season_avg) * season * wind, clamped to [0, 5]
//! ```

use super::modulation::{ClampRange, ModulationFactor};
use crate::config::Baselines;
use crate::core_types::{Degrees, FireActivity};
use serde::{Deserialize, Serialize};

/// Stubble-burning factor interval
pub const STUBBLE_BOUNDS: ClampRange = ClampRange::new(0.0, 5.0);

/// Harvest calendar bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StubbleSeason {
    /// October and November
    Primary,
    /// December and January
    LateResidual,
    /// Rest of the year
    Closed,
}

impl StubbleSeason {
    pub fn from_month(month: u32) -> Self {
        match month {
            10 | 11 => StubbleSeason::Primary,
            12 | 1 => StubbleSeason::LateResidual,
            _ => StubbleSeason::Closed,
        }
    }

    /// Seasonal discount applied to the fire ratio
    pub fn discount(self) -> f64 {
        match self {
            StubbleSeason::Primary => 1.0,
            StubbleSeason::LateResidual => 0.5,
            StubbleSeason::Closed => 0.0,
        }
    }
}

/// Wind sector relative to the Punjab fire belt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindSector {
    /// Squarely from the north-west
    Northwest,
    /// Off-axis but still partly from the fire belt
    PartialNorthwest,
    /// No direction reported
    Unknown,
    /// Cannot carry smoke from the fire belt
    Other,
}

impl WindSector {
    /// Bucket a raw direction. Values are not wrapped, so 360° is the
    /// partial sector and anything outside `[0, 360]` falls into `Other`.
    pub fn from_direction(direction: Option<Degrees>) -> Self {
        match direction.map(Degrees::value) {
            None => WindSector::Unknown,
            Some(d) if (250.0..=340.0).contains(&d) => WindSector::Northwest,
            Some(d) if (200.0..250.0).contains(&d) || (d > 340.0 && d <= 360.0) => {
                WindSector::PartialNorthwest
            }
            Some(_) => WindSector::Other,
        }
    }

    /// Transport weight for this sector
    pub fn weight(self) -> f64 {
        match self {
            WindSector::Northwest => 1.0,
            WindSector::PartialNorthwest | WindSector::Unknown => 0.5,
            WindSector::Other => 0.0,
        }
    }

    fn describe(self, direction: Option<Degrees>) -> String {
        let d = direction.map_or(0.0, Degrees::value);
        match self {
            WindSector::Northwest => format!("wind from NW ({d:.0}°)"),
            WindSector::PartialNorthwest => format!("wind partially from NW ({d:.0}°)"),
            WindSector::Unknown => "wind unknown".to_string(),
            WindSector::Other => format!("wind from wrong direction ({d:.0}°)"),
        }
    }
}

/// Fire-count factor for crop-residue burning.
///
/// Gate order: season, then wind, then fire count. A closed season or a
/// wrong wind returns zero without looking at the fires; zero fires returns
/// zero regardless of season and wind.
pub fn stubble_modulation(
    fires: FireActivity,
    wind_direction: Option<Degrees>,
    month: u32,
    baselines: &Baselines,
) -> ModulationFactor {
    let season = StubbleSeason::from_month(month);
    if season == StubbleSeason::Closed {
        return ModulationFactor::season_closed("stubble", STUBBLE_BOUNDS);
    }

    let sector = WindSector::from_direction(wind_direction);
    if sector == WindSector::Other {
        return ModulationFactor::wind_closed(
            wind_direction.map_or(0.0, Degrees::value),
            STUBBLE_BOUNDS,
        );
    }

    if fires.is_none() {
        return ModulationFactor::normal(0.0, STUBBLE_BOUNDS, "No fires detected");
    }

    let baseline = baselines.fires_stubble_season_avg;
    let raw = (f64::from(fires.count()) / baseline) * season.discount() * sector.weight();

    let mut explanation = format!(
        "{} fires vs avg {baseline:.0}, {}",
        fires.count(),
        sector.describe(wind_direction)
    );
    if season == StubbleSeason::LateResidual {
        explanation.push_str(", late-season residual");
    }

    ModulationFactor::normal(raw, STUBBLE_BOUNDS, explanation)
}
