//! Structured modulation factors.
//!
//! Every signal produces a [`ModulationFactor`]: the clamped multiplier, a
//! machine-checkable [`ModulationReason`], the interval the value was
//! clamped into, and a human-readable explanation. Constructors are the only
//! way to build one, and the clamping constructors apply the bounds, so a
//! factor outside its declared interval cannot exist.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a factor has the value it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModulationReason {
    /// The driving signal was not measured; factor is the neutral 1.0
    NeutralMissingData,
    /// The calendar gate is shut (stubble burning outside its season)
    SeasonalGateClosed,
    /// The wind blows from a sector that cannot carry this source
    WindGateClosed,
    /// An anomaly signature replaced the normal calculation
    AnomalyOverride,
    /// Observed signal compared against its baseline
    Normal,
}

impl fmt::Display for ModulationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModulationReason::NeutralMissingData => "neutral_missing_data",
            ModulationReason::SeasonalGateClosed => "seasonal_gate_closed",
            ModulationReason::WindGateClosed => "wind_gate_closed",
            ModulationReason::AnomalyOverride => "anomaly_override",
            ModulationReason::Normal => "normal",
        })
    }
}

/// Closed interval a factor is clamped into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClampRange {
    pub min: f64,
    pub max: f64,
}

impl ClampRange {
    pub const fn new(min: f64, max: f64) -> Self {
        ClampRange { min, max }
    }

    /// Clamp into `[min, max]`. NaN collapses to the lower bound.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl fmt::Display for ClampRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Neutral multiplier used when a signal is missing.
pub const NEUTRAL_FACTOR: f64 = 1.0;

/// Dimensionless multiplier applied to one source's prior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModulationFactor {
    value: f64,
    reason: ModulationReason,
    bounds: ClampRange,
    explanation: String,
}

impl ModulationFactor {
    /// Observed signal vs baseline, clamped into `bounds`.
    pub fn normal(raw: f64, bounds: ClampRange, explanation: impl Into<String>) -> Self {
        ModulationFactor {
            value: bounds.clamp(raw),
            reason: ModulationReason::Normal,
            bounds,
            explanation: explanation.into(),
        }
    }

    /// Anomaly path, clamped into its own (wider) `bounds`.
    pub fn anomaly(raw: f64, bounds: ClampRange, explanation: impl Into<String>) -> Self {
        ModulationFactor {
            value: bounds.clamp(raw),
            reason: ModulationReason::AnomalyOverride,
            bounds,
            explanation: explanation.into(),
        }
    }

    /// Neutral 1.0 because `signal` was not measured.
    pub fn missing(signal: &str, bounds: ClampRange) -> Self {
        ModulationFactor {
            value: bounds.clamp(NEUTRAL_FACTOR),
            reason: ModulationReason::NeutralMissingData,
            bounds,
            explanation: format!("{signal} unavailable (using baseline)"),
        }
    }

    /// Hard zero: the source is out of season.
    pub fn season_closed(source: &str, bounds: ClampRange) -> Self {
        ModulationFactor {
            value: bounds.clamp(0.0),
            reason: ModulationReason::SeasonalGateClosed,
            bounds,
            explanation: format!("Not {source} season"),
        }
    }

    /// Hard zero: the wind cannot carry this source to the receptor.
    pub fn wind_closed(direction: f64, bounds: ClampRange) -> Self {
        ModulationFactor {
            value: bounds.clamp(0.0),
            reason: ModulationReason::WindGateClosed,
            bounds,
            explanation: format!("Wind from wrong direction ({direction:.0}°)"),
        }
    }

    /// Clamped multiplier
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn reason(&self) -> ModulationReason {
        self.reason
    }

    /// Interval the value was clamped into
    pub fn bounds(&self) -> ClampRange {
        self.bounds
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// True when the value sits inside its declared interval
    pub fn is_within_bounds(&self) -> bool {
        self.bounds.contains(self.value)
    }
}

impl fmt::Display for ModulationFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M={:.2} ({}): {}", self.value, self.reason, self.explanation)
    }
}
