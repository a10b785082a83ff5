//! Secondary-aerosol signal: boundary-layer trapping.
//!
//! Secondary particulates (sulphates, nitrates, SOA) form and accumulate
//! when the mixing layer is shallow. The factor is inverted with respect to
//! the other signals: a boundary layer *below* its seasonal mean pushes the
//! factor *up*.
//!
//! This is a model-based estimate of regional/background formation, not a
//! direct measurement, and the explanation says so.

use super::modulation::{ClampRange, ModulationFactor};
use crate::config::Baselines;
use crate::core_types::Meters;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Secondary-aerosol factor interval
pub const SECONDARY_BOUNDS: ClampRange = ClampRange::new(0.5, 2.0);

/// Floor applied to BLH before dividing, so a 20 m inversion cannot blow the
/// ratio up.
pub const BLH_FLOOR: Meters = Meters::new(150.0);

/// Three-way season split used for the BLH baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixingSeason {
    /// November to February
    Winter,
    /// March to May
    Summer,
    /// June to October
    Monsoon,
}

impl MixingSeason {
    pub fn from_month(month: u32) -> Self {
        match month {
            11 | 12 | 1 | 2 => MixingSeason::Winter,
            3..=5 => MixingSeason::Summer,
            _ => MixingSeason::Monsoon,
        }
    }

    /// Seasonal mean boundary-layer height
    pub fn baseline(self, baselines: &Baselines) -> Meters {
        match self {
            MixingSeason::Winter => baselines.blh_winter_avg,
            MixingSeason::Summer => baselines.blh_summer_avg,
            MixingSeason::Monsoon => baselines.blh_monsoon_avg,
        }
    }
}

impl fmt::Display for MixingSeason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MixingSeason::Winter => "winter",
            MixingSeason::Summer => "summer",
            MixingSeason::Monsoon => "monsoon",
        })
    }
}

/// How strongly the observed (unfloored) boundary layer traps pollution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrappingLevel {
    /// Below 300 m
    Severe,
    /// Below 500 m
    Moderate,
    GoodMixing,
}

impl TrappingLevel {
    pub fn from_blh(blh: Meters) -> Self {
        if *blh < 300.0 {
            TrappingLevel::Severe
        } else if *blh < 500.0 {
            TrappingLevel::Moderate
        } else {
            TrappingLevel::GoodMixing
        }
    }
}

impl fmt::Display for TrappingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrappingLevel::Severe => "severe trapping",
            TrappingLevel::Moderate => "moderate trapping",
            TrappingLevel::GoodMixing => "good mixing",
        })
    }
}

/// `M = baseline(season) / max(BLH, 150)`, clamped to [0.5, 2.0].
///
/// Missing or non-positive BLH is neutral.
pub fn secondary_modulation(blh: Option<Meters>, month: u32, baselines: &Baselines) -> ModulationFactor {
    let blh = match blh {
        Some(h) if *h > 0.0 => h,
        _ => return ModulationFactor::missing("BLH", SECONDARY_BOUNDS),
    };

    let season = MixingSeason::from_month(month);
    let baseline = season.baseline(baselines);
    let effective = blh.max(BLH_FLOOR);
    let trapping = TrappingLevel::from_blh(blh);

    ModulationFactor::normal(
        *baseline / *effective,
        SECONDARY_BOUNDS,
        format!(
            "Inferred from BLH trapping, not directly measured: \
             BLH={:.0}m vs {season} avg {:.0}m ({trapping})",
            *blh, *baseline
        ),
    )
}
