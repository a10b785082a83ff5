//! Industry signal: SO2 against a fixed baseline.
//!
//! Vehicles emit negligible SO2, which makes it a clean marker for stacks
//! and industrial boilers.

use super::modulation::{ClampRange, ModulationFactor};
use crate::config::Baselines;

/// Industry factor interval
pub const INDUSTRY_BOUNDS: ClampRange = ClampRange::new(0.3, 3.0);

/// `M = SO2 / baseline`, clamped to [0.3, 3.0]. Missing SO2 is neutral.
pub fn industry_modulation(so2: Option<f64>, baselines: &Baselines) -> ModulationFactor {
    let Some(so2) = so2 else {
        return ModulationFactor::missing("SO2", INDUSTRY_BOUNDS);
    };

    let baseline = baselines.so2_avg;
    ModulationFactor::normal(
        so2 / baseline,
        INDUSTRY_BOUNDS,
        format!("SO2={so2:.0} vs avg {baseline:.0}"),
    )
}
