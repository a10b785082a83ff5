//! Dust signal: coarse-fraction anomaly plus wind resuspension.
//!
//! Road and construction dust is coarse, so it drags the PM2.5/PM10 ratio
//! below its winter mean. Strong wind lifts more of it. The ratio is floored
//! at 0.2 before inverting so a near-pure-PM10 reading cannot explode.

use super::modulation::{ClampRange, ModulationFactor};
use crate::config::Baselines;
use crate::core_types::{MetersPerSecond, Reading};

/// Dust factor interval
pub const DUST_BOUNDS: ClampRange = ClampRange::new(0.3, 3.0);

/// Smallest PM2.5/PM10 ratio used in the inversion
pub const MIN_PM_RATIO: f64 = 0.2;

/// Wind speed above which resuspension kicks in (m/s)
pub const RESUSPENSION_THRESHOLD: MetersPerSecond = MetersPerSecond::new(5.0);

/// Extra factor per m/s above the threshold
pub const RESUSPENSION_PER_MPS: f64 = 0.1;

/// `M = (ratio_avg / max(PM25/PM10, 0.2)) * (1 + 0.1 * (wind - 5))⁺`,
/// clamped to [0.3, 3.0].
///
/// Neutral when either particulate is missing or PM10 is zero.
pub fn dust_modulation(
    readings: &Reading,
    wind_speed: Option<MetersPerSecond>,
    baselines: &Baselines,
) -> ModulationFactor {
    let Some(ratio) = readings.pm_ratio() else {
        return ModulationFactor::missing("PM data", DUST_BOUNDS);
    };

    let baseline_ratio = baselines.pm_ratio_avg;
    let ratio_factor = baseline_ratio / ratio.max(MIN_PM_RATIO);

    let mut explanation = format!("PM ratio={ratio:.2} vs avg {baseline_ratio:.2}");
    let wind_factor = match wind_speed {
        Some(speed) if speed > RESUSPENSION_THRESHOLD => {
            explanation.push_str(&format!(", wind resuspension ({:.1} m/s)", *speed));
            1.0 + (*speed - *RESUSPENSION_THRESHOLD) * RESUSPENSION_PER_MPS
        }
        _ => 1.0,
    };

    ModulationFactor::normal(ratio_factor * wind_factor, DUST_BOUNDS, explanation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Pollutant;
    use approx::assert_relative_eq;

    fn pm(pm25: f64, pm10: f64) -> Reading {
        Reading::new()
            .with(Pollutant::Pm25, pm25)
            .with(Pollutant::Pm10, pm10)
    }

    #[test]
    fn coarse_reading_raises_factor() {
        let factor = dust_modulation(&pm(200.0, 350.0), Some(MetersPerSecond::new(4.0)), &Baselines::default());
        assert_relative_eq!(factor.value(), 0.625 / (200.0 / 350.0), epsilon = 1e-12);
        assert!(!factor.explanation().contains("resuspension"));
    }

    #[test]
    fn wind_bonus_above_five() {
        // ratio 0.3 -> 0.625/0.3 = 2.083 ; wind 7 -> *1.2 = 2.5
        let factor = dust_modulation(&pm(150.0, 500.0), Some(MetersPerSecond::new(7.0)), &Baselines::default());
        assert_relative_eq!(factor.value(), 2.5, epsilon = 1e-9);
        assert!(factor.explanation().contains("wind resuspension (7.0 m/s)"));

        // exactly 5 m/s: no bonus
        let at_threshold =
            dust_modulation(&pm(150.0, 500.0), Some(MetersPerSecond::new(5.0)), &Baselines::default());
        assert_relative_eq!(at_threshold.value(), 0.625 / 0.3, epsilon = 1e-9);
    }

    #[test]
    fn ratio_floor_and_clamp() {
        // ratio 0.05 floored to 0.2 -> 3.125 -> clamped 3.0
        let factor = dust_modulation(&pm(10.0, 200.0), None, &Baselines::default());
        assert_eq!(factor.value(), 3.0);
        // fine-dominated: ratio 0.95 -> 0.66
        let fine = dust_modulation(&pm(95.0, 100.0), None, &Baselines::default());
        assert_relative_eq!(fine.value(), 0.625 / 0.95, epsilon = 1e-12);
    }

    #[test]
    fn neutral_without_both_particulates() {
        let baselines = Baselines::default();
        let only_fine = Reading::new().with(Pollutant::Pm25, 100.0);
        assert_eq!(dust_modulation(&only_fine, None, &baselines).value(), 1.0);
        assert_eq!(dust_modulation(&pm(100.0, 0.0), None, &baselines).value(), 1.0);
        assert_eq!(
            dust_modulation(&pm(100.0, 0.0), None, &baselines).explanation(),
            "PM data unavailable (using baseline)"
        );
    }
}
