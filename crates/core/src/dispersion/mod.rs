//! Short-range outfall forecast: straight-line wind advection with
//! distance decay.
//!
//! Not a transport model. The plume centre is pushed along a constant wind
//! vector for a few hours on a flat-earth grid, and a single exponential
//! stands in for dilution:
//!
//! ```text
//! position(h) = source + v * h / km_per_degree        (deg lat, deg lon)
//! distance(h) = |v| * h                                (km)
//! intensity   = exp(-distance / (3 * D * u))          clamped to [0, 1]
//! D           = max(BLH / 800, 0.4)   if BLH known, else 0.6
//! u           = wind speed, 1.0 when unknown or zero
//! ```
//!
//! Each hourly step advances the plume by the numeric wind speed in km.
//! Zero wind gives a stationary plume even though the decay term
//! substitutes 1 m/s.
//!
//! # Wind angle convention
//!
//! [`WindAngleConvention::Mathematical`] (the default) decomposes the
//! direction as a standard angle, `x = u cos θ` east and `y = u sin θ` north,
//! reproducing the published forecast numbers. [`WindAngleConvention::Meteorological`]
//! reads it as a compass bearing the wind blows FROM and displaces the plume
//! toward `θ + 180°`. Distances and intensities are identical under both;
//! only the projected coordinates differ.

use crate::config::DispersionConfig;
use crate::core_types::units::round_dp;
use crate::core_types::{Degrees, Kilometers, Meters, MetersPerSecond};
use crate::geo::GeoPoint;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a wind direction is turned into a displacement vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindAngleConvention {
    /// 0° along +x (east), counter-clockwise
    #[default]
    Mathematical,
    /// 0° = wind from north, clockwise; plume moves downwind
    Meteorological,
}

impl WindAngleConvention {
    /// Hourly displacement `(east, north)` in km.
    pub fn displacement(self, speed: MetersPerSecond, direction: Degrees) -> Vector2<f64> {
        match self {
            WindAngleConvention::Mathematical => {
                let theta = direction.to_radians();
                Vector2::new(*speed * theta.cos(), *speed * theta.sin())
            }
            WindAngleConvention::Meteorological => {
                let toward = (*direction + 180.0).to_radians();
                Vector2::new(*speed * toward.sin(), *speed * toward.cos())
            }
        }
    }
}

/// Unrounded plume centre after `hour` hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlumePosition {
    pub hour: u32,
    pub position: GeoPoint,
    pub distance: Kilometers,
}

/// One forecast point as reported on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutfallPoint {
    pub hour: u32,
    /// Five decimals
    pub latitude: f64,
    pub longitude: f64,
    /// Two decimals
    pub distance_km: f64,
    /// In [0, 1], three decimals
    pub intensity_factor: f64,
    /// Reading scaled by the intensity factor, one decimal
    pub predicted_concentration: f64,
}

/// Dispersion request: source location, wind vector, optional BLH and reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutfallRequest {
    #[serde(flatten)]
    pub source: GeoPoint,
    #[serde(default)]
    pub wind_speed: Option<MetersPerSecond>,
    #[serde(default, rename = "wind_dir")]
    pub wind_direction: Option<Degrees>,
    #[serde(default, rename = "blh")]
    pub boundary_layer_height: Option<Meters>,
    /// Horizon in hours; the configured default when absent
    #[serde(default)]
    pub hours: Option<u32>,
    /// Current concentration to project downwind (µg/m³)
    #[serde(default)]
    pub reading: Option<f64>,
}

impl OutfallRequest {
    pub fn new(source: GeoPoint, wind_speed: MetersPerSecond, wind_direction: Degrees) -> Self {
        OutfallRequest {
            source,
            wind_speed: Some(wind_speed),
            wind_direction: Some(wind_direction),
            boundary_layer_height: None,
            hours: None,
            reading: None,
        }
    }

    pub fn with_blh(mut self, blh: Meters) -> Self {
        self.boundary_layer_height = Some(blh);
        self
    }

    pub fn with_hours(mut self, hours: u32) -> Self {
        self.hours = Some(hours);
        self
    }

    pub fn with_reading(mut self, reading: f64) -> Self {
        self.reading = Some(reading);
        self
    }
}

/// Forecast response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfallForecast {
    pub source: GeoPoint,
    pub points: Vec<OutfallPoint>,
}

impl OutfallForecast {
    /// True when no wind vector was available.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Re-scale predicted concentrations for another reading. A missing
    /// reading counts as zero.
    pub fn with_reading(mut self, reading: Option<f64>) -> Self {
        let reading = reading.unwrap_or(0.0);
        for point in &mut self.points {
            point.predicted_concentration = round_dp(reading * point.intensity_factor, 1);
        }
        self
    }
}

/// Straight-line advection over a borrowed [`DispersionConfig`].
#[derive(Debug, Clone, Copy)]
pub struct DispersionForecaster<'a> {
    config: &'a DispersionConfig,
}

impl<'a> DispersionForecaster<'a> {
    pub fn new(config: &'a DispersionConfig) -> Self {
        DispersionForecaster { config }
    }

    /// Hourly plume positions for `hours` hours.
    ///
    /// Empty when either wind component is unknown or `hours` is zero.
    pub fn forecast(
        &self,
        source: GeoPoint,
        wind_speed: Option<MetersPerSecond>,
        wind_direction: Option<Degrees>,
        hours: u32,
    ) -> Vec<PlumePosition> {
        let (Some(speed), Some(direction)) = (wind_speed, wind_direction) else {
            debug!(?wind_speed, ?wind_direction, "wind vector unknown, no outfall forecast");
            return Vec::new();
        };

        let step = self.config.angle_convention.displacement(speed, direction);
        let km_per_degree = self.config.km_per_degree;

        (1..=hours)
            .map(|hour| {
                let offset = step * f64::from(hour);
                PlumePosition {
                    hour,
                    position: GeoPoint::new(
                        source.latitude + offset.y / km_per_degree,
                        source.longitude + offset.x / km_per_degree,
                    ),
                    distance: Kilometers::new(offset.norm()),
                }
            })
            .collect()
    }

    /// Dispersion term `D` from the boundary-layer height.
    pub fn dispersion(&self, blh: Option<Meters>) -> f64 {
        match blh {
            Some(h) if *h != 0.0 => (*h / self.config.blh_reference_m).max(self.config.min_dispersion),
            _ => self.config.unknown_blh_dispersion,
        }
    }

    /// Relative concentration remaining after travelling `distance`, in [0, 1].
    pub fn intensity(&self, distance: Kilometers, wind_speed: Option<MetersPerSecond>, blh: Option<Meters>) -> f64 {
        let speed = match wind_speed {
            Some(s) if *s != 0.0 => *s,
            _ => 1.0,
        };
        let decay = self.config.decay_scale * self.dispersion(blh) * speed;
        (-*distance / decay).exp().clamp(0.0, 1.0)
    }

    /// Full wire forecast: positions, rounded intensities and predicted
    /// concentrations.
    pub fn outfall(&self, request: &OutfallRequest) -> OutfallForecast {
        let hours = request.hours.unwrap_or(self.config.default_hours);
        let points = self
            .forecast(request.source, request.wind_speed, request.wind_direction, hours)
            .into_iter()
            .map(|p| {
                let distance_km = round_dp(*p.distance, 2);
                let intensity = self.intensity(
                    Kilometers::new(distance_km),
                    request.wind_speed,
                    request.boundary_layer_height,
                );
                OutfallPoint {
                    hour: p.hour,
                    latitude: round_dp(p.position.latitude, 5),
                    longitude: round_dp(p.position.longitude, 5),
                    distance_km,
                    intensity_factor: round_dp(intensity, 3),
                    predicted_concentration: 0.0,
                }
            })
            .collect();

        OutfallForecast {
            source: request.source,
            points,
        }
        .with_reading(request.reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const DELHI: GeoPoint = GeoPoint::new(28.65, 77.32);

    #[test]
    fn mathematical_zero_degrees_moves_east() {
        let config = DispersionConfig::default();
        let plume = DispersionForecaster::new(&config).forecast(
            DELHI,
            Some(MetersPerSecond::new(5.0)),
            Some(Degrees::NORTH),
            3,
        );
        assert_eq!(plume.len(), 3);
        assert_abs_diff_eq!(plume[0].position.latitude, 28.65, epsilon = 1e-12);
        assert_abs_diff_eq!(plume[2].position.longitude, 77.32 + 15.0 / 111.0, epsilon = 1e-12);
        assert_abs_diff_eq!(*plume[1].distance, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn meteorological_north_wind_moves_south() {
        let config = DispersionConfig {
            angle_convention: WindAngleConvention::Meteorological,
            ..DispersionConfig::default()
        };
        let plume = DispersionForecaster::new(&config).forecast(
            DELHI,
            Some(MetersPerSecond::new(5.0)),
            Some(Degrees::NORTH),
            1,
        );
        assert!(plume[0].position.latitude < DELHI.latitude);
        assert_abs_diff_eq!(plume[0].position.longitude, DELHI.longitude, epsilon = 1e-9);
        assert_abs_diff_eq!(*plume[0].distance, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn missing_wind_component_short_circuits() {
        let config = DispersionConfig::default();
        let forecaster = DispersionForecaster::new(&config);
        assert!(forecaster.forecast(DELHI, None, Some(Degrees::new(90.0)), 3).is_empty());
        assert!(forecaster.forecast(DELHI, Some(MetersPerSecond::new(2.0)), None, 3).is_empty());
        assert!(forecaster
            .forecast(DELHI, Some(MetersPerSecond::new(2.0)), Some(Degrees::new(90.0)), 0)
            .is_empty());
    }

    #[test]
    fn zero_wind_is_stationary_but_decay_uses_unit_speed() {
        let config = DispersionConfig::default();
        let forecaster = DispersionForecaster::new(&config);
        let plume = forecaster.forecast(DELHI, Some(MetersPerSecond::CALM), Some(Degrees::new(45.0)), 2);
        assert!(plume.iter().all(|p| *p.distance == 0.0 && p.position == DELHI));

        let calm = forecaster.intensity(Kilometers::new(3.0), Some(MetersPerSecond::CALM), None);
        let unit = forecaster.intensity(Kilometers::new(3.0), Some(MetersPerSecond::new(1.0)), None);
        assert_eq!(calm, unit);
    }

    #[test]
    fn dispersion_term() {
        let config = DispersionConfig::default();
        let forecaster = DispersionForecaster::new(&config);
        assert_eq!(forecaster.dispersion(None), 0.6);
        assert_eq!(forecaster.dispersion(Some(Meters::new(0.0))), 0.6);
        assert_eq!(forecaster.dispersion(Some(Meters::new(160.0))), 0.4);
        assert_eq!(forecaster.dispersion(Some(Meters::new(1600.0))), 2.0);
    }

    #[test]
    fn predicted_concentration_scales_reading() {
        let config = DispersionConfig::default();
        let request = OutfallRequest::new(DELHI, MetersPerSecond::new(5.0), Degrees::NORTH).with_reading(250.0);
        let forecast = DispersionForecaster::new(&config).outfall(&request);
        assert_eq!(forecast.points.len(), 3);
        assert_eq!(forecast.points[0].intensity_factor, 0.574);
        assert_eq!(forecast.points[0].predicted_concentration, 143.5);

        let unscaled = forecast.with_reading(None);
        assert!(unscaled.points.iter().all(|p| p.predicted_concentration == 0.0));
    }
}
