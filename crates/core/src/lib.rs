//! Airshed Core Library
//!
//! Hourly source attribution and short-range outfall forecasting for urban
//! particulate pollution, calibrated on Delhi NCR studies.
//!
//! ## Components
//!
//! - [`geo`]: great-circle distance, bearing and the upwind test
//! - [`dispersion`]: straight-line wind advection with exponential decay
//! - [`attribution`]: validated source priors modulated by real-time signals
//!   (NO2, fire counts, boundary-layer height, SO2, PM ratio, CO) and
//!   renormalized to 100 %
//!
//! Everything is a pure function of its inputs plus a read-only
//! [`AirshedConfig`], so engines can be shared freely across threads.
//!
//! ```
//! use airshed_core::{AirshedConfig, AttributionEngine, AttributionRequest, Reading};
//! use airshed_core::core_types::{Degrees, FireActivity, Meteorology, MetersPerSecond, Pollutant};
//!
//! let config = AirshedConfig::default();
//! let engine = AttributionEngine::new(&config);
//! let request = AttributionRequest::parse(
//!     "2025-11-08T09:00:00",
//!     Reading::new().with(Pollutant::No2, 120.0),
//!     Meteorology::UNKNOWN.with_wind(MetersPerSecond::new(4.0), Degrees::new(308.0)),
//!     FireActivity::new(150),
//! )
//! .unwrap();
//!
//! let result = engine.attribute_request(&request);
//! assert!((result.percentage_total() - 100.0).abs() <= 0.2);
//! ```

// Core types and utilities
pub mod core_types;
pub mod error;
pub mod geo;

// Reference tables
pub mod config;

// Engines
pub mod attribution;
pub mod dispersion;

// Re-export core types
pub use core_types::{BoundaryLayerClass, FireActivity, Meteorology, Pollutant, Reading};
pub use error::{AirshedError, Result};
pub use geo::GeoPoint;

// Re-export configuration
pub use config::{AirshedConfig, Baselines, DispersionConfig, Priors};

// Re-export engines
pub use attribution::{
    AttributionEngine, AttributionRequest, AttributionResult, Confidence, Contribution, ContributionLevel,
    ModulationFactor, ModulationReason, SourceCategory,
};
pub use dispersion::{DispersionForecaster, OutfallForecast, OutfallPoint, OutfallRequest, WindAngleConvention};
