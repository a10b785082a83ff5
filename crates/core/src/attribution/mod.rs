//! Source attribution by validated-prior modulation.
//!
//! Fixed baseline shares from offline receptor modelling are scaled by six
//! independent real-time signals and renormalized to 100 %.
//!
//! # Scientific Background
//!
//! Receptor models (PMF, CMB) give long-run source shares but say nothing
//! about a particular hour. Each share is therefore modulated by the signal
//! most diagnostic of its source:
//!
//! | Source             | Signal                                  | Interval     |
//! |--------------------|-----------------------------------------|--------------|
//! | Traffic            | NO2 vs hour-of-day baseline             | [0.3, 3.0]   |
//! | Stubble burning    | VIIRS fire count, season and wind gates | [0, 5.0]     |
//! | Secondary aerosols | inverse boundary-layer height           | [0.5, 2.0]   |
//! | Industry           | SO2 vs annual mean                      | [0.3, 3.0]   |
//! | Dust               | inverse PM2.5/PM10 ratio, wind          | [0.3, 3.0]   |
//! | Local combustion   | PM anomaly, hour, season, CO            | [0.3, 10.0]  |
//!
//! Local combustion additionally recognises a fireworks signature and
//! replaces its factor with a PM2.5 anomaly capped at 25.
//!
//! Season and hour buckets differ per signal and are kept as separate
//! enumerations ([`TrafficPeriod`], [`StubbleSeason`], [`MixingSeason`],
//! [`CombustionSeason`]).
//!
//! # References
//!
//! - ARAI & TERI (2018). "Source Apportionment of PM2.5 & PM10 of Delhi NCR."
//! - Guttikunda, S.K. & Calori, G. (2013). "A GIS based emissions inventory at
//!   1 km × 1 km spatial resolution for air pollution analysis in Delhi, India."
//!   Atmospheric Environment, 67, 101-111.

pub mod combustion;
pub mod dust;
pub mod engine;
pub mod industry;
pub mod modulation;
pub mod secondary;
pub mod source;
pub mod stubble;
pub mod traffic;

pub use combustion::{local_combustion_modulation, CombustionSeason, FireworksSignature, HourWindow};
pub use dust::dust_modulation;
pub use engine::{
    parse_timestamp, AttributionEngine, AttributionRequest, AttributionResult, BaselinesUsed, Confidence,
    Contribution, METHOD,
};
pub use industry::industry_modulation;
pub use modulation::{ClampRange, ModulationFactor, ModulationReason, NEUTRAL_FACTOR};
pub use secondary::{secondary_modulation, MixingSeason, TrappingLevel};
pub use source::{ContributionLevel, SourceCategory};
pub use stubble::{stubble_modulation, StubbleSeason, WindSector};
pub use traffic::{traffic_modulation, TrafficPeriod};
