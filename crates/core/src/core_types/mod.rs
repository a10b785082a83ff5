//! Core types and utilities

pub mod meteorology;
pub mod reading;
pub mod units;

pub use meteorology::{BoundaryLayerClass, FireActivity, Meteorology};
pub use reading::{Pollutant, Reading};
pub use units::*;
