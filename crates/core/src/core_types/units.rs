//! Semantic unit types for type-safe physical quantity handling
//!
//! This module provides newtype wrappers for the quantities that flow through
//! attribution and outfall forecasting, so a boundary-layer height in meters
//! cannot be handed to a function expecting a wind speed, and a compass
//! bearing cannot be confused with a travelled distance.
//!
//! # Design Philosophy
//! - All quantities use f64: the published baselines are ratios of small
//!   integers and the normalized output is compared at one-decimal precision
//! - Implements common traits (Add, Sub, Mul, Div, Ord, Display, etc.)
//! - Serde support: every newtype serializes as its bare number, so wire
//!   payloads stay `{"wind_speed": 4.0}` rather than `{"wind_speed": [4.0]}`
//! - Total ordering via Ord trait (NaN handled as greater than all values)
//! - Constructors never panic: out-of-range meteorology is the caller's
//!   problem, and the engines degrade gracefully instead
//!
//! # Usage
//! ```
//! use airshed_core::core_types::units::{Degrees, Meters};
//!
//! let heading = Degrees::new(-90.0).normalized();
//! assert_eq!(heading, Degrees::new(270.0));
//!
//! let blh = Meters::new(1500.0);
//! assert!((*blh.to_kilometers() - 1.5).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Deref, Div, Mul, Sub};

/// Compare f64 values with total ordering using Rust's built-in `total_cmp`
#[inline]
fn f64_total_cmp(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

/// Round to a fixed number of decimal places, half away from zero.
///
/// Used for every value that leaves the core on the wire (percentages to 1 dp,
/// factors to 2 dp, intensity to 3 dp, coordinates to 5 dp).
#[inline]
#[must_use]
pub fn round_dp(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (value * scale).round() / scale
}

/// Shared boilerplate for the f64 quantity newtypes: total ordering, deref to
/// the raw value, conversions and same-unit arithmetic.
macro_rules! quantity {
    ($name:ident, $fmt:literal) => {
        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                f64_total_cmp(self.0, other.0)
            }
        }

        impl Deref for $name {
            type Target = f64;
            #[inline]
            fn deref(&self) -> &f64 {
                &self.0
            }
        }

        impl From<f64> for $name {
            fn from(v: f64) -> Self {
                $name(v)
            }
        }

        impl From<$name> for f64 {
            fn from(v: $name) -> f64 {
                v.0
            }
        }

        impl Add for $name {
            type Output = $name;
            fn add(self, rhs: $name) -> $name {
                $name(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = $name;
            fn sub(self, rhs: $name) -> $name {
                $name(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $name {
            type Output = $name;
            fn mul(self, rhs: f64) -> $name {
                $name(self.0 * rhs)
            }
        }

        impl Div<f64> for $name {
            type Output = $name;
            fn div(self, rhs: f64) -> $name {
                $name(self.0 / rhs)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, $fmt, self.0)
            }
        }
    };
}

// ============================================================================
// ANGLE TYPES
// ============================================================================

/// Angle in degrees.
///
/// Used both for compass headings (0 = North, clockwise) and for the
/// direction a wind blows FROM. No range is enforced on construction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Degrees(f64);

quantity!(Degrees, "{:.1}°");

impl Degrees {
    /// Due north.
    pub const NORTH: Degrees = Degrees(0.0);

    /// Create a new angle in degrees
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Degrees(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Convert to radians
    #[inline]
    #[must_use]
    pub fn to_radians(self) -> f64 {
        self.0.to_radians()
    }

    /// Wrap into `[0, 360)`.
    #[inline]
    #[must_use]
    pub fn normalized(self) -> Degrees {
        Degrees(self.0.rem_euclid(360.0))
    }
}

// ============================================================================
// DISTANCE/LENGTH TYPES
// ============================================================================

/// Distance or height in meters.
///
/// Boundary-layer heights are carried in this type. A non-positive height is
/// representable on purpose: the secondary-aerosol signal treats it as
/// unknown rather than rejecting it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Meters(f64);

quantity!(Meters, "{:.0} m");

impl Meters {
    /// Create a new distance in meters
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Meters(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Convert to kilometers
    #[inline]
    #[must_use]
    pub fn to_kilometers(self) -> Kilometers {
        Kilometers(self.0 / 1000.0)
    }
}

/// Distance in kilometers
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Kilometers(f64);

quantity!(Kilometers, "{:.2} km");

impl Kilometers {
    /// Create a new Kilometers value.
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Kilometers(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Convert to meters
    #[inline]
    #[must_use]
    pub fn to_meters(self) -> Meters {
        Meters(self.0 * 1000.0)
    }
}

impl From<Kilometers> for Meters {
    fn from(k: Kilometers) -> Meters {
        k.to_meters()
    }
}

// ============================================================================
// VELOCITY TYPES
// ============================================================================

/// Wind speed in meters per second
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MetersPerSecond(f64);

quantity!(MetersPerSecond, "{:.1} m/s");

impl MetersPerSecond {
    /// Calm air.
    pub const CALM: MetersPerSecond = MetersPerSecond(0.0);

    /// Create a new wind speed
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        MetersPerSecond(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

// ============================================================================
// DIMENSIONLESS TYPES
// ============================================================================

/// Percentage value (0-100 for shares, unbounded for intermediate math)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Percent(f64);

quantity!(Percent, "{:.1}%");

impl Percent {
    /// Create a new percentage
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Percent(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}
