//! Source categories and qualitative contribution levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pollution source categories from the ARAI/TERI receptor-modelling study.
///
/// Declaration order is the order contributions are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    /// Vehicle exhaust and road traffic
    Traffic,
    /// Agricultural crop-residue burning upwind
    StubbleBurning,
    /// Secondary particulates formed in a shallow mixing layer
    SecondaryAerosols,
    /// Industrial stacks
    Industry,
    /// Windblown and construction dust
    Dust,
    /// Domestic cooking/heating, DG sets, fireworks
    LocalCombustion,
}

impl SourceCategory {
    /// All categories, in reporting order.
    pub const ALL: [SourceCategory; 6] = [
        SourceCategory::Traffic,
        SourceCategory::StubbleBurning,
        SourceCategory::SecondaryAerosols,
        SourceCategory::Industry,
        SourceCategory::Dust,
        SourceCategory::LocalCombustion,
    ];

    /// Wire key (`"stubble_burning"`)
    pub fn key(self) -> &'static str {
        match self {
            SourceCategory::Traffic => "traffic",
            SourceCategory::StubbleBurning => "stubble_burning",
            SourceCategory::SecondaryAerosols => "secondary_aerosols",
            SourceCategory::Industry => "industry",
            SourceCategory::Dust => "dust",
            SourceCategory::LocalCombustion => "local_combustion",
        }
    }

    /// Title-cased display name (`"Stubble Burning"`)
    pub fn title(self) -> &'static str {
        match self {
            SourceCategory::Traffic => "Traffic",
            SourceCategory::StubbleBurning => "Stubble Burning",
            SourceCategory::SecondaryAerosols => "Secondary Aerosols",
            SourceCategory::Industry => "Industry",
            SourceCategory::Dust => "Dust",
            SourceCategory::LocalCombustion => "Local Combustion",
        }
    }
}

impl fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Qualitative level of a normalized contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContributionLevel {
    Low,
    Medium,
    High,
}

impl ContributionLevel {
    /// `High` above 25 %, `Medium` above 15 %, else `Low`.
    ///
    /// Classified on the unrounded percentage.
    pub fn classify(percentage: f64) -> Self {
        if percentage > 25.0 {
            ContributionLevel::High
        } else if percentage > 15.0 {
            ContributionLevel::Medium
        } else {
            ContributionLevel::Low
        }
    }
}

impl fmt::Display for ContributionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContributionLevel::Low => "Low",
            ContributionLevel::Medium => "Medium",
            ContributionLevel::High => "High",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_thresholds_are_exclusive() {
        assert_eq!(ContributionLevel::classify(25.0), ContributionLevel::Medium);
        assert_eq!(ContributionLevel::classify(25.01), ContributionLevel::High);
        assert_eq!(ContributionLevel::classify(15.0), ContributionLevel::Low);
        assert_eq!(ContributionLevel::classify(15.1), ContributionLevel::Medium);
    }

    #[test]
    fn keys_match_serde() {
        for source in SourceCategory::ALL {
            let json = serde_json::to_string(&source).unwrap();
            assert_eq!(json, format!("\"{}\"", source.key()));
        }
    }
}
