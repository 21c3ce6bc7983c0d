//! Risk bands for a liquidation-time estimate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse risk classification of an expected time to liquidation.
///
/// Bucket edges in days: 1, 7, 30, 90, 365.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Under a day.
    Extreme,
    /// One day to a week.
    VeryHigh,
    /// One to four weeks.
    High,
    /// One to three months.
    Medium,
    /// Three to twelve months.
    Low,
    /// A year or more.
    Safe,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 6] = [
        RiskLevel::Extreme,
        RiskLevel::VeryHigh,
        RiskLevel::High,
        RiskLevel::Medium,
        RiskLevel::Low,
        RiskLevel::Safe,
    ];

    /// NaN carries no survival information and maps to the worst band.
    pub fn from_days(days: f64) -> Self {
        if days.is_nan() || days < 1.0 {
            RiskLevel::Extreme
        } else if days < 7.0 {
            RiskLevel::VeryHigh
        } else if days < 30.0 {
            RiskLevel::High
        } else if days < 90.0 {
            RiskLevel::Medium
        } else if days < 365.0 {
            RiskLevel::Low
        } else {
            RiskLevel::Safe
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Extreme => "EXTREME",
            RiskLevel::VeryHigh => "VERY HIGH",
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
            RiskLevel::Safe => "SAFE",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_edges() {
        assert_eq!(RiskLevel::from_days(0.5), RiskLevel::Extreme);
        assert_eq!(RiskLevel::from_days(1.0), RiskLevel::VeryHigh);
        assert_eq!(RiskLevel::from_days(6.99), RiskLevel::VeryHigh);
        assert_eq!(RiskLevel::from_days(7.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_days(30.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_days(90.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_days(365.0), RiskLevel::Safe);
    }

    #[test]
    fn nan_is_extreme() {
        assert_eq!(RiskLevel::from_days(f64::NAN), RiskLevel::Extreme);
        assert_eq!(RiskLevel::from_days(f64::INFINITY), RiskLevel::Safe);
    }

    #[test]
    fn ordering_runs_from_worst_to_safest() {
        let mut sorted = RiskLevel::ALL;
        sorted.sort();
        assert_eq!(sorted, RiskLevel::ALL);
    }

    #[test]
    fn display_labels() {
        assert_eq!(RiskLevel::VeryHigh.to_string(), "VERY HIGH");
        assert_eq!(RiskLevel::Safe.to_string(), "SAFE");
    }
}
