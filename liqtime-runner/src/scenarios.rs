//! Named trading setups evaluated side by side.

use serde::Serialize;

use liqtime_core::{mean_days, median_days, LiquidationParameters, ParamError, RiskLevel};

/// A named volatility / leverage combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scenario {
    pub name: &'static str,
    /// Annualized volatility as a decimal.
    pub volatility: f64,
    pub leverage: f64,
}

/// Stock, crypto, altcoin and meme setups, calmest first.
pub const STANDARD_SCENARIOS: [Scenario; 11] = [
    Scenario {
        name: "Conservative Stock",
        volatility: 0.15,
        leverage: 2.0,
    },
    Scenario {
        name: "Moderate Stock",
        volatility: 0.20,
        leverage: 3.0,
    },
    Scenario {
        name: "Aggressive Stock",
        volatility: 0.30,
        leverage: 5.0,
    },
    Scenario {
        name: "Conservative Crypto",
        volatility: 0.40,
        leverage: 2.0,
    },
    Scenario {
        name: "Moderate Crypto",
        volatility: 0.50,
        leverage: 5.0,
    },
    Scenario {
        name: "Aggressive Crypto",
        volatility: 0.70,
        leverage: 10.0,
    },
    Scenario {
        name: "Altcoin Conservative",
        volatility: 0.80,
        leverage: 3.0,
    },
    Scenario {
        name: "Altcoin Moderate",
        volatility: 1.00,
        leverage: 5.0,
    },
    Scenario {
        name: "Altcoin Aggressive",
        volatility: 1.00,
        leverage: 10.0,
    },
    Scenario {
        name: "Meme Coin",
        volatility: 1.50,
        leverage: 10.0,
    },
    Scenario {
        name: "Ultra Degen",
        volatility: 2.00,
        leverage: 20.0,
    },
];

/// Analytic estimates for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioResult {
    pub name: &'static str,
    pub volatility: f64,
    pub leverage: f64,
    pub mean_days: f64,
    pub median_days: f64,
    /// Classified from the mean.
    pub risk: RiskLevel,
}

impl Scenario {
    pub fn params(&self, drift: f64, funding: f64) -> Result<LiquidationParameters, ParamError> {
        LiquidationParameters::new(self.leverage, self.volatility, drift, funding)
    }

    pub fn evaluate(&self, drift: f64, funding: f64) -> Result<ScenarioResult, ParamError> {
        let params = self.params(drift, funding)?;
        let mean = mean_days(&params);
        Ok(ScenarioResult {
            name: self.name,
            volatility: self.volatility,
            leverage: self.leverage,
            mean_days: mean,
            median_days: median_days(&params),
            risk: RiskLevel::from_days(mean),
        })
    }
}

/// Evaluate every standard scenario at the given drift and funding.
pub fn evaluate_scenarios(drift: f64, funding: f64) -> Result<Vec<ScenarioResult>, ParamError> {
    STANDARD_SCENARIOS
        .iter()
        .map(|s| s.evaluate(drift, funding))
        .collect()
}
