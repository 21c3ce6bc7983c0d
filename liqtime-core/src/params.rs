//! Parameter validation — raw leverage/volatility/drift/funding in, canonical
//! `LiquidationParameters` out.
//!
//! All rates are annualized decimals (0.5 = 50% per year). Derived scalars
//! (barrier distance, net drift, liquidation price) are recomputed from the
//! stored inputs on every call and never cached separately.

use serde::{Deserialize, Serialize};

use crate::analytic::{mean_days, median_days};
use crate::error::ParamError;

/// Unvalidated inputs as they arrive from a caller or a config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawParameters {
    pub leverage: f64,
    pub volatility: f64,
    #[serde(default)]
    pub drift: f64,
    #[serde(default)]
    pub funding: f64,
}

impl RawParameters {
    pub fn new(leverage: f64, volatility: f64, drift: f64, funding: f64) -> Self {
        Self {
            leverage,
            volatility,
            drift,
            funding,
        }
    }

    pub fn validate(self) -> Result<LiquidationParameters, ParamError> {
        LiquidationParameters::new(self.leverage, self.volatility, self.drift, self.funding)
    }
}

/// Validated, immutable model inputs for one analysis request.
///
/// Invariants: `leverage > 1`, `volatility > 0`, all four values finite,
/// `drift - funding` and `volatility^2` finite and non-degenerate, and the
/// closed-form mean and median finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParameters", into = "RawParameters")]
pub struct LiquidationParameters {
    leverage: f64,
    volatility: f64,
    drift: f64,
    funding: f64,
}

impl LiquidationParameters {
    pub fn new(
        leverage: f64,
        volatility: f64,
        drift: f64,
        funding: f64,
    ) -> Result<Self, ParamError> {
        // Negated comparisons so NaN falls into the error branch.
        if !(leverage > 1.0) || !leverage.is_finite() {
            return Err(ParamError::invalid("leverage", leverage, "finite and > 1"));
        }
        if !(volatility > 0.0) || !volatility.is_finite() {
            return Err(ParamError::invalid("volatility", volatility, "finite and > 0"));
        }
        if !drift.is_finite() {
            return Err(ParamError::invalid("drift", drift, "finite"));
        }
        if !funding.is_finite() {
            return Err(ParamError::invalid("funding", funding, "finite"));
        }


        let params = Self {
            leverage,
            volatility,
            drift,
            funding,
        };

        let net_drift = params.net_drift();
        if !net_drift.is_finite() {
            return Err(ParamError::invalid("drift - funding", net_drift, "finite"));
        }
        let variance = params.variance();
        if !(variance > 0.0) || !variance.is_finite() {
            return Err(ParamError::invalid(
                "volatility",
                volatility,
                "finite and non-zero when squared",
            ));
        }
        // Extreme leverage or rates can still push the closed forms to 0 or inf.
        for days in [mean_days(&params), median_days(&params)] {
            if !(days > 0.0) || !days.is_finite() {
                return Err(ParamError::invalid(
                    "estimated days",
                    days,
                    "finite and > 0 for these inputs",
                ));
            }
        }

        Ok(params)
    }

    pub fn leverage(&self) -> f64 {
        self.leverage
    }

    /// Annualized volatility (sigma).
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Annualized drift (mu), before funding.
    pub fn drift(&self) -> f64 {
        self.drift
    }

    /// Annualized funding rate paid by the position.
    pub fn funding(&self) -> f64 {
        self.funding
    }

    /// Log-space distance from entry to the liquidation price:
    /// `b = -ln(1 - 1/leverage)`. Always positive.
    pub fn barrier_distance(&self) -> f64 {
        -(1.0 - 1.0 / self.leverage).ln()
    }

    /// Drift net of funding: `drift - funding`.
    pub fn net_drift(&self) -> f64 {
        self.drift - self.funding
    }

    /// Variance rate `sigma^2`.
    pub fn variance(&self) -> f64 {
        self.volatility * self.volatility
    }

    /// Price at which the margin is exhausted for a long entered at `initial_price`.
    pub fn liquidation_price(&self, initial_price: f64) -> f64 {
        initial_price * (1.0 - 1.0 / self.leverage)
    }
}

impl TryFrom<RawParameters> for LiquidationParameters {
    type Error = ParamError;

    fn try_from(raw: RawParameters) -> Result<Self, Self::Error> {
        raw.validate()
    }
}

impl From<LiquidationParameters> for RawParameters {
    fn from(p: LiquidationParameters) -> Self {
        RawParameters::new(p.leverage, p.volatility, p.drift, p.funding)
    }
}

/// A probability level strictly inside (0, 1).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Percentile(f64);

impl Percentile {
    pub const MEDIAN: Percentile = Percentile(0.5);

    pub fn new(p: f64) -> Result<Self, ParamError> {
        if !(p > 0.0 && p < 1.0) {
            return Err(ParamError::invalid("percentile", p, "in the open interval (0, 1)"));
        }
        Ok(Self(p))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Percentile {
    type Error = ParamError;

    fn try_from(p: f64) -> Result<Self, Self::Error> {
        Percentile::new(p)
    }
}

impl From<Percentile> for f64 {
    fn from(p: Percentile) -> Self {
        p.0
    }
}

/// Validate raw inputs. Equivalent to [`LiquidationParameters::new`].
pub fn validate(
    leverage: f64,
    volatility: f64,
    drift: f64,
    funding: f64,
) -> Result<LiquidationParameters, ParamError> {
    LiquidationParameters::new(leverage, volatility, drift, funding)
}
