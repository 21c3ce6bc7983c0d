//! Closed-form first-passage-time estimates for a GBM price hitting the
//! liquidation barrier.
//!
//! All three estimators are heuristics tuned for output parity, not exact
//! inverse-Gaussian results. Regime thresholds and constants are fixed:
//!
//! | estimator  | regime switch                       | constant          |
//! |------------|-------------------------------------|-------------------|
//! | mean       | `net_drift + sigma^2/2 <= 0`        | `365/(L*sigma^2)` |
//! | median     | `net_drift < -sigma^2`              | `sqrt(2/pi)`      |
//! | percentile | `net_drift + sigma^2/2 <= 0`        | `mu` fallback/cap 100 |
//!
//! Results are in calendar days (years x 365).

use serde::{Deserialize, Serialize};

use crate::error::ParamError;
use crate::normal::inverse_normal_cdf;
use crate::params::{LiquidationParameters, Percentile};

pub const DAYS_PER_YEAR: f64 = 365.0;

/// Fallback and cap for the inverse-Gaussian mean parameter (years).
///
/// Unverified numerical guard: it keeps the percentile formula finite when
/// the drift denominator is non-positive and bounds it otherwise.
pub const MU_PARAM_CAP: f64 = 100.0;

/// Lower clamp for percentile estimates (days).
pub const MIN_PERCENTILE_DAYS: f64 = 0.1;
/// Upper clamp for percentile estimates (days).
pub const MAX_PERCENTILE_DAYS: f64 = 10_000.0;

/// `sqrt(2/pi)`: skew correction applied to the variance term of the median.
pub const MEDIAN_SKEW_FACTOR: f64 = 0.797_884_560_802_865_4;

/// Expected days until the barrier is hit.
///
/// When `net_drift + sigma^2/2 <= 0` the ratio `b / denom` is undefined or
/// negative; the estimate falls back to `365 / (leverage * sigma^2)`.
pub fn mean_days(params: &LiquidationParameters) -> f64 {
    let denom = params.net_drift() + 0.5 * params.variance();
    if denom <= 0.0 {
        return DAYS_PER_YEAR / (params.leverage() * params.variance());
    }
    params.barrier_distance() / denom * DAYS_PER_YEAR
}

/// Median days until the barrier is hit.
pub fn median_days(params: &LiquidationParameters) -> f64 {
    let b = params.barrier_distance();
    let net_drift = params.net_drift();
    let variance = params.variance();

    let years = if net_drift < -variance {
        b / net_drift.abs()
    } else {
        let effective_drift = net_drift.abs() + variance * MEDIAN_SKEW_FACTOR;
        b / effective_drift
    };

    years * DAYS_PER_YEAR
}

/// Days by which a fraction `percentile` of positions are liquidated.
///
/// The median delegates to [`median_days`] so both agree exactly. Other
/// levels use a normal approximation to the inverse-Gaussian quantile,
/// clamped to `[0.1, 10000]` days.
pub fn percentile_days(params: &LiquidationParameters, percentile: Percentile) -> f64 {
    if percentile.value() == 0.5 {
        return median_days(params);
    }

    let b = params.barrier_distance();
    let denom = params.net_drift() + 0.5 * params.variance();

    let mu_param = if denom > 0.0 { b / denom } else { MU_PARAM_CAP };
    let mu_param = mu_param.min(MU_PARAM_CAP);
    let lambda_param = b * b / params.variance();

    let z = inverse_normal_cdf(percentile.value());
    let years = mu_param * (1.0 + z * (mu_param / lambda_param).sqrt());

    (years * DAYS_PER_YEAR).clamp(MIN_PERCENTILE_DAYS, MAX_PERCENTILE_DAYS)
}

/// Which analytic statistic to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "level", rename_all = "snake_case")]
pub enum Estimate {
    Mean,
    Median,
    Percentile(Percentile),
}

impl Estimate {
    pub fn days(&self, params: &LiquidationParameters) -> f64 {
        match self {
            Estimate::Mean => mean_days(params),
            Estimate::Median => median_days(params),
            Estimate::Percentile(p) => percentile_days(params, *p),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Estimate::Mean => "mean".to_string(),
            Estimate::Median => "median".to_string(),
            Estimate::Percentile(p) => format!("p{:.0}", p.value() * 100.0),
        }
    }
}

// ─── Raw-argument entry points ───────────────────────────────────────

/// Mean first-passage time in days from raw inputs.
pub fn mean_first_passage_time_days(
    leverage: f64,
    volatility: f64,
    drift: f64,
    funding: f64,
) -> Result<f64, ParamError> {
    let params = LiquidationParameters::new(leverage, volatility, drift, funding)?;
    Ok(mean_days(&params))
}

/// Median first-passage time in days from raw inputs.
pub fn median_first_passage_time_days(
    leverage: f64,
    volatility: f64,
    drift: f64,
    funding: f64,
) -> Result<f64, ParamError> {
    let params = LiquidationParameters::new(leverage, volatility, drift, funding)?;
    Ok(median_days(&params))
}

/// Percentile first-passage time in days from raw inputs.
///
/// Fails if `percentile` is outside the open interval (0, 1).
pub fn percentile_first_passage_time_days(
    leverage: f64,
    volatility: f64,
    drift: f64,
    funding: f64,
    percentile: f64,
) -> Result<f64, ParamError> {
    let params = LiquidationParameters::new(leverage, volatility, drift, funding)?;
    let percentile = Percentile::new(percentile)?;
    Ok(percentile_days(&params, percentile))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(lev: f64, vol: f64, drift: f64, funding: f64) -> LiquidationParameters {
        LiquidationParameters::new(lev, vol, drift, funding).unwrap()
    }

    #[test]
    fn skew_factor_matches_sqrt_two_over_pi() {
        let expected = (2.0 / std::f64::consts::PI).sqrt();
        assert!((MEDIAN_SKEW_FACTOR - expected).abs() < 1e-15);
    }

    #[test]
    fn mean_10x_50_vol() {
        let days = mean_days(&params(10.0, 0.5, 0.0, 0.0));
        assert!((days - 307.65).abs() < 0.01, "got {days}");
    }

    #[test]
    fn mean_10x_100_vol() {
        let days = mean_days(&params(10.0, 1.0, 0.0, 0.0));
        assert!((days - 76.91).abs() < 0.01, "got {days}");
    }

    #[test]
    fn mean_degenerate_branch() {
        // denom = -0.5 + 0.125 < 0
        let p = params(10.0, 0.5, 0.0, 0.5);
        let days = mean_days(&p);
        assert!((days - 365.0 / (10.0 * 0.25)).abs() < 1e-12);
    }

    #[test]
    fn mean_zero_denominator_uses_degenerate_branch() {
        // denom = -0.125 + 0.125 == 0 exactly
        let p = params(4.0, 0.5, 0.0, 0.125);
        assert_eq!(mean_days(&p), 365.0 / (4.0 * 0.25));
    }

    #[test]
    fn median_general_regime() {
        let p = params(10.0, 0.5, 0.0, 0.0);
        let expected = p.barrier_distance() / (0.25 * MEDIAN_SKEW_FACTOR) * 365.0;
        assert_eq!(median_days(&p), expected);
        assert!((median_days(&p) - 192.79).abs() < 0.01);
    }

    #[test]
    fn median_strong_negative_drift_regime() {
        // net drift -0.5 < -0.25
        let p = params(10.0, 0.5, -0.3, 0.2);
        let expected = p.barrier_distance() / 0.5 * 365.0;
        assert!((median_days(&p) - expected).abs() < 1e-12);
    }

    #[test]
    fn median_uses_absolute_drift_when_positive() {
        let up = params(10.0, 0.5, 0.2, 0.0);
        let down = params(10.0, 0.5, -0.2, 0.0);
        assert!((median_days(&up) - median_days(&down)).abs() < 1e-12);
    }

    #[test]
    fn median_below_mean_at_zero_drift() {
        let p = params(20.0, 1.5, 0.0, 0.0);
        assert!(median_days(&p) < mean_days(&p));
    }

    #[test]
    fn percentile_half_is_median_exactly() {
        let p = params(7.0, 0.9, 0.05, 0.1);
        assert_eq!(percentile_days(&p, Percentile::MEDIAN), median_days(&p));
    }

    #[test]
    fn percentile_is_increasing_in_level() {
        let p = params(10.0, 0.5, 0.0, 0.0);
        let p10 = percentile_days(&p, Percentile::new(0.1).unwrap());
        let p90 = percentile_days(&p, Percentile::new(0.9).unwrap());
        assert!(p10 < p90);
    }

    #[test]
    fn percentile_respects_clamp() {
        let p = params(10.0, 0.5, 0.0, 0.0);
        for level in [0.001, 0.01, 0.3, 0.7, 0.99, 0.999] {
            let d = percentile_days(&p, Percentile::new(level).unwrap());
            assert!((MIN_PERCENTILE_DAYS..=MAX_PERCENTILE_DAYS).contains(&d));
        }
    }

    #[test]
    fn percentile_fallback_when_denominator_non_positive() {
        // denom <= 0 => mu = 100 years, huge upper quantile => clamped to 10000 days
        let p = params(10.0, 0.5, 0.0, 1.0);
        let d = percentile_days(&p, Percentile::new(0.9).unwrap());
        assert_eq!(d, MAX_PERCENTILE_DAYS);
    }

    #[test]
    fn percentile_formula_matches_hand_computation() {
        let p = params(10.0, 0.5, 0.0, 0.0);
        let b = p.barrier_distance();
        let mu = b / 0.125;
        let lambda = b * b / 0.25;
        let z = inverse_normal_cdf(0.75);
        let expected = (mu * (1.0 + z * (mu / lambda).sqrt()) * 365.0).clamp(0.1, 10_000.0);
        assert_eq!(percentile_days(&p, Percentile::new(0.75).unwrap()), expected);
    }

    #[test]
    fn raw_entry_points_validate() {
        assert!(mean_first_passage_time_days(1.0, 0.5, 0.0, 0.0).is_err());
        assert!(median_first_passage_time_days(10.0, 0.0, 0.0, 0.0).is_err());
        assert!(percentile_first_passage_time_days(10.0, 0.5, 0.0, 0.0, 1.0).is_err());
        assert!(percentile_first_passage_time_days(10.0, 0.5, 0.0, 0.0, 0.0).is_err());
        assert!(percentile_first_passage_time_days(10.0, 0.5, 0.0, 0.0, 0.3).is_ok());
    }

    #[test]
    fn estimate_dispatch() {
        let p = params(5.0, 0.8, 0.0, 0.0);
        assert_eq!(Estimate::Mean.days(&p), mean_days(&p));
        assert_eq!(Estimate::Median.days(&p), median_days(&p));
        let q = Percentile::new(0.25).unwrap();
        assert_eq!(Estimate::Percentile(q).days(&p), percentile_days(&p, q));
        assert_eq!(Estimate::Percentile(q).name(), "p25");
    }
}
