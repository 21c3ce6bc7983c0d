//! Summary statistics over a simulated batch.
//!
//! Survivors are censored at the horizon: for percentile purposes a path that
//! never crossed counts as liquidated at `n_steps * dt * 365` days. The mean,
//! by contrast, is taken over liquidated paths only, and falls back to the
//! full horizon when none were liquidated.

use serde::{Deserialize, Serialize};

use liqtime_core::{ParamError, Percentile};

use crate::simulator::SimulationResult;

/// Quantiles reported when the caller does not pick any.
pub const DEFAULT_QUANTILES: [f64; 5] = [0.10, 0.25, 0.50, 0.75, 0.90];

/// An empirical quantile of liquidation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileDays {
    pub quantile: f64,
    pub days: f64,
}

/// Reduced view of a [`SimulationResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub n_paths: usize,
    pub liquidated_count: usize,
    /// `liquidated_count / n_paths`.
    pub fraction_liquidated: f64,
    /// Mean of `time_days` over liquidated paths; the horizon if there were none.
    pub mean_liquidation_time_days_among_liquidated: f64,
    pub horizon_days: f64,
    /// Horizon-censored liquidation-time quantiles, in request order.
    pub empirical_percentiles: Vec<QuantileDays>,
}

impl SummaryStats {
    pub fn survived_count(&self) -> usize {
        self.n_paths - self.liquidated_count
    }

    /// Look up a reported quantile.
    pub fn percentile(&self, quantile: f64) -> Option<f64> {
        self.empirical_percentiles
            .iter()
            .find(|q| (q.quantile - quantile).abs() < 1e-12)
            .map(|q| q.days)
    }
}

/// Aggregate at [`DEFAULT_QUANTILES`].
pub fn aggregate(result: &SimulationResult) -> SummaryStats {
    let quantiles: Vec<Percentile> = DEFAULT_QUANTILES
        .iter()
        .filter_map(|&q| Percentile::new(q).ok())
        .collect();
    summarize(result, &quantiles)
}

/// Aggregate at caller-chosen quantiles, each strictly inside (0, 1).
pub fn aggregate_with_quantiles(
    result: &SimulationResult,
    quantiles: &[f64],
) -> Result<SummaryStats, ParamError> {
    let quantiles = quantiles
        .iter()
        .map(|&q| Percentile::new(q))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(summarize(result, &quantiles))
}

fn summarize(result: &SimulationResult, quantiles: &[Percentile]) -> SummaryStats {
    let n_paths = result.n_paths();
    let horizon_days = result.horizon_days();

    let liquidation_days: Vec<f64> = result
        .paths()
        .iter()
        .filter_map(|p| p.liquidation().map(|e| e.time_days))
        .collect();
    let liquidated_count = liquidation_days.len();

    let mean_liquidation_time_days_among_liquidated = if liquidated_count == 0 {
        horizon_days
    } else {
        liquidation_days.iter().sum::<f64>() / liquidated_count as f64
    };

    let mut censored: Vec<f64> = result
        .paths()
        .iter()
        .map(|p| p.liquidation().map_or(horizon_days, |e| e.time_days))
        .collect();
    censored.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let empirical_percentiles = quantiles
        .iter()
        .map(|q| QuantileDays {
            quantile: q.value(),
            days: percentile_sorted(&censored, q.value()),
        })
        .collect();

    SummaryStats {
        n_paths,
        liquidated_count,
        fraction_liquidated: if n_paths == 0 {
            0.0
        } else {
            liquidated_count as f64 / n_paths as f64
        },
        mean_liquidation_time_days_among_liquidated,
        horizon_days,
        empirical_percentiles,
    }
}

/// Fraction of paths not yet liquidated at each step `0..=n_steps`.
pub fn survival_curve(result: &SimulationResult) -> Vec<f64> {
    let n_steps = result.config().n_steps;
    let n_paths = result.n_paths();
    if n_paths == 0 {
        return vec![0.0; n_steps + 1];
    }

    // absorbed[k] = paths absorbed exactly at step k
    let mut absorbed = vec![0usize; n_steps + 1];
    for event in result.paths().iter().filter_map(|p| p.liquidation()) {
        absorbed[event.step_index.min(n_steps)] += 1;
    }

    let mut alive = n_paths;
    absorbed
        .iter()
        .map(|&k| {
            alive -= k;
            alive as f64 / n_paths as f64
        })
        .collect()
}

/// Quantile `q` in (0, 1) of an ascending slice, linear interpolation
/// between order statistics.
fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = q * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::{simulate, SimulationConfig};
    use liqtime_core::LiquidationParameters;

    fn run(lev: f64, vol: f64, drift: f64, n_paths: usize, n_steps: usize) -> SimulationResult {
        let params = LiquidationParameters::new(lev, vol, drift, 0.0).unwrap();
        let config = SimulationConfig {
            n_paths,
            n_steps,
            ..SimulationConfig::default()
        };
        simulate(&params, &config).unwrap()
    }

    #[test]
    fn no_liquidations_reports_horizon() {
        // 1.1x leverage puts the barrier ~91% below entry; 1% vol never gets there.
        let result = run(1.1, 0.01, 0.0, 50, 30);
        let stats = aggregate(&result);
        assert_eq!(stats.liquidated_count, 0);
        assert_eq!(stats.fraction_liquidated, 0.0);
        assert_eq!(stats.mean_liquidation_time_days_among_liquidated, stats.horizon_days);
        assert!((stats.horizon_days - 30.0).abs() < 1e-9);
        for q in &stats.empirical_percentiles {
            assert_eq!(q.days, stats.horizon_days);
        }
    }

    #[test]
    fn counts_and_fraction_are_consistent() {
        let result = run(20.0, 1.0, 0.0, 200, 90);
        let stats = aggregate(&result);
        assert_eq!(stats.n_paths, 200);
        assert_eq!(stats.liquidated_count, result.liquidated_count());
        assert_eq!(stats.survived_count() + stats.liquidated_count, 200);
        assert!((stats.fraction_liquidated - stats.liquidated_count as f64 / 200.0).abs() < 1e-15);
        assert!(stats.liquidated_count > 0);
        assert!(stats.mean_liquidation_time_days_among_liquidated <= stats.horizon_days);
        assert!(stats.mean_liquidation_time_days_among_liquidated > 0.0);
    }

    #[test]
    fn percentiles_are_monotone_and_bounded() {
        let result = run(10.0, 1.0, 0.0, 300, 90);
        let stats = aggregate(&result);
        let days: Vec<f64> = stats.empirical_percentiles.iter().map(|q| q.days).collect();
        assert!(days.windows(2).all(|w| w[0] <= w[1]));
        assert!(days.iter().all(|&d| d >= 0.0 && d <= stats.horizon_days));
        assert_eq!(stats.percentile(0.5), Some(days[2]));
    }

    #[test]
    fn custom_quantiles_are_validated() {
        let result = run(10.0, 0.5, 0.0, 20, 30);
        assert!(aggregate_with_quantiles(&result, &[0.0]).is_err());
        assert!(aggregate_with_quantiles(&result, &[0.5, 1.0]).is_err());
        let stats = aggregate_with_quantiles(&result, &[0.05, 0.95]).unwrap();
        assert_eq!(stats.empirical_percentiles.len(), 2);
        assert_eq!(stats.empirical_percentiles[0].quantile, 0.05);
    }

    #[test]
    fn survival_curve_is_non_increasing() {
        let result = run(10.0, 1.0, 0.0, 200, 90);
        let curve = survival_curve(&result);
        assert_eq!(curve.len(), 91);
        assert_eq!(curve[0], 1.0);
        assert!(curve.windows(2).all(|w| w[1] <= w[0]));
        let stats = aggregate(&result);
        assert!((curve[90] - (1.0 - stats.fraction_liquidated)).abs() < 1e-12);
    }

    #[test]
    fn percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile_sorted(&sorted, 0.5), 3.0);
        assert!((percentile_sorted(&sorted, 0.1) - 1.4).abs() < 1e-12);
        assert_eq!(percentile_sorted(&[7.0], 0.9), 7.0);
    }
}
