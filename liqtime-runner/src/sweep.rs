//! Leverage x volatility grid sweeps over the analytic estimators.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use liqtime_core::{Estimate, LiquidationParameters, ParamError, RiskLevel};

/// Grid axes. Drift and funding are held fixed across the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    /// Leverage multiples (columns).
    pub leverages: Vec<f64>,
    /// Annualized volatilities as decimals (rows).
    pub volatilities: Vec<f64>,
    #[serde(default)]
    pub drift: f64,
    #[serde(default)]
    pub funding: f64,
}

impl ParamGrid {
    /// Heatmap axes: 2x..100x leverage, 50%..300% volatility.
    pub fn heatmap_default() -> Self {
        Self {
            leverages: vec![
                2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 12.0, 15.0, 20.0, 25.0, 30.0, 50.0,
                100.0,
            ],
            volatilities: vec![
                0.50, 0.60, 0.70, 0.80, 0.90, 1.00, 1.10, 1.20, 1.30, 1.40, 1.50, 1.75, 2.00,
                2.50, 3.00,
            ],
            drift: 0.0,
            funding: 0.0,
        }
    }

    /// Evenly spaced axes, e.g. for a surface: `linspace(2, 50, 50)` leverage
    /// by `linspace(0.1, 2.0, 50)` volatility.
    pub fn linear(
        leverage_range: (f64, f64),
        volatility_range: (f64, f64),
        points: usize,
    ) -> Self {
        Self {
            leverages: linspace(leverage_range.0, leverage_range.1, points),
            volatilities: linspace(volatility_range.0, volatility_range.1, points),
            drift: 0.0,
            funding: 0.0,
        }
    }

    pub fn with_rates(mut self, drift: f64, funding: f64) -> Self {
        self.drift = drift;
        self.funding = funding;
        self
    }

    /// Number of cells.
    pub fn size(&self) -> usize {
        self.leverages.len() * self.volatilities.len()
    }

    /// Validated parameters for every cell, row-major (volatility, then leverage).
    pub fn cells(&self) -> Result<Vec<LiquidationParameters>, ParamError> {
        let mut cells = Vec::with_capacity(self.size());
        for &vol in &self.volatilities {
            for &lev in &self.leverages {
                cells.push(LiquidationParameters::new(lev, vol, self.drift, self.funding)?);
            }
        }
        Ok(cells)
    }
}

fn linspace(start: f64, end: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (points - 1) as f64;
            (0..points).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Days-to-liquidation matrix: one row per volatility, one column per leverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidationGrid {
    pub estimate: Estimate,
    pub leverages: Vec<f64>,
    pub volatilities: Vec<f64>,
    pub days: Vec<Vec<f64>>,
}

impl LiquidationGrid {
    pub fn get(&self, volatility_index: usize, leverage_index: usize) -> Option<f64> {
        self.days.get(volatility_index)?.get(leverage_index).copied()
    }

    pub fn risk_levels(&self) -> Vec<Vec<RiskLevel>> {
        self.days
            .iter()
            .map(|row| row.iter().map(|&d| RiskLevel::from_days(d)).collect())
            .collect()
    }

    /// Copy with every cell capped at `max_days`.
    pub fn capped(&self, max_days: f64) -> Self {
        Self {
            days: self
                .days
                .iter()
                .map(|row| row.iter().map(|&d| d.min(max_days)).collect())
                .collect(),
            ..self.clone()
        }
    }
}

/// Grid sweep executor.
///
/// Evaluates one analytic estimate over every cell, optionally in parallel.
#[derive(Debug, Clone)]
pub struct GridSweep {
    estimate: Estimate,
    parallel: bool,
}

impl GridSweep {
    pub fn new(estimate: Estimate) -> Self {
        Self {
            estimate,
            parallel: true,
        }
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Fails on the first invalid cell; no partial grid is returned.
    pub fn sweep(&self, grid: &ParamGrid) -> Result<LiquidationGrid, ParamError> {
        let cells = grid.cells()?;
        debug!(
            estimate = %self.estimate.name(),
            cells = cells.len(),
            parallel = self.parallel,
            "sweeping liquidation grid"
        );

        let flat: Vec<f64> = if self.parallel {
            cells.par_iter().map(|p| self.estimate.days(p)).collect()
        } else {
            cells.iter().map(|p| self.estimate.days(p)).collect()
        };

        let days = if grid.leverages.is_empty() {
            vec![Vec::new(); grid.volatilities.len()]
        } else {
            flat.chunks(grid.leverages.len()).map(|row| row.to_vec()).collect()
        };

        Ok(LiquidationGrid {
            estimate: self.estimate,
            leverages: grid.leverages.clone(),
            volatilities: grid.volatilities.clone(),
            days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liqtime_core::{mean_days, Percentile};

    #[test]
    fn heatmap_grid_size() {
        let grid = ParamGrid::heatmap_default();
        // 16 leverages x 15 volatilities
        assert_eq!(grid.size(), 240);
    }

    #[test]
    fn linspace_endpoints() {
        let xs = linspace(2.0, 50.0, 50);
        assert_eq!(xs.len(), 50);
        assert_eq!(xs[0], 2.0);
        assert!((xs[49] - 50.0).abs() < 1e-12);
        assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
        assert!(linspace(1.0, 2.0, 0).is_empty());
    }

    #[test]
    fn sweep_shape_and_values() {
        let grid = ParamGrid {
            leverages: vec![5.0, 10.0],
            volatilities: vec![0.5, 1.0, 1.5],
            drift: 0.0,
            funding: 0.0,
        };
        let out = GridSweep::new(Estimate::Mean).sweep(&grid).unwrap();
        assert_eq!(out.days.len(), 3);
        assert!(out.days.iter().all(|row| row.len() == 2));

        let p = LiquidationParameters::new(10.0, 1.0, 0.0, 0.0).unwrap();
        assert_eq!(out.get(1, 1), Some(mean_days(&p)));
        assert_eq!(out.get(3, 0), None);
    }

    #[test]
    fn serial_and_parallel_sweeps_agree() {
        let grid = ParamGrid::heatmap_default().with_rates(0.1, 0.05);
        let estimate = Estimate::Percentile(Percentile::new(0.9).unwrap());
        let serial = GridSweep::new(estimate).with_parallelism(false).sweep(&grid).unwrap();
        let parallel = GridSweep::new(estimate).with_parallelism(true).sweep(&grid).unwrap();
        assert_eq!(serial, parallel);
    }

    #[test]
    fn rows_decrease_along_leverage() {
        let out = GridSweep::new(Estimate::Mean)
            .sweep(&ParamGrid::heatmap_default())
            .unwrap();
        for row in &out.days {
            assert!(row.windows(2).all(|w| w[1] < w[0]));
        }
    }

    #[test]
    fn invalid_cell_fails_whole_sweep() {
        let grid = ParamGrid {
            leverages: vec![1.0, 10.0],
            volatilities: vec![0.5],
            drift: 0.0,
            funding: 0.0,
        };
        let err = GridSweep::new(Estimate::Median).sweep(&grid).unwrap_err();
        assert_eq!(err.parameter(), "leverage");
    }

    #[test]
    fn capped_grid_and_risk_levels() {
        let out = GridSweep::new(Estimate::Mean)
            .sweep(&ParamGrid::linear((2.0, 50.0), (0.1, 2.0), 10))
            .unwrap();
        let capped = out.capped(365.0);
        assert!(capped.days.iter().flatten().all(|&d| d <= 365.0));
        let levels = capped.risk_levels();
        assert_eq!(levels.len(), 10);
        // 2x leverage at 10% vol survives for years.
        assert_eq!(levels[0][0], RiskLevel::Safe);
    }
}
