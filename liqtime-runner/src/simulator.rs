//! Monte Carlo liquidation paths under geometric Brownian motion.
//!
//! Each path draws daily log-return increments from
//! `Normal(net_drift * dt, sigma * sqrt(dt))`, compounds them from the
//! initial price, and stops at the first price at or below the liquidation
//! price. The barrier is absorbing: a liquidated path keeps its prices up to
//! and including the crossing step and nothing after it.
//!
//! # Determinism
//!
//! Every path owns an RNG seeded from `(seed, path_index)` via
//! [`RngHierarchy`]. Draw order within a path is fixed (step 1, 2, ...), and no
//! generator is shared between paths, so serial and parallel runs produce
//! identical results.

use rand_distr::{Distribution, StandardNormal};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use liqtime_core::analytic::DAYS_PER_YEAR;
use liqtime_core::{LiquidationParameters, ParamError, RngHierarchy};

// ─── Configuration ───────────────────────────────────────────────────

/// Batch settings for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of independent paths (default 100).
    pub n_paths: usize,
    /// Steps per path (default 90).
    pub n_steps: usize,
    /// Step length in years (default 1/365, one calendar day).
    pub dt_years: f64,
    /// Master seed for the per-path RNG streams.
    pub seed: u64,
    /// Entry price every path starts from (default 1.0, normalized).
    pub initial_price: f64,
    /// Fan paths out over the rayon pool.
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_paths: 100,
            n_steps: 90,
            dt_years: 1.0 / DAYS_PER_YEAR,
            seed: 42,
            initial_price: 1.0,
            parallel: true,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.n_paths == 0 {
            return Err(ParamError::invalid("n_paths", 0.0, ">= 1"));
        }
        if self.n_steps == 0 {
            return Err(ParamError::invalid("n_steps", 0.0, ">= 1"));
        }
        if !(self.dt_years > 0.0) || !self.dt_years.is_finite() {
            return Err(ParamError::invalid("dt_years", self.dt_years, "finite and > 0"));
        }
        if !(self.initial_price > 0.0) || !self.initial_price.is_finite() {
            return Err(ParamError::invalid(
                "initial_price",
                self.initial_price,
                "finite and > 0",
            ));
        }
        let horizon = self.horizon_days();
        if !horizon.is_finite() {
            return Err(ParamError::invalid("n_steps * dt_years", horizon, "finite horizon"));
        }
        Ok(())
    }

    /// Simulated horizon in days: `n_steps * dt_years * 365`.
    pub fn horizon_days(&self) -> f64 {
        self.n_steps as f64 * self.dt_years * DAYS_PER_YEAR
    }

    /// Elapsed days at a step index.
    pub fn step_days(&self, step_index: usize) -> f64 {
        step_index as f64 * self.dt_years * DAYS_PER_YEAR
    }
}

// ─── Path state ──────────────────────────────────────────────────────

/// Why a path was absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquidationCause {
    /// Price fell to or below the liquidation price.
    Barrier,
    /// The generated price overflowed or became NaN.
    NonFiniteSample,
}

/// First barrier crossing of a path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidationEvent {
    pub step_index: usize,
    pub time_days: f64,
    pub cause: LiquidationCause,
}

/// Per-path state machine.
///
/// `Active -> Liquidated` or `Active -> SurvivedHorizon`; both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PathState {
    Active,
    Liquidated(LiquidationEvent),
    SurvivedHorizon,
}

impl PathState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PathState::Active)
    }

    pub fn liquidation(&self) -> Option<&LiquidationEvent> {
        match self {
            PathState::Liquidated(event) => Some(event),
            _ => None,
        }
    }

    /// Feed the price observed at `step_index`. Terminal states ignore input.
    fn observe(
        self,
        step_index: usize,
        price: f64,
        liquidation_price: f64,
        config: &SimulationConfig,
    ) -> Self {
        if self.is_terminal() {
            return self;
        }

        let cause = if !price.is_finite() {
            LiquidationCause::NonFiniteSample
        } else if price <= liquidation_price {
            LiquidationCause::Barrier
        } else {
            return PathState::Active;
        };

        PathState::Liquidated(LiquidationEvent {
            step_index,
            time_days: config.step_days(step_index),
            cause,
        })
    }

    fn absorb_non_finite(self, step_index: usize, config: &SimulationConfig) -> Self {
        self.observe(step_index, f64::NAN, 0.0, config)
    }

    /// Close out a path that reached the final step still active.
    fn finish(self) -> Self {
        match self {
            PathState::Active => PathState::SurvivedHorizon,
            terminal => terminal,
        }
    }
}

/// One simulated path. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePath {
    index: usize,
    prices: Vec<f64>,
    state: PathState,
}

impl PricePath {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Prices from step 0 (entry) up to the last retained step.
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn state(&self) -> PathState {
        self.state
    }

    pub fn liquidation(&self) -> Option<&LiquidationEvent> {
        self.state.liquidation()
    }

    pub fn is_liquidated(&self) -> bool {
        self.liquidation().is_some()
    }
}

// ─── Result ──────────────────────────────────────────────────────────

/// A batch of paths with the inputs that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    params: LiquidationParameters,
    config: SimulationConfig,
    liquidation_price: f64,
    paths: Vec<PricePath>,
}

impl SimulationResult {
    pub fn params(&self) -> &LiquidationParameters {
        &self.params
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn liquidation_price(&self) -> f64 {
        self.liquidation_price
    }

    pub fn paths(&self) -> &[PricePath] {
        &self.paths
    }

    pub fn n_paths(&self) -> usize {
        self.paths.len()
    }

    pub fn horizon_days(&self) -> f64 {
        self.config.horizon_days()
    }

    pub fn liquidated_count(&self) -> usize {
        self.paths.iter().filter(|p| p.is_liquidated()).count()
    }

    /// Absorption step per path, `None` for survivors.
    pub fn liquidation_steps(&self) -> Vec<Option<usize>> {
        self.paths
            .iter()
            .map(|p| p.liquidation().map(|e| e.step_index))
            .collect()
    }
}

// ─── Simulator ───────────────────────────────────────────────────────

/// Generates liquidation paths for one parameter set.
#[derive(Debug, Clone)]
pub struct PathSimulator {
    params: LiquidationParameters,
    config: SimulationConfig,
    /// Mean of one log increment, `net_drift * dt`.
    step_mean: f64,
    /// Standard deviation of one log increment, `sigma * sqrt(dt)`.
    step_std_dev: f64,
    rngs: RngHierarchy,
}

impl PathSimulator {
    /// Step moments may overflow for extreme inputs; such paths are absorbed
    /// as [`LiquidationCause::NonFiniteSample`] instead of failing the batch.
    pub fn new(
        params: LiquidationParameters,
        config: SimulationConfig,
    ) -> Result<Self, ParamError> {
        config.validate()?;

        Ok(Self {
            step_mean: params.net_drift() * config.dt_years,
            step_std_dev: params.volatility() * config.dt_years.sqrt(),
            params,
            rngs: RngHierarchy::new(config.seed),
            config,
        })
    }

    pub fn liquidation_price(&self) -> f64 {
        self.params.liquidation_price(self.config.initial_price)
    }

    /// Generate one path from its own RNG stream.
    pub fn simulate_path(&self, index: usize) -> PricePath {
        let mut rng = self.rngs.rng_for_path(index as u64);
        let initial = self.config.initial_price;
        let liquidation_price = self.liquidation_price();

        let mut prices = Vec::with_capacity(self.config.n_steps + 1);
        prices.push(initial);
        let mut state = PathState::Active.observe(0, initial, liquidation_price, &self.config);

        let mut log_return = 0.0;
        for step in 1..=self.config.n_steps {
            if state.is_terminal() {
                break;
            }
            let z: f64 = StandardNormal.sample(&mut rng);
            log_return += self.step_mean + self.step_std_dev * z;
            let price = initial * log_return.exp();
            prices.push(price);
            state = if log_return.is_finite() {
                state.observe(step, price, liquidation_price, &self.config)
            } else {
                // exp(-inf) is a finite 0.0, but the sample itself was not.
                state.absorb_non_finite(step, &self.config)
            };
        }

        PricePath {
            index,
            prices,
            state: state.finish(),
        }
    }

    /// Generate the whole batch.
    pub fn run(&self) -> SimulationResult {
        debug!(
            leverage = self.params.leverage(),
            volatility = self.params.volatility(),
            net_drift = self.params.net_drift(),
            n_paths = self.config.n_paths,
            n_steps = self.config.n_steps,
            seed = self.config.seed,
            parallel = self.config.parallel,
            "simulating liquidation paths"
        );

        let paths: Vec<PricePath> = if self.config.parallel {
            (0..self.config.n_paths)
                .into_par_iter()
                .map(|i| self.simulate_path(i))
                .collect()
        } else {
            (0..self.config.n_paths)
                .map(|i| self.simulate_path(i))
                .collect()
        };

        let result = SimulationResult {
            params: self.params,
            config: self.config.clone(),
            liquidation_price: self.liquidation_price(),
            paths,
        };

        let non_finite = result
            .paths
            .iter()
            .filter_map(|p| p.liquidation())
            .filter(|e| e.cause == LiquidationCause::NonFiniteSample)
            .count();
        if non_finite > 0 {
            warn!(non_finite, "paths absorbed on non-finite samples");
        }
        info!(
            liquidated = result.liquidated_count(),
            n_paths = result.n_paths(),
            horizon_days = result.horizon_days(),
            "simulation finished"
        );

        result
    }
}

/// Simulate a batch for validated parameters.
pub fn simulate(
    params: &LiquidationParameters,
    config: &SimulationConfig,
) -> Result<SimulationResult, ParamError> {
    Ok(PathSimulator::new(*params, config.clone())?.run())
}

/// Simulate a batch from raw inputs with a normalized entry price of 1.0.
///
/// Paths drift at `drift - funding`, so funding pulls every path toward the
/// barrier.
#[allow(clippy::too_many_arguments)]
pub fn simulate_paths(
    leverage: f64,
    volatility: f64,
    drift: f64,
    funding: f64,
    n_paths: usize,
    n_steps: usize,
    dt_years: f64,
    seed: u64,
) -> Result<SimulationResult, ParamError> {
    let params = LiquidationParameters::new(leverage, volatility, drift, funding)?;
    let config = SimulationConfig {
        n_paths,
        n_steps,
        dt_years,
        seed,
        ..SimulationConfig::default()
    };
    simulate(&params, &config)
}
