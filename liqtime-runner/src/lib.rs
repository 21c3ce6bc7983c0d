//! LiqTime Runner — Monte Carlo simulation, sweeps and analysis reports.
//!
//! This crate builds on `liqtime-core` to provide:
//! - Reproducible GBM price-path batches with an absorbing liquidation barrier
//! - Horizon-censored summary statistics and survival curves
//! - Leverage x volatility grid sweeps over the analytic estimators
//! - Named trading scenarios
//! - TOML analysis configs with content-addressed run IDs
//! - Combined analytic + empirical reports with JSON / Markdown persistence

pub mod aggregate;
pub mod analysis;
pub mod config;
pub mod scenarios;
pub mod simulator;
pub mod sweep;

pub use aggregate::{
    aggregate, aggregate_with_quantiles, survival_curve, QuantileDays, SummaryStats,
    DEFAULT_QUANTILES,
};
pub use analysis::{
    export_json, import_json, load_report, render_markdown, run_analysis, save_report,
    AnalysisReport, AnalyticSummary, SCHEMA_VERSION,
};
pub use config::{AnalysisConfig, ConfigError, RunId};
pub use scenarios::{evaluate_scenarios, Scenario, ScenarioResult, STANDARD_SCENARIOS};
pub use simulator::{
    simulate, simulate_paths, LiquidationCause, LiquidationEvent, PathSimulator, PathState,
    PricePath, SimulationConfig, SimulationResult,
};
pub use sweep::{GridSweep, LiquidationGrid, ParamGrid};
