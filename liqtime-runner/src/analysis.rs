//! End-to-end analysis: closed-form estimates next to a Monte Carlo batch.
//!
//! A report carries everything derived from one [`AnalysisConfig`]:
//! - analytic mean / median / percentile days and the median's risk band
//! - the simulated batch's summary statistics and survival curve
//!
//! Reports persist as JSON with a `schema_version`; unknown versions are
//! rejected on load. A Markdown rendering is written next to the JSON.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use liqtime_core::{
    mean_days, median_days, percentile_days, LiquidationParameters, Percentile, RiskLevel,
};

use crate::aggregate::{aggregate_with_quantiles, survival_curve, QuantileDays, SummaryStats};
use crate::config::{AnalysisConfig, RunId};
use crate::simulator::simulate;

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Closed-form estimates for one parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticSummary {
    pub mean_days: f64,
    pub median_days: f64,
    pub percentiles: Vec<QuantileDays>,
    /// Risk band of the median.
    pub risk: RiskLevel,
}

impl AnalyticSummary {
    pub fn compute(params: &LiquidationParameters, quantiles: &[Percentile]) -> Self {
        let median = median_days(params);
        Self {
            mean_days: mean_days(params),
            median_days: median,
            percentiles: quantiles
                .iter()
                .map(|&q| QuantileDays {
                    quantile: q.value(),
                    days: percentile_days(params, q),
                })
                .collect(),
            risk: RiskLevel::from_days(median),
        }
    }
}

/// Complete result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub config: AnalysisConfig,
    pub liquidation_price: f64,
    pub analytic: AnalyticSummary,
    pub empirical: SummaryStats,
    /// Surviving fraction at each step `0..=n_steps`.
    pub survival: Vec<f64>,
}

/// Validate, simulate, aggregate.
pub fn run_analysis(config: &AnalysisConfig) -> Result<AnalysisReport> {
    let params = config.validate().context("invalid analysis config")?;
    let run_id = config.run_id().context("failed to hash analysis config")?;
    let quantiles = config
        .quantiles
        .iter()
        .map(|&q| Percentile::new(q))
        .collect::<Result<Vec<_>, _>>()?;

    let analytic = AnalyticSummary::compute(&params, &quantiles);
    info!(
        run_id = %run_id,
        leverage = params.leverage(),
        volatility = params.volatility(),
        mean_days = analytic.mean_days,
        median_days = analytic.median_days,
        risk = %analytic.risk,
        "analytic estimates"
    );

    let result = simulate(&params, &config.simulation).context("simulation failed")?;
    let empirical = aggregate_with_quantiles(&result, &config.quantiles)?;
    let survival = survival_curve(&result);
    info!(
        run_id = %run_id,
        liquidated = empirical.liquidated_count,
        n_paths = empirical.n_paths,
        horizon_days = empirical.horizon_days,
        "simulation summarized"
    );

    Ok(AnalysisReport {
        schema_version: SCHEMA_VERSION,
        run_id,
        config: config.clone(),
        liquidation_price: result.liquidation_price(),
        analytic,
        empirical,
        survival,
    })
}

// ─── Persistence ─────────────────────────────────────────────────────

pub fn export_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize AnalysisReport to JSON")
}

/// Deserialize a report, rejecting schema versions newer than this build.
pub fn import_json(json: &str) -> Result<AnalysisReport> {
    let report: AnalysisReport =
        serde_json::from_str(json).context("failed to deserialize AnalysisReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

/// Write `report.json` and `report.md` under `output_dir/{run_id}/`.
///
/// Returns the created directory.
pub fn save_report(report: &AnalysisReport, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(&report.run_id);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create report dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("report.json"), export_json(report)?)
        .with_context(|| format!("failed to write report.json in {}", run_dir.display()))?;
    std::fs::write(run_dir.join("report.md"), render_markdown(report))
        .with_context(|| format!("failed to write report.md in {}", run_dir.display()))?;

    Ok(run_dir)
}

pub fn load_report(dir: &Path) -> Result<AnalysisReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Markdown ────────────────────────────────────────────────────────

pub fn render_markdown(report: &AnalysisReport) -> String {
    let p = &report.config.parameters;
    let sim = &report.config.simulation;
    let mut md = String::with_capacity(1024);

    md.push_str("# Liquidation Time Report\n\n");
    md.push_str(&format!("Run `{}`\n\n", report.run_id));

    md.push_str("## Position\n\n");
    md.push_str("| Field | Value |\n| --- | --- |\n");
    md.push_str(&format!("| Leverage | {:.2}x |\n", p.leverage));
    md.push_str(&format!("| Volatility | {:.1}% |\n", p.volatility * 100.0));
    md.push_str(&format!("| Drift | {:.1}% |\n", p.drift * 100.0));
    md.push_str(&format!("| Funding | {:.1}% |\n", p.funding * 100.0));
    md.push_str(&format!(
        "| Liquidation price | {:.4} (entry {:.4}) |\n\n",
        report.liquidation_price, sim.initial_price
    ));

    md.push_str("## Analytic\n\n");
    md.push_str("| Estimate | Days |\n| --- | --- |\n");
    md.push_str(&format!("| Mean | {:.1} |\n", report.analytic.mean_days));
    md.push_str(&format!("| Median | {:.1} |\n", report.analytic.median_days));
    for q in &report.analytic.percentiles {
        md.push_str(&format!("| p{:.0} | {:.1} |\n", q.quantile * 100.0, q.days));
    }
    md.push_str(&format!("\nRisk: **{}**\n\n", report.analytic.risk));

    let e = &report.empirical;
    md.push_str("## Simulation\n\n");
    md.push_str(&format!(
        "{} paths x {} steps (seed {}), horizon {:.1} days\n\n",
        e.n_paths, sim.n_steps, sim.seed, e.horizon_days
    ));
    md.push_str("| Metric | Value |\n| --- | --- |\n");
    md.push_str(&format!(
        "| Liquidated | {} ({:.1}%) |\n",
        e.liquidated_count,
        e.fraction_liquidated * 100.0
    ));
    md.push_str(&format!(
        "| Mean days (liquidated) | {:.1} |\n",
        e.mean_liquidation_time_days_among_liquidated
    ));
    for q in &e.empirical_percentiles {
        md.push_str(&format!("| p{:.0} days | {:.1} |\n", q.quantile * 100.0, q.days));
    }

    md
}
