//! LiqTime Core — first-passage model for leveraged positions.
//!
//! This crate contains the analytic half of the liquidation-time model:
//! - Parameter validation (leverage, volatility, drift, funding)
//! - Closed-form mean / median / percentile days to liquidation
//! - Standard normal quantile used by the percentile approximation
//! - Per-path deterministic RNG streams for the Monte Carlo runner
//! - Leveraged perpetual payoff and risk-band classification

pub mod analytic;
pub mod error;
pub mod normal;
pub mod params;
pub mod payoff;
pub mod risk;
pub mod rng;

pub use analytic::{
    mean_days, mean_first_passage_time_days, median_days, median_first_passage_time_days,
    percentile_days, percentile_first_passage_time_days, Estimate, DAYS_PER_YEAR,
};
pub use error::ParamError;
pub use normal::inverse_normal_cdf;
pub use params::{validate, LiquidationParameters, Percentile, RawParameters};
pub use payoff::{LeveragedPayoff, PayoffPoint};
pub use risk::RiskLevel;
pub use rng::RngHierarchy;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: public types can cross thread boundaries, so the
    /// runner can fan paths and grid cells out to a thread pool.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<LiquidationParameters>();
        require_sync::<LiquidationParameters>();
        require_send::<Percentile>();
        require_sync::<Percentile>();
        require_send::<Estimate>();
        require_sync::<Estimate>();
        require_send::<ParamError>();
        require_sync::<ParamError>();
        require_send::<RngHierarchy>();
        require_sync::<RngHierarchy>();
        require_send::<LeveragedPayoff>();
        require_sync::<LeveragedPayoff>();
        require_send::<RiskLevel>();
        require_sync::<RiskLevel>();
    }

    #[test]
    fn documented_examples_hold() {
        let mean = mean_first_passage_time_days(10.0, 0.5, 0.0, 0.0).unwrap();
        assert!((mean - 307.6).abs() < 0.1);

        let mean = mean_first_passage_time_days(10.0, 1.0, 0.0, 0.0).unwrap();
        assert!((mean - 76.9).abs() < 0.1);
    }

    #[test]
    fn boundary_inputs_are_rejected() {
        assert!(matches!(
            mean_first_passage_time_days(10.0, 0.0, 0.0, 0.0),
            Err(ParamError::InvalidParameter { name: "volatility", .. })
        ));
        assert!(matches!(
            mean_first_passage_time_days(1.0, 0.5, 0.0, 0.0),
            Err(ParamError::InvalidParameter { name: "leverage", .. })
        ));
    }
}
