//! Payoff of a leveraged long perpetual at exit.
//!
//! Linear in the exit price until the liquidation price, where the whole
//! margin is lost and the payoff floors. The kink is what makes a leveraged
//! perpetual look like a long call with a knock-out.
//!
//! The matching call has its strike at the liquidation price and costs the
//! margin as premium; [`LeveragedPayoff::equivalent_call_pnl_at`] prices it
//! next to the perpetual.

use serde::{Deserialize, Serialize};

use crate::error::ParamError;

/// A long perpetual position of notional `position_size` at `leverage`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeveragedPayoff {
    position_size: f64,
    leverage: f64,
    entry_price: f64,
}

/// One point of a payoff curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffPoint {
    pub price: f64,
    pub pnl: f64,
    /// PnL of the equivalent long call at the same price.
    pub call_pnl: f64,
    pub liquidated: bool,
}

impl LeveragedPayoff {
    pub fn new(position_size: f64, leverage: f64, entry_price: f64) -> Result<Self, ParamError> {
        if !(position_size > 0.0) || !position_size.is_finite() {
            return Err(ParamError::invalid("position_size", position_size, "finite and > 0"));
        }
        if !(leverage > 1.0) || !leverage.is_finite() {
            return Err(ParamError::invalid("leverage", leverage, "finite and > 1"));
        }
        if !(entry_price > 0.0) || !entry_price.is_finite() {
            return Err(ParamError::invalid("entry_price", entry_price, "finite and > 0"));
        }
        Ok(Self {
            position_size,
            leverage,
            entry_price,
        })
    }

    /// Collateral posted: `position_size / leverage`.
    pub fn margin(&self) -> f64 {
        self.position_size / self.leverage
    }

    pub fn liquidation_price(&self) -> f64 {
        self.entry_price * (1.0 - 1.0 / self.leverage)
    }

    /// Entry plus one liquidation cushion: `entry + entry / leverage`.
    pub fn breakeven_price(&self) -> f64 {
        self.entry_price + self.entry_price / self.leverage
    }

    pub fn is_liquidated_at(&self, price: f64) -> bool {
        price <= self.liquidation_price()
    }

    /// Profit and loss if the position is closed at `exit_price`.
    pub fn pnl_at(&self, exit_price: f64) -> f64 {
        if self.is_liquidated_at(exit_price) {
            return -self.margin();
        }
        (exit_price - self.entry_price) / self.entry_price * self.position_size
    }

    /// Long call struck at the liquidation price with the margin as premium:
    /// `max(price - strike, 0) * leverage - margin`.
    pub fn equivalent_call_pnl_at(&self, price: f64) -> f64 {
        let intrinsic = (price - self.liquidation_price()).max(0.0);
        intrinsic * self.leverage - self.margin()
    }

    pub fn point_at(&self, price: f64) -> PayoffPoint {
        PayoffPoint {
            price,
            pnl: self.pnl_at(price),
            call_pnl: self.equivalent_call_pnl_at(price),
            liquidated: self.is_liquidated_at(price),
        }
    }

    pub fn payoff_curve(&self, prices: &[f64]) -> Vec<PayoffPoint> {
        prices.iter().map(|&p| self.point_at(p)).collect()
    }
}
