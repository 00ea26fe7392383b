// liquidity/src/lib.rs

//! Liquidity Flywheel Monitor
//!
//! This crate implements:
//! - Per-pool APY and reward estimation with lock bonuses and boosts
//! - Five-stage flywheel classification keyed off total value locked
//! - Threshold-based health scoring (depth, spread, utilization, concentration)
//! - Health alerts and flywheel velocity

pub mod flywheel;
pub mod health;
pub mod pool;

pub use flywheel::{
    FlywheelMetrics, FlywheelMonitor, FlywheelStage, FlywheelState, LiquidityConfig,
};
pub use health::{HealthAlert, HealthMetric, HealthThresholds, LiquidityHealth};
pub use pool::{PoolConfig, RewardEstimate};

use token_core::Amount;

/// Result type for liquidity operations
pub type LiquidityResult<T> = Result<T, LiquidityError>;

/// Errors that can occur in liquidity operations
#[derive(Debug, thiserror::Error)]
pub enum LiquidityError {
    #[error("Pool not found: {0}")]
    PoolNotFound(String),

    #[error("Insufficient liquidity: required {required}, available {available}")]
    InsufficientLiquidity { required: Amount, available: Amount },

    #[error("Insufficient rewards: required {required}, pending {pending}")]
    InsufficientRewards { required: Amount, pending: Amount },

    #[error("Invalid metric: {0}")]
    InvalidMetric(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
