// tokenomics/src/lib.rs

//! Token launch and valuation models
//!
//! This crate implements:
//! - The phased launch lifecycle (private → strategic → community → public)
//!   with TGE estimation, anti-whale checks and time-bounded incentives
//! - Multi-year supply projection and valuation metrics
//! - Equilibrium gap analysis against target ratios
//! - Burn mechanics across fee, slashing, governance and decommission sources

pub mod anti_whale;
pub mod burning;
pub mod equilibrium;
pub mod incentives;
pub mod launch;
pub mod valuation;

pub use anti_whale::{AntiWhaleConfig, TransactionValidation};
pub use burning::{BurnBreakdown, BurnMechanics};
pub use equilibrium::{sustainability_score, EquilibriumAnalysis, EquilibriumTargets};
pub use incentives::{IncentiveConfig, IncentiveKind, IncentiveReward};
pub use launch::{
    LaunchConfig, LaunchController, LaunchPhase, LaunchProgress, PhaseConfig, TgeConfig,
    TgeOverrides, TgeSimulation,
};
pub use valuation::{
    DemandDriver, SupplyModel, SupplyProjection, ValuationConfig, ValuationMetrics,
    ValuationModel,
};

use token_core::Amount;

/// Result type for tokenomics operations
pub type TokenomicsResult<T> = Result<T, TokenomicsError>;

/// Errors that can occur in tokenomics operations
#[derive(Debug, thiserror::Error)]
pub enum TokenomicsError {
    #[error("Phase transition error: {0}")]
    PhaseTransitionError(String),

    #[error("Investment out of bounds: {amount} not within [{min}, {max}]")]
    InvestmentOutOfBounds { amount: Amount, min: Amount, max: Amount },

    #[error("Phase allocation exceeded: requested {requested}, remaining {remaining}")]
    AllocationExceeded { requested: Amount, remaining: Amount },

    #[error("Invalid market state: {0}")]
    InvalidMarketState(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TokenomicsError::InvestmentOutOfBounds {
            amount: Amount::from_u64(10),
            min: Amount::from_u64(100),
            max: Amount::from_u64(1_000),
        };
        assert_eq!(
            err.to_string(),
            "Investment out of bounds: 10 not within [100, 1000]"
        );
    }
}
