// simulation/src/lib.rs

//! Scenario simulation and stress testing
//!
//! This crate implements:
//! - A monthly supply/price/adoption loop under named scenarios
//! - Monte Carlo fan-out over seeded runs with percentile bands
//! - Shock scenarios with circuit-breaker and survival evaluation

pub mod monte_carlo;
pub mod scenario;
pub mod simulator;
pub mod stats;
pub mod stress;

pub use monte_carlo::{run_monte_carlo, MonteCarloOutcome};
pub use scenario::{AdoptionCurve, GrowthAssumptions, Scenario, SimulationConfig};
pub use simulator::{
    run_once, RunOutcome, ScenarioSimulator, SimulationRequest, SimulationResult,
    SimulationSummary, YearlyProjection, MAX_ITERATIONS, MAX_YEARS,
};
pub use stats::ConfidenceBand;
pub use stress::{
    CircuitBreaker, MarketSnapshot, StressConfig, StressInput, StressScenario, StressTestResult,
    StressTester,
};

use tokenomics::TokenomicsError;

/// Result type for simulation operations
pub type SimResult<T> = Result<T, SimulationError>;

/// Errors that can occur in simulation operations
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("Unknown stress scenario: {0}")]
    UnknownStressScenario(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Tokenomics error: {0}")]
    Tokenomics(#[from] TokenomicsError),
}
