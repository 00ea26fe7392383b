// simulation/src/scenario.rs

use crate::{simulator::MAX_ITERATIONS, SimResult, SimulationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use token_core::Amount;
use tokenomics::{EquilibriumTargets, SupplyModel, ValuationConfig};

/// Month around which the S-curve inflects
const SCURVE_MIDPOINT_MONTH: f64 = 24.0;
const SCURVE_STEEPNESS: f64 = 6.0;
/// Months until linear growth reaches zero
const LINEAR_HORIZON_MONTHS: f64 = 120.0;
/// e-folding time of exponential decay, in months
const EXPONENTIAL_DECAY_MONTHS: f64 = 36.0;

/// Shape of growth decay over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdoptionCurve {
    Linear,
    Exponential,
    SCurve,
}

impl AdoptionCurve {
    /// Multiplier applied to growth rates in month `month` (0-based)
    pub fn factor(&self, month: u32) -> f64 {
        let m = month as f64;
        match self {
            AdoptionCurve::Linear => (1.0 - m / LINEAR_HORIZON_MONTHS).max(0.0),
            AdoptionCurve::Exponential => (-m / EXPONENTIAL_DECAY_MONTHS).exp(),
            AdoptionCurve::SCurve => {
                1.0 / (1.0 + ((m - SCURVE_MIDPOINT_MONTH) / SCURVE_STEEPNESS).exp())
            }
        }
    }
}

/// Monthly growth rates before scenario and curve adjustment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthAssumptions {
    pub user_growth: f64,
    pub agent_growth: f64,
    pub tvl_growth: f64,
    pub revenue_growth: f64,
    pub adoption_curve: AdoptionCurve,
}

impl Default for GrowthAssumptions {
    fn default() -> Self {
        Self {
            user_growth: 0.08,
            agent_growth: 0.06,
            tvl_growth: 0.07,
            revenue_growth: 0.06,
            adoption_curve: AdoptionCurve::SCurve,
        }
    }
}

/// Named market scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub growth_multiplier: f64,
    pub burn_multiplier: f64,
    pub staking_multiplier: f64,
    /// Standard deviation of the monthly price shock
    pub price_volatility: f64,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        growth_multiplier: f64,
        burn_multiplier: f64,
        staking_multiplier: f64,
        price_volatility: f64,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            growth_multiplier,
            burn_multiplier,
            staking_multiplier,
            price_volatility,
        }
    }

    pub fn default_set() -> Vec<Scenario> {
        vec![
            Scenario::new("base", "Expected adoption with moderate volatility", 1.0, 1.0, 1.0, 0.05),
            Scenario::new("bull", "Accelerated adoption and rising fee burn", 1.6, 1.2, 1.1, 0.08),
            Scenario::new("bear", "Slow adoption and weaker staking demand", 0.4, 0.8, 0.85, 0.10),
            Scenario::new("stress", "Stalled growth under heavy volatility", 0.1, 0.5, 0.6, 0.18),
        ]
    }

    fn validate(&self) -> SimResult<()> {
        let factors = [
            ("growth_multiplier", self.growth_multiplier),
            ("burn_multiplier", self.burn_multiplier),
            ("staking_multiplier", self.staking_multiplier),
            ("price_volatility", self.price_volatility),
        ];
        for (name, value) in factors {
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "Scenario {} has invalid {} {}",
                    self.name, name, value
                )));
            }
        }
        Ok(())
    }
}

/// Simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub initial_supply: Amount,
    pub initial_circulating: Amount,
    /// Emission per year; the last entry repeats past the end
    pub emission_schedule: Vec<Amount>,
    pub burn_rate: f64,
    pub staking_target: f64,
    pub initial_price: f64,
    pub initial_users: u64,
    pub initial_agents: u64,
    pub initial_tvl: f64,
    pub initial_monthly_revenue: f64,
    pub growth: GrowthAssumptions,
    pub equilibrium: EquilibriumTargets,
    pub scenarios: Vec<Scenario>,
    pub default_iterations: u32,
    /// Fixed seed for reproducible runs; drawn from entropy when absent
    pub default_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let supply = SupplyModel::default();
        Self {
            initial_supply: supply.initial_supply,
            initial_circulating: supply.initial_circulating,
            emission_schedule: supply.yearly_emission,
            burn_rate: supply.annual_burn_rate,
            staking_target: supply.staking_target,
            initial_price: 0.05,
            initial_users: 1_000,
            initial_agents: 50,
            initial_tvl: 1_000_000.0,
            initial_monthly_revenue: 25_000.0,
            growth: GrowthAssumptions::default(),
            equilibrium: EquilibriumTargets::default(),
            scenarios: Scenario::default_set(),
            default_iterations: 100,
            default_seed: None,
        }
    }
}

impl SimulationConfig {
    /// Defaults with the supply side taken from a valuation configuration
    pub fn from_valuation(valuation: &ValuationConfig) -> SimResult<Self> {
        valuation.validate()?;
        let supply = &valuation.supply;

        Ok(Self {
            initial_supply: supply.initial_supply.clone(),
            initial_circulating: supply.initial_circulating.clone(),
            emission_schedule: supply.yearly_emission.clone(),
            burn_rate: supply.annual_burn_rate,
            staking_target: supply.staking_target,
            initial_price: valuation.initial_price,
            equilibrium: valuation.targets.clone(),
            ..Default::default()
        })
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.initial_circulating > self.initial_supply {
            return Err(SimulationError::InvalidConfiguration(format!(
                "Initial circulating {} exceeds initial supply {}",
                self.initial_circulating, self.initial_supply
            )));
        }

        let ratios = [("burn_rate", self.burn_rate), ("staking_target", self.staking_target)];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("initial_price", self.initial_price),
            ("initial_tvl", self.initial_tvl),
            ("initial_monthly_revenue", self.initial_monthly_revenue),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        let growth = [
            ("user_growth", self.growth.user_growth),
            ("agent_growth", self.growth.agent_growth),
            ("tvl_growth", self.growth.tvl_growth),
            ("revenue_growth", self.growth.revenue_growth),
        ];
        for (name, value) in growth {
            if !value.is_finite() || value <= -1.0 {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "{} must be finite and above -1, got {}",
                    name, value
                )));
            }
        }

        if self.default_iterations == 0 || self.default_iterations > MAX_ITERATIONS {
            return Err(SimulationError::InvalidConfiguration(format!(
                "default_iterations must be within [1, {}], got {}",
                MAX_ITERATIONS, self.default_iterations
            )));
        }
        if self.scenarios.is_empty() {
            return Err(SimulationError::InvalidConfiguration(
                "At least one scenario is required".into(),
            ));
        }

        let mut names = HashSet::new();
        for scenario in &self.scenarios {
            scenario.validate()?;
            if !names.insert(scenario.name.as_str()) {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "Duplicate scenario {}",
                    scenario.name
                )));
            }
        }
        Ok(())
    }

    pub fn scenario(&self, name: &str) -> SimResult<&Scenario> {
        self.scenarios
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| SimulationError::UnknownScenario(name.to_string()))
    }

    /// Emission for a 0-based year index; zero when the schedule is empty
    pub fn emission_for_year_index(&self, index: usize) -> Amount {
        match self.emission_schedule.len() {
            0 => Amount::zero(),
            len => self.emission_schedule[index.min(len - 1)].clone(),
        }
    }
}
