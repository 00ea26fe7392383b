// simulation/src/simulator.rs

use crate::{
    monte_carlo,
    scenario::{Scenario, SimulationConfig},
    stats::ConfidenceBand,
    SimResult, SimulationError,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use token_core::{Amount, EventBus, EventPayload, MAX_HORIZON_YEARS};
use tokenomics::sustainability_score;

const MONTHS_PER_YEAR: u32 = 12;

/// Upper bound on the horizon of one run
pub const MAX_YEARS: u32 = MAX_HORIZON_YEARS;

/// Upper bound on Monte Carlo iterations per call
pub const MAX_ITERATIONS: u32 = 10_000;

/// Price never falls by more than 99% in a single month
const MIN_PRICE_FACTOR: f64 = 0.01;

const DEMAND_USER_WEIGHT: f64 = 0.5;
const DEMAND_TVL_WEIGHT: f64 = 0.3;
const DEMAND_REVENUE_WEIGHT: f64 = 0.2;

/// Parameters of one simulation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub years: u32,
    pub scenario: String,
    pub monte_carlo: bool,
    /// Falls back to the configured default
    pub iterations: Option<u32>,
    /// Falls back to the configured seed, then entropy
    pub seed: Option<u64>,
}

impl SimulationRequest {
    pub fn new(scenario: impl Into<String>, years: u32) -> Self {
        Self {
            years,
            scenario: scenario.into(),
            monte_carlo: false,
            iterations: None,
            seed: None,
        }
    }

    pub fn with_monte_carlo(mut self, iterations: Option<u32>) -> Self {
        self.monte_carlo = true;
        self.iterations = iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// State snapshot at the end of a simulated year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyProjection {
    pub year: u32,
    pub price: f64,
    pub circulating_supply: Amount,
    pub total_supply: Amount,
    pub staked: Amount,
    pub staking_ratio: f64,
    pub market_cap: f64,
    pub users: f64,
    pub agents: f64,
    pub tvl: f64,
    pub monthly_revenue: f64,
    /// Revenue earned during this year
    pub annual_revenue: f64,
    pub emitted: Amount,
    pub burned: Amount,
}

/// Aggregate figures over a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub final_price: f64,
    pub final_circulating_supply: Amount,
    pub final_total_supply: Amount,
    pub final_users: f64,
    pub final_agents: f64,
    pub final_tvl: f64,
    pub final_market_cap: f64,
    pub peak_price: f64,
    pub trough_price: f64,
    pub price_change_percent: f64,
    /// Mean of the monthly staking ratios
    pub average_staking_ratio: f64,
    pub cumulative_revenue: f64,
    pub sustainability_score: f64,
}

/// Output of a simulation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub scenario: String,
    pub years: u32,
    /// 1 for a single run
    pub iterations: u32,
    pub seed: u64,
    /// Single run, or iteration 0 under Monte Carlo
    pub projections: Vec<YearlyProjection>,
    pub summary: SimulationSummary,
    pub confidence_intervals: Option<Vec<ConfidenceBand>>,
}

/// Result of one seeded run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub projections: Vec<YearlyProjection>,
    pub summary: SimulationSummary,
}

/// Run the monthly loop once with the supplied generator; `years` is capped at [`MAX_YEARS`]
pub fn run_once(
    config: &SimulationConfig,
    scenario: &Scenario,
    years: u32,
    rng: &mut ChaCha8Rng,
) -> RunOutcome {
    let years = years.min(MAX_YEARS);
    let growth = &config.growth;
    let staking_share = (config.staking_target * scenario.staking_multiplier).min(1.0);
    let monthly_burn_rate =
        config.burn_rate * scenario.burn_multiplier / MONTHS_PER_YEAR as f64;

    let mut users = config.initial_users as f64;
    let mut agents = config.initial_agents as f64;
    let mut tvl = config.initial_tvl;
    let mut revenue = config.initial_monthly_revenue;
    let mut price = config.initial_price;
    let mut circulating = config.initial_circulating.clone();
    let mut total_supply = config.initial_supply.clone();
    let mut staked = circulating.mul_rate(staking_share);

    let mut peak_price = price;
    let mut trough_price = price;
    let mut staking_ratio_sum = 0.0;
    let mut cumulative_revenue = 0.0;

    let mut projections = Vec::with_capacity(years as usize);
    let mut year_revenue = 0.0;
    let mut year_emitted = Amount::zero();
    let mut year_burned = Amount::zero();

    let months = years.saturating_mul(MONTHS_PER_YEAR);
    for month in 0..months {
        let year_index = (month / MONTHS_PER_YEAR) as usize;
        let factor = growth.adoption_curve.factor(month);
        let scale = scenario.growth_multiplier * factor;

        let g_users = growth.user_growth * scale;
        let g_agents = growth.agent_growth * scale;
        let g_tvl = growth.tvl_growth * scale;
        let g_revenue = growth.revenue_growth * scale;

        users *= 1.0 + g_users;
        agents *= 1.0 + g_agents;
        tvl *= 1.0 + g_tvl;
        revenue *= 1.0 + g_revenue;
        year_revenue += revenue;
        cumulative_revenue += revenue;

        let circulating_before = circulating.clone();
        let emission = config
            .emission_for_year_index(year_index)
            .div_u64(MONTHS_PER_YEAR as u64);
        circulating = circulating + emission.clone();
        let burn = circulating.mul_rate(monthly_burn_rate);
        circulating = circulating.saturating_sub(&burn);
        total_supply = (total_supply + emission.clone()).saturating_sub(&burn);
        staked = circulating.mul_rate(staking_share);

        let supply_growth = if circulating_before.is_zero() {
            0.0
        } else {
            (emission.to_f64() - burn.to_f64()) / circulating_before.to_f64()
        };
        let demand = DEMAND_USER_WEIGHT * g_users
            + DEMAND_TVL_WEIGHT * g_tvl
            + DEMAND_REVENUE_WEIGHT * g_revenue;
        let shock: f64 = rng.sample(StandardNormal);
        price *= (1.0 + demand - supply_growth + scenario.price_volatility * shock)
            .max(MIN_PRICE_FACTOR);

        peak_price = peak_price.max(price);
        trough_price = trough_price.min(price);
        staking_ratio_sum += staked.ratio_of(&circulating);
        year_emitted = year_emitted + emission;
        year_burned = year_burned + burn;

        if (month + 1) % MONTHS_PER_YEAR == 0 {
            projections.push(YearlyProjection {
                year: (month + 1) / MONTHS_PER_YEAR,
                price,
                market_cap: circulating.to_f64() * price,
                staking_ratio: staked.ratio_of(&circulating),
                circulating_supply: circulating.clone(),
                total_supply: total_supply.clone(),
                staked: staked.clone(),
                users,
                agents,
                tvl,
                monthly_revenue: revenue,
                annual_revenue: year_revenue,
                emitted: std::mem::replace(&mut year_emitted, Amount::zero()),
                burned: std::mem::replace(&mut year_burned, Amount::zero()),
            });
            year_revenue = 0.0;
        }
    }

    let average_staking_ratio = if months > 0 {
        staking_ratio_sum / months as f64
    } else {
        staked.ratio_of(&circulating)
    };
    let market_cap = circulating.to_f64() * price;
    let liquidity_ratio = if market_cap > 0.0 {
        (tvl / market_cap).min(1.0)
    } else {
        0.0
    };
    let price_change_percent = if config.initial_price > 0.0 {
        (price / config.initial_price - 1.0) * 100.0
    } else {
        0.0
    };

    let summary = SimulationSummary {
        final_price: price,
        final_circulating_supply: circulating,
        final_total_supply: total_supply,
        final_users: users,
        final_agents: agents,
        final_tvl: tvl,
        final_market_cap: market_cap,
        peak_price,
        trough_price,
        price_change_percent,
        average_staking_ratio,
        cumulative_revenue,
        sustainability_score: sustainability_score(
            config.equilibrium.staking_ratio - average_staking_ratio,
            config.equilibrium.liquidity_ratio - liquidity_ratio,
        ),
    };

    RunOutcome {
        projections,
        summary,
    }
}

/// Runs configured scenarios, singly or under Monte Carlo
pub struct ScenarioSimulator {
    config: SimulationConfig,
    events: Arc<EventBus>,
}

impl ScenarioSimulator {
    pub fn new(config: SimulationConfig, events: Arc<EventBus>) -> SimResult<Self> {
        config.validate()?;
        tracing::info!(
            "Scenario simulator initialised with {} scenarios",
            config.scenarios.len()
        );
        Ok(Self { config, events })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn run_simulation(&self, request: &SimulationRequest) -> SimResult<SimulationResult> {
        let scenario = self.config.scenario(&request.scenario)?;

        if request.years == 0 || request.years > MAX_YEARS {
            return Err(SimulationError::InvalidRequest(format!(
                "years must be within [1, {}], got {}",
                MAX_YEARS, request.years
            )));
        }
        let iterations = request.iterations.unwrap_or(self.config.default_iterations);
        if request.monte_carlo && (iterations == 0 || iterations > MAX_ITERATIONS) {
            return Err(SimulationError::InvalidRequest(format!(
                "iterations must be within [1, {}], got {}",
                MAX_ITERATIONS, iterations
            )));
        }

        let seed = request
            .seed
            .or(self.config.default_seed)
            .unwrap_or_else(rand::random);

        tracing::info!(
            "Running {} scenario for {} years (monte_carlo: {}, seed: {})",
            scenario.name,
            request.years,
            request.monte_carlo,
            seed
        );

        let result = if request.monte_carlo {
            let outcome = monte_carlo::run_monte_carlo(
                &self.config,
                scenario,
                request.years,
                iterations,
                seed,
            );
            SimulationResult {
                scenario: scenario.name.clone(),
                years: request.years,
                iterations,
                seed,
                projections: outcome.first.projections,
                summary: outcome.first.summary,
                confidence_intervals: Some(outcome.confidence_intervals),
            }
        } else {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let outcome = run_once(&self.config, scenario, request.years, &mut rng);
            SimulationResult {
                scenario: scenario.name.clone(),
                years: request.years,
                iterations: 1,
                seed,
                projections: outcome.projections,
                summary: outcome.summary,
                confidence_intervals: None,
            }
        };

        tracing::debug!(
            "Scenario {} finished: final price {:.6}, sustainability {:.1}",
            result.scenario,
            result.summary.final_price,
            result.summary.sustainability_score
        );

        self.events.emit(EventPayload::SimulationCompleted {
            scenario: result.scenario.clone(),
            years: result.years,
            iterations: result.iterations,
            final_price: result.summary.final_price,
            seed,
        });

        Ok(result)
    }

    /// Single run of every configured scenario on the same seed
    pub fn compare_scenarios(
        &self,
        years: u32,
        seed: Option<u64>,
    ) -> SimResult<Vec<SimulationResult>> {
        let seed = seed
            .or(self.config.default_seed)
            .unwrap_or_else(rand::random);

        self.config
            .scenarios
            .iter()
            .map(|scenario| {
                let request = SimulationRequest::new(scenario.name.clone(), years).with_seed(seed);
                self.run_simulation(&request)
            })
            .collect()
    }
}
