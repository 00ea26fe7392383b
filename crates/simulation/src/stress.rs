// simulation/src/stress.rs

use crate::{SimResult, SimulationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use token_core::{BasisPoints, EventBus, EventPayload};

/// Drawdown above which trading is paused
const EMERGENCY_PAUSE_DRAWDOWN: f64 = 0.5;
/// Staking ratio below which staking incentives are boosted
const STAKING_BOOST_RATIO: f64 = 0.3;
/// Liquidity ratio below which treasury liquidity is injected
const LIQUIDITY_INJECTION_RATIO: f64 = 0.05;

const SURVIVAL_MIN_STAKING: f64 = 0.2;
const SURVIVAL_MIN_LIQUIDITY: f64 = 0.03;
const SURVIVAL_MAX_DRAWDOWN: f64 = 0.95;

/// Price recovered per day after a shock, in basis points (2%)
const RECOVERY_BPS_PER_DAY: u32 = 200;

/// A market shock; negative impacts are adverse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressScenario {
    pub name: String,
    pub trigger: String,
    pub price_impact: f64,
    pub staking_impact: f64,
    pub liquidity_impact: f64,
    pub duration_days: u32,
}

impl StressScenario {
    pub fn new(
        name: impl Into<String>,
        trigger: impl Into<String>,
        price_impact: f64,
        staking_impact: f64,
        liquidity_impact: f64,
        duration_days: u32,
    ) -> Self {
        Self {
            name: name.into(),
            trigger: trigger.into(),
            price_impact,
            staking_impact,
            liquidity_impact,
            duration_days,
        }
    }

    pub fn catalog() -> Vec<StressScenario> {
        vec![
            StressScenario::new("market_crash", "Broad crypto market sell-off", -0.60, -0.30, -0.40, 30),
            StressScenario::new("mass_unstaking", "Large holders exit staking together", -0.30, -0.55, -0.20, 14),
            StressScenario::new("protocol_exploit", "Contract exploit drains pool liquidity", -0.75, -0.40, -0.70, 60),
            StressScenario::new("regulatory_action", "Adverse ruling in a major market", -0.45, -0.20, -0.35, 90),
        ]
    }

    pub fn validate(&self) -> SimResult<()> {
        let impacts = [
            ("price_impact", self.price_impact),
            ("staking_impact", self.staking_impact),
            ("liquidity_impact", self.liquidity_impact),
        ];
        for (name, value) in impacts {
            if !value.is_finite() || value < -1.0 {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "Stress scenario {} has invalid {} {}",
                    self.name, name, value
                )));
            }
        }
        Ok(())
    }
}

/// Stress catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    pub scenarios: Vec<StressScenario>,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            scenarios: StressScenario::catalog(),
        }
    }
}

/// Market state a shock is applied to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSnapshot {
    pub price: f64,
    pub staking_ratio: f64,
    pub liquidity_ratio: f64,
}

impl Default for MarketSnapshot {
    fn default() -> Self {
        Self {
            price: 0.05,
            staking_ratio: 0.40,
            liquidity_ratio: 0.15,
        }
    }
}

/// Automatic responses raised under stress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitBreaker {
    EmergencyPause,
    StakingIncentiveBoost,
    LiquidityInjection,
}

impl CircuitBreaker {
    pub fn recommendation(&self) -> &'static str {
        match self {
            CircuitBreaker::EmergencyPause => {
                "Pause trading and emissions until the price stabilises"
            }
            CircuitBreaker::StakingIncentiveBoost => {
                "Raise staking rewards temporarily to slow unstaking"
            }
            CircuitBreaker::LiquidityInjection => {
                "Deploy treasury reserves into the thinnest pools"
            }
        }
    }
}

impl std::fmt::Display for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CircuitBreaker::EmergencyPause => "emergency_pause",
            CircuitBreaker::StakingIncentiveBoost => "staking_incentive_boost",
            CircuitBreaker::LiquidityInjection => "liquidity_injection",
        };
        f.write_str(name)
    }
}

/// Catalog entry by name, or an ad-hoc scenario
#[derive(Debug, Clone)]
pub enum StressInput {
    Named(String),
    Custom(StressScenario),
}

/// Outcome of one stress test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressTestResult {
    pub scenario: String,
    pub trigger: String,
    pub before: MarketSnapshot,
    pub stressed: MarketSnapshot,
    pub drawdown: f64,
    pub survived: bool,
    pub circuit_breakers: Vec<CircuitBreaker>,
    pub recovery_time_days: u64,
    pub duration_days: u32,
    pub recommendations: Vec<String>,
}

/// Ratio after a fractional impact, never negative
fn apply_impact(value: f64, impact: f64) -> f64 {
    (value * (1.0 + impact)).max(0.0)
}

/// `ceil(|price_impact| / 2%)` computed on whole basis points
fn recovery_days(price_impact: f64) -> u64 {
    let bps = BasisPoints::from_fraction(price_impact.abs()).value();
    bps.div_ceil(RECOVERY_BPS_PER_DAY) as u64
}

/// Evaluate one scenario against a snapshot
pub fn evaluate(scenario: &StressScenario, snapshot: &MarketSnapshot) -> StressTestResult {
    let drawdown = (-scenario.price_impact).max(0.0);
    let stressed = MarketSnapshot {
        price: apply_impact(snapshot.price, scenario.price_impact),
        staking_ratio: apply_impact(snapshot.staking_ratio, scenario.staking_impact),
        liquidity_ratio: apply_impact(snapshot.liquidity_ratio, scenario.liquidity_impact),
    };

    let mut circuit_breakers = Vec::new();
    if drawdown > EMERGENCY_PAUSE_DRAWDOWN {
        circuit_breakers.push(CircuitBreaker::EmergencyPause);
    }
    if stressed.staking_ratio < STAKING_BOOST_RATIO {
        circuit_breakers.push(CircuitBreaker::StakingIncentiveBoost);
    }
    if stressed.liquidity_ratio < LIQUIDITY_INJECTION_RATIO {
        circuit_breakers.push(CircuitBreaker::LiquidityInjection);
    }

    let survived = stressed.staking_ratio > SURVIVAL_MIN_STAKING
        && stressed.liquidity_ratio > SURVIVAL_MIN_LIQUIDITY
        && drawdown < SURVIVAL_MAX_DRAWDOWN;

    StressTestResult {
        scenario: scenario.name.clone(),
        trigger: scenario.trigger.clone(),
        before: *snapshot,
        stressed,
        drawdown,
        survived,
        recommendations: circuit_breakers
            .iter()
            .map(|b| b.recommendation().to_string())
            .collect(),
        circuit_breakers,
        recovery_time_days: recovery_days(scenario.price_impact),
        duration_days: scenario.duration_days,
    }
}

/// Applies catalog or ad-hoc shocks and reports them on the event bus
pub struct StressTester {
    config: StressConfig,
    events: Arc<EventBus>,
}

impl StressTester {
    pub fn new(config: StressConfig, events: Arc<EventBus>) -> SimResult<Self> {
        let mut names = HashSet::new();
        for scenario in &config.scenarios {
            scenario.validate()?;
            if !names.insert(scenario.name.as_str()) {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "Duplicate stress scenario {}",
                    scenario.name
                )));
            }
        }
        Ok(Self { config, events })
    }

    pub fn scenarios(&self) -> &[StressScenario] {
        &self.config.scenarios
    }

    pub fn scenario(&self, name: &str) -> SimResult<&StressScenario> {
        self.config
            .scenarios
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| SimulationError::UnknownStressScenario(name.to_string()))
    }

    pub fn run_stress_test(
        &self,
        input: StressInput,
        snapshot: &MarketSnapshot,
    ) -> SimResult<StressTestResult> {
        let scenario = match input {
            StressInput::Named(name) => self.scenario(&name)?.clone(),
            StressInput::Custom(scenario) => {
                scenario.validate()?;
                scenario
            }
        };

        let result = evaluate(&scenario, snapshot);
        self.report(&result);
        Ok(result)
    }

    /// Every catalog scenario against the same snapshot
    pub fn run_full_suite(&self, snapshot: &MarketSnapshot) -> Vec<StressTestResult> {
        self.config
            .scenarios
            .iter()
            .map(|scenario| {
                let result = evaluate(scenario, snapshot);
                self.report(&result);
                result
            })
            .collect()
    }

    fn report(&self, result: &StressTestResult) {
        if result.survived {
            tracing::info!(
                "Stress test {} survived, drawdown {:.0}%, breakers: {:?}",
                result.scenario,
                result.drawdown * 100.0,
                result.circuit_breakers
            );
        } else {
            tracing::warn!(
                "Stress test {} failed, drawdown {:.0}%, breakers: {:?}",
                result.scenario,
                result.drawdown * 100.0,
                result.circuit_breakers
            );
        }

        self.events.emit(EventPayload::StressTestTriggered {
            scenario: result.scenario.clone(),
            survived: result.survived,
            circuit_breakers: result.circuit_breakers.iter().map(|b| b.to_string()).collect(),
            drawdown: result.drawdown,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tester() -> StressTester {
        StressTester::new(StressConfig::default(), EventBus::shared()).unwrap()
    }

    fn run(name: &str) -> StressTestResult {
        tester()
            .run_stress_test(StressInput::Named(name.into()), &MarketSnapshot::default())
            .unwrap()
    }

    #[test]
    fn test_breakers_serialize_snake_case() {
        let json = serde_json::to_value(run("protocol_exploit")).unwrap();
        assert_eq!(json["circuit_breakers"][0], "emergency_pause");
        assert_eq!(json["scenario"], "protocol_exploit");
    }

    #[test]
    fn test_market_crash() {
        let result = run("market_crash");
        assert!((result.stressed.staking_ratio - 0.28).abs() < 1e-9);
        assert!((result.stressed.liquidity_ratio - 0.09).abs() < 1e-9);
        assert!((result.stressed.price - 0.02).abs() < 1e-12);
        assert_eq!(
            result.circuit_breakers,
            vec![CircuitBreaker::EmergencyPause, CircuitBreaker::StakingIncentiveBoost]
        );
        assert!(result.survived);
        assert_eq!(result.recovery_time_days, 30);
        assert_eq!(result.recommendations.len(), 2);
    }

    #[test]
    fn test_mass_unstaking_fails() {
        let result = run("mass_unstaking");
        assert!(!result.survived);
        assert_eq!(result.circuit_breakers, vec![CircuitBreaker::StakingIncentiveBoost]);
        assert_eq!(result.recovery_time_days, 15);
    }

    #[test]
    fn test_protocol_exploit() {
        let result = run("protocol_exploit");
        assert_eq!(
            result.circuit_breakers,
            vec![
                CircuitBreaker::EmergencyPause,
                CircuitBreaker::StakingIncentiveBoost,
                CircuitBreaker::LiquidityInjection,
            ]
        );
        assert!(result.survived);
        assert_eq!(result.recovery_time_days, 38);
    }

    #[test]
    fn test_regulatory_action() {
        let result = run("regulatory_action");
        assert!(result.circuit_breakers.is_empty());
        assert!(result.survived);
        assert_eq!(result.recovery_time_days, 23);
    }

    #[test]
    fn test_null_scenario() {
        let result = tester()
            .run_stress_test(
                StressInput::Custom(StressScenario::new("calm", "none", 0.0, 0.0, 0.0, 0)),
                &MarketSnapshot::default(),
            )
            .unwrap();
        assert!(result.survived);
        assert!(result.circuit_breakers.is_empty());
        assert_eq!(result.recovery_time_days, 0);
        assert_eq!(result.stressed, result.before);
    }

    #[test]
    fn test_total_wipeout_clamps() {
        let result = tester()
            .run_stress_test(
                StressInput::Custom(StressScenario::new("wipeout", "", -1.0, -1.0, -1.0, 365)),
                &MarketSnapshot::default(),
            )
            .unwrap();
        assert_eq!(result.stressed.price, 0.0);
        assert_eq!(result.drawdown, 1.0);
        assert!(!result.survived);
        assert_eq!(result.recovery_time_days, 50);
    }

    #[test]
    fn test_unknown_and_invalid_inputs() {
        let tester = tester();
        assert!(matches!(
            tester.run_stress_test(StressInput::Named("meteor".into()), &MarketSnapshot::default()),
            Err(SimulationError::UnknownStressScenario(_))
        ));
        assert!(matches!(
            tester.run_stress_test(
                StressInput::Custom(StressScenario::new("bad", "", -1.5, 0.0, 0.0, 1)),
                &MarketSnapshot::default()
            ),
            Err(SimulationError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_full_suite_emits_events() {
        let events = EventBus::shared();
        let tester = StressTester::new(StressConfig::default(), events.clone()).unwrap();
        let results = tester.run_full_suite(&MarketSnapshot::default());

        assert_eq!(results.len(), 4);
        assert_eq!(events.history_len(), 4);
        match &events.recent(4)[1].payload {
            EventPayload::StressTestTriggered { scenario, survived, circuit_breakers, .. } => {
                assert_eq!(scenario, "mass_unstaking");
                assert!(!survived);
                assert_eq!(circuit_breakers, &vec!["staking_incentive_boost".to_string()]);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
