// engine/src/runtime.rs
use crate::config::EngineConfig;
use liquidity::{
    FlywheelMetrics, FlywheelMonitor, FlywheelStage, HealthAlert, LiquidityHealth,
    LiquidityResult, PoolConfig, RewardEstimate,
};
use serde::{Deserialize, Serialize};
use simulation::{
    MarketSnapshot, ScenarioSimulator, SimResult, SimulationRequest, SimulationResult,
    StressInput, StressTestResult, StressTester,
};
use std::sync::Arc;
use token_core::{Amount, EventBus};
use tokenomics::{
    EquilibriumAnalysis, IncentiveKind, IncentiveReward, LaunchController, LaunchPhase,
    LaunchProgress, SupplyProjection, TgeOverrides, TgeSimulation, TokenomicsResult,
    TransactionValidation, ValuationMetrics, ValuationModel,
};

/// Combined view of every component, used by the CLI status output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub launch: LaunchProgress,
    pub flywheel: FlywheelMetrics,
    pub health: LiquidityHealth,
    pub valuation: ValuationMetrics,
    pub equilibrium: EquilibriumAnalysis,
    pub events_recorded: usize,
}

/// Tokenomics engine: every component wired to one event bus
pub struct TokenomicsEngine {
    config: EngineConfig,
    events: Arc<EventBus>,
    launch: LaunchController,
    flywheel: FlywheelMonitor,
    valuation: ValuationModel,
    simulator: ScenarioSimulator,
    stress: StressTester,
}

impl TokenomicsEngine {
    pub fn new(config: EngineConfig) -> anyhow::Result<Self> {
        Self::with_event_bus(config, EventBus::shared())
    }

    /// Build on an existing bus so callers can subscribe before construction
    pub fn with_event_bus(config: EngineConfig, events: Arc<EventBus>) -> anyhow::Result<Self> {
        tracing::info!("Initializing tokenomics engine");

        tracing::info!("Initializing launch controller...");
        let launch = LaunchController::new(config.launch.clone(), events.clone())?;

        tracing::info!("Initializing flywheel monitor...");
        let flywheel = FlywheelMonitor::new(config.liquidity.clone(), events.clone())?;

        tracing::info!("Initializing valuation model...");
        let valuation = ValuationModel::new(config.valuation.clone())?;

        tracing::info!("Initializing scenario simulator...");
        let simulator = ScenarioSimulator::new(config.simulation.clone(), events.clone())?;

        tracing::info!("Initializing stress tester...");
        let stress = StressTester::new(config.stress.clone(), events.clone())?;

        tracing::info!("Tokenomics engine initialized");

        Ok(Self {
            config,
            events,
            launch,
            flywheel,
            valuation,
            simulator,
            stress,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn launch(&self) -> &LaunchController {
        &self.launch
    }

    pub fn launch_mut(&mut self) -> &mut LaunchController {
        &mut self.launch
    }

    pub fn flywheel(&self) -> &FlywheelMonitor {
        &self.flywheel
    }

    pub fn flywheel_mut(&mut self) -> &mut FlywheelMonitor {
        &mut self.flywheel
    }

    pub fn valuation(&self) -> &ValuationModel {
        &self.valuation
    }

    pub fn valuation_mut(&mut self) -> &mut ValuationModel {
        &mut self.valuation
    }

    pub fn simulator(&self) -> &ScenarioSimulator {
        &self.simulator
    }

    pub fn stress_tester(&self) -> &StressTester {
        &self.stress
    }

    // Launch

    pub fn advance_phase(&mut self) -> Option<LaunchPhase> {
        self.launch.advance_phase()
    }

    pub fn get_progress(&self) -> LaunchProgress {
        self.launch.get_progress()
    }

    pub fn simulate_tge(&self, overrides: &TgeOverrides) -> TgeSimulation {
        self.launch.simulate_tge(overrides)
    }

    pub fn validate_transaction(
        &self,
        amount: &Amount,
        wallet_balance: &Amount,
        days_since_launch: u64,
    ) -> TransactionValidation {
        self.launch
            .validate_transaction(amount, wallet_balance, days_since_launch)
    }

    pub fn calculate_incentive_reward(
        &self,
        kind: IncentiveKind,
        base: &Amount,
    ) -> IncentiveReward {
        self.launch.calculate_incentive_reward(kind, base)
    }

    // Liquidity

    pub fn pools(&self) -> &[PoolConfig] {
        self.flywheel.pools()
    }

    pub fn calculate_apy(
        &self,
        pair: &str,
        lock_period_days: u32,
        boost_enabled: bool,
    ) -> LiquidityResult<f64> {
        self.flywheel.calculate_apy(pair, lock_period_days, boost_enabled)
    }

    pub fn estimate_rewards(
        &self,
        pair: &str,
        amount: &Amount,
        lock_period_days: u32,
    ) -> LiquidityResult<RewardEstimate> {
        self.flywheel.estimate_rewards(pair, amount, lock_period_days)
    }

    pub fn get_flywheel_stage(&self) -> FlywheelStage {
        self.flywheel.get_flywheel_stage()
    }

    pub fn get_flywheel_metrics(&self) -> FlywheelMetrics {
        self.flywheel.get_flywheel_metrics()
    }

    pub fn get_liquidity_health(&self) -> LiquidityHealth {
        self.flywheel.get_liquidity_health()
    }

    pub fn check_health_alerts(&self) -> Vec<HealthAlert> {
        self.flywheel.check_health_alerts()
    }

    // Valuation

    pub fn project_supply(&self, years: u32) -> TokenomicsResult<Vec<SupplyProjection>> {
        self.valuation.project_supply(years)
    }

    pub fn current_metrics(&self) -> ValuationMetrics {
        self.valuation.current_metrics()
    }

    pub fn calculate_equilibrium(&self) -> EquilibriumAnalysis {
        self.valuation.calculate_equilibrium()
    }

    // Simulation

    pub fn run_simulation(&self, request: &SimulationRequest) -> SimResult<SimulationResult> {
        self.simulator.run_simulation(request)
    }

    pub fn compare_scenarios(
        &self,
        years: u32,
        seed: Option<u64>,
    ) -> SimResult<Vec<SimulationResult>> {
        self.simulator.compare_scenarios(years, seed)
    }

    // Stress

    /// Market state taken from the valuation model
    pub fn market_snapshot(&self) -> MarketSnapshot {
        let metrics = self.valuation.current_metrics();
        MarketSnapshot {
            price: metrics.price,
            staking_ratio: metrics.staking_ratio,
            liquidity_ratio: self.valuation.config().assumed_liquidity_ratio,
        }
    }

    pub fn run_stress_test(
        &self,
        input: StressInput,
        snapshot: &MarketSnapshot,
    ) -> SimResult<StressTestResult> {
        self.stress.run_stress_test(input, snapshot)
    }

    pub fn run_full_suite(&self, snapshot: &MarketSnapshot) -> Vec<StressTestResult> {
        self.stress.run_full_suite(snapshot)
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            launch: self.launch.get_progress(),
            flywheel: self.flywheel.get_flywheel_metrics(),
            health: self.flywheel.get_liquidity_health(),
            valuation: self.valuation.current_metrics(),
            equilibrium: self.valuation.calculate_equilibrium(),
            events_recorded: self.events.history_len(),
        }
    }
}
