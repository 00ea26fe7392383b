// liquidity/src/flywheel.rs

use crate::{
    health::{HealthAlert, HealthThresholds, LiquidityHealth},
    pool::{self, PoolConfig, RewardEstimate},
    LiquidityError, LiquidityResult,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use token_core::{clamp_score, Amount, EventBus, EventPayload, HealthStatus};

/// TVL at which the TVL sub-score of velocity saturates
const VELOCITY_TVL_TARGET: f64 = 10_000_000.0;

/// Provider count at which the provider sub-score saturates
const VELOCITY_PROVIDER_TARGET: f64 = 500.0;

const VELOCITY_TVL_WEIGHT: f64 = 0.4;
const VELOCITY_PROVIDER_WEIGHT: f64 = 0.3;
const VELOCITY_HEALTH_WEIGHT: f64 = 0.3;

/// Emission shares may overshoot 1.0 by float noise only
const EMISSION_SHARE_TOLERANCE: f64 = 1e-9;

struct StageBand {
    stage: u8,
    name: &'static str,
    description: &'static str,
    metrics: &'static [&'static str],
    min_tvl: u64,
    max_tvl: Option<u64>,
}

/// Fixed TVL bands; the last one is open-ended
static STAGE_BANDS: [StageBand; 5] = [
    StageBand {
        stage: 1,
        name: "Bootstrap",
        description: "Emission-funded liquidity attracts the first providers",
        metrics: &["TVL under 100K", "Rewards mostly from emissions", "Handful of core LPs"],
        min_tvl: 0,
        max_tvl: Some(100_000),
    },
    StageBand {
        stage: 2,
        name: "Early Traction",
        description: "Organic volume starts to supplement emissions",
        metrics: &["TVL 100K to 1M", "First protocol integrations", "Fees cover part of rewards"],
        min_tvl: 100_000,
        max_tvl: Some(1_000_000),
    },
    StageBand {
        stage: 3,
        name: "Growth",
        description: "Fees and staking demand reinforce each other",
        metrics: &["TVL 1M to 10M", "Tight spreads on core pairs", "Growing provider base"],
        min_tvl: 1_000_000,
        max_tvl: Some(10_000_000),
    },
    StageBand {
        stage: 4,
        name: "Expansion",
        description: "Deep multi-pool liquidity supports external protocols",
        metrics: &["TVL 10M to 100M", "Cross-protocol composability", "Emissions taper"],
        min_tvl: 10_000_000,
        max_tvl: Some(100_000_000),
    },
    StageBand {
        stage: 5,
        name: "Maturity",
        description: "Fee revenue sustains rewards without emission subsidies",
        metrics: &["TVL above 100M", "Self-sustaining yields", "Governance-led parameter tuning"],
        min_tvl: 100_000_000,
        max_tvl: None,
    },
];

/// Narrative growth stage keyed off TVL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlywheelStage {
    pub stage: u8,
    pub name: String,
    pub description: String,
    pub metrics: Vec<String>,
    pub min_tvl: u64,
    pub max_tvl: Option<u64>,
}

impl FlywheelStage {
    /// Classify a TVL into its band
    pub fn for_tvl(tvl: &Amount) -> FlywheelStage {
        let band = STAGE_BANDS
            .iter()
            .find(|band| match band.max_tvl {
                Some(max) => tvl < &Amount::from_u64(max),
                None => true,
            })
            .unwrap_or(&STAGE_BANDS[STAGE_BANDS.len() - 1]);

        FlywheelStage {
            stage: band.stage,
            name: band.name.to_string(),
            description: band.description.to_string(),
            metrics: band.metrics.iter().map(|m| m.to_string()).collect(),
            min_tvl: band.min_tvl,
            max_tvl: band.max_tvl,
        }
    }
}

/// Live liquidity state, mutated only through the setters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlywheelState {
    tvl: Amount,
    liquidity_depth: Amount,
    average_spread: f64,
    utilization: f64,
    top_holder_concentration: f64,
    active_providers: u64,
    pending_rewards: Amount,
    distributed_rewards: Amount,
}

fn check_ratio(name: &str, value: f64, max: Option<f64>) -> LiquidityResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(LiquidityError::InvalidMetric(format!(
            "{} must be a finite non-negative number, got {}",
            name, value
        )));
    }
    if let Some(max) = max {
        if value > max {
            return Err(LiquidityError::InvalidMetric(format!(
                "{} must not exceed {}, got {}",
                name, max, value
            )));
        }
    }
    Ok(())
}

impl FlywheelState {
    pub fn tvl(&self) -> &Amount {
        &self.tvl
    }

    pub fn liquidity_depth(&self) -> &Amount {
        &self.liquidity_depth
    }

    pub fn average_spread(&self) -> f64 {
        self.average_spread
    }

    pub fn utilization(&self) -> f64 {
        self.utilization
    }

    pub fn top_holder_concentration(&self) -> f64 {
        self.top_holder_concentration
    }

    pub fn active_providers(&self) -> u64 {
        self.active_providers
    }

    pub fn pending_rewards(&self) -> &Amount {
        &self.pending_rewards
    }

    pub fn distributed_rewards(&self) -> &Amount {
        &self.distributed_rewards
    }

    pub fn set_tvl(&mut self, tvl: Amount) {
        self.tvl = tvl;
    }

    pub fn set_liquidity_depth(&mut self, depth: Amount) {
        self.liquidity_depth = depth;
    }

    pub fn set_average_spread(&mut self, spread: f64) -> LiquidityResult<()> {
        check_ratio("Average spread", spread, None)?;
        self.average_spread = spread;
        Ok(())
    }

    pub fn set_utilization(&mut self, utilization: f64) -> LiquidityResult<()> {
        check_ratio("Utilization", utilization, Some(1.0))?;
        self.utilization = utilization;
        Ok(())
    }

    pub fn set_concentration(&mut self, concentration: f64) -> LiquidityResult<()> {
        check_ratio("Top holder concentration", concentration, Some(1.0))?;
        self.top_holder_concentration = concentration;
        Ok(())
    }

    pub fn set_active_providers(&mut self, providers: u64) {
        self.active_providers = providers;
    }

    /// A new provider deposits `amount`
    pub fn add_liquidity(&mut self, amount: &Amount) {
        self.tvl = self.tvl.clone() + amount.clone();
        self.liquidity_depth = self.liquidity_depth.clone() + amount.clone();
        self.active_providers = self.active_providers.saturating_add(1);
    }

    /// A provider withdraws `amount` and leaves
    pub fn remove_liquidity(&mut self, amount: &Amount) -> LiquidityResult<()> {
        let remaining = self.tvl.checked_sub(amount).ok_or_else(|| {
            LiquidityError::InsufficientLiquidity {
                required: amount.clone(),
                available: self.tvl.clone(),
            }
        })?;
        self.tvl = remaining;
        self.liquidity_depth = self.liquidity_depth.saturating_sub(amount);
        self.active_providers = self.active_providers.saturating_sub(1);
        Ok(())
    }

    pub fn accrue_rewards(&mut self, amount: &Amount) {
        self.pending_rewards = self.pending_rewards.clone() + amount.clone();
    }

    /// Move `amount` from pending to distributed
    pub fn distribute_rewards(&mut self, amount: &Amount) -> LiquidityResult<()> {
        let remaining = self.pending_rewards.checked_sub(amount).ok_or_else(|| {
            LiquidityError::InsufficientRewards {
                required: amount.clone(),
                pending: self.pending_rewards.clone(),
            }
        })?;
        self.pending_rewards = remaining;
        self.distributed_rewards = self.distributed_rewards.clone() + amount.clone();
        Ok(())
    }
}

/// Liquidity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiquidityConfig {
    pub pools: Vec<PoolConfig>,
    pub thresholds: HealthThresholds,
}

impl Default for LiquidityConfig {
    fn default() -> Self {
        Self {
            pools: PoolConfig::default_set(),
            thresholds: HealthThresholds::default(),
        }
    }
}

impl LiquidityConfig {
    pub fn validate(&self) -> LiquidityResult<()> {
        let mut seen = HashSet::new();
        for pool in &self.pools {
            pool.validate()?;
            if !seen.insert(pool.pair.as_str()) {
                return Err(LiquidityError::InvalidConfiguration(format!(
                    "Duplicate pool pair {}",
                    pool.pair
                )));
            }
        }

        let total_share = self.total_emission_share();
        if total_share > 1.0 + EMISSION_SHARE_TOLERANCE {
            return Err(LiquidityError::InvalidConfiguration(format!(
                "Pool emission shares sum to {}, must not exceed 1",
                total_share
            )));
        }

        self.thresholds.validate()
    }

    pub fn total_emission_share(&self) -> f64 {
        self.pools.iter().map(|p| p.emission_share).sum()
    }
}

/// Flywheel summary figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlywheelMetrics {
    pub tvl: Amount,
    pub stage: FlywheelStage,
    /// Composite 0-100
    pub velocity: f64,
    pub active_providers: u64,
    pub pending_rewards: Amount,
    pub distributed_rewards: Amount,
    pub health: HealthStatus,
    pub health_score: f64,
    pub total_emission_share: f64,
}

/// Pool registry plus live liquidity state
pub struct FlywheelMonitor {
    config: LiquidityConfig,
    state: FlywheelState,
    events: Arc<EventBus>,
}

impl FlywheelMonitor {
    pub fn new(config: LiquidityConfig, events: Arc<EventBus>) -> LiquidityResult<Self> {
        config.validate()?;
        tracing::info!(
            "Flywheel monitor initialised with {} pools",
            config.pools.len()
        );

        Ok(Self {
            config,
            state: FlywheelState::default(),
            events,
        })
    }

    pub fn config(&self) -> &LiquidityConfig {
        &self.config
    }

    pub fn state(&self) -> &FlywheelState {
        &self.state
    }

    pub fn pools(&self) -> &[PoolConfig] {
        &self.config.pools
    }

    pub fn pool(&self, pair: &str) -> LiquidityResult<&PoolConfig> {
        pool::find_pool(&self.config.pools, pair)
    }

    pub fn calculate_apy(
        &self,
        pair: &str,
        lock_period_days: u32,
        boost_enabled: bool,
    ) -> LiquidityResult<f64> {
        Ok(self.pool(pair)?.calculate_apy(lock_period_days, boost_enabled))
    }

    pub fn estimate_rewards(
        &self,
        pair: &str,
        amount: &Amount,
        lock_period_days: u32,
    ) -> LiquidityResult<RewardEstimate> {
        Ok(self.pool(pair)?.estimate_rewards(amount, lock_period_days))
    }

    pub fn get_flywheel_stage(&self) -> FlywheelStage {
        FlywheelStage::for_tvl(&self.state.tvl)
    }

    /// Emit an event when the TVL band differs from `before`
    fn track_stage_change(&self, before: FlywheelStage) {
        let after = self.get_flywheel_stage();
        if before.stage == after.stage {
            return;
        }

        tracing::info!(
            "Flywheel stage changed: {} -> {} at TVL {}",
            before.name,
            after.name,
            self.state.tvl
        );
        self.events.emit(EventPayload::FlywheelPhaseChanged {
            from_stage: before.stage,
            to_stage: after.stage,
            from_name: before.name,
            to_name: after.name,
            tvl: self.state.tvl.clone(),
        });
    }

    pub fn set_tvl(&mut self, tvl: Amount) {
        let before = self.get_flywheel_stage();
        self.state.set_tvl(tvl);
        self.track_stage_change(before);
    }

    pub fn add_liquidity(&mut self, amount: &Amount) {
        let before = self.get_flywheel_stage();
        self.state.add_liquidity(amount);
        self.track_stage_change(before);
    }

    pub fn remove_liquidity(&mut self, amount: &Amount) -> LiquidityResult<()> {
        let before = self.get_flywheel_stage();
        self.state.remove_liquidity(amount)?;
        self.track_stage_change(before);
        Ok(())
    }

    pub fn set_liquidity_depth(&mut self, depth: Amount) {
        self.state.set_liquidity_depth(depth);
    }

    pub fn set_average_spread(&mut self, spread: f64) -> LiquidityResult<()> {
        self.state.set_average_spread(spread)
    }

    pub fn set_utilization(&mut self, utilization: f64) -> LiquidityResult<()> {
        self.state.set_utilization(utilization)
    }

    pub fn set_concentration(&mut self, concentration: f64) -> LiquidityResult<()> {
        self.state.set_concentration(concentration)
    }

    pub fn set_active_providers(&mut self, providers: u64) {
        self.state.set_active_providers(providers);
    }

    pub fn accrue_rewards(&mut self, amount: &Amount) {
        self.state.accrue_rewards(amount);
    }

    pub fn distribute_rewards(&mut self, amount: &Amount) -> LiquidityResult<()> {
        self.state.distribute_rewards(amount)?;
        tracing::debug!(
            "Distributed {} rewards, {} pending",
            amount,
            self.state.pending_rewards
        );
        Ok(())
    }

    pub fn get_liquidity_health(&self) -> LiquidityHealth {
        self.config.thresholds.assess(&self.state)
    }

    /// Non-ok metrics as alerts; emits one event when any exist
    pub fn check_health_alerts(&self) -> Vec<HealthAlert> {
        let alerts = self.config.thresholds.alerts(&self.state);
        if alerts.is_empty() {
            return alerts;
        }

        let overall = alerts
            .iter()
            .map(|a| a.status)
            .fold(HealthStatus::Ok, HealthStatus::worst);
        tracing::warn!("{} liquidity health alerts, overall {}", alerts.len(), overall);

        self.events.emit(EventPayload::HealthAlert {
            overall,
            alerts: alerts.iter().map(HealthAlert::to_notice).collect(),
        });
        alerts
    }

    /// Composite 0-100 of TVL, provider count and health
    pub fn velocity(&self) -> f64 {
        let tvl_score = clamp_score(self.state.tvl.to_f64() / VELOCITY_TVL_TARGET * 100.0);
        let provider_score =
            clamp_score(self.state.active_providers as f64 / VELOCITY_PROVIDER_TARGET * 100.0);
        let health_score = clamp_score(self.get_liquidity_health().score);

        VELOCITY_TVL_WEIGHT * tvl_score
            + VELOCITY_PROVIDER_WEIGHT * provider_score
            + VELOCITY_HEALTH_WEIGHT * health_score
    }

    pub fn get_flywheel_metrics(&self) -> FlywheelMetrics {
        let health = self.get_liquidity_health();
        FlywheelMetrics {
            tvl: self.state.tvl.clone(),
            stage: self.get_flywheel_stage(),
            velocity: self.velocity(),
            active_providers: self.state.active_providers,
            pending_rewards: self.state.pending_rewards.clone(),
            distributed_rewards: self.state.distributed_rewards.clone(),
            health: health.overall,
            health_score: health.score,
            total_emission_share: self.config.total_emission_share(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> FlywheelMonitor {
        FlywheelMonitor::new(LiquidityConfig::default(), EventBus::shared()).unwrap()
    }

    fn make_healthy(monitor: &mut FlywheelMonitor) {
        monitor.set_liquidity_depth(Amount::from_u64(2_000_000));
        monitor.set_average_spread(0.005).unwrap();
        monitor.set_utilization(0.5).unwrap();
        monitor.set_concentration(0.1).unwrap();
    }

    #[test]
    fn test_stage_bands() {
        let cases = [
            (0u64, 1u8),
            (99_999, 1),
            (100_000, 2),
            (999_999, 2),
            (1_000_000, 3),
            (10_000_000, 4),
            (99_999_999, 4),
            (100_000_000, 5),
            (u64::MAX, 5),
        ];
        for (tvl, stage) in cases {
            assert_eq!(FlywheelStage::for_tvl(&Amount::from_u64(tvl)).stage, stage, "tvl {}", tvl);
        }
        assert_eq!(FlywheelStage::for_tvl(&Amount::from_u64(150_000)).name, "Early Traction");
    }

    #[test]
    fn test_stage_change_emits_event() {
        let events = EventBus::shared();
        let mut monitor = FlywheelMonitor::new(LiquidityConfig::default(), events.clone()).unwrap();

        monitor.add_liquidity(&Amount::from_u64(50_000));
        assert_eq!(events.history_len(), 0);

        monitor.add_liquidity(&Amount::from_u64(60_000));
        let recent = events.recent(1);
        assert_eq!(recent.len(), 1);
        match &recent[0].payload {
            EventPayload::FlywheelPhaseChanged { from_stage, to_stage, to_name, tvl, .. } => {
                assert_eq!((*from_stage, *to_stage), (1, 2));
                assert_eq!(to_name, "Early Traction");
                assert_eq!(tvl, &Amount::from_u64(110_000));
            }
            other => panic!("unexpected event {:?}", other),
        }

        monitor.remove_liquidity(&Amount::from_u64(20_000)).unwrap();
        assert_eq!(events.history_len(), 2);
        assert_eq!(monitor.state().active_providers(), 1);
    }

    #[test]
    fn test_remove_more_than_tvl() {
        let mut monitor = monitor();
        monitor.add_liquidity(&Amount::from_u64(1_000));
        let err = monitor.remove_liquidity(&Amount::from_u64(1_001)).unwrap_err();
        assert!(matches!(err, LiquidityError::InsufficientLiquidity { .. }));
        assert_eq!(monitor.state().tvl(), &Amount::from_u64(1_000));
    }

    #[test]
    fn test_depth_saturates_on_remove() {
        let mut monitor = monitor();
        monitor.set_tvl(Amount::from_u64(5_000));
        monitor.set_liquidity_depth(Amount::from_u64(1_000));
        monitor.remove_liquidity(&Amount::from_u64(3_000)).unwrap();
        assert!(monitor.state().liquidity_depth().is_zero());
        assert_eq!(monitor.state().active_providers(), 0);
    }

    #[test]
    fn test_reward_distribution() {
        let mut monitor = monitor();
        monitor.accrue_rewards(&Amount::from_u64(1_000));
        monitor.distribute_rewards(&Amount::from_u64(400)).unwrap();
        assert_eq!(monitor.state().pending_rewards(), &Amount::from_u64(600));
        assert_eq!(monitor.state().distributed_rewards(), &Amount::from_u64(400));

        assert!(matches!(
            monitor.distribute_rewards(&Amount::from_u64(601)),
            Err(LiquidityError::InsufficientRewards { .. })
        ));
    }

    #[test]
    fn test_invalid_ratios_rejected() {
        let mut monitor = monitor();
        assert!(matches!(
            monitor.set_utilization(1.2),
            Err(LiquidityError::InvalidMetric(_))
        ));
        assert!(monitor.set_concentration(-0.1).is_err());
        assert!(monitor.set_average_spread(f64::NAN).is_err());
        assert_eq!(monitor.state().utilization(), 0.0);
    }

    #[test]
    fn test_velocity_composite() {
        let mut monitor = monitor();
        make_healthy(&mut monitor);
        monitor.set_tvl(Amount::from_u64(5_000_000));
        monitor.set_active_providers(250);
        // 0.4 × 50 + 0.3 × 50 + 0.3 × 100
        assert!((monitor.velocity() - 65.0).abs() < 1e-9);

        monitor.set_tvl(Amount::from_u64(500_000_000));
        monitor.set_active_providers(10_000);
        assert!((monitor.velocity() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_health_alerts_emit_once() {
        let events = EventBus::shared();
        let mut monitor = FlywheelMonitor::new(LiquidityConfig::default(), events.clone()).unwrap();
        make_healthy(&mut monitor);
        assert!(monitor.check_health_alerts().is_empty());
        assert_eq!(events.history_len(), 0);

        monitor.set_liquidity_depth(Amount::from_u64(50_000));
        let alerts = monitor.check_health_alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(events.history_len(), 1);
        match &events.recent(1)[0].payload {
            EventPayload::HealthAlert { overall, alerts } => {
                assert_eq!(*overall, HealthStatus::Critical);
                assert_eq!(alerts[0].metric, "depth");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_pool_lookup_and_metrics() {
        let monitor = monitor();
        assert!((monitor.calculate_apy("TOKEN/ETH", 365, true).unwrap() - 0.45).abs() < 1e-12);
        assert!(matches!(
            monitor.estimate_rewards("TOKEN/DAI", &Amount::from_u64(1), 30),
            Err(LiquidityError::PoolNotFound(_))
        ));

        let metrics = monitor.get_flywheel_metrics();
        assert_eq!(metrics.stage.stage, 1);
        assert!((metrics.total_emission_share - 1.0).abs() < 1e-9);
        let json = serde_json::to_string(&metrics).unwrap();
        assert!(json.contains("Bootstrap"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = LiquidityConfig::default();
        config.pools.push(PoolConfig::new("TOKEN/ETH", 0.1, 1.0, 0, 0.0));
        assert!(matches!(
            FlywheelMonitor::new(config, EventBus::shared()),
            Err(LiquidityError::InvalidConfiguration(_))
        ));

        let mut config = LiquidityConfig::default();
        config.pools[0].emission_share = 0.9;
        assert!(FlywheelMonitor::new(config, EventBus::shared()).is_err());
    }
}
