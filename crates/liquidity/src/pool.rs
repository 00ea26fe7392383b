// liquidity/src/pool.rs

use crate::{LiquidityError, LiquidityResult};
use serde::{Deserialize, Serialize};
use token_core::{Amount, DAYS_PER_YEAR};

/// Lock period that earns the full lock bonus
pub const MAX_LOCK_BONUS_DAYS: u32 = 730;

/// Largest extra APY fraction a lock can earn
pub const MAX_LOCK_BONUS: f64 = 0.5;

const MONTHS_PER_YEAR: u64 = 12;
const WEEKS_PER_YEAR: u64 = 52;

/// Reward terms of one liquidity pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Trading pair, e.g. `TOKEN/ETH`
    pub pair: String,
    /// Base annual yield (fraction)
    pub base_apy: f64,
    /// Multiplier applied to boosted positions
    pub boost_multiplier: f64,
    /// Minimum lock for a position to be boost-eligible
    pub min_lock_period_days: u32,
    /// Share of liquidity emissions directed to this pool
    pub emission_share: f64,
}

impl PoolConfig {
    pub fn new(
        pair: impl Into<String>,
        base_apy: f64,
        boost_multiplier: f64,
        min_lock_period_days: u32,
        emission_share: f64,
    ) -> Self {
        Self {
            pair: pair.into(),
            base_apy,
            boost_multiplier,
            min_lock_period_days,
            emission_share,
        }
    }

    pub fn default_set() -> Vec<PoolConfig> {
        vec![
            PoolConfig::new("TOKEN/ETH", 0.15, 2.0, 30, 0.40),
            PoolConfig::new("TOKEN/USDC", 0.12, 1.5, 30, 0.35),
            PoolConfig::new("TOKEN/USDT", 0.10, 1.5, 14, 0.25),
        ]
    }

    pub fn validate(&self) -> LiquidityResult<()> {
        if self.pair.trim().is_empty() {
            return Err(LiquidityError::InvalidConfiguration(
                "Pool pair must not be empty".into(),
            ));
        }
        if !self.base_apy.is_finite() || self.base_apy < 0.0 {
            return Err(LiquidityError::InvalidConfiguration(format!(
                "Pool {} has invalid base APY {}",
                self.pair, self.base_apy
            )));
        }
        if !self.boost_multiplier.is_finite() || self.boost_multiplier < 1.0 {
            return Err(LiquidityError::InvalidConfiguration(format!(
                "Pool {} boost multiplier must be at least 1, got {}",
                self.pair, self.boost_multiplier
            )));
        }
        if !(0.0..=1.0).contains(&self.emission_share) {
            return Err(LiquidityError::InvalidConfiguration(format!(
                "Pool {} emission share must be within [0, 1], got {}",
                self.pair, self.emission_share
            )));
        }
        Ok(())
    }

    /// Extra APY fraction earned by locking, capped at 50% for a 730-day lock
    pub fn lock_bonus(lock_period_days: u32) -> f64 {
        (lock_period_days as f64 / MAX_LOCK_BONUS_DAYS as f64).min(MAX_LOCK_BONUS)
    }

    pub fn is_boost_eligible(&self, lock_period_days: u32) -> bool {
        lock_period_days >= self.min_lock_period_days
    }

    /// Effective APY for a position
    pub fn calculate_apy(&self, lock_period_days: u32, boost_enabled: bool) -> f64 {
        let mut apy = self.base_apy * (1.0 + Self::lock_bonus(lock_period_days));
        if boost_enabled && self.is_boost_eligible(lock_period_days) {
            apy *= self.boost_multiplier;
        }
        apy
    }

    /// Reward estimate with the boost applied when eligible.
    /// Shorter periods are divided down from the yearly figure.
    pub fn estimate_rewards(&self, amount: &Amount, lock_period_days: u32) -> RewardEstimate {
        let boost_applied = self.is_boost_eligible(lock_period_days);
        let apy = self.calculate_apy(lock_period_days, true);
        let yearly = amount.mul_rate(apy);

        tracing::debug!(
            "Reward estimate for {} on {}: apy {:.4}, yearly {}",
            amount,
            self.pair,
            apy,
            yearly
        );

        RewardEstimate {
            pair: self.pair.clone(),
            principal: amount.clone(),
            lock_period_days,
            apy,
            boost_applied,
            monthly: yearly.div_u64(MONTHS_PER_YEAR),
            weekly: yearly.div_u64(WEEKS_PER_YEAR),
            daily: yearly.div_u64(DAYS_PER_YEAR),
            yearly,
        }
    }
}

/// Look up a pool by pair
pub fn find_pool<'a>(pools: &'a [PoolConfig], pair: &str) -> LiquidityResult<&'a PoolConfig> {
    pools
        .iter()
        .find(|p| p.pair == pair)
        .ok_or_else(|| LiquidityError::PoolNotFound(pair.to_string()))
}

/// Projected rewards for a position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardEstimate {
    pub pair: String,
    pub principal: Amount,
    pub lock_period_days: u32,
    pub apy: f64,
    pub boost_applied: bool,
    pub yearly: Amount,
    pub monthly: Amount,
    pub weekly: Amount,
    pub daily: Amount,
}
