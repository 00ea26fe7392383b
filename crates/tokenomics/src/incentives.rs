// tokenomics/src/incentives.rs

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use token_core::Amount;

/// Upper bound keeping day arithmetic inside chrono's range
const MAX_INCENTIVE_DAYS: u64 = 100_000_000;

/// Incentive programmes available after launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncentiveKind {
    EarlyStaking,
    LiquidityProvision,
    Referral,
    Governance,
}

impl std::fmt::Display for IncentiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IncentiveKind::EarlyStaking => "early_staking",
            IncentiveKind::LiquidityProvision => "liquidity_provision",
            IncentiveKind::Referral => "referral",
            IncentiveKind::Governance => "governance",
        };
        f.write_str(name)
    }
}

/// A time-bounded reward multiplier counted from launch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncentiveConfig {
    pub kind: IncentiveKind,
    pub multiplier: f64,
    pub duration_days: u64,
}

impl IncentiveConfig {
    pub fn new(kind: IncentiveKind, multiplier: f64, duration_days: u64) -> Self {
        Self {
            kind,
            multiplier,
            duration_days,
        }
    }

    /// Active from launch until `duration_days` have elapsed
    pub fn is_active(&self, launched_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let Some(launched_at) = launched_at else {
            return false;
        };
        if now < launched_at {
            return false;
        }
        let duration = Duration::days(self.duration_days.min(MAX_INCENTIVE_DAYS) as i64);
        now - launched_at < duration
    }

    pub fn default_set() -> Vec<IncentiveConfig> {
        vec![
            IncentiveConfig::new(IncentiveKind::EarlyStaking, 2.0, 90),
            IncentiveConfig::new(IncentiveKind::LiquidityProvision, 1.5, 180),
            IncentiveConfig::new(IncentiveKind::Referral, 1.25, 60),
            IncentiveConfig::new(IncentiveKind::Governance, 1.1, 365),
        ]
    }
}

/// Result of applying incentives to a base reward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncentiveReward {
    pub kind: IncentiveKind,
    pub base_amount: Amount,
    pub multiplier: f64,
    pub reward: Amount,
    pub active: bool,
}

/// Incentives still running at `now`
pub fn active_incentives<'a>(
    incentives: &'a [IncentiveConfig],
    launched_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Vec<&'a IncentiveConfig> {
    incentives
        .iter()
        .filter(|i| i.is_active(launched_at, now))
        .collect()
}

/// Scale `base` by the matching active multiplier, or return it unscaled
pub fn calculate_reward(
    incentives: &[IncentiveConfig],
    launched_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    kind: IncentiveKind,
    base: &Amount,
) -> IncentiveReward {
    let matching = active_incentives(incentives, launched_at, now)
        .into_iter()
        .find(|i| i.kind == kind);

    match matching {
        Some(incentive) => IncentiveReward {
            kind,
            base_amount: base.clone(),
            multiplier: incentive.multiplier,
            reward: base.mul_rate(incentive.multiplier),
            active: true,
        },
        None => IncentiveReward {
            kind,
            base_amount: base.clone(),
            multiplier: 1.0,
            reward: base.clone(),
            active: false,
        },
    }
}
