// simulation/src/stats.rs

use serde::{Deserialize, Serialize};

/// Price percentiles across Monte Carlo iterations for one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBand {
    pub year: u32,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub median_staking_ratio: f64,
    pub median_users: f64,
}

impl ConfidenceBand {
    /// Build from unsorted samples
    pub fn from_samples(year: u32, prices: &[f64], staking_ratios: &[f64], users: &[f64]) -> Self {
        let prices = sorted(prices.iter().copied());
        Self {
            year,
            p10: percentile(&prices, 10.0),
            p25: percentile(&prices, 25.0),
            p50: percentile(&prices, 50.0),
            p75: percentile(&prices, 75.0),
            p90: percentile(&prices, 90.0),
            median_staking_ratio: percentile(&sorted(staking_ratios.iter().copied()), 50.0),
            median_users: percentile(&sorted(users.iter().copied()), 50.0),
        }
    }
}

/// Collect and sort ascending; NaN sorts last
pub fn sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.collect();
    v.sort_by(f64::total_cmp);
    v
}

/// Nearest-rank percentile of sorted data, 0.0 when empty
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (pct / 100.0 * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}
