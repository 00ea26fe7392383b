// tokenomics/src/equilibrium.rs

//! Equilibrium gap analysis.
//!
//! Compares the live staking ratio, liquidity ratio, burn rate and velocity
//! against configured targets. The time-to-equilibrium figure is a heuristic
//! (`ceil(365 × largest normalised gap)`), not the output of a solver.

use serde::{Deserialize, Serialize};

const STAKING_TOLERANCE: f64 = 0.1;
const LIQUIDITY_TOLERANCE: f64 = 0.1;
const BURN_TOLERANCE: f64 = 0.01;
const VELOCITY_TOLERANCE: f64 = 1.0;

/// Reference ratios the token economy is steered toward
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EquilibriumTargets {
    pub staking_ratio: f64,
    pub liquidity_ratio: f64,
    pub burn_rate: f64,
    pub velocity: f64,
}

impl Default for EquilibriumTargets {
    fn default() -> Self {
        Self {
            staking_ratio: 0.50,
            liquidity_ratio: 0.15,
            burn_rate: 0.02,
            velocity: 4.0,
        }
    }
}

/// Gap analysis result; gaps are `target - current`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquilibriumAnalysis {
    pub current_staking_ratio: f64,
    pub staking_gap: f64,
    pub current_liquidity_ratio: f64,
    pub liquidity_gap: f64,
    pub current_burn_rate: f64,
    pub burn_gap: f64,
    pub current_velocity: f64,
    pub velocity_gap: f64,
    /// 0-100, higher is healthier
    pub sustainability_score: f64,
    /// Heuristic estimate, not a guarantee
    pub estimated_days_to_equilibrium: u64,
    pub is_balanced: bool,
    pub recommendations: Vec<String>,
}

/// `max(0, 100 - 50 × (|staking_gap| + |liquidity_gap|))`
pub fn sustainability_score(staking_gap: f64, liquidity_gap: f64) -> f64 {
    let penalty = 50.0 * (staking_gap.abs() + liquidity_gap.abs());
    if penalty.is_nan() {
        return 0.0;
    }
    (100.0 - penalty).max(0.0)
}

fn normalized_gap(gap: f64, target: f64) -> f64 {
    if target.abs() > f64::EPSILON {
        (gap / target).abs()
    } else {
        0.0
    }
}

impl EquilibriumTargets {
    /// Analyse current state against these targets
    pub fn analyze(
        &self,
        staking_ratio: f64,
        liquidity_ratio: f64,
        burn_rate: f64,
        velocity: f64,
    ) -> EquilibriumAnalysis {
        let staking_gap = self.staking_ratio - staking_ratio;
        let liquidity_gap = self.liquidity_ratio - liquidity_ratio;
        let burn_gap = self.burn_rate - burn_rate;
        let velocity_gap = self.velocity - velocity;

        let mut recommendations = Vec::new();

        if staking_gap > STAKING_TOLERANCE {
            recommendations.push(format!(
                "Staking ratio {:.1}% is below the {:.1}% target: raise staking rewards or lock bonuses",
                staking_ratio * 100.0,
                self.staking_ratio * 100.0
            ));
        } else if staking_gap < -STAKING_TOLERANCE {
            recommendations.push(format!(
                "Staking ratio {:.1}% is above the {:.1}% target: taper staking emissions to free liquid supply",
                staking_ratio * 100.0,
                self.staking_ratio * 100.0
            ));
        }

        if liquidity_gap > LIQUIDITY_TOLERANCE {
            recommendations.push(
                "Liquidity ratio is below target: direct more emissions to liquidity incentives".into(),
            );
        } else if liquidity_gap < -LIQUIDITY_TOLERANCE {
            recommendations.push(
                "Liquidity ratio is above target: rebalance emissions toward staking".into(),
            );
        }

        if burn_gap > BURN_TOLERANCE {
            recommendations.push("Burn rate is below target: increase the fee burn share".into());
        } else if burn_gap < -BURN_TOLERANCE {
            recommendations.push("Burn rate is above target: reduce the fee burn share".into());
        }

        if velocity_gap > VELOCITY_TOLERANCE {
            recommendations.push("Velocity is below target: expand transactional utility".into());
        } else if velocity_gap < -VELOCITY_TOLERANCE {
            recommendations.push("Velocity is above target: add holding incentives".into());
        }

        let largest_gap = [
            normalized_gap(staking_gap, self.staking_ratio),
            normalized_gap(liquidity_gap, self.liquidity_ratio),
            normalized_gap(burn_gap, self.burn_rate),
            normalized_gap(velocity_gap, self.velocity),
        ]
        .into_iter()
        .filter(|g| g.is_finite())
        .fold(0.0_f64, f64::max);

        let estimated_days_to_equilibrium = (365.0 * largest_gap).ceil() as u64;

        EquilibriumAnalysis {
            current_staking_ratio: staking_ratio,
            staking_gap,
            current_liquidity_ratio: liquidity_ratio,
            liquidity_gap,
            current_burn_rate: burn_rate,
            burn_gap,
            current_velocity: velocity,
            velocity_gap,
            sustainability_score: sustainability_score(staking_gap, liquidity_gap),
            estimated_days_to_equilibrium,
            is_balanced: recommendations.is_empty(),
            recommendations,
        }
    }
}
