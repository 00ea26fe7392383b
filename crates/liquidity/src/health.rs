// liquidity/src/health.rs

use crate::{flywheel::FlywheelState, LiquidityError, LiquidityResult};
use serde::{Deserialize, Serialize};
use token_core::{AlertNotice, HealthStatus};

/// Health classification thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthThresholds {
    /// Depth below this is a warning (currency units)
    pub depth_warning: f64,
    /// Depth below this is critical
    pub depth_critical: f64,
    /// Spread above this is a warning
    pub spread_warning: f64,
    pub spread_critical: f64,
    /// Healthy utilization band
    pub utilization_low: f64,
    pub utilization_high: f64,
    /// Top-holder share above this is a warning
    pub concentration_warning: f64,
    pub concentration_critical: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            depth_warning: 500_000.0,
            depth_critical: 100_000.0,
            spread_warning: 0.01,
            spread_critical: 0.03,
            utilization_low: 0.20,
            utilization_high: 0.80,
            concentration_warning: 0.30,
            concentration_critical: 0.50,
        }
    }
}

/// Metrics scored by the health check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthMetric {
    Depth,
    Spread,
    Utilization,
    Concentration,
}

impl std::fmt::Display for HealthMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HealthMetric::Depth => "depth",
            HealthMetric::Spread => "spread",
            HealthMetric::Utilization => "utilization",
            HealthMetric::Concentration => "concentration",
        };
        f.write_str(name)
    }
}

/// Health of the liquidity layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityHealth {
    pub overall: HealthStatus,
    pub depth: HealthStatus,
    pub spread: HealthStatus,
    pub utilization: HealthStatus,
    pub concentration: HealthStatus,
    /// Average of the per-metric scores (ok 100, warning 50, critical 0)
    pub score: f64,
    pub recommendations: Vec<String>,
}

/// One non-ok metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthAlert {
    pub metric: HealthMetric,
    pub status: HealthStatus,
    pub value: f64,
    /// Threshold that was crossed
    pub threshold: f64,
    pub message: String,
}

impl HealthAlert {
    pub fn to_notice(&self) -> AlertNotice {
        AlertNotice {
            metric: self.metric.to_string(),
            status: self.status,
            message: self.message.clone(),
        }
    }
}

/// Status of one metric plus the threshold responsible for it
struct Classification {
    status: HealthStatus,
    threshold: f64,
}

impl Classification {
    fn new(status: HealthStatus, threshold: f64) -> Self {
        Self { status, threshold }
    }
}

impl HealthThresholds {
    pub fn validate(&self) -> LiquidityResult<()> {
        let values = [
            self.depth_warning,
            self.depth_critical,
            self.spread_warning,
            self.spread_critical,
            self.utilization_low,
            self.utilization_high,
            self.concentration_warning,
            self.concentration_critical,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(LiquidityError::InvalidConfiguration(
                "Health thresholds must be finite and non-negative".into(),
            ));
        }

        let ordered = [
            ("depth_critical <= depth_warning", self.depth_critical <= self.depth_warning),
            ("spread_warning <= spread_critical", self.spread_warning <= self.spread_critical),
            ("utilization_low <= utilization_high", self.utilization_low <= self.utilization_high),
            (
                "concentration_warning <= concentration_critical",
                self.concentration_warning <= self.concentration_critical,
            ),
        ];
        for (rule, holds) in ordered {
            if !holds {
                return Err(LiquidityError::InvalidConfiguration(format!(
                    "Health thresholds violate {}",
                    rule
                )));
            }
        }
        Ok(())
    }

    /// Higher depth is better
    pub fn classify_depth(&self, depth: f64) -> HealthStatus {
        self.depth(depth).status
    }

    /// Lower spread is better
    pub fn classify_spread(&self, spread: f64) -> HealthStatus {
        self.spread(spread).status
    }

    /// Anything outside the band is a warning, never critical
    pub fn classify_utilization(&self, utilization: f64) -> HealthStatus {
        self.utilization(utilization).status
    }

    /// Lower concentration is better
    pub fn classify_concentration(&self, concentration: f64) -> HealthStatus {
        self.concentration(concentration).status
    }

    fn depth(&self, depth: f64) -> Classification {
        if depth < self.depth_critical {
            Classification::new(HealthStatus::Critical, self.depth_critical)
        } else if depth < self.depth_warning {
            Classification::new(HealthStatus::Warning, self.depth_warning)
        } else {
            Classification::new(HealthStatus::Ok, self.depth_warning)
        }
    }

    fn spread(&self, spread: f64) -> Classification {
        upper_bound(spread, self.spread_warning, self.spread_critical)
    }

    fn concentration(&self, concentration: f64) -> Classification {
        upper_bound(concentration, self.concentration_warning, self.concentration_critical)
    }

    fn utilization(&self, utilization: f64) -> Classification {
        if utilization < self.utilization_low {
            Classification::new(HealthStatus::Warning, self.utilization_low)
        } else if utilization > self.utilization_high {
            Classification::new(HealthStatus::Warning, self.utilization_high)
        } else {
            Classification::new(HealthStatus::Ok, self.utilization_high)
        }
    }

    /// Classify every metric of `state`
    pub fn assess(&self, state: &FlywheelState) -> LiquidityHealth {
        let depth = self.classify_depth(state.liquidity_depth().to_f64());
        let spread = self.classify_spread(state.average_spread());
        let utilization = self.classify_utilization(state.utilization());
        let concentration = self.classify_concentration(state.top_holder_concentration());

        let mut recommendations = Vec::new();
        if !depth.is_ok() {
            recommendations.push(
                "Deepen liquidity: raise LP incentives on the thinnest pools".to_string(),
            );
        }
        if !spread.is_ok() {
            recommendations.push(
                "Tighten spreads: onboard market makers or concentrate liquidity around the price"
                    .to_string(),
            );
        }
        if !utilization.is_ok() {
            if state.utilization() < self.utilization_low {
                recommendations.push(
                    "Utilization is low: redirect idle liquidity or lower pool rewards".to_string(),
                );
            } else {
                recommendations.push(
                    "Utilization is high: add capacity before slippage rises".to_string(),
                );
            }
        }
        if !concentration.is_ok() {
            recommendations.push(
                "Holder concentration is high: broaden distribution through incentives".to_string(),
            );
        }

        let statuses = [depth, spread, utilization, concentration];
        let overall = statuses
            .iter()
            .copied()
            .fold(HealthStatus::Ok, HealthStatus::worst);
        let score = statuses.iter().map(HealthStatus::score).sum::<f64>() / statuses.len() as f64;

        LiquidityHealth {
            overall,
            depth,
            spread,
            utilization,
            concentration,
            score,
            recommendations,
        }
    }

    /// One alert per non-ok metric
    pub fn alerts(&self, state: &FlywheelState) -> Vec<HealthAlert> {
        let readings = [
            (HealthMetric::Depth, state.liquidity_depth().to_f64()),
            (HealthMetric::Spread, state.average_spread()),
            (HealthMetric::Utilization, state.utilization()),
            (HealthMetric::Concentration, state.top_holder_concentration()),
        ];

        readings
            .into_iter()
            .filter_map(|(metric, value)| {
                let classification = match metric {
                    HealthMetric::Depth => self.depth(value),
                    HealthMetric::Spread => self.spread(value),
                    HealthMetric::Utilization => self.utilization(value),
                    HealthMetric::Concentration => self.concentration(value),
                };
                if classification.status.is_ok() {
                    return None;
                }
                Some(HealthAlert {
                    metric,
                    status: classification.status,
                    value,
                    threshold: classification.threshold,
                    message: format!(
                        "{} is {}: {} against threshold {}",
                        metric, classification.status, value, classification.threshold
                    ),
                })
            })
            .collect()
    }
}

fn upper_bound(value: f64, warning: f64, critical: f64) -> Classification {
    if value > critical {
        Classification::new(HealthStatus::Critical, critical)
    } else if value > warning {
        Classification::new(HealthStatus::Warning, warning)
    } else {
        Classification::new(HealthStatus::Ok, warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use token_core::Amount;

    fn healthy_state() -> FlywheelState {
        let mut state = FlywheelState::default();
        state.set_liquidity_depth(Amount::from_u64(2_000_000));
        state.set_average_spread(0.005).unwrap();
        state.set_utilization(0.5).unwrap();
        state.set_concentration(0.1).unwrap();
        state
    }

    #[test]
    fn test_threshold_boundaries() {
        let t = HealthThresholds::default();
        assert_eq!(t.classify_depth(500_000.0), HealthStatus::Ok);
        assert_eq!(t.classify_depth(499_999.0), HealthStatus::Warning);
        assert_eq!(t.classify_depth(99_999.0), HealthStatus::Critical);

        assert_eq!(t.classify_spread(0.01), HealthStatus::Ok);
        assert_eq!(t.classify_spread(0.02), HealthStatus::Warning);
        assert_eq!(t.classify_spread(0.05), HealthStatus::Critical);

        assert_eq!(t.classify_utilization(0.1), HealthStatus::Warning);
        assert_eq!(t.classify_utilization(0.99), HealthStatus::Warning);
        assert_eq!(t.classify_utilization(0.5), HealthStatus::Ok);

        assert_eq!(t.classify_concentration(0.6), HealthStatus::Critical);
    }

    #[test]
    fn test_healthy_state() {
        let t = HealthThresholds::default();
        let health = t.assess(&healthy_state());
        assert_eq!(health.overall, HealthStatus::Ok);
        assert_eq!(health.score, 100.0);
        assert!(health.recommendations.is_empty());
        assert!(t.alerts(&healthy_state()).is_empty());
    }

    #[test]
    fn test_overall_is_worst_metric() {
        let t = HealthThresholds::default();
        let mut state = healthy_state();
        state.set_utilization(0.95).unwrap();
        state.set_average_spread(0.04).unwrap();

        let health = t.assess(&state);
        assert_eq!(health.utilization, HealthStatus::Warning);
        assert_eq!(health.spread, HealthStatus::Critical);
        assert_eq!(health.overall, HealthStatus::Critical);
        assert_eq!(health.recommendations.len(), 2);
        assert_eq!(health.score, 62.5);

        let alerts = t.alerts(&state);
        assert_eq!(alerts.len(), 2);
        let spread = alerts.iter().find(|a| a.metric == HealthMetric::Spread).unwrap();
        assert_eq!(spread.threshold, 0.03);
        let utilization = alerts.iter().find(|a| a.metric == HealthMetric::Utilization).unwrap();
        assert_eq!(utilization.threshold, 0.80);
    }

    #[test]
    fn test_validate_ordering() {
        assert!(HealthThresholds::default().validate().is_ok());
        let bad = HealthThresholds {
            depth_critical: 600_000.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = HealthThresholds {
            utilization_low: 0.9,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    proptest! {
        #[test]
        fn prop_depth_monotonic(a in 0.0f64..2_000_000.0, b in 0.0f64..2_000_000.0) {
            let t = HealthThresholds::default();
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(t.classify_depth(high) <= t.classify_depth(low));
        }
    }
}
