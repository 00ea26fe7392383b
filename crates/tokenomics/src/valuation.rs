// tokenomics/src/valuation.rs

//! Multi-year supply projection and point-in-time valuation metrics

use crate::{
    burning::BurnMechanics,
    equilibrium::{EquilibriumAnalysis, EquilibriumTargets},
    TokenomicsError, TokenomicsResult,
};
use serde::{Deserialize, Serialize};
use token_core::{Amount, MAX_HORIZON_YEARS};

const MONTHS_PER_YEAR: f64 = 12.0;

/// Share of circulating supply assumed staked until told otherwise
const DEFAULT_STAKED_SHARE: f64 = 0.30;

/// Demand weights may overshoot 1.0 by float noise only
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Supply side of the token economy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplyModel {
    pub initial_supply: Amount,
    pub initial_circulating: Amount,
    /// Emission per year; the last entry repeats past the end
    pub yearly_emission: Vec<Amount>,
    pub emission_decay: f64,
    pub annual_burn_rate: f64,
    /// Fraction of circulating supply expected to be staked
    pub staking_target: f64,
}

impl Default for SupplyModel {
    fn default() -> Self {
        let emission_decay = 0.2;
        Self {
            initial_supply: Amount::from_u64(1_000_000_000),
            initial_circulating: Amount::from_u64(150_000_000),
            yearly_emission: Self::decaying_schedule(
                &Amount::from_u64(50_000_000),
                emission_decay,
                5,
            ),
            emission_decay,
            annual_burn_rate: 0.02,
            staking_target: 0.40,
        }
    }
}

impl SupplyModel {
    /// `years` entries starting at `first`, each `(1 - decay)` of the previous one
    pub fn decaying_schedule(first: &Amount, decay: f64, years: usize) -> Vec<Amount> {
        let retain = (1.0 - decay).max(0.0);
        let mut schedule = Vec::with_capacity(years);
        let mut current = first.clone();
        for _ in 0..years {
            let next = current.mul_rate(retain);
            schedule.push(current);
            current = next;
        }
        schedule
    }

    /// Emission for a 1-based year; zero when the schedule is empty
    pub fn emission_for_year(&self, year: u32) -> Amount {
        if self.yearly_emission.is_empty() {
            return Amount::zero();
        }
        let index = (year.saturating_sub(1) as usize).min(self.yearly_emission.len() - 1);
        self.yearly_emission[index].clone()
    }
}

/// One source of token demand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandDriver {
    pub name: String,
    /// Share of total demand, in [0, 1]
    pub weight: f64,
    pub monthly_growth: f64,
}

impl DemandDriver {
    pub fn new(name: impl Into<String>, weight: f64, monthly_growth: f64) -> Self {
        Self {
            name: name.into(),
            weight,
            monthly_growth,
        }
    }

    pub fn default_set() -> Vec<DemandDriver> {
        vec![
            DemandDriver::new("agent_adoption", 0.4, 0.05),
            DemandDriver::new("protocol_revenue", 0.3, 0.04),
            DemandDriver::new("staking_demand", 0.2, 0.03),
            DemandDriver::new("speculation", 0.1, 0.02),
        ]
    }
}

/// Valuation model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    pub supply: SupplyModel,
    pub demand_drivers: Vec<DemandDriver>,
    /// Year-over-year decay applied to demand growth
    pub demand_decay: f64,
    pub targets: EquilibriumTargets,
    pub burn: BurnMechanics,
    /// Liquidity ratio used by equilibrium analysis in lieu of a live feed
    pub assumed_liquidity_ratio: f64,
    /// Velocity used by equilibrium analysis in lieu of a live feed
    pub estimated_velocity: f64,
    pub initial_price: f64,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            supply: SupplyModel::default(),
            demand_drivers: DemandDriver::default_set(),
            demand_decay: 0.7,
            targets: EquilibriumTargets::default(),
            burn: BurnMechanics::default(),
            assumed_liquidity_ratio: 0.12,
            estimated_velocity: 5.0,
            initial_price: 0.05,
        }
    }
}

impl ValuationConfig {
    pub fn validate(&self) -> TokenomicsResult<()> {
        let mut weight_sum = 0.0;
        for driver in &self.demand_drivers {
            if !(0.0..=1.0).contains(&driver.weight) {
                return Err(TokenomicsError::InvalidConfiguration(format!(
                    "Demand driver {} weight must be within [0, 1], got {}",
                    driver.name, driver.weight
                )));
            }
            if !driver.monthly_growth.is_finite() {
                return Err(TokenomicsError::InvalidConfiguration(format!(
                    "Demand driver {} has a non-finite growth rate",
                    driver.name
                )));
            }
            weight_sum += driver.weight;
        }
        if weight_sum > 1.0 + WEIGHT_SUM_TOLERANCE {
            return Err(TokenomicsError::InvalidConfiguration(format!(
                "Demand driver weights sum to {}, must not exceed 1",
                weight_sum
            )));
        }

        let fractions = [
            ("demand_decay", self.demand_decay),
            ("annual_burn_rate", self.supply.annual_burn_rate),
            ("staking_target", self.supply.staking_target),
            ("emission_decay", self.supply.emission_decay),
            ("assumed_liquidity_ratio", self.assumed_liquidity_ratio),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(TokenomicsError::InvalidConfiguration(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if !self.initial_price.is_finite() || self.initial_price < 0.0 {
            return Err(TokenomicsError::InvalidConfiguration(format!(
                "Initial price must be a non-negative number, got {}",
                self.initial_price
            )));
        }
        if !self.estimated_velocity.is_finite() || self.estimated_velocity < 0.0 {
            return Err(TokenomicsError::InvalidConfiguration(format!(
                "Estimated velocity must be a non-negative number, got {}",
                self.estimated_velocity
            )));
        }
        if self.supply.initial_circulating > self.supply.initial_supply {
            return Err(TokenomicsError::InvalidConfiguration(format!(
                "Initial circulating {} exceeds initial supply {}",
                self.supply.initial_circulating, self.supply.initial_supply
            )));
        }

        self.burn.validate()
    }

    /// `Σ weight × monthly_growth × 12`, before decay
    pub fn annual_demand_growth(&self) -> f64 {
        self.demand_drivers
            .iter()
            .map(|d| d.weight * d.monthly_growth * MONTHS_PER_YEAR)
            .sum()
    }
}

/// Supply and price at the end of one projected year
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyProjection {
    pub year: u32,
    pub emission: Amount,
    pub burned: Amount,
    pub circulating_start: Amount,
    pub circulating: Amount,
    pub staked: Amount,
    pub liquid: Amount,
    pub total_supply: Amount,
    pub inflation_rate: f64,
    pub demand_growth: f64,
    pub supply_pressure: f64,
    pub price: f64,
    pub market_cap: f64,
}

/// Point-in-time valuation figures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationMetrics {
    pub price: f64,
    pub circulating_supply: Amount,
    pub total_supply: Amount,
    pub staked: Amount,
    pub staking_ratio: f64,
    pub market_cap: f64,
    pub fully_diluted_valuation: f64,
    pub mcap_to_fdv: f64,
    /// Next scheduled emission over current circulating supply
    pub next_year_inflation: f64,
    pub annual_burn_estimate: Amount,
}

/// Supply/demand model holding the current market state
#[derive(Debug, Clone)]
pub struct ValuationModel {
    config: ValuationConfig,
    price: f64,
    staked: Amount,
}

impl ValuationModel {
    pub fn new(config: ValuationConfig) -> TokenomicsResult<Self> {
        config.validate()?;

        let staked = config.supply.initial_circulating.mul_rate(DEFAULT_STAKED_SHARE);
        tracing::info!(
            "Valuation model initialised: circulating {}, price {}, {} demand drivers",
            config.supply.initial_circulating,
            config.initial_price,
            config.demand_drivers.len()
        );

        Ok(Self {
            price: config.initial_price,
            staked,
            config,
        })
    }

    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn staked(&self) -> &Amount {
        &self.staked
    }

    pub fn set_price(&mut self, price: f64) -> TokenomicsResult<()> {
        if !price.is_finite() || price < 0.0 {
            return Err(TokenomicsError::InvalidMarketState(format!(
                "Price must be a non-negative number, got {}",
                price
            )));
        }
        self.price = price;
        Ok(())
    }

    pub fn set_staked(&mut self, staked: Amount) -> TokenomicsResult<()> {
        let circulating = &self.config.supply.initial_circulating;
        if &staked > circulating {
            return Err(TokenomicsError::InvalidMarketState(format!(
                "Staked amount {} exceeds circulating supply {}",
                staked, circulating
            )));
        }
        self.staked = staked;
        Ok(())
    }

    pub fn set_assumed_liquidity_ratio(&mut self, ratio: f64) -> TokenomicsResult<()> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(TokenomicsError::InvalidMarketState(format!(
                "Liquidity ratio must be within [0, 1], got {}",
                ratio
            )));
        }
        self.config.assumed_liquidity_ratio = ratio;
        Ok(())
    }

    pub fn set_estimated_velocity(&mut self, velocity: f64) -> TokenomicsResult<()> {
        if !velocity.is_finite() || velocity < 0.0 {
            return Err(TokenomicsError::InvalidMarketState(format!(
                "Velocity must be a non-negative number, got {}",
                velocity
            )));
        }
        self.config.estimated_velocity = velocity;
        Ok(())
    }

    /// Project supply, staking and price forward year by year
    pub fn project_supply(&self, years: u32) -> TokenomicsResult<Vec<SupplyProjection>> {
        if years > MAX_HORIZON_YEARS {
            return Err(TokenomicsError::InvalidConfiguration(format!(
                "Projection horizon must be at most {} years, got {}",
                MAX_HORIZON_YEARS, years
            )));
        }

        let supply = &self.config.supply;
        let base_demand = self.config.annual_demand_growth();

        let mut circulating = supply.initial_circulating.clone();
        let mut total_supply = supply.initial_supply.clone();
        let mut price = self.price;
        let mut projections = Vec::with_capacity(years as usize);

        for year in 1..=years {
            let emission = supply.emission_for_year(year);
            let circulating_start = circulating.clone();

            let post_emission = circulating.clone() + emission.clone();
            let burned = post_emission.mul_rate(supply.annual_burn_rate);
            circulating = post_emission.saturating_sub(&burned);

            let staked = circulating.mul_rate(supply.staking_target);
            let liquid = circulating.saturating_sub(&staked);

            total_supply = (total_supply + emission.clone()).saturating_sub(&burned);

            let inflation_rate = emission.ratio_of(&circulating_start);
            let demand_growth = base_demand * self.config.demand_decay.powi((year - 1) as i32);
            let supply_pressure = emission.ratio_of(&total_supply);
            price *= (1.0 + demand_growth - supply_pressure).max(0.0);

            tracing::debug!(
                "Year {}: emission {}, burned {}, circulating {}, price {:.6}",
                year,
                emission,
                burned,
                circulating,
                price
            );

            projections.push(SupplyProjection {
                year,
                market_cap: circulating.to_f64() * price,
                emission,
                burned,
                circulating_start,
                circulating: circulating.clone(),
                staked,
                liquid,
                total_supply: total_supply.clone(),
                inflation_rate,
                demand_growth,
                supply_pressure,
                price,
            });
        }

        Ok(projections)
    }

    pub fn current_metrics(&self) -> ValuationMetrics {
        let supply = &self.config.supply;
        let circulating = supply.initial_circulating.clone();
        let total_supply = supply.initial_supply.clone();

        let market_cap = circulating.to_f64() * self.price;
        let fully_diluted_valuation = total_supply.to_f64() * self.price;
        let mcap_to_fdv = if fully_diluted_valuation > 0.0 {
            market_cap / fully_diluted_valuation
        } else {
            0.0
        };

        ValuationMetrics {
            price: self.price,
            staking_ratio: self.staked.ratio_of(&circulating),
            next_year_inflation: supply.emission_for_year(1).ratio_of(&circulating),
            annual_burn_estimate: circulating.mul_rate(supply.annual_burn_rate),
            staked: self.staked.clone(),
            market_cap,
            fully_diluted_valuation,
            mcap_to_fdv,
            circulating_supply: circulating,
            total_supply,
        }
    }

    /// Gap analysis of the current state against the configured targets
    pub fn calculate_equilibrium(&self) -> EquilibriumAnalysis {
        let staking_ratio = self.staked.ratio_of(&self.config.supply.initial_circulating);
        let analysis = self.config.targets.analyze(
            staking_ratio,
            self.config.assumed_liquidity_ratio,
            self.config.supply.annual_burn_rate,
            self.config.estimated_velocity,
        );

        if !analysis.is_balanced {
            tracing::debug!(
                "Equilibrium not reached: {} recommendations, ~{} days",
                analysis.recommendations.len(),
                analysis.estimated_days_to_equilibrium
            );
        }
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decaying_schedule() {
        let schedule = SupplyModel::decaying_schedule(&Amount::from_u64(50_000_000), 0.2, 5);
        let expected: Vec<Amount> = [50_000_000u64, 40_000_000, 32_000_000, 25_600_000, 20_480_000]
            .into_iter()
            .map(Amount::from_u64)
            .collect();
        assert_eq!(schedule, expected);
    }

    #[test]
    fn test_emission_repeats_last_entry() {
        let model = SupplyModel::default();
        assert_eq!(model.emission_for_year(1), Amount::from_u64(50_000_000));
        assert_eq!(model.emission_for_year(9), Amount::from_u64(20_480_000));

        let empty = SupplyModel {
            yearly_emission: Vec::new(),
            ..Default::default()
        };
        assert!(empty.emission_for_year(1).is_zero());
    }

    #[test]
    fn test_first_year_projection() {
        let model = ValuationModel::new(ValuationConfig::default()).unwrap();
        let projections = model.project_supply(3).unwrap();
        assert_eq!(projections.len(), 3);

        let first = &projections[0];
        // (150M + 50M) × 0.02
        assert_eq!(first.burned, Amount::from_u64(4_000_000));
        assert_eq!(first.circulating, Amount::from_u64(196_000_000));
        assert_eq!(first.staked, Amount::from_u64(78_400_000));
        assert_eq!(first.total_supply, Amount::from_u64(1_046_000_000));
        assert!((first.inflation_rate - 1.0 / 3.0).abs() < 1e-12);
        // 12 × (0.4·0.05 + 0.3·0.04 + 0.2·0.03 + 0.1·0.02)
        assert!((first.demand_growth - 0.48).abs() < 1e-12);
        assert!(first.price > 0.05);

        // Demand decays year over year
        assert!((projections[1].demand_growth - 0.48 * 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_projection_horizon_bounded() {
        let model = ValuationModel::new(ValuationConfig::default()).unwrap();

        assert!(model.project_supply(0).unwrap().is_empty());
        let longest = model.project_supply(MAX_HORIZON_YEARS).unwrap();
        assert_eq!(longest.len(), MAX_HORIZON_YEARS as usize);
        assert!(longest.iter().all(|p| p.price.is_finite() && p.price >= 0.0));

        assert!(matches!(
            model.project_supply(MAX_HORIZON_YEARS + 1),
            Err(TokenomicsError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            model.project_supply(u32::MAX),
            Err(TokenomicsError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_price_never_negative() {
        let config = ValuationConfig {
            demand_drivers: Vec::new(),
            supply: SupplyModel {
                initial_supply: Amount::from_u64(100),
                initial_circulating: Amount::from_u64(10),
                yearly_emission: vec![Amount::from_u64(1_000_000)],
                ..Default::default()
            },
            ..Default::default()
        };
        let model = ValuationModel::new(config).unwrap();
        for projection in model.project_supply(4).unwrap() {
            assert!(projection.price >= 0.0);
        }
    }

    #[test]
    fn test_current_metrics() {
        let model = ValuationModel::new(ValuationConfig::default()).unwrap();
        let metrics = model.current_metrics();

        assert!((metrics.market_cap - 7_500_000.0).abs() < 1e-6);
        assert!((metrics.fully_diluted_valuation - 50_000_000.0).abs() < 1e-6);
        assert!((metrics.mcap_to_fdv - 0.15).abs() < 1e-12);
        assert!((metrics.staking_ratio - 0.30).abs() < 1e-12);
        assert_eq!(metrics.annual_burn_estimate, Amount::from_u64(3_000_000));
    }

    #[test]
    fn test_equilibrium_uses_heuristics() {
        let mut model = ValuationModel::new(ValuationConfig::default()).unwrap();
        let analysis = model.calculate_equilibrium();
        assert!((analysis.staking_gap - 0.2).abs() < 1e-9);
        assert!((analysis.current_liquidity_ratio - 0.12).abs() < 1e-12);
        assert_eq!(analysis.current_velocity, 5.0);

        model.set_staked(Amount::from_u64(75_000_000)).unwrap();
        model.set_assumed_liquidity_ratio(0.15).unwrap();
        model.set_estimated_velocity(4.0).unwrap();
        assert!(model.calculate_equilibrium().is_balanced);
    }

    #[test]
    fn test_setters_reject_invalid_state() {
        let mut model = ValuationModel::new(ValuationConfig::default()).unwrap();
        assert!(model.set_price(-1.0).is_err());
        assert!(model.set_price(f64::NAN).is_err());
        assert!(model.set_staked(Amount::from_u64(150_000_001)).is_err());
        assert!(model.set_assumed_liquidity_ratio(1.5).is_err());
        assert!(model.set_estimated_velocity(f64::INFINITY).is_err());
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let config = ValuationConfig {
            demand_drivers: vec![
                DemandDriver::new("a", 0.7, 0.01),
                DemandDriver::new("b", 0.6, 0.01),
            ],
            ..Default::default()
        };
        assert!(matches!(
            ValuationModel::new(config),
            Err(TokenomicsError::InvalidConfiguration(_))
        ));

        let config = ValuationConfig {
            demand_drivers: vec![DemandDriver::new("a", -0.1, 0.01)],
            ..Default::default()
        };
        assert!(ValuationModel::new(config).is_err());
    }

    proptest! {
        #[test]
        fn prop_supply_conservation(
            circulating in 0u64..1_000_000_000_000,
            emission in 0u64..100_000_000_000,
            burn_bps in 0u32..=10_000,
            stake_bps in 0u32..=10_000,
            years in 1u32..8,
        ) {
            let config = ValuationConfig {
                supply: SupplyModel {
                    initial_supply: Amount::from_u64(circulating) + Amount::from_u64(1_000),
                    initial_circulating: Amount::from_u64(circulating),
                    yearly_emission: SupplyModel::decaying_schedule(
                        &Amount::from_u64(emission),
                        0.2,
                        5,
                    ),
                    emission_decay: 0.2,
                    annual_burn_rate: burn_bps as f64 / 10_000.0,
                    staking_target: stake_bps as f64 / 10_000.0,
                },
                ..Default::default()
            };
            let model = ValuationModel::new(config).unwrap();

            for p in model.project_supply(years).unwrap() {
                let expected =
                    (p.circulating_start.clone() + p.emission.clone()) - p.burned.clone();
                prop_assert_eq!(&p.circulating, &expected);
                prop_assert_eq!(p.staked.clone() + p.liquid.clone(), p.circulating.clone());
                prop_assert!(p.circulating <= p.total_supply);
            }
        }
    }
}
