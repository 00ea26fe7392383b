// simulation/src/monte_carlo.rs

//! Monte Carlo fan-out over seeded single runs.
//!
//! Iteration `i` runs on `ChaCha8Rng::seed_from_u64(seed + i)`, so a batch is
//! reproducible from its base seed and iteration 0 matches a single run on
//! the same seed. Iterations share no mutable state and are merged by year
//! once all of them have finished.

use crate::{
    scenario::{Scenario, SimulationConfig},
    simulator::{run_once, RunOutcome, MAX_ITERATIONS, MAX_YEARS},
    stats::ConfidenceBand,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Merged Monte Carlo output
#[derive(Debug, Clone)]
pub struct MonteCarloOutcome {
    /// Iteration 0, reported as the representative path
    pub first: RunOutcome,
    /// One band per simulated year
    pub confidence_intervals: Vec<ConfidenceBand>,
    pub iterations: u32,
}

pub fn run_monte_carlo(
    config: &SimulationConfig,
    scenario: &Scenario,
    years: u32,
    iterations: u32,
    seed: u64,
) -> MonteCarloOutcome {
    let iterations = iterations.clamp(1, MAX_ITERATIONS);
    let years = years.min(MAX_YEARS);

    let mut runs: Vec<RunOutcome> = (0..iterations)
        .into_par_iter()
        .map(|i| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(i as u64));
            run_once(config, scenario, years, &mut rng)
        })
        .collect();

    let confidence_intervals = (0..years as usize)
        .map(|year_index| {
            let mut prices = Vec::with_capacity(runs.len());
            let mut staking_ratios = Vec::with_capacity(runs.len());
            let mut users = Vec::with_capacity(runs.len());
            for run in &runs {
                if let Some(projection) = run.projections.get(year_index) {
                    prices.push(projection.price);
                    staking_ratios.push(projection.staking_ratio);
                    users.push(projection.users);
                }
            }
            ConfidenceBand::from_samples(year_index as u32 + 1, &prices, &staking_ratios, &users)
        })
        .collect();

    tracing::debug!(
        "Monte Carlo for {} merged {} iterations over {} years",
        scenario.name,
        iterations,
        years
    );

    // collect() keeps iteration order, so index 0 is the base seed
    let first = runs.swap_remove(0);

    MonteCarloOutcome {
        first,
        confidence_intervals,
        iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::{ScenarioSimulator, SimulationRequest};
    use proptest::prelude::*;
    use token_core::EventBus;

    #[test]
    fn test_iteration_zero_matches_single_run() {
        let config = SimulationConfig::default();
        let scenario = config.scenario("base").unwrap().clone();

        let batch = run_monte_carlo(&config, &scenario, 3, 8, 99);
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let single = run_once(&config, &scenario, 3, &mut rng);

        assert_eq!(batch.first.projections, single.projections);
        assert_eq!(batch.confidence_intervals.len(), 3);
        assert_eq!(batch.iterations, 8);
    }

    #[test]
    fn test_batch_is_reproducible() {
        let config = SimulationConfig::default();
        let scenario = config.scenario("stress").unwrap().clone();

        let a = run_monte_carlo(&config, &scenario, 2, 16, 1234);
        let b = run_monte_carlo(&config, &scenario, 2, 16, 1234);
        assert_eq!(a.confidence_intervals, b.confidence_intervals);
    }

    #[test]
    fn test_direct_batch_is_capped() {
        let config = SimulationConfig::default();
        let scenario = config.scenario("base").unwrap().clone();

        let batch = run_monte_carlo(&config, &scenario, 1, u32::MAX, 5);
        assert_eq!(batch.iterations, MAX_ITERATIONS);
        assert_eq!(batch.confidence_intervals.len(), 1);

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let single = run_once(&config, &scenario, u32::MAX, &mut rng);
        assert_eq!(single.projections.len(), MAX_YEARS as usize);
    }

    #[test]
    fn test_simulator_monte_carlo_request() {
        let simulator = ScenarioSimulator::new(SimulationConfig::default(), EventBus::shared()).unwrap();
        let result = simulator
            .run_simulation(&SimulationRequest::new("bull", 4).with_monte_carlo(None).with_seed(3))
            .unwrap();

        assert_eq!(result.iterations, 100);
        let bands = result.confidence_intervals.unwrap();
        assert_eq!(bands.len(), 4);
        assert_eq!(bands[3].year, 4);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_bands_ordered(seed in any::<u64>(), iterations in 1u32..24) {
            let config = SimulationConfig::default();
            let scenario = config.scenario("bear").unwrap().clone();
            let batch = run_monte_carlo(&config, &scenario, 2, iterations, seed);

            for band in &batch.confidence_intervals {
                prop_assert!(band.p10 <= band.p25);
                prop_assert!(band.p25 <= band.p50);
                prop_assert!(band.p50 <= band.p75);
                prop_assert!(band.p75 <= band.p90);
            }
        }
    }
}
