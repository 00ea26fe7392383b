// engine/src/main.rs
use clap::{Parser, Subcommand};
use serde::Serialize;
use simulation::{SimulationRequest, StressInput};
use token_core::Amount;
use tokenomics::TgeOverrides;
use tokenomics_engine::{EngineConfig, TokenomicsEngine};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const LOG_TARGETS: [&str; 6] = [
    "tokenomics_sim",
    "tokenomics_engine",
    "tokenomics",
    "liquidity",
    "simulation",
    "token_core",
];

#[derive(Parser)]
#[command(name = "tokenomics-sim")]
#[command(
    about = "Tokenomics simulation and liquidity flywheel engine",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path; built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration
    Init {
        /// Output path
        #[arg(short, long, default_value = "./tokenomics.toml")]
        output: String,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Run a market scenario simulation
    Simulate {
        /// Scenario name
        #[arg(short, long, default_value = "base")]
        scenario: String,

        /// Horizon in years
        #[arg(short, long, default_value = "5")]
        years: u32,

        /// Add Monte Carlo confidence bands
        #[arg(short, long)]
        monte_carlo: bool,

        /// Monte Carlo iterations
        #[arg(short, long)]
        iterations: Option<u32>,

        /// Base seed
        #[arg(long)]
        seed: Option<u64>,

        /// Run every configured scenario instead of one
        #[arg(long, conflicts_with_all = ["scenario", "monte_carlo", "iterations"])]
        compare: bool,
    },

    /// Apply market shocks
    Stress {
        /// Catalog scenario name
        #[arg(short, long, conflicts_with = "all")]
        scenario: Option<String>,

        /// Run the whole catalog
        #[arg(short, long)]
        all: bool,

        /// Override the pre-shock price
        #[arg(long)]
        price: Option<f64>,

        /// Override the pre-shock staking ratio
        #[arg(long)]
        staking_ratio: Option<f64>,

        /// Override the pre-shock liquidity ratio
        #[arg(long)]
        liquidity_ratio: Option<f64>,
    },

    /// Liquidity health for a given market state
    Health {
        /// Total value locked (quote currency units)
        #[arg(long)]
        tvl: Option<u64>,

        /// Order book depth (quote currency units)
        #[arg(long)]
        depth: Option<u64>,

        /// Average spread as a fraction
        #[arg(long)]
        spread: Option<f64>,

        /// Pool utilization as a fraction
        #[arg(long)]
        utilization: Option<f64>,

        /// Top holder concentration as a fraction
        #[arg(long)]
        concentration: Option<f64>,

        /// Active liquidity providers
        #[arg(long)]
        providers: Option<u64>,
    },

    /// Estimate token generation event figures
    Tge {
        /// Launch price
        #[arg(short, long)]
        price: Option<f64>,

        /// Circulating supply at TGE (tokens)
        #[arg(long)]
        circulating: Option<u64>,

        /// DEX liquidity seeded at TGE
        #[arg(long)]
        dex_liquidity: Option<f64>,
    },

    /// Project supply, staking and price
    Project {
        /// Horizon in years
        #[arg(short, long, default_value = "5")]
        years: u32,
    },

    /// Show launch, liquidity and valuation status
    Status,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging on stderr so stdout stays pure JSON
    let log_level = if cli.debug { "debug" } else { "info" };
    let default_filter = LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, log_level))
        .collect::<Vec<_>>()
        .join(",");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Init { output, force } => {
            init_config(&output, force)?;
        }
        Commands::Simulate {
            scenario,
            years,
            monte_carlo,
            iterations,
            seed,
            compare,
        } => {
            let engine = build_engine(config_path)?;
            if compare {
                print_json(&engine.compare_scenarios(years, seed)?)?;
            } else {
                let mut request = SimulationRequest::new(scenario, years);
                if monte_carlo || iterations.is_some() {
                    request = request.with_monte_carlo(iterations);
                }
                if let Some(seed) = seed {
                    request = request.with_seed(seed);
                }
                print_json(&engine.run_simulation(&request)?)?;
            }
        }
        Commands::Stress {
            scenario,
            all,
            price,
            staking_ratio,
            liquidity_ratio,
        } => {
            let engine = build_engine(config_path)?;
            let mut snapshot = engine.market_snapshot();
            if let Some(price) = price {
                snapshot.price = price;
            }
            if let Some(ratio) = staking_ratio {
                snapshot.staking_ratio = ratio;
            }
            if let Some(ratio) = liquidity_ratio {
                snapshot.liquidity_ratio = ratio;
            }

            match scenario {
                Some(name) => {
                    print_json(&engine.run_stress_test(StressInput::Named(name), &snapshot)?)?;
                }
                None => {
                    if !all {
                        tracing::info!("No scenario named, running the full catalog");
                    }
                    print_json(&engine.run_full_suite(&snapshot))?;
                }
            }
        }
        Commands::Health {
            tvl,
            depth,
            spread,
            utilization,
            concentration,
            providers,
        } => {
            let mut engine = build_engine(config_path)?;
            let flywheel = engine.flywheel_mut();
            if let Some(tvl) = tvl {
                flywheel.set_tvl(Amount::from_u64(tvl));
            }
            if let Some(depth) = depth {
                flywheel.set_liquidity_depth(Amount::from_u64(depth));
            }
            if let Some(spread) = spread {
                flywheel.set_average_spread(spread)?;
            }
            if let Some(utilization) = utilization {
                flywheel.set_utilization(utilization)?;
            }
            if let Some(concentration) = concentration {
                flywheel.set_concentration(concentration)?;
            }
            if let Some(providers) = providers {
                flywheel.set_active_providers(providers);
            }

            let report = serde_json::json!({
                "stage": engine.get_flywheel_stage(),
                "metrics": engine.get_flywheel_metrics(),
                "health": engine.get_liquidity_health(),
                "alerts": engine.check_health_alerts(),
            });
            print_json(&report)?;
        }
        Commands::Tge {
            price,
            circulating,
            dex_liquidity,
        } => {
            let engine = build_engine(config_path)?;
            let overrides = tge_overrides(price, circulating, dex_liquidity);
            print_json(&engine.simulate_tge(&overrides))?;
        }
        Commands::Project { years } => {
            let engine = build_engine(config_path)?;
            print_json(&engine.project_supply(years)?)?;
        }
        Commands::Status => {
            let engine = build_engine(config_path)?;
            print_json(&engine.status())?;
        }
    }

    Ok(())
}

fn build_engine(config_path: Option<&str>) -> anyhow::Result<TokenomicsEngine> {
    let config = match config_path {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path);
            EngineConfig::from_file(path)?
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            EngineConfig::aligned_defaults()?
        }
    };
    TokenomicsEngine::new(config)
}

/// CLI quantities are whole units; `Amount` carries them unscaled
fn tge_overrides(
    price: Option<f64>,
    circulating: Option<u64>,
    dex_liquidity: Option<f64>,
) -> TgeOverrides {
    TgeOverrides {
        circulating_supply: circulating.map(Amount::from_u64),
        price,
        dex_liquidity,
    }
}

fn init_config(output: &str, force: bool) -> anyhow::Result<()> {
    if std::path::Path::new(output).exists() && !force {
        anyhow::bail!("{} already exists; pass --force to overwrite", output);
    }

    let config = EngineConfig::aligned_defaults()?;
    config.to_file(output)?;

    tracing::info!("Default configuration written to {}", output);
    tracing::info!("Edit {} and pass it with --config", output);
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tge_circulating_is_whole_tokens() {
        let cli = Cli::try_parse_from(["tokenomics-sim", "tge", "--circulating", "200000000"])
            .unwrap();
        let Commands::Tge {
            price,
            circulating,
            dex_liquidity,
        } = cli.command
        else {
            panic!("expected tge command");
        };

        let overrides = tge_overrides(price, circulating, dex_liquidity);
        assert_eq!(
            overrides.circulating_supply,
            Some(Amount::from_u64(200_000_000))
        );

        // 200M tokens at the default 0.05 launch price
        let engine = TokenomicsEngine::new(EngineConfig::default()).unwrap();
        let tge = engine.simulate_tge(&overrides);
        assert!((tge.market_cap - 10_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_health_amounts_are_currency_units() {
        let cli = Cli::try_parse_from(["tokenomics-sim", "health", "--depth", "50000"]).unwrap();
        let Commands::Health { depth, .. } = cli.command else {
            panic!("expected health command");
        };

        let mut engine = TokenomicsEngine::new(EngineConfig::default()).unwrap();
        if let Some(depth) = depth {
            engine
                .flywheel_mut()
                .set_liquidity_depth(Amount::from_u64(depth));
        }
        assert_eq!(
            engine.get_liquidity_health().depth,
            token_core::HealthStatus::Critical
        );
    }
}
