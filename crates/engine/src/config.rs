// engine/src/config.rs
use liquidity::LiquidityConfig;
use serde::{Deserialize, Serialize};
use simulation::{SimulationConfig, StressConfig};
use std::path::Path;
use tokenomics::{LaunchConfig, ValuationConfig};

/// Complete engine configuration; every section falls back to its defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub launch: LaunchConfig,
    pub liquidity: LiquidityConfig,
    pub valuation: ValuationConfig,
    pub simulation: SimulationConfig,
    pub stress: StressConfig,
}

impl EngineConfig {
    /// Defaults with the simulation supply side aligned to the valuation model
    pub fn aligned_defaults() -> anyhow::Result<Self> {
        let valuation = ValuationConfig::default();
        let simulation = SimulationConfig::from_valuation(&valuation)?;
        Ok(Self {
            valuation,
            simulation,
            ..Default::default()
        })
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let config: EngineConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let contents = self.to_toml_string()?;
        std::fs::write(path.as_ref(), contents)?;
        Ok(())
    }
}
