// tokenomics/src/burning.rs

use crate::{TokenomicsError, TokenomicsResult};
use serde::{Deserialize, Serialize};
use token_core::Amount;

/// Fractions of each token source that are burned
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BurnMechanics {
    /// Share of transaction fees burned
    pub fee_burn: f64,
    /// Share of slashed stake burned
    pub slashing_burn: f64,
    /// Share of governance deposits burned on failed proposals
    pub governance_burn: f64,
    /// Share of a decommissioned agent's bonded tokens burned
    pub decommission_burn: f64,
}

impl Default for BurnMechanics {
    fn default() -> Self {
        Self {
            fee_burn: 0.30,
            slashing_burn: 0.50,
            governance_burn: 0.10,
            decommission_burn: 1.0,
        }
    }
}

impl BurnMechanics {
    /// Every fraction must lie in [0, 1]
    pub fn validate(&self) -> TokenomicsResult<()> {
        let fractions = [
            ("fee_burn", self.fee_burn),
            ("slashing_burn", self.slashing_burn),
            ("governance_burn", self.governance_burn),
            ("decommission_burn", self.decommission_burn),
        ];

        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(TokenomicsError::InvalidConfiguration(format!(
                    "Burn fraction {} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    /// Burned amounts for one accounting period
    pub fn breakdown(
        &self,
        fees: &Amount,
        slashed: &Amount,
        governance_deposits: &Amount,
        decommissioned: &Amount,
    ) -> BurnBreakdown {
        let fee_burn = fees.mul_rate(self.fee_burn);
        let slashing_burn = slashed.mul_rate(self.slashing_burn);
        let governance_burn = governance_deposits.mul_rate(self.governance_burn);
        let decommission_burn = decommissioned.mul_rate(self.decommission_burn);

        let total = fee_burn.clone()
            + slashing_burn.clone()
            + governance_burn.clone()
            + decommission_burn.clone();

        BurnBreakdown {
            fee_burn,
            slashing_burn,
            governance_burn,
            decommission_burn,
            total,
        }
    }
}

/// Per-source burn totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnBreakdown {
    pub fee_burn: Amount,
    pub slashing_burn: Amount,
    pub governance_burn: Amount,
    pub decommission_burn: Amount,
    pub total: Amount,
}
