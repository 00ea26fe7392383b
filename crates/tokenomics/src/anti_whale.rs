// tokenomics/src/anti_whale.rs

use serde::{Deserialize, Serialize};
use token_core::{Amount, BasisPoints};

/// Anti-whale rules applied to post-launch transfers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AntiWhaleConfig {
    /// Maximum wallet holding, percent of total supply
    pub max_wallet_percent: f64,
    /// Maximum single transaction, percent of total supply
    pub max_transaction_percent: f64,
    /// Days after launch during which sells are taxed
    pub sell_tax_window_days: u64,
    /// Sell tax rate (fraction) applied inside the window
    pub sell_tax_rate: f64,
}

impl Default for AntiWhaleConfig {
    fn default() -> Self {
        Self {
            max_wallet_percent: 2.0,
            max_transaction_percent: 0.5,
            sell_tax_window_days: 7,
            sell_tax_rate: 0.10,
        }
    }
}

impl AntiWhaleConfig {
    /// Largest single transaction allowed for a given supply
    pub fn transaction_cap(&self, total_supply: &Amount) -> Amount {
        total_supply.mul_bps(BasisPoints::from_percent(self.max_transaction_percent))
    }

    /// Largest wallet balance allowed for a given supply
    pub fn wallet_cap(&self, total_supply: &Amount) -> Amount {
        total_supply.mul_bps(BasisPoints::from_percent(self.max_wallet_percent))
    }

    /// Run the checks in order: transaction cap, wallet cap, sell-tax window.
    /// A denial is a normal outcome and is returned as a value.
    pub fn validate(
        &self,
        total_supply: &Amount,
        amount: &Amount,
        wallet_balance: &Amount,
        days_since_launch: u64,
    ) -> TransactionValidation {
        let tx_cap = self.transaction_cap(total_supply);
        if amount > &tx_cap {
            tracing::debug!("Transaction of {} rejected, cap is {}", amount, tx_cap);
            return TransactionValidation::denied(
                format!(
                    "Transaction exceeds maximum of {}% of total supply",
                    self.max_transaction_percent
                ),
                tx_cap,
            );
        }

        let wallet_cap = self.wallet_cap(total_supply);
        let resulting_balance = wallet_balance.clone() + amount.clone();
        if resulting_balance > wallet_cap {
            tracing::debug!(
                "Transaction of {} rejected, wallet would hold {} over cap {}",
                amount,
                resulting_balance,
                wallet_cap
            );
            return TransactionValidation::denied(
                format!(
                    "Wallet would exceed maximum of {}% of total supply",
                    self.max_wallet_percent
                ),
                wallet_cap.saturating_sub(wallet_balance),
            );
        }

        let mut result = TransactionValidation::allowed();
        if days_since_launch < self.sell_tax_window_days {
            result.tax_rate = Some(self.sell_tax_rate);
        }
        result
    }
}

/// Outcome of an anti-whale check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionValidation {
    /// Whether the transaction may proceed
    pub allowed: bool,
    /// Reason for a denial
    pub reason: Option<String>,
    /// Largest amount that would have passed the failing check
    pub max_allowed: Option<Amount>,
    /// Sell tax attached inside the early-sell window
    pub tax_rate: Option<f64>,
}

impl TransactionValidation {
    fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
            max_allowed: None,
            tax_rate: None,
        }
    }

    fn denied(reason: String, max_allowed: Amount) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            max_allowed: Some(max_allowed),
            tax_rate: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn supply() -> Amount {
        Amount::from_u64(1_000_000_000)
    }

    #[test]
    fn test_transaction_cap_boundary() {
        let config = AntiWhaleConfig::default();

        let at_cap = config.validate(&supply(), &Amount::from_u64(5_000_000), &Amount::zero(), 30);
        assert!(at_cap.allowed);

        let over = config.validate(&supply(), &Amount::from_u64(5_000_001), &Amount::zero(), 30);
        assert!(!over.allowed);
        assert_eq!(over.max_allowed.unwrap().to_string(), "5000000");
    }

    #[test]
    fn test_denial_serializes_amount_as_string() {
        let config = AntiWhaleConfig::default();
        let over = config.validate(&supply(), &Amount::from_u64(5_000_001), &Amount::zero(), 30);

        let json = serde_json::to_value(&over).unwrap();
        assert_eq!(json["allowed"], false);
        assert_eq!(json["max_allowed"], "5000000");
        assert!(json["tax_rate"].is_null());
    }

    #[test]
    fn test_wallet_cap() {
        let config = AntiWhaleConfig::default();
        // Wallet cap is 20M, wallet already holds 18M
        let result = config.validate(
            &supply(),
            &Amount::from_u64(3_000_000),
            &Amount::from_u64(18_000_000),
            30,
        );
        assert!(!result.allowed);
        assert_eq!(result.max_allowed, Some(Amount::from_u64(2_000_000)));

        let ok = config.validate(
            &supply(),
            &Amount::from_u64(2_000_000),
            &Amount::from_u64(18_000_000),
            30,
        );
        assert!(ok.allowed);
    }

    #[test]
    fn test_transaction_check_runs_first() {
        let config = AntiWhaleConfig::default();
        let result = config.validate(
            &supply(),
            &Amount::from_u64(6_000_000),
            &Amount::from_u64(19_000_000),
            30,
        );
        assert_eq!(result.max_allowed, Some(Amount::from_u64(5_000_000)));
    }

    #[test]
    fn test_sell_tax_window() {
        let config = AntiWhaleConfig::default();

        let early = config.validate(&supply(), &Amount::from_u64(1_000), &Amount::zero(), 3);
        assert!(early.allowed);
        assert_eq!(early.tax_rate, Some(0.10));

        let late = config.validate(&supply(), &Amount::from_u64(1_000), &Amount::zero(), 7);
        assert_eq!(late.tax_rate, None);

        // Denied transactions never carry a tax
        let denied = config.validate(&supply(), &Amount::from_u64(9_000_000), &Amount::zero(), 0);
        assert_eq!(denied.tax_rate, None);
    }

    proptest! {
        #[test]
        fn prop_cap_allowed_one_above_rejected(
            total in 10_000u64..u64::MAX / 2,
            pct_tenths in 1u32..100,
        ) {
            let config = AntiWhaleConfig {
                max_transaction_percent: pct_tenths as f64 / 10.0,
                max_wallet_percent: 100.0,
                ..Default::default()
            };
            let total_supply = Amount::from_u64(total);
            let cap = config.transaction_cap(&total_supply);

            prop_assert!(config.validate(&total_supply, &cap, &Amount::zero(), 30).allowed);

            let above = cap.clone() + Amount::from_u64(1);
            let result = config.validate(&total_supply, &above, &Amount::zero(), 30);
            prop_assert!(!result.allowed);
            prop_assert_eq!(result.max_allowed, Some(cap));
        }
    }
}
