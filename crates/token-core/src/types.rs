// token-core/src/types.rs

use crate::CoreError;
use num_bigint::BigUint;
use num_traits::{FromPrimitive, ToPrimitive, Zero};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Basis-point denominator (1 bp = 1/10000)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Scale used when applying floating rates to integer amounts (parts per billion)
pub const RATE_SCALE: u64 = 1_000_000_000;

/// Days per year used by every annualised figure
pub const DAYS_PER_YEAR: u64 = 365;

/// Longest horizon, in years, any projection or simulation may cover
pub const MAX_HORIZON_YEARS: u32 = 100;

/// Convert a float to a `Decimal`, rejecting NaN and infinities
fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::try_from(value).ok()
}

/// Scale a non-negative float by `scale` and round to an integer.
/// Negative, NaN and out-of-range inputs give zero.
fn scaled_u128(value: f64, scale: u64) -> u128 {
    let Some(decimal) = to_decimal(value) else {
        return 0;
    };
    if decimal.is_sign_negative() {
        return 0;
    }

    decimal
        .checked_mul(Decimal::from(scale))
        .map(|d| d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_u128())
        .unwrap_or(0)
}

/// Integer token or currency quantity (BigUint for arbitrary precision).
/// One unit is one whole token, or one unit of the quote currency.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(BigUint);

impl Amount {
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn from_u64(value: u64) -> Self {
        Self(BigUint::from(value))
    }

    /// Floor a float into an amount. Negative and non-finite values become zero.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() || value <= 0.0 {
            return Self::zero();
        }
        Self(BigUint::from_f64(value.floor()).unwrap_or_default())
    }

    pub fn inner(&self) -> &BigUint {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        Some(Amount(&self.0 + &other.0))
    }

    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        if self.0 < other.0 {
            None
        } else {
            Some(Amount(&self.0 - &other.0))
        }
    }

    pub fn saturating_sub(&self, other: &Amount) -> Amount {
        self.checked_sub(other).unwrap_or_else(Amount::zero)
    }

    pub fn mul_u64(&self, factor: u64) -> Amount {
        Amount(&self.0 * BigUint::from(factor))
    }

    /// Integer division; dividing by zero yields zero
    pub fn div_u64(&self, divisor: u64) -> Amount {
        if divisor == 0 {
            return Amount::zero();
        }
        Amount(&self.0 / BigUint::from(divisor))
    }

    /// Multiply by a basis-point fraction (floor)
    pub fn mul_bps(&self, bps: BasisPoints) -> Amount {
        Amount(&self.0 * BigUint::from(bps.value()) / BigUint::from(BPS_DENOMINATOR))
    }

    /// Multiply by a floating rate, rounded to parts per billion before
    /// touching the integer amount. Negative or non-finite rates yield zero.
    pub fn mul_rate(&self, rate: f64) -> Amount {
        let ppb = scaled_u128(rate, RATE_SCALE);
        Amount(&self.0 * BigUint::from(ppb) / BigUint::from(RATE_SCALE))
    }

    /// Divide by a floating rate (floor). Zero, negative or non-finite rates yield zero.
    pub fn div_rate(&self, rate: f64) -> Amount {
        let ppb = scaled_u128(rate, RATE_SCALE);
        if ppb == 0 {
            return Amount::zero();
        }
        Amount(&self.0 * BigUint::from(RATE_SCALE) / BigUint::from(ppb))
    }

    /// `self / other` as a float, 0.0 when `other` is zero
    pub fn ratio_of(&self, other: &Amount) -> f64 {
        if other.is_zero() {
            return 0.0;
        }
        self.to_f64() / other.to_f64()
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::MAX)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, other: Amount) -> Amount {
        Amount(&self.0 + &other.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, other: Amount) -> Amount {
        Amount(&self.0 - &other.0)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount::from_u64(value)
    }
}

impl FromStr for Amount {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().replace('_', "");
        BigUint::from_str(&trimmed)
            .map(Amount)
            .map_err(|e| CoreError::InvalidAmount(format!("{}: {}", s, e)))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer or a decimal integer string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount::from_u64(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        u64::try_from(v)
            .map(Amount::from_u64)
            .map_err(|_| E::custom(format!("negative amount: {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::from_str(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Integer basis points (1/10000)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BasisPoints(u32);

impl BasisPoints {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// 0.5 (percent) -> 50 bps
    pub fn from_percent(percent: f64) -> Self {
        Self(scaled_u128(percent, 100).min(u32::MAX as u128) as u32)
    }

    /// 0.05 (fraction) -> 500 bps
    pub fn from_fraction(fraction: f64) -> Self {
        Self(scaled_u128(fraction, BPS_DENOMINATOR).min(u32::MAX as u128) as u32)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

/// Health classification shared by every monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Worst of two statuses (critical > warning > ok)
    pub fn worst(self, other: HealthStatus) -> HealthStatus {
        self.max(other)
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, HealthStatus::Ok)
    }

    /// Sub-score used in composite health figures
    pub fn score(&self) -> f64 {
        match self {
            HealthStatus::Ok => 100.0,
            HealthStatus::Warning => 50.0,
            HealthStatus::Critical => 0.0,
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthStatus::Ok => "ok",
            HealthStatus::Warning => "warning",
            HealthStatus::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Clamp a score into [0, 100], mapping NaN to zero
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_amount_arithmetic() {
        let a = Amount::from_u64(100);
        let b = Amount::from_u64(50);

        let sum = a.checked_add(&b).unwrap();
        assert_eq!(sum, Amount::from_u64(150));

        let diff = sum.checked_sub(&b).unwrap();
        assert_eq!(diff, Amount::from_u64(100));
    }

    #[test]
    fn test_amount_underflow() {
        let a = Amount::from_u64(50);
        let b = Amount::from_u64(100);

        assert!(a.checked_sub(&b).is_none());
        assert_eq!(a.saturating_sub(&b), Amount::zero());
    }

    #[test]
    fn test_percent_to_bps() {
        assert_eq!(BasisPoints::from_percent(0.5).value(), 50);
        assert_eq!(BasisPoints::from_percent(2.0).value(), 200);
        assert_eq!(BasisPoints::from_fraction(0.29).value(), 2900);
        assert_eq!(BasisPoints::from_percent(-1.0).value(), 0);
        assert_eq!(BasisPoints::from_fraction(f64::NAN).value(), 0);
    }

    #[test]
    fn test_mul_bps_cap() {
        let supply = Amount::from_u64(1_000_000_000);
        let cap = supply.mul_bps(BasisPoints::from_percent(0.5));
        assert_eq!(cap, Amount::from_u64(5_000_000));
        assert_eq!(cap.to_string(), "5000000");
    }

    #[test]
    fn test_mul_rate_rounds_float_noise() {
        // 0.15 * 1.5 * 2.0 is 0.44999999999999996 in binary floating point
        let rate = 0.15 * 1.5 * 2.0;
        let yearly = Amount::from_u64(1_000_000).mul_rate(rate);
        assert_eq!(yearly, Amount::from_u64(450_000));
        assert_eq!(Amount::from_u64(100).mul_rate(-0.5), Amount::zero());
    }

    #[test]
    fn test_div_rate() {
        // 100_000 at 0.02 per token buys 5_000_000 tokens
        let tokens = Amount::from_u64(100_000).div_rate(0.02);
        assert_eq!(tokens, Amount::from_u64(5_000_000));
        assert_eq!(Amount::from_u64(100).div_rate(0.0), Amount::zero());
    }

    #[test]
    fn test_ratio_guard() {
        assert_eq!(Amount::from_u64(5).ratio_of(&Amount::zero()), 0.0);
        assert!((Amount::from_u64(1).ratio_of(&Amount::from_u64(4)) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_amount_serde() {
        let amount = Amount::from_u64(3_000_000_000_000_000_000);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"3000000000000000000\"");

        let parsed: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, amount);

        let from_int: Amount = serde_json::from_str("42").unwrap();
        assert_eq!(from_int, Amount::from_u64(42));
        assert!(serde_json::from_str::<Amount>("-1").is_err());
    }

    #[test]
    fn test_amount_from_str_allows_separators() {
        let amount: Amount = "1_000_000".parse().unwrap();
        assert_eq!(amount, Amount::from_u64(1_000_000));
        assert!(matches!(
            "abc".parse::<Amount>(),
            Err(CoreError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_health_status_ordering() {
        assert_eq!(HealthStatus::Ok.worst(HealthStatus::Warning), HealthStatus::Warning);
        assert_eq!(HealthStatus::Critical.worst(HealthStatus::Warning), HealthStatus::Critical);
        assert_eq!(HealthStatus::Ok.worst(HealthStatus::Ok), HealthStatus::Ok);
    }

    proptest! {
        #[test]
        fn prop_mul_bps_never_exceeds_principal(value in 0u64..u64::MAX, bps in 0u32..=10_000) {
            let amount = Amount::from_u64(value);
            prop_assert!(amount.mul_bps(BasisPoints::new(bps)) <= amount);
        }

        #[test]
        fn prop_from_f64_floors(value in 0.0f64..1e15) {
            let amount = Amount::from_f64(value);
            prop_assert!(amount.to_f64() <= value);
            prop_assert!(value - amount.to_f64() < 1.0);
        }
    }
}
