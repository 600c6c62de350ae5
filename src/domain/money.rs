use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Money - decimal amounts and minor-unit conversion
// ============================================================================

/// ISO 4217 currencies the storefront can charge in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    Eur,
    Usd,
    Gbp,
    Jpy,
}

impl Currency {
    /// Lowercase ISO code, as payment providers expect it
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Eur => "eur",
            Currency::Usd => "usd",
            Currency::Gbp => "gbp",
            Currency::Jpy => "jpy",
        }
    }

    /// Number of decimal places in one major unit
    pub fn minor_unit_exponent(&self) -> u32 {
        match self {
            Currency::Jpy => 0,
            Currency::Eur | Currency::Usd | Currency::Gbp => 2,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eur" => Ok(Currency::Eur),
            "usd" => Ok(Currency::Usd),
            "gbp" => Ok(Currency::Gbp),
            "jpy" => Ok(Currency::Jpy),
            other => Err(MoneyError::UnknownCurrency(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MoneyError {
    #[error("Amount cannot be negative: {0}")]
    Negative(Decimal),

    #[error("Amount does not fit in minor units: {0}")]
    Overflow(Decimal),

    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    #[error("Amount has more than two decimal places: {0}")]
    TooPrecise(Decimal),

    #[error("Amount exceeds the storable maximum: {0}")]
    TooLarge(Decimal),
}

/// Decimal places kept by the `NUMERIC(15, 2)` money columns
pub const STORED_SCALE: u32 = 2;

/// Largest amount a `NUMERIC(15, 2)` column holds
pub fn max_stored_amount() -> Decimal {
    Decimal::new(999_999_999_999_999, STORED_SCALE)
}

/// Reject amounts the database would round or refuse, so a stored order total
/// always equals the sum of its stored lines
pub fn check_storable(amount: Decimal) -> Result<(), MoneyError> {
    if amount.normalize().scale() > STORED_SCALE {
        return Err(MoneyError::TooPrecise(amount));
    }
    if amount.abs() > max_stored_amount() {
        return Err(MoneyError::TooLarge(amount));
    }
    Ok(())
}

/// Convert a decimal amount into the currency's minor units (cents for EUR).
///
/// Amounts carrying more precision than the currency allows are rounded half
/// away from zero.
pub fn to_minor_units(amount: Decimal, currency: Currency) -> Result<i64, MoneyError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyError::Negative(amount));
    }

    let exponent = currency.minor_unit_exponent();
    let scaled = amount
        .round_dp_with_strategy(exponent, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::from(10_i64.pow(exponent)))
        .ok_or(MoneyError::Overflow(amount))?;

    scaled.to_i64().ok_or(MoneyError::Overflow(amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eur_amount_converts_to_cents() {
        let amount = Decimal::new(2950, 2);
        assert_eq!(to_minor_units(amount, Currency::Eur).unwrap(), 2950);
    }

    #[test]
    fn test_price_without_float_drift() {
        // 0.1 + 0.2 style drift would give 1498.9999 with f64
        let amount: Decimal = "1499.00".parse().unwrap();
        assert_eq!(to_minor_units(amount, Currency::Eur).unwrap(), 149_900);
    }

    #[test]
    fn test_extra_precision_rounds_half_away_from_zero() {
        let amount: Decimal = "10.005".parse().unwrap();
        assert_eq!(to_minor_units(amount, Currency::Usd).unwrap(), 1001);
    }

    #[test]
    fn test_zero_decimal_currency() {
        let amount: Decimal = "1500".parse().unwrap();
        assert_eq!(to_minor_units(amount, Currency::Jpy).unwrap(), 1500);
    }

    #[test]
    fn test_negative_amount_rejected() {
        let amount = Decimal::new(-100, 2);
        assert_eq!(
            to_minor_units(amount, Currency::Eur),
            Err(MoneyError::Negative(amount))
        );
    }

    #[test]
    fn test_storable_amounts() {
        assert!(check_storable(Decimal::new(2950, 2)).is_ok());
        // Trailing zeros carry no extra precision
        assert!(check_storable("12.5000".parse().unwrap()).is_ok());
        assert!(check_storable(max_stored_amount()).is_ok());
    }

    #[test]
    fn test_unstorable_amounts_rejected() {
        let precise: Decimal = "0.335".parse().unwrap();
        assert_eq!(check_storable(precise), Err(MoneyError::TooPrecise(precise)));

        let large = max_stored_amount() + Decimal::new(1, 2);
        assert_eq!(check_storable(large), Err(MoneyError::TooLarge(large)));
    }

    #[test]
    fn test_currency_parsing() {
        assert_eq!("EUR".parse::<Currency>().unwrap(), Currency::Eur);
        assert_eq!(" usd ".parse::<Currency>().unwrap(), Currency::Usd);
        assert!(matches!(
            "xyz".parse::<Currency>(),
            Err(MoneyError::UnknownCurrency(_))
        ));
    }
}
