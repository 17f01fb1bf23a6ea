use rust_decimal::Decimal;
use serde::Serialize;

use std::ops::Deref;
use std::str::FromStr;

use crate::error::DecodeError;

/// Exact base-10 money amount as printed by the bank.
///
/// The scale of the source text is kept, so `-137.00` stays `-137.00`.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Default, Serialize)]
pub struct Amount(pub Decimal);

// just to ease usage of Amount across other components
impl Deref for Amount {
    type Target = Decimal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Decimal> for Amount {
    fn from(d: Decimal) -> Self {
        Amount(d)
    }
}

impl FromStr for Amount {
    type Err = DecodeError;

    /// Accepts plain signed decimals (`1370.17`, `-137.00`, `+3.0`).
    ///
    /// No thousands separators, exponents or surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DecodeError::InvalidAmount { value: s.to_owned() };
        let digits = s.strip_prefix(&['-', '+'][..]).unwrap_or(s);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
            return Err(invalid());
        }
        let decimal = Decimal::from_str(s).map_err(|_| invalid())?;
        // rust_decimal rounds past 28 fractional digits instead of failing
        let fraction = digits.split_once('.').map_or(0, |(_, f)| f.len());
        if decimal.scale() as usize != fraction {
            return Err(invalid());
        }
        Ok(Amount(decimal))
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_keeps_scale() {
        let amount: Amount = "-137.00".parse().unwrap();
        assert_eq!(*amount, dec!(-137.00));
        assert_eq!(amount.to_string(), "-137.00");
    }

    #[test]
    fn test_amount_is_exact() {
        let amount: Amount = "0.151327".parse().unwrap();
        assert_eq!(*amount, dec!(0.151327));
    }

    #[test]
    fn test_amount_rejects_digits_it_cannot_hold() {
        let exact: Amount = "0.1234567890123456789012345678".parse().unwrap();
        assert_eq!(exact.to_string(), "0.1234567890123456789012345678");
        assert!(matches!(
            "0.12345678901234567890123456789012".parse::<Amount>(),
            Err(DecodeError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_amount_rejects_non_numeric_text() {
        for bad in ["", "-", "abc", "1'234.50", "12,5", " 1.0", "1e3", "1.2.3"] {
            assert!(
                matches!(bad.parse::<Amount>(), Err(DecodeError::InvalidAmount { .. })),
                "{bad:?} should not parse"
            );
        }
    }
}
