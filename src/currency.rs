use serde::{Serialize, Serializer};

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::error::DecodeError;

/// Source of known currency codes and their display names.
pub trait CurrencyRegistry {
    /// Display name of an upper-case three letter `code`, `None` when unknown.
    fn name_of(&self, code: &str) -> Option<String>;
}

/// ISO 4217 registry bundled with the `iso_currency` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct IsoCurrencies;

impl CurrencyRegistry for IsoCurrencies {
    fn name_of(&self, code: &str) -> Option<String> {
        iso_currency::Currency::from_code(code).map(|c| c.name().to_string())
    }
}

impl CurrencyRegistry for HashMap<String, String> {
    fn name_of(&self, code: &str) -> Option<String> {
        self.get(code).cloned()
    }
}

/// Validated three letter currency code.
///
/// Equality and hashing consider the code only, the display name is whatever
/// the registry reported at construction time.
#[derive(Debug, Clone, Eq)]
pub struct Currency {
    code: String,
    name: String,
}

impl Currency {
    /// Resolves `code` against the ISO 4217 registry.
    pub fn new(code: &str) -> Result<Self, DecodeError> {
        Self::with_registry(code, &IsoCurrencies)
    }

    /// Resolves `code` against `registry`.
    ///
    /// The code is upper-cased first. Anything other than exactly three ASCII
    /// letters is rejected without consulting the registry.
    pub fn with_registry<R>(code: &str, registry: &R) -> Result<Self, DecodeError>
    where
        R: CurrencyRegistry + ?Sized,
    {
        let invalid = || DecodeError::InvalidCurrencyCode {
            code: code.to_owned(),
        };
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(invalid());
        }
        let code = code.to_ascii_uppercase();
        let name = registry.name_of(&code).ok_or_else(invalid)?;
        Ok(Self { code, name })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Currency {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Hash for Currency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code)
    }
}

/// Serialized as the bare code, e.g. `"CHF"`.
impl Serialize for Currency {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_known_iso_code_resolves_with_name() {
        let chf = Currency::new("CHF").unwrap();
        assert_eq!(chf.code(), "CHF");
        assert!(chf.name().to_lowercase().starts_with("swiss franc"));
        assert_eq!(chf.to_string(), "CHF");
    }

    #[test]
    fn test_code_is_normalized_to_upper_case() {
        let brl = Currency::new("brl").unwrap();
        assert_eq!(brl.code(), "BRL");
        assert_eq!(brl, Currency::new("BRL").unwrap());
    }

    #[test]
    fn test_unknown_or_malformed_codes_are_rejected() {
        for bad in ["", "XQZ", "CH", "CHFF", "C1F", "€UR"] {
            assert!(
                matches!(Currency::new(bad), Err(DecodeError::InvalidCurrencyCode { code }) if code == bad),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_custom_registry_is_consulted() {
        let registry: HashMap<String, String> =
            HashMap::from([("XTS".to_string(), "Testing currency".to_string())]);

        let xts = Currency::with_registry("XTS", &registry).unwrap();
        assert_eq!(xts.name(), "Testing currency");
        assert!(matches!(
            Currency::with_registry("CHF", &registry),
            Err(DecodeError::InvalidCurrencyCode { .. })
        ));
    }

    #[test]
    fn test_equality_and_hash_ignore_display_name() {
        let registry: HashMap<String, String> =
            HashMap::from([("CHF".to_string(), "Franc".to_string())]);
        let local = Currency::with_registry("CHF", &registry).unwrap();
        let iso = Currency::new("CHF").unwrap();

        assert_eq!(local, iso);
        let set: HashSet<Currency> = [local, iso].into_iter().collect();
        assert_eq!(set.len(), 1);
    }
}
