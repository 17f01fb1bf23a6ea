use std::sync::Arc;

use crate::currency::{CurrencyRegistry, IsoCurrencies};

/// Transaction table header of the account export, current wording.
pub const ACCOUNT_HEADER: &str = "Trade date;Trade time;Booking date;Value date;Currency;Debit;Credit;Individual amount;Balance;Transaction no.;Description1;Description2;Description3;Footnotes;";

/// Older wording of [ACCOUNT_HEADER], `AccountTransaction no.` instead of `Transaction no.`.
pub const LEGACY_ACCOUNT_HEADER: &str = "Trade date;Trade time;Booking date;Value date;Currency;Debit;Credit;Individual amount;Balance;AccountTransaction no.;Description1;Description2;Description3;Footnotes;";

/// Header of the card export, the line after the `sep=;` directive.
pub const CARD_HEADER: &str = "Account number;Card number;Account/Cardholder;Purchase date;Booking text;Sector;Amount;Original currency;Rate;Currency;Debit;Credit;Booked";

/// Which account header wordings are accepted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum HeaderPolicy {
    /// Only [ACCOUNT_HEADER].
    Canonical,
    /// Only [LEGACY_ACCOUNT_HEADER].
    Legacy,
    /// Either wording.
    #[default]
    Either,
}

impl HeaderPolicy {
    pub fn accepts(self, header: &str) -> bool {
        match self {
            HeaderPolicy::Canonical => header == ACCOUNT_HEADER,
            HeaderPolicy::Legacy => header == LEGACY_ACCOUNT_HEADER,
            HeaderPolicy::Either => header == ACCOUNT_HEADER || header == LEGACY_ACCOUNT_HEADER,
        }
    }
}

/// How the `Booked` column of the card export becomes a boolean.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BookedFlag {
    /// Any non-empty text is `true`, including the word `false`.
    ///
    /// The bank puts the booking date in this column, so this is what the
    /// exports actually need.
    #[default]
    NonEmpty,
    /// Only `true/yes/1` and `false/no/0` (any case) or an empty field.
    StrictToken,
}

/// Knobs shared by both export parsers.
#[derive(Clone)]
pub struct ParserConfig {
    pub header: HeaderPolicy,
    pub booked: BookedFlag,
    pub currencies: Arc<dyn CurrencyRegistry + Send + Sync>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            header: HeaderPolicy::default(),
            booked: BookedFlag::default(),
            currencies: Arc::new(IsoCurrencies),
        }
    }
}

impl ParserConfig {
    pub fn with_header(mut self, header: HeaderPolicy) -> Self {
        self.header = header;
        self
    }

    pub fn with_booked(mut self, booked: BookedFlag) -> Self {
        self.booked = booked;
        self
    }

    pub fn with_currencies(mut self, currencies: Arc<dyn CurrencyRegistry + Send + Sync>) -> Self {
        self.currencies = currencies;
        self
    }
}

impl std::fmt::Debug for ParserConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserConfig")
            .field("header", &self.header)
            .field("booked", &self.booked)
            .finish_non_exhaustive()
    }
}
