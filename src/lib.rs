//! Parsers for the transaction exports of UBS e-banking.
//!
//! Two file types are supported:
//!
//! - **Account statement** ([AccountExport]): eight `Label:;value;` metadata
//!   lines, an empty line, the table header and one `;` separated row per
//!   transaction. The declared transaction count is checked against the rows.
//! - **Credit card** ([CardExport]): a `sep=;` directive line, the header and
//!   the rows, blank lines allowed.
//!
//! Both are parsed from text in one go. Any structural problem or field that
//! fails to decode aborts the parse with an [Errors] value pointing at the
//! offending line.
//!
//! ```
//! use ubs_export::{CardExport, Errors};
//!
//! let text = "sep=;\n\
//!     Account number;Card number;Account/Cardholder;Purchase date;Booking text;Sector;Amount;Original currency;Rate;Currency;Debit;Credit;Booked\n\
//!     3344 4554 5566;4455 6666 5544 3332;JOHN DOE;9.2.2019;SHOP;Art supplies;3.0;BRL;0.151327;CHF;0.46;;9.2.2019\n";
//!
//! let export = CardExport::parse(text)?;
//! assert_eq!(export.transactions().len(), 1);
//! assert_eq!(export.transactions()[0].currency.code(), "CHF");
//! # Ok::<(), Errors>(())
//! ```

mod account;
mod amount;
mod card;
mod config;
mod currency;
mod decode;
mod error;
mod record;

pub use account::{AccountExport, AccountTransaction};
pub use amount::Amount;
pub use card::{CardExport, CardKey, CardTransaction};
pub use config::{
    BookedFlag, HeaderPolicy, ParserConfig, ACCOUNT_HEADER, CARD_HEADER, LEGACY_ACCOUNT_HEADER,
};
pub use currency::{Currency, CurrencyRegistry, IsoCurrencies};
pub use error::{DecodeError, Errors};

use std::collections::HashSet;
use std::hash::Hash;

fn distinct<K: Eq + Hash>(keys: impl Iterator<Item = K>) -> usize {
    keys.collect::<HashSet<_>>().len()
}

/// Keys seen more than once, each reported at its first repeat.
fn duplicates<K: Eq + Hash + Copy>(keys: impl Iterator<Item = K>) -> Vec<K> {
    let mut seen = HashSet::new();
    let mut repeated = Vec::new();
    for key in keys {
        if !seen.insert(key) && !repeated.contains(&key) {
            repeated.push(key);
        }
    }
    repeated
}
