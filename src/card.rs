use chrono::NaiveDate;
use log::{debug, trace};
use rust_decimal::Decimal;
use serde::Serialize;

use std::path::Path;

use crate::amount::Amount;
use crate::config::{ParserConfig, CARD_HEADER};
use crate::currency::Currency;
use crate::decode;
use crate::error::{AtField, Errors};
use crate::record::{split_records, Row};

/// Directive line and header.
pub const MIN_LINES: usize = 2;
const HEADER_LINE: usize = 1;
const FIELDS: usize = 13;

/// A single row of a credit card export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardTransaction {
    pub account_number: String,
    pub card_number: String,
    pub cardholder: String,
    pub purchase_date: NaiveDate,
    pub booking_text: String,
    pub sector: String,
    pub amount: Amount,
    pub original_currency: Currency,
    pub rate: Option<Decimal>,
    pub currency: Currency,
    pub debit: Option<Amount>,
    pub credit: Option<Amount>,
    pub booked: bool,
}

/// Business key of a [CardTransaction].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardKey<'a> {
    pub card_number: &'a str,
    pub purchase_date: NaiveDate,
    pub amount: Amount,
    pub booking_text: &'a str,
}

impl CardTransaction {
    /// Card number, purchase date, amount and booking text.
    ///
    /// Rows agreeing on these are duplicates whatever the sector, rate or
    /// booking state say. Amounts compare by value, `3.0` equals `3.00`.
    pub fn key(&self) -> CardKey<'_> {
        CardKey {
            card_number: &self.card_number,
            purchase_date: self.purchase_date,
            amount: self.amount,
            booking_text: &self.booking_text,
        }
    }

    /// Maps a decoded row. Amount and both currencies are required, rate,
    /// debit and credit may be empty.
    pub(crate) fn from_row(row: &Row, config: &ParserConfig) -> Result<Self, Errors> {
        let line = row.line;
        let currencies = config.currencies.as_ref();
        Ok(Self {
            account_number: row.get(0).to_owned(),
            card_number: row.get(1).to_owned(),
            cardholder: row.get(2).to_owned(),
            purchase_date: decode::date_or_dotted(row.get(3)).at(line, "Purchase date")?,
            booking_text: row.get(4).to_owned(),
            sector: row.get(5).to_owned(),
            amount: decode::amount(row.get(6)).at(line, "Amount")?,
            original_currency: Currency::with_registry(row.get(7), currencies)
                .at(line, "Original currency")?,
            rate: decode::optional_amount(row.get(8))
                .at(line, "Rate")?
                .map(|rate| rate.0),
            currency: Currency::with_registry(row.get(9), currencies).at(line, "Currency")?,
            debit: decode::optional_amount(row.get(10)).at(line, "Debit")?,
            credit: decode::optional_amount(row.get(11)).at(line, "Credit")?,
            booked: decode::flag(row.get(12), config.booked).at(line, "Booked")?,
        })
    }
}

/// A parsed credit card export.
///
/// Unlike [crate::AccountExport] the file declares no transaction count, so
/// there is nothing to cross-check the rows against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardExport {
    transactions: Vec<CardTransaction>,
}

impl CardExport {
    /// Parses a card export with the default [ParserConfig].
    ///
    /// # Arguments
    ///
    /// * `text` - Whole content of the export file.
    pub fn parse(text: &str) -> Result<Self, Errors> {
        Self::parse_with(text, &ParserConfig::default())
    }

    /// Parses a card export: a `sep=;` directive line that is skipped
    /// unread, the header and one row per transaction. Blank lines between
    /// rows are ignored.
    ///
    /// # Arguments
    ///
    /// * `text` - Whole content of the export file.
    /// * `config` - How the `Booked` column is read and the currency registry.
    pub fn parse_with(text: &str, config: &ParserConfig) -> Result<Self, Errors> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
        if lines.len() < MIN_LINES {
            return Err(Errors::TruncatedFile {
                lines: lines.len(),
                required: MIN_LINES,
            });
        }
        if lines[HEADER_LINE] != CARD_HEADER {
            return Err(Errors::UnexpectedHeader {
                line: HEADER_LINE + 1,
                found: lines[HEADER_LINE].to_owned(),
            });
        }

        let mut transactions = Vec::new();
        let mut skipped = 0usize;
        for record in split_records(&lines[MIN_LINES..], MIN_LINES + 1)? {
            if record.is_blank() {
                skipped += 1;
                continue;
            }
            let row = record.decode(FIELDS)?;
            let transaction = CardTransaction::from_row(&row, config)?;
            trace!(
                "Line {}: {} {} {}",
                row.line,
                transaction.purchase_date,
                transaction.amount,
                transaction.booking_text
            );
            transactions.push(transaction);
        }
        debug!(
            "Parsed card export with {} transactions, skipped {} blank lines",
            transactions.len(),
            skipped
        );

        Ok(Self { transactions })
    }

    /// Reads and parses the export at `path` with the default [ParserConfig].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Errors> {
        Self::from_path_with(path, &ParserConfig::default())
    }

    /// Reads the whole file at `path` as UTF-8 and parses it.
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the export file.
    /// * `config` - Parser settings, see [ParserConfig].
    pub fn from_path_with<P: AsRef<Path>>(path: P, config: &ParserConfig) -> Result<Self, Errors> {
        Self::parse_with(&std::fs::read_to_string(path)?, config)
    }

    /// Transactions in file order.
    pub fn transactions(&self) -> &[CardTransaction] {
        &self.transactions
    }

    /// Number of distinct business keys.
    pub fn distinct_transactions(&self) -> usize {
        crate::distinct(self.transactions.iter().map(CardTransaction::key))
    }

    /// Business keys appearing more than once, in order of first repeat.
    pub fn duplicate_keys(&self) -> Vec<CardKey<'_>> {
        crate::duplicates(self.transactions.iter().map(CardTransaction::key))
    }
}
