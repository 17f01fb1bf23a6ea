use chrono::{NaiveDate, NaiveTime};
use log::{debug, trace};
use serde::Serialize;

use std::path::Path;

use crate::amount::Amount;
use crate::config::ParserConfig;
use crate::currency::Currency;
use crate::decode;
use crate::error::{AtField, Errors};
use crate::record::{split_records, Row};

/// Metadata labels of the account export, in file order.
const LABELS: [&str; 8] = [
    "Account number:",
    "IBAN:",
    "From:",
    "Until:",
    "Opening balance:",
    "Closing balance:",
    "Valued in:",
    "Numbers of transactions in this period:",
];

/// Eight metadata lines, the separator and the table header.
pub const MIN_LINES: usize = 10;
const SEPARATOR_LINE: usize = 8;
const HEADER_LINE: usize = 9;
const FIELDS: usize = 14;

/// A single row of an account statement export.
///
/// Derived equality compares every field. Use [AccountTransaction::key] when
/// two rows should count as the same booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountTransaction {
    pub trade_date: NaiveDate,
    pub trade_time: Option<NaiveTime>,
    pub booking_date: NaiveDate,
    pub value_date: NaiveDate,
    pub currency: Currency,
    pub debit: Option<Amount>,
    pub credit: Option<Amount>,
    pub individual_amount: Option<Amount>,
    pub balance: Amount,
    pub transaction_no: String,
    pub description1: String,
    pub description2: String,
    pub description3: String,
    pub footnotes: String,
}

impl AccountTransaction {
    /// Business key, the bank's transaction number.
    ///
    /// Rows sharing a number are duplicates even when other columns differ.
    pub fn key(&self) -> &str {
        &self.transaction_no
    }

    /// Maps a decoded row. No checks between columns: debit and credit may
    /// both be present or both be missing.
    pub(crate) fn from_row(row: &Row, config: &ParserConfig) -> Result<Self, Errors> {
        let line = row.line;
        Ok(Self {
            trade_date: decode::date(row.get(0)).at(line, "Trade date")?,
            trade_time: decode::optional_time(row.get(1)).at(line, "Trade time")?,
            booking_date: decode::date(row.get(2)).at(line, "Booking date")?,
            value_date: decode::date(row.get(3)).at(line, "Value date")?,
            currency: Currency::with_registry(row.get(4), config.currencies.as_ref())
                .at(line, "Currency")?,
            debit: decode::optional_amount(row.get(5)).at(line, "Debit")?,
            credit: decode::optional_amount(row.get(6)).at(line, "Credit")?,
            individual_amount: decode::optional_amount(row.get(7))
                .at(line, "Individual amount")?,
            balance: decode::amount(row.get(8)).at(line, "Balance")?,
            transaction_no: row.get(9).to_owned(),
            description1: row.get(10).to_owned(),
            description2: row.get(11).to_owned(),
            description3: row.get(12).to_owned(),
            footnotes: row.get(13).to_owned(),
        })
    }
}

/// A parsed account statement export.
///
/// Only built through the parse functions, which guarantee that the number
/// of transactions equals the count declared in the metadata block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountExport {
    account_number: String,
    iban: String,
    from_date: NaiveDate,
    until_date: NaiveDate,
    opening_balance: Amount,
    closing_balance: Amount,
    valued_in: Currency,
    number_of_transactions: usize,
    transactions: Vec<AccountTransaction>,
}

impl AccountExport {
    /// Parses an account export with the default [ParserConfig].
    ///
    /// # Arguments
    ///
    /// * `text` - Whole content of the export file.
    pub fn parse(text: &str) -> Result<Self, Errors> {
        Self::parse_with(text, &ParserConfig::default())
    }

    /// Parses an account export.
    ///
    /// The layout is eight `Label:;value;` lines, an empty line, the table
    /// header and one row per transaction. Nothing is returned unless the
    /// whole file is valid.
    ///
    /// Returns the first structural error met, in file order: line count,
    /// metadata lines, separator, header, then each row. The declared
    /// transaction count is compared with the rows last.
    ///
    /// # Arguments
    ///
    /// * `text` - Whole content of the export file.
    /// * `config` - Accepted header wording and the currency registry.
    pub fn parse_with(text: &str, config: &ParserConfig) -> Result<Self, Errors> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
        if lines.len() < MIN_LINES {
            return Err(Errors::TruncatedFile {
                lines: lines.len(),
                required: MIN_LINES,
            });
        }

        let meta = |idx: usize| metadata_value(&lines, idx);
        let account_number = meta(0)?.to_owned();
        let iban = meta(1)?.to_owned();
        let from_date = decode::date(meta(2)?).at(3, "From")?;
        let until_date = decode::date(meta(3)?).at(4, "Until")?;
        let opening_balance = decode::amount(meta(4)?).at(5, "Opening balance")?;
        let closing_balance = decode::amount(meta(5)?).at(6, "Closing balance")?;
        let valued_in =
            Currency::with_registry(meta(6)?, config.currencies.as_ref()).at(7, "Valued in")?;
        let number_of_transactions =
            decode::count(meta(7)?).at(8, "Numbers of transactions in this period")?;

        if !lines[SEPARATOR_LINE].is_empty() {
            return Err(Errors::MissingSeparator {
                line: SEPARATOR_LINE + 1,
                found: lines[SEPARATOR_LINE].to_owned(),
            });
        }
        if !config.header.accepts(lines[HEADER_LINE]) {
            return Err(Errors::UnexpectedHeader {
                line: HEADER_LINE + 1,
                found: lines[HEADER_LINE].to_owned(),
            });
        }

        // a final newline or two is not a row
        let mut data = &lines[MIN_LINES..];
        while let [rest @ .., last] = data {
            if !last.is_empty() {
                break;
            }
            data = rest;
        }

        let mut transactions = Vec::new();
        for record in split_records(data, MIN_LINES + 1)? {
            let row = record.decode(FIELDS)?;
            let transaction = AccountTransaction::from_row(&row, config)?;
            trace!("Line {}: transaction {}", row.line, transaction.key());
            transactions.push(transaction);
        }

        if transactions.len() != number_of_transactions {
            return Err(Errors::TransactionCountMismatch {
                declared: number_of_transactions,
                parsed: transactions.len(),
            });
        }
        debug!(
            "Parsed account export {} ({} to {}) with {} transactions",
            account_number,
            from_date,
            until_date,
            transactions.len()
        );

        Ok(Self {
            account_number,
            iban,
            from_date,
            until_date,
            opening_balance,
            closing_balance,
            valued_in,
            number_of_transactions,
            transactions,
        })
    }

    /// Reads and parses the export at `path` with the default [ParserConfig].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Errors> {
        Self::from_path_with(path, &ParserConfig::default())
    }

    /// Reads the whole file at `path` as UTF-8 and parses it.
    ///
    /// A read failure is reported as [Errors::Io], anything else as in
    /// [AccountExport::parse_with].
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the export file.
    /// * `config` - Parser settings, see [ParserConfig].
    pub fn from_path_with<P: AsRef<Path>>(path: P, config: &ParserConfig) -> Result<Self, Errors> {
        Self::parse_with(&std::fs::read_to_string(path)?, config)
    }

    /// Account number as printed by the bank, e.g. `1234 12345678.12`.
    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn iban(&self) -> &str {
        &self.iban
    }

    /// First day of the statement period.
    pub fn from_date(&self) -> NaiveDate {
        self.from_date
    }

    /// Last day of the statement period.
    pub fn until_date(&self) -> NaiveDate {
        self.until_date
    }

    /// Balance before the first transaction, in [AccountExport::valued_in].
    pub fn opening_balance(&self) -> Amount {
        self.opening_balance
    }

    pub fn closing_balance(&self) -> Amount {
        self.closing_balance
    }

    /// Settlement currency of the account.
    pub fn valued_in(&self) -> &Currency {
        &self.valued_in
    }

    /// Count declared in the metadata block.
    ///
    /// Always equal to `transactions().len()`, the parser rejects files where
    /// they differ.
    pub fn number_of_transactions(&self) -> usize {
        self.number_of_transactions
    }

    /// Transactions in file order.
    pub fn transactions(&self) -> &[AccountTransaction] {
        &self.transactions
    }

    /// Number of distinct transaction numbers.
    pub fn distinct_transactions(&self) -> usize {
        crate::distinct(self.transactions.iter().map(AccountTransaction::key))
    }

    /// Transaction numbers appearing more than once, in order of first repeat.
    pub fn duplicate_keys(&self) -> Vec<&str> {
        crate::duplicates(self.transactions.iter().map(AccountTransaction::key))
    }
}

/// Value of the `Label:;value;` line at `idx`, after checking its label.
fn metadata_value<'a>(lines: &[&'a str], idx: usize) -> Result<&'a str, Errors> {
    let mut parts = lines[idx].split(';');
    let label = parts.next().unwrap_or("");
    if label != LABELS[idx] {
        return Err(Errors::UnexpectedLabel {
            line: idx + 1,
            expected: LABELS[idx],
            found: label.to_owned(),
        });
    }
    Ok(parts.next().unwrap_or(""))
}
