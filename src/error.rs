use thiserror::Error;

/// Failure to decode a single scalar field.
///
/// These carry only the offending text. [Errors::InvalidField] attaches the
/// line and column name once the value is known to come from an export file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },
    #[error("invalid time '{value}', expected HH:MM:SS")]
    InvalidTime { value: String },
    #[error("invalid amount '{value}'")]
    InvalidAmount { value: String },
    #[error("invalid currency code '{code}'")]
    InvalidCurrencyCode { code: String },
    #[error("invalid transaction count '{value}'")]
    InvalidCount { value: String },
    #[error("invalid booked flag '{value}'")]
    InvalidFlag { value: String },
}

/// Structural errors raised while parsing an export file.
///
/// Any of these aborts the whole parse, no partial export is returned.
/// Line numbers are 1-based and refer to the physical lines of the input.
#[derive(Error, Debug)]
pub enum Errors {
    #[error("Failed to read export file: {0}")]
    Io(#[from] std::io::Error),
    #[error("File has {lines} lines, at least {required} are required")]
    TruncatedFile { lines: usize, required: usize },
    #[error("Line {line}: expected label '{expected}', found '{found}'")]
    UnexpectedLabel {
        line: usize,
        expected: &'static str,
        found: String,
    },
    #[error("Line {line}: expected an empty separator line, found '{found}'")]
    MissingSeparator { line: usize, found: String },
    #[error("Line {line}: unexpected header '{found}'")]
    UnexpectedHeader { line: usize, found: String },
    #[error("Line {line}: row has {fields} fields, at least {required} are required")]
    MalformedRow {
        line: usize,
        fields: usize,
        required: usize,
    },
    #[error("Line {line}: quoted field is never closed")]
    UnterminatedQuote { line: usize },
    #[error("Line {line}: more than one record on the line")]
    TrailingRecord { line: usize },
    #[error("Line {line}: {source}")]
    Csv {
        line: usize,
        #[source]
        source: csv::Error,
    },
    #[error("Line {line}: field '{field}': {source}")]
    InvalidField {
        line: usize,
        field: &'static str,
        #[source]
        source: DecodeError,
    },
    #[error("Export declares {declared} transactions but {parsed} were parsed")]
    TransactionCountMismatch { declared: usize, parsed: usize },
}

impl Errors {
    /// Line the error points at, when it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Errors::UnexpectedLabel { line, .. }
            | Errors::MissingSeparator { line, .. }
            | Errors::UnexpectedHeader { line, .. }
            | Errors::MalformedRow { line, .. }
            | Errors::UnterminatedQuote { line }
            | Errors::TrailingRecord { line }
            | Errors::Csv { line, .. }
            | Errors::InvalidField { line, .. } => Some(*line),
            Errors::Io(_) | Errors::TruncatedFile { .. } | Errors::TransactionCountMismatch { .. } => {
                None
            }
        }
    }
}

pub(crate) trait AtField<T> {
    /// Attaches the location of the decoded value.
    fn at(self, line: usize, field: &'static str) -> Result<T, Errors>;
}

impl<T> AtField<T> for Result<T, DecodeError> {
    fn at(self, line: usize, field: &'static str) -> Result<T, Errors> {
        self.map_err(|source| Errors::InvalidField {
            line,
            field,
            source,
        })
    }
}
