use csv::StringRecord;

use crate::error::Errors;

/// One logical record of a data section, possibly spanning several lines
/// when a quoted field contains a line break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawRecord {
    /// 1-based line the record starts on.
    pub line: usize,
    pub text: String,
}

impl RawRecord {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Splits the record on `;` honouring `"` quoting, and checks that at
    /// least `required` fields came out.
    pub fn decode(&self, required: usize) -> Result<Row, Errors> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .quote(b'"')
            .has_headers(false)
            .flexible(true)
            .from_reader(self.text.as_bytes());

        let fields = match reader.records().next() {
            Some(record) => record.map_err(|source| Errors::Csv {
                line: self.line,
                source,
            })?,
            None => StringRecord::new(),
        };
        // a lone carriage return ends a record for the csv reader
        if reader.records().next().is_some() {
            return Err(Errors::TrailingRecord { line: self.line });
        }
        if fields.len() < required {
            return Err(Errors::MalformedRow {
                line: self.line,
                fields: fields.len(),
                required,
            });
        }
        Ok(Row {
            line: self.line,
            fields,
        })
    }
}

/// A decoded record with enough fields for its mapper.
#[derive(Debug)]
pub(crate) struct Row {
    pub line: usize,
    fields: StringRecord,
}

impl Row {
    pub fn get(&self, idx: usize) -> &str {
        self.fields.get(idx).unwrap_or("")
    }
}

/// Where a line scan stopped, as far as `"` quoting is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quoting {
    /// At the first byte of a field.
    FieldStart,
    /// Inside an unquoted field, `"` is a literal character here.
    Unquoted,
    /// Inside a quoted field, `;` and line breaks belong to the field.
    Quoted,
    /// Just after a `"` inside a quoted field, either an escape or the close.
    QuoteInQuoted,
}

impl Quoting {
    /// Runs the state over one physical line, the same way the `csv` reader
    /// treats quotes: only a `"` opening a field starts quoting.
    fn scan(mut self, line: &str) -> Self {
        for b in line.bytes() {
            self = match (self, b) {
                (Quoting::FieldStart, b'"') => Quoting::Quoted,
                (Quoting::Quoted, b'"') => Quoting::QuoteInQuoted,
                (Quoting::Quoted, _) => Quoting::Quoted,
                (Quoting::QuoteInQuoted, b'"') => Quoting::Quoted,
                (_, b';') => Quoting::FieldStart,
                _ => Quoting::Unquoted,
            };
        }
        self
    }
}

/// Groups physical `lines` into logical records.
///
/// A record continues onto the next line only while a quoted field is open.
/// `first_line` is the 1-based number of `lines[0]`.
pub(crate) fn split_records(lines: &[&str], first_line: usize) -> Result<Vec<RawRecord>, Errors> {
    let mut records = Vec::new();
    let mut open: Option<RawRecord> = None;

    for (idx, line) in lines.iter().enumerate() {
        let record = match open.take() {
            Some(mut record) => {
                record.text.push('\n');
                record.text.push_str(line);
                record
            }
            None => RawRecord {
                line: first_line + idx,
                text: (*line).to_owned(),
            },
        };
        if Quoting::FieldStart.scan(&record.text) == Quoting::Quoted {
            open = Some(record);
        } else {
            records.push(record);
        }
    }

    match open {
        Some(record) => Err(Errors::UnterminatedQuote { line: record.line }),
        None => Ok(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_record_per_plain_line() {
        let records = split_records(&["a;b;", "c;d;"], 11).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 11);
        assert_eq!(records[1].line, 12);
        assert_eq!(records[1].text, "c;d;");
    }

    #[test]
    fn test_quoted_line_break_joins_lines() {
        let records = split_records(&["a;\"first", "second\";c", "d;e"], 1).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 1);
        assert_eq!(records[0].text, "a;\"first\nsecond\";c");
        assert_eq!(records[1].line, 3);

        let row = records[0].decode(3).unwrap();
        assert_eq!(row.get(1), "first\nsecond");
        assert_eq!(row.get(2), "c");
    }

    #[test]
    fn test_escaped_quotes_do_not_open_a_field() {
        let records = split_records(&["a;\"say \"\"hi\"\"\";b"], 1).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].decode(3).unwrap().get(1), "say \"hi\"");
    }

    #[test]
    fn test_quote_inside_unquoted_field_is_literal() {
        let lines = ["a;PIZZA 12\" LARGE;b", "c;SHOP;d", "e;PIZZA 12\" LARGE;f"];
        let records = split_records(&lines, 3).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].line, 4);
        assert_eq!(records[0].decode(3).unwrap().get(1), "PIZZA 12\" LARGE");
        assert_eq!(records[2].decode(3).unwrap().get(1), "PIZZA 12\" LARGE");
    }

    #[test]
    fn test_text_after_closing_quote_does_not_reopen() {
        let records = split_records(&["a;\"b\"c\";d", "e;f"], 1).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].text, "e;f");
    }

    #[test]
    fn test_second_record_on_one_line_is_an_error() {
        let record = RawRecord {
            line: 9,
            text: "a;b;c\rd;e;f".into(),
        };
        assert!(matches!(
            record.decode(3),
            Err(Errors::TrailingRecord { line: 9 })
        ));
    }

    #[test]
    fn test_unterminated_quote_points_at_record_start() {
        let err = split_records(&["a;b", "c;\"open", "more"], 20).unwrap_err();
        assert!(matches!(err, Errors::UnterminatedQuote { line: 21 }));
    }

    #[test]
    fn test_quoted_separator_stays_in_field() {
        let record = RawRecord {
            line: 5,
            text: "x;\"John Doe;Weissstrasse 19; 4001 Basel; CH\";y;".into(),
        };
        let row = record.decode(4).unwrap();
        assert_eq!(row.get(1), "John Doe;Weissstrasse 19; 4001 Basel; CH");
        assert_eq!(row.get(2), "y");
        assert_eq!(row.get(3), "");
    }

    #[test]
    fn test_short_record_is_malformed() {
        let record = RawRecord {
            line: 7,
            text: "a;b;c".into(),
        };
        assert!(matches!(
            record.decode(4),
            Err(Errors::MalformedRow {
                line: 7,
                fields: 3,
                required: 4
            })
        ));
    }

    #[test]
    fn test_blank_record_has_no_fields() {
        let record = RawRecord {
            line: 2,
            text: String::new(),
        };
        assert!(record.is_blank());
        assert!(matches!(
            record.decode(1),
            Err(Errors::MalformedRow { fields: 0, .. })
        ));
    }
}
