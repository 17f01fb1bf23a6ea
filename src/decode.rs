//! Conversions from raw export fields to typed values.
//!
//! Optional columns map the empty string to `None`. Anything else must decode
//! or the call fails, nothing is defaulted.

use chrono::{NaiveDate, NaiveTime};

use crate::amount::Amount;
use crate::config::BookedFlag;
use crate::error::DecodeError;

const ISO_DATE: &str = "%Y-%m-%d";
const DOTTED_DATE: &str = "%d.%m.%Y";
const TIME: &str = "%H:%M:%S";

pub fn amount(s: &str) -> Result<Amount, DecodeError> {
    s.parse()
}

pub fn optional_amount(s: &str) -> Result<Option<Amount>, DecodeError> {
    if s.is_empty() {
        return Ok(None);
    }
    amount(s).map(Some)
}

/// Whether `s` matches `template` byte for byte, `9` standing for any digit.
fn has_shape(s: &str, template: &str) -> bool {
    s.len() == template.len()
        && s.bytes().zip(template.bytes()).all(|(b, t)| match t {
            b'9' => b.is_ascii_digit(),
            _ => b == t,
        })
}

/// ISO 8601 calendar date, `YYYY-MM-DD`.
pub fn date(s: &str) -> Result<NaiveDate, DecodeError> {
    // chrono tolerates unpadded, signed and space-filled numbers
    if !has_shape(s, "9999-99-99") {
        return Err(DecodeError::InvalidDate { value: s.to_owned() });
    }
    NaiveDate::parse_from_str(s, ISO_DATE).map_err(|_| DecodeError::InvalidDate { value: s.to_owned() })
}

/// ISO date, or the `D.M.YYYY` form found in card exports.
pub fn date_or_dotted(s: &str) -> Result<NaiveDate, DecodeError> {
    date(s).or_else(|_| {
        let mut parts = s.split('.');
        let dotted = matches!(
            (parts.next(), parts.next(), parts.next(), parts.next()),
            (Some(d), Some(m), Some(y), None)
                if [d, m].iter().all(|p| has_shape(p, "9") || has_shape(p, "99"))
                    && has_shape(y, "9999")
        );
        if !dotted {
            return Err(DecodeError::InvalidDate { value: s.to_owned() });
        }
        NaiveDate::parse_from_str(s, DOTTED_DATE)
            .map_err(|_| DecodeError::InvalidDate { value: s.to_owned() })
    })
}

/// `HH:MM:SS`, or `None` for an empty field. No leap seconds.
pub fn optional_time(s: &str) -> Result<Option<NaiveTime>, DecodeError> {
    if s.is_empty() {
        return Ok(None);
    }
    if !has_shape(s, "99:99:99") || &s[6..] >= "60" {
        return Err(DecodeError::InvalidTime { value: s.to_owned() });
    }
    NaiveTime::parse_from_str(s, TIME)
        .map(Some)
        .map_err(|_| DecodeError::InvalidTime { value: s.to_owned() })
}

pub fn count(s: &str) -> Result<usize, DecodeError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::InvalidCount { value: s.to_owned() });
    }
    s.parse()
        .map_err(|_| DecodeError::InvalidCount { value: s.to_owned() })
}

pub fn flag(s: &str, mode: BookedFlag) -> Result<bool, DecodeError> {
    match mode {
        BookedFlag::NonEmpty => Ok(!s.is_empty()),
        BookedFlag::StrictToken => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" | "" => Ok(false),
            _ => Err(DecodeError::InvalidFlag { value: s.to_owned() }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_optional_amount_is_absent_not_zero() {
        assert_eq!(optional_amount("").unwrap(), None);
        assert_eq!(optional_amount("0.00").unwrap(), Some(dec!(0.00).into()));
    }

    #[test]
    fn test_required_amount_rejects_empty() {
        assert!(matches!(amount(""), Err(DecodeError::InvalidAmount { .. })));
    }

    #[test]
    fn test_optional_amount_rejects_garbage() {
        assert_eq!(
            optional_amount("n/a"),
            Err(DecodeError::InvalidAmount { value: "n/a".into() })
        );
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(date("2025-01-31").unwrap(), NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
        for bad in [
            "",
            "2025-1-31",
            "2025-02-30",
            "31.01.2025",
            "2025/01/31",
            "2025-01- 1",
            "2025- 1-01",
            "+025-01-01",
            " 2025-01-1",
        ] {
            assert!(
                matches!(date(bad), Err(DecodeError::InvalidDate { .. })),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn test_dotted_date_fallback() {
        let expected = NaiveDate::from_ymd_opt(2019, 2, 9).unwrap();
        assert_eq!(date_or_dotted("9.2.2019").unwrap(), expected);
        assert_eq!(date_or_dotted("09.02.2019").unwrap(), expected);
        assert_eq!(date_or_dotted("2019-02-09").unwrap(), expected);
        for bad in [
            "30.2.2019",
            "9.2.19",
            " 9.2.2019",
            "9.2.2019 ",
            "009.2.2019",
            "9..2019",
            "9.2.2019.1",
            "+9.2.2019",
        ] {
            assert!(
                matches!(date_or_dotted(bad), Err(DecodeError::InvalidDate { .. })),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn test_optional_time() {
        assert_eq!(optional_time("").unwrap(), None);
        assert_eq!(
            optional_time("00:11:22").unwrap(),
            NaiveTime::from_hms_opt(0, 11, 22)
        );
        assert_eq!(
            optional_time("23:59:59").unwrap(),
            NaiveTime::from_hms_opt(23, 59, 59)
        );
        for bad in ["0:11:22", "24:00:00", "12:00", "noon", "23:59:60", "12: 0:00", "+1:00:00"] {
            assert!(
                matches!(optional_time(bad), Err(DecodeError::InvalidTime { .. })),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn test_count() {
        assert_eq!(count("365").unwrap(), 365);
        for bad in ["", "-1", "3.0", " 3"] {
            assert!(matches!(count(bad), Err(DecodeError::InvalidCount { .. })));
        }
    }

    #[test]
    fn test_non_empty_flag_treats_false_as_true() {
        assert!(flag("false", BookedFlag::NonEmpty).unwrap());
        assert!(flag("9.2.2019", BookedFlag::NonEmpty).unwrap());
        assert!(!flag("", BookedFlag::NonEmpty).unwrap());
    }

    #[test]
    fn test_strict_flag() {
        assert!(flag("TRUE", BookedFlag::StrictToken).unwrap());
        assert!(flag("1", BookedFlag::StrictToken).unwrap());
        assert!(!flag("false", BookedFlag::StrictToken).unwrap());
        assert!(!flag("", BookedFlag::StrictToken).unwrap());
        assert!(matches!(
            flag("9.2.2019", BookedFlag::StrictToken),
            Err(DecodeError::InvalidFlag { .. })
        ));
    }
}
