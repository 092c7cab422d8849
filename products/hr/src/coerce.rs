//! Cell coercion for the hire-date and salary columns.
//!
//! Each parser tries the cell's native representation first, then falls back
//! to interpreting text. A cell that cannot be read never rejects its row:
//! callers substitute [`hire_date_sentinel`] or zero.

use calamine::Data;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Label stripped from salary text before parsing.
pub const CURRENCY_LABEL: &str = "LKR";
/// Symbol stripped from salary text before parsing.
pub const CURRENCY_SYMBOL: &str = "$";

// Valid range of spreadsheet serial dates (0100-01-01 ..= 9999-12-31).
const SERIAL_MIN: f64 = -657_435.0;
const SERIAL_MAX: f64 = 2_958_466.0;

/// Date stored when a hire date cannot be read.
pub fn hire_date_sentinel() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default()
}

/// Convert a spreadsheet serial date. The fractional part (time of day) is dropped.
pub fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(SERIAL_MIN..SERIAL_MAX).contains(&serial) {
        return None;
    }
    serial_epoch().checked_add_signed(Duration::days(serial.trunc() as i64))
}

pub fn hire_date(cell: &Data) -> NaiveDate {
    parse_hire_date(cell).unwrap_or_else(hire_date_sentinel)
}

pub fn parse_hire_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(value) => value
            .as_datetime()
            .map(|dt| dt.date())
            .or_else(|| from_serial(value.as_f64())),
        Data::DateTimeIso(iso) => parse_native_iso(iso),
        Data::Float(value) => from_serial(*value),
        Data::Int(value) => from_serial(*value as f64),
        // Text only ever carries a serial number; date-like text is not guessed at.
        Data::String(text) => text.trim().parse::<f64>().ok().and_then(from_serial),
        _ => None,
    }
}

// Native date cells of OpenDocument sheets arrive as ISO-8601 strings.
fn parse_native_iso(iso: &str) -> Option<NaiveDate> {
    NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(iso, "%Y-%m-%d"))
        .ok()
}

pub fn salary_cents(cell: &Data) -> i64 {
    parse_salary_cents(cell).unwrap_or(0)
}

pub fn parse_salary_cents(cell: &Data) -> Option<i64> {
    match cell {
        Data::Float(value) => cents_from_f64(*value),
        Data::Int(value) => value.checked_mul(100),
        Data::String(text) => parse_currency(text),
        _ => None,
    }
}

fn cents_from_f64(value: f64) -> Option<i64> {
    let cents = (value * 100.0).round();
    // i64::MAX is not exactly representable; stay strictly inside the range.
    if cents.is_finite() && cents.abs() < 9.0e18 {
        Some(cents as i64)
    } else {
        None
    }
}

/// Parse currency text such as `"$1,234.56"`, `"LKR 1234.56"` or `"(50.00)"`
/// into cents, rounding half away from zero past the second decimal.
pub fn parse_currency(raw: &str) -> Option<i64> {
    let stripped = raw
        .trim()
        .replace(CURRENCY_LABEL, "")
        .replace(CURRENCY_SYMBOL, "");
    let (negative, digits) = split_sign(stripped.trim())?;
    let magnitude = parse_decimal_cents(digits)?;
    Some(if negative { -magnitude } else { magnitude })
}

fn split_sign(text: &str) -> Option<(bool, &str)> {
    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        let inner = inner.trim();
        if inner.starts_with(['-', '+']) || inner.ends_with(['-', '+']) {
            return None;
        }
        return Some((true, inner));
    }
    if let Some(rest) = text.strip_prefix('-') {
        Some((true, rest.trim_start()))
    } else if let Some(rest) = text.strip_prefix('+') {
        Some((false, rest.trim_start()))
    } else if let Some(rest) = text.strip_suffix('-') {
        Some((true, rest.trim_end()))
    } else if let Some(rest) = text.strip_suffix('+') {
        Some((false, rest.trim_end()))
    } else {
        Some((false, text))
    }
}

fn parse_decimal_cents(text: &str) -> Option<i64> {
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut units: i64 = 0;
    let mut seen_digit = false;
    for ch in whole.chars() {
        match ch {
            '0'..='9' => {
                let digit = i64::from(ch as u8 - b'0');
                units = units.checked_mul(10)?.checked_add(digit)?;
                seen_digit = true;
            }
            ',' if seen_digit => {}
            _ => return None,
        }
    }
    if !seen_digit && fraction.is_empty() {
        return None;
    }

    let mut digits = fraction.bytes().map(|b| i64::from(b - b'0'));
    let tens = digits.next().unwrap_or(0);
    let ones = digits.next().unwrap_or(0);
    let round_up = digits.next().is_some_and(|d| d >= 5);

    let cents = units.checked_mul(100)?.checked_add(tens * 10 + ones)?;
    if round_up { cents.checked_add(1) } else { Some(cents) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn serial_numbers_map_to_calendar_dates() {
        assert_eq!(from_serial(44927.0), Some(ymd(2023, 1, 1)));
        assert_eq!(from_serial(45000.75), Some(ymd(2023, 3, 15)));
        assert_eq!(from_serial(0.0), Some(ymd(1899, 12, 30)));
        assert_eq!(from_serial(-1.5), Some(ymd(1899, 12, 29)));
    }

    #[test]
    fn serial_numbers_outside_range_fail() {
        assert_eq!(from_serial(3_000_000.0), None);
        assert_eq!(from_serial(-700_000.0), None);
        assert_eq!(from_serial(f64::NAN), None);
    }

    #[test]
    fn hire_date_accepts_native_and_serial_values() {
        assert_eq!(hire_date(&Data::Float(44927.0)), ymd(2023, 1, 1));
        assert_eq!(hire_date(&Data::Int(44927)), ymd(2023, 1, 1));
        assert_eq!(hire_date(&Data::String(" 44927 ".into())), ymd(2023, 1, 1));
        assert_eq!(
            hire_date(&Data::DateTimeIso("2021-06-30T08:15:00".into())),
            ymd(2021, 6, 30)
        );
    }

    #[test]
    fn unreadable_hire_date_yields_sentinel() {
        let sentinel = ymd(1, 1, 1);
        assert_eq!(hire_date_sentinel(), sentinel);
        assert_eq!(hire_date(&Data::Empty), sentinel);
        assert_eq!(hire_date(&Data::Bool(true)), sentinel);
        assert_eq!(hire_date(&Data::String("last spring".into())), sentinel);
        assert_eq!(hire_date(&Data::String("2021-06-30".into())), sentinel);
        assert_eq!(hire_date(&Data::String("2021-06-30T08:15:00".into())), sentinel);
        assert_eq!(hire_date(&Data::Float(1.0e9)), sentinel);
    }

    #[test]
    fn currency_text_strips_label_and_symbol() {
        assert_eq!(parse_currency("$1,234.56"), Some(123_456));
        assert_eq!(parse_currency("LKR 1234.56"), Some(123_456));
        assert_eq!(parse_currency("  LKR1,000  "), Some(100_000));
        assert_eq!(parse_currency(".5"), Some(50));
        assert_eq!(parse_currency("7."), Some(700));
    }

    #[test]
    fn currency_text_signs_and_rounding() {
        assert_eq!(parse_currency("-$25.10"), Some(-2_510));
        assert_eq!(parse_currency("($25.10)"), Some(-2_510));
        assert_eq!(parse_currency("25.10-"), Some(-2_510));
        assert_eq!(parse_currency("10.005"), Some(1_001));
        assert_eq!(parse_currency("10.0049"), Some(1_000));
    }

    #[test]
    fn malformed_currency_text_fails() {
        for raw in ["", "$", "abc", "1.2.3", ",100", "12a", "(-5)", "€10", "1 000"] {
            assert_eq!(parse_currency(raw), None, "{raw:?}");
        }
    }

    #[test]
    fn salary_uses_native_numbers_directly() {
        assert_eq!(salary_cents(&Data::Float(1234.56)), 123_456);
        assert_eq!(salary_cents(&Data::Int(900)), 90_000);
        assert_eq!(salary_cents(&Data::String("$1,234.56".into())), 123_456);
    }

    #[test]
    fn unreadable_salary_yields_zero() {
        assert_eq!(salary_cents(&Data::Empty), 0);
        assert_eq!(salary_cents(&Data::Bool(false)), 0);
        assert_eq!(salary_cents(&Data::String("negotiable".into())), 0);
        assert_eq!(salary_cents(&Data::Float(f64::INFINITY)), 0);
    }
}
