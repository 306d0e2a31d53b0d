// Cell-to-number parsing and console number formatting.
use crate::types::CellValue;
use num_format::{Locale, ToFormattedString};

/// Lenient number parse for amount cells.
///
/// - Trims whitespace and drops `,` thousands separators.
/// - Reads the longest leading decimal literal and ignores the rest, so
///   `"100 PHP"` is 100 and `"1e3"` is 1000.
/// - Returns `None` when there is no leading number, or for `NaN`/`inf`.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let cleaned = s?.trim().replace(',', "");
    let bytes = cleaned.as_bytes();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = count_digits(&bytes[exp..]);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }
    cleaned[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Monetary amount from a cell; anything unparsable counts as zero.
pub fn amount_from_cell(cell: Option<&CellValue>) -> f64 {
    match cell {
        Some(CellValue::Number(n)) if n.is_finite() => *n,
        Some(CellValue::Text(s)) => parse_f64_safe(Some(s)).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Leading-integer parse: optional sign followed by digits, anything after
/// the digits ignored (`"03"` -> 3, `"2024abc"` -> 2024, `"x1"` -> None).
pub fn parse_int_prefix(s: &str) -> Option<i32> {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i32>().ok().map(|v| sign * v)
}

/// `part / whole` as a percentage; zero when `whole` is zero.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64) * 100.0
}

/// Fixed decimals with `en` thousands separators, e.g. `1,234,567.89`.
pub fn format_number(n: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, n.abs());
    let (whole, frac) = match fixed.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (fixed.as_str(), None),
    };
    let grouped = whole.parse::<u64>().unwrap_or(0).to_formatted_string(&Locale::en);
    let body = match frac {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    };
    // A value that rounds to zero prints without a sign.
    let rounds_to_zero = fixed.bytes().all(|c| c == b'0' || c == b'.');
    if n.is_sign_negative() && !rounds_to_zero {
        format!("-{body}")
    } else {
        body
    }
}

/// Peso amount with two decimals, e.g. `₱1,234.50`.
pub fn format_peso(n: f64) -> String {
    let s = format_number(n, 2);
    match s.strip_prefix('-') {
        Some(abs) => format!("-₱{}", abs),
        None => format!("₱{}", s),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}
