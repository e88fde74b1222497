//! The coercion table of the value model: `to_number` / `to_text` /
//! `to_logical`, pure functions of `(value, culture)`. Failure is always an
//! `ErrorKind`, never a silent default; errors pass through unchanged.

use crate::locale::Culture;
use crate::value::{ErrorKind, Scalar};

pub fn to_number(value: &Scalar, culture: &Culture) -> Result<f64, ErrorKind> {
    match value {
        Scalar::Error(e) => Err(*e),
        Scalar::Number(n) => Ok(*n),
        Scalar::Logical(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Scalar::Blank => Ok(0.0),
        Scalar::Text(s) => parse_number_text(s, culture).ok_or(ErrorKind::Value),
    }
}

pub fn to_text(value: &Scalar, culture: &Culture) -> Result<String, ErrorKind> {
    match value {
        Scalar::Error(e) => Err(*e),
        Scalar::Text(s) => Ok(s.clone()),
        Scalar::Number(n) => Ok(format_number(*n, culture)),
        Scalar::Logical(b) => Ok(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Scalar::Blank => Ok(String::new()),
    }
}

pub fn to_logical(value: &Scalar, _culture: &Culture) -> Result<bool, ErrorKind> {
    match value {
        Scalar::Error(e) => Err(*e),
        Scalar::Logical(b) => Ok(*b),
        Scalar::Number(n) => Ok(*n != 0.0),
        Scalar::Blank => Ok(false),
        Scalar::Text(s) => {
            let t = s.trim();
            if t.eq_ignore_ascii_case("TRUE") {
                Ok(true)
            } else if t.eq_ignore_ascii_case("FALSE") {
                Ok(false)
            } else {
                Err(ErrorKind::Value)
            }
        }
    }
}

/// "General"-format rendering of a number under a culture's decimal
/// separator. Integers print without a fraction part.
pub fn format_number(n: f64, culture: &Culture) -> String {
    let mut s = if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    };
    if culture.decimal_sep != '.' {
        s = s.replace('.', culture.decimal_sep.encode_utf8(&mut [0u8; 4]));
    }
    s
}

/// Locale-aware numeric text parse. Accepts an optional currency symbol,
/// accounting parentheses, percent suffixes (each dividing by 100), grouped
/// thousands, scientific notation, and mixed fractions like `2 1/2`.
/// Returns `None` when the text is not a number; the caller decides which
/// error that is.
pub fn parse_number_text(text: &str, culture: &Culture) -> Option<f64> {
    let mut s = text.trim();
    if s.is_empty() {
        return None;
    }

    let mut percent_scale = 1.0f64;
    if let Some(rest) = s.strip_prefix('%') {
        percent_scale /= 100.0;
        s = rest.trim_start();
    }
    if let Some(rest) = s.strip_prefix(culture.currency) {
        s = rest.trim_start();
    }

    let mut negative = false;
    if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        negative = true;
        s = inner.trim();
    }

    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest.trim_start();
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest.trim_start();
    }
    if let Some(rest) = s.strip_prefix(culture.currency) {
        s = rest.trim_start();
    }

    while let Some(rest) = s.strip_suffix('%') {
        percent_scale /= 100.0;
        s = rest.trim_end();
    }
    if let Some(rest) = s.strip_suffix(culture.currency) {
        s = rest.trim_end();
    }
    if s.is_empty() {
        return None;
    }

    let magnitude = if let Some(frac) = parse_mixed_fraction(s, culture) {
        frac
    } else {
        parse_plain_number(s, culture)?
    };
    if !magnitude.is_finite() {
        return None;
    }

    let signed = if negative { -magnitude } else { magnitude };
    Some(signed * percent_scale)
}

/// `int num/den` with a mandatory whole part, e.g. `2 1/2`. A bare `1/2` is
/// not a number here (numeric contexts treat it as a date-shaped string).
fn parse_mixed_fraction(s: &str, culture: &Culture) -> Option<f64> {
    let (whole, frac) = s.split_once(char::is_whitespace)?;
    let frac = frac.trim_start();
    let (num, den) = frac.split_once('/')?;
    if !is_digits(num) || !is_digits(den) {
        return None;
    }
    let whole = parse_plain_number(whole, culture)?;
    if whole != whole.trunc() || whole < 0.0 {
        return None;
    }
    let num: f64 = num.parse().ok()?;
    let den: f64 = den.parse().ok()?;
    if den == 0.0 {
        return None;
    }
    Some(whole + num / den)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_plain_number(s: &str, culture: &Culture) -> Option<f64> {
    // Group separators may appear only in the integer part, and every group
    // after the first must have exactly three digits. "1,23" stays text, and
    // in dot-grouping cultures "1.5" stays date-shaped.
    let chars: Vec<char> = s.chars().collect();
    let int_end = chars
        .iter()
        .position(|&c| c == culture.decimal_sep || c == 'e' || c == 'E')
        .unwrap_or(chars.len());
    let mut cleaned = String::with_capacity(s.len());
    if chars[..int_end].contains(&culture.group_sep) {
        let int_part: String = chars[..int_end].iter().collect();
        let mut groups = int_part.split(culture.group_sep);
        let first = groups.next()?;
        if !is_digits(first) || first.len() > 3 {
            return None;
        }
        cleaned.push_str(first);
        for group in groups {
            if group.len() != 3 || !is_digits(group) {
                return None;
            }
            cleaned.push_str(group);
        }
    } else {
        cleaned.extend(&chars[..int_end]);
    }
    for &c in &chars[int_end..] {
        if c == culture.group_sep {
            return None;
        }
        if c == culture.decimal_sep {
            cleaned.push('.');
        } else {
            cleaned.push(c);
        }
    }

    // Only digit/point/exponent characters may remain; this keeps Rust's
    // float parser from accepting "inf", "NaN", or hex forms.
    let bytes = cleaned.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'0'..=b'9' | b'.' => {}
            b'e' | b'E' => {
                if i == 0 {
                    return None;
                }
            }
            b'+' | b'-' => {
                let after_exp = i > 0 && matches!(bytes[i - 1], b'e' | b'E');
                if !after_exp {
                    return None;
                }
            }
            _ => return None,
        }
    }

    cleaned.parse::<f64>().ok()
}
