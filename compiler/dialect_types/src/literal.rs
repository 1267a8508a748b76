//! Textual literal forms.
//!
//! `parse` is driven by the kind the tokenizer (or a schema) assigns to a
//! literal; `infer` picks a kind for untyped text.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::value::{DATETIME_FORMAT, DATE_FORMAT, TIME_FORMAT};
use crate::{Cardinality, ParseError, ParseProblem, ScalarKind, Value};

const TIME_FORMATS: [&str; 2] = [TIME_FORMAT, "%H:%M"];
const DATETIME_FORMATS: [&str; 2] = [DATETIME_FORMAT, "%Y-%m-%dT%H:%M"];

/// Parse `text` as a literal of `kind`.
///
/// `any` infers the kind from the text (see [`infer`]).
pub fn parse(kind: ScalarKind, text: &str) -> Result<Value, ParseError> {
    let error = |problem| ParseError::new(kind, text, problem);
    if text.is_empty() && kind != ScalarKind::Text {
        return Err(error(ParseProblem::Empty));
    }
    match kind {
        ScalarKind::Integer => parse_integer(text).map(Value::Integer).map_err(error),
        ScalarKind::Decimal => parse_decimal(text).map(Value::Decimal).map_err(error),
        ScalarKind::Precision => parse_precision(text).map(Value::Precision).map_err(error),
        ScalarKind::Boolean => match text {
            "true" => Ok(Value::Boolean(true)),
            "false" => Ok(Value::Boolean(false)),
            _ => Err(error(ParseProblem::Malformed("`true` or `false`"))),
        },
        ScalarKind::Text => parse_text(text).map(Value::Text).map_err(error),
        ScalarKind::Date => NaiveDate::parse_from_str(strip_at(text), DATE_FORMAT)
            .map(Value::Date)
            .map_err(|_| error(ParseProblem::Malformed("@YYYY-MM-DD"))),
        ScalarKind::Time => TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(strip_at(text), fmt).ok())
            .map(Value::Time)
            .ok_or_else(|| error(ParseProblem::Malformed("@HH:MM[:SS[.f]]"))),
        ScalarKind::DateTime => DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(strip_at(text), fmt).ok())
            .map(Value::DateTime)
            .ok_or_else(|| error(ParseProblem::Malformed("@YYYY-MM-DDTHH:MM[:SS[.f]]"))),
        ScalarKind::Identifier => {
            if is_identifier(text) {
                Ok(Value::Identifier(text.to_string()))
            } else {
                Err(error(ParseProblem::Malformed(
                    "a letter or `_` followed by letters, digits, `_` or `-`",
                )))
            }
        }
        ScalarKind::Path => Ok(Value::Path(text.to_string())),
        ScalarKind::Cardinality => Cardinality::from_str(text).map(Value::Cardinality),
        ScalarKind::Null => {
            if text == "null" {
                Ok(Value::Null)
            } else {
                Err(error(ParseProblem::Malformed("`null`")))
            }
        }
        ScalarKind::Any => Ok(infer(text)),
    }
}

/// Pick the narrowest kind whose literal form matches `text`.
///
/// Order: null, boolean, integer, decimal, `@`-temporal, quoted text,
/// identifier; anything else is kept as verbatim text.
pub fn infer(text: &str) -> Value {
    const CANDIDATES: [ScalarKind; 7] = [
        ScalarKind::Null,
        ScalarKind::Boolean,
        ScalarKind::Integer,
        ScalarKind::Decimal,
        ScalarKind::Date,
        ScalarKind::DateTime,
        ScalarKind::Time,
    ];
    if let Some(value) = CANDIDATES.iter().find_map(|kind| parse(*kind, text).ok()) {
        return value;
    }
    if is_quoted(text) {
        if let Ok(s) = parse_text(text) {
            return Value::Text(s);
        }
    }
    if is_identifier(text) {
        return Value::Identifier(text.to_string());
    }
    Value::Text(text.to_string())
}

fn strip_at(text: &str) -> &str {
    text.strip_prefix('@').unwrap_or(text)
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn is_quoted(text: &str) -> bool {
    text.starts_with('"') || text.starts_with('\'')
}

/// Decimal, `0x` hex or `0b` binary, optional sign, `_` separators.
fn parse_integer(text: &str) -> Result<i64, ParseProblem> {
    const EXPECTED: &str = "an integer (decimal, 0x hex or 0b binary)";
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        (16, hex)
    } else if let Some(bin) = unsigned
        .strip_prefix("0b")
        .or_else(|| unsigned.strip_prefix("0B"))
    {
        (2, bin)
    } else {
        (10, unsigned)
    };

    let digits: String = digits.chars().filter(|c| *c != '_').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(ParseProblem::Malformed(EXPECTED));
    }
    let magnitude = u64::from_str_radix(&digits, radix).map_err(|_| ParseProblem::OutOfRange)?;
    if negative {
        0i64.checked_sub_unsigned(magnitude)
            .ok_or(ParseProblem::OutOfRange)
    } else {
        i64::try_from(magnitude).map_err(|_| ParseProblem::OutOfRange)
    }
}

fn is_float_syntax(digits: &str) -> bool {
    let body = digits.strip_prefix(['-', '+']).unwrap_or(digits);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(at) => (&body[..at], Some(&body[at + 1..])),
        None => (body, None),
    };
    let mantissa_ok = {
        let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        (!int.is_empty() || !frac.is_empty())
            && int.bytes().all(|b| b.is_ascii_digit())
            && frac.bytes().all(|b| b.is_ascii_digit())
    };
    let exponent_ok = exponent.map_or(true, |e| {
        let e = e.strip_prefix(['-', '+']).unwrap_or(e);
        !e.is_empty() && e.bytes().all(|b| b.is_ascii_digit())
    });
    mantissa_ok && exponent_ok
}

fn parse_decimal(text: &str) -> Result<f64, ParseProblem> {
    const EXPECTED: &str = "a decimal number such as 1.5 or 2e-3";
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    if !is_float_syntax(&digits) {
        return Err(ParseProblem::Malformed(EXPECTED));
    }
    let value: f64 = digits
        .parse()
        .map_err(|_| ParseProblem::Malformed(EXPECTED))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParseProblem::OutOfRange)
    }
}

fn parse_precision(text: &str) -> Result<BigDecimal, ParseProblem> {
    const EXPECTED: &str = "a decimal number such as 12.345";
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    if !is_float_syntax(&digits) {
        return Err(ParseProblem::Malformed(EXPECTED));
    }
    BigDecimal::from_str(&digits).map_err(|_| ParseProblem::Malformed(EXPECTED))
}

/// Quoted text is unescaped; unquoted text is taken verbatim.
fn parse_text(text: &str) -> Result<String, ParseProblem> {
    let Some(quote) = text.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        return Ok(text.to_string());
    };
    let inner = &text[1..];
    let Some(body) = inner.strip_suffix(quote) else {
        return Err(ParseProblem::Unterminated);
    };

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == quote {
            return Err(ParseProblem::Unterminated);
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = chars.next().ok_or(ParseProblem::InvalidEscape("\\".to_string()))?;
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            '\\' | '"' | '\'' => out.push(escaped),
            'u' => out.push(parse_unicode_escape(&mut chars)?),
            other => return Err(ParseProblem::InvalidEscape(format!("\\{other}"))),
        }
    }
    Ok(out)
}

/// `\u{XXXX}` with the `\u` already consumed.
fn parse_unicode_escape(chars: &mut std::str::Chars<'_>) -> Result<char, ParseProblem> {
    let mut seen = String::from("\\u");
    if chars.next() != Some('{') {
        return Err(ParseProblem::InvalidEscape(seen));
    }
    seen.push('{');
    let mut hex = String::new();
    for c in chars.by_ref() {
        seen.push(c);
        if c == '}' {
            return u32::from_str_radix(&hex, 16)
                .ok()
                .filter(|_| !hex.is_empty() && hex.len() <= 6)
                .and_then(char::from_u32)
                .ok_or(ParseProblem::InvalidEscape(seen));
        }
        hex.push(c);
    }
    Err(ParseProblem::InvalidEscape(seen))
}

/// Quote `s` as a double-quoted text literal.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
