//! Builtin functions and constants.
//!
//! Every builtin is null-propagating: a `null` argument yields `null`
//! without running the body.

use std::cmp::Ordering;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{Datelike, Local, NaiveDate};
use dialect_types::{parse, ScalarKind, Value};
use num_traits::{Signed, ToPrimitive};
use regex::Regex;

use crate::library::{Function, FunctionRegistry};

use ScalarKind::{Any, Boolean, Date, DateTime, Decimal, Integer, Precision, Text};

type Body = fn(&[Value]) -> Result<Value, String>;

/// Wrap `body` so that any `null` argument short-cuts to `null`.
fn strict(name: &str, params: &[ScalarKind], returns: ScalarKind, body: Body) -> Function {
    Function::new(name, params, returns, move |args| {
        if args.iter().any(Value::is_null) {
            Ok(Value::Null)
        } else {
            body(args)
        }
    })
}

fn arg(args: &[Value], index: usize) -> Result<&Value, String> {
    args.get(index)
        .ok_or_else(|| format!("missing argument {}", index + 1))
}

fn text_arg(args: &[Value], index: usize) -> Result<&str, String> {
    let value = arg(args, index)?;
    value
        .as_str()
        .ok_or_else(|| format!("expected text, found {}", value.kind()))
}

#[cold]
fn unexpected(value: &Value) -> String {
    format!("unexpected {} argument", value.kind())
}

/// Register every builtin into `registry`.
pub(crate) fn register(registry: &mut FunctionRegistry) {
    let functions = [
        // Numeric
        strict("abs", &[Integer], Integer, builtin_abs),
        strict("abs", &[Decimal], Decimal, builtin_abs),
        strict("abs", &[Precision], Precision, builtin_abs),
        strict("min", &[Integer, Integer], Integer, builtin_min),
        strict("min", &[Decimal, Decimal], Decimal, builtin_min),
        strict("min", &[Precision, Precision], Precision, builtin_min),
        strict("min", &[Text, Text], Text, builtin_min),
        strict("max", &[Integer, Integer], Integer, builtin_max),
        strict("max", &[Decimal, Decimal], Decimal, builtin_max),
        strict("max", &[Precision, Precision], Precision, builtin_max),
        strict("max", &[Text, Text], Text, builtin_max),
        // Text
        strict("len", &[Text], Integer, builtin_len),
        strict("upper", &[Text], Text, |args| {
            Ok(Value::text(text_arg(args, 0)?.to_uppercase()))
        }),
        strict("lower", &[Text], Text, |args| {
            Ok(Value::text(text_arg(args, 0)?.to_lowercase()))
        }),
        strict("trim", &[Text], Text, |args| {
            Ok(Value::text(text_arg(args, 0)?.trim()))
        }),
        strict("concat", &[Text], Text, builtin_concat).variadic(),
        strict("matches", &[Text, Text], Boolean, builtin_matches),
        // Conversions
        strict("int", &[Integer], Integer, builtin_int),
        strict("int", &[Decimal], Integer, builtin_int),
        strict("int", &[Precision], Integer, builtin_int),
        strict("int", &[Text], Integer, builtin_int),
        strict("decimal", &[Decimal], Decimal, builtin_decimal),
        strict("decimal", &[Precision], Decimal, builtin_decimal),
        strict("decimal", &[Text], Decimal, builtin_decimal),
        strict("precision", &[Precision], Precision, builtin_precision),
        strict("precision", &[Text], Precision, builtin_precision),
        strict("text", &[Any], Text, |args| Ok(Value::text(arg(args, 0)?.key_string()))),
        // Calendar
        strict("year", &[Date], Integer, builtin_year),
        strict("year", &[DateTime], Integer, builtin_year),
        strict("month", &[Date], Integer, builtin_month),
        strict("month", &[DateTime], Integer, builtin_month),
        strict("day", &[Date], Integer, builtin_day),
        strict("day", &[DateTime], Integer, builtin_day),
        Function::new("today", &[], Date, |_| {
            Ok(Value::Date(Local::now().date_naive()))
        })
        .dynamic(),
        Function::new("now", &[], DateTime, |_| {
            Ok(Value::DateTime(Local::now().naive_local()))
        })
        .dynamic(),
    ];

    for function in functions {
        if let Err(err) = registry.register(function) {
            tracing::warn!(%err, "builtin registered twice");
        }
    }
    for (name, value) in [
        ("pi", Value::Decimal(std::f64::consts::PI)),
        ("e", Value::Decimal(std::f64::consts::E)),
    ] {
        if let Err(err) = registry.define_constant(name, value) {
            tracing::warn!(%err, "builtin constant defined twice");
        }
    }
}

fn builtin_abs(args: &[Value]) -> Result<Value, String> {
    match arg(args, 0)? {
        Value::Integer(n) => n
            .checked_abs()
            .map(Value::Integer)
            .ok_or_else(|| format!("abs({n}) overflows")),
        Value::Decimal(d) => Ok(Value::Decimal(d.abs())),
        Value::Precision(p) => Ok(Value::Precision(p.abs())),
        other => Err(unexpected(other)),
    }
}

fn pick(args: &[Value], keep: Ordering) -> Result<Value, String> {
    let a = arg(args, 0)?;
    let b = arg(args, 1)?;
    match a.partial_cmp(b) {
        Some(ordering) if ordering == keep || ordering == Ordering::Equal => Ok(a.clone()),
        Some(_) => Ok(b.clone()),
        None => Err(format!("cannot order {} and {}", a.kind(), b.kind())),
    }
}

fn builtin_min(args: &[Value]) -> Result<Value, String> {
    pick(args, Ordering::Less)
}

fn builtin_max(args: &[Value]) -> Result<Value, String> {
    pick(args, Ordering::Greater)
}

fn builtin_len(args: &[Value]) -> Result<Value, String> {
    let count = text_arg(args, 0)?.chars().count();
    i64::try_from(count)
        .map(Value::Integer)
        .map_err(|_| "text too long".to_string())
}

fn builtin_concat(args: &[Value]) -> Result<Value, String> {
    let mut out = String::new();
    for i in 0..args.len() {
        out.push_str(text_arg(args, i)?);
    }
    Ok(Value::Text(out))
}

fn builtin_matches(args: &[Value]) -> Result<Value, String> {
    let subject = text_arg(args, 0)?;
    let pattern = text_arg(args, 1)?;
    let regex = Regex::new(pattern).map_err(|err| format!("invalid pattern: {err}"))?;
    Ok(Value::Boolean(regex.is_match(subject)))
}

/// Truncating conversion to integer.
fn builtin_int(args: &[Value]) -> Result<Value, String> {
    let value = arg(args, 0)?;
    let out_of_range = || format!("{value} out of range for integer");
    match value {
        Value::Integer(n) => Ok(Value::Integer(*n)),
        Value::Decimal(d) => {
            // -2^63 <= trunc(d) < 2^63
            let truncated = d.trunc();
            let bound = 2.0_f64.powi(63);
            if truncated.is_nan() || truncated >= bound || truncated < -bound {
                return Err(out_of_range());
            }
            truncated.to_i64().map(Value::Integer).ok_or_else(out_of_range)
        }
        Value::Precision(p) => p
            .with_scale(0)
            .to_i64()
            .map(Value::Integer)
            .ok_or_else(out_of_range),
        Value::Text(s) => parse(Integer, s.trim()).map_err(|err| err.to_string()),
        other => Err(unexpected(other)),
    }
}

fn builtin_decimal(args: &[Value]) -> Result<Value, String> {
    match arg(args, 0)? {
        Value::Decimal(d) => Ok(Value::Decimal(*d)),
        Value::Precision(p) => p
            .to_f64()
            .filter(|d| d.is_finite())
            .map(Value::Decimal)
            .ok_or_else(|| format!("{p} out of range for decimal")),
        Value::Text(s) => parse(Decimal, s.trim()).map_err(|err| err.to_string()),
        other => Err(unexpected(other)),
    }
}

fn builtin_precision(args: &[Value]) -> Result<Value, String> {
    match arg(args, 0)? {
        Value::Precision(p) => Ok(Value::Precision(p.clone())),
        Value::Text(s) => BigDecimal::from_str(s.trim())
            .map(Value::Precision)
            .map_err(|err| format!("cannot parse `{s}` as precision: {err}")),
        other => Err(unexpected(other)),
    }
}

fn calendar(args: &[Value], field: fn(&NaiveDate) -> i64) -> Result<Value, String> {
    match arg(args, 0)? {
        Value::Date(d) => Ok(Value::Integer(field(d))),
        Value::DateTime(dt) => Ok(Value::Integer(field(&dt.date()))),
        other => Err(unexpected(other)),
    }
}

fn builtin_year(args: &[Value]) -> Result<Value, String> {
    calendar(args, |d| i64::from(d.year()))
}

fn builtin_month(args: &[Value]) -> Result<Value, String> {
    calendar(args, |d| i64::from(d.month()))
}

fn builtin_day(args: &[Value]) -> Result<Value, String> {
    calendar(args, |d| i64::from(d.day()))
}
