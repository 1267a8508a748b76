//! Predicates on property values.

use std::cmp::Ordering;
use std::fmt;

use dialect_types::{coerce, common_type, Value};
use regex::Regex;

/// A restriction on the legal values of a property. `null` satisfies every
/// constraint.
#[derive(Clone, Debug)]
pub enum Constraint {
    /// Value must equal one of the listed values.
    Choice(Vec<Value>),
    /// Text must match the whole pattern.
    Pattern(Regex),
    /// Inclusive bounds under the common type of value and bound.
    Range { min: Option<Value>, max: Option<Value> },
    /// Inclusive bounds on the character count of text.
    Length { min: Option<usize>, max: Option<usize> },
}

impl Constraint {
    /// Compile a pattern that must match the entire text.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(&format!("^(?:{pattern})$")).map(Constraint::Pattern)
    }

    /// `Ok` if `value` satisfies the constraint, otherwise the reason.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        if value.is_null() {
            return Ok(());
        }
        match self {
            Constraint::Choice(choices) => {
                if choices.iter().any(|c| compare(value, c) == Some(Ordering::Equal)) {
                    Ok(())
                } else {
                    let listed: Vec<String> = choices.iter().map(Value::to_literal).collect();
                    Err(format!("{value} is not one of {}", listed.join(", ")))
                }
            }
            Constraint::Pattern(regex) => {
                let text = value.key_string();
                if regex.is_match(&text) {
                    Ok(())
                } else {
                    Err(format!("{value} does not match the pattern {}", display_pattern(regex)))
                }
            }
            Constraint::Range { min, max } => {
                if let Some(min) = min {
                    match compare(value, min) {
                        Some(Ordering::Less) => return Err(format!("{value} is less than {min}")),
                        None => return Err(format!("{value} cannot be compared with {min}")),
                        _ => {}
                    }
                }
                if let Some(max) = max {
                    match compare(value, max) {
                        Some(Ordering::Greater) => {
                            return Err(format!("{value} is greater than {max}"))
                        }
                        None => return Err(format!("{value} cannot be compared with {max}")),
                        _ => {}
                    }
                }
                Ok(())
            }
            Constraint::Length { min, max } => {
                let Some(text) = value.as_str() else {
                    return Err(format!("{} has no length", value.kind()));
                };
                let length = text.chars().count();
                match (min, max) {
                    (Some(min), _) if length < *min => {
                        Err(format!("length {length} is shorter than {min}"))
                    }
                    (_, Some(max)) if length > *max => {
                        Err(format!("length {length} is longer than {max}"))
                    }
                    _ => Ok(()),
                }
            }
        }
    }
}

/// Order two values after promoting both to their common kind.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    let common = common_type(left.kind(), right.kind()).ok()?;
    let left = coerce(left.clone(), common).ok()?;
    let right = coerce(right.clone(), common).ok()?;
    left.partial_cmp(&right)
}

/// The pattern as written, without the anchoring added by
/// [`Constraint::pattern`].
fn display_pattern(regex: &Regex) -> &str {
    let source = regex.as_str();
    source
        .strip_prefix("^(?:")
        .and_then(|s| s.strip_suffix(")$"))
        .unwrap_or(source)
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |b: &Option<Value>| b.as_ref().map_or_else(|| "*".to_string(), Value::to_literal);
        match self {
            Constraint::Choice(choices) => {
                let listed: Vec<String> = choices.iter().map(Value::to_literal).collect();
                write!(f, "choice({})", listed.join(", "))
            }
            Constraint::Pattern(regex) => write!(f, "pattern({})", display_pattern(regex)),
            Constraint::Range { min, max } => write!(f, "range({}..{})", bound(min), bound(max)),
            Constraint::Length { min, max } => {
                let min = min.map_or_else(|| "0".to_string(), |n| n.to_string());
                let max = max.map_or_else(|| "*".to_string(), |n| n.to_string());
                write!(f, "length({min}..{max})")
            }
        }
    }
}
