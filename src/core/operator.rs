//! Operator registry: maps (operator, column value, literal) to a boolean.
//!
//! Column values are coerced the way a dynamically typed UI would coerce them
//! (`String(x)` / `Number(x)`), so a type mismatch never fails, it just does
//! not match.
use fancy_regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use tracing::warn;

use crate::core::error::OperatorError;

/// Wire value of the transient preview ("ghost OR row") marker
pub const PREVIEW_MARKER: &str = "OR_HOVER";

/// The fixed, evaluable operator set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
pub enum OperatorKind {
    #[strum(serialize = "equals")]
    Equals,
    #[strum(serialize = "greaterThan")]
    GreaterThan,
    #[strum(serialize = "lessThan")]
    LessThan,
    #[strum(serialize = "contain")]
    Contain,
    #[strum(serialize = "notContain")]
    NotContain,
    #[strum(serialize = "regex")]
    Regex,
}

impl OperatorKind {
    /// Human readable label for the operator selector
    pub fn label(&self) -> &'static str {
        match self {
            OperatorKind::Equals => "Equals",
            OperatorKind::GreaterThan => "Greater than",
            OperatorKind::LessThan => "Less than",
            OperatorKind::Contain => "Contain",
            OperatorKind::NotContain => "Not Contain",
            OperatorKind::Regex => "Regex",
        }
    }
}

/// Label/value pair used to populate an operator selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorOption {
    pub label: &'static str,
    pub value: &'static str,
}

/// The fixed operator table, in selector order
pub fn operator_options() -> Vec<OperatorOption> {
    OperatorKind::iter()
        .map(|kind| OperatorOption {
            label: kind.label(),
            value: kind.into(),
        })
        .collect()
}

/// Operator slot of a condition.
///
/// Anything that is not a known operator or the preview marker is kept
/// verbatim as `Unknown`; the empty string means "unset".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Kind(OperatorKind),
    Preview,
    Unknown(String),
}

impl Operator {
    pub fn is_preview(&self) -> bool {
        matches!(self, Operator::Preview)
    }

    /// True when nothing has been chosen yet
    pub fn is_unset(&self) -> bool {
        matches!(self, Operator::Unknown(s) if s.is_empty())
    }

    pub fn kind(&self) -> Option<OperatorKind> {
        match self {
            Operator::Kind(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl Default for Operator {
    fn default() -> Self {
        Operator::Kind(OperatorKind::Equals)
    }
}

impl From<OperatorKind> for Operator {
    fn from(kind: OperatorKind) -> Self {
        Operator::Kind(kind)
    }
}

impl FromStr for Operator {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == PREVIEW_MARKER {
            return Ok(Operator::Preview);
        }
        Ok(match OperatorKind::from_str(s) {
            Ok(kind) => Operator::Kind(kind),
            Err(_) => Operator::Unknown(s.to_string()),
        })
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        match Operator::from_str(&s) {
            Ok(op) => op,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for Operator {
    fn from(s: &str) -> Self {
        Operator::from(s.to_string())
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Kind(kind) => write!(f, "{kind}"),
            Operator::Preview => write!(f, "{PREVIEW_MARKER}"),
            Operator::Unknown(raw) => write!(f, "{raw}"),
        }
    }
}

/// Evaluate one operator against a column value and a user-entered literal.
///
/// Unknown operators (and the preview marker) pass every row. The only
/// failure is a `regex` literal that does not compile.
pub fn evaluate(operator: &Operator, column: Option<&Value>, literal: &str) -> Result<bool, OperatorError> {
    match operator {
        Operator::Kind(OperatorKind::Regex) => {
            let re = compile_pattern(literal)?;
            Ok(pattern_matches(&re, &coerce_string(column)))
        }
        Operator::Kind(kind) => Ok(compare(*kind, column, literal)),
        Operator::Preview | Operator::Unknown(_) => Ok(true),
    }
}

/// Compile a `regex` literal.
///
/// Lookarounds and backreferences are accepted, as users write patterns in
/// the syntax their browser understands.
pub fn compile_pattern(pattern: &str) -> Result<Regex, OperatorError> {
    Regex::new(pattern).map_err(|source| OperatorError::RegexCompile {
        pattern: pattern.to_string(),
        source,
    })
}

/// Run a compiled pattern; hitting the backtrack limit counts as no match
pub fn pattern_matches(re: &Regex, text: &str) -> bool {
    match re.is_match(text) {
        Ok(matched) => matched,
        Err(e) => {
            warn!("pattern '{}' gave up on input: {}", re.as_str(), e);
            false
        }
    }
}

/// Infallible comparison for the non-pattern operators.
///
/// A `Regex` kind compiles its literal on the spot and treats a bad
/// pattern as a non-match.
pub fn compare(kind: OperatorKind, column: Option<&Value>, literal: &str) -> bool {
    match kind {
        OperatorKind::Equals => coerce_string(column) == literal,
        OperatorKind::GreaterThan => coerce_number(column) > parse_number(literal),
        OperatorKind::LessThan => coerce_number(column) < parse_number(literal),
        OperatorKind::Contain => coerce_string(column).contains(literal),
        OperatorKind::NotContain => !coerce_string(column).contains(literal),
        OperatorKind::Regex => compile_pattern(literal)
            .map(|re| pattern_matches(&re, &coerce_string(column)))
            .unwrap_or(false),
    }
}

/// String coercion of a column value (`String(x)` semantics)
pub fn coerce_string(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None => Cow::Borrowed("undefined"),
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        Some(other) => Cow::Owned(stringify(other)),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                n.to_string()
            } else {
                n.as_f64().map(format_number).unwrap_or_else(|| n.to_string())
            }
        }
        Value::String(s) => s.clone(),
        // Array elements join with commas; null entries render empty
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => stringify(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    // Shortest round-trip digits; the exponent picks the notation
    let scientific = format!("{n:e}");
    if let Some((mantissa, exponent)) = scientific.split_once('e') {
        if let Ok(exponent) = exponent.parse::<i32>() {
            if exponent >= 21 {
                return format!("{mantissa}e+{exponent}");
            }
            if exponent <= -7 {
                return format!("{mantissa}e{exponent}");
            }
        }
    }
    if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

/// Numeric coercion of a column value (`Number(x)` semantics)
pub fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => parse_number(s),
        Some(array @ Value::Array(_)) => parse_number(&stringify(array)),
        Some(Value::Object(_)) => f64::NAN,
    }
}

/// Textual-to-number parsing; anything unparseable is NaN
pub fn parse_number(text: &str) -> f64 {
    let s = text.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix)
                .map(|v| v as f64)
                .unwrap_or(f64::NAN);
        }
    }
    let well_formed = s.chars().any(|c| c.is_ascii_digit())
        && s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !well_formed {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}
