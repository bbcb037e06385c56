//! The closed set of comparison operators and their predicates.
//!
//! Every predicate answers "is the condition satisfied?". Deciding what a
//! failure means (a message, a negated verdict) is left to the evaluator.

use std::cmp::Ordering;
use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ast::Condition;
use crate::error::OperandError;

/// Prefix used by the underscore spelling of tokens (`_eq`, `_and`).
pub const SENTINEL_PREFIX: char = '_';

/// A comparison or matching operator applied to a resolved field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    // ==================== Equality ====================
    /// Field equals the operand.
    Eq,
    /// Field differs from the operand.
    Neq,

    // ==================== Ordering ====================
    /// Field is less than the operand.
    Lt,
    /// Field is less than or equal to the operand.
    Lte,
    /// Field is greater than the operand.
    Gt,
    /// Field is greater than or equal to the operand.
    Gte,

    // ==================== Membership ====================
    /// Operand array contains the field.
    In,
    /// Operand array does not contain the field.
    Nin,

    // ==================== Nullness ====================
    /// Field is null. The operand is ignored.
    IsNull,
    /// Alias of [`Operator::IsNull`], kept distinct so messages echo the token used.
    Null,
    /// Field is not null. The operand is ignored.
    NotNull,

    // ==================== String matching ====================
    /// Field matches the operand regex, case-sensitive.
    Like,
    /// Field matches the operand regex, case-insensitive.
    Ilike,
    /// Field string contains the operand substring, or field array contains the operand.
    Contains,
    /// Field string starts with the operand.
    StartsWith,
    /// Field string ends with the operand.
    EndsWith,
}

impl Operator {
    /// Every operator, in declaration order.
    pub const ALL: [Operator; 16] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Lt,
        Operator::Lte,
        Operator::Gt,
        Operator::Gte,
        Operator::In,
        Operator::Nin,
        Operator::IsNull,
        Operator::Null,
        Operator::NotNull,
        Operator::Like,
        Operator::Ilike,
        Operator::Contains,
        Operator::StartsWith,
        Operator::EndsWith,
    ];

    /// The bare token for this operator (`"eq"`, `"starts_with"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::In => "in",
            Operator::Nin => "nin",
            Operator::IsNull => "is_null",
            Operator::Null => "null",
            Operator::NotNull => "not_null",
            Operator::Like => "like",
            Operator::Ilike => "ilike",
            Operator::Contains => "contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
        }
    }

    /// Looks up an operator by token. Accepts both `eq` and `_eq`.
    pub fn from_token(token: &str) -> Option<Operator> {
        let bare = token.strip_prefix(SENTINEL_PREFIX).unwrap_or(token);
        Operator::ALL.into_iter().find(|op| op.as_str() == bare)
    }

    /// Returns true if `field` satisfies this operator against `condition`.
    ///
    /// A `null` field (which is also what a missing field resolves to by
    /// default) never satisfies an ordering or string operator; it is an
    /// ordinary failure rather than a type mismatch.
    pub fn is_satisfied(&self, field: &Value, condition: &Value) -> Result<bool, OperandError> {
        self.satisfied_with(field, condition, None)
    }

    /// Like [`Operator::is_satisfied`], reusing the pattern compiled when the
    /// condition was attached to its clause.
    pub(crate) fn is_satisfied_by(&self, field: &Value, condition: &Condition) -> Result<bool, OperandError> {
        self.satisfied_with(field, &condition.value, condition.pattern.as_ref())
    }

    /// Compiles the operand of a `like`/`ilike` check.
    ///
    /// Other operators, and non-string operands, give `Ok(None)`; a
    /// non-string pattern is reported as a type mismatch when evaluated.
    pub(crate) fn compile_pattern(&self, condition: &Value) -> Result<Option<Pattern>, OperandError> {
        let case_insensitive = match self {
            Operator::Like => false,
            Operator::Ilike => true,
            _ => return Ok(None),
        };
        match condition {
            Value::String(source) => Pattern::compile(source, case_insensitive).map(Some),
            _ => Ok(None),
        }
    }

    fn satisfied_with(&self, field: &Value, condition: &Value, pattern: Option<&Pattern>) -> Result<bool, OperandError> {
        match self {
            Operator::Eq => Ok(strict_eq(field, condition)),
            Operator::Neq => Ok(!strict_eq(field, condition)),

            Operator::Lt => Ok(ordering(field, condition)? == Some(Ordering::Less)),
            Operator::Lte => Ok(matches!(
                ordering(field, condition)?,
                Some(Ordering::Less | Ordering::Equal)
            )),
            Operator::Gt => Ok(ordering(field, condition)? == Some(Ordering::Greater)),
            Operator::Gte => Ok(matches!(
                ordering(field, condition)?,
                Some(Ordering::Greater | Ordering::Equal)
            )),

            Operator::In => Ok(member_of(field, condition)?),
            Operator::Nin => Ok(!member_of(field, condition)?),

            Operator::IsNull | Operator::Null => Ok(field.is_null()),
            Operator::NotNull => Ok(!field.is_null()),

            Operator::Like => regex_matches(field, condition, false, pattern),
            Operator::Ilike => regex_matches(field, condition, true, pattern),
            Operator::Contains => contains(field, condition),
            Operator::StartsWith => {
                text_test(field, condition, |haystack, needle| haystack.starts_with(needle))
            }
            Operator::EndsWith => {
                text_test(field, condition, |haystack, needle| haystack.ends_with(needle))
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Name of a JSON value's type, used in mismatch errors.
pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Strict equality: same JSON type and same value.
///
/// Numbers compare by value, so `10` equals `10.0`. Arrays and objects
/// compare element by element.
pub fn strict_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
                x == y
            } else {
                a.as_f64() == b.as_f64()
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| strict_eq(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| strict_eq(x, y)))
        }
        _ => left == right,
    }
}

/// Orders two scalars of the same type.
///
/// Returns `Ok(None)` for a null field, which satisfies no ordering.
fn ordering(field: &Value, condition: &Value) -> Result<Option<Ordering>, OperandError> {
    const ORDERABLE: &str = "number, string or boolean";

    match (field, condition) {
        (_, Value::Null | Value::Array(_) | Value::Object(_)) => Err(OperandError::TypeMismatch {
            expected: ORDERABLE,
            found: json_type(condition),
        }),
        (Value::Null, _) => Ok(None),
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
                Ok(Some(x.cmp(&y)))
            } else {
                Ok(a.as_f64().zip(b.as_f64()).and_then(|(x, y)| x.partial_cmp(&y)))
            }
        }
        (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
        (Value::Bool(a), Value::Bool(b)) => Ok(Some(a.cmp(b))),
        (Value::Array(_) | Value::Object(_), _) => Err(OperandError::TypeMismatch {
            expected: ORDERABLE,
            found: json_type(field),
        }),
        _ => Err(OperandError::TypeMismatch {
            expected: json_type(condition),
            found: json_type(field),
        }),
    }
}

/// Returns true if `list` (which must be an array) holds `field`.
fn member_of(field: &Value, list: &Value) -> Result<bool, OperandError> {
    match list {
        Value::Array(items) => Ok(items.iter().any(|item| strict_eq(field, item))),
        other => Err(OperandError::TypeMismatch {
            expected: "array",
            found: json_type(other),
        }),
    }
}

/// A `like`/`ilike` pattern compiled once and reused for every record.
#[derive(Debug, Clone)]
pub(crate) struct Pattern {
    regex: Regex,
    case_insensitive: bool,
}

impl Pattern {
    fn compile(source: &str, case_insensitive: bool) -> Result<Self, OperandError> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| OperandError::InvalidPattern {
                pattern: source.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            regex,
            case_insensitive,
        })
    }

    fn compiled_from(&self, source: &str, case_insensitive: bool) -> bool {
        self.case_insensitive == case_insensitive && self.regex.as_str() == source
    }
}

/// Regex match of the field's text against the condition pattern.
///
/// Numbers and booleans are matched by their textual form. `compiled` is
/// used only if it was built from this exact pattern, otherwise the pattern
/// is compiled here.
fn regex_matches(
    field: &Value,
    pattern: &Value,
    case_insensitive: bool,
    compiled: Option<&Pattern>,
) -> Result<bool, OperandError> {
    let Value::String(source) = pattern else {
        return Err(OperandError::TypeMismatch {
            expected: "string",
            found: json_type(pattern),
        });
    };

    let fresh;
    let regex = match compiled {
        Some(p) if p.compiled_from(source, case_insensitive) => &p.regex,
        _ => {
            fresh = Pattern::compile(source, case_insensitive)?;
            &fresh.regex
        }
    };

    match field {
        Value::Null => Ok(false),
        Value::String(s) => Ok(regex.is_match(s)),
        Value::Number(n) => Ok(regex.is_match(&n.to_string())),
        Value::Bool(b) => Ok(regex.is_match(&b.to_string())),
        other => Err(OperandError::TypeMismatch {
            expected: "string",
            found: json_type(other),
        }),
    }
}

/// Substring test for strings, element test for arrays.
fn contains(field: &Value, needle: &Value) -> Result<bool, OperandError> {
    match field {
        Value::Array(items) => Ok(items.iter().any(|item| strict_eq(item, needle))),
        _ => text_test(field, needle, |haystack, needle| haystack.contains(needle)),
    }
}

/// Applies a string predicate to a string field and a string operand.
fn text_test(
    field: &Value,
    needle: &Value,
    test: impl Fn(&str, &str) -> bool,
) -> Result<bool, OperandError> {
    let Value::String(needle) = needle else {
        return Err(OperandError::TypeMismatch {
            expected: "string",
            found: json_type(needle),
        });
    };

    match field {
        Value::Null => Ok(false),
        Value::String(haystack) => Ok(test(haystack, needle)),
        other => Err(OperandError::TypeMismatch {
            expected: "string",
            found: json_type(other),
        }),
    }
}
