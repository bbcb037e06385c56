//! Where-clause evaluation for JSON records.
//!
//! A where-clause is a JSON tree of field checks combined with `_and`, `_or`
//! and `_not`. Evaluating it against a record yields a verdict plus one
//! message per failed check, which makes it usable both as a record filter
//! and as a validator.
//!
//! # Supported Operators
//!
//! | Token | Satisfied when |
//! |---|---|
//! | `eq` / `neq` | field equals / differs from the operand |
//! | `lt` `lte` `gt` `gte` | ordering holds (numbers, strings, booleans) |
//! | `in` / `nin` | operand array contains / lacks the field |
//! | `is_null` / `null` / `not_null` | field is / is not null |
//! | `like` / `ilike` | operand regex matches the field (case-insensitive for `ilike`) |
//! | `contains` | field string contains the operand, or field array holds it |
//! | `starts_with` / `ends_with` | field string starts / ends with the operand |
//!
//! Tokens may also be written with a leading underscore (`_eq`).
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use where_filter_rs::evaluate_where;
//!
//! let filter = json!({
//!     "_or": [
//!         { "field1": { "_eq": { "value": 10 } } },
//!         { "field2": { "_gt": { "value": 21, "message": "field2 too small" } } }
//!     ]
//! });
//!
//! let result = evaluate_where(&filter, &json!({ "field1": 20, "field2": 22 })).unwrap();
//! assert!(result.all_passed);
//! // The failing branch still reports its message.
//! assert_eq!(result.messages.len(), 1);
//! assert_eq!(result.messages[0].field, "field1");
//! ```

mod ast;
mod config;
mod error;
mod evaluator;
mod message;
mod operator;
mod parser;

pub use ast::{Condition, FieldClause, FilterNode};
pub use config::{EvaluatorConfig, DEFAULT_MAX_DEPTH};
pub use error::{FilterError, FilterResult, OperandError};
pub use evaluator::FilterEvaluator;
pub use message::{default_text, EvaluationResult, Message};
pub use operator::Operator;
pub use parser::FilterParser;
pub use record_path_rs::FieldPath;

use serde_json::Value;

/// Evaluates a filter tree against `data` with the default configuration.
pub fn evaluate(filter: &FilterNode, data: &Value) -> FilterResult<EvaluationResult> {
    FilterEvaluator::new(filter).evaluate(data)
}

/// Builds a filter from its JSON form and evaluates it against `data`.
///
/// # Errors
///
/// Fails with the construction errors of [`FilterParser::parse`] or the
/// evaluation errors of [`FilterEvaluator::evaluate`].
pub fn evaluate_where(filter: &Value, data: &Value) -> FilterResult<EvaluationResult> {
    evaluate_where_with(&EvaluatorConfig::default(), filter, data)
}

/// As [`evaluate_where`], with an explicit configuration.
pub fn evaluate_where_with(
    config: &EvaluatorConfig,
    filter: &Value,
    data: &Value,
) -> FilterResult<EvaluationResult> {
    let node = FilterParser::with_config(config).parse_value(filter)?;
    FilterEvaluator::new(&node)
        .with_config(config.clone())
        .evaluate(data)
}

#[cfg(test)]
mod tests;
