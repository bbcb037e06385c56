//! Error types for filter construction and evaluation.

use thiserror::Error;

use crate::operator::Operator;

/// A specialized Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while building or evaluating a filter.
///
/// None of these is ever turned into a passing result: the first error aborts
/// the call and is returned to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// An operator token outside the supported set.
    #[error("unknown operator `{operator}` on field \"{field}\"")]
    UnknownOperator {
        /// The field the operator was declared on.
        field: String,
        /// The unrecognized token.
        operator: String,
    },

    /// An operand has a type the operator cannot work with.
    #[error(
        "type mismatch on field \"{field}\" with operator {operator}: expected {expected}, found {found}"
    )]
    TypeMismatch {
        /// The field being checked.
        field: String,
        /// The operator being applied.
        operator: Operator,
        /// What the operator needs.
        expected: String,
        /// The JSON type actually supplied.
        found: String,
    },

    /// A `like`/`ilike` pattern that is not a valid regular expression.
    #[error("invalid pattern `{pattern}` on field \"{field}\" with operator {operator}: {reason}")]
    InvalidPattern {
        /// The field being checked.
        field: String,
        /// The operator being applied.
        operator: Operator,
        /// The offending pattern.
        pattern: String,
        /// The regex compiler's explanation.
        reason: String,
    },

    /// The filter tree nests deeper than the configured limit.
    #[error("filter nesting exceeds maximum depth of {max_depth}")]
    FilterTooDeep {
        /// The configured limit.
        max_depth: usize,
    },

    /// The JSON filter does not have the shape of a filter node.
    #[error("malformed filter: {reason}")]
    MalformedFilter {
        /// What was wrong with the node.
        reason: String,
    },

    /// Evaluator configuration could not be read.
    #[error("config error: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },
}

impl FilterError {
    /// Creates an unknown operator error.
    pub fn unknown_operator(field: impl Into<String>, operator: impl Into<String>) -> Self {
        FilterError::UnknownOperator {
            field: field.into(),
            operator: operator.into(),
        }
    }

    /// Creates a malformed filter error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        FilterError::MalformedFilter {
            reason: reason.into(),
        }
    }

    /// Creates a config error.
    pub fn config(message: impl Into<String>) -> Self {
        FilterError::Config {
            message: message.into(),
        }
    }

    /// Returns true if the error comes from the filter definition rather than
    /// the record being evaluated.
    ///
    /// Type mismatches depend on the record's values, so they are the only
    /// data-dependent kind.
    pub fn is_filter_defect(&self) -> bool {
        !matches!(self, FilterError::TypeMismatch { .. })
    }
}

/// Failure of a single operator predicate, before field context is attached.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OperandError {
    /// Operand types the operator cannot handle.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// Uncompilable regular expression.
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl OperandError {
    /// Attaches the field and operator the predicate was evaluated for.
    pub fn at(self, field: &str, operator: Operator) -> FilterError {
        match self {
            OperandError::TypeMismatch { expected, found } => FilterError::TypeMismatch {
                field: field.to_string(),
                operator,
                expected: expected.to_string(),
                found: found.to_string(),
            },
            OperandError::InvalidPattern { pattern, reason } => FilterError::InvalidPattern {
                field: field.to_string(),
                operator,
                pattern,
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_operator_display() {
        let err = FilterError::unknown_operator("age", "_between");
        assert_eq!(
            err.to_string(),
            "unknown operator `_between` on field \"age\""
        );
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = OperandError::TypeMismatch {
            expected: "string",
            found: "number",
        }
        .at("name", Operator::Contains);
        assert_eq!(
            err.to_string(),
            "type mismatch on field \"name\" with operator contains: expected string, found number"
        );
    }

    #[test]
    fn test_invalid_pattern_carries_context() {
        let err = OperandError::InvalidPattern {
            pattern: "(".to_string(),
            reason: "unclosed group".to_string(),
        }
        .at("code", Operator::Like);
        match err {
            FilterError::InvalidPattern {
                field,
                operator,
                pattern,
                ..
            } => {
                assert_eq!(field, "code");
                assert_eq!(operator, Operator::Like);
                assert_eq!(pattern, "(");
            }
            other => panic!("Expected InvalidPattern, got {:?}", other),
        }
    }

    #[test]
    fn test_filter_too_deep_display() {
        let err = FilterError::FilterTooDeep { max_depth: 4 };
        assert_eq!(err.to_string(), "filter nesting exceeds maximum depth of 4");
    }

    #[test]
    fn test_is_filter_defect() {
        assert!(FilterError::unknown_operator("a", "b").is_filter_defect());
        assert!(FilterError::malformed("x").is_filter_defect());
        assert!(FilterError::FilterTooDeep { max_depth: 1 }.is_filter_defect());

        let mismatch = OperandError::TypeMismatch {
            expected: "array",
            found: "string",
        }
        .at("roles", Operator::In);
        assert!(!mismatch.is_filter_defect());
    }
}
