//! Filter evaluation against JSON records.
//!
//! This module provides the [`FilterEvaluator`] for evaluating filter trees
//! against records, collecting one [`Message`] per failed check.
//!
//! Evaluation never short-circuits: every child of `And`/`Or` and every check
//! of every leaf runs, so the result lists all failures in the tree. `Or`
//! and `Not` change the verdict, never the message list.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use where_filter_rs::{FilterEvaluator, FilterParser};
//!
//! let filter = FilterParser::parse(&json!({
//!     "age": { "gte": { "value": 30 }, "lte": { "value": 50 } },
//!     "name": { "ilike": { "value": "john" } }
//! }))
//! .unwrap();
//!
//! let evaluator = FilterEvaluator::new(&filter);
//! let result = evaluator.evaluate(&json!({ "age": 34, "name": "John Doe" })).unwrap();
//! assert!(result.all_passed);
//! assert!(result.messages.is_empty());
//! ```

use log::{debug, trace};
use serde_json::Value;

use crate::ast::{FieldClause, FilterNode};
use crate::config::EvaluatorConfig;
use crate::error::{FilterError, FilterResult};
use crate::message::{EvaluationResult, Message};

/// Evaluates a filter tree against records.
///
/// The evaluator borrows the tree and holds no per-record state, so one
/// evaluator can be shared across threads and records.
#[derive(Debug, Clone)]
pub struct FilterEvaluator<'a> {
    filter: &'a FilterNode,
    config: EvaluatorConfig,
}

impl<'a> FilterEvaluator<'a> {
    /// Creates an evaluator with the default configuration.
    pub fn new(filter: &'a FilterNode) -> Self {
        Self {
            filter,
            config: EvaluatorConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: EvaluatorConfig) -> Self {
        self.config = config;
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluates the filter against `data`.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::TypeMismatch` or `FilterError::InvalidPattern`
    /// when an operator cannot be applied to its operands, and
    /// `FilterError::FilterTooDeep` when the tree is deeper than the configured
    /// limit. A missing field is not an error.
    pub fn evaluate(&self, data: &Value) -> FilterResult<EvaluationResult> {
        // Nothing may walk the tree before the depth guard has seen it.
        debug!("evaluating filter (max depth {})", self.config.max_depth);
        let result = self.evaluate_node(self.filter, data, 1)?;
        debug!(
            "filter verdict: passed={} with {} failure message(s)",
            result.all_passed,
            result.messages.len()
        );
        Ok(result)
    }

    /// Returns true if `data` passes the filter.
    pub fn matches(&self, data: &Value) -> FilterResult<bool> {
        Ok(self.evaluate(data)?.all_passed)
    }

    /// Filters a slice of records, returning only those that pass.
    pub fn filter_records<'b>(&self, records: &'b [Value]) -> FilterResult<Vec<&'b Value>> {
        let mut passed = Vec::new();
        for record in records {
            if self.matches(record)? {
                passed.push(record);
            }
        }
        Ok(passed)
    }

    /// Evaluates a node sitting at `depth` in the tree.
    fn evaluate_node(&self, node: &FilterNode, data: &Value, depth: usize) -> FilterResult<EvaluationResult> {
        if depth > self.config.max_depth {
            return Err(FilterError::FilterTooDeep {
                max_depth: self.config.max_depth,
            });
        }

        match node {
            FilterNode::And(children) => {
                let results = self.evaluate_children(children, data, depth)?;
                let passed = results.iter().all(|r| r.all_passed);
                trace!("and over {} children: passed={}", results.len(), passed);
                Ok(EvaluationResult::combine(passed, results))
            }
            FilterNode::Or(children) => {
                let results = self.evaluate_children(children, data, depth)?;
                let passed = results.iter().any(|r| r.all_passed);
                trace!("or over {} children: passed={}", results.len(), passed);
                Ok(EvaluationResult::combine(passed, results))
            }
            FilterNode::Not(child) => {
                let result = self.evaluate_node(child, data, depth + 1)?.negated();
                trace!("not: passed={}", result.all_passed);
                Ok(result)
            }
            FilterNode::Leaf(clauses) => self.evaluate_leaf(clauses, data),
        }
    }

    /// Evaluates every child; none is skipped.
    fn evaluate_children(
        &self,
        children: &[FilterNode],
        data: &Value,
        depth: usize,
    ) -> FilterResult<Vec<EvaluationResult>> {
        children
            .iter()
            .map(|child| self.evaluate_node(child, data, depth + 1))
            .collect()
    }

    /// Runs every check of every clause and records each failure.
    fn evaluate_leaf(&self, clauses: &[FieldClause], data: &Value) -> FilterResult<EvaluationResult> {
        let mut messages = Vec::new();

        for clause in clauses {
            let field = clause.path.as_str();
            let field_value = clause.path.resolve_or(data, &self.config.missing_value);

            for (operator, condition) in &clause.checks {
                let satisfied = operator
                    .is_satisfied_by(field_value, condition)
                    .map_err(|e| e.at(field, *operator))?;

                if !satisfied {
                    trace!("check failed: {} {} {}", field, operator, condition.value);
                    messages.push(Message::failure(
                        field,
                        *operator,
                        condition.message.as_deref(),
                    ));
                }
            }
        }

        Ok(EvaluationResult::from_messages(messages))
    }
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
