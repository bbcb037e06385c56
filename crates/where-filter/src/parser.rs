//! Builds a [`FilterNode`] tree from an in-memory JSON where-clause.

use log::trace;
use serde_json::{Map, Value};

use crate::ast::{Condition, FieldClause, FilterNode};
use crate::config::{EvaluatorConfig, DEFAULT_MAX_DEPTH};
use crate::error::{FilterError, FilterResult};
use crate::operator::{json_type, Operator, SENTINEL_PREFIX};

/// Builder that turns JSON where-clauses into typed filter trees.
///
/// # Shape
///
/// ```text
/// node       ::= { key: entry, ... }
/// entry      ::= "_and": [node, ...] | "_or": [node, ...]
///              | "_not": node | "_not": [node, ...]
///              | field_path: { operator: condition, ... }
/// condition  ::= { "value": any, "message"?: string } | any
/// ```
///
/// - `and`, `or` and `not` without the underscore are logical only when their
///   value is an array. Mapped to an object of operators they name ordinary
///   fields; mapped to any other object they are rejected as ambiguous.
/// - `_not` over an array negates the implicit AND of its elements.
/// - An object holding several entries is the implicit AND of them, in
///   document order, with all field entries grouped into one leaf.
/// - A field mapped to `null` or `{}` carries no checks and passes.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use where_filter_rs::{FilterNode, FilterParser};
///
/// let filter = FilterParser::parse(&json!({
///     "_or": [
///         { "role": { "_eq": { "value": "admin" } } },
///         { "age": { "gte": 18 } }
///     ]
/// }))
/// .unwrap();
/// assert!(matches!(filter, FilterNode::Or(ref children) if children.len() == 2));
/// ```
#[derive(Debug, Clone)]
pub struct FilterParser {
    max_depth: usize,
}

/// Logical combinator keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Logical {
    And,
    Or,
    Not,
}

/// How one key of a node object is interpreted.
enum Entry<'a> {
    Logical(Logical, &'a Value),
    Field(&'a str, &'a Value),
}

impl Default for FilterParser {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl FilterParser {
    /// Parses a where-clause with the default depth limit.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::UnknownOperator` for an operator token outside the
    /// supported set, `FilterError::InvalidPattern` for a `like`/`ilike`
    /// pattern that does not compile, `FilterError::MalformedFilter` for
    /// values that do not have a node's shape, and `FilterError::FilterTooDeep`
    /// when nesting exceeds the limit.
    pub fn parse(filter: &Value) -> FilterResult<FilterNode> {
        Self::default().parse_value(filter)
    }

    /// Creates a parser using the depth limit from `config`.
    pub fn with_config(config: &EvaluatorConfig) -> Self {
        Self {
            max_depth: config.max_depth,
        }
    }

    /// Parses a where-clause with this parser's depth limit.
    pub fn parse_value(&self, filter: &Value) -> FilterResult<FilterNode> {
        let node = self.parse_node(filter, 1)?;
        trace!("parsed filter with {} checks", node.check_count());
        Ok(node)
    }

    fn check_depth(&self, depth: usize) -> FilterResult<()> {
        if depth > self.max_depth {
            return Err(FilterError::FilterTooDeep {
                max_depth: self.max_depth,
            });
        }
        Ok(())
    }

    /// Parses a node object sitting at `depth` in the resulting tree.
    fn parse_node(&self, value: &Value, depth: usize) -> FilterResult<FilterNode> {
        self.check_depth(depth)?;

        let Value::Object(map) = value else {
            return Err(FilterError::malformed(format!(
                "expected a filter object, found {}",
                json_type(value)
            )));
        };

        let entries = classify(map)?;
        let logical_count = entries
            .iter()
            .filter(|e| matches!(e, Entry::Logical(..)))
            .count();
        let has_fields = entries.len() > logical_count;
        let part_count = logical_count + usize::from(has_fields);

        // Several entries become children of an implicit AND one level down.
        let part_depth = if part_count > 1 { depth + 1 } else { depth };
        self.check_depth(part_depth)?;

        let mut parts: Vec<FilterNode> = Vec::with_capacity(part_count);
        let mut leaf_slot: Option<usize> = None;

        for entry in entries {
            match entry {
                Entry::Logical(kind, operand) => {
                    parts.push(self.parse_logical(kind, operand, part_depth)?);
                }
                Entry::Field(path, checks) => {
                    let clause = parse_field_clause(path, checks)?;
                    let slot = *leaf_slot.get_or_insert_with(|| {
                        parts.push(FilterNode::Leaf(Vec::new()));
                        parts.len() - 1
                    });
                    if let FilterNode::Leaf(clauses) = &mut parts[slot] {
                        clauses.push(clause);
                    }
                }
            }
        }

        match parts.len() {
            0 => Ok(FilterNode::Leaf(Vec::new())),
            1 => Ok(parts.remove(0)),
            _ => Ok(FilterNode::And(parts)),
        }
    }

    /// Parses a logical entry whose node sits at `depth`.
    fn parse_logical(&self, kind: Logical, operand: &Value, depth: usize) -> FilterResult<FilterNode> {
        match kind {
            Logical::And => Ok(FilterNode::And(self.parse_children(operand, depth + 1)?)),
            Logical::Or => Ok(FilterNode::Or(self.parse_children(operand, depth + 1)?)),
            Logical::Not => {
                let child = match operand {
                    Value::Array(items) if items.len() == 1 => self.parse_node(&items[0], depth + 1)?,
                    Value::Array(_) => {
                        self.check_depth(depth + 1)?;
                        FilterNode::And(self.parse_children(operand, depth + 2)?)
                    }
                    _ => self.parse_node(operand, depth + 1)?,
                };
                Ok(FilterNode::not(child))
            }
        }
    }

    /// Parses the operand of `_and` / `_or`. A single object is one child.
    fn parse_children(&self, operand: &Value, depth: usize) -> FilterResult<Vec<FilterNode>> {
        match operand {
            Value::Array(items) => items
                .iter()
                .map(|item| self.parse_node(item, depth))
                .collect(),
            Value::Object(_) => Ok(vec![self.parse_node(operand, depth)?]),
            other => Err(FilterError::malformed(format!(
                "logical operator expects an array of filters, found {}",
                json_type(other)
            ))),
        }
    }
}

impl TryFrom<&Value> for FilterNode {
    type Error = FilterError;

    fn try_from(filter: &Value) -> FilterResult<Self> {
        FilterParser::parse(filter)
    }
}

/// Sorts the keys of a node object into logical and field entries.
fn classify(map: &Map<String, Value>) -> FilterResult<Vec<Entry<'_>>> {
    map.iter()
        .map(|(key, value)| {
            let logical = match key.as_str() {
                "_and" => Some(Logical::And),
                "_or" => Some(Logical::Or),
                "_not" => Some(Logical::Not),
                "and" if value.is_array() => Some(Logical::And),
                "or" if value.is_array() => Some(Logical::Or),
                "not" if value.is_array() => Some(Logical::Not),
                _ => None,
            };
            match logical {
                Some(kind) => Ok(Entry::Logical(kind, value)),
                None if is_ambiguous_bare_logical(key, value) => Err(FilterError::malformed(format!(
                    "`{0}` holds a filter object: use `_{0}` for the logical operator, \
                     or operator tokens for a field named \"{0}\"",
                    key
                ))),
                None if key.starts_with(SENTINEL_PREFIX) => Err(FilterError::malformed(format!(
                    "unknown logical operator `{}`",
                    key
                ))),
                None => Ok(Entry::Field(key.as_str(), value)),
            }
        })
        .collect()
}

/// True for a bare `and`/`or`/`not` key whose object value is not a set of
/// operators, such as `{"not": {"age": {"eq": 1}}}`. It reads like a
/// logical node but would otherwise become a field clause.
fn is_ambiguous_bare_logical(key: &str, value: &Value) -> bool {
    if !matches!(key, "and" | "or" | "not") {
        return false;
    }
    match value {
        Value::Object(map) => map.keys().any(|k| Operator::from_token(k).is_none()),
        _ => false,
    }
}

/// Parses `{ operator: condition, ... }` for one field.
fn parse_field_clause(path: &str, checks: &Value) -> FilterResult<FieldClause> {
    let mut clause = FieldClause::new(path);
    match checks {
        Value::Null => {}
        Value::Object(map) => {
            for (token, condition) in map {
                let operator = Operator::from_token(token)
                    .ok_or_else(|| FilterError::unknown_operator(path, token.as_str()))?;
                clause = clause.try_with(operator, parse_condition(path, condition)?)?;
            }
        }
        other => {
            return Err(FilterError::malformed(format!(
                "field \"{}\" expects an object of operators, found {}",
                path,
                json_type(other)
            )))
        }
    }
    Ok(clause)
}

/// Parses `{ "value": .., "message": .. }` or a bare operand.
fn parse_condition(path: &str, condition: &Value) -> FilterResult<Condition> {
    match condition {
        Value::Object(map) if map.contains_key("value") || map.contains_key("message") => {
            let message = match map.get("message") {
                None | Some(Value::Null) => None,
                Some(Value::String(text)) => Some(text.clone()),
                Some(other) => {
                    return Err(FilterError::malformed(format!(
                        "message for field \"{}\" must be a string, found {}",
                        path,
                        json_type(other)
                    )))
                }
            };
            let mut parsed = Condition::new(map.get("value").cloned().unwrap_or(Value::Null));
            parsed.message = message;
            Ok(parsed)
        }
        other => Ok(Condition::new(other.clone())),
    }
}
