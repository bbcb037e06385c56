//! The filter tree.

use record_path_rs::FieldPath;
use serde_json::Value;

use crate::error::FilterResult;
use crate::operator::{Operator, Pattern};

/// The operand of a single check plus an optional custom failure message.
#[derive(Debug, Clone)]
pub struct Condition {
    /// The value the field is compared against.
    pub value: Value,
    /// Text reported instead of the default message when the check fails.
    pub message: Option<String>,
    /// Compiled `like`/`ilike` operand, filled in by [`FieldClause`].
    pub(crate) pattern: Option<Pattern>,
}

impl Condition {
    /// Creates a condition with the default failure message.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            message: None,
            pattern: None,
        }
    }

    /// Sets a custom failure message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// The compiled pattern is derived from `value`, so it takes no part in equality.
impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.message == other.message
    }
}

/// All checks declared for one field. The checks are conjoined.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldClause {
    /// Where the field lives in the record.
    pub path: FieldPath,
    /// Checks in declaration order.
    pub checks: Vec<(Operator, Condition)>,
}

impl FieldClause {
    /// Creates a clause with no checks yet.
    pub fn new(path: impl Into<FieldPath>) -> Self {
        Self {
            path: path.into(),
            checks: Vec::new(),
        }
    }

    /// Adds a check to the clause.
    ///
    /// A `like`/`ilike` pattern is compiled here. An invalid one is kept
    /// as-is and reported as `InvalidPattern` when evaluated; use
    /// [`FieldClause::try_with`] to reject it up front.
    pub fn with(mut self, operator: Operator, mut condition: Condition) -> Self {
        condition.pattern = operator.compile_pattern(&condition.value).ok().flatten();
        self.checks.push((operator, condition));
        self
    }

    /// Adds a check, failing with `FilterError::InvalidPattern` if a
    /// `like`/`ilike` pattern does not compile.
    pub fn try_with(mut self, operator: Operator, mut condition: Condition) -> FilterResult<Self> {
        condition.pattern = operator
            .compile_pattern(&condition.value)
            .map_err(|e| e.at(self.path.as_str(), operator))?;
        self.checks.push((operator, condition));
        Ok(self)
    }
}

/// A node of the filter tree.
///
/// A node is either a logical combinator over child nodes or a leaf holding
/// field clauses. Mixed JSON objects are split into these shapes when the
/// tree is built, so evaluation never has to inspect key prefixes.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// Passes when every child passes. An empty list passes.
    And(Vec<FilterNode>),

    /// Passes when at least one child passes. An empty list fails.
    Or(Vec<FilterNode>),

    /// Passes when the child fails.
    Not(Box<FilterNode>),

    /// Passes when every check of every field clause is satisfied.
    Leaf(Vec<FieldClause>),
}

impl FilterNode {
    /// `child1 AND child2 AND ...`
    pub fn and(children: Vec<FilterNode>) -> Self {
        FilterNode::And(children)
    }

    /// `child1 OR child2 OR ...`
    pub fn or(children: Vec<FilterNode>) -> Self {
        FilterNode::Or(children)
    }

    /// `NOT child`
    #[allow(clippy::should_implement_trait)]
    pub fn not(child: FilterNode) -> Self {
        FilterNode::Not(Box::new(child))
    }

    /// A leaf with the given field clauses.
    pub fn leaf(clauses: Vec<FieldClause>) -> Self {
        FilterNode::Leaf(clauses)
    }

    /// A leaf with a single check.
    pub fn field(path: impl Into<FieldPath>, operator: Operator, condition: Condition) -> Self {
        FilterNode::Leaf(vec![FieldClause::new(path).with(operator, condition)])
    }

    /// Nesting depth of the tree. A leaf has depth 1.
    ///
    /// This walks the whole tree without a limit. Untrusted trees should go
    /// through the parser or evaluator depth guard first.
    pub fn depth(&self) -> usize {
        match self {
            FilterNode::Leaf(_) => 1,
            FilterNode::Not(child) => 1 + child.depth(),
            FilterNode::And(children) | FilterNode::Or(children) => {
                1 + children.iter().map(FilterNode::depth).max().unwrap_or(0)
            }
        }
    }

    /// Total number of field checks in the tree.
    pub fn check_count(&self) -> usize {
        match self {
            FilterNode::Leaf(clauses) => clauses.iter().map(|c| c.checks.len()).sum(),
            FilterNode::Not(child) => child.check_count(),
            FilterNode::And(children) | FilterNode::Or(children) => {
                children.iter().map(FilterNode::check_count).sum()
            }
        }
    }
}
