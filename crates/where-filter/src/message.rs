//! Failure messages and evaluation results.

use serde::{Deserialize, Serialize};

use crate::operator::Operator;

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The field path as written in the filter.
    pub field: String,
    /// The operator that was not satisfied.
    pub operator: Operator,
    /// The caller's message, or the default text.
    pub text: String,
}

impl Message {
    /// Builds the message for a failed check.
    pub fn failure(field: &str, operator: Operator, custom: Option<&str>) -> Self {
        let text = match custom {
            Some(text) => text.to_string(),
            None => default_text(field, operator),
        };
        Self {
            field: field.to_string(),
            operator,
            text,
        }
    }
}

/// The message used when a condition carries no custom text.
pub fn default_text(field: &str, operator: Operator) -> String {
    format!("Validation failed for field \"{}\" with operator {}", field, operator)
}

/// Outcome of evaluating a filter against a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// Verdict of the evaluated node.
    pub all_passed: bool,
    /// One entry per failed check, in evaluation order.
    pub messages: Vec<Message>,
}

impl EvaluationResult {
    /// Result of a leaf: passes exactly when nothing failed.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            all_passed: messages.is_empty(),
            messages,
        }
    }

    /// Combines child results with the given verdict, concatenating their
    /// messages in child order.
    pub fn combine(all_passed: bool, children: Vec<EvaluationResult>) -> Self {
        let messages = children.into_iter().flat_map(|r| r.messages).collect();
        Self {
            all_passed,
            messages,
        }
    }

    /// Same messages, opposite verdict.
    pub fn negated(self) -> Self {
        Self {
            all_passed: !self.all_passed,
            messages: self.messages,
        }
    }

    /// Messages reported for one field path.
    pub fn messages_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Message> + 'a {
        self.messages.iter().filter(move |m| m.field == field)
    }
}
