//! Tests for building filter trees from JSON.

use super::*;
use serde_json::json;

fn leaf_of(node: &FilterNode) -> &[FieldClause] {
    match node {
        FilterNode::Leaf(clauses) => clauses,
        other => panic!("Expected Leaf, got {:?}", other),
    }
}

// ==================== Field Clause Tests ====================

#[test]
fn test_parse_single_field() {
    let filter = FilterParser::parse(&json!({ "field": { "eq": { "value": 10 } } })).unwrap();
    assert_eq!(
        filter,
        FilterNode::field("field", Operator::Eq, Condition::new(10))
    );
}

#[test]
fn test_parse_underscore_operator_tokens() {
    let filter = FilterParser::parse(&json!({ "field": { "_eq": { "value": 10 } } })).unwrap();
    assert_eq!(
        filter,
        FilterNode::field("field", Operator::Eq, Condition::new(10))
    );
}

#[test]
fn test_parse_multiple_operators_keep_order() {
    let filter = FilterParser::parse(&json!({
        "age": { "_gte": { "value": 30 }, "_lte": { "value": 50 } }
    }))
    .unwrap();

    let clauses = leaf_of(&filter);
    assert_eq!(clauses.len(), 1);
    let ops: Vec<Operator> = clauses[0].checks.iter().map(|(op, _)| *op).collect();
    assert_eq!(ops, vec![Operator::Gte, Operator::Lte]);
}

#[test]
fn test_parse_multiple_fields_into_one_leaf() {
    let filter = FilterParser::parse(&json!({
        "age": { "gte": { "value": 30 } },
        "name": { "ilike": { "value": "john" } }
    }))
    .unwrap();

    let clauses = leaf_of(&filter);
    let paths: Vec<&str> = clauses.iter().map(|c| c.path.as_str()).collect();
    assert_eq!(paths, vec!["age", "name"]);
}

#[test]
fn test_parse_nested_field_path() {
    let filter = FilterParser::parse(&json!({ "address.city": { "eq": "Portland" } })).unwrap();
    let clauses = leaf_of(&filter);
    assert_eq!(clauses[0].path.segments(), &["address", "city"]);
}

#[test]
fn test_parse_custom_message() {
    let filter = FilterParser::parse(&json!({
        "age": { "gte": { "value": 18, "message": "Must be an adult" } }
    }))
    .unwrap();

    let (_, condition) = &leaf_of(&filter)[0].checks[0];
    assert_eq!(condition.value, json!(18));
    assert_eq!(condition.message.as_deref(), Some("Must be an adult"));
}

#[test]
fn test_parse_bare_operand_shorthand() {
    let filter = FilterParser::parse(&json!({ "age": { "_gte": 30, "_in": [1, 2] } })).unwrap();
    let checks = &leaf_of(&filter)[0].checks;
    assert_eq!(checks[0], (Operator::Gte, Condition::new(30)));
    assert_eq!(checks[1], (Operator::In, Condition::new(json!([1, 2]))));
}

#[test]
fn test_parse_message_without_value_defaults_to_null() {
    let filter = FilterParser::parse(&json!({
        "deleted_at": { "is_null": { "message": "Record is deleted" } }
    }))
    .unwrap();
    let (op, condition) = &leaf_of(&filter)[0].checks[0];
    assert_eq!(*op, Operator::IsNull);
    assert_eq!(condition.value, Value::Null);
}

#[test]
fn test_parse_non_string_message_is_malformed() {
    let err = FilterParser::parse(&json!({ "age": { "eq": { "value": 1, "message": 5 } } }))
        .unwrap_err();
    assert!(matches!(err, FilterError::MalformedFilter { .. }));
}

#[test]
fn test_parse_field_without_operators() {
    let filter = FilterParser::parse(&json!({ "age": {}, "name": null })).unwrap();
    let clauses = leaf_of(&filter);
    assert_eq!(clauses.len(), 2);
    assert!(clauses.iter().all(|c| c.checks.is_empty()));
}

#[test]
fn test_parse_empty_object_is_empty_leaf() {
    let filter = FilterParser::parse(&json!({})).unwrap();
    assert_eq!(filter, FilterNode::Leaf(vec![]));
}

// ==================== Logical Operator Tests ====================

#[test]
fn test_parse_and() {
    let filter = FilterParser::parse(&json!({
        "_and": [
            { "field1": { "_eq": { "value": 10 } } },
            { "field2": { "_gt": { "value": 20 } } }
        ]
    }))
    .unwrap();

    assert_eq!(
        filter,
        FilterNode::and(vec![
            FilterNode::field("field1", Operator::Eq, Condition::new(10)),
            FilterNode::field("field2", Operator::Gt, Condition::new(20)),
        ])
    );
}

#[test]
fn test_parse_or() {
    let filter = FilterParser::parse(&json!({
        "_or": [
            { "field1": { "_eq": { "value": 10 } } },
            { "field2": { "_gt": { "value": 21 } } }
        ]
    }))
    .unwrap();
    assert!(matches!(filter, FilterNode::Or(ref children) if children.len() == 2));
}

#[test]
fn test_parse_bare_logical_keys_with_arrays() {
    let filter = FilterParser::parse(&json!({
        "and": [{ "a": { "eq": 1 } }],
        "or": [{ "b": { "eq": 2 } }],
        "not": [{ "c": { "eq": 3 } }]
    }))
    .unwrap();

    match filter {
        FilterNode::And(parts) => {
            assert!(matches!(parts[0], FilterNode::And(_)));
            assert!(matches!(parts[1], FilterNode::Or(_)));
            assert!(matches!(parts[2], FilterNode::Not(_)));
        }
        other => panic!("Expected And, got {:?}", other),
    }
}

#[test]
fn test_parse_bare_logical_names_as_fields() {
    // Without an array value these are ordinary field names.
    let filter = FilterParser::parse(&json!({ "not": { "eq": "x" } })).unwrap();
    let clauses = leaf_of(&filter);
    assert_eq!(clauses[0].path.as_str(), "not");
}

#[test]
fn test_parse_bare_logical_name_over_filter_object_is_ambiguous() {
    let err = FilterParser::parse(&json!({ "not": { "a": { "eq": 1 } } })).unwrap_err();
    match err {
        FilterError::MalformedFilter { reason } => {
            assert!(reason.contains("`_not`"), "reason was: {}", reason);
            assert!(reason.contains("\"not\""), "reason was: {}", reason);
        }
        other => panic!("Expected MalformedFilter, got {:?}", other),
    }

    // Same for `and` / `or`, including when the inner key is logical.
    for filter in [
        json!({ "and": { "a": { "eq": 1 } } }),
        json!({ "or": { "_not": { "a": { "eq": 1 } } } }),
    ] {
        assert!(matches!(
            FilterParser::parse(&filter),
            Err(FilterError::MalformedFilter { .. })
        ));
    }
}

#[test]
fn test_parse_bare_logical_names_with_operator_objects_stay_fields() {
    let filter = FilterParser::parse(&json!({
        "and": { "_eq": "x" },
        "or": {},
        "not": null
    }))
    .unwrap();
    let paths: Vec<&str> = leaf_of(&filter).iter().map(|c| c.path.as_str()).collect();
    assert_eq!(paths, vec!["and", "or", "not"]);
}

#[test]
fn test_parse_not_single_object() {
    let filter = FilterParser::parse(&json!({ "_not": { "field": { "_eq": 10 } } })).unwrap();
    assert_eq!(
        filter,
        FilterNode::not(FilterNode::field("field", Operator::Eq, Condition::new(10)))
    );
}

#[test]
fn test_parse_not_single_element_array() {
    let filter = FilterParser::parse(&json!({ "_not": [{ "field": { "_eq": 10 } }] })).unwrap();
    assert_eq!(
        filter,
        FilterNode::not(FilterNode::field("field", Operator::Eq, Condition::new(10)))
    );
}

#[test]
fn test_parse_not_array_is_implicit_and() {
    let filter = FilterParser::parse(&json!({
        "_not": [{ "a": { "_eq": 1 } }, { "b": { "_eq": 2 } }]
    }))
    .unwrap();
    assert_eq!(
        filter,
        FilterNode::not(FilterNode::and(vec![
            FilterNode::field("a", Operator::Eq, Condition::new(1)),
            FilterNode::field("b", Operator::Eq, Condition::new(2)),
        ]))
    );
}

#[test]
fn test_parse_and_accepts_single_object() {
    let filter = FilterParser::parse(&json!({ "_and": { "a": { "_eq": 1 } } })).unwrap();
    assert_eq!(
        filter,
        FilterNode::and(vec![FilterNode::field("a", Operator::Eq, Condition::new(1))])
    );
}

#[test]
fn test_parse_mixed_node_is_implicit_and_in_document_order() {
    let filter = FilterParser::parse(&json!({
        "age": { "gte": 18 },
        "_or": [{ "role": { "eq": "admin" } }],
        "name": { "not_null": null }
    }))
    .unwrap();

    match filter {
        FilterNode::And(parts) => {
            assert_eq!(parts.len(), 2);
            let clauses = leaf_of(&parts[0]);
            let paths: Vec<&str> = clauses.iter().map(|c| c.path.as_str()).collect();
            assert_eq!(paths, vec!["age", "name"]);
            assert!(matches!(parts[1], FilterNode::Or(_)));
        }
        other => panic!("Expected And, got {:?}", other),
    }
}

// ==================== Error Tests ====================

#[test]
fn test_parse_unknown_operator() {
    let err = FilterParser::parse(&json!({ "age": { "_between": [1, 2] } })).unwrap_err();
    assert_eq!(err, FilterError::unknown_operator("age", "_between"));
}

#[test]
fn test_parse_unknown_operator_in_nested_node() {
    let err = FilterParser::parse(&json!({
        "_and": [{ "a": { "eq": 1 } }, { "b": { "regex": "x" } }]
    }))
    .unwrap_err();
    assert_eq!(err, FilterError::unknown_operator("b", "regex"));
}

#[test]
fn test_parse_invalid_pattern() {
    let err = FilterParser::parse(&json!({
        "_or": [{ "name": { "eq": "Alice" } }, { "name": { "ilike": { "value": "(" } } }]
    }))
    .unwrap_err();
    match err {
        FilterError::InvalidPattern {
            field,
            operator,
            pattern,
            ..
        } => {
            assert_eq!(field, "name");
            assert_eq!(operator, Operator::Ilike);
            assert_eq!(pattern, "(");
        }
        other => panic!("Expected InvalidPattern, got {:?}", other),
    }
}

#[test]
fn test_parse_compiles_valid_pattern() {
    let filter = FilterParser::parse(&json!({ "code": { "like": "^[A-Z]{3}$" } })).unwrap();
    let (_, condition) = &leaf_of(&filter)[0].checks[0];
    assert!(condition.pattern.is_some());
}

#[test]
fn test_parse_non_string_pattern_is_left_to_evaluation() {
    // The operand's type is checked when the check runs.
    let filter = FilterParser::parse(&json!({ "code": { "like": 5 } })).unwrap();
    let (_, condition) = &leaf_of(&filter)[0].checks[0];
    assert!(condition.pattern.is_none());
}

#[test]
fn test_parse_unknown_logical_operator() {
    let err = FilterParser::parse(&json!({ "_xor": [] })).unwrap_err();
    assert!(matches!(err, FilterError::MalformedFilter { ref reason } if reason.contains("_xor")));
}

#[test]
fn test_parse_non_object_root() {
    let err = FilterParser::parse(&json!([1, 2])).unwrap_err();
    assert!(matches!(err, FilterError::MalformedFilter { .. }));
}

#[test]
fn test_parse_field_with_scalar_is_malformed() {
    let err = FilterParser::parse(&json!({ "age": 30 })).unwrap_err();
    assert!(matches!(err, FilterError::MalformedFilter { ref reason } if reason.contains("age")));
}

#[test]
fn test_parse_logical_with_scalar_is_malformed() {
    let err = FilterParser::parse(&json!({ "_or": "nope" })).unwrap_err();
    assert!(matches!(err, FilterError::MalformedFilter { .. }));
}

#[test]
fn test_parse_array_child_must_be_object() {
    let err = FilterParser::parse(&json!({ "_and": [1] })).unwrap_err();
    assert!(matches!(err, FilterError::MalformedFilter { .. }));
}

// ==================== Depth Tests ====================

fn nested_not(levels: usize) -> Value {
    let mut filter = json!({ "a": { "eq": 1 } });
    for _ in 0..levels {
        filter = json!({ "_not": filter });
    }
    filter
}

#[test]
fn test_parse_depth_at_limit() {
    let parser = FilterParser::with_config(&EvaluatorConfig::default().with_max_depth(4));
    let node = parser.parse_value(&nested_not(3)).unwrap();
    assert_eq!(node.depth(), 4);
}

#[test]
fn test_parse_depth_over_limit() {
    let parser = FilterParser::with_config(&EvaluatorConfig::default().with_max_depth(4));
    let err = parser.parse_value(&nested_not(4)).unwrap_err();
    assert_eq!(err, FilterError::FilterTooDeep { max_depth: 4 });
}

#[test]
fn test_parse_depth_counts_implicit_and() {
    // The mixed root becomes And([Leaf, Not(Leaf)]), three levels deep.
    let filter = json!({ "a": { "eq": 1 }, "_not": { "b": { "eq": 2 } } });

    let parser = FilterParser::with_config(&EvaluatorConfig::default().with_max_depth(3));
    assert_eq!(parser.parse_value(&filter).unwrap().depth(), 3);

    let parser = FilterParser::with_config(&EvaluatorConfig::default().with_max_depth(2));
    assert!(matches!(
        parser.parse_value(&filter),
        Err(FilterError::FilterTooDeep { max_depth: 2 })
    ));
}

#[test]
fn test_parse_default_limit_rejects_very_deep_filters() {
    let err = FilterParser::parse(&nested_not(DEFAULT_MAX_DEPTH + 10)).unwrap_err();
    assert_eq!(
        err,
        FilterError::FilterTooDeep {
            max_depth: DEFAULT_MAX_DEPTH
        }
    );
}

// ==================== TryFrom ====================

#[test]
fn test_try_from_value() {
    let value = json!({ "name": { "starts_with": "Al" } });
    let node = FilterNode::try_from(&value).unwrap();
    assert_eq!(
        node,
        FilterNode::field("name", Operator::StartsWith, Condition::new("Al"))
    );
}
