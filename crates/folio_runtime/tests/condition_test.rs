use folio_runtime::{Condition, ConditionError, Operator};
use serde_json::json;

#[test]
fn test_literal_means_eq() {
    let condition = Condition::parse(&json!({"status": "ACTIVE"})).expect("Parse error");
    assert_eq!(
        condition,
        Condition::All(vec![Condition::Compare {
            path: "status".to_string(),
            op: Operator::Eq,
            operand: json!("ACTIVE"),
        }])
    );
}

#[test]
fn test_string_encoded_expression() {
    let inline = Condition::parse(&json!({"age": {"$gte": 18}})).expect("Parse error");
    let encoded = Condition::parse_str(r#"{"age": {"$gte": 18}}"#).expect("Parse error");
    assert_eq!(inline, encoded);
}

#[test]
fn test_logical_operators() {
    let condition = Condition::parse(&json!({
        "$or": [{"a": 1}, {"$and": [{"b": 2}, {"c": {"$ne": 3}}]}]
    }))
    .expect("Parse error");

    let Condition::All(top) = &condition else {
        panic!("expected top-level conjunction");
    };
    assert!(matches!(&top[0], Condition::Any(items) if items.len() == 2));
    assert_eq!(condition.paths(), vec!["a", "b", "c"]);
}

#[test]
fn test_several_operators_are_anded() {
    let condition = Condition::parse(&json!({"age": {"$gt": 18, "$lt": 30}})).expect("Parse error");
    let Condition::All(top) = condition else {
        panic!("expected conjunction");
    };
    let Condition::All(ops) = &top[0] else {
        panic!("expected operator conjunction");
    };
    let operators: Vec<Operator> = ops
        .iter()
        .filter_map(|c| match c {
            Condition::Compare { op, .. } => Some(*op),
            _ => None,
        })
        .collect();
    assert_eq!(operators, vec![Operator::Gt, Operator::Lt]);
}

#[test]
fn test_malformed_expressions() {
    assert_eq!(Condition::parse(&json!([1, 2])), Err(ConditionError::NotAnObject("array")));
    assert_eq!(
        Condition::parse(&json!({"$or": {"a": 1}})),
        Err(ConditionError::NotAnArray("$or".to_string()))
    );
    assert_eq!(
        Condition::parse(&json!({"a": {"$like": "x"}})),
        Err(ConditionError::UnknownOperator {
            path: "a".to_string(),
            operator: "$like".to_string(),
        })
    );
    assert_eq!(
        Condition::parse(&json!({"a": {}})),
        Err(ConditionError::EmptyOperator("a".to_string()))
    );
    assert!(matches!(
        Condition::parse(&json!("{not json")),
        Err(ConditionError::InvalidJson(_))
    ));
}

#[test]
fn test_operator_keys() {
    for key in ["$eq", "$ne", "$lt", "$lte", "$gt", "$gte"] {
        let op = Operator::from_key(key).expect("known operator");
        assert_eq!(op.as_str(), key);
    }
    assert_eq!(Operator::from_key("$in"), None);
}
