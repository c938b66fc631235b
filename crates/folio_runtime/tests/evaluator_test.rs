use folio_forms::serialization::{load_page, parse_page};
use folio_forms::{FieldValue, PropertyPageConfig};
use folio_runtime::{ConditionError, evaluate_expression, extract_value, is_uuid_v4};
use serde_json::{Value, json};

fn fixture() -> PropertyPageConfig {
    load_page("tests/fixtures/property-page.json").expect("Failed to load fixture")
}

fn eval(page: &PropertyPageConfig, expression: Value) -> bool {
    evaluate_expression(&expression, &page.controls).expect("Condition error")
}

#[test]
fn test_default_operator_is_eq() {
    let page = fixture();
    assert!(eval(&page, json!({"payment.method": "BANK_TRANSFER"})));
    assert!(!eval(&page, json!({"payment.method": "CASH"})));
}

#[test]
fn test_non_uuid_key_is_compared_raw() {
    let page = fixture();
    assert_eq!(
        extract_value("payment.method", &page.controls),
        Some(FieldValue::from("BANK_TRANSFER"))
    );
}

#[test]
fn test_uuid_key_is_compared_by_label() {
    let page = fixture();
    assert_eq!(extract_value("buyer", &page.controls), Some(FieldValue::from("Contoso Ltd.")));
    assert!(eval(&page, json!({"buyer": "Contoso Ltd."})));
}

#[test]
fn test_missing_choice_falls_back_to_first_option() {
    let page = fixture();
    assert_eq!(
        extract_value("seller", &page.controls),
        Some(FieldValue::from("Northwind Traders"))
    );
}

#[test]
fn test_sorted_options_change_the_fallback() {
    let page = parse_page(
        r#"{"context":"INSERT","controls":[
            {"id":"a","type":"combo","property":"unit","value":"","sortByLabel":true,
             "options":{"PIECE":"piece","HOUR":"hour"}},
            {"id":"b","type":"radio","property":"empty","value":"","options":{}}
        ]}"#,
    )
    .expect("Parse error");
    assert_eq!(extract_value("unit", &page.controls), Some(FieldValue::from("HOUR")));
    assert_eq!(extract_value("empty", &page.controls), Some(FieldValue::from("")));
}

#[test]
fn test_comparators() {
    let page = fixture();
    assert!(eval(&page, json!({"age": {"$gte": 18}})));
    assert!(eval(&page, json!({"age": {"$gt": 20}})));
    assert!(eval(&page, json!({"age": {"$lte": 21}})));
    assert!(!eval(&page, json!({"age": {"$lt": 18}})));
    assert!(eval(&page, json!({"age": 21})));
    assert!(eval(&page, json!({"age": {"$ne": 30}})));
    assert!(eval(&page, json!({"age": {"$gt": 18, "$lt": 30}})));
    assert!(!eval(&page, json!({"age": {"$gt": 18, "$lt": 20}})));
}

#[test]
fn test_strings_compare_lexically() {
    let page = fixture();
    assert!(eval(&page, json!({"invoiceNumber": {"$gt": "FV/2023/000"}})));
    assert!(!eval(&page, json!({"invoiceNumber": {"$lt": "FV/2023/000"}})));
}

#[test]
fn test_boolean_comparand() {
    let page = fixture();
    assert!(eval(&page, json!({"paid": true})));
    assert!(eval(&page, json!({"paid": "true"})));
    assert!(!eval(&page, json!({"paid": false})));
}

#[test]
fn test_money_uses_period_separator() {
    let page = fixture();
    assert_eq!(extract_value("total", &page.controls), Some(FieldValue::from("1200.50")));
    assert!(eval(&page, json!({"total": {"$gt": 1200}})));
    assert!(eval(&page, json!({"positions[0].unitPrice": "150.50"})));
    assert!(eval(&page, json!({"positions[0].unitPrice": {"$lt": 151}})));
}

#[test]
fn test_table_cells_use_row_value() {
    let page = fixture();
    assert!(eval(&page, json!({"positions[0].unit": "HOUR"})));
    assert!(eval(&page, json!({"positions[0].quantity": 1})));
}

#[test]
fn test_unresolved_path() {
    let page = fixture();
    assert_eq!(extract_value("positions[1].unitPrice", &page.controls), None);
    assert_eq!(extract_value("positions", &page.controls), None);

    assert!(eval(&page, json!({"missing": null})));
    assert!(eval(&page, json!({"missing": ""})));
    assert!(!eval(&page, json!({"missing": "x"})));
    assert!(eval(&page, json!({"missing": {"$ne": "x"}})));
    assert!(!eval(&page, json!({"missing": {"$ne": ""}})));
    for op in ["$lt", "$lte", "$gt", "$gte"] {
        assert!(!eval(&page, json!({"positions[1].unitPrice": {op: 0}})));
    }
}

#[test]
fn test_logical_composition() {
    let page = fixture();
    assert!(eval(&page, json!({"$and": [{"age": 21}, {"paid": true}]})));
    assert!(!eval(&page, json!({"$and": [{"age": 21}, {"paid": false}]})));
    assert!(eval(&page, json!({"$or": [{"age": 99}, {"paid": true}]})));
    assert!(!eval(&page, json!({"$or": [{"age": 99}, {"paid": false}]})));
    assert!(eval(&page, json!({"age": 21, "paid": true})));
    assert!(!eval(&page, json!({"age": 21, "paid": false})));
}

#[test]
fn test_evaluation_follows_live_values() {
    let mut page = fixture();
    let expression = json!({"payment.method": "CASH"});
    assert!(!eval(&page, expression.clone()));
    page.set_value("payment.method", "CASH");
    assert!(eval(&page, expression));
}

#[test]
fn test_malformed_expression_is_an_error() {
    let page = fixture();
    let result = evaluate_expression(&json!({"age": {"$between": [1, 2]}}), &page.controls);
    assert!(matches!(result, Err(ConditionError::UnknownOperator { .. })));
}

#[test]
fn test_uuid_v4_detection() {
    assert!(is_uuid_v4("1bfb2de1-4aa8-4e0a-a007-878ae91443aa"));
    assert!(is_uuid_v4("1BFB2DE1-4AA8-4E0A-A007-878AE91443AA"));
    assert!(!is_uuid_v4("c232ab00-9414-11ec-b3c8-9f6bdeced846"));
    assert!(!is_uuid_v4("1bfb2de14aa84e0aa007878ae91443aa"));
    assert!(!is_uuid_v4("BANK_TRANSFER"));
    assert!(!is_uuid_v4(""));
}
