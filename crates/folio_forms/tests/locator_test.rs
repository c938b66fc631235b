use folio_forms::serialization::load_page;
use folio_forms::{Control, ControlKind, FieldValue, PropertyPageConfig, Step, locate};

fn fixture() -> PropertyPageConfig {
    load_page("tests/fixtures/property-page.json").expect("Failed to load fixture")
}

#[test]
fn test_direct_property() {
    let page = fixture();
    let found = locate("issueDate", &page.controls).expect("issueDate not found");
    assert_eq!(found.control.kind(), ControlKind::Date);
    assert_eq!(found.control.id(), "5a9da2df-4d01-4061-8a9d-8bd9b1314842");
    assert_eq!(found.index, None);
    assert_eq!(found.value_path, "$.controls[1].value");
}

#[test]
fn test_unknown_property() {
    let page = fixture();
    assert!(locate("unknown", &page.controls).is_none());
}

#[test]
fn test_property_inside_group() {
    let page = fixture();
    let found = locate("seller", &page.controls).expect("seller not found");
    assert_eq!(found.control.kind(), ControlKind::Combo);
    assert_eq!(found.value_path, "$.controls[0].controls[0].value");
    assert_eq!(found.address.steps(), &[Step::Child(0), Step::Child(0)]);
}

#[test]
fn test_nested_property_in_columns_and_group() {
    let page = fixture();
    let found = locate("payment.method", &page.controls).expect("payment.method not found");
    assert_eq!(found.control.field().map(|f| f.label.as_str()), Some("Method"));
    assert_eq!(found.value_path, "$.controls[4].controls[0].controls[0].value");
}

#[test]
fn test_table_cell() {
    let page = fixture();
    let found = locate("positions[0].unitPrice", &page.controls).expect("cell not found");
    assert_eq!(found.control.kind(), ControlKind::Money);
    assert_eq!(found.index, Some(0));
    assert_eq!(found.value_path, "$.controls[3].controls[3].value[0]");
}

#[test]
fn test_table_cell_out_of_range() {
    let page = fixture();
    assert!(locate("positions[1].unitPrice", &page.controls).is_none());
}

#[test]
fn test_table_cell_of_unknown_table() {
    let page = fixture();
    assert!(locate("lines[0].unitPrice", &page.controls).is_none());
}

#[test]
fn test_whole_table() {
    let page = fixture();
    let found = locate("positions", &page.controls).expect("table not found");
    match found.control {
        Control::Table(table) => {
            assert_eq!(table.size, 1);
            assert_eq!(table.controls.len(), 5);
        }
        other => panic!("expected table, got {:?}", other.kind()),
    }
    assert_eq!(found.index, None);
    assert_eq!(found.value_path, "$.controls[3]");
}

#[test]
fn test_property_inside_tabs() {
    let page = fixture();
    let found = locate("notes", &page.controls).expect("notes not found");
    assert_eq!(found.value_path, "$.controls[5].tabs[1].controls[0].value");
    assert_eq!(found.address.steps(), &[Step::Child(5), Step::Tab { tab: 1, child: 0 }]);
}

#[test]
fn test_first_match_wins() {
    let json = r#"{
        "context": "EDIT",
        "controls": [
            { "id": "first", "type": "text", "property": "name", "value": "a" },
            { "id": "group", "type": "group", "name": "g", "controls": [
                { "id": "second", "type": "text", "property": "name", "value": "b" }
            ]}
        ]
    }"#;
    let page: PropertyPageConfig = serde_json::from_str(json).expect("Parse error");
    let found = locate("name", &page.controls).expect("name not found");
    assert_eq!(found.control.id(), "first");
}

#[test]
fn test_address_resolves_mutably() {
    let mut page = fixture();
    let address = page.locate("notes").map(|f| f.address).expect("notes not found");
    let control = page.control_at_mut(&address).expect("address did not resolve");
    control.field_mut().expect("leaf").value = FieldValue::from("reminder");
    assert_eq!(
        page.locate("notes").and_then(|f| f.control.field().map(|f| f.value.clone())),
        Some(FieldValue::from("reminder"))
    );
}
