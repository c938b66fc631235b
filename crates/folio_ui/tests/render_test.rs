use folio_forms::serialization::{load_page, parse_page};
use folio_forms::{ControlKind, PageContext, PropertyPageConfig};
use folio_ui::{render, ControlTree, FieldInput, FormData, RenderNode, PLACEHOLDER_LABEL};

fn fixture() -> PropertyPageConfig {
    load_page("tests/fixtures/property-page.json").expect("Failed to load fixture")
}

fn choice_options(tree: &ControlTree, name: &str) -> Vec<(String, bool)> {
    match &tree.find_field(name).expect("field not rendered").input {
        FieldInput::Choice { options, .. } => options.iter().map(|o| (o.label.clone(), o.selected)).collect(),
        other => panic!("expected choice input, got {:?}", other),
    }
}

#[test]
fn test_layout_nodes() {
    let tree = render(&fixture());
    assert!(!tree.disabled);
    assert_eq!(tree.nodes.len(), 10);

    match &tree.nodes[0] {
        RenderNode::Group { legend, children, .. } => {
            assert_eq!(legend, "Parties");
            assert_eq!(children.len(), 2);
        }
        other => panic!("expected group, got {:?}", other),
    }
    match &tree.nodes[2] {
        RenderNode::Columns { columns, .. } => assert_eq!(columns.len(), 2),
        other => panic!("expected columns, got {:?}", other),
    }
    assert!(matches!(&tree.nodes[6], RenderNode::Heading { text, .. } if text == "Summary"));
    assert!(matches!(tree.nodes[7], RenderNode::Separator { .. }));
}

#[test]
fn test_required_marker_and_flags() {
    let tree = render(&fixture());

    let issue_date = tree.find_field("issueDate").expect("issueDate not rendered");
    assert_eq!(issue_date.label.as_deref(), Some("Issue date*"));
    assert!(issue_date.required);
    assert!(!issue_date.disabled);

    let age = tree.find_field("age").expect("age not rendered");
    assert_eq!(age.label.as_deref(), Some("Age"));
    assert!(!age.required);

    // requirement condition holds for bank transfers
    let deadline = tree.find_field("payment.deadline").expect("deadline not rendered");
    assert!(deadline.required);
    assert_eq!(deadline.label.as_deref(), Some("Deadline*"));
}

#[test]
fn test_readonly_field_is_disabled_and_not_required() {
    let tree = render(&fixture());
    let total = tree.find_field("total").expect("total not rendered");
    assert!(total.readonly);
    assert!(total.disabled);
    assert!(!total.required);
    assert_eq!(total.label.as_deref(), Some("Total"));
    assert_eq!(total.value, "1200,50");
}

#[test]
fn test_invisible_controls_are_omitted() {
    let mut page = fixture();
    let tree = render(&page);
    assert!(tree.find_field("notes").is_none());
    assert!(tree.find_field("payment.bankAccount").is_some());

    page.set_value("payment.method", "CASH");
    page.context = PageContext::Edit;
    let tree = render(&page);
    assert!(tree.find_field("notes").is_some());
    assert!(tree.find_field("payment.bankAccount").is_none());
}

#[test]
fn test_table_rows_and_cells() {
    let tree = render(&fixture());
    let table = tree.find_table("positions").expect("table not rendered");
    assert_eq!(table.caption, "Positions*");
    assert_eq!(table.headers.len(), 5);
    assert_eq!(table.headers[3], "Unit price");
    assert!(table.can_add);
    assert_eq!(table.rows.len(), 1);

    let row = &table.rows[0];
    assert_eq!(row.number, 1);
    assert!(!row.removable);

    let price = &row.cells[3];
    assert_eq!(price.id, "positions0.unitPrice");
    assert_eq!(price.name, "positions[0].unitPrice");
    assert_eq!(price.label, None);
    assert_eq!(price.value, "150,50");
    assert!(matches!(&price.input, FieldInput::Money { currency } if currency.as_deref() == Some("PLN")));

    let hidden = &row.cells[4];
    assert_eq!(hidden.kind, ControlKind::Hidden);
    assert!(!hidden.disabled);
}

#[test]
fn test_added_rows_are_removable() {
    let mut page = fixture();
    page.add_table_row("positions");
    let tree = render(&page);
    let table = tree.find_table("positions").expect("table not rendered");
    assert_eq!(table.rows.len(), 2);
    assert!(!table.rows[0].removable);
    assert!(table.rows[1].removable);
    assert_eq!(table.rows[1].cells[1].name, "positions[1].quantity");
    assert_eq!(table.rows[1].cells[1].value, "0");
}

#[test]
fn test_combo_selection() {
    let tree = render(&fixture());

    // empty combo falls back to the first option
    let seller = tree.find_field("seller").expect("seller not rendered");
    assert_eq!(seller.value, "e4f38c78-74ec-49f6-b6c6-effe4ac633b4");
    assert_eq!(seller.selected_option().map(|o| o.label.as_str()), Some("Northwind Traders"));

    // sortByLabel orders the presented options
    assert_eq!(
        choice_options(&tree, "buyer"),
        vec![("Contoso Ltd.".to_string(), true), ("Northwind Traders".to_string(), false)]
    );
    assert_eq!(tree.find_field("buyer").map(|f| f.value.as_str()), Some("1bfb2de1-4aa8-4e0a-a007-878ae91443aa"));
}

#[test]
fn test_stale_combo_value_shows_placeholder() {
    let mut page = fixture();
    page.set_value("seller", "0b9c1a7e-5d2f-4e3a-9b8c-7d6e5f4a3b21");
    let tree = render(&page);
    let seller = tree.find_field("seller").expect("seller not rendered");

    match &seller.input {
        FieldInput::Choice { placeholder, invalid, options, .. } => {
            assert_eq!(placeholder.as_deref(), Some(PLACEHOLDER_LABEL));
            assert!(*invalid);
            assert!(options.iter().all(|o| !o.selected));
        }
        other => panic!("expected choice input, got {:?}", other),
    }
    assert_eq!(seller.value, "");
}

#[test]
fn test_radio_without_value_checks_nothing() {
    let page = parse_page(
        r#"{
            "context": "INSERT",
            "controls": [
                {
                    "type": "radio",
                    "label": "Delivery",
                    "property": "delivery",
                    "value": "",
                    "options": { "MAIL": "mail", "COURIER": "courier" }
                }
            ]
        }"#,
    )
    .expect("Parse error");
    let tree = render(&page);
    let delivery = tree.find_field("delivery").expect("delivery not rendered");
    assert!(delivery.selected_option().is_none());
    assert_eq!(delivery.submitted_value(), None);
    assert!(FormData::from_tree(&tree).get("delivery").is_none());
}

#[test]
fn test_tab_keys() {
    let tree = render(&fixture());
    match &tree.nodes[5] {
        RenderNode::Tabs { label, active_key, tabs, .. } => {
            assert_eq!(label, "Details");
            assert_eq!(active_key, "basic-data");
            let keys: Vec<&str> = tabs.iter().map(|t| t.key.as_str()).collect();
            assert_eq!(keys, vec!["basic-data", "internal-notes"]);
            assert!(tabs[1].children.is_empty());
        }
        other => panic!("expected tabs, got {:?}", other),
    }
}

#[test]
fn test_checkbox_value() {
    let mut page = fixture();
    let tree = render(&page);
    let paid = tree.find_field("paid").expect("paid not rendered");
    assert_eq!(paid.label.as_deref(), Some("Paid"));
    assert!(matches!(paid.input, FieldInput::Checkbox { checked: true }));

    page.set_value("paid", "");
    let tree = render(&page);
    let paid = tree.find_field("paid").expect("paid not rendered");
    assert_eq!(paid.value, "false");
    assert_eq!(paid.submitted_value(), None);
}

#[test]
fn test_readonly_page_disables_everything() {
    let mut page = fixture();
    page.context = PageContext::Readonly;
    let tree = render(&page);
    assert!(tree.disabled);
    assert!(tree.fields().iter().all(|f| f.disabled));

    let table = tree.find_table("positions").expect("table not rendered");
    assert!(table.readonly);
    assert!(!table.can_add);
    assert!(FormData::from_tree(&tree).is_empty());
}

#[test]
fn test_render_does_not_modify_page() {
    let page = fixture();
    let before = page.clone();
    let _ = render(&page);
    assert_eq!(page, before);
}

#[test]
fn test_outline() {
    let outline = render(&fixture()).to_string();
    assert!(outline.contains("[Parties]"));
    assert!(outline.contains("<Basic data>*"));
    assert!(outline.contains("# Summary"));
}
