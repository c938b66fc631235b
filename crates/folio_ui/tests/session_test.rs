use folio_forms::serialization::load_page;
use folio_forms::{Control, CustomValidation, OptionMap, PageContext, PropertyPageConfig, dependent_dictionaries};
use folio_runtime::ValidatorRegistry;
use folio_ui::{FormData, PageSession, ValidityIssue};
use serde_json::json;

fn session() -> PageSession {
    let page: PropertyPageConfig = load_page("tests/fixtures/property-page.json").expect("Failed to load fixture");
    PageSession::new(page)
}

#[test]
fn test_form_data_skips_disabled_and_hidden_controls() {
    let data = session().form_data();
    assert_eq!(data.get("invoiceNumber"), Some("FV/2023/001"));
    assert_eq!(data.get("positions[0].unitPrice"), Some("150,50"));
    assert_eq!(data.get("positions[0].id"), Some(""));
    assert_eq!(data.get("paid"), Some("true"));
    // readonly total and the invisible notes field contribute nothing
    assert_eq!(data.get("total"), None);
    assert_eq!(data.get("notes"), None);
}

#[test]
fn test_form_data_nests_on_dots_and_indices() {
    let body = session().form_data().to_json();
    assert_eq!(body["payment"]["method"], json!("BANK_TRANSFER"));
    assert_eq!(body["positions"][0]["unit"], json!("HOUR"));
    assert_eq!(body["positions"][0]["quantity"], json!("1"));
    assert_eq!(body["seller"], json!("e4f38c78-74ec-49f6-b6c6-effe4ac633b4"));
}

#[test]
fn test_prefixed_form_data() {
    let data: FormData = vec![("name", "Invoice"), ("positions[1].unit", "HOUR")].into_iter().collect();
    let body = data.prefixed("contextInfo.").to_json();
    assert_eq!(
        body,
        json!({ "contextInfo": { "name": "Invoice", "positions": [null, { "unit": "HOUR" }] } })
    );
}

#[test]
fn test_apply_change_rerenders() {
    let mut session = session();
    assert!(session.tree().find_field("payment.bankAccount").is_some());

    assert!(session.apply_change("payment.method", "CASH"));
    assert!(session.tree().find_field("payment.bankAccount").is_none());
    assert!(!session.tree().find_field("payment.deadline").is_some_and(|f| f.required));
}

#[test]
fn test_apply_change_to_table_cell() {
    let mut session = session();
    assert!(session.apply_change("positions[0].unitPrice", "99,99"));
    assert_eq!(session.form_data().get("positions[0].unitPrice"), Some("99,99"));
}

#[test]
fn test_apply_change_rejects_disabled_and_unknown_fields() {
    let mut session = session();
    assert!(!session.apply_change("total", "1,00"));
    assert!(!session.apply_change("discount", "10"));
    let total = session.page().locate("total").and_then(|f| f.control.field()).expect("total not found");
    assert_eq!(total.value.to_form_string(), "1200,50");
}

#[test]
fn test_apply_change_rejects_invisible_fields() {
    let mut session = session();
    assert!(session.apply_change("payment.method", "CASH"));
    assert!(!session.apply_change("payment.bankAccount", "PL61109010140000071219812874"));
    assert!(!session.apply_change("notes", "internal"));

    let account = session.page().locate("payment.bankAccount").and_then(|f| f.control.field()).expect("account not found");
    assert_eq!(account.value.to_form_string(), "");
}

#[test]
fn test_readonly_page_rejects_changes() {
    let mut page = session().into_page();
    page.context = PageContext::Readonly;
    let mut session = PageSession::new(page);
    assert!(!session.apply_change("invoiceNumber", "FV/2024/002"));
    assert!(!session.add_row("positions"));
}

#[test]
fn test_add_and_remove_rows() {
    let mut session = session();
    assert!(session.add_row("positions"));
    assert!(session.add_row("positions"));
    assert_eq!(session.tree().find_table("positions").map(|t| t.rows.len()), Some(3));

    assert!(!session.remove_row("positions", 0));
    assert!(session.remove_row("positions", 1));
    let table = session.tree().find_table("positions").expect("table not rendered");
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[1].cells[0].name, "positions[1].objectName");
}

#[test]
fn test_set_options_updates_in_one_pass() {
    let mut session = session();
    let bindings = dependent_dictionaries(&session.page().controls);
    assert!(bindings.is_empty());

    let address = session.page().locate("seller").map(|f| f.address).expect("seller not found");
    let options: OptionMap = vec![("d1c8f6a2-3b4e-4f5a-8b6c-7d8e9f0a1b2c", "Adventure Works")].into_iter().collect();
    assert_eq!(session.set_options(vec![(address, options)]), 1);

    let seller = session.tree().find_field("seller").expect("seller not rendered");
    assert_eq!(seller.selected_option().map(|o| o.label.as_str()), Some("Adventure Works"));
}

#[test]
fn test_check_validity_reports_missing_values() {
    let session = session();
    let report = session.check_validity(',');
    assert!(!report.is_valid());
    assert_eq!(report.for_field("issueDate"), Some(&ValidityIssue::ValueMissing));
    assert_eq!(report.for_field("payment.deadline"), Some(&ValidityIssue::ValueMissing));
    assert_eq!(report.issues.len(), 2);
}

#[test]
fn test_validate_runs_custom_functions() {
    let mut page = session().into_page();
    page.set_value("issueDate", "2023-05-01");
    page.set_value("payment.deadline", "2023-06-01");
    let address = page.locate("invoiceNumber").map(|f| f.address).expect("invoiceNumber not found");
    let field = page.control_at_mut(&address).and_then(Control::field_mut).expect("not a leaf");
    field.custom_validation = Some(CustomValidation {
        function: "Invoice.checkYear".to_string(),
        message: Some("Invoice number must be from 2024".to_string()),
    });
    let session = PageSession::new(page);

    let mut registry = ValidatorRegistry::new();
    registry.register("Invoice.checkYear", |value| Ok(value.contains("/2024/")));
    let report = session.validate(&registry);
    assert_eq!(
        report.for_field("invoiceNumber"),
        Some(&ValidityIssue::Custom("Invoice number must be from 2024".to_string()))
    );
    assert_eq!(report.issues.len(), 1);

    // custom functions only run on full validation
    assert!(session.check_validity(',').is_valid());
}
