use std::cmp::Ordering;

use folio_forms::{Control, FieldValue, Selection, locate};
use serde_json::Value;
use uuid::{Uuid, Variant};

use crate::condition::{Condition, ConditionError, Operator};

pub fn evaluate(condition: &Condition, controls: &[Control]) -> bool {
    match condition {
        Condition::All(items) => items.iter().all(|c| evaluate(c, controls)),
        Condition::Any(items) => items.iter().any(|c| evaluate(c, controls)),
        Condition::Compare { path, op, operand } => {
            compare(extract_value(path, controls).as_ref(), *op, operand)
        }
    }
}

/// Parses and evaluates `expression` against the current control values.
pub fn evaluate_expression(expression: &Value, controls: &[Control]) -> Result<bool, ConditionError> {
    let condition = Condition::parse(expression)?;
    Ok(evaluate(&condition, controls))
}

/// Value a condition compares against for the control at `path`.
///
/// Combo and radio controls yield the selected key, or its label when the
/// key is a UUID v4. Without a matching stored key the first presented option
/// is used. Money values get `.` as decimal separator. A path that does not
/// resolve, or resolves to a whole table, yields `None`.
pub fn extract_value(path: &str, controls: &[Control]) -> Option<FieldValue> {
    let found = locate(path, controls)?;
    let field = found.control.field()?;
    let stored = match found.index {
        Some(row) => field.value.item(row),
        None => Some(&field.value),
    };

    if let Some(choice) = found.control.as_choice() {
        let options = choice.presented_options();
        let selected = match Selection::resolve(&options, stored) {
            Selection::Matched { key, label } => Some((key, label)),
            _ => options.first(),
        };
        let extracted = match selected {
            Some((key, label)) if is_uuid_v4(key) => label,
            Some((key, _)) => key,
            None => "",
        };
        return Some(FieldValue::from(extracted));
    }

    let stored = stored?.clone();
    match (found.control, stored) {
        (Control::Money(_), FieldValue::String(amount)) => Some(FieldValue::String(amount.replace(',', "."))),
        (_, value) => Some(value),
    }
}

pub fn is_uuid_v4(candidate: &str) -> bool {
    candidate.len() == 36
        && Uuid::try_parse(candidate)
            .is_ok_and(|id| id.get_version_num() == 4 && id.get_variant() == Variant::RFC4122)
}

fn compare(actual: Option<&FieldValue>, op: Operator, operand: &Value) -> bool {
    let Some(actual) = actual.filter(|value| !matches!(value, FieldValue::Null)) else {
        let equal = operand.is_null() || operand.as_str() == Some("");
        return match op {
            Operator::Eq => equal,
            Operator::Ne => !equal,
            _ => false,
        };
    };
    match op {
        Operator::Eq => loose_eq(actual, operand),
        Operator::Ne => !loose_eq(actual, operand),
        Operator::Lt => ordering(actual, operand).is_some_and(Ordering::is_lt),
        Operator::Lte => ordering(actual, operand).is_some_and(Ordering::is_le),
        Operator::Gt => ordering(actual, operand).is_some_and(Ordering::is_gt),
        Operator::Gte => ordering(actual, operand).is_some_and(Ordering::is_ge),
    }
}

fn loose_eq(actual: &FieldValue, operand: &Value) -> bool {
    match (actual, operand) {
        (FieldValue::String(s), Value::String(o)) => s == o,
        (FieldValue::String(s), Value::Number(n)) => parse_number(s) == n.as_f64(),
        (FieldValue::String(s), Value::Bool(b)) => s.parse::<bool>().ok() == Some(*b),
        (FieldValue::String(s), Value::Null) => s.is_empty(),
        (FieldValue::Number(x), Value::Number(n)) => n.as_f64() == Some(*x),
        (FieldValue::Number(x), Value::String(o)) => parse_number(o) == Some(*x),
        (FieldValue::Boolean(a), Value::Bool(b)) => a == b,
        (FieldValue::Boolean(a), Value::String(o)) => o.parse::<bool>().ok() == Some(*a),
        (FieldValue::Reference(r), Value::String(o)) => r.id == *o,
        (FieldValue::Reference(r), Value::Object(o)) => o.get("id").and_then(Value::as_str) == Some(r.id.as_str()),
        (FieldValue::List(items), Value::Array(others)) => {
            items.len() == others.len() && items.iter().zip(others).all(|(a, b)| loose_eq(a, b))
        }
        _ => false,
    }
}

/// Total order between a value and a comparand. Numbers compare numerically
/// (numeric strings are coerced), two strings compare lexically.
fn ordering(actual: &FieldValue, operand: &Value) -> Option<Ordering> {
    match (actual, operand) {
        (FieldValue::String(s), Value::String(o)) => Some(s.as_str().cmp(o.as_str())),
        (_, Value::Number(n)) => numeric(actual)?.partial_cmp(&n.as_f64()?),
        (FieldValue::Number(x), Value::String(o)) => x.partial_cmp(&parse_number(o)?),
        _ => None,
    }
}

fn numeric(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Number(n) => Some(*n),
        FieldValue::String(s) => parse_number(s),
        _ => None,
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}
