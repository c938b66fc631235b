use serde::{Deserialize, Serialize};

/// Reference to another repository object, as sent for combo/radio values
/// that point at a stored item instead of a dictionary key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub id: String,
}

/// Current value of a property control.
///
/// Leaf controls carry a scalar, table column templates carry a `List`
/// indexed by row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    List(Vec<FieldValue>),
    Reference(ObjectRef),
}

impl FieldValue {
    pub fn as_list(&self) -> Option<&Vec<FieldValue>> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Key used to match the value against an option map: the string itself,
    /// or the id of a referenced object.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            FieldValue::Reference(r) => Some(&r.id),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::String(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn to_form_string(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::String(s) => s.clone(),
            FieldValue::Reference(r) => r.id.clone(),
            FieldValue::List(items) => items
                .iter()
                .map(FieldValue::to_form_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Row value of a table column. Scalars are treated as a single row.
    pub fn item(&self, index: usize) -> Option<&FieldValue> {
        match self {
            FieldValue::List(items) => items.get(index),
            FieldValue::Null => None,
            other if index == 0 => Some(other),
            _ => None,
        }
    }

    pub fn list_len(&self) -> usize {
        match self {
            FieldValue::List(items) => items.len(),
            FieldValue::Null => 0,
            _ => 1,
        }
    }

    pub fn make_list(&mut self) -> &mut Vec<FieldValue> {
        if !matches!(self, FieldValue::List(_)) {
            let previous = std::mem::take(self);
            *self = match previous {
                FieldValue::Null => FieldValue::List(Vec::new()),
                scalar => FieldValue::List(vec![scalar]),
            };
        }
        match self {
            FieldValue::List(items) => items,
            _ => unreachable!("value was converted to a list above"),
        }
    }

    pub fn set_item(&mut self, index: usize, value: FieldValue) {
        let items = self.make_list();
        if index >= items.len() {
            items.resize(index + 1, FieldValue::String(String::new()));
        }
        items[index] = value;
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        FieldValue::List(items)
    }
}
