use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::options::OptionMap;
use crate::value::FieldValue;

/// Page context a property page is rendered in. Decides which constraint
/// rules apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageContext {
    #[default]
    Insert,
    Edit,
    Readonly,
}

impl PageContext {
    pub fn as_str(&self) -> &str {
        match self {
            PageContext::Insert => "INSERT",
            PageContext::Edit => "EDIT",
            PageContext::Readonly => "READONLY",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contexts: Option<Vec<PageContext>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<serde_json::Value>,
}

impl Constraint {
    /// True when the rule lists contexts and the given one is not among them.
    /// An empty list excludes nothing.
    pub fn excludes(&self, context: PageContext) -> bool {
        match &self.contexts {
            Some(contexts) => !contexts.is_empty() && !contexts.contains(&context),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Constraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement: Option<Constraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiable: Option<Constraint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomValidation {
    pub function: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyField {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
    pub property: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: FieldValue,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_validation: Option<CustomValidation>,
}

impl PropertyField {
    pub fn new(property: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            label: label.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextControl {
    #[serde(flatten)]
    pub field: PropertyField,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAreaControl {
    #[serde(flatten)]
    pub field: PropertyField,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cols: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberControl {
    #[serde(flatten)]
    pub field: PropertyField,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

/// Used for both `date` and `datetime`; bounds are ISO strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateControl {
    #[serde(flatten)]
    pub field: PropertyField,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoneyControl {
    #[serde(flatten)]
    pub field: PropertyField,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSettings {
    #[serde(rename = "type")]
    pub dictionary_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceControl {
    #[serde(flatten)]
    pub field: PropertyField,
    #[serde(default)]
    pub options: OptionMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_settings: Option<LoadSettings>,
    #[serde(default)]
    pub sort_by_label: bool,
}

impl ChoiceControl {
    pub fn presented_options(&self) -> Cow<'_, OptionMap> {
        if self.sort_by_label {
            Cow::Owned(self.options.sorted_by_label())
        } else {
            Cow::Borrowed(&self.options)
        }
    }

    /// True when the options depend on other form values and must be reloaded
    /// whenever the form changes.
    pub fn is_dependent(&self) -> bool {
        self.load_settings
            .as_ref()
            .is_some_and(|settings| settings.qualification.is_some())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelControl {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
    #[serde(default)]
    pub expression: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeparatorControl {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnsControl {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
    #[serde(default)]
    pub controls: Vec<Control>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupControl {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub controls: Vec<Control>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub controls: Vec<Control>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabsControl {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub tabs: Vec<Tab>,
}

/// Repeating-row control. Each entry of `controls` is a column template whose
/// value is a list indexed by row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableControl {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
    pub property: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub size: usize,
    #[serde(default)]
    pub controls: Vec<Control>,
}

impl TableControl {
    /// Appends a row, seeding every column with its kind-specific zero value.
    pub fn add_row(&mut self) {
        for column in &mut self.controls {
            let default = column.kind().row_default();
            if let Some(field) = column.field_mut() {
                field.value.make_list().push(FieldValue::String(default.to_string()));
            }
        }
        self.size += 1;
    }

    /// Removes row `index` from every column. Row 0 is never removable.
    pub fn remove_row(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.size {
            return false;
        }
        for column in &mut self.controls {
            if let Some(field) = column.field_mut() {
                let items = field.value.make_list();
                if index < items.len() {
                    items.remove(index);
                }
            }
        }
        self.size -= 1;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlKind {
    Label,
    Separator,
    Columns,
    Group,
    Tabs,
    Table,
    Text,
    Email,
    TextArea,
    Number,
    Date,
    DateTime,
    Money,
    Combo,
    Radio,
    Checkbox,
    Hidden,
    Unsupported,
}

impl ControlKind {
    pub fn as_str(&self) -> &str {
        match self {
            ControlKind::Label => "label",
            ControlKind::Separator => "separator",
            ControlKind::Columns => "columns",
            ControlKind::Group => "group",
            ControlKind::Tabs => "tabs",
            ControlKind::Table => "table",
            ControlKind::Text => "text",
            ControlKind::Email => "email",
            ControlKind::TextArea => "textarea",
            ControlKind::Number => "number",
            ControlKind::Date => "date",
            ControlKind::DateTime => "datetime",
            ControlKind::Money => "money",
            ControlKind::Combo => "combo",
            ControlKind::Radio => "radio",
            ControlKind::Checkbox => "checkbox",
            ControlKind::Hidden => "hidden",
            ControlKind::Unsupported => "unsupported",
        }
    }

    pub fn row_default(&self) -> &'static str {
        match self {
            ControlKind::Number => "0",
            ControlKind::Money => "0,00",
            _ => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Control {
    Label(LabelControl),
    Separator(SeparatorControl),
    Columns(ColumnsControl),
    Group(GroupControl),
    Tabs(TabsControl),
    Table(TableControl),
    Text(TextControl),
    Email(TextControl),
    Textarea(TextAreaControl),
    Number(NumberControl),
    Date(DateControl),
    Datetime(DateControl),
    Money(MoneyControl),
    Combo(ChoiceControl),
    Radio(ChoiceControl),
    Checkbox(PropertyField),
    Hidden(PropertyField),
    #[serde(other)]
    Unsupported,
}

impl Control {
    pub fn kind(&self) -> ControlKind {
        match self {
            Control::Label(_) => ControlKind::Label,
            Control::Separator(_) => ControlKind::Separator,
            Control::Columns(_) => ControlKind::Columns,
            Control::Group(_) => ControlKind::Group,
            Control::Tabs(_) => ControlKind::Tabs,
            Control::Table(_) => ControlKind::Table,
            Control::Text(_) => ControlKind::Text,
            Control::Email(_) => ControlKind::Email,
            Control::Textarea(_) => ControlKind::TextArea,
            Control::Number(_) => ControlKind::Number,
            Control::Date(_) => ControlKind::Date,
            Control::Datetime(_) => ControlKind::DateTime,
            Control::Money(_) => ControlKind::Money,
            Control::Combo(_) => ControlKind::Combo,
            Control::Radio(_) => ControlKind::Radio,
            Control::Checkbox(_) => ControlKind::Checkbox,
            Control::Hidden(_) => ControlKind::Hidden,
            Control::Unsupported => ControlKind::Unsupported,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Control::Label(c) => &c.id,
            Control::Separator(c) => &c.id,
            Control::Columns(c) => &c.id,
            Control::Group(c) => &c.id,
            Control::Tabs(c) => &c.id,
            Control::Table(c) => &c.id,
            Control::Unsupported => "",
            leaf => leaf.field().map(|f| f.id.as_str()).unwrap_or(""),
        }
    }

    pub fn constraints(&self) -> Option<&Constraints> {
        match self {
            Control::Label(c) => c.constraints.as_ref(),
            Control::Separator(c) => c.constraints.as_ref(),
            Control::Columns(c) => c.constraints.as_ref(),
            Control::Group(c) => c.constraints.as_ref(),
            Control::Tabs(c) => c.constraints.as_ref(),
            Control::Table(c) => c.constraints.as_ref(),
            Control::Unsupported => None,
            leaf => leaf.field().and_then(|f| f.constraints.as_ref()),
        }
    }

    pub fn field(&self) -> Option<&PropertyField> {
        match self {
            Control::Text(c) | Control::Email(c) => Some(&c.field),
            Control::Textarea(c) => Some(&c.field),
            Control::Number(c) => Some(&c.field),
            Control::Date(c) | Control::Datetime(c) => Some(&c.field),
            Control::Money(c) => Some(&c.field),
            Control::Combo(c) | Control::Radio(c) => Some(&c.field),
            Control::Checkbox(f) | Control::Hidden(f) => Some(f),
            Control::Label(_)
            | Control::Separator(_)
            | Control::Columns(_)
            | Control::Group(_)
            | Control::Tabs(_)
            | Control::Table(_)
            | Control::Unsupported => None,
        }
    }

    pub fn field_mut(&mut self) -> Option<&mut PropertyField> {
        match self {
            Control::Text(c) | Control::Email(c) => Some(&mut c.field),
            Control::Textarea(c) => Some(&mut c.field),
            Control::Number(c) => Some(&mut c.field),
            Control::Date(c) | Control::Datetime(c) => Some(&mut c.field),
            Control::Money(c) => Some(&mut c.field),
            Control::Combo(c) | Control::Radio(c) => Some(&mut c.field),
            Control::Checkbox(f) | Control::Hidden(f) => Some(f),
            Control::Label(_)
            | Control::Separator(_)
            | Control::Columns(_)
            | Control::Group(_)
            | Control::Tabs(_)
            | Control::Table(_)
            | Control::Unsupported => None,
        }
    }

    pub fn as_choice(&self) -> Option<&ChoiceControl> {
        match self {
            Control::Combo(c) | Control::Radio(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_choice_mut(&mut self) -> Option<&mut ChoiceControl> {
        match self {
            Control::Combo(c) | Control::Radio(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableControl> {
        match self {
            Control::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut TableControl> {
        match self {
            Control::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn property(&self) -> Option<&str> {
        match self {
            Control::Table(t) => Some(&t.property),
            other => other.field().map(|f| f.property.as_str()),
        }
    }
}

/// Kebab-case key derived from a display name, e.g. `Basic data` -> `basic-data`.
pub fn to_kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut previous_lower = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if ch.is_uppercase() && previous_lower && !out.ends_with('-') {
                out.push('-');
            }
            out.extend(ch.to_lowercase());
            previous_lower = ch.is_lowercase() || ch.is_numeric();
        } else {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            previous_lower = false;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
