use folio_forms::{
    ChoiceControl, Control, ControlKind, FieldValue, PropertyField, PropertyPageConfig, Selection, TableControl,
    TabsControl, to_kebab_case,
};
use folio_runtime::{ConstraintResolver, FieldFlags};
use log::debug;

use crate::tree::{ChoiceOption, ControlTree, FieldInput, FieldNode, RenderNode, TabPane, TableNode, TableRow};

pub const PLACEHOLDER_LABEL: &str = "Please select a valid value";

/// Builds the concrete control tree for `page`. Constraint rules are
/// evaluated against the current values; the page itself is not modified.
pub fn render(page: &PropertyPageConfig) -> ControlTree {
    let renderer = Renderer {
        page_readonly: page.is_readonly(),
        resolver: ConstraintResolver::new(page),
    };
    ControlTree {
        disabled: page.is_readonly(),
        nodes: renderer.nodes(&page.controls),
    }
}

struct Renderer<'a> {
    page_readonly: bool,
    resolver: ConstraintResolver<'a>,
}

/// Table cell coordinates of a field.
struct Cell<'a> {
    table: &'a str,
    row: usize,
}

impl Renderer<'_> {
    fn nodes(&self, controls: &[Control]) -> Vec<RenderNode> {
        controls.iter().filter_map(|c| self.node(c)).collect()
    }

    fn node(&self, control: &Control) -> Option<RenderNode> {
        if !self.resolver.is_visible(control.constraints()) {
            debug!("Omitting hidden {} {}", control.kind().as_str(), control.id());
            return None;
        }
        let node = match control {
            Control::Label(label) => RenderNode::Heading {
                id: label.id.clone(),
                text: label.expression.clone(),
            },
            Control::Separator(separator) => RenderNode::Separator { id: separator.id.clone() },
            Control::Columns(columns) => RenderNode::Columns {
                id: columns.id.clone(),
                columns: columns
                    .controls
                    .iter()
                    .map(|c| self.node(c).into_iter().collect())
                    .collect(),
            },
            Control::Group(group) => RenderNode::Group {
                id: group.id.clone(),
                legend: group.name.clone(),
                children: self.nodes(&group.controls),
            },
            Control::Tabs(tabs) => self.tabs(tabs),
            Control::Table(table) => RenderNode::Table(self.table(table)),
            Control::Unsupported => RenderNode::Unsupported,
            leaf => {
                let field = leaf.field()?;
                let flags = self
                    .resolver
                    .field_flags(leaf.constraints(), field.required, field.readonly);
                RenderNode::Field(self.field(leaf, field, &field.value, flags, None))
            }
        };
        Some(node)
    }

    fn tabs(&self, tabs: &TabsControl) -> RenderNode {
        let panes: Vec<TabPane> = tabs
            .tabs
            .iter()
            .map(|tab| TabPane {
                id: tab.id.clone(),
                name: tab.name.clone(),
                key: to_kebab_case(&tab.name),
                children: self.nodes(&tab.controls),
            })
            .collect();
        RenderNode::Tabs {
            id: tabs.id.clone(),
            label: tabs.label.clone(),
            active_key: panes.first().map(|p| p.key.clone()).unwrap_or_default(),
            tabs: panes,
        }
    }

    fn table(&self, table: &TableControl) -> TableNode {
        let readonly = self.page_readonly || table.readonly;
        let headers = table
            .controls
            .iter()
            .filter_map(Control::field)
            .map(|f| f.label.clone())
            .collect();
        let rows = (0..table.size)
            .map(|row| TableRow {
                number: row + 1,
                cells: table
                    .controls
                    .iter()
                    .filter_map(|column| self.cell(table, column, row, readonly))
                    .collect(),
                removable: !readonly && row != 0,
            })
            .collect();
        TableNode {
            id: table.id.clone(),
            property: table.property.clone(),
            caption: with_marker(&table.label, table.required),
            headers,
            rows,
            can_add: !readonly,
            readonly,
        }
    }

    fn cell(&self, table: &TableControl, column: &Control, row: usize, table_readonly: bool) -> Option<FieldNode> {
        let field = column.field()?;
        let value = field.value.item(row).cloned().unwrap_or_default();
        let readonly = table_readonly || field.readonly;
        let flags = FieldFlags {
            required: field.required && !readonly,
            readonly,
        };
        let cell = Cell {
            table: &table.property,
            row,
        };
        Some(self.field(column, field, &value, flags, Some(cell)))
    }

    fn field(
        &self,
        control: &Control,
        field: &PropertyField,
        value: &FieldValue,
        flags: FieldFlags,
        cell: Option<Cell<'_>>,
    ) -> FieldNode {
        let kind = control.kind();
        let (id, name) = match &cell {
            Some(Cell { table, row }) => (
                format!("{table}{row}.{}", field.property),
                format!("{table}[{row}].{}", field.property),
            ),
            None => (field.property.clone(), field.property.clone()),
        };
        let label = match kind {
            ControlKind::Hidden => None,
            _ if cell.is_some() => None,
            _ => Some(with_marker(&field.label, flags.required)),
        };

        let mut text = value.to_form_string();
        let input = match control {
            Control::Text(c) | Control::Email(c) => FieldInput::Text {
                email: kind == ControlKind::Email,
                pattern: c.pattern.clone(),
                min_length: c.min_length,
                max_length: c.max_length,
            },
            Control::Textarea(c) => FieldInput::TextArea {
                rows: c.rows,
                cols: c.cols,
                min_length: c.min_length,
                max_length: c.max_length,
            },
            Control::Number(c) => FieldInput::Number {
                min: c.min,
                max: c.max,
                step: c.step,
            },
            Control::Date(c) | Control::Datetime(c) => FieldInput::Date {
                datetime: kind == ControlKind::DateTime,
                min: c.min.clone(),
                max: c.max.clone(),
                step: c.step,
            },
            Control::Money(c) => FieldInput::Money {
                currency: c.currency.clone(),
            },
            Control::Combo(c) | Control::Radio(c) => {
                let (input, selected) = choice(c, kind == ControlKind::Radio, value);
                text = selected;
                input
            }
            Control::Checkbox(_) => {
                let checked = text == "true";
                text = checked.to_string();
                FieldInput::Checkbox { checked }
            }
            _ => FieldInput::Hidden,
        };

        FieldNode {
            id,
            name,
            kind,
            label,
            value: text,
            required: flags.required,
            readonly: flags.readonly,
            disabled: self.page_readonly || (flags.readonly && kind != ControlKind::Hidden),
            input,
        }
    }
}

/// Choice input and the key it submits.
///
/// A stored key missing from the dictionary selects a placeholder and marks
/// the field invalid. An empty combo defaults to its first option; an empty
/// radio group has nothing checked.
fn choice(control: &ChoiceControl, radio: bool, value: &FieldValue) -> (FieldInput, String) {
    let options = control.presented_options();
    let selection = Selection::resolve(&options, Some(value));
    let (selected, placeholder) = match &selection {
        Selection::Matched { key, .. } => (Some(key.to_string()), false),
        Selection::Defaulted { key, .. } if !radio => (Some(key.to_string()), false),
        Selection::Defaulted { .. } => (None, false),
        Selection::Deprecated(stored) => {
            debug!("Stored value {:?} of {} is not in the dictionary", stored, control.field.property);
            (None, true)
        }
        Selection::Empty => (None, !radio),
    };

    let options = options
        .iter()
        .map(|(key, label)| ChoiceOption {
            key: key.to_string(),
            label: label.to_string(),
            selected: selected.as_deref() == Some(key),
        })
        .collect();
    let input = FieldInput::Choice {
        radio,
        options,
        placeholder: placeholder.then(|| PLACEHOLDER_LABEL.to_string()),
        invalid: placeholder,
    };
    (input, selected.unwrap_or_default())
}

fn with_marker(label: &str, required: bool) -> String {
    if required {
        format!("{label}*")
    } else {
        label.to_string()
    }
}
