use std::fmt;

use folio_forms::ControlKind;
use serde::Serialize;

/// Output of a render pass: the concrete controls of one property page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ControlTree {
    /// Whole tree is non-interactive (READONLY page).
    pub disabled: bool,
    pub nodes: Vec<RenderNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "camelCase")]
pub enum RenderNode {
    Heading { id: String, text: String },
    Separator { id: String },
    Columns { id: String, columns: Vec<Vec<RenderNode>> },
    Group { id: String, legend: String, children: Vec<RenderNode> },
    #[serde(rename_all = "camelCase")]
    Tabs { id: String, label: String, active_key: String, tabs: Vec<TabPane> },
    Table(TableNode),
    Field(FieldNode),
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabPane {
    pub id: String,
    pub name: String,
    pub key: String,
    pub children: Vec<RenderNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableNode {
    pub id: String,
    pub property: String,
    pub caption: String,
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
    pub can_add: bool,
    pub readonly: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    /// 1-based row number shown in the first column.
    pub number: usize,
    pub cells: Vec<FieldNode>,
    pub removable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldNode {
    pub id: String,
    /// Property path the value is written back to, e.g. `positions[0].unitPrice`.
    pub name: String,
    pub kind: ControlKind,
    pub label: Option<String>,
    pub value: String,
    pub required: bool,
    pub readonly: bool,
    /// Disabled inputs neither validate nor contribute to form data.
    pub disabled: bool,
    pub input: FieldInput,
}

impl FieldNode {
    /// Value submitted for this field, `None` when the field contributes
    /// nothing (unchecked checkbox, radio without a checked option).
    pub fn submitted_value(&self) -> Option<&str> {
        match &self.input {
            FieldInput::Checkbox { checked } => checked.then_some(self.value.as_str()),
            FieldInput::Choice { radio: true, options, .. } => {
                options.iter().find(|o| o.selected).map(|o| o.key.as_str())
            }
            _ => Some(&self.value),
        }
    }

    pub fn selected_option(&self) -> Option<&ChoiceOption> {
        match &self.input {
            FieldInput::Choice { options, .. } => options.iter().find(|o| o.selected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "input", rename_all = "camelCase")]
pub enum FieldInput {
    #[serde(rename_all = "camelCase")]
    Text {
        email: bool,
        pattern: Option<String>,
        min_length: Option<usize>,
        max_length: Option<usize>,
    },
    #[serde(rename_all = "camelCase")]
    TextArea {
        rows: Option<u32>,
        cols: Option<u32>,
        min_length: Option<usize>,
        max_length: Option<usize>,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
    },
    Date {
        datetime: bool,
        min: Option<String>,
        max: Option<String>,
        step: Option<f64>,
    },
    Money { currency: Option<String> },
    Choice {
        radio: bool,
        options: Vec<ChoiceOption>,
        /// Sentinel entry shown when the stored value is not selectable.
        placeholder: Option<String>,
        invalid: bool,
    },
    Checkbox { checked: bool },
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceOption {
    pub key: String,
    pub label: String,
    pub selected: bool,
}

impl ControlTree {
    pub fn fields(&self) -> Vec<&FieldNode> {
        let mut out = Vec::new();
        collect_fields(&self.nodes, &mut out);
        out
    }

    /// Rendered field named `name`. Controls omitted by visibility rules are
    /// never found.
    pub fn find_field(&self, name: &str) -> Option<&FieldNode> {
        self.fields().into_iter().find(|f| f.name == name)
    }

    pub fn find_table(&self, property: &str) -> Option<&TableNode> {
        find_table(&self.nodes, property)
    }
}

fn collect_fields<'a>(nodes: &'a [RenderNode], out: &mut Vec<&'a FieldNode>) {
    for node in nodes {
        match node {
            RenderNode::Columns { columns, .. } => columns.iter().for_each(|c| collect_fields(c, out)),
            RenderNode::Group { children, .. } => collect_fields(children, out),
            RenderNode::Tabs { tabs, .. } => tabs.iter().for_each(|t| collect_fields(&t.children, out)),
            RenderNode::Table(table) => table.rows.iter().for_each(|row| out.extend(row.cells.iter())),
            RenderNode::Field(field) => out.push(field),
            RenderNode::Heading { .. } | RenderNode::Separator { .. } | RenderNode::Unsupported => {}
        }
    }
}

fn find_table<'a>(nodes: &'a [RenderNode], property: &str) -> Option<&'a TableNode> {
    nodes.iter().find_map(|node| match node {
        RenderNode::Columns { columns, .. } => columns.iter().find_map(|c| find_table(c, property)),
        RenderNode::Group { children, .. } => find_table(children, property),
        RenderNode::Tabs { tabs, .. } => tabs.iter().find_map(|t| find_table(&t.children, property)),
        RenderNode::Table(table) if table.property == property => Some(table),
        _ => None,
    })
}

// Indented outline, one line per node
impl fmt::Display for ControlTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.disabled {
            writeln!(f, "[disabled]")?;
        }
        write_nodes(f, &self.nodes, 0)
    }
}

fn write_nodes(f: &mut fmt::Formatter<'_>, nodes: &[RenderNode], depth: usize) -> fmt::Result {
    for node in nodes {
        write_node(f, node, depth)?;
    }
    Ok(())
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &RenderNode, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    match node {
        RenderNode::Heading { text, .. } => writeln!(f, "{indent}# {text}"),
        RenderNode::Separator { .. } => writeln!(f, "{indent}---"),
        RenderNode::Columns { columns, .. } => {
            for (i, column) in columns.iter().enumerate() {
                writeln!(f, "{indent}column {}", i + 1)?;
                write_nodes(f, column, depth + 1)?;
            }
            Ok(())
        }
        RenderNode::Group { legend, children, .. } => {
            writeln!(f, "{indent}[{legend}]")?;
            write_nodes(f, children, depth + 1)
        }
        RenderNode::Tabs { label, tabs, active_key, .. } => {
            writeln!(f, "{indent}tabs {label}")?;
            for tab in tabs {
                let marker = if tab.key == *active_key { "*" } else { "" };
                writeln!(f, "{indent}  <{}>{marker}", tab.name)?;
                write_nodes(f, &tab.children, depth + 2)?;
            }
            Ok(())
        }
        RenderNode::Table(table) => {
            writeln!(f, "{indent}table {} | {}", table.caption, table.headers.join(" | "))?;
            for row in &table.rows {
                let cells: Vec<&str> = row.cells.iter().map(|c| c.value.as_str()).collect();
                writeln!(f, "{indent}  {}. {}", row.number, cells.join(" | "))?;
            }
            Ok(())
        }
        RenderNode::Field(field) => write_field(f, field, &indent),
        RenderNode::Unsupported => writeln!(f, "{indent}(unsupported control)"),
    }
}

fn write_field(f: &mut fmt::Formatter<'_>, field: &FieldNode, indent: &str) -> fmt::Result {
    let label = field.label.as_deref().unwrap_or("");
    let mut flags = Vec::new();
    if field.readonly {
        flags.push("readonly");
    }
    if field.disabled {
        flags.push("disabled");
    }
    if matches!(field.input, FieldInput::Choice { invalid: true, .. }) {
        flags.push("invalid");
    }
    let shown = match field.selected_option() {
        Some(option) => format!("{} ({})", option.label, option.key),
        None => field.value.clone(),
    };
    write!(f, "{indent}{} {}: {label} = {shown:?}", field.kind.as_str(), field.name)?;
    if !flags.is_empty() {
        write!(f, " [{}]", flags.join(", "))?;
    }
    writeln!(f)
}
