use std::sync::LazyLock;

use regex::Regex;

use crate::control::{Control, LoadSettings};

static TABLE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^\[\]]+)\[(\d+)\]\.(.+)$").expect("table path pattern is valid")
});

/// One step from a control list into a nested control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Child `n` of a root list, group, columns or table.
    Child(usize),
    /// Control `child` of tab `tab` of a tabs control.
    Tab { tab: usize, child: usize },
}

/// Structural address of a control inside a page, used to mutate it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlAddress(Vec<Step>);

impl ControlAddress {
    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    fn with(&self, step: Step) -> ControlAddress {
        let mut steps = self.0.clone();
        steps.push(step);
        ControlAddress(steps)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoundControl<'a> {
    pub control: &'a Control,
    /// Row number when the control was found as a table column.
    pub index: Option<usize>,
    pub address: ControlAddress,
    /// JSONPath-like descriptor of the addressed value slot.
    pub value_path: String,
}

/// Finds the control owning `path` among `roots`, depth first in document
/// order. Table cells are addressed as `table[row].column`; a row outside the
/// column values is reported as not found.
pub fn locate<'a>(path: &str, roots: &'a [Control]) -> Option<FoundControl<'a>> {
    let table_ref = TABLE_PATH.captures(path).and_then(|caps| {
        let row = caps[2].parse::<usize>().ok()?;
        Some(TableRef {
            table: caps[1].to_string(),
            row,
            column: caps[3].to_string(),
        })
    });
    search(path, table_ref.as_ref(), root_nodes(roots))
}

struct TableRef {
    table: String,
    row: usize,
    column: String,
}

struct Node<'a> {
    address: ControlAddress,
    json_path: String,
    control: &'a Control,
}

fn root_nodes(roots: &[Control]) -> Vec<Node<'_>> {
    list_nodes(roots, &ControlAddress::default(), "$")
}

fn list_nodes<'a>(controls: &'a [Control], parent: &ControlAddress, parent_path: &str) -> Vec<Node<'a>> {
    controls
        .iter()
        .enumerate()
        .map(|(i, control)| Node {
            address: parent.with(Step::Child(i)),
            json_path: format!("{parent_path}.controls[{i}]"),
            control,
        })
        .collect()
}

fn child_nodes<'a>(node: &Node<'a>) -> Vec<Node<'a>> {
    match node.control {
        Control::Group(group) => list_nodes(&group.controls, &node.address, &node.json_path),
        Control::Columns(columns) => list_nodes(&columns.controls, &node.address, &node.json_path),
        Control::Tabs(tabs) => tabs
            .tabs
            .iter()
            .enumerate()
            .flat_map(|(t, tab)| {
                tab.controls.iter().enumerate().map(move |(j, control)| (t, j, control))
            })
            .map(|(t, j, control)| Node {
                address: node.address.with(Step::Tab { tab: t, child: j }),
                json_path: format!("{}.tabs[{t}].controls[{j}]", node.json_path),
                control,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn search<'a>(path: &str, table_ref: Option<&TableRef>, nodes: Vec<Node<'a>>) -> Option<FoundControl<'a>> {
    for node in nodes {
        match node.control {
            Control::Group(_) | Control::Columns(_) | Control::Tabs(_) => {
                if let Some(found) = search(path, table_ref, child_nodes(&node)) {
                    return Some(found);
                }
            }
            Control::Table(table) => match table_ref {
                Some(cell) if cell.table == table.property => {
                    let hit = table
                        .controls
                        .iter()
                        .enumerate()
                        .find(|(_, c)| c.field().is_some_and(|f| f.property == cell.column));
                    if let Some((k, column)) = hit {
                        let in_range = column
                            .field()
                            .is_some_and(|f| cell.row < f.value.list_len());
                        if !in_range {
                            return None;
                        }
                        return Some(FoundControl {
                            control: column,
                            index: Some(cell.row),
                            address: node.address.with(Step::Child(k)),
                            value_path: format!("{}.controls[{k}].value[{}]", node.json_path, cell.row),
                        });
                    }
                }
                Some(_) => {}
                None => {
                    if table.property == path {
                        return Some(FoundControl {
                            control: node.control,
                            index: None,
                            address: node.address,
                            value_path: node.json_path,
                        });
                    }
                }
            },
            leaf => {
                if leaf.field().is_some_and(|f| f.property == path) {
                    return Some(FoundControl {
                        control: leaf,
                        index: None,
                        address: node.address,
                        value_path: format!("{}.value", node.json_path),
                    });
                }
            }
        }
    }
    None
}

pub fn control_at_mut<'a>(roots: &'a mut [Control], address: &ControlAddress) -> Option<&'a mut Control> {
    let (first, rest) = address.steps().split_first()?;
    let mut current = match first {
        Step::Child(i) => roots.get_mut(*i)?,
        Step::Tab { .. } => return None,
    };
    for step in rest {
        current = match (current, step) {
            (Control::Group(group), Step::Child(i)) => group.controls.get_mut(*i)?,
            (Control::Columns(columns), Step::Child(i)) => columns.controls.get_mut(*i)?,
            (Control::Table(table), Step::Child(i)) => table.controls.get_mut(*i)?,
            (Control::Tabs(tabs), Step::Tab { tab, child }) => {
                tabs.tabs.get_mut(*tab)?.controls.get_mut(*child)?
            }
            _ => return None,
        };
    }
    Some(current)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryBinding {
    pub property: String,
    pub address: ControlAddress,
    pub settings: LoadSettings,
}

/// All choice controls with a qualified `loadSettings`, in document order.
/// Table column templates are included.
pub fn dependent_dictionaries(roots: &[Control]) -> Vec<DictionaryBinding> {
    let mut out = Vec::new();
    collect_dictionaries(root_nodes(roots), &mut out);
    out
}

fn collect_dictionaries(nodes: Vec<Node<'_>>, out: &mut Vec<DictionaryBinding>) {
    for node in nodes {
        match node.control {
            Control::Group(_) | Control::Columns(_) | Control::Tabs(_) => {
                collect_dictionaries(child_nodes(&node), out)
            }
            Control::Table(table) => {
                collect_dictionaries(list_nodes(&table.controls, &node.address, &node.json_path), out)
            }
            other => {
                let Some(choice) = other.as_choice() else {
                    continue;
                };
                if let (true, Some(settings)) = (choice.is_dependent(), &choice.load_settings) {
                    out.push(DictionaryBinding {
                        property: choice.field.property.clone(),
                        address: node.address,
                        settings: settings.clone(),
                    });
                }
            }
        }
    }
}
