use folio_forms::{ControlAddress, FieldValue, OptionMap, PropertyPageConfig};
use folio_runtime::ValidatorRegistry;
use log::debug;

use crate::form_data::FormData;
use crate::render::render;
use crate::tree::ControlTree;
use crate::validity::{self, ValidityIssue, ValidityReport};

/// A displayed property page together with its current render.
///
/// Every mutation goes through the locator and is followed by a fresh render
/// pass, so the tree never shows a partially applied change.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSession {
    page: PropertyPageConfig,
    tree: ControlTree,
}

impl PageSession {
    pub fn new(page: PropertyPageConfig) -> Self {
        let tree = render(&page);
        Self { page, tree }
    }

    pub fn page(&self) -> &PropertyPageConfig {
        &self.page
    }

    pub fn tree(&self) -> &ControlTree {
        &self.tree
    }

    pub fn into_page(self) -> PropertyPageConfig {
        self.page
    }

    /// Applies a value change dispatched by the input named `name`. Only
    /// rendered, enabled inputs accept changes.
    pub fn apply_change(&mut self, name: &str, value: impl Into<FieldValue>) -> bool {
        match self.tree.find_field(name) {
            None => {
                debug!("No rendered input named {}", name);
                return false;
            }
            Some(field) if field.disabled => {
                debug!("Ignoring change of disabled field {}", name);
                return false;
            }
            Some(_) => {}
        }
        if !self.page.set_value(name, value) {
            debug!("No control owns {}", name);
            return false;
        }
        self.refresh();
        true
    }

    pub fn add_row(&mut self, table: &str) -> bool {
        if self.tree.find_table(table).is_some_and(|t| !t.can_add) {
            return false;
        }
        let added = self.page.add_table_row(table);
        if added {
            self.refresh();
        }
        added
    }

    pub fn remove_row(&mut self, table: &str, index: usize) -> bool {
        let removable = self
            .tree
            .find_table(table)
            .and_then(|t| t.rows.get(index))
            .is_some_and(|row| row.removable);
        if !removable {
            return false;
        }
        let removed = self.page.remove_table_row(table, index);
        if removed {
            self.refresh();
        }
        removed
    }

    pub fn set_options(&mut self, updates: Vec<(ControlAddress, OptionMap)>) -> usize {
        let applied = updates
            .into_iter()
            .filter(|(address, options)| self.page.set_options(address, options.clone()))
            .count();
        if applied > 0 {
            self.refresh();
        }
        applied
    }

    pub fn replace_page(&mut self, page: PropertyPageConfig) {
        self.page = page;
        self.refresh();
    }

    pub fn form_data(&self) -> FormData {
        FormData::from_tree(&self.tree)
    }

    pub fn check_validity(&self, radix_point: char) -> ValidityReport {
        validity::check_tree(&self.tree, radix_point)
    }

    /// Built-in validity plus every custom validation function named by the
    /// rendered fields.
    pub fn validate(&self, registry: &ValidatorRegistry) -> ValidityReport {
        let mut report = ValidityReport::default();
        for field in self.tree.fields() {
            let builtin = validity::check_field(field, registry.radix_point());
            let custom = if field.disabled || field.readonly {
                None
            } else {
                self.page.locate(&field.name).and_then(|found| {
                    registry
                        .run_custom_validation(found.control, &field.value, builtin.is_none())
                        .err()
                })
            };
            if let Some(issue) = builtin {
                report.push(field.name.clone(), issue);
            } else if let Some(failure) = custom {
                report.push(field.name.clone(), ValidityIssue::Custom(failure.message().to_string()));
            }
        }
        report
    }

    fn refresh(&mut self) {
        self.tree = render(&self.page);
    }
}
