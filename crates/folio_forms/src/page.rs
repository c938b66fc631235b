use serde::{Deserialize, Serialize};

use crate::control::{Control, PageContext};
use crate::locator::{self, ControlAddress, FoundControl};
use crate::options::OptionMap;
use crate::value::FieldValue;

/// Root of a server-supplied property page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyPageConfig {
    #[serde(default)]
    pub context: PageContext,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub controls: Vec<Control>,
}

impl PropertyPageConfig {
    pub fn new(context: PageContext) -> Self {
        Self {
            context,
            size: String::new(),
            controls: Vec::new(),
        }
    }

    pub fn is_readonly(&self) -> bool {
        self.context == PageContext::Readonly
    }

    pub fn locate(&self, path: &str) -> Option<FoundControl<'_>> {
        locator::locate(path, &self.controls)
    }

    pub fn control_at_mut(&mut self, address: &ControlAddress) -> Option<&mut Control> {
        locator::control_at_mut(&mut self.controls, address)
    }

    /// Writes `value` into the slot addressed by `path`. Returns false when
    /// the path does not resolve to a leaf control.
    pub fn set_value(&mut self, path: &str, value: impl Into<FieldValue>) -> bool {
        let Some((address, index)) = self.locate(path).map(|found| (found.address, found.index)) else {
            return false;
        };
        let Some(field) = self.control_at_mut(&address).and_then(Control::field_mut) else {
            return false;
        };
        match index {
            Some(row) => field.value.set_item(row, value.into()),
            None => field.value = value.into(),
        }
        true
    }

    pub fn add_table_row(&mut self, table: &str) -> bool {
        let Some(address) = self.locate(table).map(|found| found.address) else {
            return false;
        };
        match self.control_at_mut(&address).and_then(Control::as_table_mut) {
            Some(table) => {
                table.add_row();
                true
            }
            None => false,
        }
    }

    pub fn remove_table_row(&mut self, table: &str, index: usize) -> bool {
        let Some(address) = self.locate(table).map(|found| found.address) else {
            return false;
        };
        self.control_at_mut(&address)
            .and_then(Control::as_table_mut)
            .is_some_and(|table| table.remove_row(index))
    }

    /// Replaces the options of the choice control at `address`.
    pub fn set_options(&mut self, address: &ControlAddress, options: OptionMap) -> bool {
        match self.control_at_mut(address).and_then(Control::as_choice_mut) {
            Some(choice) => {
                choice.options = options;
                true
            }
            None => false,
        }
    }
}
