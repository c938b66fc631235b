use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use folio_forms::{Control, ControlKind};
use log::debug;
use thiserror::Error;

pub const DEFAULT_VALIDATION_MESSAGE: &str = "Custom validation failed";

/// A registered validation function. Receives the normalized input value and
/// returns whether it is valid, or an error when the check itself failed.
pub type ValidationFn = Arc<dyn Fn(&str) -> Result<bool, String> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("{message}")]
    UnknownFunction { function: String, message: String },

    #[error("{message}")]
    Rejected { function: String, message: String },

    #[error("{message} ({cause})")]
    Errored {
        function: String,
        message: String,
        cause: String,
    },
}

impl ValidationFailure {
    pub fn message(&self) -> &str {
        match self {
            ValidationFailure::UnknownFunction { message, .. }
            | ValidationFailure::Rejected { message, .. }
            | ValidationFailure::Errored { message, .. } => message,
        }
    }

    pub fn function(&self) -> &str {
        match self {
            ValidationFailure::UnknownFunction { function, .. }
            | ValidationFailure::Rejected { function, .. }
            | ValidationFailure::Errored { function, .. } => function,
        }
    }
}

/// Table of custom validation functions looked up by dotted name, e.g.
/// `Invoice.checkNip`. Populated by the hosting application at startup.
#[derive(Clone)]
pub struct ValidatorRegistry {
    functions: HashMap<String, ValidationFn>,
    radix_point: char,
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self {
            functions: HashMap::new(),
            radix_point: ',',
        }
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("ValidatorRegistry")
            .field("functions", &names)
            .field("radix_point", &self.radix_point)
            .finish()
    }
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_radix_point(mut self, radix_point: char) -> Self {
        self.radix_point = radix_point;
        self
    }

    pub fn radix_point(&self) -> char {
        self.radix_point
    }

    pub fn register<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&str) -> Result<bool, String> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
    }

    /// Value as handed to validation functions: money inputs get `.` as
    /// decimal separator.
    pub fn normalize(&self, kind: ControlKind, value: &str) -> String {
        if kind == ControlKind::Money {
            value.replace(self.radix_point, ".")
        } else {
            value.to_string()
        }
    }

    /// Runs the custom validation named by `control`, if any.
    ///
    /// Nothing runs when `builtin_valid` is false, the built-in message stays.
    pub fn run_custom_validation(
        &self,
        control: &Control,
        value: &str,
        builtin_valid: bool,
    ) -> Result<(), ValidationFailure> {
        let Some(custom) = control.field().and_then(|f| f.custom_validation.as_ref()) else {
            return Ok(());
        };
        if !builtin_valid {
            return Ok(());
        }
        let function = custom.function.clone();
        let message = custom
            .message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_VALIDATION_MESSAGE.to_string());

        let Some(check) = self.functions.get(&function) else {
            return Err(ValidationFailure::UnknownFunction { function, message });
        };
        let normalized = self.normalize(control.kind(), value);
        debug!("Running {} on {:?}", function, normalized);

        match panic::catch_unwind(AssertUnwindSafe(|| check(&normalized))) {
            Ok(Ok(true)) => Ok(()),
            Ok(Ok(false)) => Err(ValidationFailure::Rejected { function, message }),
            Ok(Err(cause)) => Err(ValidationFailure::Errored {
                function,
                message,
                cause,
            }),
            Err(_) => Err(ValidationFailure::Errored {
                function,
                message,
                cause: "validation function panicked".to_string(),
            }),
        }
    }
}
