use folio_forms::{Constraint, Constraints, Control, PageContext, PropertyPageConfig};
use log::warn;
use serde_json::Value;

use crate::evaluator::evaluate_expression;

/// Effective flags of a leaf control after constraint resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldFlags {
    pub required: bool,
    pub readonly: bool,
}

/// Applies visibility, modifiable and requirement rules for one page context
/// against the live control values.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintResolver<'a> {
    context: PageContext,
    controls: &'a [Control],
}

impl<'a> ConstraintResolver<'a> {
    pub fn new(page: &'a PropertyPageConfig) -> Self {
        Self::with_context(page.context, &page.controls)
    }

    pub fn with_context(context: PageContext, controls: &'a [Control]) -> Self {
        Self { context, controls }
    }

    pub fn context(&self) -> PageContext {
        self.context
    }

    pub fn is_visible(&self, constraints: Option<&Constraints>) -> bool {
        let Some(rule) = constraints.and_then(|c| c.visibility.as_ref()) else {
            return true;
        };
        !rule.excludes(self.context) && self.holds(rule, true)
    }

    /// Readonly wins over required: a field forced readonly is never required.
    pub fn field_flags(&self, constraints: Option<&Constraints>, required: bool, readonly: bool) -> FieldFlags {
        let forced_readonly = constraints
            .and_then(|c| c.modifiable.as_ref())
            .is_some_and(|rule| rule.excludes(self.context) || !self.holds(rule, true));
        if readonly || forced_readonly {
            return FieldFlags {
                required: false,
                readonly: true,
            };
        }

        let forced_required = constraints
            .and_then(|c| c.requirement.as_ref())
            .is_some_and(|rule| rule.excludes(self.context) || self.holds(rule, false));
        FieldFlags {
            required: required || forced_required,
            readonly: false,
        }
    }

    /// Result of the rule's condition; `absent` when it has none.
    fn holds(&self, rule: &Constraint, absent: bool) -> bool {
        match &rule.conditions {
            None | Some(Value::Null) => absent,
            Some(Value::String(raw)) if raw.trim().is_empty() => absent,
            Some(expression) => match evaluate_expression(expression, self.controls) {
                Ok(result) => result,
                Err(e) => {
                    warn!("Ignoring malformed condition {}: {}", expression, e);
                    false
                }
            },
        }
    }
}
