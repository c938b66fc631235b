pub mod condition;
pub mod evaluator;
pub mod constraints;
pub mod validation;
pub mod event_system;

pub use condition::{Condition, ConditionError, Operator};
pub use evaluator::{evaluate, evaluate_expression, extract_value, is_uuid_v4};
pub use constraints::{ConstraintResolver, FieldFlags};
pub use validation::{ValidationFailure, ValidationFn, ValidatorRegistry, DEFAULT_VALIDATION_MESSAGE};
pub use event_system::EventBus;
