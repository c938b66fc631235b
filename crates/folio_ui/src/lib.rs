pub mod tree;
pub mod render;
pub mod form_data;
pub mod validity;
pub mod session;
pub mod config;
pub mod backend;
pub mod error;
pub mod wizard;

pub use tree::*;
pub use render::{render, PLACEHOLDER_LABEL};
pub use form_data::FormData;
pub use validity::{FieldIssue, ValidityIssue, ValidityReport};
pub use session::PageSession;
pub use config::{ClientConfig, ConfigError};
pub use backend::{BackendError, HttpBackend, ModalBackend};
pub use error::WizardError;
pub use wizard::{ContextSnapshot, PageRequest, SubmitRequest, WizardController, WizardState};
