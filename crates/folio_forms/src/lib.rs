pub mod control;
pub mod page;
pub mod value;
pub mod options;
pub mod locator;
pub mod events;
pub mod modal;
pub mod serialization;

pub use control::*;
pub use page::*;
pub use value::*;
pub use options::*;
pub use locator::*;
pub use events::*;
pub use modal::*;
