//! Core type definitions used across the CrudHub workspace.

pub mod action;
pub mod filter;
pub mod flash;
pub mod form;
pub mod id;
pub mod pagination;
pub mod request;
pub mod response;
pub mod sorting;
pub mod template;

pub use action::CrudAction;
pub use filter::{FilterData, FilterField, FilterOp, FilterValue};
pub use flash::{FlashKind, FlashMessage};
pub use form::{FormType, FormView};
pub use id::{IdentifierValue, ObjectRef};
pub use pagination::{PageRequest, PageResponse};
pub use request::{CrudRequest, Principal};
pub use response::CrudResponse;
pub use sorting::{SortDirection, SortField};
pub use template::TemplateVars;
