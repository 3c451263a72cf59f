//! # crudhub-memory
//!
//! In-process implementations of every CrudHub capability: role based
//! authorization, a unit-of-work object store with filterable
//! repositories, a query paginator, a route table URL generator, JSON bound
//! forms validated with `validator`, a JSON template renderer, and a
//! session keyed flash store.

pub mod flash;
pub mod form;
pub mod paginator;
pub mod render;
pub mod routing;
pub mod security;
pub mod store;

pub use flash::{FlashBag, FlashStore};
pub use form::{JsonForm, JsonFormFactory};
pub use paginator::QueryPaginator;
pub use render::JsonTemplateRenderer;
pub use routing::RouteUrlGenerator;
pub use security::RoleAuthorizationChecker;
pub use store::{MemoryObjectManager, MemoryRegistry, MemoryRepository, MemoryStore};
