//! Capability traits the CRUD controller delegates to.
//!
//! Each trait is implemented by the host application (or by
//! `crudhub-memory` for in-process use) and injected into a controller.

pub mod flash;
pub mod form;
pub mod object;
pub mod pagination;
pub mod persistence;
pub mod render;
pub mod routing;
pub mod security;

pub use flash::FlashSink;
pub use form::{Form, FormFactory};
pub use object::CrudObject;
pub use pagination::Paginator;
pub use persistence::{
    ClassMetadata, FilterQueryRepository, ListQuery, ManagerRegistry, ObjectManager,
    ObjectRepository,
};
pub use render::TemplateRenderer;
pub use routing::{RouteParameters, UrlGenerator, UrlReference};
pub use security::{AuthorizationChecker, SecurityContext};
