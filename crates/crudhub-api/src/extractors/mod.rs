//! Custom Axum extractors.

pub mod request;
pub mod session;

pub use request::HttpCrudRequest;
pub use session::Session;
