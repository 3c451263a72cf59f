//! # crudhub-api
//!
//! HTTP layer for CrudHub built on Axum.
//!
//! Mounts the five actions of a [`CrudController`](crudhub_controller::CrudController)
//! on a router, extracts [`CrudRequest`](crudhub_core::types::CrudRequest)s
//! from incoming requests, keeps a session cookie for flash messages, and maps
//! action outcomes and errors to HTTP responses.

pub mod error;
pub mod extractors;
pub mod response;
pub mod router;

pub use error::{ApiError, ApiErrorResponse};
pub use extractors::{HttpCrudRequest, Session};
pub use response::HttpCrudResponse;
pub use router::{CrudState, crud_router};
