//! # crudhub-core
//!
//! Core crate for CrudHub. Contains the capability traits a CRUD controller
//! delegates to, configuration schemas, request/response and pagination
//! types, template variable bags, and the unified error system.
//!
//! This crate has **no** internal dependencies on other CrudHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
pub use traits::CrudObject;
