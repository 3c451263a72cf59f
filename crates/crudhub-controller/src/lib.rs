//! # crudhub-controller
//!
//! The generic CRUD controller. A [`CrudController`] pairs a
//! [`CrudDefinition`] (names, form types, hooks, redirect overrides) with a
//! set of [`CrudServices`] and exposes the five actions: list, create, edit,
//! view and delete.

pub mod controller;
pub mod definition;
pub mod naming;
pub mod services;

pub use controller::{CrudController, FLASHES_VAR};
pub use definition::{CrudDefinition, CrudDefinitionBuilder};
pub use services::CrudServices;
