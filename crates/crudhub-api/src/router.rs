//! Route definitions mounting the CRUD actions of one entity.
//!
//! The paths mirror the ones `RouteUrlGenerator::with_crud_routes` produces,
//! so generated redirect targets land back on these handlers.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use crudhub_controller::{CrudController, FLASHES_VAR};
use crudhub_core::traits::CrudObject;
use crudhub_core::types::{IdentifierValue, ObjectRef, TemplateVars};
use crudhub_memory::FlashStore;

use crate::error::ApiError;
use crate::extractors::{HttpCrudRequest, Session};
use crate::response::HttpCrudResponse;

/// Handler outcome: the session cookie plus the rendered action.
type CrudResult = Result<(CookieJar, HttpCrudResponse), ApiError>;

/// Shared state of the CRUD handlers of one entity.
pub struct CrudState<E: CrudObject> {
    /// The entity's controller.
    pub controller: Arc<CrudController<E>>,
    /// Flash messages of every session.
    pub flashes: Arc<FlashStore>,
}

impl<E: CrudObject> Clone for CrudState<E> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            flashes: Arc::clone(&self.flashes),
        }
    }
}

/// Build a router serving the five actions below `base_path`:
///
/// | Path                 | Method     | Action |
/// |----------------------|------------|--------|
/// | `{base}`             | GET        | list   |
/// | `{base}/new`         | GET, POST  | create |
/// | `{base}/{id}`        | GET        | view   |
/// | `{base}/{id}/edit`   | GET, POST  | edit   |
/// | `{base}/{id}/delete` | POST       | delete |
pub fn crud_router<E: CrudObject>(
    base_path: &str,
    controller: CrudController<E>,
    flashes: Arc<FlashStore>,
) -> Router {
    let base = base_path.trim_end_matches('/');
    let list_path = if base.is_empty() { "/" } else { base };

    let state = CrudState {
        controller: Arc::new(controller),
        flashes,
    };

    Router::new()
        .route(list_path, get(list_objects::<E>))
        .route(
            &format!("{base}/new"),
            get(create_object::<E>).post(create_object::<E>),
        )
        .route(&format!("{base}/{{id}}"), get(view_object::<E>))
        .route(
            &format!("{base}/{{id}}/edit"),
            get(edit_object::<E>).post(edit_object::<E>),
        )
        .route(&format!("{base}/{{id}}/delete"), post(delete_object::<E>))
        .with_state(state)
}

async fn list_objects<E: CrudObject>(
    State(state): State<CrudState<E>>,
    session: Session,
    HttpCrudRequest(request): HttpCrudRequest,
) -> CrudResult {
    let vars = flash_vars(&state, &session);
    let response = state.controller.list_objects(&request, vars).await?;
    Ok((session.into_jar(), response.into()))
}

async fn create_object<E: CrudObject>(
    State(state): State<CrudState<E>>,
    session: Session,
    HttpCrudRequest(request): HttpCrudRequest,
) -> CrudResult {
    let flash = state.flashes.bag(session.id());
    let response = state
        .controller
        .create_object(&request, &flash, TemplateVars::new())
        .await?;
    Ok((session.into_jar(), response.into()))
}

async fn edit_object<E: CrudObject>(
    State(state): State<CrudState<E>>,
    Path(id): Path<String>,
    session: Session,
    HttpCrudRequest(request): HttpCrudRequest,
) -> CrudResult {
    let flash = state.flashes.bag(session.id());
    let response = state
        .controller
        .edit_object(&request, object_ref(&id), &flash, TemplateVars::new())
        .await?;
    Ok((session.into_jar(), response.into()))
}

async fn view_object<E: CrudObject>(
    State(state): State<CrudState<E>>,
    Path(id): Path<String>,
    session: Session,
    HttpCrudRequest(request): HttpCrudRequest,
) -> CrudResult {
    let vars = flash_vars(&state, &session);
    let response = state
        .controller
        .view_object(&request, object_ref(&id), vars)
        .await?;
    Ok((session.into_jar(), response.into()))
}

async fn delete_object<E: CrudObject>(
    State(state): State<CrudState<E>>,
    Path(id): Path<String>,
    session: Session,
    HttpCrudRequest(request): HttpCrudRequest,
) -> CrudResult {
    let flash = state.flashes.bag(session.id());
    let response = state
        .controller
        .delete_object(&request, object_ref(&id), &flash)
        .await?;
    Ok((session.into_jar(), response.into()))
}

/// Consumes the session's pending flash messages into template variables.
///
/// Create and edit read the session bag through their flash sink instead,
/// so a form rendered again after a failed submission shows its own error.
fn flash_vars<E: CrudObject>(state: &CrudState<E>, session: &Session) -> TemplateVars {
    let messages = state.flashes.take(session.id());
    if messages.is_empty() {
        return TemplateVars::new();
    }
    TemplateVars::new().with(FLASHES_VAR, json!(messages))
}

fn object_ref<E>(raw: &str) -> ObjectRef<E> {
    let Ok(id) = raw.parse::<IdentifierValue>();
    ObjectRef::Id(id)
}
