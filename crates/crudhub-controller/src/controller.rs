//! The generic CRUD controller.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crudhub_core::error::AppError;
use crudhub_core::result::AppResult;
use crudhub_core::traits::{
    CrudObject, FlashSink, Form, ObjectRepository, RouteParameters, UrlReference,
};
use crudhub_core::types::{
    CrudAction, CrudRequest, CrudResponse, FilterData, FlashKind, ObjectRef, PageRequest,
    Principal, TemplateVars,
};

use crate::definition::{CrudDefinition, PersistHooks};
use crate::services::CrudServices;

/// Template variable holding the flash messages shown by a page.
pub const FLASHES_VAR: &str = "flashes";

/// Assembles the list, create, edit, view and delete actions of one entity
/// on top of the injected capabilities.
#[derive(Debug)]
pub struct CrudController<E: CrudObject> {
    definition: CrudDefinition<E>,
    services: CrudServices<E>,
}

impl<E: CrudObject> Clone for CrudController<E> {
    fn clone(&self) -> Self {
        Self {
            definition: self.definition.clone(),
            services: self.services.clone(),
        }
    }
}

impl<E: CrudObject> CrudController<E> {
    /// Creates a controller.
    pub fn new(definition: CrudDefinition<E>, services: CrudServices<E>) -> Self {
        Self {
            definition,
            services,
        }
    }

    /// The entity definition.
    pub fn definition(&self) -> &CrudDefinition<E> {
        &self.definition
    }

    /// The injected capabilities.
    pub fn services(&self) -> &CrudServices<E> {
        &self.services
    }

    /// Lists objects, optionally restricted by a filter form, one page at a
    /// time.
    pub async fn list_objects(
        &self,
        request: &CrudRequest,
        template_vars: TemplateVars,
    ) -> AppResult<CrudResponse> {
        let principal = request.principal.as_ref();
        self.require_granted(
            CrudAction::List,
            principal,
            None,
            "You need the permission to list entities!",
        )
        .await?;

        let (form_data, form_view) = match self.definition.list_form_type() {
            Some(form_type) => {
                let mut form = self
                    .services
                    .form_factory()?
                    .create_filter(form_type, FilterData::default())?;
                form.handle_request(request)?;
                debug!(
                    entity = %self.definition.name(),
                    submitted = form.is_submitted(),
                    "Bound list filter form"
                );
                let view = serde_json::to_value(form.create_view()?)?;
                (form.into_data(), view)
            }
            None => (FilterData::default(), Value::Null),
        };
        let form_data = form_data.enrich(self.definition.list_form_data_enrich());

        let repository = self.repository()?;
        let filter_repository = repository.filter_query().ok_or_else(|| {
            AppError::configuration(
                "A repo used for list_objects needs to implement: FilterQueryRepository",
            )
        })?;
        let query = filter_repository.query_for_filter(&form_data).await?;

        let page = self.page_request(request);
        let pagination = self
            .services
            .paginator()?
            .paginate(query.as_ref(), page)
            .await?;

        let mut vars = TemplateVars::new();
        vars.insert_value("request", request.to_value());
        vars.insert("pagination", &pagination)?;
        vars.insert_value("form", form_view);
        let vars = self.with_base_vars(vars)?;

        self.render(CrudAction::List, vars.merge(template_vars))
    }

    /// Shows and handles the creation form.
    pub async fn create_object(
        &self,
        request: &CrudRequest,
        flash: &dyn FlashSink,
        template_vars: TemplateVars,
    ) -> AppResult<CrudResponse> {
        let principal = request.principal.as_ref();
        self.require_granted(
            CrudAction::Create,
            principal,
            None,
            "You need the permission to create an object!",
        )
        .await?;

        let object = self.definition.create_object();
        let form_type = self.definition.create_form_type(&object)?;
        let form = self.services.form_factory()?.create(&form_type, object)?;

        self.handle_persist_form(
            CrudAction::Create,
            self.definition.create_hooks(),
            form,
            request,
            flash,
            template_vars,
        )
        .await
    }

    /// Shows and handles the edit form of an existing object.
    pub async fn edit_object(
        &self,
        request: &CrudRequest,
        object: ObjectRef<E>,
        flash: &dyn FlashSink,
        template_vars: TemplateVars,
    ) -> AppResult<CrudResponse> {
        let object = self.resolve(object).await?;
        let principal = request.principal.as_ref();
        self.require_granted(
            CrudAction::Edit,
            principal,
            Some(&object),
            "You need the permission to edit this object!",
        )
        .await?;

        let form_type = self.definition.edit_form_type(&object)?;
        let form = self.services.form_factory()?.create(&form_type, object)?;

        self.handle_persist_form(
            CrudAction::Edit,
            self.definition.edit_hooks(),
            form,
            request,
            flash,
            template_vars,
        )
        .await
    }

    /// Renders a single object.
    pub async fn view_object(
        &self,
        request: &CrudRequest,
        object: ObjectRef<E>,
        template_vars: TemplateVars,
    ) -> AppResult<CrudResponse> {
        let object = self.resolve(object).await?;
        let principal = request.principal.as_ref();
        self.require_granted(
            CrudAction::View,
            principal,
            Some(&object),
            "You need the permission to view this object!",
        )
        .await?;

        let mut vars = TemplateVars::new();
        vars.insert_value("request", request.to_value());
        vars.insert("object", &object)?;
        let vars = self.with_base_vars(vars)?;

        self.render(CrudAction::View, vars.merge(template_vars))
    }

    /// Removes an object and redirects.
    pub async fn delete_object(
        &self,
        request: &CrudRequest,
        object: ObjectRef<E>,
        flash: &dyn FlashSink,
    ) -> AppResult<CrudResponse> {
        let object = self.resolve(object).await?;
        let principal = request.principal.as_ref();
        self.require_granted(
            CrudAction::Delete,
            principal,
            Some(&object),
            "You need the permission to delete this object!",
        )
        .await?;

        let hooks = self.definition.delete_hooks();
        hooks.pre_remove(&object)?;

        let manager = self.services.object_manager(self.definition.object_class())?;
        manager.remove(&object).await?;
        manager.flush().await?;
        info!(
            entity = %self.definition.name(),
            class = %self.definition.object_class(),
            "Removed object"
        );

        hooks.post_flush(&object)?;

        flash.add(
            FlashKind::Success,
            format!("{}.delete.flash.success", self.definition.trans_prefix()),
        );

        let location = match hooks.redirect_url() {
            Some(redirect) => redirect()?,
            None => self.generate_url(CrudAction::List, RouteParameters::new())?,
        };
        Ok(CrudResponse::Redirect { location })
    }

    /// Shared create/edit flow once the form is built.
    async fn handle_persist_form(
        &self,
        action: CrudAction,
        hooks: &PersistHooks<E>,
        mut form: Box<dyn Form<E>>,
        request: &CrudRequest,
        flash: &dyn FlashSink,
        template_vars: TemplateVars,
    ) -> AppResult<CrudResponse> {
        if request.is_post() {
            form.handle_request(request)?;
            if self.is_submitted(form.as_ref(), hooks.button_name())? {
                if form.is_valid() {
                    let mut object = form.into_data();
                    return self.persist(action, hooks, &mut object, flash).await;
                }
                flash.add(
                    FlashKind::Error,
                    format!("{}.{}.flash.error", self.definition.trans_prefix(), action),
                );
            } else {
                debug!(
                    entity = %self.definition.name(),
                    action = %action,
                    "Submit button not clicked, rendering form again"
                );
            }
        }

        let mut vars = TemplateVars::new();
        vars.insert_value("request", request.to_value());
        vars.insert("object", form.data())?;
        vars.insert("form", form.create_view()?)?;
        let flashes = flash.take_pending();
        if !flashes.is_empty() {
            vars.insert(FLASHES_VAR, &flashes)?;
        }
        let vars = self.with_base_vars(vars)?;

        self.render(action, vars.merge(template_vars))
    }

    async fn persist(
        &self,
        action: CrudAction,
        hooks: &PersistHooks<E>,
        object: &mut E,
        flash: &dyn FlashSink,
    ) -> AppResult<CrudResponse> {
        hooks.pre_persist(object)?;

        let manager = self.services.object_manager(self.definition.object_class())?;
        manager.persist(object).await?;
        manager.flush().await?;
        info!(
            entity = %self.definition.name(),
            class = %self.definition.object_class(),
            action = %action,
            "Persisted object"
        );

        hooks.post_flush(object)?;

        flash.add(
            FlashKind::Success,
            format!("{}.{}.flash.success", self.definition.trans_prefix(), action),
        );

        let location = match hooks.redirect_url() {
            Some(redirect) => redirect(object)?,
            None => {
                let id = self.definition.identifier_of(object)?;
                let mut parameters = RouteParameters::new();
                parameters.insert("id".to_string(), id.to_string());
                self.generate_url(CrudAction::Edit, parameters)?
            }
        };
        Ok(CrudResponse::Redirect { location })
    }

    /// A configured button gates submission; otherwise any bound POST counts.
    fn is_submitted(&self, form: &dyn Form<E>, button: Option<&str>) -> AppResult<bool> {
        match button {
            Some(button) => Ok(form.is_submitted() && form.is_clicked(button)?),
            None => Ok(form.is_submitted()),
        }
    }

    async fn require_granted(
        &self,
        action: CrudAction,
        principal: Option<&Principal>,
        subject: Option<&E>,
        message: &str,
    ) -> AppResult<()> {
        let granted = match self.definition.grant_override(action) {
            Some(grant) => grant(principal, subject),
            None => {
                let role = self.definition.role(action);
                self.services.is_granted(principal, &role, subject).await?
            }
        };
        if !granted {
            warn!(
                entity = %self.definition.name(),
                action = %action,
                user = principal.map(|p| p.username.as_str()).unwrap_or("anonymous"),
                "Permission denied"
            );
            return Err(AppError::authorization(message));
        }
        Ok(())
    }

    fn repository(&self) -> AppResult<Arc<dyn ObjectRepository<E>>> {
        let class = self.definition.object_class();
        self.services.object_manager(class)?.repository(class)
    }

    async fn resolve(&self, object: ObjectRef<E>) -> AppResult<E> {
        match object {
            ObjectRef::Loaded(object) => Ok(object),
            ObjectRef::Id(id) => self
                .repository()?
                .find(&id)
                .await?
                .ok_or_else(|| AppError::not_found("There is no object with this id")),
        }
    }

    fn page_request(&self, request: &CrudRequest) -> PageRequest {
        let page = positive_param(request, "page").unwrap_or(1);
        let per_page =
            positive_param(request, "perPage").unwrap_or(self.definition.list_per_page());
        PageRequest::bounded(page, per_page, self.definition.max_per_page())
    }

    fn identifier(&self) -> AppResult<String> {
        let class = self.definition.object_class();
        let metadata = self.services.object_manager(class)?.class_metadata(class)?;
        Ok(metadata.single_identifier()?.to_string())
    }

    /// Append the route, role and naming variables every template receives.
    fn with_base_vars(&self, mut vars: TemplateVars) -> AppResult<TemplateVars> {
        for action in CrudAction::ALL {
            vars.insert_value(format!("{action}Route"), json!(self.definition.route(action)));
        }
        for action in CrudAction::ALL {
            vars.insert_value(format!("{action}Role"), json!(self.definition.role(action)));
        }
        vars.insert_value("identifier", json!(self.identifier()?));
        vars.insert_value("transPrefix", json!(self.definition.trans_prefix()));
        vars.insert_value("objectClass", json!(self.definition.object_class()));
        Ok(vars)
    }

    fn render(&self, action: CrudAction, vars: TemplateVars) -> AppResult<CrudResponse> {
        let template = self.definition.template(action)?;
        let body = self.services.renderer()?.render(&template, &vars)?;
        Ok(CrudResponse::Html { template, body })
    }

    fn generate_url(&self, action: CrudAction, parameters: RouteParameters) -> AppResult<String> {
        self.services.url_generator()?.generate(
            &self.definition.route(action),
            &parameters,
            UrlReference::AbsoluteUrl,
        )
    }
}

fn positive_param(request: &CrudRequest, key: &str) -> Option<u64> {
    request
        .query_param(key)
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
}
