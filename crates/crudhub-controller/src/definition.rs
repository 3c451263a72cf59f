//! Per-entity controller definition: names, form types, hooks, overrides.
//!
//! A [`CrudDefinition`] is the explicit record of everything a concrete
//! controller customizes. Only the entity name and the object class are
//! required up front; every other hook has a documented default, and hooks
//! without a sensible default (form types, the template pattern, the
//! identifier accessor) fail with a configuration error the first time an
//! action needs them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crudhub_core::config::crud::{
    CrudConfig, DEFAULT_MAX_PER_PAGE, DEFAULT_PER_PAGE, DEFAULT_ROLE_PATTERN,
    DEFAULT_ROUTE_PATTERN,
};
use crudhub_core::error::AppError;
use crudhub_core::result::AppResult;
use crudhub_core::traits::CrudObject;
use crudhub_core::types::{CrudAction, FilterData, FormType, IdentifierValue, Principal};

use crate::naming::{camel_case_to_underscore, format_pattern, ucfirst};

/// Example shown when a rendering action runs without a template pattern.
pub const TEMPLATE_PATTERN_EXAMPLE: &str = "@SaxulumCrud/%s/%s.html.twig";

/// Builds a new object for the create action.
pub type FactoryFn<E> = Arc<dyn Fn() -> E + Send + Sync>;
/// Chooses the form type for an object.
pub type FormTypeFn<E> = Arc<dyn Fn(&E) -> FormType + Send + Sync>;
/// Runs before an object is staged; may modify it.
pub type PrePersistHook<E> = Arc<dyn Fn(&mut E) -> AppResult<()> + Send + Sync>;
/// Runs around removal or after a flush.
pub type ObjectHook<E> = Arc<dyn Fn(&E) -> AppResult<()> + Send + Sync>;
/// Computes the redirect target after persisting an object.
pub type ObjectRedirectFn<E> = Arc<dyn Fn(&E) -> AppResult<String> + Send + Sync>;
/// Computes the redirect target after a removal.
pub type RedirectFn = Arc<dyn Fn() -> AppResult<String> + Send + Sync>;
/// Reads the identifier of an object.
pub type IdentifierFn<E> = Arc<dyn Fn(&E) -> Option<IdentifierValue> + Send + Sync>;
/// Replaces the role check of one action.
pub type GrantFn<E> = Arc<dyn Fn(Option<&Principal>, Option<&E>) -> bool + Send + Sync>;

/// Hooks of an action that binds a form and persists the object.
pub struct PersistHooks<E> {
    form_type: Option<FormTypeFn<E>>,
    button_name: Option<String>,
    pre_persist: Option<PrePersistHook<E>>,
    post_flush: Option<ObjectHook<E>>,
    redirect_url: Option<ObjectRedirectFn<E>>,
}

impl<E> Default for PersistHooks<E> {
    fn default() -> Self {
        Self {
            form_type: None,
            button_name: None,
            pre_persist: None,
            post_flush: None,
            redirect_url: None,
        }
    }
}

impl<E> Clone for PersistHooks<E> {
    fn clone(&self) -> Self {
        Self {
            form_type: self.form_type.clone(),
            button_name: self.button_name.clone(),
            pre_persist: self.pre_persist.clone(),
            post_flush: self.post_flush.clone(),
            redirect_url: self.redirect_url.clone(),
        }
    }
}

impl<E> PersistHooks<E> {
    /// Submit button that must be clicked for the form to count as submitted.
    pub fn button_name(&self) -> Option<&str> {
        self.button_name.as_deref()
    }

    /// Run the pre-persist hook, if any.
    pub fn pre_persist(&self, object: &mut E) -> AppResult<()> {
        match &self.pre_persist {
            Some(hook) => hook(object),
            None => Ok(()),
        }
    }

    /// Run the post-flush hook, if any.
    pub fn post_flush(&self, object: &E) -> AppResult<()> {
        match &self.post_flush {
            Some(hook) => hook(object),
            None => Ok(()),
        }
    }

    /// The redirect override, if any.
    pub fn redirect_url(&self) -> Option<&ObjectRedirectFn<E>> {
        self.redirect_url.as_ref()
    }
}

/// Hooks of the delete action.
pub struct DeleteHooks<E> {
    pre_remove: Option<ObjectHook<E>>,
    post_flush: Option<ObjectHook<E>>,
    redirect_url: Option<RedirectFn>,
}

impl<E> Default for DeleteHooks<E> {
    fn default() -> Self {
        Self {
            pre_remove: None,
            post_flush: None,
            redirect_url: None,
        }
    }
}

impl<E> Clone for DeleteHooks<E> {
    fn clone(&self) -> Self {
        Self {
            pre_remove: self.pre_remove.clone(),
            post_flush: self.post_flush.clone(),
            redirect_url: self.redirect_url.clone(),
        }
    }
}

impl<E> DeleteHooks<E> {
    /// Run the pre-remove hook, if any.
    pub fn pre_remove(&self, object: &E) -> AppResult<()> {
        match &self.pre_remove {
            Some(hook) => hook(object),
            None => Ok(()),
        }
    }

    /// Run the post-flush hook, if any.
    pub fn post_flush(&self, object: &E) -> AppResult<()> {
        match &self.post_flush {
            Some(hook) => hook(object),
            None => Ok(()),
        }
    }

    /// The redirect override, if any.
    pub fn redirect_url(&self) -> Option<&RedirectFn> {
        self.redirect_url.as_ref()
    }
}

/// Everything a controller customizes for one entity.
pub struct CrudDefinition<E> {
    name: String,
    object_class: String,
    route_pattern: String,
    role_pattern: String,
    template_pattern: Option<String>,
    trans_prefix: Option<String>,
    list_per_page: u64,
    max_per_page: u64,
    list_form_type: Option<FormType>,
    list_form_data_enrich: FilterData,
    factory: Option<FactoryFn<E>>,
    identifier_accessor: Option<IdentifierFn<E>>,
    create: PersistHooks<E>,
    edit: PersistHooks<E>,
    delete: DeleteHooks<E>,
    route_overrides: HashMap<CrudAction, String>,
    role_overrides: HashMap<CrudAction, String>,
    template_overrides: HashMap<CrudAction, String>,
    grant_overrides: HashMap<CrudAction, GrantFn<E>>,
}

impl<E> fmt::Debug for CrudDefinition<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrudDefinition")
            .field("name", &self.name)
            .field("object_class", &self.object_class)
            .field("route_pattern", &self.route_pattern)
            .field("role_pattern", &self.role_pattern)
            .field("template_pattern", &self.template_pattern)
            .field("list_per_page", &self.list_per_page)
            .finish_non_exhaustive()
    }
}

impl<E: CrudObject> CrudDefinition<E> {
    /// Start a definition for entity `name` stored as `object_class`.
    pub fn builder(
        name: impl Into<String>,
        object_class: impl Into<String>,
    ) -> CrudDefinitionBuilder<E> {
        CrudDefinitionBuilder {
            definition: CrudDefinition {
                name: name.into(),
                object_class: object_class.into(),
                route_pattern: DEFAULT_ROUTE_PATTERN.to_string(),
                role_pattern: DEFAULT_ROLE_PATTERN.to_string(),
                template_pattern: None,
                trans_prefix: None,
                list_per_page: DEFAULT_PER_PAGE,
                max_per_page: DEFAULT_MAX_PER_PAGE,
                list_form_type: None,
                list_form_data_enrich: FilterData::default(),
                factory: None,
                identifier_accessor: None,
                create: PersistHooks::default(),
                edit: PersistHooks::default(),
                delete: DeleteHooks::default(),
                route_overrides: HashMap::new(),
                role_overrides: HashMap::new(),
                template_overrides: HashMap::new(),
                grant_overrides: HashMap::new(),
            },
        }
    }

    /// Start a definition seeded with the naming and paging defaults of
    /// `config`.
    pub fn from_config(
        name: impl Into<String>,
        object_class: impl Into<String>,
        config: &CrudConfig,
    ) -> CrudDefinitionBuilder<E> {
        Self::builder(name, object_class).with_config(config)
    }

    /// Entity name the naming patterns are applied to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Class name the persistence layer manages the entity under.
    pub fn object_class(&self) -> &str {
        &self.object_class
    }

    /// Route name of `action`: `route_pattern(name, action)`, lower-cased.
    pub fn route(&self, action: CrudAction) -> String {
        match self.route_overrides.get(&action) {
            Some(route) => route.clone(),
            None => format_pattern(&self.route_pattern, &[&self.name, action.as_str()])
                .to_lowercase(),
        }
    }

    /// Role name of `action`: `role_pattern(name, action)`, upper-cased.
    pub fn role(&self, action: CrudAction) -> String {
        match self.role_overrides.get(&action) {
            Some(role) => role.clone(),
            None => format_pattern(&self.role_pattern, &[&self.name, action.as_str()])
                .to_uppercase(),
        }
    }

    /// Template of `action`: `template_pattern(Name, action)`.
    pub fn template(&self, action: CrudAction) -> AppResult<String> {
        if let Some(template) = self.template_overrides.get(&action) {
            return Ok(template.clone());
        }
        let pattern = self.template_pattern.as_deref().ok_or_else(|| {
            AppError::configuration(format!(
                "For actions using a template you need to define the template pattern like this: {TEMPLATE_PATTERN_EXAMPLE}"
            ))
        })?;
        Ok(format_pattern(pattern, &[&ucfirst(&self.name), action.as_str()]))
    }

    /// Translation key prefix; defaults to the underscored entity name.
    pub fn trans_prefix(&self) -> String {
        match &self.trans_prefix {
            Some(prefix) => prefix.clone(),
            None => camel_case_to_underscore(&self.name),
        }
    }

    /// Page size when the request carries no `perPage`.
    pub fn list_per_page(&self) -> u64 {
        self.list_per_page
    }

    /// Largest page size a request may ask for.
    pub fn max_per_page(&self) -> u64 {
        self.max_per_page
    }

    /// Filter form of the list action, if any.
    pub fn list_form_type(&self) -> Option<&FormType> {
        self.list_form_type.as_ref()
    }

    /// Values forced onto the list filter data.
    pub fn list_form_data_enrich(&self) -> &FilterData {
        &self.list_form_data_enrich
    }

    /// Build a fresh object for the create action.
    pub fn create_object(&self) -> E {
        match &self.factory {
            Some(factory) => factory(),
            None => E::default(),
        }
    }

    /// Form type of the create action for `object`.
    pub fn create_form_type(&self, object: &E) -> AppResult<FormType> {
        self.create.form_type.as_ref().map(|f| f(object)).ok_or_else(|| {
            AppError::configuration(
                "You need to provide a create form type, if you use the create_object action!",
            )
        })
    }

    /// Form type of the edit action for `object`.
    pub fn edit_form_type(&self, object: &E) -> AppResult<FormType> {
        self.edit.form_type.as_ref().map(|f| f(object)).ok_or_else(|| {
            AppError::configuration(
                "You need to provide an edit form type, if you use the edit_object action!",
            )
        })
    }

    /// Create action hooks.
    pub fn create_hooks(&self) -> &PersistHooks<E> {
        &self.create
    }

    /// Edit action hooks.
    pub fn edit_hooks(&self) -> &PersistHooks<E> {
        &self.edit
    }

    /// Delete action hooks.
    pub fn delete_hooks(&self) -> &DeleteHooks<E> {
        &self.delete
    }

    /// Identifier of `object`, via the configured accessor.
    pub fn identifier_of(&self, object: &E) -> AppResult<IdentifierValue> {
        let accessor = self.identifier_accessor.as_ref().ok_or_else(|| {
            AppError::configuration(format!(
                "An identifier accessor is required to build URLs for objects of class: {}",
                self.object_class
            ))
        })?;
        accessor(object).ok_or_else(|| {
            AppError::configuration(format!(
                "The object of class {} has no identifier",
                self.object_class
            ))
        })
    }

    /// Permission override of `action`, if any.
    pub fn grant_override(&self, action: CrudAction) -> Option<&GrantFn<E>> {
        self.grant_overrides.get(&action)
    }
}

impl<E> Clone for CrudDefinition<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            object_class: self.object_class.clone(),
            route_pattern: self.route_pattern.clone(),
            role_pattern: self.role_pattern.clone(),
            template_pattern: self.template_pattern.clone(),
            trans_prefix: self.trans_prefix.clone(),
            list_per_page: self.list_per_page,
            max_per_page: self.max_per_page,
            list_form_type: self.list_form_type.clone(),
            list_form_data_enrich: self.list_form_data_enrich.clone(),
            factory: self.factory.clone(),
            identifier_accessor: self.identifier_accessor.clone(),
            create: self.create.clone(),
            edit: self.edit.clone(),
            delete: self.delete.clone(),
            route_overrides: self.route_overrides.clone(),
            role_overrides: self.role_overrides.clone(),
            template_overrides: self.template_overrides.clone(),
            grant_overrides: self.grant_overrides.clone(),
        }
    }
}

/// Builder for [`CrudDefinition`].
pub struct CrudDefinitionBuilder<E> {
    definition: CrudDefinition<E>,
}

impl<E: CrudObject> CrudDefinitionBuilder<E> {
    /// Seed naming patterns and pagination defaults from configuration.
    pub fn with_config(mut self, config: &CrudConfig) -> Self {
        self.definition.route_pattern = config.route_pattern.clone();
        self.definition.role_pattern = config.role_pattern.clone();
        if config.template_pattern.is_some() {
            self.definition.template_pattern = config.template_pattern.clone();
        }
        self.definition.list_per_page = config.per_page;
        self.definition.max_per_page = config.max_per_page;
        self
    }

    /// Route name pattern (two `%s`: entity, action).
    pub fn route_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.definition.route_pattern = pattern.into();
        self
    }

    /// Role name pattern (two `%s`: entity, action).
    pub fn role_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.definition.role_pattern = pattern.into();
        self
    }

    /// Template pattern (two `%s`: Entity, action).
    pub fn template_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.definition.template_pattern = Some(pattern.into());
        self
    }

    /// Translation key prefix.
    pub fn trans_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.definition.trans_prefix = Some(prefix.into());
        self
    }

    /// Default page size of the list action.
    pub fn list_per_page(mut self, per_page: u64) -> Self {
        self.definition.list_per_page = per_page;
        self
    }

    /// Upper bound for requested page sizes.
    pub fn max_per_page(mut self, max: u64) -> Self {
        self.definition.max_per_page = max;
        self
    }

    /// Filter form of the list action.
    pub fn list_form_type(mut self, form_type: FormType) -> Self {
        self.definition.list_form_type = Some(form_type);
        self
    }

    /// Values forced onto the list filter data.
    pub fn list_form_data_enrich(mut self, data: FilterData) -> Self {
        self.definition.list_form_data_enrich = data;
        self
    }

    /// Factory for new objects (default: `E::default()`).
    pub fn factory(mut self, factory: impl Fn() -> E + Send + Sync + 'static) -> Self {
        self.definition.factory = Some(Arc::new(factory));
        self
    }

    /// Accessor reading an object's identifier.
    pub fn identifier_accessor(
        mut self,
        accessor: impl Fn(&E) -> Option<IdentifierValue> + Send + Sync + 'static,
    ) -> Self {
        self.definition.identifier_accessor = Some(Arc::new(accessor));
        self
    }

    /// Form type of the create action.
    pub fn create_form_type(
        mut self,
        form_type: impl Fn(&E) -> FormType + Send + Sync + 'static,
    ) -> Self {
        self.definition.create.form_type = Some(Arc::new(form_type));
        self
    }

    /// Submit button gating the create form.
    pub fn create_button_name(mut self, button: impl Into<String>) -> Self {
        self.definition.create.button_name = Some(button.into());
        self
    }

    /// Hook run before a new object is persisted.
    pub fn create_pre_persist(
        mut self,
        hook: impl Fn(&mut E) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.definition.create.pre_persist = Some(Arc::new(hook));
        self
    }

    /// Hook run after a new object is flushed.
    pub fn create_post_flush(
        mut self,
        hook: impl Fn(&E) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.definition.create.post_flush = Some(Arc::new(hook));
        self
    }

    /// Redirect target after a successful create.
    pub fn create_redirect_url(
        mut self,
        redirect: impl Fn(&E) -> AppResult<String> + Send + Sync + 'static,
    ) -> Self {
        self.definition.create.redirect_url = Some(Arc::new(redirect));
        self
    }

    /// Form type of the edit action.
    pub fn edit_form_type(
        mut self,
        form_type: impl Fn(&E) -> FormType + Send + Sync + 'static,
    ) -> Self {
        self.definition.edit.form_type = Some(Arc::new(form_type));
        self
    }

    /// Submit button gating the edit form.
    pub fn edit_button_name(mut self, button: impl Into<String>) -> Self {
        self.definition.edit.button_name = Some(button.into());
        self
    }

    /// Hook run before an edited object is persisted.
    pub fn edit_pre_persist(
        mut self,
        hook: impl Fn(&mut E) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.definition.edit.pre_persist = Some(Arc::new(hook));
        self
    }

    /// Hook run after an edited object is flushed.
    pub fn edit_post_flush(
        mut self,
        hook: impl Fn(&E) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.definition.edit.post_flush = Some(Arc::new(hook));
        self
    }

    /// Redirect target after a successful edit.
    pub fn edit_redirect_url(
        mut self,
        redirect: impl Fn(&E) -> AppResult<String> + Send + Sync + 'static,
    ) -> Self {
        self.definition.edit.redirect_url = Some(Arc::new(redirect));
        self
    }

    /// Hook run before an object is removed.
    pub fn delete_pre_remove(
        mut self,
        hook: impl Fn(&E) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.definition.delete.pre_remove = Some(Arc::new(hook));
        self
    }

    /// Hook run after a removal is flushed.
    pub fn delete_post_flush(
        mut self,
        hook: impl Fn(&E) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.definition.delete.post_flush = Some(Arc::new(hook));
        self
    }

    /// Redirect target after a delete.
    pub fn delete_redirect_url(
        mut self,
        redirect: impl Fn() -> AppResult<String> + Send + Sync + 'static,
    ) -> Self {
        self.definition.delete.redirect_url = Some(Arc::new(redirect));
        self
    }

    /// Use `route` as the route name of `action`.
    pub fn route_override(mut self, action: CrudAction, route: impl Into<String>) -> Self {
        self.definition.route_overrides.insert(action, route.into());
        self
    }

    /// Use `role` as the role name of `action`.
    pub fn role_override(mut self, action: CrudAction, role: impl Into<String>) -> Self {
        self.definition.role_overrides.insert(action, role.into());
        self
    }

    /// Use `template` as the template of `action`.
    pub fn template_override(mut self, action: CrudAction, template: impl Into<String>) -> Self {
        self.definition
            .template_overrides
            .insert(action, template.into());
        self
    }

    /// Decide the permission of `action` with `grant` instead of a role check.
    pub fn grant_with(
        mut self,
        action: CrudAction,
        grant: impl Fn(Option<&Principal>, Option<&E>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.definition
            .grant_overrides
            .insert(action, Arc::new(grant));
        self
    }

    /// Finish the definition.
    ///
    /// Fails when the entity name or object class is empty, or when a naming
    /// pattern does not carry two `%s` placeholders.
    pub fn build(self) -> AppResult<CrudDefinition<E>> {
        let definition = self.definition;
        if definition.name.trim().is_empty() {
            return Err(AppError::configuration("The entity name must not be empty"));
        }
        if definition.object_class.trim().is_empty() {
            return Err(AppError::configuration("The object class must not be empty"));
        }
        for (label, pattern) in [
            ("route", Some(definition.route_pattern.as_str())),
            ("role", Some(definition.role_pattern.as_str())),
            ("template", definition.template_pattern.as_deref()),
        ] {
            if let Some(pattern) = pattern {
                if pattern.matches("%s").count() != 2 {
                    return Err(AppError::configuration(format!(
                        "The {label} pattern needs two %s placeholders, got: {pattern}"
                    )));
                }
            }
        }
        Ok(definition)
    }
}
