//! Capability slots injected into a controller.

use std::fmt;
use std::sync::Arc;

use crudhub_core::error::AppError;
use crudhub_core::result::AppResult;
use crudhub_core::traits::{
    AuthorizationChecker, CrudObject, FormFactory, ManagerRegistry, ObjectManager, Paginator,
    SecurityContext, TemplateRenderer, UrlGenerator,
};
use crudhub_core::types::Principal;

/// The capabilities a controller delegates to. Every slot is optional; an
/// action that needs an empty slot fails with a service-not-configured error.
pub struct CrudServices<E: CrudObject> {
    authorization_checker: Option<Arc<dyn AuthorizationChecker<E>>>,
    security_context: Option<Arc<dyn SecurityContext<E>>>,
    manager_registry: Option<Arc<dyn ManagerRegistry<E>>>,
    form_factory: Option<Arc<dyn FormFactory<E>>>,
    paginator: Option<Arc<dyn Paginator<E>>>,
    url_generator: Option<Arc<dyn UrlGenerator>>,
    renderer: Option<Arc<dyn TemplateRenderer>>,
}

impl<E: CrudObject> Default for CrudServices<E> {
    fn default() -> Self {
        Self {
            authorization_checker: None,
            security_context: None,
            manager_registry: None,
            form_factory: None,
            paginator: None,
            url_generator: None,
            renderer: None,
        }
    }
}

impl<E: CrudObject> Clone for CrudServices<E> {
    fn clone(&self) -> Self {
        Self {
            authorization_checker: self.authorization_checker.clone(),
            security_context: self.security_context.clone(),
            manager_registry: self.manager_registry.clone(),
            form_factory: self.form_factory.clone(),
            paginator: self.paginator.clone(),
            url_generator: self.url_generator.clone(),
            renderer: self.renderer.clone(),
        }
    }
}

impl<E: CrudObject> fmt::Debug for CrudServices<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrudServices")
            .field("authorization_checker", &self.authorization_checker.is_some())
            .field("security_context", &self.security_context.is_some())
            .field("manager_registry", &self.manager_registry.is_some())
            .field("form_factory", &self.form_factory.is_some())
            .field("paginator", &self.paginator.is_some())
            .field("url_generator", &self.url_generator.is_some())
            .field("renderer", &self.renderer.is_some())
            .finish()
    }
}

impl<E: CrudObject> CrudServices<E> {
    /// Create an empty set of capabilities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the primary permission evaluator.
    pub fn with_authorization_checker(mut self, checker: Arc<dyn AuthorizationChecker<E>>) -> Self {
        self.authorization_checker = Some(checker);
        self
    }

    /// Set the legacy permission evaluator.
    pub fn with_security_context(mut self, context: Arc<dyn SecurityContext<E>>) -> Self {
        self.security_context = Some(context);
        self
    }

    /// Set the persistence manager registry.
    pub fn with_manager_registry(mut self, registry: Arc<dyn ManagerRegistry<E>>) -> Self {
        self.manager_registry = Some(registry);
        self
    }

    /// Set the form factory.
    pub fn with_form_factory(mut self, factory: Arc<dyn FormFactory<E>>) -> Self {
        self.form_factory = Some(factory);
        self
    }

    /// Set the paginator.
    pub fn with_paginator(mut self, paginator: Arc<dyn Paginator<E>>) -> Self {
        self.paginator = Some(paginator);
        self
    }

    /// Set the URL generator.
    pub fn with_url_generator(mut self, generator: Arc<dyn UrlGenerator>) -> Self {
        self.url_generator = Some(generator);
        self
    }

    /// Set the template renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Evaluate `attribute` for `principal`.
    ///
    /// The primary checker decides when present; the legacy context is only
    /// consulted when the primary slot is empty.
    pub async fn is_granted(
        &self,
        principal: Option<&Principal>,
        attribute: &str,
        subject: Option<&E>,
    ) -> AppResult<bool> {
        if let Some(checker) = &self.authorization_checker {
            return checker.is_granted(principal, attribute, subject).await;
        }
        if let Some(context) = &self.security_context {
            return context.is_granted(principal, attribute, subject).await;
        }
        Err(AppError::service_not_configured(
            "security",
            "AuthorizationChecker or SecurityContext",
        ))
    }

    /// The persistence manager registry.
    pub fn manager_registry(&self) -> AppResult<&Arc<dyn ManagerRegistry<E>>> {
        self.manager_registry
            .as_ref()
            .ok_or_else(|| AppError::service_not_configured("persistence", "ManagerRegistry"))
    }

    /// The object manager responsible for `class`.
    pub fn object_manager(&self, class: &str) -> AppResult<Arc<dyn ObjectManager<E>>> {
        self.manager_registry()?
            .manager_for_class(class)
            .ok_or_else(|| {
                AppError::configuration(format!("There is no object manager for class: {class}"))
            })
    }

    /// The form factory.
    pub fn form_factory(&self) -> AppResult<&Arc<dyn FormFactory<E>>> {
        self.form_factory
            .as_ref()
            .ok_or_else(|| AppError::service_not_configured("forms", "FormFactory"))
    }

    /// The paginator.
    pub fn paginator(&self) -> AppResult<&Arc<dyn Paginator<E>>> {
        self.paginator
            .as_ref()
            .ok_or_else(|| AppError::service_not_configured("pagination", "Paginator"))
    }

    /// The URL generator.
    pub fn url_generator(&self) -> AppResult<&Arc<dyn UrlGenerator>> {
        self.url_generator
            .as_ref()
            .ok_or_else(|| AppError::service_not_configured("url generation", "UrlGenerator"))
    }

    /// The template renderer.
    pub fn renderer(&self) -> AppResult<&Arc<dyn TemplateRenderer>> {
        self.renderer
            .as_ref()
            .ok_or_else(|| AppError::service_not_configured("templating", "TemplateRenderer"))
    }
}
