//! Sample `BlogPost` entity served by the demo.

use std::sync::Arc;

use axum::http::Method;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crudhub_controller::{CrudController, CrudDefinition, CrudServices};
use crudhub_core::config::crud::CrudConfig;
use crudhub_core::error::AppError;
use crudhub_core::traits::ClassMetadata;
use crudhub_core::types::{CrudAction, FormType, IdentifierValue};
use crudhub_memory::{
    JsonFormFactory, JsonTemplateRenderer, MemoryRegistry, QueryPaginator,
    RoleAuthorizationChecker, RouteUrlGenerator,
};

/// Entity name the route, role and template patterns are applied to.
pub const ENTITY: &str = "blogPost";
/// Persistence class of the entity.
pub const CLASS: &str = "BlogPost";
/// Path the CRUD routes are mounted below.
pub const BASE_PATH: &str = "/posts";
/// Template pattern used when the configuration sets none.
pub const TEMPLATE_PATTERN: &str = "@Blog/%s/%s.html";
/// Role granted every blog post permission.
pub const ADMIN_ROLE: &str = "ROLE_ADMIN";
/// Role granted read access.
pub const READER_ROLE: &str = "ROLE_READER";

/// A blog post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct BlogPost {
    pub id: Option<i64>,
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub body: String,
    pub published: bool,
}

impl BlogPost {
    fn draft(title: &str, body: &str, published: bool) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            body: body.to_string(),
            published,
        }
    }
}

fn post_form(name: &str) -> FormType {
    FormType::new(name)
        .field("title")
        .field("body")
        .field("published")
        .button("save")
}

/// Build the blog post controller over in-memory capabilities.
pub fn controller(config: &CrudConfig) -> Result<CrudController<BlogPost>, AppError> {
    let registry = Arc::new(MemoryRegistry::<BlogPost>::new());
    registry.register(ClassMetadata::new(CLASS, "id")).seed([
        BlogPost::draft("Hello CrudHub", "The first post.", true),
        BlogPost::draft("Writing capability traits", "Slots, not inheritance.", true),
        BlogPost::draft("Unpublished notes", "", false),
    ])?;

    let filter = FormType::new("filter")
        .with_method(Method::GET)
        .field("title")
        .field("sort")
        .field("direction");

    let mut builder = CrudDefinition::<BlogPost>::from_config(ENTITY, CLASS, config);
    if config.template_pattern.is_none() {
        builder = builder.template_pattern(TEMPLATE_PATTERN);
    }
    let definition = builder
        .list_form_type(filter)
        .identifier_accessor(|post: &BlogPost| post.id.map(IdentifierValue::Int))
        .create_form_type(|_| post_form("blog_post"))
        .create_button_name("save")
        .edit_form_type(|_| post_form("blog_post"))
        .edit_button_name("save")
        .build()?;

    let urls = RouteUrlGenerator::new(config.base_url.as_str())
        .with_crud_routes(BASE_PATH, |action| definition.route(action));

    let roles: Vec<String> = CrudAction::ALL
        .iter()
        .map(|action| definition.role(*action))
        .collect();
    let checker = RoleAuthorizationChecker::new()
        .with_hierarchy(ADMIN_ROLE, roles)
        .with_hierarchy(
            READER_ROLE,
            [
                definition.role(CrudAction::List),
                definition.role(CrudAction::View),
            ],
        );

    let services = CrudServices::<BlogPost>::new()
        .with_authorization_checker(Arc::new(checker))
        .with_manager_registry(registry)
        .with_form_factory(Arc::new(JsonFormFactory::<BlogPost>::new()))
        .with_paginator(Arc::new(QueryPaginator::new()))
        .with_url_generator(Arc::new(urls))
        .with_renderer(Arc::new(JsonTemplateRenderer::new().pretty()));

    Ok(CrudController::new(definition, services))
}
