//! Recording fakes for controller tests.
#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crudhub_controller::{CrudController, CrudDefinition, CrudServices};
use crudhub_core::error::AppError;
use crudhub_core::result::AppResult;
use crudhub_core::traits::{
    AuthorizationChecker, ClassMetadata, FilterQueryRepository, FlashSink, Form, FormFactory,
    ListQuery, ManagerRegistry, ObjectManager, ObjectRepository, Paginator, RouteParameters,
    TemplateRenderer, UrlGenerator, UrlReference,
};
use crudhub_core::types::{
    CrudRequest, FilterData, FlashKind, FormType, FormView, IdentifierValue, PageRequest,
    PageResponse, Principal, TemplateVars,
};

/// Entity used throughout the controller tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Post {
    pub id: Option<i64>,
    #[validate(length(min = 1))]
    pub title: String,
}

impl Post {
    pub fn new(id: i64, title: &str) -> Self {
        Self {
            id: Some(id),
            title: title.to_string(),
        }
    }
}

/// Ordered log of capability calls shared by every fake.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries().iter().filter(|e| e.starts_with(prefix)).count()
    }

    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.entries().iter().position(|e| e.starts_with(prefix))
    }
}

pub struct RoleChecker {
    pub roles: BTreeSet<String>,
    pub log: CallLog,
}

#[async_trait]
impl AuthorizationChecker<Post> for RoleChecker {
    async fn is_granted(
        &self,
        _principal: Option<&Principal>,
        attribute: &str,
        _subject: Option<&Post>,
    ) -> AppResult<bool> {
        self.log.push(format!("is_granted:{attribute}"));
        Ok(self.roles.contains(attribute))
    }
}

pub struct FakeRegistry {
    pub manager: Arc<FakeManager>,
}

impl ManagerRegistry<Post> for FakeRegistry {
    fn manager_for_class(&self, class: &str) -> Option<Arc<dyn ObjectManager<Post>>> {
        (class == "Post").then(|| self.manager.clone() as Arc<dyn ObjectManager<Post>>)
    }
}

pub struct FakeManager {
    pub log: CallLog,
    pub repository: Arc<FakeRepository>,
    pub identifier: Vec<String>,
    pub next_id: Mutex<i64>,
}

#[async_trait]
impl ObjectManager<Post> for FakeManager {
    fn class_metadata(&self, class: &str) -> AppResult<ClassMetadata> {
        Ok(ClassMetadata {
            name: class.to_string(),
            identifier: self.identifier.clone(),
        })
    }

    fn repository(&self, _class: &str) -> AppResult<Arc<dyn ObjectRepository<Post>>> {
        Ok(self.repository.clone() as Arc<dyn ObjectRepository<Post>>)
    }

    async fn persist(&self, object: &mut Post) -> AppResult<()> {
        if object.id.is_none() {
            let mut next = self.next_id.lock().unwrap();
            object.id = Some(*next);
            *next += 1;
        }
        self.log.push(format!("persist:{}", object.title));
        Ok(())
    }

    async fn remove(&self, object: &Post) -> AppResult<()> {
        self.log.push(format!("remove:{}", object.id.unwrap_or_default()));
        Ok(())
    }

    async fn flush(&self) -> AppResult<()> {
        self.log.push("flush");
        Ok(())
    }
}

pub struct FakeRepository {
    pub log: CallLog,
    pub posts: Vec<Post>,
    pub filterable: bool,
}

#[async_trait]
impl ObjectRepository<Post> for FakeRepository {
    async fn find(&self, id: &IdentifierValue) -> AppResult<Option<Post>> {
        self.log.push(format!("find:{id}"));
        Ok(self
            .posts
            .iter()
            .find(|p| p.id == id.as_int())
            .cloned())
    }

    fn filter_query(&self) -> Option<&dyn FilterQueryRepository<Post>> {
        if self.filterable {
            Some(self as &dyn FilterQueryRepository<Post>)
        } else {
            None
        }
    }
}

#[async_trait]
impl FilterQueryRepository<Post> for FakeRepository {
    async fn query_for_filter(&self, data: &FilterData) -> AppResult<Box<dyn ListQuery<Post>>> {
        self.log
            .push(format!("query:{}", serde_json::to_string(data)?));
        Ok(Box::new(FakeQuery {
            posts: self.posts.clone(),
        }))
    }
}

pub struct FakeQuery {
    pub posts: Vec<Post>,
}

#[async_trait]
impl ListQuery<Post> for FakeQuery {
    async fn count(&self) -> AppResult<u64> {
        Ok(self.posts.len() as u64)
    }

    async fn fetch(&self, offset: u64, limit: u64) -> AppResult<Vec<Post>> {
        Ok(self
            .posts
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

pub struct FakePaginator {
    pub requests: Mutex<Vec<PageRequest>>,
}

#[async_trait]
impl Paginator<Post> for FakePaginator {
    async fn paginate(
        &self,
        query: &dyn ListQuery<Post>,
        page: PageRequest,
    ) -> AppResult<PageResponse<Post>> {
        self.requests.lock().unwrap().push(page);
        let total = query.count().await?;
        let items = query.fetch(page.offset(), page.limit()).await?;
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }
}

/// Form whose validity and clicked buttons are fixed up front.
pub struct FakeForm<T> {
    pub form_type: FormType,
    pub data: T,
    pub submitted: bool,
    pub valid: bool,
    pub clicked: Vec<String>,
    pub log: CallLog,
}

impl<T: Serialize + Send> Form<T> for FakeForm<T> {
    fn name(&self) -> &str {
        &self.form_type.name
    }

    fn handle_request(&mut self, request: &CrudRequest) -> AppResult<()> {
        self.log.push(format!("handle_request:{}", self.form_type.name));
        self.submitted = request.method == self.form_type.method;
        Ok(())
    }

    fn is_submitted(&self) -> bool {
        self.submitted
    }

    fn is_valid(&self) -> bool {
        self.submitted && self.valid
    }

    fn is_clicked(&self, button: &str) -> AppResult<bool> {
        if !self.form_type.has_button(button) {
            return Err(AppError::configuration(format!("Unknown button: {button}")));
        }
        Ok(self.clicked.iter().any(|b| b == button))
    }

    fn data(&self) -> &T {
        &self.data
    }

    fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    fn into_data(self: Box<Self>) -> T {
        self.data
    }

    fn create_view(&self) -> AppResult<FormView> {
        Ok(FormView {
            name: self.form_type.name.clone(),
            buttons: self.form_type.buttons.clone(),
            submitted: self.submitted,
            valid: self.is_valid(),
            ..FormView::default()
        })
    }
}

pub struct FakeFormFactory {
    pub valid: bool,
    pub clicked: Vec<String>,
    pub filter_data: FilterData,
    pub log: CallLog,
}

impl FormFactory<Post> for FakeFormFactory {
    fn create(&self, form_type: &FormType, data: Post) -> AppResult<Box<dyn Form<Post>>> {
        Ok(Box::new(FakeForm {
            form_type: form_type.clone(),
            data,
            submitted: false,
            valid: self.valid,
            clicked: self.clicked.clone(),
            log: self.log.clone(),
        }))
    }

    fn create_filter(
        &self,
        form_type: &FormType,
        _data: FilterData,
    ) -> AppResult<Box<dyn Form<FilterData>>> {
        Ok(Box::new(FakeForm {
            form_type: form_type.clone(),
            data: self.filter_data.clone(),
            submitted: false,
            valid: true,
            clicked: Vec::new(),
            log: self.log.clone(),
        }))
    }
}

pub struct FakeUrls;

impl UrlGenerator for FakeUrls {
    fn generate(
        &self,
        route: &str,
        parameters: &RouteParameters,
        reference: UrlReference,
    ) -> AppResult<String> {
        assert_eq!(reference, UrlReference::AbsoluteUrl);
        let query: Vec<String> = parameters.iter().map(|(k, v)| format!("{k}={v}")).collect();
        if query.is_empty() {
            Ok(format!("http://test/{route}"))
        } else {
            Ok(format!("http://test/{route}?{}", query.join("&")))
        }
    }
}

#[derive(Default)]
pub struct FakeRenderer {
    pub rendered: Mutex<Vec<(String, TemplateVars)>>,
}

impl FakeRenderer {
    pub fn last(&self) -> (String, TemplateVars) {
        self.rendered
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("nothing rendered")
    }
}

impl TemplateRenderer for FakeRenderer {
    fn render(&self, template: &str, vars: &TemplateVars) -> AppResult<String> {
        self.rendered
            .lock()
            .unwrap()
            .push((template.to_string(), vars.clone()));
        Ok(format!("rendered {template}"))
    }
}

#[derive(Default)]
pub struct RecordingFlash {
    pub messages: Mutex<Vec<(FlashKind, String)>>,
}

impl RecordingFlash {
    pub fn messages(&self) -> Vec<(FlashKind, String)> {
        self.messages.lock().unwrap().clone()
    }
}

impl FlashSink for RecordingFlash {
    fn add(&self, kind: FlashKind, message: String) {
        self.messages.lock().unwrap().push((kind, message));
    }
}

/// Knobs for a test controller.
pub struct Fixture {
    pub roles: Vec<&'static str>,
    pub posts: Vec<Post>,
    pub valid: bool,
    pub clicked: Vec<String>,
    pub filterable: bool,
    pub identifier: Vec<String>,
    pub filter_data: FilterData,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            roles: vec![
                "ROLE_POST_LIST",
                "ROLE_POST_CREATE",
                "ROLE_POST_EDIT",
                "ROLE_POST_VIEW",
                "ROLE_POST_DELETE",
            ],
            posts: vec![Post::new(1, "First"), Post::new(2, "Second")],
            valid: true,
            clicked: Vec::new(),
            filterable: true,
            identifier: vec!["id".to_string()],
            filter_data: FilterData::default(),
        }
    }
}

/// A controller wired with fakes plus handles to inspect them.
pub struct Harness {
    pub controller: CrudController<Post>,
    pub log: CallLog,
    pub renderer: Arc<FakeRenderer>,
    pub paginator: Arc<FakePaginator>,
    pub flash: RecordingFlash,
}

pub fn default_definition() -> crudhub_controller::CrudDefinitionBuilder<Post> {
    CrudDefinition::builder("post", "Post")
        .template_pattern("@Test/%s/%s.html")
        .identifier_accessor(|p: &Post| p.id.map(IdentifierValue::Int))
        .create_form_type(|_| FormType::new("post").field("title"))
        .edit_form_type(|_| FormType::new("post").field("title"))
}

pub fn harness(fixture: Fixture) -> Harness {
    harness_with(fixture, default_definition().build().unwrap())
}

pub fn harness_with(fixture: Fixture, definition: CrudDefinition<Post>) -> Harness {
    let log = CallLog::default();
    let repository = Arc::new(FakeRepository {
        log: log.clone(),
        posts: fixture.posts,
        filterable: fixture.filterable,
    });
    let manager = Arc::new(FakeManager {
        log: log.clone(),
        repository,
        identifier: fixture.identifier,
        next_id: Mutex::new(100),
    });
    let renderer = Arc::new(FakeRenderer::default());
    let paginator = Arc::new(FakePaginator {
        requests: Mutex::new(Vec::new()),
    });

    let services = CrudServices::<Post>::new()
        .with_authorization_checker(Arc::new(RoleChecker {
            roles: fixture.roles.iter().map(|r| r.to_string()).collect(),
            log: log.clone(),
        }))
        .with_manager_registry(Arc::new(FakeRegistry { manager }))
        .with_form_factory(Arc::new(FakeFormFactory {
            valid: fixture.valid,
            clicked: fixture.clicked,
            filter_data: fixture.filter_data,
            log: log.clone(),
        }))
        .with_paginator(paginator.clone())
        .with_url_generator(Arc::new(FakeUrls))
        .with_renderer(renderer.clone());

    Harness {
        controller: CrudController::new(definition, services),
        log,
        renderer,
        paginator,
        flash: RecordingFlash::default(),
    }
}

pub fn post_request(fields: &[(&str, &str)]) -> CrudRequest {
    let mut request = CrudRequest::post("/posts/new");
    for (key, value) in fields {
        request = request.with_field(*key, *value);
    }
    request
}

pub fn query(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
