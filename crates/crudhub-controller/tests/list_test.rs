//! List action tests.

mod helpers;

use serde_json::json;

use crudhub_core::error::ErrorKind;
use crudhub_core::types::{CrudAction, CrudRequest, FilterData, FormType, TemplateVars};

use helpers::*;

#[tokio::test]
async fn test_list_defaults_to_first_page_of_ten() {
    let h = harness(Fixture::default());
    let response = h
        .controller
        .list_objects(&CrudRequest::get("/posts"), TemplateVars::new())
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.template(), Some("@Test/Post/list.html"));
    let requests = h.paginator.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].page, 1);
    assert_eq!(requests[0].page_size, 10);
}

#[tokio::test]
async fn test_list_reads_page_and_per_page() {
    let h = harness(Fixture::default());
    let request = CrudRequest::get("/posts")
        .with_query("page", "2")
        .with_query("perPage", "5");
    h.controller
        .list_objects(&request, TemplateVars::new())
        .await
        .unwrap();

    let requests = h.paginator.requests.lock().unwrap().clone();
    assert_eq!(requests[0].page, 2);
    assert_eq!(requests[0].page_size, 5);
}

#[tokio::test]
async fn test_list_bad_paging_falls_back_and_clamps() {
    let h = harness(Fixture::default());
    let request = CrudRequest::get("/posts")
        .with_query("page", "abc")
        .with_query("perPage", "5000");
    h.controller
        .list_objects(&request, TemplateVars::new())
        .await
        .unwrap();

    let requests = h.paginator.requests.lock().unwrap().clone();
    assert_eq!(requests[0].page, 1);
    assert_eq!(requests[0].page_size, 100);
}

#[tokio::test]
async fn test_list_huge_page_saturates_offset() {
    let h = harness(Fixture::default());
    let request = CrudRequest::get("/posts").with_query("page", "18446744073709551615");
    h.controller
        .list_objects(&request, TemplateVars::new())
        .await
        .unwrap();

    let requests = h.paginator.requests.lock().unwrap().clone();
    assert_eq!(requests[0].page, u64::MAX);
    assert_eq!(requests[0].offset(), u64::MAX);
}

#[tokio::test]
async fn test_list_template_variables() {
    let h = harness(Fixture::default());
    h.controller
        .list_objects(&CrudRequest::get("/posts"), TemplateVars::new())
        .await
        .unwrap();

    let (_, vars) = h.renderer.last();
    let keys: Vec<&str> = vars.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "request",
            "pagination",
            "form",
            "listRoute",
            "createRoute",
            "editRoute",
            "viewRoute",
            "deleteRoute",
            "listRole",
            "createRole",
            "editRole",
            "viewRole",
            "deleteRole",
            "identifier",
            "transPrefix",
            "objectClass",
        ]
    );
    assert_eq!(vars.get("form"), Some(&json!(null)));
    assert_eq!(vars.get("listRoute"), Some(&json!("post_list")));
    assert_eq!(vars.get("deleteRole"), Some(&json!("ROLE_POST_DELETE")));
    assert_eq!(vars.get("identifier"), Some(&json!("id")));
    assert_eq!(vars.get("objectClass"), Some(&json!("Post")));
    assert_eq!(vars.get("pagination").unwrap()["total_items"], json!(2));
}

#[tokio::test]
async fn test_list_caller_overrides_win() {
    let h = harness(Fixture::default());
    let overrides = TemplateVars::new()
        .with("listRoute", json!("custom_list"))
        .with("title", json!("All posts"));
    h.controller
        .list_objects(&CrudRequest::get("/posts"), overrides)
        .await
        .unwrap();

    let (_, vars) = h.renderer.last();
    assert_eq!(vars.get("listRoute"), Some(&json!("custom_list")));
    assert_eq!(vars.get("title"), Some(&json!("All posts")));
    assert_eq!(vars.get("createRoute"), Some(&json!("post_create")));
}

#[tokio::test]
async fn test_list_denied() {
    let h = harness(Fixture {
        roles: vec![],
        ..Fixture::default()
    });
    let err = h
        .controller
        .list_objects(&CrudRequest::get("/posts"), TemplateVars::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Authorization);
    assert_eq!(err.message, "You need the permission to list entities!");
    assert_eq!(h.log.count("query:"), 0);
}

#[tokio::test]
async fn test_list_requires_filter_query_repository() {
    let h = harness(Fixture {
        filterable: false,
        ..Fixture::default()
    });
    let err = h
        .controller
        .list_objects(&CrudRequest::get("/posts"), TemplateVars::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);
}

#[tokio::test]
async fn test_list_filter_form_data_is_enriched() {
    let definition = default_definition()
        .list_form_type(FormType::new("filter").with_method(http::Method::GET))
        .list_form_data_enrich(FilterData::new().with("published", json!(true)))
        .build()
        .unwrap();
    let h = harness_with(
        Fixture {
            filter_data: FilterData::new()
                .with("title", json!("rust"))
                .with("published", json!(false)),
            ..Fixture::default()
        },
        definition,
    );

    h.controller
        .list_objects(&CrudRequest::get("/posts"), TemplateVars::new())
        .await
        .unwrap();

    assert_eq!(h.log.count("handle_request:filter"), 1);
    let query = h
        .log
        .entries()
        .into_iter()
        .find(|e| e.starts_with("query:"))
        .unwrap();
    assert_eq!(query, r#"query:{"title":"rust","published":true}"#);
    let (_, vars) = h.renderer.last();
    assert_eq!(vars.get("form").unwrap()["name"], json!("filter"));
}

#[tokio::test]
async fn test_list_grant_override_replaces_role_check() {
    let definition = default_definition()
        .grant_with(CrudAction::List, |principal, _| principal.is_some())
        .build()
        .unwrap();
    let h = harness_with(
        Fixture {
            roles: vec![],
            ..Fixture::default()
        },
        definition,
    );

    let anonymous = h
        .controller
        .list_objects(&CrudRequest::get("/posts"), TemplateVars::new())
        .await;
    assert!(anonymous.is_err());

    let request = CrudRequest::get("/posts")
        .with_principal(crudhub_core::types::Principal::new("ann", Vec::<String>::new()));
    assert!(
        h.controller
            .list_objects(&request, TemplateVars::new())
            .await
            .is_ok()
    );
    assert_eq!(h.log.count("is_granted:"), 0);
}

#[tokio::test]
async fn test_list_without_template_pattern() {
    let definition = crudhub_controller::CrudDefinition::builder("post", "Post")
        .build()
        .unwrap();
    let h = harness_with(Fixture::default(), definition);
    let err = h
        .controller
        .list_objects(&CrudRequest::get("/posts"), TemplateVars::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);
    assert!(err.message.contains("@SaxulumCrud/%s/%s.html.twig"));
}

#[tokio::test]
async fn test_list_rejects_composite_identifier() {
    let h = harness(Fixture {
        identifier: vec!["a".to_string(), "b".to_string()],
        ..Fixture::default()
    });
    let err = h
        .controller
        .list_objects(&CrudRequest::get("/posts"), TemplateVars::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);
    assert!(err.message.contains("multiple fields"));
}
