//! `HttpCrudRequest` extractor — turns an Axum request into a `CrudRequest`.

use std::collections::BTreeMap;

use axum::Form;
use axum::extract::{FromRequest, Query, Request};
use axum::http::HeaderMap;

use crudhub_core::error::{AppError, ErrorKind};
use crudhub_core::types::{CrudRequest, Principal};

use crate::error::ApiError;

/// Header carrying the authenticated user name.
pub const USER_HEADER: &str = "x-user";
/// Header carrying the comma separated roles of the user.
pub const ROLES_HEADER: &str = "x-roles";

/// The request as seen by the CRUD actions.
///
/// Reads the method, path and query string, the urlencoded body of `POST`
/// requests, and the principal set by an upstream authenticator in the
/// `x-user` / `x-roles` headers.
#[derive(Debug, Clone)]
pub struct HttpCrudRequest(pub CrudRequest);

impl<S> FromRequest<S> for HttpCrudRequest
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<BTreeMap<String, String>>::try_from_uri(req.uri())
            .map_err(|e| AppError::with_source(ErrorKind::Validation, "Invalid query string", e))?;

        let mut request = CrudRequest::new(req.method().clone(), req.uri().path());
        request.query = query;
        request.principal = principal_from_headers(req.headers());

        if request.is_post() {
            let Form(form) = Form::<BTreeMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Validation, "Invalid form submission", e)
                })?;
            request.form = form;
        }

        Ok(Self(request))
    }
}

/// Principal from the identity headers; `None` without a user name.
///
/// The headers are not verified here. They must be set by an authenticating
/// proxy that drops any client supplied values.
pub fn principal_from_headers(headers: &HeaderMap) -> Option<Principal> {
    let username = headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())?;

    let roles: Vec<String> = headers
        .get(ROLES_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|role| !role.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Some(Principal::new(username, roles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{HeaderValue, Method, header};

    #[test]
    fn test_principal_from_headers() {
        let mut headers = HeaderMap::new();
        assert!(principal_from_headers(&headers).is_none());

        headers.insert(USER_HEADER, HeaderValue::from_static("alice"));
        headers.insert(
            ROLES_HEADER,
            HeaderValue::from_static("ROLE_POST_LIST, ROLE_POST_VIEW,,"),
        );
        let principal = principal_from_headers(&headers).unwrap();
        assert_eq!(principal.username, "alice");
        assert_eq!(principal.roles, vec!["ROLE_POST_LIST", "ROLE_POST_VIEW"]);
    }

    #[tokio::test]
    async fn test_extracts_query_and_body() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/posts/new?perPage=5")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(USER_HEADER, "bob")
            .body(Body::from("title=Hello+World&published=1"))
            .unwrap();

        let HttpCrudRequest(request) = HttpCrudRequest::from_request(req, &()).await.unwrap();
        assert_eq!(request.path, "/posts/new");
        assert_eq!(request.query_param("perPage"), Some("5"));
        assert_eq!(request.form.get("title").map(String::as_str), Some("Hello World"));
        assert_eq!(request.principal.unwrap().username, "bob");
    }

    #[tokio::test]
    async fn test_rejects_json_posts() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/posts/new")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let err = HttpCrudRequest::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.0.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_decodes_percent_and_plus_in_query() {
        let req = Request::builder()
            .uri("/posts?title=Hello+World%21&flag=&page=2")
            .body(Body::empty())
            .unwrap();

        let HttpCrudRequest(request) = HttpCrudRequest::from_request(req, &()).await.unwrap();
        assert_eq!(request.query_param("title"), Some("Hello World!"));
        assert_eq!(request.query_param("flag"), Some(""));
        assert_eq!(request.query_param("page"), Some("2"));
        assert!(request.form.is_empty());
    }
}
