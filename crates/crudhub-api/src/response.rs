//! HTTP rendering of action outcomes.

use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};

use crudhub_core::types::CrudResponse;

/// A [`CrudResponse`] sent as HTML (200) or a redirect (302).
#[derive(Debug, Clone)]
pub struct HttpCrudResponse(pub CrudResponse);

impl From<CrudResponse> for HttpCrudResponse {
    fn from(response: CrudResponse) -> Self {
        Self(response)
    }
}

impl IntoResponse for HttpCrudResponse {
    fn into_response(self) -> Response {
        match self.0 {
            CrudResponse::Html { body, .. } => (StatusCode::OK, Html(body)).into_response(),
            CrudResponse::Redirect { location } => {
                (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect() {
        let response = HttpCrudResponse(CrudResponse::Redirect {
            location: "http://localhost/posts".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "http://localhost/posts"
        );
    }

    #[test]
    fn test_html() {
        let response = HttpCrudResponse(CrudResponse::Html {
            template: "list.html".to_string(),
            body: "<ul></ul>".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
    }
}
