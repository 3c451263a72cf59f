//! `Session` extractor — identifies the flash bag of the caller by cookie.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "crudhub_session";

/// The caller's session, created on first contact.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    jar: CookieJar,
}

impl Session {
    /// Session ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Cookie jar to send back; carries the cookie of a new session.
    pub fn into_jar(self) -> CookieJar {
        self.jar
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        if let Some(id) = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|id| !id.is_empty())
        {
            return Ok(Self { id, jar });
        }

        let id = Uuid::new_v4().to_string();
        tracing::debug!(session = %id, "Started session");
        let cookie = Cookie::build((SESSION_COOKIE, id.clone()))
            .path("/")
            .http_only(true);
        Ok(Self {
            id,
            jar: jar.add(cookie),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, header};

    async fn session_for(request: Request<()>) -> Session {
        let (mut parts, _) = request.into_parts();
        Session::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_reuses_cookie() {
        let request = Request::builder()
            .header(header::COOKIE, format!("{SESSION_COOKIE}=abc"))
            .body(())
            .unwrap();
        let session = session_for(request).await;
        assert_eq!(session.id(), "abc");
    }

    #[tokio::test]
    async fn test_creates_session() {
        let session = session_for(Request::builder().body(()).unwrap()).await;
        let id = session.id().to_string();
        assert!(Uuid::parse_str(&id).is_ok());
        let jar = session.into_jar();
        assert_eq!(jar.get(SESSION_COOKIE).map(|c| c.value().to_string()), Some(id));
    }
}
