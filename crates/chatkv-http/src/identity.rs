//! Caller identity extraction.
//!
//! Authentication happens upstream (a session-aware proxy or gateway).
//! It forwards the resolved user id in the `x-user-id` header; this module
//! only reads it. A missing or empty header means an anonymous caller.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller's user id, if the request is authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub Option<String>);

impl Caller {
    pub fn user_id(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Read the user id header.
///
/// Returns None if the header is missing, not valid UTF-8, or blank.
fn user_id_from_headers(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(user_id_from_headers(&parts.headers)))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn user_id_present() {
        let req = Request::builder()
            .header(USER_ID_HEADER, "alice")
            .body(())
            .unwrap();
        assert_eq!(user_id_from_headers(req.headers()), Some("alice".to_string()));
    }

    #[test]
    fn user_id_trims_whitespace() {
        let req = Request::builder()
            .header(USER_ID_HEADER, "  alice ")
            .body(())
            .unwrap();
        assert_eq!(user_id_from_headers(req.headers()), Some("alice".to_string()));
    }

    #[test]
    fn user_id_missing() {
        let req = Request::builder().body(()).unwrap();
        assert_eq!(user_id_from_headers(req.headers()), None);
    }

    #[test]
    fn user_id_blank() {
        let req = Request::builder()
            .header(USER_ID_HEADER, "   ")
            .body(())
            .unwrap();
        assert_eq!(user_id_from_headers(req.headers()), None);
    }

    #[tokio::test]
    async fn caller_extractor_reads_header() {
        let req = Request::builder()
            .header(USER_ID_HEADER, "bob")
            .body(())
            .unwrap();
        let (mut parts, _) = req.into_parts();

        let caller = Caller::from_request_parts(&mut parts, &()).await.unwrap();

        assert_eq!(caller.user_id(), Some("bob"));
    }
}
