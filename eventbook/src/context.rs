//! Caller identity
//!
//! Populated by the HTTP layer and made available to GraphQL resolvers via
//! `ctx.data_opt::<CurrentUser>()`. Identity is asserted by the client, not
//! verified.

use axum::http::HeaderMap;
use bson::oid::ObjectId;

use crate::model::parse_id;

/// Request header carrying the caller's user id
pub const CALLER_HEADER: &str = "x-user-id";

/// The user on whose behalf a request runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: ObjectId,
}

impl CurrentUser {
    /// Read the caller from [`CALLER_HEADER`]; absent or malformed ids yield
    /// `None`
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let raw = headers.get(CALLER_HEADER)?.to_str().ok()?;
        match parse_id(raw) {
            Ok(id) => Some(Self { id }),
            Err(e) => {
                tracing::warn!(header = CALLER_HEADER, error = %e, "ignoring caller header");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_from_headers() {
        let id = ObjectId::new();
        let mut headers = HeaderMap::new();
        assert_eq!(CurrentUser::from_headers(&headers), None);

        headers.insert(CALLER_HEADER, HeaderValue::from_str(&id.to_hex()).unwrap());
        assert_eq!(CurrentUser::from_headers(&headers), Some(CurrentUser { id }));

        headers.insert(CALLER_HEADER, HeaderValue::from_static("someone"));
        assert_eq!(CurrentUser::from_headers(&headers), None);
    }
}
