use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode, Uri},
    middleware::Next,
    response::Response,
};

use serde::Deserialize;

use flashcart_core::UserId;

use crate::app::errors;
use crate::context::UserContext;

pub const USER_HEADER: &str = "x-user-id";

#[derive(Debug, Default, Deserialize)]
struct UserQuery {
    user_id: Option<String>,
}

/// Resolve the requesting user: `user_id` query parameter, then the
/// `X-User-ID` header, then [`UserContext::DEFAULT_USER`].
pub async fn user_context_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let user = resolve_user(req.uri(), req.headers()).map_err(|raw| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_user_id",
            format!("user id must be a non-negative integer, got '{raw}'"),
        )
    })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Returns the offending raw value when a user id is present but unparsable.
fn resolve_user(uri: &Uri, headers: &HeaderMap) -> Result<UserContext, String> {
    let from_query = Query::<UserQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(query)| query.user_id)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let from_header = || {
        headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    match from_query.or_else(from_header) {
        None => Ok(UserContext::default()),
        Some(raw) => raw.parse::<UserId>().map(UserContext::new).map_err(|_| raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(user: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(user) = user {
            headers.insert(USER_HEADER, HeaderValue::from_str(user).unwrap());
        }
        headers
    }

    #[test]
    fn query_wins_over_header() {
        let uri: Uri = "/api/cart?mode=safe&user_id=7".parse().unwrap();
        let user = resolve_user(&uri, &headers(Some("9"))).unwrap();
        assert_eq!(user.user_id(), UserId::new(7));
    }

    #[test]
    fn header_then_default() {
        let uri: Uri = "/api/cart".parse().unwrap();
        assert_eq!(resolve_user(&uri, &headers(Some(" 9 "))).unwrap().user_id(), UserId::new(9));
        assert_eq!(resolve_user(&uri, &headers(None)).unwrap(), UserContext::default());
    }

    #[test]
    fn unparsable_user_is_reported() {
        let uri: Uri = "/api/cart?user_id=bob".parse().unwrap();
        assert_eq!(resolve_user(&uri, &headers(None)), Err("bob".to_string()));
    }

    #[test]
    fn query_user_is_percent_decoded() {
        let uri: Uri = "/api/cart?user_id=%37".parse().unwrap();
        assert_eq!(resolve_user(&uri, &headers(None)).unwrap().user_id(), UserId::new(7));

        let uri: Uri = "/api/cart?user_id=&mode=safe".parse().unwrap();
        assert_eq!(resolve_user(&uri, &headers(Some("9"))).unwrap().user_id(), UserId::new(9));
    }
}
