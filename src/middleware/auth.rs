// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token middleware.
//!
//! The caller's Strava access token is forwarded upstream as-is; it is
//! validated by Strava, not here.

use crate::services::fetcher::AccessToken;
use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};

/// Middleware that requires an `Authorization: Bearer <token>` header and
/// stores the token as an [`AccessToken`] request extension.
pub async fn require_bearer(mut request: Request, next: Next) -> Result<Response, StatusCode> {
    let token = bearer_token(&request).ok_or(StatusCode::UNAUTHORIZED)?;
    request.extensions_mut().insert(token);
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<AccessToken> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(AccessToken::new(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::{routing::get, Extension, Router};
    use tower::ServiceExt; // for oneshot

    fn app() -> Router {
        Router::new()
            .route(
                "/",
                get(|Extension(token): Extension<AccessToken>| async move {
                    token.as_str().to_string()
                }),
            )
            .layer(axum::middleware::from_fn(require_bearer))
    }

    #[tokio::test]
    async fn test_bearer_token_is_forwarded() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::AUTHORIZATION, "Bearer abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"abc123");
    }

    #[tokio::test]
    async fn test_rejects_missing_or_malformed_header() {
        for value in [None, Some("abc123"), Some("Basic abc123"), Some("Bearer ")] {
            let mut builder = Request::builder().uri("/");
            if let Some(value) = value {
                builder = builder.header(header::AUTHORIZATION, value);
            }
            let response = app()
                .oneshot(builder.body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{:?}", value);
        }
    }
}
