//! Static bearer-token authentication for the `/api` routes.
//!
//! When auth is disabled in config every request passes. Otherwise a
//! missing `Authorization` header is rejected with 401 and a header that
//! is not exactly `Bearer <token>` with 403.

use axum::extract::State;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use cs_core::config::AuthConfig;
use cs_core::Error;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::context::AppContext;
use crate::error::AppError;
use crate::middleware::request_id::RequestId;

type HmacSha256 = Hmac<Sha256>;

/// Compare tokens in constant time by checking MACs of equal length.
fn token_matches(presented: &str, expected: &str) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(expected.as_bytes()) else {
        return false;
    };
    mac.update(expected.as_bytes());
    let expected_tag = mac.finalize().into_bytes();

    let Ok(mut mac) = HmacSha256::new_from_slice(expected.as_bytes()) else {
        return false;
    };
    mac.update(presented.as_bytes());
    mac.verify_slice(&expected_tag).is_ok()
}

/// Check an `Authorization` header value against the configured token.
pub fn validate_bearer(auth: &AuthConfig, authorization: Option<&str>) -> Result<(), Error> {
    if !auth.enabled {
        return Ok(());
    }

    let Some(value) = authorization else {
        return Err(Error::Unauthorized("Authorization token is required".into()));
    };

    let presented = value.strip_prefix("Bearer ");
    match (presented, auth.token.as_deref()) {
        (Some(presented), Some(expected))
            if !expected.is_empty() && token_matches(presented, expected) =>
        {
            Ok(())
        }
        _ => Err(Error::Forbidden("Invalid authorization token".into())),
    }
}

/// Axum middleware wrapping [`validate_bearer`].
pub async fn auth_middleware(
    State(ctx): State<AppContext>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match validate_bearer(&ctx.config.auth, authorization) {
        Ok(()) => next.run(request).await,
        Err(e) => {
            tracing::debug!("rejected {} {}: {e}", request.method(), request.uri().path());
            let mut err = AppError::new(e);
            if let Some(RequestId(id)) = request.extensions().get::<RequestId>() {
                err = err.with_request_id(id.clone());
            }
            err.into_response()
        }
    }
}
