use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use log::warn;

use crate::config::API_KEY_HEADER;
use crate::error::ApiError;
use crate::state::AppState;

/// Axum middleware that rejects requests without the shared API key.
///
/// Runs before routing reaches any handler, so no query executes and no
/// store handle is opened for rejected requests.
pub async fn require_api_key(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let presented = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    match presented {
        Some(key) if keys_match(key, state.api_key()) => next.run(req).await,
        other => {
            warn!(
                "event=auth_rejected module=api status=error method={} path={} reason={}",
                req.method(),
                req.uri().path(),
                if other.is_some() { "mismatch" } else { "missing" }
            );
            ApiError::Forbidden.into_response()
        }
    }
}

/// Compares keys without short-circuiting on the first differing byte.
///
/// Only the length comparison can exit early.
fn keys_match(presented: &str, expected: &str) -> bool {
    let (presented, expected) = (presented.as_bytes(), expected.as_bytes());
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .iter()
        .zip(expected)
        .fold(0_u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
