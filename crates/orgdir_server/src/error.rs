use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use orgdir_core::db::DbError;
use orgdir_core::{DirectoryError, DirectoryRepoError};
use std::fmt::{Display, Formatter};

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or wrong API key.
    Forbidden,
    /// Path or query parameters failed to parse.
    BadRequest(String),
    /// Query engine failure, including not-found and validation errors.
    Directory(DirectoryError),
    /// Store handle could not be acquired.
    Store(DbError),
    /// Blocking task panicked or was cancelled.
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Directory(DirectoryError::OrganizationNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Directory(
                DirectoryError::InvalidRadius(_) | DirectoryError::InvalidCoordinate { .. },
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Directory(DirectoryError::Repo(_)) | Self::Store(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden => write!(f, "invalid or missing API key"),
            Self::BadRequest(message) => write!(f, "{message}"),
            Self::Directory(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "directory store unavailable: {err}"),
            Self::Internal(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Directory(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Forbidden | Self::BadRequest(_) | Self::Internal(_) => None,
        }
    }
}

impl From<DirectoryError> for ApiError {
    fn from(value: DirectoryError) -> Self {
        Self::Directory(value)
    }
}

impl From<DirectoryRepoError> for ApiError {
    fn from(value: DirectoryRepoError) -> Self {
        Self::Directory(DirectoryError::Repo(value))
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<DbError> for ApiError {
    fn from(value: DbError) -> Self {
        Self::Store(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                "event=http_error module=api status=error code={} error={}",
                status.as_u16(),
                self
            );
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_maps_to_403() {
        assert_eq!(ApiError::Forbidden.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn organization_not_found_maps_to_404() {
        let err = ApiError::from(DirectoryError::OrganizationNotFound(7));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_radius_maps_to_422() {
        let err = ApiError::from(DirectoryError::InvalidRadius(0.0));
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn bad_request_maps_to_400() {
        let err = ApiError::BadRequest("invalid digit".to_string());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_failure_maps_to_500() {
        let err = ApiError::from(DbError::SchemaNotInitialized {
            db_version: 0,
            expected_version: 1,
        });
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_body_is_json() {
        let response = ApiError::Internal("boom".to_string()).into_response();
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(content_type.to_str().unwrap().contains("application/json"));
    }
}
