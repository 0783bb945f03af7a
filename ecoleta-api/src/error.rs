//! Mapping of service failures onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use ecoleta_core::service::ServiceError;

/// Error carried out of handlers and rendered as a `{ "message": ... }` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Client-side request error.
    pub fn bad_request<M: Into<String>>(message: M) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Server-side failure. The detail is logged, not leaked to the client.
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        tracing::error!("internal error: {err}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal server error".to_owned(),
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::MissingField(_) | ServiceError::NoItems | ServiceError::UnknownItem(_) => {
                Self {
                    status: StatusCode::BAD_REQUEST,
                    message: err.to_string(),
                }
            }
            ServiceError::NotFound => Self {
                status: StatusCode::NOT_FOUND,
                message: "Point not found".to_owned(),
            },
            ServiceError::Store(store_err) => Self::internal(store_err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecoleta_core::model::ItemId;
    use ecoleta_core::ports::StoreError;

    #[test]
    fn validation_failures_map_to_bad_request() {
        assert_eq!(
            ApiError::from(ServiceError::MissingField("name")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::from(ServiceError::NoItems).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(ServiceError::UnknownItem(ItemId(9))).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn not_found_and_store_failures_keep_their_own_codes() {
        assert_eq!(ApiError::from(ServiceError::NotFound).status(), StatusCode::NOT_FOUND);
        let store_failure = ServiceError::Store(StoreError::backend("connection reset"));
        assert_eq!(
            ApiError::from(store_failure).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
