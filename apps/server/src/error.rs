use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tokenfolio_core::errors::Error as CoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Core(e) => match e {
                CoreError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
                CoreError::ConstraintViolation(_) => (StatusCode::CONFLICT, e.to_string()),
                CoreError::Validation(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                CoreError::PricingUnavailable(_) | CoreError::Cancelled => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "pricing unavailable".to_string(),
                ),
                CoreError::Cache(_) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
                CoreError::Unexpected(_) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            },
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = self.status_and_message();
        if status.is_server_error() {
            tracing::warn!("Request failed with {}: {}", status, self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: CoreError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn maps_core_errors_to_status_codes() {
        assert_eq!(status_of(CoreError::NotFound("w".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(CoreError::ConstraintViolation("dup".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(CoreError::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoreError::PricingUnavailable("down".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status_of(CoreError::Cancelled), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            status_of(CoreError::Unexpected("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn pricing_failures_hide_provider_details() {
        let (_, message) =
            ApiError::from(CoreError::PricingUnavailable("COINGECKO: 500".into()))
                .status_and_message();

        assert_eq!(message, "pricing unavailable");
    }
}
