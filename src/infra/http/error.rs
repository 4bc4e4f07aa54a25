use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reelshelf_api_types::{ApiErrorBody, ApiErrorMessage};

use crate::application::catalog::CatalogError;
use crate::application::error::ErrorReport;

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const NOT_FOUND: &str = "not_found";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const UNAVAILABLE: &str = "service_unavailable";
    pub const INTERNAL: &str = "internal_error";
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
        }
    }

    pub fn bad_request(message: &'static str, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    pub fn unprocessable(message: &'static str, hint: Option<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            codes::INVALID_INPUT,
            message,
            hint,
        )
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message, None)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Map a catalog failure. Validation failures use `validation_status`, which
    /// differs between query endpoints (400) and the rating body (422).
    pub fn from_catalog(err: CatalogError, validation_status: StatusCode) -> Self {
        match err {
            CatalogError::Validation(message) => Self::new(
                validation_status,
                if validation_status == StatusCode::UNPROCESSABLE_ENTITY {
                    codes::INVALID_INPUT
                } else {
                    codes::BAD_REQUEST
                },
                "request failed validation",
                Some(message),
            ),
            CatalogError::NotFound("catalog item") => Self::not_found("catalog item not found"),
            CatalogError::NotFound(_) => Self::not_found("resource not found"),
            CatalogError::ServiceUnavailable(message) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                codes::UNAVAILABLE,
                "catalog store unavailable",
                Some(message),
            ),
            CatalogError::Internal(message) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::INTERNAL,
                "internal error",
                Some(message),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Store internals stay in the logs, not in the body.
        let public_hint = match self.status {
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::INTERNAL_SERVER_ERROR => None,
            _ => self.hint.clone(),
        };
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint: public_hint,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message(
            "infra::http::error",
            self.status,
            format!(
                "{}: {}",
                self.code,
                self.hint.as_deref().unwrap_or(self.message)
            ),
        )
        .attach(&mut response);
        response
    }
}
