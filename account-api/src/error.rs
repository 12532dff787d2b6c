//! HTTP error mapping

use account_core::Error;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Wrapper mapping core errors onto HTTP responses
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self.0 {
            Error::InvalidArgument(_) => "VALIDATION_ERROR",
            Error::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Error::AccountNotFound(_) => "NOT_FOUND",
            Error::AlreadyExists(_) => "ALREADY_EXISTS",
            Error::Conflict(_) => "WRITE_CONFLICT",
            Error::Storage(_) => "STORAGE_UNAVAILABLE",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            Error::InvalidArgument(_) | Error::InsufficientFunds { .. } => StatusCode::BAD_REQUEST,
            Error::AccountNotFound(_) => StatusCode::NOT_FOUND,
            Error::AlreadyExists(_) => StatusCode::CONFLICT,
            // Transient and retryable: no partial write happened
            Error::Conflict(_) | Error::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
            "retryable": self.0.is_retryable(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError(Error::InvalidArgument("bad".to_string())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError(Error::InsufficientFunds {
                    balance: Decimal::ZERO,
                    requested: Decimal::ONE,
                }),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError(Error::AccountNotFound("ghost".to_string())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError(Error::AlreadyExists("acct-1".to_string())),
                StatusCode::CONFLICT,
            ),
            (
                ApiError(Error::Conflict("raced".to_string())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError(Error::Mailbox("closed".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{}", err);
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ApiError(Error::AlreadyExists("acct-1".to_string())).code(),
            "ALREADY_EXISTS"
        );
        assert_eq!(
            ApiError(Error::Storage("down".to_string())).code(),
            "STORAGE_UNAVAILABLE"
        );
    }
}
