//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the server.
//! Every failure a handler can produce, from a missing bearer token to an unreachable
//! payment processor, is funnelled through it so that clients always receive the same
//! `{"error": true, "message": ...}` envelope.
//!
//! `AppError` implements `actix_web::error::ResponseError`, and provides `From`
//! implementations for the driver and client errors it wraps (`mongodb`, `bson`,
//! `validator`, `reqwest`, `lettre`) so that handlers can use the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Message returned for every rejected bearer token.
pub const UNAUTHORIZED_ACCESS: &str = "unAuthorized Access";

/// Message returned when the token identity does not own the requested resource.
pub const FORBIDDEN_ACCESS: &str = "Forbidden Access";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// The request carried no token, or the token failed verification (HTTP 401).
    Unauthorized(String),
    /// The token is valid but belongs to someone else (HTTP 403).
    Forbidden(String),
    /// A request body, path, or query failed validation (HTTP 400).
    ValidationError(String),
    /// An identifier could not be parsed as a document id (HTTP 400).
    InvalidId(String),
    /// Represents an error originating from the document store (HTTP 500).
    DatabaseError(String),
    /// The payment processor or mail relay rejected the call (HTTP 502).
    UpstreamFailure(String),
    /// Represents an unexpected server-side error (HTTP 500).
    InternalServerError(String),
}

impl AppError {
    pub fn unauthorized() -> Self {
        AppError::Unauthorized(UNAUTHORIZED_ACCESS.into())
    }

    pub fn forbidden() -> Self {
        AppError::Forbidden(FORBIDDEN_ACCESS.into())
    }

    fn message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::ValidationError(msg)
            | AppError::InvalidId(msg)
            | AppError::DatabaseError(msg)
            | AppError::UpstreamFailure(msg)
            | AppError::InternalServerError(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::InvalidId(msg) => write!(f, "Invalid Id: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::UpstreamFailure(msg) => write!(f, "Upstream Failure: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// Auth failures keep the exact message the frontend checks for; everything else
/// carries the underlying error text.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::ValidationError(_) | AppError::InvalidId(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": true,
            "message": self.message()
        }))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(error: mongodb::error::Error) -> AppError {
        AppError::DatabaseError(error.to_string())
    }
}

impl From<mongodb::bson::oid::Error> for AppError {
    fn from(error: mongodb::bson::oid::Error) -> AppError {
        AppError::InvalidId(error.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for AppError {
    fn from(error: mongodb::bson::ser::Error) -> AppError {
        AppError::DatabaseError(error.to_string())
    }
}

/// Preserves the detailed validation messages.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> AppError {
        AppError::UpstreamFailure(error.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for AppError {
    fn from(error: lettre::transport::smtp::Error) -> AppError {
        AppError::UpstreamFailure(error.to_string())
    }
}

impl From<lettre::error::Error> for AppError {
    fn from(error: lettre::error::Error) -> AppError {
        AppError::UpstreamFailure(error.to_string())
    }
}

impl From<lettre::address::AddressError> for AppError {
    fn from(error: lettre::address::AddressError) -> AppError {
        AppError::ValidationError(format!("Invalid mail address: {}", error))
    }
}
