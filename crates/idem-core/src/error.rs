// Error taxonomy for the identity engine.
//
// Every failure a verifier, flow, or store can produce maps to exactly one
// `ErrorCode`, and every code maps to exactly one HTTP status at the request
// boundary: 400 for malformed input, 401 for a failed proof of identity,
// 403 for a valid but inactive account, 500 for store or provider failures.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::db::store::StoreError;

/// Stable machine-readable error codes, serialized SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidRequest,
    UnsupportedProvider,
    MalformedToken,
    SignatureInvalid,
    AudienceMismatch,
    IssuerMismatch,
    ProviderApiError,
    EmailTaken,
    InvalidCredentials,
    NotActivated,
    InvalidToken,
    StoreError,
    InternalServerError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::InvalidRequest => "Missing or invalid request fields",
            Self::UnsupportedProvider => "Unsupported provider",
            Self::MalformedToken => "Malformed token",
            Self::SignatureInvalid => "Token signature verification failed",
            Self::AudienceMismatch => "Token audience mismatch",
            Self::IssuerMismatch => "Token issuer mismatch",
            Self::ProviderApiError => "Identity provider request failed",
            Self::EmailTaken => "Email already registered",
            Self::InvalidCredentials => "Invalid email or password",
            Self::NotActivated => "Account not activated",
            Self::InvalidToken => "Invalid or expired token",
            Self::StoreError => "User store operation failed",
            Self::InternalServerError => "Internal server error",
        };
        write!(f, "{msg}")
    }
}

/// HTTP status codes used at the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpStatus {
    Ok = 200,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    InternalServerError = 500,
}

impl HttpStatus {
    pub fn status_code(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status_code())
    }
}

/// Request-boundary error: an HTTP status, a code, and a readable message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{status} {code:?}: {message}")]
pub struct ApiError {
    pub status: HttpStatus,
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: HttpStatus, code: ErrorCode) -> Self {
        Self {
            message: code.to_string(),
            status,
            code,
        }
    }

    pub fn with_message(status: HttpStatus, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(code: ErrorCode) -> Self {
        Self::new(HttpStatus::BadRequest, code)
    }

    pub fn unauthorized(code: ErrorCode) -> Self {
        Self::new(HttpStatus::Unauthorized, code)
    }

    pub fn forbidden(code: ErrorCode) -> Self {
        Self::new(HttpStatus::Forbidden, code)
    }

    pub fn internal(code: ErrorCode) -> Self {
        Self::new(HttpStatus::InternalServerError, code)
    }

    /// JSON body for the failure response.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "success": false,
            "code": self.code,
            "message": self.message,
        })
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            // A uniqueness violation surfacing this far means a registration
            // lost the insert race; the caller-visible fact is "email taken".
            StoreError::Duplicate(_) => Self::bad_request(ErrorCode::EmailTaken),
            other => Self::with_message(
                HttpStatus::InternalServerError,
                ErrorCode::StoreError,
                other.to_string(),
            ),
        }
    }
}

/// Library-level error union for non-request failures.
#[derive(Debug, thiserror::Error)]
pub enum IdemError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Unified result type for idem operations.
pub type Result<T> = std::result::Result<T, IdemError>;
