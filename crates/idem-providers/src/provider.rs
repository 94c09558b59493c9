// Provider dispatch types.
//
// `Provider` is a closed enum: adding a provider means adding a variant and
// a verifier, and the compiler finds every dispatch site. Unknown provider
// strings fail at parse time, before any I/O.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use idem_core::error::{ApiError, ErrorCode, HttpStatus};

use crate::identity::ResolvedIdentity;

/// The identity provenances the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Facebook,
    Apple,
    /// Local email/password credentials.
    Local,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Facebook => "facebook",
            Provider::Apple => "apple",
            Provider::Local => "local",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Provider {
    type Err = VerifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Provider::Google),
            "facebook" => Ok(Provider::Facebook),
            "apple" => Ok(Provider::Apple),
            "local" => Ok(Provider::Local),
            other => Err(VerifierError::Unsupported(other.to_string())),
        }
    }
}

/// Failures a verifier (or the resolver routing to one) can produce.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VerifierError {
    #[error("Missing or invalid request fields")]
    InvalidRequest,

    #[error("Unsupported provider: {0}")]
    Unsupported(String),

    #[error("Malformed token")]
    Malformed,

    #[error("Token signature verification failed")]
    SignatureInvalid,

    #[error("Token audience mismatch")]
    AudienceMismatch,

    #[error("Token issuer mismatch")]
    IssuerMismatch,

    #[error("Provider API error: {0}")]
    ProviderApi(String),
}

impl From<VerifierError> for ApiError {
    fn from(e: VerifierError) -> Self {
        match e {
            VerifierError::InvalidRequest => ApiError::bad_request(ErrorCode::InvalidRequest),
            VerifierError::Unsupported(name) => ApiError::with_message(
                HttpStatus::BadRequest,
                ErrorCode::UnsupportedProvider,
                format!("Unsupported provider: {name}"),
            ),
            VerifierError::Malformed => ApiError::unauthorized(ErrorCode::MalformedToken),
            VerifierError::SignatureInvalid => ApiError::unauthorized(ErrorCode::SignatureInvalid),
            VerifierError::AudienceMismatch => ApiError::unauthorized(ErrorCode::AudienceMismatch),
            VerifierError::IssuerMismatch => ApiError::unauthorized(ErrorCode::IssuerMismatch),
            VerifierError::ProviderApi(detail) => ApiError::with_message(
                HttpStatus::InternalServerError,
                ErrorCode::ProviderApiError,
                detail,
            ),
        }
    }
}

/// One verifier per social `Provider` variant.
///
/// `aux` is the auxiliary payload some clients send alongside the token;
/// only Apple uses it (first-login name).
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    fn provider(&self) -> Provider;

    async fn verify(
        &self,
        token: &str,
        aux: Option<&serde_json::Value>,
    ) -> Result<ResolvedIdentity, VerifierError>;
}
