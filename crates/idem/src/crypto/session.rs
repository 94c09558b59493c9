// Session tokens — HS256 sign/verify using the `jsonwebtoken` crate.
//
// A successful login or activation returns one of these. The engine keeps
// no session table; the token is self-contained and expires on its own.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use idem_core::{IdemError, User};

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub iat: u64,
    pub exp: u64,
}

/// Sign a session token for a user, valid for `expires_in_secs`.
pub fn sign_session_token(
    user: &User,
    secret: &str,
    expires_in_secs: u64,
) -> Result<String, IdemError> {
    let now = chrono::Utc::now().timestamp() as u64;
    let claims = SessionClaims {
        sub: user.id.clone(),
        email: user.email.clone(),
        iat: now,
        exp: now + expires_in_secs,
    };

    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    jsonwebtoken::encode(&header, &claims, &key)
        .map_err(|e| IdemError::Crypto(format!("Session token signing failed: {e}")))
}

/// Verify a session token and return its claims.
///
/// Returns `None` if the token is invalid, tampered with, or expired.
pub fn verify_session_token(token: &str, secret: &str) -> Option<SessionClaims> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = jsonwebtoken::decode::<SessionClaims>(token, &key, &validation).ok()?;
    Some(token_data.claims)
}
