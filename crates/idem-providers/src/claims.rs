// JWT plumbing shared by the Google and Apple verifiers: segment decoding
// for header inspection and RS256 signature verification against a JWKS key.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::key_cache::Jwk;
use crate::provider::VerifierError;

/// The JWT header fields we care about before signature verification.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtHeader {
    pub kid: Option<String>,
    pub alg: Option<String>,
}

fn decode_segment(segment: &str) -> Result<serde_json::Value, VerifierError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| VerifierError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| VerifierError::Malformed)
}

/// Decode a JWT header without verifying the signature. Used to pick the
/// JWKS key by `kid` before the real verification happens.
pub fn decode_jwt_header(token: &str) -> Result<JwtHeader, VerifierError> {
    let header_segment = token.split('.').next().ok_or(VerifierError::Malformed)?;
    let value = decode_segment(header_segment)?;
    serde_json::from_value(value).map_err(|_| VerifierError::Malformed)
}

/// Verify an RS256 token against a JWKS key and deserialize its claims.
///
/// Audience and issuer are deliberately NOT validated here: callers check
/// them explicitly so each failure maps to its own error variant instead
/// of a catch-all. Expiry is enforced.
pub fn verify_rs256<T: DeserializeOwned>(token: &str, key: &Jwk) -> Result<T, VerifierError> {
    let decoding_key = DecodingKey::from_rsa_components(&key.n, &key.e)
        .map_err(|_| VerifierError::SignatureInvalid)?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = true;
    validation.validate_aud = false;

    let data = jsonwebtoken::decode::<T>(token, &decoding_key, &validation)
        .map_err(map_jwt_error)?;

    Ok(data.claims)
}

fn map_jwt_error(error: jsonwebtoken::errors::Error) -> VerifierError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => VerifierError::Malformed,
        ErrorKind::InvalidSignature | ErrorKind::ExpiredSignature => {
            VerifierError::SignatureInvalid
        }
        ErrorKind::InvalidAudience => VerifierError::AudienceMismatch,
        ErrorKind::InvalidIssuer => VerifierError::IssuerMismatch,
        _ => VerifierError::SignatureInvalid,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a structurally valid JWT with a fake signature. Enough for
    /// header/payload decoding; signature verification will reject it.
    pub(crate) fn build_fake_jwt(header: &serde_json::Value, payload: &serde_json::Value) -> String {
        let header_b64 = URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header_b64}.{payload_b64}.fake")
    }

    #[test]
    fn test_decode_header_extracts_kid() {
        let token = build_fake_jwt(
            &serde_json::json!({"alg": "RS256", "kid": "key-1"}),
            &serde_json::json!({"sub": "123"}),
        );

        let header = decode_jwt_header(&token).unwrap();
        assert_eq!(header.kid.as_deref(), Some("key-1"));
        assert_eq!(header.alg.as_deref(), Some("RS256"));
    }

    #[test]
    fn test_decode_header_without_kid() {
        let token = build_fake_jwt(
            &serde_json::json!({"alg": "RS256"}),
            &serde_json::json!({}),
        );

        let header = decode_jwt_header(&token).unwrap();
        assert!(header.kid.is_none());
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        assert!(matches!(
            decode_jwt_header("not-a-jwt"),
            Err(VerifierError::Malformed)
        ));
        assert!(matches!(
            decode_jwt_header("!!!.payload.sig"),
            Err(VerifierError::Malformed)
        ));
        assert!(matches!(
            decode_jwt_header(""),
            Err(VerifierError::Malformed)
        ));
    }

    #[test]
    fn test_fake_signature_fails_verification() {
        let token = build_fake_jwt(
            &serde_json::json!({"alg": "RS256", "kid": "key-1"}),
            &serde_json::json!({"sub": "123", "exp": 4_102_444_800u64}),
        );

        // Real RSA modulus shape is irrelevant here; the signature is fake
        // either way, so verification must not succeed.
        let key = Jwk {
            kid: "key-1".to_string(),
            kty: "RSA".to_string(),
            alg: Some("RS256".to_string()),
            use_: Some("sig".to_string()),
            n: URL_SAFE_NO_PAD.encode([0x01u8; 256]),
            e: "AQAB".to_string(),
        };

        let result: Result<serde_json::Value, _> = verify_rs256(&token, &key);
        assert!(result.is_err());
    }
}
