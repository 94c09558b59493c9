// Apple ID token verification.
//
// Sign in with Apple always produces a signed RS256 identity token. There
// is no userinfo endpoint and no fallback: the signature, audience, and
// issuer checks are all hard requirements. Two Apple quirks shape this
// module: the token never carries a name (the client receives it once, on
// first login, and forwards it as an auxiliary payload), and returning
// users may get tokens without an email claim, which we replace with a
// deterministic pseudo-email derived from the stable subject.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::claims::{decode_jwt_header, verify_rs256};
use crate::http::HttpClient;
use crate::identity::{pseudo_email, ResolvedIdentity};
use crate::key_cache::{ProviderKeyCache, APPLE_JWKS_URL};
use crate::provider::{Provider, TokenVerifier, VerifierError};

pub const APPLE_ISSUER: &str = "https://appleid.apple.com";

#[derive(Debug, Deserialize)]
struct AppleIdClaims {
    sub: String,
    aud: String,
    iss: String,
    email: Option<String>,
}

pub struct AppleVerifier {
    service_id: String,
    namespace: String,
    keys: ProviderKeyCache,
}

impl std::fmt::Debug for AppleVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppleVerifier")
            .field("service_id", &self.service_id)
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl AppleVerifier {
    pub fn new(
        service_id: impl Into<String>,
        namespace: impl Into<String>,
        http: Arc<dyn HttpClient>,
        timeout: Duration,
    ) -> Self {
        Self {
            service_id: service_id.into(),
            namespace: namespace.into(),
            keys: ProviderKeyCache::new(http, APPLE_JWKS_URL, timeout),
        }
    }

    fn identity_from_claims(
        &self,
        claims: AppleIdClaims,
        aux: Option<&serde_json::Value>,
    ) -> Result<ResolvedIdentity, VerifierError> {
        if claims.aud != self.service_id {
            return Err(VerifierError::AudienceMismatch);
        }
        if claims.iss != APPLE_ISSUER {
            return Err(VerifierError::IssuerMismatch);
        }

        let email = claims
            .email
            .unwrap_or_else(|| pseudo_email(Provider::Apple, &claims.sub, &self.namespace));

        Ok(ResolvedIdentity::new(Provider::Apple, email, aux_name(aux)))
    }
}

/// Extract a display name from the first-login auxiliary payload,
/// `{"name": {"firstName": ..., "lastName": ...}}`. Absent, empty, or
/// whitespace-only parts collapse to no name at all.
fn aux_name(aux: Option<&serde_json::Value>) -> Option<String> {
    let name = aux?.get("name")?;
    let first = name
        .get("firstName")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .trim();
    let last = name
        .get("lastName")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .trim();

    let full = format!("{first} {last}");
    let full = full.trim();
    if full.is_empty() {
        None
    } else {
        Some(full.to_string())
    }
}

#[async_trait]
impl TokenVerifier for AppleVerifier {
    fn provider(&self) -> Provider {
        Provider::Apple
    }

    async fn verify(
        &self,
        token: &str,
        aux: Option<&serde_json::Value>,
    ) -> Result<ResolvedIdentity, VerifierError> {
        let header = decode_jwt_header(token)?;
        let kid = header.kid.ok_or(VerifierError::Malformed)?;
        let key = self.keys.get(&kid).await?;

        let claims: AppleIdClaims = verify_rs256(token, &key)?;
        self.identity_from_claims(claims, aux)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::tests::build_fake_jwt;
    use crate::http::MockHttpClient;

    fn verifier(mock: Arc<MockHttpClient>) -> AppleVerifier {
        AppleVerifier::new("com.example.service", "idem", mock, Duration::from_secs(5))
    }

    fn claims(aud: &str, iss: &str, email: Option<&str>) -> AppleIdClaims {
        AppleIdClaims {
            sub: "001234.abcdef".to_string(),
            aud: aud.to_string(),
            iss: iss.to_string(),
            email: email.map(|s| s.to_string()),
        }
    }

    #[tokio::test]
    async fn test_malformed_token_fails_before_any_fetch() {
        let mock = Arc::new(MockHttpClient::new());

        let result = verifier(mock.clone()).verify("not-a-jwt", None).await;
        assert!(matches!(result, Err(VerifierError::Malformed)));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_header_without_kid_is_malformed() {
        let mock = Arc::new(MockHttpClient::new());
        let token = build_fake_jwt(
            &serde_json::json!({"alg": "RS256"}),
            &serde_json::json!({"sub": "x"}),
        );

        let result = verifier(mock.clone()).verify(&token, None).await;
        assert!(matches!(result, Err(VerifierError::Malformed)));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_fake_signature_is_rejected() {
        let mock = Arc::new(MockHttpClient::new());
        mock.push_response(
            200,
            serde_json::json!({
                "keys": [{"kid": "apple-key", "kty": "RSA", "n": "bW9kdWx1cw", "e": "AQAB"}]
            })
            .to_string(),
        );

        let token = build_fake_jwt(
            &serde_json::json!({"alg": "RS256", "kid": "apple-key"}),
            &serde_json::json!({
                "sub": "001234.abcdef",
                "aud": "com.example.service",
                "iss": APPLE_ISSUER,
                "exp": 4_102_444_800u64
            }),
        );

        let result = verifier(mock.clone()).verify(&token, None).await;
        assert!(result.is_err());
        assert_eq!(mock.requests()[0].url, APPLE_JWKS_URL);
    }

    #[tokio::test]
    async fn test_key_fetch_failure_is_provider_api_error() {
        let mock = Arc::new(MockHttpClient::new());
        mock.push_response(500, "upstream broken");

        let token = build_fake_jwt(
            &serde_json::json!({"alg": "RS256", "kid": "apple-key"}),
            &serde_json::json!({"sub": "x"}),
        );

        let result = verifier(mock).verify(&token, None).await;
        assert!(matches!(result, Err(VerifierError::ProviderApi(_))));
    }

    #[test]
    fn test_audience_mismatch_is_hard_failure() {
        let mock = Arc::new(MockHttpClient::new());
        let result = verifier(mock).identity_from_claims(
            claims("com.other.app", APPLE_ISSUER, Some("a@x.com")),
            None,
        );
        assert!(matches!(result, Err(VerifierError::AudienceMismatch)));
    }

    #[test]
    fn test_issuer_mismatch_is_hard_failure() {
        let mock = Arc::new(MockHttpClient::new());
        let result = verifier(mock).identity_from_claims(
            claims("com.example.service", "https://evil.example", Some("a@x.com")),
            None,
        );
        assert!(matches!(result, Err(VerifierError::IssuerMismatch)));
    }

    #[test]
    fn test_email_claim_passes_through() {
        let mock = Arc::new(MockHttpClient::new());
        let identity = verifier(mock)
            .identity_from_claims(
                claims("com.example.service", APPLE_ISSUER, Some("real@x.com")),
                None,
            )
            .unwrap();
        assert_eq!(identity.email, "real@x.com");
        assert!(identity.name.is_none());
    }

    #[test]
    fn test_missing_email_synthesizes_pseudo_email_from_sub() {
        let mock = Arc::new(MockHttpClient::new());
        let identity = verifier(mock)
            .identity_from_claims(claims("com.example.service", APPLE_ISSUER, None), None)
            .unwrap();
        assert_eq!(identity.email, "001234.abcdef@apple.idem.user");
    }

    #[test]
    fn test_first_login_payload_supplies_name() {
        let mock = Arc::new(MockHttpClient::new());
        let aux = serde_json::json!({"name": {"firstName": "Ann", "lastName": "Lee"}});
        let identity = verifier(mock)
            .identity_from_claims(
                claims("com.example.service", APPLE_ISSUER, Some("ann@x.com")),
                Some(&aux),
            )
            .unwrap();
        assert_eq!(identity.name.as_deref(), Some("Ann Lee"));
    }

    #[test]
    fn test_aux_name_variants() {
        let both = serde_json::json!({"name": {"firstName": "Ann", "lastName": "Lee"}});
        assert_eq!(aux_name(Some(&both)).as_deref(), Some("Ann Lee"));

        let first_only = serde_json::json!({"name": {"firstName": "Ann"}});
        assert_eq!(aux_name(Some(&first_only)).as_deref(), Some("Ann"));

        let last_only = serde_json::json!({"name": {"lastName": "Lee"}});
        assert_eq!(aux_name(Some(&last_only)).as_deref(), Some("Lee"));

        let whitespace = serde_json::json!({"name": {"firstName": "  ", "lastName": ""}});
        assert_eq!(aux_name(Some(&whitespace)), None);

        let no_name_key = serde_json::json!({"other": true});
        assert_eq!(aux_name(Some(&no_name_key)), None);

        assert_eq!(aux_name(None), None);
    }
}
