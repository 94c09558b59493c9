// Google token verification.
//
// Clients hand us either a signed ID token or an opaque OAuth access
// token, and there is no reliable way to tell which short of trying. So
// verification is two-stage: attempt full ID-token validation first, and
// on any failure fall back to presenting the credential as a bearer token
// at the userinfo endpoint. Only the fallback's failure is surfaced.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::claims::{decode_jwt_header, verify_rs256};
use crate::http::HttpClient;
use crate::identity::ResolvedIdentity;
use crate::key_cache::{ProviderKeyCache, GOOGLE_JWKS_URL};
use crate::provider::{Provider, TokenVerifier, VerifierError};

pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Both issuer spellings Google has historically used in ID tokens.
pub const GOOGLE_ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];

#[derive(Debug, Deserialize)]
struct GoogleIdClaims {
    aud: String,
    iss: String,
    email: Option<String>,
    name: Option<String>,
}

pub struct GoogleVerifier {
    client_id: Option<String>,
    keys: ProviderKeyCache,
    http: Arc<dyn HttpClient>,
    timeout: Duration,
}

impl std::fmt::Debug for GoogleVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleVerifier")
            .field("client_id", &self.client_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GoogleVerifier {
    /// `client_id` is the expected ID-token audience. Without one the
    /// ID-token stage can never pass, but access tokens still verify
    /// through the userinfo fallback.
    pub fn new(client_id: Option<String>, http: Arc<dyn HttpClient>, timeout: Duration) -> Self {
        Self {
            client_id,
            keys: ProviderKeyCache::new(http.clone(), GOOGLE_JWKS_URL, timeout),
            http,
            timeout,
        }
    }

    async fn verify_id_token(&self, token: &str) -> Result<ResolvedIdentity, VerifierError> {
        // No configured audience means nothing to validate `aud` against.
        let client_id = self
            .client_id
            .as_deref()
            .ok_or(VerifierError::AudienceMismatch)?;

        let header = decode_jwt_header(token)?;
        let kid = header.kid.ok_or(VerifierError::Malformed)?;
        let key = self.keys.get(&kid).await?;

        let claims: GoogleIdClaims = verify_rs256(token, &key)?;
        Self::identity_from_id_claims(claims, client_id)
    }

    fn identity_from_id_claims(
        claims: GoogleIdClaims,
        client_id: &str,
    ) -> Result<ResolvedIdentity, VerifierError> {
        if claims.aud != client_id {
            return Err(VerifierError::AudienceMismatch);
        }
        if !GOOGLE_ISSUERS.contains(&claims.iss.as_str()) {
            return Err(VerifierError::IssuerMismatch);
        }
        let email = claims.email.ok_or(VerifierError::Malformed)?;

        Ok(ResolvedIdentity::new(Provider::Google, email, claims.name))
    }

    async fn fetch_userinfo(&self, token: &str) -> Result<ResolvedIdentity, VerifierError> {
        let bearer = format!("Bearer {token}");
        let response = self
            .http
            .get(
                GOOGLE_USERINFO_URL,
                &[("Authorization", bearer.as_str())],
                &[],
                self.timeout,
            )
            .await
            .map_err(|e| VerifierError::ProviderApi(e.to_string()))?;

        if !response.is_success() {
            return Err(VerifierError::ProviderApi(format!(
                "userinfo returned status {}",
                response.status
            )));
        }

        let body: serde_json::Value = serde_json::from_str(&response.body)
            .map_err(|e| VerifierError::ProviderApi(format!("userinfo parse failed: {e}")))?;

        let email = body
            .get("email")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                VerifierError::ProviderApi("userinfo response missing email".to_string())
            })?;
        let name = body
            .get("name")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        Ok(ResolvedIdentity::new(Provider::Google, email, name))
    }
}

#[async_trait]
impl TokenVerifier for GoogleVerifier {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    async fn verify(
        &self,
        token: &str,
        _aux: Option<&serde_json::Value>,
    ) -> Result<ResolvedIdentity, VerifierError> {
        match self.verify_id_token(token).await {
            Ok(identity) => Ok(identity),
            Err(_) => self.fetch_userinfo(token).await,
        }
    }
}
