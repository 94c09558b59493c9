// JWKS fetching and caching.
//
// Google and Apple rotate their RS256 signing keys; tokens name the key
// they were signed with via the `kid` header. The cache keeps the last
// fetched key set in memory and refetches the full set once when a `kid`
// is not present, so rotation is handled without a per-token network call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::RwLock;

use crate::http::HttpClient;
use crate::provider::VerifierError;

pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
pub const APPLE_JWKS_URL: &str = "https://appleid.apple.com/auth/keys";

/// A single RSA key from a provider's JWKS document.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    pub kid: String,
    pub kty: String,
    pub alg: Option<String>,
    #[serde(rename = "use")]
    pub use_: Option<String>,
    pub n: String,
    pub e: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

/// Keyed cache over one provider's JWKS endpoint.
pub struct ProviderKeyCache {
    http: Arc<dyn HttpClient>,
    jwks_url: String,
    timeout: Duration,
    keys: RwLock<HashMap<String, Jwk>>,
}

impl std::fmt::Debug for ProviderKeyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderKeyCache")
            .field("jwks_url", &self.jwks_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderKeyCache {
    pub fn new(http: Arc<dyn HttpClient>, jwks_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http,
            jwks_url: jwks_url.into(),
            timeout,
            keys: RwLock::new(HashMap::new()),
        }
    }

    /// Look up the key for `kid`, refetching the provider's key set once
    /// if it is not cached. A `kid` still missing after a fresh fetch
    /// means the token was signed with a key the provider does not
    /// publish, which is a signature problem, not a provider outage.
    pub async fn get(&self, kid: &str) -> Result<Jwk, VerifierError> {
        {
            let keys = self.keys.read().await;
            if let Some(key) = keys.get(kid) {
                return Ok(key.clone());
            }
        }

        self.refetch().await?;

        let keys = self.keys.read().await;
        keys.get(kid)
            .cloned()
            .ok_or(VerifierError::SignatureInvalid)
    }

    /// Replace the cached set with a fresh fetch from the JWKS endpoint.
    async fn refetch(&self) -> Result<(), VerifierError> {
        let response = self
            .http
            .get(&self.jwks_url, &[], &[], self.timeout)
            .await
            .map_err(|e| VerifierError::ProviderApi(e.to_string()))?;

        if !response.is_success() {
            return Err(VerifierError::ProviderApi(format!(
                "JWKS fetch returned status {}",
                response.status
            )));
        }

        let set: JwkSet = serde_json::from_str(&response.body)
            .map_err(|e| VerifierError::ProviderApi(format!("JWKS parse failed: {e}")))?;

        let mut keys = self.keys.write().await;
        keys.clear();
        for key in set.keys {
            keys.insert(key.kid.clone(), key);
        }

        Ok(())
    }
}
