// Facebook token verification.
//
// Facebook login hands the client an access token, never a signed identity
// token, so verification is a single graph API call. Accounts without a
// verified email are common; those get a deterministic pseudo-email so they
// still reconcile to a stable user record.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::http::HttpClient;
use crate::identity::{pseudo_email, ResolvedIdentity};
use crate::provider::{Provider, TokenVerifier, VerifierError};

pub const FACEBOOK_GRAPH_URL: &str = "https://graph.facebook.com/me";

pub struct FacebookVerifier {
    namespace: String,
    http: Arc<dyn HttpClient>,
    timeout: Duration,
}

impl std::fmt::Debug for FacebookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacebookVerifier")
            .field("namespace", &self.namespace)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl FacebookVerifier {
    pub fn new(namespace: impl Into<String>, http: Arc<dyn HttpClient>, timeout: Duration) -> Self {
        Self {
            namespace: namespace.into(),
            http,
            timeout,
        }
    }
}

#[async_trait]
impl TokenVerifier for FacebookVerifier {
    fn provider(&self) -> Provider {
        Provider::Facebook
    }

    async fn verify(
        &self,
        token: &str,
        _aux: Option<&serde_json::Value>,
    ) -> Result<ResolvedIdentity, VerifierError> {
        let response = self
            .http
            .get(
                FACEBOOK_GRAPH_URL,
                &[],
                &[("fields", "id,name,email"), ("access_token", token)],
                self.timeout,
            )
            .await
            .map_err(|e| VerifierError::ProviderApi(e.to_string()))?;

        if !response.is_success() {
            return Err(VerifierError::ProviderApi(format!(
                "graph API returned status {}",
                response.status
            )));
        }

        let body: serde_json::Value = serde_json::from_str(&response.body)
            .map_err(|e| VerifierError::ProviderApi(format!("graph response parse failed: {e}")))?;

        let id = body
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| VerifierError::ProviderApi("graph response missing id".to_string()))?;

        let email = body
            .get("email")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| pseudo_email(Provider::Facebook, id, &self.namespace));
        let name = body
            .get("name")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        Ok(ResolvedIdentity::new(Provider::Facebook, email, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpClientError, MockHttpClient};

    fn verifier(mock: Arc<MockHttpClient>) -> FacebookVerifier {
        FacebookVerifier::new("idem", mock, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_full_profile_resolves() {
        let mock = Arc::new(MockHttpClient::new());
        mock.push_response(200, r#"{"id":"555","name":"Carol","email":"carol@x.com"}"#);

        let identity = verifier(mock.clone()).verify("fb-token", None).await.unwrap();

        assert_eq!(identity.email, "carol@x.com");
        assert_eq!(identity.name.as_deref(), Some("Carol"));
        assert_eq!(identity.provider, Provider::Facebook);

        let requests = mock.requests();
        assert_eq!(requests[0].url, FACEBOOK_GRAPH_URL);
        assert_eq!(
            requests[0].params,
            vec![
                ("fields".to_string(), "id,name,email".to_string()),
                ("access_token".to_string(), "fb-token".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_email_synthesizes_pseudo_email() {
        let mock = Arc::new(MockHttpClient::new());
        mock.push_response(200, r#"{"id":"555","name":"Carol"}"#);

        let identity = verifier(mock).verify("fb-token", None).await.unwrap();

        assert_eq!(identity.email, "555@facebook.idem.user");
        assert_eq!(identity.name.as_deref(), Some("Carol"));
    }

    #[tokio::test]
    async fn test_non_200_is_provider_api_error() {
        let mock = Arc::new(MockHttpClient::new());
        mock.push_response(400, r#"{"error":{"message":"Invalid OAuth access token"}}"#);

        let result = verifier(mock).verify("bad-token", None).await;
        assert!(matches!(result, Err(VerifierError::ProviderApi(_))));
    }

    #[tokio::test]
    async fn test_missing_id_is_provider_api_error() {
        let mock = Arc::new(MockHttpClient::new());
        mock.push_response(200, r#"{"name":"No Id"}"#);

        let result = verifier(mock).verify("fb-token", None).await;
        assert!(matches!(result, Err(VerifierError::ProviderApi(_))));
    }

    #[tokio::test]
    async fn test_transport_failure_is_provider_api_error() {
        let mock = Arc::new(MockHttpClient::new());
        mock.push_error(HttpClientError::Timeout(Duration::from_secs(5)));

        let result = verifier(mock).verify("fb-token", None).await;
        assert!(matches!(result, Err(VerifierError::ProviderApi(_))));
    }
}
