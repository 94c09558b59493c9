// Identity resolution — routes a (provider, token) pair to its verifier.
//
// The resolver owns one verifier per configured provider, built once at
// context creation. Request validation happens here so a bad request never
// reaches the network.

use std::collections::HashMap;
use std::sync::Arc;

use idem_core::IdemOptions;
use idem_providers::{
    AppleVerifier, FacebookVerifier, GoogleVerifier, HttpClient, Provider, ResolvedIdentity,
    TokenVerifier, VerifierError,
};

pub struct IdentityResolver {
    verifiers: HashMap<Provider, Arc<dyn TokenVerifier>>,
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut providers: Vec<&str> = self.verifiers.keys().map(|p| p.as_str()).collect();
        providers.sort_unstable();
        f.debug_struct("IdentityResolver")
            .field("providers", &providers)
            .finish()
    }
}

impl IdentityResolver {
    /// Build verifiers from the options. Google and Facebook are always
    /// routable (Google degrades to access-token-only without a client id);
    /// Apple requires a configured service id because ID-token verification
    /// has no fallback without an audience to check.
    pub fn from_options(options: &IdemOptions, http: Arc<dyn HttpClient>) -> Self {
        let timeout = options.provider_timeout();
        let mut verifiers: HashMap<Provider, Arc<dyn TokenVerifier>> = HashMap::new();

        verifiers.insert(
            Provider::Google,
            Arc::new(GoogleVerifier::new(
                options.google.as_ref().map(|g| g.client_id.clone()),
                http.clone(),
                timeout,
            )),
        );
        verifiers.insert(
            Provider::Facebook,
            Arc::new(FacebookVerifier::new(
                options.pseudo_email_namespace.clone(),
                http.clone(),
                timeout,
            )),
        );
        if let Some(apple) = &options.apple {
            verifiers.insert(
                Provider::Apple,
                Arc::new(AppleVerifier::new(
                    apple.service_id.clone(),
                    options.pseudo_email_namespace.clone(),
                    http,
                    timeout,
                )),
            );
        }

        Self { verifiers }
    }

    /// Verify `token` with the named provider's verifier.
    ///
    /// Blank provider or token fails with `InvalidRequest` before any
    /// parsing or I/O. `local` is a valid provider name but has no token
    /// verifier (password logins take the credentials path), so it is
    /// rejected like an unconfigured provider.
    pub async fn resolve(
        &self,
        provider: &str,
        token: &str,
        aux: Option<&serde_json::Value>,
    ) -> Result<ResolvedIdentity, VerifierError> {
        if provider.trim().is_empty() || token.trim().is_empty() {
            return Err(VerifierError::InvalidRequest);
        }

        let provider: Provider = provider.parse()?;
        let verifier = self
            .verifiers
            .get(&provider)
            .ok_or_else(|| VerifierError::Unsupported(provider.as_str().to_string()))?;

        verifier.verify(token, aux).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idem_providers::MockHttpClient;

    fn resolver_with(options: IdemOptions, mock: Arc<MockHttpClient>) -> IdentityResolver {
        IdentityResolver::from_options(&options, mock)
    }

    fn base_options() -> IdemOptions {
        IdemOptions::new("test-secret")
    }

    #[tokio::test]
    async fn test_blank_request_fails_before_any_io() {
        let mock = Arc::new(MockHttpClient::new());
        let resolver = resolver_with(base_options(), mock.clone());

        let no_token = resolver.resolve("google", "   ", None).await;
        assert!(matches!(no_token, Err(VerifierError::InvalidRequest)));

        let no_provider = resolver.resolve("", "some-token", None).await;
        assert!(matches!(no_provider, Err(VerifierError::InvalidRequest)));

        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_provider_is_unsupported() {
        let mock = Arc::new(MockHttpClient::new());
        let resolver = resolver_with(base_options(), mock);

        let result = resolver.resolve("twitter", "token", None).await;
        match result {
            Err(VerifierError::Unsupported(name)) => assert_eq!(name, "twitter"),
            other => panic!("expected Unsupported, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_local_provider_has_no_verifier() {
        let mock = Arc::new(MockHttpClient::new());
        let resolver = resolver_with(base_options(), mock);

        let result = resolver.resolve("local", "token", None).await;
        assert!(matches!(result, Err(VerifierError::Unsupported(_))));
    }

    #[tokio::test]
    async fn test_unconfigured_apple_is_unsupported() {
        let mock = Arc::new(MockHttpClient::new());
        let resolver = resolver_with(base_options(), mock.clone());

        let result = resolver.resolve("apple", "token", None).await;
        assert!(matches!(result, Err(VerifierError::Unsupported(_))));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_name_is_case_insensitive() {
        let mock = Arc::new(MockHttpClient::new());
        mock.push_response(200, r#"{"email":"g@x.com","name":"G"}"#);

        let resolver = resolver_with(base_options(), mock);
        let identity = resolver.resolve(" GOOGLE ", "access-token", None).await.unwrap();

        assert_eq!(identity.provider, Provider::Google);
        assert_eq!(identity.email, "g@x.com");
    }

    #[tokio::test]
    async fn test_configured_apple_dispatches() {
        let mock = Arc::new(MockHttpClient::new());
        let options = base_options().apple("com.example.service");
        let resolver = resolver_with(options, mock.clone());

        // Malformed token fails in the verifier, proving dispatch happened.
        let result = resolver.resolve("apple", "not-a-jwt", None).await;
        assert!(matches!(result, Err(VerifierError::Malformed)));
    }
}
