// Auth context.
//
// Holds the fully-initialized engine for request processing: options, the
// user store, the per-provider resolver, and the reconciler, shared across
// request handlers as `Arc<AuthContext>`.

use std::sync::Arc;

use idem_core::error::{ApiError, ErrorCode};
use idem_core::logger::AuthLogger;
use idem_core::{IdemOptions, User, UserStore};
use idem_providers::HttpClient;

use crate::crypto::session::sign_session_token;
use crate::reconciler::UserReconciler;
use crate::resolver::IdentityResolver;

/// The fully-initialized engine context, shared across all request handlers.
///
/// Created once at startup from `IdemOptions`, a `UserStore`, and an
/// `HttpClient`. Both collaborators are injected so embedders choose their
/// persistence and tests script provider responses.
pub struct AuthContext {
    /// The original configuration options.
    pub options: IdemOptions,

    /// Application name for log and email copy (default: "idem").
    pub app_name: String,

    /// The secret key for session-token signing.
    pub secret: String,

    /// Base URL used to build activation links.
    pub base_url: Option<String>,

    /// User persistence.
    pub store: Arc<dyn UserStore>,

    /// Token verification, one verifier per configured provider.
    pub resolver: IdentityResolver,

    /// The find-or-create merge point for verified identities.
    pub reconciler: UserReconciler,

    /// Structured logger with level filtering and ANSI formatting.
    pub logger: AuthLogger,
}

// Manual Debug impl because dyn UserStore is not Debug
impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("app_name", &self.app_name)
            .field("secret", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl AuthContext {
    /// Create a new `AuthContext` from options, a store, and an HTTP client.
    pub fn new(
        options: IdemOptions,
        store: Arc<dyn UserStore>,
        http: Arc<dyn HttpClient>,
    ) -> Arc<Self> {
        let secret = options.secret.clone();
        let base_url = options.base_url.clone();
        let app_name = options
            .app_name
            .clone()
            .unwrap_or_else(|| "idem".to_string());

        let logger = AuthLogger::new(options.logger.to_logger_config());
        let resolver = IdentityResolver::from_options(&options, http);
        let reconciler = UserReconciler::new(store.clone(), logger.clone());

        Arc::new(Self {
            options,
            app_name,
            secret,
            base_url,
            store,
            resolver,
            reconciler,
            logger,
        })
    }

    /// Sign a session token for a user with the configured TTL.
    pub fn issue_session_token(&self, user: &User) -> Result<String, ApiError> {
        sign_session_token(user, &self.secret, self.options.session.expires_in).map_err(|e| {
            ApiError::with_message(
                idem_core::error::HttpStatus::InternalServerError,
                ErrorCode::InternalServerError,
                format!("Failed to issue session token: {e}"),
            )
        })
    }

    /// Build the activation link for an activation token, rooted at the
    /// configured base URL when one exists.
    pub fn activation_url(&self, token: &str) -> String {
        if let Some(base) = &self.base_url {
            if let Ok(mut link) = url::Url::parse(base) {
                if let Ok(mut segments) = link.path_segments_mut() {
                    segments.pop_if_empty().push("verify-email");
                }
                link.query_pairs_mut().append_pair("token", token);
                return link.to_string();
            }
        }

        // No usable base URL: return a relative link the embedder can root.
        format!("/verify-email?token={token}")
    }
}
