// Social login route.
//
// One endpoint for all three providers: verify the token, reconcile the
// identity to a user record, hand back a session token.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use idem_core::error::ApiError;
use idem_core::User;

use crate::context::AuthContext;

/// Social login request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLoginRequest {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub token: String,
    /// Auxiliary first-login payload. Apple clients forward
    /// `{"name": {"firstName", "lastName"}}` here, once.
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

/// Social login response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLoginResponse {
    pub success: bool,
    pub token: String,
    pub user: User,
}

/// Handle social login.
///
/// 1. Verify the token with the named provider's verifier
/// 2. Reconcile the verified identity to a user record
/// 3. Issue a session token
pub async fn handle_social_login(
    ctx: Arc<AuthContext>,
    body: SocialLoginRequest,
) -> Result<SocialLoginResponse, ApiError> {
    // 1. Verify. Blank provider/token and unknown provider names are
    // rejected inside the resolver before any network traffic.
    let identity = ctx
        .resolver
        .resolve(&body.provider, &body.token, body.user.as_ref())
        .await
        .map_err(|e| {
            ctx.logger.warn(&format!("Social login rejected: {e}"));
            ApiError::from(e)
        })?;

    // 2. Find or create the user for this identity
    let user = ctx.reconciler.reconcile(&identity).await?;

    // 3. Issue a session token
    let token = ctx.issue_session_token(&user)?;
    ctx.logger.success(&format!(
        "{} login for user {}",
        identity.provider, user.id
    ));

    Ok(SocialLoginResponse {
        success: true,
        token,
        user,
    })
}
