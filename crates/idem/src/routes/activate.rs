// Activation route — redeems the token from the activation email.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use idem_core::error::{ApiError, ErrorCode};
use idem_core::User;

use crate::context::AuthContext;

/// Activation request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequest {
    #[serde(default)]
    pub token: String,
}

/// Activation response. Activation signs the user in, so a fresh session
/// token rides along.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateResponse {
    pub success: bool,
    pub token: String,
    pub user: User,
}

/// Handle account activation.
///
/// 1. Validate input
/// 2. Find the token's holder
/// 3. Activate and clear the token (redemption is single-use)
/// 4. Sign the user in
pub async fn handle_activate(
    ctx: Arc<AuthContext>,
    body: ActivateRequest,
) -> Result<ActivateResponse, ApiError> {
    // 1. Validate input
    let token = body.token.trim();
    if token.is_empty() {
        return Err(ApiError::bad_request(ErrorCode::InvalidRequest));
    }

    // 2. Find the holder
    let mut user = ctx
        .store
        .find_by_activation_token(token)
        .await?
        .ok_or_else(|| ApiError::bad_request(ErrorCode::InvalidToken))?;

    // 3. Clearing the token is what makes redemption single-use: a second
    // attempt with the same token finds no holder.
    user.is_active = true;
    user.activation_token = None;
    user.touch();
    ctx.store.save(&user).await?;

    // 4. Sign the user in
    let session_token = ctx.issue_session_token(&user)?;
    ctx.logger
        .success(&format!("Account {} activated", user.id));

    Ok(ActivateResponse {
        success: true,
        token: session_token,
        user,
    })
}
