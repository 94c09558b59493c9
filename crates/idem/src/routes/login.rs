// Login route — local email/password credentials.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use idem_core::canonical_email;
use idem_core::error::{ApiError, ErrorCode};
use idem_core::User;

use crate::context::AuthContext;
use crate::crypto::password::{hash_password, verify_password};

/// Login request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: User,
}

/// Handle email/password login.
///
/// 1. Validate input
/// 2. Find user by email
/// 3. Verify password (with timing-attack prevention)
/// 4. Require an activated account
/// 5. Issue a session token
pub async fn handle_login(
    ctx: Arc<AuthContext>,
    body: LoginRequest,
) -> Result<LoginResponse, ApiError> {
    // 1. Validate input
    let email = canonical_email(&body.email);
    if email.is_empty() || body.password.is_empty() {
        return Err(ApiError::bad_request(ErrorCode::InvalidRequest));
    }

    // 2. Find user by email
    let user = match ctx.store.find_by_email(&email).await? {
        Some(u) => u,
        None => {
            // Hash anyway so unknown emails cost the same as wrong
            // passwords and the response time reveals nothing.
            let _ = hash_password(&body.password);
            return Err(ApiError::unauthorized(ErrorCode::InvalidCredentials));
        }
    };

    // 3. Verify password. A social-only account has no hash and fails the
    // same way as a wrong password.
    let password_valid = match user.password_hash.as_deref() {
        Some(hash) => verify_password(hash, &body.password),
        None => {
            let _ = hash_password(&body.password);
            false
        }
    };
    if !password_valid {
        return Err(ApiError::unauthorized(ErrorCode::InvalidCredentials));
    }

    // 4. Activation gate, checked only after the credentials prove out so
    // it discloses nothing to a password guesser.
    if !user.is_active {
        return Err(ApiError::forbidden(ErrorCode::NotActivated));
    }

    // 5. Issue a session token
    let token = ctx.issue_session_token(&user)?;
    ctx.logger.success(&format!("Login for user {}", user.id));

    Ok(LoginResponse {
        success: true,
        token,
        user,
    })
}
