// Registration route.
//
// Local accounts start inactive behind an email-activation gate. The
// engine generates the activation link; delivery belongs to the embedder,
// through the configured callback or, failing that, the log.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use idem_core::error::{ApiError, ErrorCode, HttpStatus};
use idem_core::options::EmailCallbackData;
use idem_core::{canonical_email, User};

use crate::context::AuthContext;
use crate::crypto::password::hash_password;
use crate::crypto::random::generate_random_string;

/// Registration request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Registration response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
}

/// Validate that a string looks like an email address.
fn is_valid_email(email: &str) -> bool {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }
    let local = parts[0];
    let domain = parts[1];
    !local.is_empty() && !domain.is_empty() && domain.contains('.')
}

/// Default display name for a fresh local account: the email's local part.
fn name_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}

/// Handle registration.
///
/// 1. Validate input
/// 2. Check email availability (any provenance counts as taken)
/// 3. Hash the password
/// 4. Create the inactive user with a fresh activation token
/// 5. Emit the activation link
pub async fn handle_register(
    ctx: Arc<AuthContext>,
    body: RegisterRequest,
) -> Result<RegisterResponse, ApiError> {
    // 1. Validate input
    let email = canonical_email(&body.email);
    if email.is_empty() || body.password.is_empty() {
        return Err(ApiError::bad_request(ErrorCode::InvalidRequest));
    }
    if !is_valid_email(&email) {
        return Err(ApiError::with_message(
            HttpStatus::BadRequest,
            ErrorCode::InvalidRequest,
            "Invalid email address",
        ));
    }

    // 2. Check availability. A social account under this email counts.
    if ctx.store.find_by_email(&email).await?.is_some() {
        return Err(ApiError::bad_request(ErrorCode::EmailTaken));
    }

    // 3. Hash the password before creating the user, so a hashing failure
    // leaves no orphaned record.
    let password_hash = hash_password(&body.password).map_err(|e| {
        ApiError::with_message(
            HttpStatus::InternalServerError,
            ErrorCode::InternalServerError,
            format!("Password hashing failed: {e}"),
        )
    })?;

    // 4. Inactive user with a single-use activation token. A Duplicate
    // here means a concurrent registration or social login won the email;
    // it maps to EMAIL_TAKEN like the probe above.
    let activation_token = generate_random_string(ctx.options.activation.token_length);
    let mut user = User::new(&email).with_name(name_from_email(&email));
    user.password_hash = Some(password_hash);
    user.activation_token = Some(activation_token.clone());
    let user = ctx.store.insert(user).await?;

    // 5. Emit the activation link
    let url = ctx.activation_url(&activation_token);
    deliver_activation_email(&ctx, &user, &url, &activation_token).await;
    ctx.logger
        .info(&format!("Registered {} pending activation", user.email));

    Ok(RegisterResponse {
        success: true,
        message: "Registration successful. Check your email for an activation link.".to_string(),
    })
}

/// Hand the activation link to the configured email callback, or log it
/// when no callback is set so development setups still surface the link.
async fn deliver_activation_email(ctx: &AuthContext, user: &User, url: &str, token: &str) {
    if let Some(callback) = &ctx.options.activation.send_activation_email {
        let data = EmailCallbackData {
            user: serde_json::to_value(user).unwrap_or_default(),
            url: url.to_string(),
            token: token.to_string(),
        };
        if let Err(e) = callback(&data).await {
            ctx.logger
                .error(&format!("Activation email delivery failed: {e}"));
        }
    } else {
        ctx.logger
            .info(&format!("Activation link for {}: {url}", user.email));
    }
}
