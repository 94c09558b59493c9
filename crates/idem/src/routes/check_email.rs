// Email existence probe — lets a client pick between its login and
// registration forms. No mutation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use idem_core::canonical_email;
use idem_core::error::{ApiError, ErrorCode};

use crate::context::AuthContext;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckEmailRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckEmailResponse {
    pub exists: bool,
}

/// Handle the existence probe.
pub async fn handle_check_email(
    ctx: Arc<AuthContext>,
    body: CheckEmailRequest,
) -> Result<CheckEmailResponse, ApiError> {
    let email = canonical_email(&body.email);
    if email.is_empty() {
        return Err(ApiError::bad_request(ErrorCode::InvalidRequest));
    }

    let exists = ctx.store.find_by_email(&email).await?.is_some();
    Ok(CheckEmailResponse { exists })
}
