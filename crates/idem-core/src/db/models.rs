// The user model.
//
// One record per email. Secret-bearing fields (`password_hash`,
// `activation_token`) never serialize, so a `User` can go straight into a
// response body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display name given to users whose provider supplied none. A later login
/// that does carry a name may replace it; a genuine name is never replaced.
pub const PLACEHOLDER_NAME: &str = "User";

/// Canonical form of an email for lookup and uniqueness: trimmed and
/// ASCII-lowercased. Applied at every entry point before the store is
/// touched.
pub fn canonical_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Store-assigned surrogate key; empty until inserted.
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub is_active: bool,
    /// Present only while a local account awaits activation.
    #[serde(skip_serializing, default)]
    pub activation_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A blank user for the given email (canonicalized). Starts inactive
    /// with no name; construction sites flip what they need.
    pub fn new(email: impl AsRef<str>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            email: canonical_email(email.as_ref()),
            name: None,
            password_hash: None,
            is_active: false,
            activation_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(PLACEHOLDER_NAME)
    }

    /// Whether the stored name is still fair game for a provider-supplied
    /// one: absent, empty, or the placeholder.
    pub fn has_placeholder_name(&self) -> bool {
        match self.name.as_deref() {
            None | Some("") => true,
            Some(name) => name == PLACEHOLDER_NAME,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
