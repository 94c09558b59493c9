// ResolvedIdentity — what a successful verification produces.

use serde::{Deserialize, Serialize};

use crate::provider::Provider;

/// A verified `(email, name)` pair plus its provenance. Ephemeral: consumed
/// by the reconciler immediately, never persisted as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedIdentity {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub provider: Provider,
}

impl ResolvedIdentity {
    pub fn new(provider: Provider, email: impl Into<String>, name: Option<String>) -> Self {
        Self {
            email: email.into(),
            name,
            provider,
        }
    }
}

/// Deterministic stand-in email for provider accounts without one:
/// `{subject}@{provider}.{namespace}.user`. The same subject always yields
/// the same address, so the same physical user maps to the same record.
/// Cannot collide with a real address thanks to the reserved `.user` suffix.
pub fn pseudo_email(provider: Provider, subject: &str, namespace: &str) -> String {
    format!("{}@{}.{}.user", subject, provider.as_str(), namespace).to_ascii_lowercase()
}
