// User reconciliation — the single merge point between verified identities
// and stored users.
//
// Every social login funnels through `reconcile`, which either finds the
// user for the identity's email or creates one. Creation races with other
// writers on the same email; the store's uniqueness constraint is the
// backstop, and a `Duplicate` from `insert` means another writer won, so
// the lookup runs once more against the row that now exists.

use std::sync::Arc;

use idem_core::logger::AuthLogger;
use idem_core::{canonical_email, StoreError, User, UserStore, PLACEHOLDER_NAME};
use idem_providers::ResolvedIdentity;

pub struct UserReconciler {
    store: Arc<dyn UserStore>,
    logger: AuthLogger,
}

impl std::fmt::Debug for UserReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserReconciler").finish()
    }
}

impl UserReconciler {
    pub fn new(store: Arc<dyn UserStore>, logger: AuthLogger) -> Self {
        Self { store, logger }
    }

    /// Find or create the user for a verified identity. Idempotent: the
    /// same identity always lands on the same record.
    pub async fn reconcile(&self, identity: &ResolvedIdentity) -> Result<User, StoreError> {
        let email = canonical_email(&identity.email);

        match self.lookup_or_create(&email, identity).await {
            Err(StoreError::Duplicate(_)) => {
                // Lost the insert race; the winner's row exists now, so a
                // single retry resolves to it.
                self.logger
                    .debug(&format!("Concurrent insert for {email}, retrying reconcile"));
                self.lookup_or_create(&email, identity).await
            }
            other => other,
        }
    }

    async fn lookup_or_create(
        &self,
        email: &str,
        identity: &ResolvedIdentity,
    ) -> Result<User, StoreError> {
        let incoming_name = identity
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        if let Some(mut user) = self.store.find_by_email(email).await? {
            // A placeholder yields to a real name; a genuine name is never
            // overwritten by a later login.
            if user.has_placeholder_name() {
                if let Some(name) = incoming_name {
                    user.name = Some(name.to_string());
                    user.touch();
                    self.store.save(&user).await?;
                    self.logger
                        .debug(&format!("Filled in name for existing user {}", user.id));
                }
            }
            return Ok(user);
        }

        // Social identities arrive already verified by their provider, so
        // the account starts active. No password hash on this path.
        let mut user = User::new(email);
        user.is_active = true;
        user.name = Some(
            incoming_name
                .map(str::to_string)
                .unwrap_or_else(|| PLACEHOLDER_NAME.to_string()),
        );

        let user = self.store.insert(user).await?;
        self.logger.info(&format!(
            "Created user {} via {} login",
            user.id, identity.provider
        ));
        Ok(user)
    }
}
