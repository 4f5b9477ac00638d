use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use regiongate_application::UserDirectory;
use regiongate_core::{AppResult, UserId, UserIdentity};

/// In-memory user directory.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, UserIdentity>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an account.
    pub async fn insert(&self, identity: UserIdentity) {
        self.users
            .write()
            .await
            .insert(identity.user_id(), identity);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_identity(&self, user_id: UserId) -> AppResult<Option<UserIdentity>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }
}
