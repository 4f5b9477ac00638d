use async_trait::async_trait;
use regiongate_core::{AppResult, UserId, UserIdentity};

/// Port resolving a token subject to the stored account.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns the identity for `user_id`, or `None` when the account does not exist.
    async fn find_identity(&self, user_id: UserId) -> AppResult<Option<UserIdentity>>;
}
