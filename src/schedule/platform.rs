use async_trait::async_trait;

use crate::error::BirthdayError;

/// One birthday announcement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub user_id: String,
    pub name: String,
    pub age: i32,
}

/// Chat platform operations the daily reconciliation depends on.
///
/// Every call may fail independently; callers log and move on.
#[async_trait]
pub trait BirthdayPlatform: Send + Sync {
    /// Map a user id to their current display name
    async fn resolve_user(&self, user_id: &str) -> Result<String, BirthdayError>;

    /// Post an announcement to the birthday channel
    async fn announce(&self, announcement: &Announcement) -> Result<(), BirthdayError>;

    /// Users currently holding the birthday role
    async fn role_holders(&self) -> Result<Vec<String>, BirthdayError>;

    async fn grant_role(&self, user_id: &str) -> Result<(), BirthdayError>;

    async fn revoke_role(&self, user_id: &str) -> Result<(), BirthdayError>;
}
