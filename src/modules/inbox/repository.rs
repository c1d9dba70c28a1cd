use chrono::{DateTime, Utc};

use crate::api::error;
use crate::modules::inbox::model::{InboxFilter, InboxRow};
use crate::modules::inbox::schema::ConversationEntity;

#[async_trait::async_trait]
pub trait ConversationRepository {
    async fn find_by_id(
        &self,
        conversation_id: i64,
    ) -> Result<Option<ConversationEntity>, error::SystemError>;

    /// First page: filters only, ordered `(last_message_at DESC, id DESC)`,
    /// limit includes the probe row.
    async fn find_first_page(
        &self,
        filter: &InboxFilter,
        limit: i64,
    ) -> Result<Vec<InboxRow>, error::SystemError>;

    /// Next pages: same filters plus the keyset predicate on
    /// `(last_message_at, id)` below the cursor.
    async fn find_next_page(
        &self,
        filter: &InboxFilter,
        cursor_time: DateTime<Utc>,
        cursor_id: i64,
        limit: i64,
    ) -> Result<Vec<InboxRow>, error::SystemError>;

    async fn count_filtered(&self, filter: &InboxFilter) -> Result<i64, error::SystemError>;

    async fn sum_unread_by_project(&self, project_id: i64) -> Result<i64, error::SystemError>;

    /// Conditional reset: zeroes `unread_count` only when it is positive.
    /// Returns the number of rows changed (0 = already read).
    async fn mark_as_read(&self, conversation_id: i64) -> Result<u64, error::SystemError>;
}
