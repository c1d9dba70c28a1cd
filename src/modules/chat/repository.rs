use chrono::{DateTime, Utc};

use crate::api::error;
use crate::modules::chat::model::MessageRow;
use crate::modules::chat::schema::ContactEntity;

#[async_trait::async_trait]
pub trait MessageRepository {
    /// First page: ordered `(created_at DESC, id DESC)`, limit includes the
    /// probe row.
    async fn find_first_page(
        &self,
        conversation_id: i64,
        limit: i64,
    ) -> Result<Vec<MessageRow>, error::SystemError>;

    /// Next pages: keyset predicate on `(created_at, id)` below the cursor.
    async fn find_next_page(
        &self,
        conversation_id: i64,
        cursor_time: DateTime<Utc>,
        cursor_id: i64,
        limit: i64,
    ) -> Result<Vec<MessageRow>, error::SystemError>;

    async fn count_by_conversation(
        &self,
        conversation_id: i64,
    ) -> Result<i64, error::SystemError>;
}

#[async_trait::async_trait]
pub trait ContactRepository {
    async fn find_by_id(
        &self,
        contact_id: i64,
    ) -> Result<Option<ContactEntity>, error::SystemError>;
}
