use chrono::{DateTime, Utc};

use crate::api::error;
use crate::modules::chat::model::MessageRow;
use crate::modules::chat::repository::{ContactRepository, MessageRepository};
use crate::modules::chat::schema::ContactEntity;

// Same shared-fragment scheme as the inbox queries: paging and counting are
// built from one WHERE clause so they can never disagree.
const MESSAGE_SELECT: &str = r#"
    SELECT
        m.id                AS message_id,
        m.uuid,
        m.direction,
        m.message_type,
        m.status,
        m.body_text,
        m.template_name,
        m.template_language,
        m.template_vars,
        m.media_asset_id,
        m.provider_message_id,
        m.error_code,
        m.error_message,
        m.created_by_type,
        m.created_by_id,
        m.created_at,
        m.sent_at,
        m.delivered_at,
        m.read_at,
        msr.is_sent,
        msr.is_delivered,
        msr.is_read,
        msr.is_failed
    FROM messages m
    LEFT JOIN message_status_rollup msr ON msr.message_id = m.id
"#;

const MESSAGE_FILTER: &str = "WHERE m.conversation_id = $1";

// Keyset on (created_at, id): seeks straight into idx_conversation_time.
const MESSAGE_KEYSET: &str = r#"
      AND (m.created_at < $2
           OR (m.created_at = $2 AND m.id < $3))
"#;

const MESSAGE_ORDER: &str = "ORDER BY m.created_at DESC, m.id DESC";

#[derive(Clone)]
pub struct MessagePgRepository {
    pool: sqlx::PgPool,
}

impl MessagePgRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MessageRepository for MessagePgRepository {
    async fn find_first_page(
        &self,
        conversation_id: i64,
        limit: i64,
    ) -> Result<Vec<MessageRow>, error::SystemError> {
        let sql = format!("{MESSAGE_SELECT} {MESSAGE_FILTER} {MESSAGE_ORDER} LIMIT $2");

        let rows = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(conversation_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn find_next_page(
        &self,
        conversation_id: i64,
        cursor_time: DateTime<Utc>,
        cursor_id: i64,
        limit: i64,
    ) -> Result<Vec<MessageRow>, error::SystemError> {
        let sql =
            format!("{MESSAGE_SELECT} {MESSAGE_FILTER} {MESSAGE_KEYSET} {MESSAGE_ORDER} LIMIT $4");

        let rows = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(conversation_id)
            .bind(cursor_time)
            .bind(cursor_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn count_by_conversation(
        &self,
        conversation_id: i64,
    ) -> Result<i64, error::SystemError> {
        let sql = format!("SELECT COUNT(m.id) FROM messages m {MESSAGE_FILTER}");

        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(conversation_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[derive(Clone)]
pub struct ContactPgRepository {
    pool: sqlx::PgPool,
}

impl ContactPgRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ContactRepository for ContactPgRepository {
    async fn find_by_id(
        &self,
        contact_id: i64,
    ) -> Result<Option<ContactEntity>, error::SystemError> {
        let contact = sqlx::query_as::<_, ContactEntity>(
            "SELECT id, display_name, wa_phone_e164 FROM contacts WHERE id = $1",
        )
        .bind(contact_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contact)
    }
}
