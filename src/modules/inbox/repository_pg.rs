use chrono::{DateTime, Utc};

use crate::api::error;
use crate::modules::inbox::model::{InboxFilter, InboxRow};
use crate::modules::inbox::repository::ConversationRepository;
use crate::modules::inbox::schema::ConversationEntity;

// The filter fragment is shared verbatim between the first-page, next-page
// and count queries so paging and counting always agree with each other.
//
// Null binds are cast so Postgres can infer the enum bind type even when the
// value is absent; an absent filter contributes no constraint.
const INBOX_FILTER: &str = r#"
    WHERE conv.project_id = $1
      AND ($2::conversation_status IS NULL OR conv.status = $2)
      AND ($3::assigned_type IS NULL OR conv.assigned_type = $3)
      AND ($4::BIGINT IS NULL OR conv.assigned_id = $4)
      AND ($5::BOOLEAN = FALSE OR conv.unread_count > 0)
      AND ($6::BOOLEAN = FALSE OR conv.conversation_open_until > NOW())
      AND ($7::TEXT IS NULL
           OR c.display_name ILIKE '%' || $7 || '%'
           OR c.wa_phone_e164 LIKE '%' || $7 || '%')
"#;

const INBOX_SELECT: &str = r#"
    SELECT
        conv.id                     AS conversation_id,
        conv.contact_id,
        conv.waba_account_id,
        conv.status,
        conv.assigned_type,
        conv.assigned_id,
        conv.last_message_at,
        conv.last_message_direction,
        conv.last_message_preview,
        conv.unread_count,
        conv.conversation_open_until,
        conv.last_inbound_at,
        conv.last_message_id,
        c.display_name              AS contact_name,
        c.wa_phone_e164             AS contact_phone,
        msr.is_sent,
        msr.is_delivered,
        msr.is_read,
        msr.is_failed
    FROM conversations conv
    LEFT JOIN contacts c ON c.id = conv.contact_id
    LEFT JOIN message_status_rollup msr ON msr.message_id = conv.last_message_id
"#;

const COUNT_SELECT: &str = r#"
    SELECT COUNT(conv.id)
    FROM conversations conv
    LEFT JOIN contacts c ON c.id = conv.contact_id
"#;

// Keyset condition: routes straight into idx_inbox, no full scan at any depth.
const INBOX_KEYSET: &str = r#"
      AND (conv.last_message_at < $8
           OR (conv.last_message_at = $8 AND conv.id < $9))
"#;

const INBOX_ORDER: &str = "ORDER BY conv.last_message_at DESC, conv.id DESC";

#[derive(Clone)]
pub struct ConversationPgRepository {
    pool: sqlx::PgPool,
}

impl ConversationPgRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

fn bind_filter<'q, O>(
    query: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    f: &InboxFilter,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    query
        .bind(f.project_id)
        .bind(f.status)
        .bind(f.assigned_type)
        .bind(f.assigned_id)
        .bind(f.unread_only)
        .bind(f.active_session)
        .bind(f.search.clone())
}

#[async_trait::async_trait]
impl ConversationRepository for ConversationPgRepository {
    async fn find_by_id(
        &self,
        conversation_id: i64,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        let conversation =
            sqlx::query_as::<_, ConversationEntity>("SELECT * FROM conversations WHERE id = $1")
                .bind(conversation_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(conversation)
    }

    async fn find_first_page(
        &self,
        filter: &InboxFilter,
        limit: i64,
    ) -> Result<Vec<InboxRow>, error::SystemError> {
        let sql = format!("{INBOX_SELECT} {INBOX_FILTER} {INBOX_ORDER} LIMIT $8");

        let rows = bind_filter(sqlx::query_as::<_, InboxRow>(&sql), filter)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn find_next_page(
        &self,
        filter: &InboxFilter,
        cursor_time: DateTime<Utc>,
        cursor_id: i64,
        limit: i64,
    ) -> Result<Vec<InboxRow>, error::SystemError> {
        let sql = format!("{INBOX_SELECT} {INBOX_FILTER} {INBOX_KEYSET} {INBOX_ORDER} LIMIT $10");

        let rows = bind_filter(sqlx::query_as::<_, InboxRow>(&sql), filter)
            .bind(cursor_time)
            .bind(cursor_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn count_filtered(&self, filter: &InboxFilter) -> Result<i64, error::SystemError> {
        let sql = format!("{COUNT_SELECT} {INBOX_FILTER}");

        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(filter.project_id)
            .bind(filter.status)
            .bind(filter.assigned_type)
            .bind(filter.assigned_id)
            .bind(filter.unread_only)
            .bind(filter.active_session)
            .bind(filter.search.clone())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn sum_unread_by_project(&self, project_id: i64) -> Result<i64, error::SystemError> {
        // Unread badge: no join needed, OPEN conversations only.
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(conv.unread_count), 0)::BIGINT
            FROM conversations conv
            WHERE conv.project_id = $1
              AND conv.status = 'OPEN'
            "#,
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn mark_as_read(&self, conversation_id: i64) -> Result<u64, error::SystemError> {
        // Conditional single UPDATE, no row load. Repeated calls are no-ops.
        let result = sqlx::query(
            r#"
            UPDATE conversations
            SET unread_count = 0,
                updated_at = NOW()
            WHERE id = $1
              AND unread_count > 0
            "#,
        )
        .bind(conversation_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
