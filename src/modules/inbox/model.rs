use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::modules::chat::model::TickStatus;
use crate::modules::chat::schema::MessageDirection;
use crate::modules::inbox::schema::{AssignedType, ConversationStatus};

/// Query string for GET /inbox and GET /message-history.
/// `status` is ignored by the inbox endpoint (forced to OPEN there).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InboxQueryRequest {
    #[validate(range(min = 1))]
    pub project_id: i64,
    pub cursor: Option<String>,
    pub size: Option<i64>,
    pub status: Option<ConversationStatus>,
    pub assigned_type: Option<AssignedType>,
    pub assigned_id: Option<i64>,
    pub unread_only: Option<bool>,
    pub active_session: Option<bool>,
    #[validate(length(max = 160))]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountQueryRequest {
    #[validate(range(min = 1))]
    pub project_id: i64,
}

/// Conjunction of independently-optional filter terms. `None` always means
/// "no constraint"; the boolean opt-ins are already collapsed from their
/// tri-state request form, so `false` here contributes no predicate term.
#[derive(Debug, Clone)]
pub struct InboxFilter {
    pub project_id: i64,
    pub status: Option<ConversationStatus>,
    pub assigned_type: Option<AssignedType>,
    pub assigned_id: Option<i64>,
    pub unread_only: bool,
    pub active_session: bool,
    pub search: Option<String>,
}

/// One row of the inbox join: conversation + contact + last-message ticks.
#[derive(Debug, Clone, FromRow)]
pub struct InboxRow {
    pub conversation_id: i64,
    pub contact_id: i64,
    pub waba_account_id: i64,
    pub status: ConversationStatus,
    pub assigned_type: AssignedType,
    pub assigned_id: Option<i64>,
    pub last_message_at: DateTime<Utc>,
    pub last_message_direction: Option<MessageDirection>,
    pub last_message_preview: Option<String>,
    pub unread_count: i32,
    pub conversation_open_until: Option<DateTime<Utc>>,
    pub last_inbound_at: Option<DateTime<Utc>>,
    pub last_message_id: Option<i64>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub is_sent: Option<bool>,
    pub is_delivered: Option<bool>,
    pub is_read: Option<bool>,
    pub is_failed: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxItemResponse {
    pub conversation_id: i64,
    pub contact_id: i64,
    pub waba_account_id: i64,
    pub status: ConversationStatus,

    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,

    pub last_message_preview: Option<String>,
    pub last_message_at: DateTime<Utc>,
    pub last_message_direction: Option<MessageDirection>,
    pub tick_status: TickStatus,

    pub unread_count: i32,

    pub conversation_open_until: Option<DateTime<Utc>>,
    pub is_session_active: bool,
    pub session_remaining_ms: Option<i64>,

    pub assigned_type: AssignedType,
    pub assigned_id: Option<i64>,
}

impl InboxItemResponse {
    pub fn from_row(row: InboxRow) -> Self {
        let now = Utc::now();
        let until = row.conversation_open_until;

        let active = until.is_some_and(|u| u > now);
        let remaining_ms =
            if active { until.map(|u| u.timestamp_millis() - now.timestamp_millis()) } else { None };

        InboxItemResponse {
            conversation_id: row.conversation_id,
            contact_id: row.contact_id,
            waba_account_id: row.waba_account_id,
            status: row.status,
            contact_name: row.contact_name,
            contact_phone: row.contact_phone,
            last_message_preview: row.last_message_preview,
            last_message_at: row.last_message_at,
            last_message_direction: row.last_message_direction,
            tick_status: TickStatus {
                is_sent: row.is_sent.unwrap_or(false),
                is_delivered: row.is_delivered.unwrap_or(false),
                is_read: row.is_read.unwrap_or(false),
                is_failed: row.is_failed.unwrap_or(false),
            },
            unread_count: row.unread_count,
            conversation_open_until: until,
            is_session_active: active,
            session_remaining_ms: remaining_ms,
            assigned_type: row.assigned_type,
            assigned_id: row.assigned_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub project_id: i64,
    pub unread_count: i64,
}
