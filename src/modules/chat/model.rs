use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::api::page::CursorPageResponse;
use crate::modules::chat::schema::{CreatedByType, MessageDirection, MessageStatus, MessageType};
use crate::modules::inbox::schema::{AssignedType, ConversationStatus};
use crate::modules::template::model::TemplateDetailResponse;

/// Query string for GET /conversation/{id}/messages.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MessagePageQueryRequest {
    pub cursor: Option<String>,
    #[validate(range(min = 1))]
    pub size: Option<i64>,
}

/// WhatsApp-style delivery ticks for a single message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickStatus {
    pub is_sent: bool,
    pub is_delivered: bool,
    pub is_read: bool,
    pub is_failed: bool,
}

/// One row of the message-page join: message + status rollup ticks.
#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    pub message_id: i64,
    pub uuid: Uuid,
    pub direction: MessageDirection,
    pub message_type: MessageType,
    pub status: MessageStatus,
    pub body_text: Option<String>,
    pub template_name: Option<String>,
    pub template_language: Option<String>,
    pub template_vars: Option<String>,
    pub media_asset_id: Option<i64>,
    pub provider_message_id: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub created_by_type: CreatedByType,
    pub created_by_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
    pub is_sent: Option<bool>,
    pub is_delivered: Option<bool>,
    pub is_read: Option<bool>,
    pub is_failed: Option<bool>,
}

/// A message as the client sees it. Raw `template_vars` stay internal; the
/// rendered result is carried by `template_detail` instead.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    pub message_id: i64,
    pub uuid: Uuid,
    pub direction: MessageDirection,
    pub message_type: MessageType,
    pub status: MessageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_detail: Option<TemplateDetailResponse>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_asset_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    pub tick_status: TickStatus,

    pub created_by_type: CreatedByType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_id: Option<i64>,

    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
}

impl ChatMessageResponse {
    pub fn from_row(row: MessageRow) -> Self {
        ChatMessageResponse {
            message_id: row.message_id,
            uuid: row.uuid,
            direction: row.direction,
            message_type: row.message_type,
            status: row.status,
            body_text: row.body_text,
            template_name: row.template_name,
            template_language: row.template_language,
            template_detail: None,
            media_asset_id: row.media_asset_id,
            provider_message_id: row.provider_message_id,
            error_code: row.error_code,
            error_message: row.error_message,
            tick_status: TickStatus {
                is_sent: row.is_sent.unwrap_or(false),
                is_delivered: row.is_delivered.unwrap_or(false),
                is_read: row.is_read.unwrap_or(false),
                is_failed: row.is_failed.unwrap_or(false),
            },
            created_by_type: row.created_by_type,
            created_by_id: row.created_by_id,
            created_at: row.created_at,
            sent_at: row.sent_at,
            delivered_at: row.delivered_at,
            read_at: row.read_at,
        }
    }
}

/// GET /conversation/{id}/messages: conversation header plus one page of
/// messages, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDetailResponse {
    pub conversation_id: i64,
    pub contact_id: i64,
    pub status: ConversationStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,

    pub assigned_type: AssignedType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_id: Option<i64>,

    pub unread_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_open_until: Option<DateTime<Utc>>,
    pub is_session_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_remaining_ms: Option<i64>,

    pub messages: CursorPageResponse<ChatMessageResponse>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponse {
    pub conversation_id: i64,
    pub updated: bool,
    pub message: &'static str,
}
