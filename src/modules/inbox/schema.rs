#![allow(dead_code)]
use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};

use crate::modules::chat::schema::MessageDirection;

#[derive(Debug, PartialEq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "conversation_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ConversationStatus {
    Open,
    Closed,
    Archived,
    Blocked,
}

#[derive(Debug, PartialEq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "assigned_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AssignedType {
    Unassigned,
    User,
    Team,
}

#[derive(Debug, Clone, FromRow)]
pub struct ConversationEntity {
    pub id: i64,
    pub organization_id: i64,
    pub project_id: i64,
    pub waba_account_id: i64,
    pub contact_id: i64,
    pub status: ConversationStatus,
    pub assigned_type: AssignedType,
    pub assigned_id: Option<i64>,
    pub assigned_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_message_id: Option<i64>,
    pub last_message_at: chrono::DateTime<chrono::Utc>,
    pub last_message_direction: Option<MessageDirection>,
    pub last_message_preview: Option<String>,
    pub unread_count: i32,
    pub conversation_open_until: Option<chrono::DateTime<chrono::Utc>>,
    pub last_inbound_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_outbound_at: Option<chrono::DateTime<chrono::Utc>>,
    pub is_locked: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
