#![allow(dead_code)]
use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};

#[derive(Debug, PartialEq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "message_direction", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageDirection {
    Inbound,
    Outbound,
}

#[derive(Debug, PartialEq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "message_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    Text,
    Image,
    Video,
    Audio,
    Document,
    Template,
    Interactive,
    Reaction,
    System,
}

#[derive(Debug, PartialEq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "message_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageStatus {
    Queued,
    Processing,
    Sent,
    Delivered,
    Read,
    Failed,
    Rejected,
    Expired,
}

#[derive(Debug, PartialEq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "created_by_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum CreatedByType {
    User,
    System,
    Automation,
    Campaign,
}

/// Read-only reference data owned by the contact service.
#[derive(Debug, Clone, FromRow)]
pub struct ContactEntity {
    pub id: i64,
    pub display_name: Option<String>,
    pub wa_phone_e164: Option<String>,
}
