#![allow(dead_code)]
//! Read-only mirror of the template service's schema. Nothing here is ever
//! written by this service; absence of any row degrades to "no enrichment".
use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};

#[derive(Debug, PartialEq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "wa_template_category", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaTemplateCategory {
    Marketing,
    Utility,
    Authentication,
}

#[derive(Debug, PartialEq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "wa_template_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaTemplateStatus {
    Draft,
    NewCreated,
    Submitted,
    Pending,
    Approved,
    Rejected,
    Paused,
    Disabled,
    Failed,
}

#[derive(Debug, PartialEq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "wa_component_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaComponentType {
    Header,
    Body,
    Footer,
    Buttons,
    Carousel,
    LimitedTimeOffer,
}

impl WaComponentType {
    /// Key into the `template_vars` payload ("header", "body", ...).
    pub fn vars_key(&self) -> &'static str {
        match self {
            WaComponentType::Header => "header",
            WaComponentType::Body => "body",
            WaComponentType::Footer => "footer",
            WaComponentType::Buttons => "buttons",
            WaComponentType::Carousel => "carousel",
            WaComponentType::LimitedTimeOffer => "limited_time_offer",
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "wa_component_format", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaComponentFormat {
    Text,
    Image,
    Video,
    Document,
    Location,
    Product,
}

#[derive(Debug, PartialEq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "wa_button_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaButtonType {
    Url,
    QuickReply,
    PhoneNumber,
    CopyCode,
    Catalog,
    Mpm,
    Spm,
    Otp,
}

impl WaButtonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaButtonType::Url => "URL",
            WaButtonType::QuickReply => "QUICK_REPLY",
            WaButtonType::PhoneNumber => "PHONE_NUMBER",
            WaButtonType::CopyCode => "COPY_CODE",
            WaButtonType::Catalog => "CATALOG",
            WaButtonType::Mpm => "MPM",
            WaButtonType::Spm => "SPM",
            WaButtonType::Otp => "OTP",
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "wa_otp_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaOtpType {
    OneTap,
    CopyCode,
    ZeroTap,
}

impl WaOtpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaOtpType::OneTap => "ONE_TAP",
            WaOtpType::CopyCode => "COPY_CODE",
            WaOtpType::ZeroTap => "ZERO_TAP",
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TemplateEntity {
    pub id: i64,
    pub organization_id: Option<i64>,
    pub project_id: i64,
    pub waba_account_id: Option<String>,
    pub name: String,
    pub category: Option<WaTemplateCategory>,
    pub language: String,
    pub status: Option<WaTemplateStatus>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct TemplateComponentEntity {
    pub id: i64,
    pub template_id: i64,
    pub component_type: WaComponentType,
    pub format: Option<WaComponentFormat>,
    pub text: Option<String>,
    pub media_handle: Option<String>,
    pub media_url: Option<String>,
    pub add_security_recommendation: Option<bool>,
    pub code_expiration_minutes: Option<i32>,
    pub component_order: Option<i32>,
}

#[derive(Debug, Clone, FromRow)]
pub struct TemplateButtonEntity {
    pub id: i64,
    pub component_id: i64,
    pub button_type: Option<WaButtonType>,
    pub text: Option<String>,
    pub url: Option<String>,
    pub phone_number: Option<String>,
    pub otp_type: Option<WaOtpType>,
    pub button_index: Option<i32>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CarouselCardEntity {
    pub id: i64,
    pub component_id: i64,
    pub card_index: Option<i32>,
}

// Card sub-components keep the source's loose string typing: the upstream
// schema constrains them, this mirror just reads.
#[derive(Debug, Clone, FromRow)]
pub struct CarouselCardComponentEntity {
    pub id: i64,
    pub card_id: i64,
    pub component_type: Option<String>,
    pub format: Option<String>,
    pub text: Option<String>,
    pub media_handle: Option<String>,
    pub media_url: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CarouselButtonEntity {
    pub id: i64,
    pub card_component_id: i64,
    pub button_type: Option<String>,
    pub text: Option<String>,
    pub url: Option<String>,
    pub phone_number: Option<String>,
    pub button_index: Option<i32>,
}
